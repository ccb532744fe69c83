// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use lightmass_core::bake::{ConfigError, GeometryError};
use lightmass_core::renderer::{RenderError, ResourceError};

/// Errors surfaced by a bake.
///
/// Every error returned from [`LightMassBaking`](super::LightMassBaking) is
/// also forwarded, as its display text, to the bound listener.
#[derive(Debug, thiserror::Error)]
pub enum BakeError {
    /// The parameters, lightmap or weight table are invalid.
    #[error("Invalid bake configuration: {0}")]
    Config(#[from] ConfigError),

    /// The bound mesh cannot be decoded.
    #[error("Invalid bake geometry: {0}")]
    Geometry(#[from] GeometryError),

    /// A GPU resource could not be created or used.
    #[error("{context}: {source}")]
    Resource {
        /// What the baker was doing.
        context: &'static str,
        /// The device error.
        #[source]
        source: ResourceError,
    },

    /// The scene renderer failed to draw a hemicube face.
    #[error("Scene rendering failed: {0}")]
    Render(#[from] RenderError),

    /// An operation was called before the state it needs was bound.
    #[error("LightMassBaking is not ready: {0}")]
    NotReady(&'static str),

    /// The readback buffer of a batch could not be mapped.
    #[error("Could not map hemisphere buffer: {0}")]
    MapFailed(#[source] ResourceError),
}

impl BakeError {
    /// Wraps a device error with the operation that raised it, for use with `map_err`.
    pub(crate) fn resource(context: &'static str) -> impl FnOnce(ResourceError) -> Self {
        move |source| BakeError::Resource { context, source }
    }
}
