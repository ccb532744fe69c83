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

//! Data contracts shared by the bake pipeline and its callers.
//!
//! Inputs are borrowed: a [`MeshView`] over the caller's vertex arrays and a
//! [`LightmapTarget`] over the caller's float buffer. Parameters are plain,
//! serializable data validated before any GPU work starts.

mod error;
mod lightmap;
mod listener;
mod mesh;
mod params;

pub use self::error::{ConfigError, GeometryError};
pub use self::lightmap::LightmapTarget;
pub use self::listener::LightMassListener;
pub use self::mesh::{ElementType, IndexStream, MeshView, VertexStream};
pub use self::params::{
    HemisphereWeight, LightSampleParams, MAX_INTERPOLATION_PASSES, SUPPORTED_HEMISPHERE_SIZES,
};
