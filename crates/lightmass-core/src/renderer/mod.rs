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

//! Provides the public, backend-agnostic rendering contracts used by the baker.
//!
//! This module defines the 'what' of GPU access: descriptors, opaque ids, the
//! [`GraphicsDevice`] trait and the error hierarchy. The 'how' lives in the
//! `lightmass-infra` crate, which implements the trait for wgpu and for a CPU
//! reference device.

pub mod api;
pub mod error;
pub mod traits;

// Re-export the most important traits and types for easier use.
pub use self::api::*;
pub use self::error::{RenderError, ResourceError, ShaderError};
pub use self::traits::GraphicsDevice;
