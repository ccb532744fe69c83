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

//! The hot path of the lightmap baker.
//!
//! Lanes hold the per-texel and per-batch work of a bake: the multi-pass
//! conservative rasterizer walking lightmap space, the hemicube sampler and
//! the GPU reduction pipeline. Everything here talks to the GPU through the
//! narrow [`lightmass_core::renderer::GraphicsDevice`] contract.

#![warn(missing_docs)]

pub mod bake_lane;

pub use bake_lane::*;
