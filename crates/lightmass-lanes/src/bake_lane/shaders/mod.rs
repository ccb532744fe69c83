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

//! Built-in shader sources of the hemicube reduction.
//!
//! Both programs draw a fullscreen triangle strip of four vertices with no
//! vertex buffer and read their inputs with `textureLoad`, so they need
//! neither samplers nor filterable formats.
//!
//! - [`HEMISPHERE_FIRST_PASS_WGSL`] - weighted 6x2 reduction of raw hemicube tiles
//! - [`HEMISPHERE_DOWNSAMPLE_WGSL`] - 2x2 box reduction

/// Weighted first reduction pass.
///
/// Binding 0 is the hemicube batch, binding 1 the `Rg32Float` weight kernel.
pub const HEMISPHERE_FIRST_PASS_WGSL: &str = include_str!("hemisphere_first_pass.wgsl");

/// Iterative 2x2 box reduction. Binding 0 is the previous reduction level.
pub const HEMISPHERE_DOWNSAMPLE_WGSL: &str = include_str!("hemisphere_downsample.wgsl");

/// Vertex entry point of both programs.
pub const VERTEX_ENTRY_POINT: &str = "vs_main";

/// Fragment entry point of both programs.
pub const FRAGMENT_ENTRY_POINT: &str = "fs_main";
