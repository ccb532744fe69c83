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

//! A CPU implementation of the graphics device contract.
//!
//! Textures are stored as `[f32; 4]` texels and fullscreen programs run the
//! kernel named by their [`FullscreenKernel`](lightmass_core::renderer::FullscreenKernel)
//! tag instead of compiling WGSL. Results match the GPU programs up to float
//! summation order.

mod device;
mod kernels;

pub use self::device::SoftwareDevice;
