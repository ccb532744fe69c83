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

//! Hemicube lightmap baking.
//!
//! A bake is driven through [`LightMassBaking`]: `setup` allocates the
//! hemicube batch resources, `set_render_target` and `set_geometry` bind the
//! caller's buffers, and either [`LightMassBaking::start`] or a manual
//! `begin_sample_hemisphere` / `end_sample_hemisphere` loop renders every
//! hemicube face the rasterizer asks for. Batches of rendered hemicubes are
//! reduced on the GPU and resolved into the lightmap one batch behind the
//! rendering.

mod baker;
mod context;
mod error;
mod hemicube;
mod rasterizer;
mod reduction;
mod resources;
mod sampler;
mod schedule;
pub mod shaders;
mod weights;

pub use self::baker::{HemisphereView, LightMassBaking, SceneRenderer, StopHandle};
pub use self::context::HemisphereContext;
pub use self::error::BakeError;
pub use self::hemicube::{HemicubeSide, HemisphereGrid, SampleCamera};
pub use self::rasterizer::{ConservativeRasterizer, RasterWindow, TexelOutcome};
pub use self::sampler::{SampleFrame, SampleTriangle};
pub use self::schedule::{PassSchedule, SubPass};
pub use self::weights::default_hemisphere_weights;
