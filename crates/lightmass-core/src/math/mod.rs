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

//! Provides the mathematics primitives used by the baker.
//!
//! Vectors and matrices follow the right-handed, column-major conventions of
//! the renderer. Clip-space depth is mapped to `[0, 1]`.

// --- Fundamental Constants ---

/// A small constant for floating-point comparisons.
pub const EPSILON: f32 = 1e-5;

pub use std::f32::consts::{PI, TAU};

// --- Declare Sub-Modules ---

pub mod color;
pub mod dimension;
pub mod geometry;
pub mod matrix;
pub mod vector;

// --- Re-export Principal Types ---

pub use self::color::LinearRgba;
pub use self::dimension::{Extent2D, Viewport};
pub use self::geometry::{barycentric, convex_clip, ClipPolygon};
pub use self::matrix::Mat4;
pub use self::vector::{Vec2, Vec3, Vec4};
