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

//! The multi-resolution pass sequence of the conservative rasterizer.
//!
//! Pass 0 samples a coarse lattice of `2^P` texel spacing. Each following
//! triple of passes fills the lattice at half the spacing: first the texels
//! between horizontal neighbors, then between vertical neighbors, then the
//! centers between both. Those later passes may interpolate from the lattice
//! they refine instead of sampling.

/// The sampling pattern of one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubPass {
    /// Distance between two texels visited by the pass, always a power of two.
    pub step: u32,
    /// Horizontal offset of the first visited texel from the window origin.
    pub offset_x: u32,
    /// Vertical offset of the first visited texel from the window origin.
    pub offset_y: u32,
    /// Whether the left and right neighbors at `step / 2` are interpolated from.
    pub horizontal_neighbors: bool,
    /// Whether the top and bottom neighbors at `step / 2` are interpolated from.
    pub vertical_neighbors: bool,
}

impl SubPass {
    /// Distance to the neighbors an interpolated texel is averaged from.
    #[inline]
    pub fn neighbor_distance(&self) -> u32 {
        self.step / 2
    }

    /// Returns `true` if texels of this pass may be interpolated.
    #[inline]
    pub fn interpolates(&self) -> bool {
        self.horizontal_neighbors || self.vertical_neighbors
    }
}

/// The full pass sequence of a bake with `P` interpolation passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassSchedule {
    interpolation_passes: u32,
}

impl PassSchedule {
    /// Creates the schedule for `interpolation_passes` refinement triples.
    pub fn new(interpolation_passes: u32) -> Self {
        Self {
            interpolation_passes,
        }
    }

    /// Number of refinement triples.
    pub fn interpolation_passes(&self) -> u32 {
        self.interpolation_passes
    }

    /// Total number of passes, `1 + 3P`.
    pub fn pass_count(&self) -> u32 {
        1 + 3 * self.interpolation_passes
    }

    /// The pattern of `pass`.
    pub fn sub_pass(&self, pass: u32) -> SubPass {
        debug_assert!(pass < self.pass_count());
        let shift = self.interpolation_passes - pass.saturating_sub(1) / 3;
        let step = 1u32 << shift;
        if pass == 0 {
            return SubPass {
                step,
                offset_x: 0,
                offset_y: 0,
                horizontal_neighbors: false,
                vertical_neighbors: false,
            };
        }

        let half = step / 2;
        let (horizontal, vertical) = match (pass - 1) % 3 {
            0 => (true, false),
            1 => (false, true),
            _ => (true, true),
        };
        SubPass {
            step,
            offset_x: if horizontal { half } else { 0 },
            offset_y: if vertical { half } else { 0 },
            horizontal_neighbors: horizontal,
            vertical_neighbors: vertical,
        }
    }
}
