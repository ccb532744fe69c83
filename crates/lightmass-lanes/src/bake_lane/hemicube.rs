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

//! Hemicube faces, their place in a batch tile and their cameras.
//!
//! A hemicube of size `s` is stored as a `3s` by `s` tile. The center face
//! fills the first `s` by `s` square. The second column holds the right and
//! left half faces side by side, and the third column stacks the down and up
//! half faces. Every half face has its horizon edge in the middle of its
//! column.

use super::sampler::SampleFrame;
use lightmass_core::math::{Extent2D, Mat4, Vec3, Viewport};

/// Width of the batch framebuffer, in pixels.
const BATCH_WIDTH: u32 = 1536;
/// Height of the batch framebuffer, in pixels.
const BATCH_HEIGHT: u32 = 512;

/// One face of a hemicube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HemicubeSide {
    /// Looks along the surface normal.
    Center,
    /// Looks along `direction x up`.
    Right,
    /// Looks opposite to [`HemicubeSide::Right`].
    Left,
    /// Looks opposite to the tangent up vector.
    Down,
    /// Looks along the tangent up vector.
    Up,
}

impl HemicubeSide {
    /// Faces in rendering order.
    pub const ALL: [HemicubeSide; 5] = [
        HemicubeSide::Center,
        HemicubeSide::Right,
        HemicubeSide::Left,
        HemicubeSide::Down,
        HemicubeSide::Up,
    ];

    /// The face rendered at position `index` of a hemicube, if any.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The region of a tile whose top-left corner is `origin` covered by this face.
    pub fn viewport(self, origin: (u32, u32), size: u32) -> Viewport {
        let (x, y) = origin;
        let half = size / 2;
        match self {
            HemicubeSide::Center => Viewport::new(x, y, size, size),
            HemicubeSide::Right => Viewport::new(x + size, y, half, size),
            HemicubeSide::Left => Viewport::new(x + size + half, y, half, size),
            HemicubeSide::Down => Viewport::new(x + 2 * size, y, size, half),
            HemicubeSide::Up => Viewport::new(x + 2 * size, y + half, size, half),
        }
    }

    /// The camera of this face for a sample, with near plane `near` and far plane `far`.
    pub fn camera(self, frame: &SampleFrame, near: f32, far: f32) -> SampleCamera {
        let SampleFrame {
            position,
            direction,
            up,
        } = *frame;
        let right = direction.cross(up);
        let n = near;
        match self {
            HemicubeSide::Center => {
                SampleCamera::new(position, direction, up, [-n, n, -n, n], near, far)
            }
            HemicubeSide::Right => {
                SampleCamera::new(position, right, up, [-n, 0.0, -n, n], near, far)
            }
            HemicubeSide::Left => {
                SampleCamera::new(position, -right, up, [0.0, n, -n, n], near, far)
            }
            HemicubeSide::Down => {
                SampleCamera::new(position, -up, direction, [-n, n, 0.0, n], near, far)
            }
            HemicubeSide::Up => {
                SampleCamera::new(position, up, -direction, [-n, n, -n, 0.0], near, far)
            }
        }
    }
}

/// The view and projection of one hemicube face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleCamera {
    /// World to view space.
    pub view: Mat4,
    /// View to clip space, with a `[0, 1]` depth range.
    pub projection: Mat4,
    /// `projection * view`.
    pub view_projection: Mat4,
    /// The eye position.
    pub eye: Vec3,
}

impl SampleCamera {
    /// Builds a camera at `eye` looking along `forward`, whose near plane spans
    /// `[left, right, bottom, top]`.
    pub fn new(
        eye: Vec3,
        forward: Vec3,
        up: Vec3,
        [left, right, bottom, top]: [f32; 4],
        near: f32,
        far: f32,
    ) -> Self {
        let view = Mat4::look_to_rh(eye, forward, up);
        let projection = Mat4::frustum_rh_zo(left, right, bottom, top, near, far);
        Self {
            view,
            projection,
            view_projection: projection * view,
            eye,
        }
    }
}

/// The layout of hemicube tiles in a batch framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HemisphereGrid {
    /// Edge length of the center face, in pixels.
    pub size: u32,
    /// Tiles per row.
    pub count_x: u32,
    /// Tiles per column.
    pub count_y: u32,
}

impl HemisphereGrid {
    /// The grid of `size` hemicubes filling a 1536 by 512 framebuffer.
    pub fn new(size: u32) -> Self {
        Self {
            size,
            count_x: BATCH_WIDTH / (3 * size),
            count_y: BATCH_HEIGHT / size,
        }
    }

    /// Hemicubes per batch.
    pub fn capacity(&self) -> usize {
        self.count_x as usize * self.count_y as usize
    }

    /// Size of the framebuffer the scene is rendered into.
    pub fn full_extent(&self) -> Extent2D {
        Extent2D::new(self.count_x * self.size * 3, self.count_y * self.size)
    }

    /// Size of the framebuffer the first reduction writes into.
    pub fn half_extent(&self) -> Extent2D {
        Extent2D::new(self.count_x * self.size / 2, self.count_y * self.size / 2)
    }

    /// Size of the fully reduced grid, one texel per hemicube.
    pub fn reduced_extent(&self) -> Extent2D {
        Extent2D::new(self.count_x, self.count_y)
    }

    /// Top-left corner of the tile of slot `index`.
    pub fn tile_origin(&self, index: usize) -> (u32, u32) {
        let index = index as u32;
        (
            (index % self.count_x) * self.size * 3,
            (index / self.count_x) * self.size,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use lightmass_core::math::Vec4;

    fn frame() -> SampleFrame {
        SampleFrame {
            position: Vec3::new(1.0, 2.0, 3.0),
            direction: Vec3::Y,
            up: Vec3::Z,
        }
    }

    #[test]
    fn grid_fills_the_batch_framebuffer() {
        let grid = HemisphereGrid::new(64);
        assert_eq!((grid.count_x, grid.count_y), (8, 8));
        assert_eq!(grid.capacity(), 64);
        assert_eq!(grid.full_extent(), Extent2D::new(1536, 512));
        assert_eq!(grid.half_extent(), Extent2D::new(256, 256));

        let grid = HemisphereGrid::new(512);
        assert_eq!((grid.count_x, grid.count_y), (1, 1));
        assert_eq!(grid.tile_origin(0), (0, 0));

        let grid = HemisphereGrid::new(16);
        assert_eq!(grid.tile_origin(33), (48, 16));
    }

    #[test]
    fn faces_tile_the_hemicube_without_overlap() {
        let size = 16;
        let mut covered = vec![0u8; (3 * size * size) as usize];
        for side in HemicubeSide::ALL {
            let vp = side.viewport((0, 0), size);
            for y in vp.y..vp.y + vp.height {
                for x in vp.x..vp.x + vp.width {
                    covered[(y * 3 * size + x) as usize] += 1;
                }
            }
        }
        assert!(covered.iter().all(|&c| c == 1));
    }

    #[test]
    fn sides_are_indexed_in_rendering_order() {
        assert_eq!(HemicubeSide::from_index(0), Some(HemicubeSide::Center));
        assert_eq!(HemicubeSide::from_index(4), Some(HemicubeSide::Up));
        assert_eq!(HemicubeSide::from_index(5), None);
    }

    #[test]
    fn center_camera_projects_the_normal_to_the_middle_of_the_face() {
        let camera = HemicubeSide::Center.camera(&frame(), 0.1, 10.0);
        let target = Vec4::new(1.0, 3.0, 3.0, 1.0);
        let clip = camera.view_projection * target;
        assert_relative_eq!(clip.x / clip.w, 0.0, epsilon = 1e-5);
        assert_relative_eq!(clip.y / clip.w, 0.0, epsilon = 1e-5);
        let depth = clip.z / clip.w;
        assert!(depth > 0.0 && depth < 1.0);
    }

    #[test]
    fn half_faces_only_see_the_upper_hemisphere() {
        let f = frame();
        // A point just above the horizon, straight ahead of each half face.
        let cases = [
            (HemicubeSide::Right, f.direction.cross(f.up)),
            (HemicubeSide::Left, -f.direction.cross(f.up)),
            (HemicubeSide::Down, -f.up),
            (HemicubeSide::Up, f.up),
        ];
        for (side, forward) in cases {
            let camera = side.camera(&f, 0.1, 10.0);
            let above = f.position + forward + f.direction * 0.5;
            let below = f.position + forward - f.direction * 0.5;
            let inside = |p: Vec3| {
                let clip = camera.view_projection * Vec4::from_vec3(p, 1.0);
                let (x, y) = (clip.x / clip.w, clip.y / clip.w);
                (-1.0..=1.0).contains(&x) && (-1.0..=1.0).contains(&y)
            };
            assert!(inside(above), "{side:?} misses the upper hemisphere");
            assert!(!inside(below), "{side:?} sees below the horizon");
        }
    }
}
