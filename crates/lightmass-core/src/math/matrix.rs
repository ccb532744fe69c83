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

//! Provides the column-major [`Mat4`] used for world transforms and hemicube cameras.

use super::vector::{Vec3, Vec4};
use std::ops::Mul;

// --- Mat4 ---

/// A 4x4 column-major matrix.
///
/// The memory layout is column-major, which is what WGSL expects for
/// `mat4x4<f32>` uniforms.
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Mat4 {
    /// The columns of the matrix. `cols[0]` is the first column, and so on.
    pub cols: [Vec4; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat4 {
    /// The 4x4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [
            Vec4::new(1.0, 0.0, 0.0, 0.0),
            Vec4::new(0.0, 1.0, 0.0, 0.0),
            Vec4::new(0.0, 0.0, 1.0, 0.0),
            Vec4::new(0.0, 0.0, 0.0, 1.0),
        ],
    };

    /// Creates a matrix from four column vectors.
    #[inline]
    pub const fn from_cols(c0: Vec4, c1: Vec4, c2: Vec4, c3: Vec4) -> Self {
        Self {
            cols: [c0, c1, c2, c3],
        }
    }

    /// Returns the row at `index` as a `Vec4`.
    #[inline]
    pub fn get_row(&self, index: usize) -> Vec4 {
        let pick = |c: &Vec4| match index {
            0 => c.x,
            1 => c.y,
            2 => c.z,
            _ => c.w,
        };
        Vec4::new(
            pick(&self.cols[0]),
            pick(&self.cols[1]),
            pick(&self.cols[2]),
            pick(&self.cols[3]),
        )
    }

    /// Creates a translation matrix.
    #[inline]
    pub fn from_translation(v: Vec3) -> Self {
        let mut m = Self::IDENTITY;
        m.cols[3] = Vec4::from_vec3(v, 1.0);
        m
    }

    /// Creates a non-uniform scale matrix.
    #[inline]
    pub fn from_scale(s: Vec3) -> Self {
        let mut m = Self::IDENTITY;
        m.cols[0].x = s.x;
        m.cols[1].y = s.y;
        m.cols[2].z = s.z;
        m
    }

    /// Creates a right-handed view matrix looking from `eye` along `forward`.
    ///
    /// The camera basis is `side = forward x up`, `up`, `-forward`, so the
    /// camera looks down its local negative Z axis.
    pub fn look_to_rh(eye: Vec3, forward: Vec3, up: Vec3) -> Self {
        let f = forward.normalize();
        let s = f.cross(up).normalize();
        let u = s.cross(f);
        Self::from_cols(
            Vec4::new(s.x, u.x, -f.x, 0.0),
            Vec4::new(s.y, u.y, -f.y, 0.0),
            Vec4::new(s.z, u.z, -f.z, 0.0),
            Vec4::new(-s.dot(eye), -u.dot(eye), f.dot(eye), 1.0),
        )
    }

    /// Creates an off-axis, right-handed perspective projection with a `[0, 1]`
    /// depth range (ZO).
    ///
    /// `left`, `right`, `bottom` and `top` are the extents of the near plane.
    pub fn frustum_rh_zo(
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        z_near: f32,
        z_far: f32,
    ) -> Self {
        let width = right - left;
        let height = top - bottom;
        let depth = z_near - z_far;
        Self::from_cols(
            Vec4::new(2.0 * z_near / width, 0.0, 0.0, 0.0),
            Vec4::new(0.0, 2.0 * z_near / height, 0.0, 0.0),
            Vec4::new(
                (right + left) / width,
                (top + bottom) / height,
                z_far / depth,
                -1.0,
            ),
            Vec4::new(0.0, 0.0, z_near * z_far / depth, 0.0),
        )
    }

    /// Transforms a point (implicit `w = 1`) and drops the resulting `w`.
    #[inline]
    pub fn transform_point3(&self, p: Vec3) -> Vec3 {
        (*self * Vec4::from_vec3(p, 1.0)).truncate()
    }
}

impl Mul<Mat4> for Mat4 {
    type Output = Self;
    /// Multiplies this matrix by another `Mat4`. Note that matrix multiplication is not commutative.
    #[inline]
    fn mul(self, rhs: Mat4) -> Self::Output {
        let mut cols = [Vec4::ZERO; 4];
        for (target, rhs_col) in cols.iter_mut().zip(rhs.cols.iter()) {
            *target = self * *rhs_col;
        }
        Mat4 { cols }
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;
    /// Transforms a `Vec4` by this matrix.
    #[inline]
    fn mul(self, rhs: Vec4) -> Self::Output {
        self.cols[0] * rhs.x + self.cols[1] * rhs.y + self.cols[2] * rhs.z + self.cols[3] * rhs.w
    }
}

// --- Tests ---
