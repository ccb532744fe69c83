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

//! Placement and orientation of a hemicube sample on a triangle.

use lightmass_core::bake::MeshView;
use lightmass_core::math::{barycentric, Mat4, Vec2, Vec3, PI, TAU};
use rand::Rng;

const BASE_ANGLE: f32 = 0.03 * PI;

/// Azimuth fractions of the tangent frame, indexed `[y % 3][x % 3]`, so that
/// neighboring texels never share an orientation.
const BASE_ANGLES: [[f32; 3]; 3] = [
    [BASE_ANGLE, BASE_ANGLE + 1.0 / 3.0, BASE_ANGLE + 2.0 / 3.0],
    [BASE_ANGLE + 1.0 / 3.0, BASE_ANGLE + 2.0 / 3.0, BASE_ANGLE],
    [BASE_ANGLE + 2.0 / 3.0, BASE_ANGLE, BASE_ANGLE + 1.0 / 3.0],
];

/// Amplitude of the random azimuth added to the base angle.
const JITTER: f32 = 0.1;

/// One triangle of the bound mesh, ready for rasterization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleTriangle {
    /// Lightmap coordinates, in texels.
    pub uv: [Vec2; 3],
    /// World-space positions.
    pub position: [Vec3; 3],
}

impl SampleTriangle {
    /// Decodes the triangle starting at index `base_index` of `mesh`.
    ///
    /// UVs are scaled from `[0, 1]` to texels of a `width` by `height`
    /// lightmap and positions are moved to world space by `world`.
    pub fn from_mesh(
        mesh: &MeshView<'_>,
        base_index: usize,
        world: &Mat4,
        width: u32,
        height: u32,
    ) -> Self {
        let scale = Vec2::new(width as f32, height as f32);
        let mut uv = [Vec2::ZERO; 3];
        let mut position = [Vec3::ZERO; 3];
        for i in 0..3 {
            let vertex = mesh.vertex_index(base_index + i);
            uv[i] = mesh.lightmap_uv(vertex).scale(scale);
            position[i] = world.transform_point3(mesh.position(vertex));
        }
        Self { uv, position }
    }
}

/// The eye of one hemicube: where it sits and how it is turned.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SampleFrame {
    /// World-space position of the sample.
    pub position: Vec3,
    /// Geometric normal of the triangle, the hemicube's zenith.
    pub direction: Vec3,
    /// Tangent used as the camera up vector of the center face.
    pub up: Vec3,
}

/// Places a sample at the lightmap-space point `centroid` of `triangle`.
///
/// Returns `None` when the triangle is degenerate in UV or world space.
pub(crate) fn sample_frame<R: Rng + ?Sized>(
    triangle: &SampleTriangle,
    centroid: Vec2,
    texel: (u32, u32),
    rng: &mut R,
) -> Option<SampleFrame> {
    let [t0, t1, t2] = triangle.uv;
    let uv = barycentric(t0, t1, t2, centroid);
    if !uv.is_finite() {
        return None;
    }

    let [p0, p1, p2] = triangle.position;
    let v1 = p1 - p0;
    let v2 = p2 - p0;
    let position = p0 + v2 * uv.x + v1 * uv.y;
    let direction = v1.cross(v2).normalize();
    if !position.is_finite() || !direction.is_finite() || direction.length_squared() <= 0.5 {
        return None;
    }

    let phi = TAU * BASE_ANGLES[(texel.1 % 3) as usize][(texel.0 % 3) as usize]
        + JITTER * rng.gen::<f32>();
    Some(SampleFrame {
        position,
        direction,
        up: tangent_up(direction, phi),
    })
}

/// A unit tangent of `direction`, rotated by `phi` around it.
pub(crate) fn tangent_up(direction: Vec3, phi: f32) -> Vec3 {
    let mut up = Vec3::Y;
    if up.dot(direction).abs() > 0.8 {
        up = Vec3::Z;
    }
    let side = up.cross(direction).normalize();
    let up = side.cross(direction).normalize();
    (side * phi.cos() + up * phi.sin()).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightmass_core::bake::VertexStream;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn floor_triangle() -> SampleTriangle {
        SampleTriangle {
            uv: [Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0), Vec2::new(0.0, 4.0)],
            position: [
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 4.0),
                Vec3::new(4.0, 0.0, 0.0),
            ],
        }
    }

    #[test]
    fn frame_sits_on_the_triangle_and_faces_its_normal() {
        let mut rng = StdRng::seed_from_u64(1);
        let frame = sample_frame(&floor_triangle(), Vec2::new(1.0, 2.0), (1, 2), &mut rng)
            .expect("valid triangle");
        // A quarter along the first edge, half along the second.
        assert!((frame.position.x - 2.0).abs() < 1e-5);
        assert!((frame.position.z - 1.0).abs() < 1e-5);
        assert!((frame.direction.y.abs() - 1.0).abs() < 1e-5);
        assert!(frame.up.dot(frame.direction).abs() < 1e-5);
        assert!((frame.up.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn degenerate_triangles_produce_no_frame() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut flat_uv = floor_triangle();
        flat_uv.uv = [Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0), Vec2::new(2.0, 2.0)];
        assert!(sample_frame(&flat_uv, Vec2::new(0.5, 0.5), (0, 0), &mut rng).is_none());

        let mut collapsed = floor_triangle();
        collapsed.position = [Vec3::ONE; 3];
        assert!(sample_frame(&collapsed, Vec2::new(1.0, 1.0), (0, 0), &mut rng).is_none());
    }

    #[test]
    fn tangent_frame_switches_reference_axis_near_the_pole() {
        for direction in [Vec3::Y, Vec3::new(0.0, -1.0, 0.0), Vec3::X, Vec3::Z] {
            for phi in [0.0, 1.0, 2.5] {
                let up = tangent_up(direction, phi);
                assert!(up.is_finite());
                assert!(up.dot(direction).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn identical_seeds_give_identical_frames() {
        let triangle = floor_triangle();
        let a = sample_frame(&triangle, Vec2::new(1.5, 1.5), (4, 7), &mut StdRng::seed_from_u64(9));
        let b = sample_frame(&triangle, Vec2::new(1.5, 1.5), (4, 7), &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn triangles_decode_in_lightmap_texels_and_world_space() {
        static POSITIONS: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        static UVS: [f32; 6] = [0.0, 0.0, 1.0, 0.0, 0.0, 0.5];
        let mesh = MeshView::new(
            VertexStream::from_f32(&POSITIONS),
            VertexStream::from_f32(&UVS),
            None,
            3,
        )
        .unwrap();
        let world = Mat4::from_translation(Vec3::new(0.0, 0.0, 5.0));
        let triangle = SampleTriangle::from_mesh(&mesh, 0, &world, 8, 4);
        assert_eq!(triangle.uv[1], Vec2::new(8.0, 0.0));
        assert_eq!(triangle.uv[2], Vec2::new(0.0, 2.0));
        assert_eq!(triangle.position[1], Vec3::new(1.0, 0.0, 5.0));
    }
}
