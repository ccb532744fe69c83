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

//! 2D polygon clipping and barycentric helpers used by the conservative rasterizer.

use super::vector::Vec2;

/// Maximum number of vertices a [`ClipPolygon`] can hold.
///
/// Clipping a quad against a triangle produces at most 7 vertices.
pub const MAX_CLIP_VERTICES: usize = 16;

/// A small, fixed-capacity convex polygon produced by [`convex_clip`].
#[derive(Debug, Clone, Copy)]
pub struct ClipPolygon {
    points: [Vec2; MAX_CLIP_VERTICES],
    len: usize,
}

impl Default for ClipPolygon {
    fn default() -> Self {
        Self {
            points: [Vec2::ZERO; MAX_CLIP_VERTICES],
            len: 0,
        }
    }
}

impl ClipPolygon {
    /// Builds a polygon from a vertex list, truncated to [`MAX_CLIP_VERTICES`].
    pub fn from_points(points: &[Vec2]) -> Self {
        let mut polygon = Self::default();
        for &p in points {
            polygon.push(p);
        }
        polygon
    }

    #[inline]
    fn push(&mut self, p: Vec2) {
        debug_assert!(self.len < MAX_CLIP_VERTICES, "clip polygon overflow");
        if self.len < MAX_CLIP_VERTICES {
            self.points[self.len] = p;
            self.len += 1;
        }
    }

    /// The vertices of the polygon, in winding order.
    #[inline]
    pub fn as_slice(&self) -> &[Vec2] {
        &self.points[..self.len]
    }

    /// Number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` when the polygon has no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Unsigned area (shoelace formula).
    pub fn area(&self) -> f32 {
        let points = self.as_slice();
        let Some(&last) = points.last() else {
            return 0.0;
        };
        let mut twice_area = 0.0;
        let mut prev = last;
        for &p in points {
            twice_area += prev.perp_dot(p);
            prev = p;
        }
        (twice_area * 0.5).abs()
    }

    /// Average of the vertices.
    ///
    /// Returns `None` for an empty polygon.
    pub fn centroid(&self) -> Option<Vec2> {
        if self.is_empty() {
            return None;
        }
        let mut sum = Vec2::ZERO;
        for &p in self.as_slice() {
            sum += p;
        }
        Some(sum / self.len as f32)
    }
}

/// Which side of the directed edge `a -> b` the point `c` lies on.
///
/// Returns `1` for a left turn, `-1` for a right turn and `0` when collinear.
#[inline]
pub fn left_of(a: Vec2, b: Vec2, c: Vec2) -> i32 {
    let x = (b - a).perp_dot(c - b);
    if x < 0.0 {
        -1
    } else if x > 0.0 {
        1
    } else {
        0
    }
}

/// Intersection of the line through `x0`, `x1` with the open segment `y0`, `y1`.
///
/// Returns `None` for parallel lines or when the hit lies on (or beyond) an
/// endpoint of the segment.
pub fn line_intersection(x0: Vec2, x1: Vec2, y0: Vec2, y1: Vec2) -> Option<Vec2> {
    let dx = x1 - x0;
    let dy = y1 - y0;
    let d = x0 - y0;
    let dyx = dy.perp_dot(dx);
    if dyx == 0.0 {
        return None;
    }
    let t = d.perp_dot(dx) / dyx;
    if t <= 0.0 || t >= 1.0 {
        return None;
    }
    Some(y0 + dy * t)
}

/// Clips the convex polygon `subject` against the convex polygon `clip`
/// (Sutherland-Hodgman).
///
/// The orientation of `clip` is taken from its first three vertices, so both
/// windings are accepted. Vertices lying exactly on a clip edge are kept.
pub fn convex_clip(subject: &[Vec2], clip: &[Vec2]) -> ClipPolygon {
    let mut result = ClipPolygon::from_points(subject);
    if clip.len() < 3 {
        return ClipPolygon::default();
    }
    let dir = left_of(clip[0], clip[1], clip[2]);

    let mut j = clip.len() - 1;
    for i in 0..clip.len() {
        if result.is_empty() {
            break;
        }
        let input = result;
        let points = input.as_slice();
        result = ClipPolygon::default();

        let (edge_start, edge_end) = (clip[j], clip[i]);
        let mut v0 = points[points.len() - 1];
        let mut side0 = left_of(edge_start, edge_end, v0);
        if side0 != -dir {
            result.push(v0);
        }
        for (k, &v1) in points.iter().enumerate() {
            let side1 = left_of(edge_start, edge_end, v1);
            if side0 + side1 == 0 && side0 != 0 {
                if let Some(x) = line_intersection(edge_start, edge_end, v0, v1) {
                    result.push(x);
                }
            }
            if k == points.len() - 1 {
                break;
            }
            if side1 != -dir {
                result.push(v1);
            }
            v0 = v1;
            side0 = side1;
        }
        j = i;
    }
    result
}

/// Barycentric coordinates of `p` in the triangle `p1`, `p2`, `p3`.
///
/// `x` weights the `p1 -> p3` edge and `y` the `p1 -> p2` edge. Degenerate
/// triangles produce non-finite values.
pub fn barycentric(p1: Vec2, p2: Vec2, p3: Vec2, p: Vec2) -> Vec2 {
    let v0 = p3 - p1;
    let v1 = p2 - p1;
    let v2 = p - p1;
    let dot00 = v0.dot(v0);
    let dot01 = v0.dot(v1);
    let dot02 = v0.dot(v2);
    let dot11 = v1.dot(v1);
    let dot12 = v1.dot(v2);
    let inv_denom = 1.0 / (dot00 * dot11 - dot01 * dot01);
    Vec2::new(
        (dot11 * dot02 - dot01 * dot12) * inv_denom,
        (dot00 * dot12 - dot01 * dot02) * inv_denom,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_square(x: f32, y: f32) -> [Vec2; 4] {
        [
            Vec2::new(x, y),
            Vec2::new(x + 1.0, y),
            Vec2::new(x + 1.0, y + 1.0),
            Vec2::new(x, y + 1.0),
        ]
    }

    fn triangle_area(t: &[Vec2; 3]) -> f32 {
        ((t[1] - t[0]).perp_dot(t[2] - t[0]) * 0.5).abs()
    }

    #[test]
    fn square_inside_triangle_is_kept_whole() {
        let tri = [Vec2::new(-5.0, -5.0), Vec2::new(10.0, -5.0), Vec2::new(-5.0, 10.0)];
        let clipped = convex_clip(&unit_square(0.0, 0.0), &tri);
        assert_relative_eq!(clipped.area(), 1.0, epsilon = 1e-5);
        let c = clipped.centroid().unwrap();
        assert_relative_eq!(c.x, 0.5, epsilon = 1e-5);
        assert_relative_eq!(c.y, 0.5, epsilon = 1e-5);
    }

    #[test]
    fn clipped_area_is_bounded_by_both_inputs() {
        let triangles = [
            [Vec2::new(0.25, 0.25), Vec2::new(0.75, 0.25), Vec2::new(0.5, 0.75)],
            [Vec2::new(0.5, -1.0), Vec2::new(2.0, 0.5), Vec2::new(0.5, 2.0)],
            [Vec2::new(-1.0, 0.5), Vec2::new(0.5, 0.5), Vec2::new(-1.0, 3.0)],
            // Clockwise winding.
            [Vec2::new(0.0, 0.0), Vec2::new(0.0, 1.0), Vec2::new(1.0, 0.0)],
        ];
        for tri in &triangles {
            let area = convex_clip(&unit_square(0.0, 0.0), tri).area();
            assert!(area > 0.0, "{tri:?}");
            assert!(area <= 1.0 + 1e-5, "{tri:?}: {area}");
            assert!(area <= triangle_area(tri) + 1e-5, "{tri:?}: {area}");
        }
    }

    #[test]
    fn small_triangle_inside_square_keeps_its_area() {
        let tri = [Vec2::new(0.25, 0.25), Vec2::new(0.75, 0.25), Vec2::new(0.5, 0.75)];
        let clipped = convex_clip(&unit_square(0.0, 0.0), &tri);
        assert_relative_eq!(clipped.area(), triangle_area(&tri), epsilon = 1e-5);
    }

    #[test]
    fn half_plane_split_keeps_half_the_square() {
        // The diagonal x + y = 1 cuts the unit square in two equal halves.
        let tri = [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)];
        let clipped = convex_clip(&unit_square(0.0, 0.0), &tri);
        assert_relative_eq!(clipped.area(), 0.5, epsilon = 1e-5);
    }

    #[test]
    fn disjoint_triangle_yields_no_vertices() {
        let far_right = [Vec2::new(3.0, 0.0), Vec2::new(5.0, 0.0), Vec2::new(4.0, 2.0)];
        assert!(convex_clip(&unit_square(0.0, 0.0), &far_right).is_empty());

        let below = [Vec2::new(-2.0, -3.0), Vec2::new(4.0, -3.0), Vec2::new(1.0, -1.5)];
        let clipped = convex_clip(&unit_square(0.0, 0.0), &below);
        assert!(clipped.is_empty());
        assert_eq!(clipped.area(), 0.0);
        assert!(clipped.centroid().is_none());
    }

    #[test]
    fn line_intersection_rejects_parallel_and_endpoint_hits() {
        let hit = line_intersection(
            Vec2::new(0.0, 0.5),
            Vec2::new(1.0, 0.5),
            Vec2::new(0.5, 0.0),
            Vec2::new(0.5, 1.0),
        )
        .unwrap();
        assert_relative_eq!(hit.x, 0.5);
        assert_relative_eq!(hit.y, 0.5);

        let parallel = line_intersection(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 1.0),
        );
        assert!(parallel.is_none());

        let at_endpoint = line_intersection(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.5, 0.0),
            Vec2::new(0.5, 1.0),
        );
        assert!(at_endpoint.is_none());
    }

    #[test]
    fn barycentric_recovers_vertices() {
        let (a, b, c) = (Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0), Vec2::new(0.0, 2.0));
        let at_b = barycentric(a, b, c, b);
        let at_c = barycentric(a, b, c, c);
        assert_relative_eq!(at_b.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(at_b.y, 1.0, epsilon = 1e-6);
        assert_relative_eq!(at_c.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(at_c.y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn barycentric_of_degenerate_triangle_is_not_finite() {
        let p = Vec2::new(1.0, 1.0);
        assert!(!barycentric(p, p, p, p).is_finite());
    }
}
