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

//! Conservative rasterization of one triangle in lightmap space.
//!
//! The rasterizer walks the texels of the triangle's UV bounding box, grown
//! by one texel and clamped to the lightmap, on the lattice of the current
//! [`SubPass`]. A texel is conservatively covered when its unit square
//! overlaps the triangle with a non-zero area, even if its center is outside.

use super::sampler::{sample_frame, SampleFrame, SampleTriangle};
use super::schedule::SubPass;
use lightmass_core::bake::LightmapTarget;
use lightmass_core::math::{convex_clip, Vec2};
use rand::Rng;

/// The texel rectangle `[min, max)` walked for one triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterWindow {
    /// First column.
    pub min_x: u32,
    /// First row.
    pub min_y: u32,
    /// One past the last column.
    pub max_x: u32,
    /// One past the last row.
    pub max_y: u32,
}

impl RasterWindow {
    /// The bounding box of `uv` grown by one texel, clamped to `width` by `height`.
    pub fn around(uv: &[Vec2; 3], width: u32, height: u32) -> Self {
        let mut lo = Vec2::new(f32::MAX, f32::MAX);
        let mut hi = Vec2::new(f32::MIN, f32::MIN);
        for p in uv {
            lo.x = lo.x.min(p.x);
            lo.y = lo.y.min(p.y);
            hi.x = hi.x.max(p.x);
            hi.y = hi.y.max(p.y);
        }
        let grow_down = |v: f32| (v.floor() as i64 - 1).max(0);
        let grow_up = |v: f32, limit: u32| (v.ceil() as i64 + 1).clamp(0, limit as i64);
        Self {
            min_x: grow_down(lo.x).min(u32::MAX as i64) as u32,
            min_y: grow_down(lo.y).min(u32::MAX as i64) as u32,
            max_x: grow_up(hi.x, width) as u32,
            max_y: grow_up(hi.y, height) as u32,
        }
    }
}

/// What the rasterizer decided for one texel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TexelOutcome {
    /// Nothing to do: outside the window, already resolved or not covered.
    Skipped,
    /// The texel was filled with the mean of its neighbors.
    Interpolated,
    /// The texel needs a hemicube rendered from this frame.
    Sample(SampleFrame),
}

/// The rasterization cursor of one triangle during one pass.
#[derive(Debug, Clone)]
pub struct ConservativeRasterizer {
    triangle: SampleTriangle,
    window: RasterWindow,
    sub_pass: SubPass,
    x: u32,
    y: u32,
}

impl ConservativeRasterizer {
    /// Places the cursor on the first lattice texel of `triangle`'s window.
    pub fn new(triangle: SampleTriangle, width: u32, height: u32, sub_pass: SubPass) -> Self {
        let window = RasterWindow::around(&triangle.uv, width, height);
        Self {
            triangle,
            window,
            sub_pass,
            x: window.min_x + sub_pass.offset_x,
            y: window.min_y + sub_pass.offset_y,
        }
    }

    /// The rasterized window.
    pub fn window(&self) -> RasterWindow {
        self.window
    }

    /// The triangle being rasterized.
    pub fn triangle(&self) -> &SampleTriangle {
        &self.triangle
    }

    /// The texel under the cursor.
    pub fn texel(&self) -> (u32, u32) {
        (self.x, self.y)
    }

    /// Returns `true` once the cursor left the last row of the window.
    pub fn is_finished(&self) -> bool {
        self.y >= self.window.max_y
    }

    /// Moves to the next lattice texel, wrapping to the next lattice row.
    pub fn move_to_next(&mut self) {
        let step = self.sub_pass.step;
        self.x += step;
        while self.x >= self.window.max_x {
            self.x = self.window.min_x + self.sub_pass.offset_x;
            self.y += step;
            if self.is_finished() {
                break;
            }
        }
    }

    /// Finds the first texel that needs a sample, starting at the cursor.
    ///
    /// Returns `None` if the window is empty for this pass.
    pub fn begin<R: Rng + ?Sized>(
        &mut self,
        lightmap: &mut LightmapTarget<'_>,
        threshold: f32,
        rng: &mut R,
    ) -> Option<SampleFrame> {
        if self.x > self.window.max_x || self.y > self.window.max_y {
            return None;
        }
        self.find_first(lightmap, threshold, rng)
    }

    /// Advances until a texel needs a sample, starting at the cursor itself.
    pub fn find_first<R: Rng + ?Sized>(
        &mut self,
        lightmap: &mut LightmapTarget<'_>,
        threshold: f32,
        rng: &mut R,
    ) -> Option<SampleFrame> {
        loop {
            if let TexelOutcome::Sample(frame) = self.try_sample(lightmap, threshold, rng) {
                return Some(frame);
            }
            self.move_to_next();
            if self.is_finished() {
                return None;
            }
        }
    }

    /// Advances past the cursor until a texel needs a sample.
    pub fn find_next<R: Rng + ?Sized>(
        &mut self,
        lightmap: &mut LightmapTarget<'_>,
        threshold: f32,
        rng: &mut R,
    ) -> Option<SampleFrame> {
        self.move_to_next();
        self.find_first(lightmap, threshold, rng)
    }

    /// Decides what the texel under the cursor needs.
    ///
    /// Resolved texels are skipped; a texel counts as resolved when its first
    /// channel is non-zero. On refinement passes the texel is first
    /// interpolated from its neighbors when they agree within `threshold`;
    /// otherwise a sample frame is built from the part of the texel covered
    /// by the triangle.
    pub fn try_sample<R: Rng + ?Sized>(
        &self,
        lightmap: &mut LightmapTarget<'_>,
        threshold: f32,
        rng: &mut R,
    ) -> TexelOutcome {
        if self.is_finished() || self.x >= self.window.max_x {
            return TexelOutcome::Skipped;
        }
        if lightmap.is_resolved(self.x, self.y) {
            return TexelOutcome::Skipped;
        }
        if self.sub_pass.interpolates() && self.interpolate(lightmap, threshold) {
            return TexelOutcome::Interpolated;
        }

        let (x, y) = (self.x as f32, self.y as f32);
        let texel = [
            Vec2::new(x, y),
            Vec2::new(x + 1.0, y),
            Vec2::new(x + 1.0, y + 1.0),
            Vec2::new(x, y + 1.0),
        ];
        let covered = convex_clip(&texel, &self.triangle.uv);
        if !(covered.area() > 0.0) {
            return TexelOutcome::Skipped;
        }
        let Some(centroid) = covered.centroid() else {
            return TexelOutcome::Skipped;
        };
        match sample_frame(&self.triangle, centroid, (self.x, self.y), rng) {
            Some(frame) => TexelOutcome::Sample(frame),
            None => TexelOutcome::Skipped,
        }
    }

    fn interpolate(&self, lightmap: &mut LightmapTarget<'_>, threshold: f32) -> bool {
        let d = self.sub_pass.neighbor_distance();
        let window = self.window;
        let (x, y) = (self.x, self.y);
        let mut neighbors = [(0u32, 0u32); 4];
        let mut count = 0;
        let mut expected = 0;

        if self.sub_pass.horizontal_neighbors {
            expected += 2;
            if x >= window.min_x + d && x + d < window.max_x {
                neighbors[count] = (x - d, y);
                neighbors[count + 1] = (x + d, y);
                count += 2;
            }
        }
        if self.sub_pass.vertical_neighbors {
            expected += 2;
            if y >= window.min_y + d && y + d < window.max_y {
                neighbors[count] = (x, y - d);
                neighbors[count + 1] = (x, y + d);
                count += 2;
            }
        }
        if count != expected || count == 0 {
            return false;
        }
        let neighbors = &neighbors[..count];

        let channels = lightmap.channels();
        let mut mean = [0.0f32; 4];
        for &(nx, ny) in neighbors {
            if !lightmap.is_resolved(nx, ny) {
                return false;
            }
            for (m, v) in mean.iter_mut().zip(lightmap.texel(nx, ny)) {
                *m += v;
            }
        }
        let inv = 1.0 / count as f32;
        for m in &mut mean[..channels] {
            *m *= inv;
        }

        let agree = neighbors.iter().all(|&(nx, ny)| {
            lightmap
                .texel(nx, ny)
                .iter()
                .zip(&mean)
                .all(|(v, m)| (v - m).abs() <= threshold)
        });
        if !agree {
            return false;
        }
        lightmap.texel_mut(x, y).copy_from_slice(&mean[..channels]);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bake_lane::schedule::PassSchedule;
    use lightmass_core::math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn covering_triangle(extent: f32) -> SampleTriangle {
        SampleTriangle {
            uv: [
                Vec2::new(0.0, 0.0),
                Vec2::new(2.0 * extent, 0.0),
                Vec2::new(0.0, 2.0 * extent),
            ],
            position: [
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 1.0),
                Vec3::new(1.0, 0.0, 0.0),
            ],
        }
    }

    /// Runs every pass of `schedule`, resolving each sample on the spot with `value`.
    fn bake_in_place(
        triangle: SampleTriangle,
        lightmap: &mut LightmapTarget<'_>,
        schedule: PassSchedule,
        value: impl Fn(u32, u32) -> f32,
    ) -> (usize, usize) {
        let mut rng = StdRng::seed_from_u64(3);
        let (mut samples, mut interpolated) = (0, 0);
        for pass in 0..schedule.pass_count() {
            let sub_pass = schedule.sub_pass(pass);
            let mut raster = ConservativeRasterizer::new(
                triangle,
                lightmap.width(),
                lightmap.height(),
                sub_pass,
            );
            while !raster.is_finished() {
                match raster.try_sample(lightmap, 1e-3, &mut rng) {
                    TexelOutcome::Sample(_) => {
                        let (x, y) = raster.texel();
                        lightmap.texel_mut(x, y)[0] = value(x, y);
                        samples += 1;
                    }
                    TexelOutcome::Interpolated => interpolated += 1,
                    TexelOutcome::Skipped => {}
                }
                raster.move_to_next();
            }
        }
        (samples, interpolated)
    }

    #[test]
    fn window_grows_by_one_texel_and_clamps() {
        let uv = [Vec2::new(1.5, 2.2), Vec2::new(3.1, 2.0), Vec2::new(2.0, 7.9)];
        let window = RasterWindow::around(&uv, 16, 6);
        assert_eq!(
            window,
            RasterWindow {
                min_x: 0,
                min_y: 1,
                max_x: 5,
                max_y: 6
            }
        );
    }

    #[test]
    fn window_of_a_triangle_outside_the_lightmap_is_empty() {
        let uv = [Vec2::new(-9.0, -9.0), Vec2::new(-5.0, -9.0), Vec2::new(-9.0, -4.0)];
        let window = RasterWindow::around(&uv, 8, 8);
        assert_eq!((window.max_x, window.max_y), (0, 0));
    }

    #[test]
    fn cursor_walks_rows_on_the_pass_lattice() {
        let sub_pass = PassSchedule::new(1).sub_pass(1);
        let mut raster = ConservativeRasterizer::new(covering_triangle(4.0), 4, 4, sub_pass);
        let mut visited = vec![raster.texel()];
        loop {
            raster.move_to_next();
            if raster.is_finished() {
                break;
            }
            visited.push(raster.texel());
        }
        assert_eq!(visited, vec![(1, 0), (3, 0), (1, 2), (3, 2)]);
    }

    #[test]
    fn single_pass_samples_every_covered_texel_once() {
        let mut data = vec![0.0; 16];
        let mut lightmap = LightmapTarget::new(&mut data, 4, 4, 1).unwrap();
        let (samples, interpolated) =
            bake_in_place(covering_triangle(4.0), &mut lightmap, PassSchedule::new(0), |_, _| 1.0);
        assert_eq!((samples, interpolated), (16, 0));
        assert!(lightmap.as_slice().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn refinement_passes_interpolate_smooth_regions() {
        let mut data = vec![0.0; 64];
        let mut lightmap = LightmapTarget::new(&mut data, 8, 8, 1).unwrap();
        let (samples, interpolated) =
            bake_in_place(covering_triangle(8.0), &mut lightmap, PassSchedule::new(1), |_, _| 0.5);
        assert_eq!(samples + interpolated, 64);
        assert_eq!(samples, 31);
        assert!(lightmap.as_slice().iter().all(|&v| v == 0.5));
    }

    #[test]
    fn neighbors_that_disagree_force_a_sample() {
        let mut data = vec![0.0; 64];
        let mut lightmap = LightmapTarget::new(&mut data, 8, 8, 1).unwrap();
        let (samples, interpolated) = bake_in_place(
            covering_triangle(8.0),
            &mut lightmap,
            PassSchedule::new(1),
            |x, y| 1.0 + (x + y) as f32,
        );
        assert_eq!((samples, interpolated), (64, 0));
    }

    #[test]
    fn resolved_texels_are_never_revisited() {
        let mut data = vec![0.0; 16];
        data[5] = 2.0;
        let mut lightmap = LightmapTarget::new(&mut data, 4, 4, 1).unwrap();
        let (samples, _) =
            bake_in_place(covering_triangle(4.0), &mut lightmap, PassSchedule::new(0), |_, _| 1.0);
        assert_eq!(samples, 15);
        assert_eq!(lightmap.texel(1, 1), &[2.0]);
    }

    #[test]
    fn texels_touching_only_the_bounding_box_are_not_sampled() {
        let triangle = SampleTriangle {
            uv: [Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0), Vec2::new(0.0, 4.0)],
            ..covering_triangle(4.0)
        };
        let mut data = vec![0.0; 36];
        let mut lightmap = LightmapTarget::new(&mut data, 6, 6, 1).unwrap();
        let (samples, _) = bake_in_place(triangle, &mut lightmap, PassSchedule::new(0), |_, _| 1.0);
        // Texels whose top-left corner lies strictly inside x + y < 4.
        assert_eq!(samples, 10);
        assert!(!lightmap.is_resolved(3, 3));
        assert!(!lightmap.is_resolved(4, 0));
    }
}
