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

use lightmass_core::math::{Extent2D, LinearRgba, Viewport};

/// Row-major texel storage of a software texture.
///
/// Two-channel formats keep their values in `[0]` and `[1]`; depth lives in `[0]`.
#[derive(Debug, Clone)]
pub(super) struct TexelImage {
    pub(super) size: Extent2D,
    pub(super) texels: Vec<[f32; 4]>,
}

impl TexelImage {
    pub(super) fn new(size: Extent2D) -> Self {
        Self {
            size,
            texels: vec![[0.0; 4]; size.area()],
        }
    }

    pub(super) fn contains(&self, region: Viewport) -> bool {
        region.x as u64 + region.width as u64 <= self.size.width as u64
            && region.y as u64 + region.height as u64 <= self.size.height as u64
    }

    /// Reads a texel; out-of-range reads return zero like `textureLoad` on
    /// a robust GPU backend.
    pub(super) fn load(&self, x: u32, y: u32) -> [f32; 4] {
        if x >= self.size.width || y >= self.size.height {
            return [0.0; 4];
        }
        self.texels[self.index(x, y)]
    }

    pub(super) fn fill(&mut self, region: Viewport, value: [f32; 4]) {
        for y in region.y..region.y + region.height {
            let row = self.index(region.x, y);
            self.texels[row..row + region.width as usize].fill(value);
        }
    }

    pub(super) fn clear(&mut self, color: LinearRgba) {
        self.texels.fill(color.to_array());
    }

    /// Writes `values`, laid out row-major over `region`.
    pub(super) fn write_region(&mut self, region: Viewport, values: &[[f32; 4]]) {
        for (row, chunk) in values.chunks_exact(region.width as usize).enumerate() {
            let start = self.index(region.x, region.y + row as u32);
            self.texels[start..start + chunk.len()].copy_from_slice(chunk);
        }
    }

    /// Reads `region` row-major.
    pub(super) fn read_region(&self, region: Viewport) -> Vec<[f32; 4]> {
        let mut values = Vec::with_capacity(region.width as usize * region.height as usize);
        for y in region.y..region.y + region.height {
            let start = self.index(region.x, y);
            values.extend_from_slice(&self.texels[start..start + region.width as usize]);
        }
        values
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.size.width as usize + x as usize
    }
}

fn add(sum: &mut [f32; 4], value: [f32; 4]) {
    for (s, v) in sum.iter_mut().zip(value) {
        *s += v;
    }
}

/// Weighted 6x2 reduction of hemicube tiles.
///
/// Each output texel gathers four quadrant samples at x offsets 0, 2 and 4 of
/// its 6x2 block. Color is scaled by the weight's R channel and alpha by its G
/// channel, the weight being addressed modulo the weights texture size.
pub(super) fn weighted_downsample(
    hemispheres: &TexelImage,
    weights: &TexelImage,
    region: Viewport,
) -> Vec<[f32; 4]> {
    let (weights_width, weights_height) = (weights.size.width.max(1), weights.size.height.max(1));
    let mut out = Vec::with_capacity(region.width as usize * region.height as usize);
    for py in region.y..region.y + region.height {
        for px in region.x..region.x + region.width {
            let (hx, hy) = (px * 6, py * 2);
            let (wx, wy) = (hx % weights_width, hy % weights_height);
            let mut sum = [0.0f32; 4];
            for (qx, qy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
                for step in [0, 2, 4] {
                    let (ox, oy) = (qx + step, qy);
                    let [r, g, b, a] = hemispheres.load(hx + ox, hy + oy);
                    let [color, validity, ..] = weights.load(wx + ox, wy + oy);
                    add(&mut sum, [r * color, g * color, b * color, a * validity]);
                }
            }
            out.push(sum);
        }
    }
    out
}

/// Sums the 2x2 input block under each output texel.
pub(super) fn box_downsample(input: &TexelImage, region: Viewport) -> Vec<[f32; 4]> {
    let mut out = Vec::with_capacity(region.width as usize * region.height as usize);
    for py in region.y..region.y + region.height {
        for px in region.x..region.x + region.width {
            let (hx, hy) = (px * 2, py * 2);
            let mut sum = [0.0f32; 4];
            for (ox, oy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
                add(&mut sum, input.load(hx + ox, hy + oy));
            }
            out.push(sum);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(width: u32, height: u32) -> TexelImage {
        let mut image = TexelImage::new(Extent2D::new(width, height));
        for y in 0..height {
            for x in 0..width {
                let v = (y * width + x) as f32;
                image.fill(Viewport::new(x, y, 1, 1), [v, 1.0, 0.0, 1.0]);
            }
        }
        image
    }

    #[test]
    fn out_of_range_loads_are_zero() {
        let image = ramp(2, 2);
        assert_eq!(image.load(1, 1), [3.0, 1.0, 0.0, 1.0]);
        assert_eq!(image.load(2, 0), [0.0; 4]);
    }

    #[test]
    fn box_downsample_sums_blocks() {
        let image = ramp(4, 2);
        let out = box_downsample(&image, Viewport::new(0, 0, 2, 1));
        // 0 + 1 + 4 + 5 and 2 + 3 + 6 + 7.
        assert_eq!(out[0], [10.0, 4.0, 0.0, 4.0]);
        assert_eq!(out[1], [18.0, 4.0, 0.0, 4.0]);
    }

    #[test]
    fn weighted_downsample_applies_both_weight_channels() {
        let mut hemispheres = TexelImage::new(Extent2D::new(12, 2));
        hemispheres.fill(Viewport::new(0, 0, 12, 2), [1.0, 2.0, 3.0, 1.0]);
        let mut weights = TexelImage::new(Extent2D::new(6, 2));
        weights.fill(Viewport::new(0, 0, 6, 2), [0.5, 0.25, 0.0, 0.0]);

        let out = weighted_downsample(&hemispheres, &weights, Viewport::new(0, 0, 2, 1));
        // Twelve samples per output texel.
        for texel in out {
            assert_eq!(texel, [6.0, 12.0, 18.0, 3.0]);
        }
    }

    #[test]
    fn weights_repeat_per_tile() {
        let mut hemispheres = TexelImage::new(Extent2D::new(12, 2));
        hemispheres.fill(Viewport::new(0, 0, 12, 2), [1.0, 1.0, 1.0, 1.0]);
        let mut weights = TexelImage::new(Extent2D::new(6, 2));
        weights.fill(Viewport::new(0, 0, 1, 1), [1.0, 1.0, 0.0, 0.0]);

        let out = weighted_downsample(&hemispheres, &weights, Viewport::new(0, 0, 2, 1));
        assert_eq!(out, vec![[1.0, 1.0, 1.0, 1.0]; 2]);
    }
}
