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

//! The default cosine kernel of the weighted reduction.

use lightmass_core::bake::HemisphereWeight;
use lightmass_core::math::Vec3;

/// Builds the cosine-weighted kernel of a `size` hemicube.
///
/// The table is `3 * size` by `size`, laid out like a hemicube tile. Each
/// texel is weighted by the solid angle it subtends and, for the color
/// channel, by the cosine between its direction and the surface normal. The
/// validity weights sum to one over the whole tile.
pub fn default_hemisphere_weights(size: u32) -> Vec<HemisphereWeight> {
    let size = size as usize;
    let row = 3 * size;
    let mut weights = vec![HemisphereWeight::default(); row * size];
    let center = (size as f32 - 1.0) * 0.5;
    let mut sum = 0.0f64;

    for y in 0..size {
        let dy = 2.0 * (y as f32 - center) / size as f32;
        for x in 0..size {
            let dx = 2.0 * (x as f32 - center) / size as f32;
            let v = Vec3::new(dx, dy, 1.0).normalize();
            let solid_angle = v.z * v.z * v.z;

            let base = y * row + x;
            weights[base] = HemisphereWeight::new(solid_angle * v.z, solid_angle);
            weights[base + size] = HemisphereWeight::new(solid_angle * v.x.abs(), solid_angle);
            weights[base + 2 * size] = HemisphereWeight::new(solid_angle * v.y.abs(), solid_angle);
            sum += 3.0 * solid_angle as f64;
        }
    }

    let scale = (1.0 / sum) as f32;
    for w in &mut weights {
        w.color *= scale;
        w.validity *= scale;
    }
    weights
}
