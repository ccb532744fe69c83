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

//! Bake configuration.

use super::error::ConfigError;
use crate::math::LinearRgba;
use serde::{Deserialize, Serialize};

/// Hemicube tile edge lengths, in pixels, accepted by [`LightSampleParams::validate`].
pub const SUPPORTED_HEMISPHERE_SIZES: [u32; 6] = [16, 32, 64, 128, 256, 512];

/// Upper bound of [`LightSampleParams::interpolation_passes`].
pub const MAX_INTERPOLATION_PASSES: u32 = 8;

/// One texel of the hemisphere weight texture.
///
/// `color` scales the rendered radiance and `validity` scales its alpha.
#[derive(
    Debug, Clone, Copy, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable, Serialize, Deserialize,
)]
#[repr(C)]
pub struct HemisphereWeight {
    /// Weight applied to the RGB channels.
    pub color: f32,
    /// Weight applied to the alpha (coverage) channel.
    pub validity: f32,
}

impl HemisphereWeight {
    /// Creates a new weight pair.
    pub const fn new(color: f32, validity: f32) -> Self {
        Self { color, validity }
    }
}

/// Parameters of a lightmap bake.
///
/// ```
/// use lightmass_core::bake::LightSampleParams;
///
/// let params = LightSampleParams::from_ron_str("(hemisphere_size: 32, interpolation_passes: 1)")
///     .unwrap();
/// assert_eq!(params.hemisphere_size, 32);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightSampleParams {
    /// Edge length of the hemicube's center face, in pixels.
    pub hemisphere_size: u32,
    /// Near plane of the hemicube cameras.
    pub hemisphere_near: f32,
    /// Far plane of the hemicube cameras.
    pub hemisphere_far: f32,
    /// Number of refinement triples after the initial sampling pass.
    pub interpolation_passes: u32,
    /// Maximum per-channel deviation from the neighbor mean that still allows interpolation.
    pub interpolation_threshold: f32,
    /// Radiance of directions that hit no geometry.
    pub environment_color: LinearRgba,
    /// Precomputed weight texture (`3 * size` by `size`, row major).
    /// A cosine kernel is generated when absent.
    #[serde(skip)]
    pub hemisphere_weights: Option<Vec<HemisphereWeight>>,
    /// Seed of the tangent-frame jitter. Seeded from entropy when absent.
    pub seed: Option<u64>,
}

impl Default for LightSampleParams {
    fn default() -> Self {
        Self {
            hemisphere_size: 64,
            hemisphere_near: 0.001,
            hemisphere_far: 100.0,
            interpolation_passes: 2,
            interpolation_threshold: 1e-3,
            environment_color: LinearRgba::BLACK,
            hemisphere_weights: None,
            seed: None,
        }
    }
}

impl LightSampleParams {
    /// Parses parameters from RON text. Missing fields keep their defaults.
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        ron::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Number of weights a table for this hemisphere size must hold.
    pub fn weight_count(&self) -> usize {
        let size = self.hemisphere_size as usize;
        3 * size * size
    }

    /// Checks every parameter rule.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.hemisphere_near > 0.0) {
            return Err(ConfigError::InvalidNearPlane {
                near: self.hemisphere_near,
            });
        }
        if !(self.hemisphere_near < self.hemisphere_far) {
            return Err(ConfigError::InvalidDepthRange {
                near: self.hemisphere_near,
                far: self.hemisphere_far,
            });
        }
        if !SUPPORTED_HEMISPHERE_SIZES.contains(&self.hemisphere_size) {
            return Err(ConfigError::UnsupportedHemisphereSize(self.hemisphere_size));
        }
        if self.interpolation_passes > MAX_INTERPOLATION_PASSES {
            return Err(ConfigError::TooManyInterpolationPasses(
                self.interpolation_passes,
            ));
        }
        if !(self.interpolation_threshold >= 0.0) {
            return Err(ConfigError::InvalidInterpolationThreshold(
                self.interpolation_threshold,
            ));
        }
        if let Some(weights) = &self.hemisphere_weights {
            if weights.len() != self.weight_count() {
                return Err(ConfigError::WeightCountMismatch {
                    expected: self.weight_count(),
                    actual: weights.len(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(LightSampleParams::default().validate().is_ok());
    }

    #[test]
    fn near_plane_must_be_positive_and_before_far() {
        let mut params = LightSampleParams {
            hemisphere_near: 0.0,
            ..Default::default()
        };
        assert_eq!(
            params.validate(),
            Err(ConfigError::InvalidNearPlane { near: 0.0 })
        );
        params.hemisphere_near = 200.0;
        assert!(matches!(
            params.validate(),
            Err(ConfigError::InvalidDepthRange { .. })
        ));
    }

    #[test]
    fn only_power_of_two_sizes_between_16_and_512_are_accepted() {
        for size in SUPPORTED_HEMISPHERE_SIZES {
            let params = LightSampleParams {
                hemisphere_size: size,
                ..Default::default()
            };
            assert!(params.validate().is_ok(), "{size}");
        }
        for size in [0, 8, 48, 1024] {
            let params = LightSampleParams {
                hemisphere_size: size,
                ..Default::default()
            };
            assert_eq!(
                params.validate(),
                Err(ConfigError::UnsupportedHemisphereSize(size))
            );
        }
    }

    #[test]
    fn pass_count_and_threshold_are_bounded() {
        let params = LightSampleParams {
            interpolation_passes: 9,
            ..Default::default()
        };
        assert_eq!(
            params.validate(),
            Err(ConfigError::TooManyInterpolationPasses(9))
        );
        let params = LightSampleParams {
            interpolation_threshold: -0.5,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ConfigError::InvalidInterpolationThreshold(_))
        ));
    }

    #[test]
    fn weight_table_must_match_hemisphere_size() {
        let params = LightSampleParams {
            hemisphere_size: 16,
            hemisphere_weights: Some(vec![HemisphereWeight::default(); 10]),
            ..Default::default()
        };
        assert_eq!(
            params.validate(),
            Err(ConfigError::WeightCountMismatch {
                expected: 768,
                actual: 10
            })
        );
    }

    #[test]
    fn ron_overrides_only_named_fields() {
        let params = LightSampleParams::from_ron_str(
            "(hemisphere_far: 50.0, environment_color: (r: 0.5, g: 0.25, b: 1.0, a: 1.0), seed: Some(7))",
        )
        .unwrap();
        assert_eq!(params.hemisphere_far, 50.0);
        assert_eq!(params.environment_color, LinearRgba::rgb(0.5, 0.25, 1.0));
        assert_eq!(params.seed, Some(7));
        assert_eq!(params.hemisphere_size, 64);
    }

    #[test]
    fn malformed_ron_is_a_parse_error() {
        assert!(matches!(
            LightSampleParams::from_ron_str("(hemisphere_size: \"big\")"),
            Err(ConfigError::Parse(_))
        ));
    }
}
