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

//! The caller-owned float buffer a bake writes into.

use super::error::ConfigError;

/// A mutable, row-major lightmap of `width * height` texels with 1 to 4 channels.
///
/// A texel whose first channel is exactly `0.0` is unresolved; every value the
/// baker writes is at least [`f32::MIN_POSITIVE`] in its first channel.
#[derive(Debug)]
pub struct LightmapTarget<'a> {
    data: &'a mut [f32],
    width: u32,
    height: u32,
    channels: usize,
}

impl<'a> LightmapTarget<'a> {
    /// Binds `data` as a `width` by `height` lightmap.
    ///
    /// ## Errors
    /// * `ConfigError::UnsupportedChannelCount` - If `channels` is not in `1..=4`.
    /// * `ConfigError::LightmapTooSmall` - If `data` is shorter than the lightmap.
    pub fn new(
        data: &'a mut [f32],
        width: u32,
        height: u32,
        channels: usize,
    ) -> Result<Self, ConfigError> {
        if !(1..=4).contains(&channels) {
            return Err(ConfigError::UnsupportedChannelCount(channels));
        }
        let expected = width as usize * height as usize * channels;
        if data.len() < expected {
            return Err(ConfigError::LightmapTooSmall {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            channels,
        })
    }

    /// Width in texels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in texels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Channels per texel.
    pub fn channels(&self) -> usize {
        self.channels
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        (y as usize * self.width as usize + x as usize) * self.channels
    }

    /// The channels of one texel.
    pub fn texel(&self, x: u32, y: u32) -> &[f32] {
        let start = self.offset(x, y);
        &self.data[start..start + self.channels]
    }

    /// The channels of one texel, mutably.
    pub fn texel_mut(&mut self, x: u32, y: u32) -> &mut [f32] {
        let start = self.offset(x, y);
        let channels = self.channels;
        &mut self.data[start..start + channels]
    }

    /// Returns `true` once the texel holds a baked or interpolated value.
    ///
    /// Only the first channel is inspected. Baked values clamp it to at least
    /// [`f32::MIN_POSITIVE`] and interpolated ones average resolved texels,
    /// so a zero there always means unwritten.
    pub fn is_resolved(&self, x: u32, y: u32) -> bool {
        self.texel(x, y)[0] != 0.0
    }

    /// Stores linear irradiance into a texel according to the channel layout.
    ///
    /// One channel stores the mean of `rgb`; two channels add a coverage of
    /// `1.0`; three store `rgb`; four add a coverage of `1.0`. Color values are
    /// clamped below by [`f32::MIN_POSITIVE`].
    pub fn write_irradiance(&mut self, x: u32, y: u32, rgb: [f32; 3]) {
        let texel = self.texel_mut(x, y);
        let floor = |v: f32| v.max(f32::MIN_POSITIVE);
        match texel.len() {
            1 | 2 => {
                texel[0] = floor((rgb[0] + rgb[1] + rgb[2]) / 3.0);
            }
            _ => {
                texel[0] = floor(rgb[0]);
                texel[1] = floor(rgb[1]);
                texel[2] = floor(rgb[2]);
            }
        }
        if texel.len() == 2 || texel.len() == 4 {
            texel[texel.len() - 1] = 1.0;
        }
    }

    /// The whole buffer.
    pub fn as_slice(&self) -> &[f32] {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_channel_counts_and_short_buffers() {
        let mut data = vec![0.0; 16];
        assert_eq!(
            LightmapTarget::new(&mut data, 2, 2, 0).unwrap_err(),
            ConfigError::UnsupportedChannelCount(0)
        );
        assert_eq!(
            LightmapTarget::new(&mut data, 2, 2, 5).unwrap_err(),
            ConfigError::UnsupportedChannelCount(5)
        );
        assert_eq!(
            LightmapTarget::new(&mut data, 4, 4, 3).unwrap_err(),
            ConfigError::LightmapTooSmall {
                expected: 48,
                actual: 16
            }
        );
    }

    #[test]
    fn write_irradiance_follows_channel_layout() {
        let rgb = [0.3, 0.6, 0.9];
        let expected: [&[f32]; 4] = [
            &[0.6],
            &[0.6, 1.0],
            &[0.3, 0.6, 0.9],
            &[0.3, 0.6, 0.9, 1.0],
        ];
        for (i, want) in expected.iter().enumerate() {
            let channels = i + 1;
            let mut data = vec![0.0; 4 * channels];
            let mut lightmap = LightmapTarget::new(&mut data, 2, 2, channels).unwrap();
            lightmap.write_irradiance(1, 1, rgb);
            let got = lightmap.texel(1, 1);
            for (g, w) in got.iter().zip(want.iter()) {
                assert!((g - w).abs() < 1e-6, "{channels} channels: {got:?}");
            }
            assert!(!lightmap.is_resolved(0, 0));
            assert!(lightmap.is_resolved(1, 1));
        }
    }

    #[test]
    fn black_irradiance_still_marks_the_texel_resolved() {
        let mut data = vec![0.0; 3];
        let mut lightmap = LightmapTarget::new(&mut data, 1, 1, 3).unwrap();
        lightmap.write_irradiance(0, 0, [0.0, 0.0, 0.0]);
        assert!(lightmap.is_resolved(0, 0));
        assert_eq!(lightmap.texel(0, 0), &[f32::MIN_POSITIVE; 3]);
    }
}
