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

//! Errors raised while validating bake inputs.

use std::fmt;

/// An invalid bake configuration or lightmap binding.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// `hemisphere_near` must be strictly positive.
    InvalidNearPlane {
        /// The rejected near distance.
        near: f32,
    },
    /// `hemisphere_near` must be smaller than `hemisphere_far`.
    InvalidDepthRange {
        /// The near distance.
        near: f32,
        /// The far distance.
        far: f32,
    },
    /// The hemisphere tile size is not one of the supported powers of two.
    UnsupportedHemisphereSize(u32),
    /// More interpolation passes than the schedule supports.
    TooManyInterpolationPasses(u32),
    /// The interpolation threshold is negative or NaN.
    InvalidInterpolationThreshold(f32),
    /// Lightmaps hold between one and four channels.
    UnsupportedChannelCount(usize),
    /// The lightmap buffer is shorter than `width * height * channels`.
    LightmapTooSmall {
        /// Number of floats required.
        expected: usize,
        /// Number of floats supplied.
        actual: usize,
    },
    /// A weight table does not match the hemisphere size.
    WeightCountMismatch {
        /// Number of weights required (`3 * size * size`).
        expected: usize,
        /// Number of weights supplied.
        actual: usize,
    },
    /// The configuration text could not be parsed.
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidNearPlane { near } => {
                write!(f, "Hemisphere near plane must be positive, got {near}")
            }
            ConfigError::InvalidDepthRange { near, far } => {
                write!(f, "Hemisphere near plane ({near}) must be closer than the far plane ({far})")
            }
            ConfigError::UnsupportedHemisphereSize(size) => write!(
                f,
                "Unsupported hemisphere size {size}, expected one of 16, 32, 64, 128, 256 or 512"
            ),
            ConfigError::TooManyInterpolationPasses(passes) => {
                write!(f, "At most 8 interpolation passes are supported, got {passes}")
            }
            ConfigError::InvalidInterpolationThreshold(threshold) => {
                write!(f, "Interpolation threshold must be non-negative, got {threshold}")
            }
            ConfigError::UnsupportedChannelCount(channels) => {
                write!(f, "Lightmaps must have 1 to 4 channels, got {channels}")
            }
            ConfigError::LightmapTooSmall { expected, actual } => write!(
                f,
                "Lightmap buffer holds {actual} floats, {expected} are required"
            ),
            ConfigError::WeightCountMismatch { expected, actual } => write!(
                f,
                "Hemisphere weight table has {actual} entries, {expected} are required"
            ),
            ConfigError::Parse(msg) => write!(f, "Failed to parse bake configuration: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// A mesh view that cannot be decoded safely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// Indices must be integers.
    InvalidIndexType,
    /// The element count does not describe whole triangles.
    IncompleteTriangle {
        /// The supplied element count.
        count: usize,
    },
    /// An element lies outside its byte slice.
    ElementOutOfBounds {
        /// The stream that is too short.
        stream: &'static str,
        /// The first element that does not fit.
        index: usize,
    },
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryError::InvalidIndexType => write!(f, "Indices must be u8, u16 or u32"),
            GeometryError::IncompleteTriangle { count } => {
                write!(f, "Element count {count} is not a multiple of 3")
            }
            GeometryError::ElementOutOfBounds { stream, index } => {
                write!(f, "Element {index} lies outside the {stream} stream")
            }
        }
    }
}

impl std::error::Error for GeometryError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        assert_eq!(
            ConfigError::InvalidDepthRange { near: 2.0, far: 1.0 }.to_string(),
            "Hemisphere near plane (2) must be closer than the far plane (1)"
        );
        assert_eq!(
            ConfigError::UnsupportedChannelCount(5).to_string(),
            "Lightmaps must have 1 to 4 channels, got 5"
        );
    }

    #[test]
    fn geometry_error_display() {
        let err = GeometryError::ElementOutOfBounds {
            stream: "position",
            index: 7,
        };
        assert_eq!(err.to_string(), "Element 7 lies outside the position stream");
    }
}
