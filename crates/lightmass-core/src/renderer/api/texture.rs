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

//! Defines data structures related to texture resources.

use crate::math::Extent2D;
use std::borrow::Cow;

/// Defines the memory format of pixels in a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// Two 32-bit float components.
    Rg32Float,
    /// Four 32-bit float components.
    Rgba32Float,
    /// A 24-bit unsigned normalized depth format.
    Depth24Plus,
}

impl TextureFormat {
    /// Returns the size in bytes of a single pixel for this format.
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            TextureFormat::Rg32Float => 8,
            TextureFormat::Rgba32Float => 16,
            TextureFormat::Depth24Plus => 4,
        }
    }

    /// Returns `true` for depth formats.
    pub fn is_depth(&self) -> bool {
        matches!(self, TextureFormat::Depth24Plus)
    }
}

/// A set of flags describing the allowed usages of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextureUsage {
    bits: u32,
}

impl TextureUsage {
    /// The texture can be used as the source of a copy operation.
    pub const COPY_SRC: Self = Self { bits: 1 << 0 };
    /// The texture can be used as the destination of a copy or write operation.
    pub const COPY_DST: Self = Self { bits: 1 << 1 };
    /// The texture can be bound for reading in a shader.
    pub const TEXTURE_BINDING: Self = Self { bits: 1 << 2 };
    /// The texture can be used as a color or depth attachment.
    pub const RENDER_ATTACHMENT: Self = Self { bits: 1 << 4 };

    /// Returns the raw bits.
    pub const fn bits(&self) -> u32 {
        self.bits
    }

    /// Checks if all flags of `other` are set.
    pub const fn contains(&self, other: Self) -> bool {
        (self.bits & other.bits) == other.bits
    }
}

impl std::ops::BitOr for TextureUsage {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self {
            bits: self.bits | rhs.bits,
        }
    }
}

/// A descriptor used to create a 2D texture.
#[derive(Debug, Clone)]
pub struct TextureDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The size of the texture in pixels.
    pub size: Extent2D,
    /// The pixel format.
    pub format: TextureFormat,
    /// How the texture will be used.
    pub usage: TextureUsage,
}

/// An opaque handle to a GPU texture resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_flags_combine() {
        let usage = TextureUsage::RENDER_ATTACHMENT | TextureUsage::TEXTURE_BINDING;
        assert!(usage.contains(TextureUsage::RENDER_ATTACHMENT));
        assert!(usage.contains(TextureUsage::TEXTURE_BINDING));
        assert!(!usage.contains(TextureUsage::COPY_SRC));
        assert!(!usage.contains(TextureUsage::COPY_SRC | TextureUsage::TEXTURE_BINDING));
    }

    #[test]
    fn float_formats_report_their_size() {
        assert_eq!(TextureFormat::Rgba32Float.bytes_per_pixel(), 16);
        assert_eq!(TextureFormat::Rg32Float.bytes_per_pixel(), 8);
        assert!(TextureFormat::Depth24Plus.is_depth());
    }
}
