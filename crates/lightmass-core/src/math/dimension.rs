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

//! Provides integer extents and rectangles for texture and framebuffer regions.

/// A two-dimensional extent, typically representing width and height.
///
/// This is commonly used for texture dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent2D {
    /// The width component of the extent.
    pub width: u32,
    /// The height component of the extent.
    pub height: u32,
}

impl Extent2D {
    /// Creates a new extent.
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of texels covered by the extent.
    #[inline]
    pub const fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// A pixel rectangle inside a framebuffer.
///
/// The origin is the top-left corner of the framebuffer; `y` grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Viewport {
    /// Left edge, in pixels.
    pub x: u32,
    /// Top edge, in pixels.
    pub y: u32,
    /// Width, in pixels.
    pub width: u32,
    /// Height, in pixels.
    pub height: u32,
}

impl Viewport {
    /// Creates a new viewport.
    #[inline]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The extent of the rectangle.
    #[inline]
    pub const fn extent(&self) -> Extent2D {
        Extent2D::new(self.width, self.height)
    }

    /// Returns `true` if the rectangle lies inside `extent`.
    #[inline]
    pub fn fits_in(&self, extent: Extent2D) -> bool {
        self.x as u64 + self.width as u64 <= extent.width as u64
            && self.y as u64 + self.height as u64 <= extent.height as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_fits_in_checks_both_axes() {
        let target = Extent2D::new(96, 32);
        assert!(Viewport::new(48, 16, 48, 16).fits_in(target));
        assert!(!Viewport::new(49, 0, 48, 16).fits_in(target));
        assert!(!Viewport::new(0, 17, 8, 16).fits_in(target));
    }
}
