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
use lightmass_core::renderer::{BufferUsage, TextureFormat, TextureUsage};

/// A local extension trait to convert baker types into WGPU-compatible types.
/// This avoids Rust's orphan rules while keeping an idiomatic `.into_wgpu()` syntax.
pub trait IntoWgpu<T> {
    /// Consumes self and converts it into a WGPU-compatible type.
    fn into_wgpu(self) -> T;
}

// --- Dimensions and Origins ---

impl IntoWgpu<wgpu::Extent3d> for Extent2D {
    fn into_wgpu(self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        }
    }
}

impl IntoWgpu<wgpu::Origin3d> for Viewport {
    fn into_wgpu(self) -> wgpu::Origin3d {
        wgpu::Origin3d {
            x: self.x,
            y: self.y,
            z: 0,
        }
    }
}

// --- Formats and Usages ---

impl IntoWgpu<wgpu::TextureFormat> for TextureFormat {
    fn into_wgpu(self) -> wgpu::TextureFormat {
        match self {
            TextureFormat::Rg32Float => wgpu::TextureFormat::Rg32Float,
            TextureFormat::Rgba32Float => wgpu::TextureFormat::Rgba32Float,
            TextureFormat::Depth24Plus => wgpu::TextureFormat::Depth24Plus,
        }
    }
}

impl IntoWgpu<wgpu::TextureUsages> for TextureUsage {
    fn into_wgpu(self) -> wgpu::TextureUsages {
        let mut usages = wgpu::TextureUsages::empty();
        if self.contains(TextureUsage::COPY_SRC) {
            usages |= wgpu::TextureUsages::COPY_SRC;
        }
        if self.contains(TextureUsage::COPY_DST) {
            usages |= wgpu::TextureUsages::COPY_DST;
        }
        if self.contains(TextureUsage::TEXTURE_BINDING) {
            usages |= wgpu::TextureUsages::TEXTURE_BINDING;
        }
        if self.contains(TextureUsage::RENDER_ATTACHMENT) {
            usages |= wgpu::TextureUsages::RENDER_ATTACHMENT;
        }
        usages
    }
}

impl IntoWgpu<wgpu::BufferUsages> for BufferUsage {
    fn into_wgpu(self) -> wgpu::BufferUsages {
        let mut usages = wgpu::BufferUsages::empty();
        if self.contains(BufferUsage::MAP_READ) {
            usages |= wgpu::BufferUsages::MAP_READ;
        }
        if self.contains(BufferUsage::COPY_DST) {
            usages |= wgpu::BufferUsages::COPY_DST;
        }
        usages
    }
}

// --- Colors ---

impl IntoWgpu<wgpu::Color> for LinearRgba {
    fn into_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: self.a as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usages_map_flag_by_flag() {
        let usage = (TextureUsage::RENDER_ATTACHMENT | TextureUsage::COPY_SRC).into_wgpu();
        assert_eq!(
            usage,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC
        );
        let usage = (BufferUsage::MAP_READ | BufferUsage::COPY_DST).into_wgpu();
        assert_eq!(usage, wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST);
    }

    #[test]
    fn extents_are_single_layer() {
        let extent: wgpu::Extent3d = Extent2D::new(48, 16).into_wgpu();
        assert_eq!(extent.depth_or_array_layers, 1);
        assert_eq!((extent.width, extent.height), (48, 16));
    }
}
