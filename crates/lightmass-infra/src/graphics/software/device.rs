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

use super::kernels::{self, TexelImage};
use lightmass_core::math::{Extent2D, LinearRgba, Viewport};
use lightmass_core::renderer::{
    BufferDescriptor, BufferId, BufferUsage, FramebufferDescriptor, FramebufferId,
    FullscreenDraw, FullscreenKernel, GraphicsDevice, ResourceError, ShaderError,
    ShaderProgramDescriptor, ShaderProgramId, TextureDescriptor, TextureFormat, TextureId,
    TextureUsage,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug)]
struct SoftwareTexture {
    format: TextureFormat,
    usage: TextureUsage,
    image: TexelImage,
}

#[derive(Debug, Clone, Copy)]
struct SoftwareFramebuffer {
    color: TextureId,
    depth: Option<TextureId>,
}

#[derive(Debug, Clone, Copy)]
struct SoftwareProgram {
    kernel: FullscreenKernel,
    input_count: u32,
}

#[derive(Debug)]
struct SoftwareBuffer {
    usage: BufferUsage,
    data: Vec<u8>,
}

/// A [`GraphicsDevice`] that keeps every resource in host memory.
///
/// Besides the device contract it exposes a few inspection and fault
/// injection helpers for tests, such as [`SoftwareDevice::fill_viewport`]
/// which stands in for rasterizing a scene.
#[derive(Debug, Default)]
pub struct SoftwareDevice {
    textures: Mutex<HashMap<TextureId, SoftwareTexture>>,
    framebuffers: Mutex<HashMap<FramebufferId, SoftwareFramebuffer>>,
    programs: Mutex<HashMap<ShaderProgramId, SoftwareProgram>>,
    buffers: Mutex<HashMap<BufferId, SoftwareBuffer>>,

    next_texture_id: AtomicUsize,
    next_framebuffer_id: AtomicUsize,
    next_program_id: AtomicUsize,
    next_buffer_id: AtomicUsize,

    failing_programs: Mutex<HashSet<String>>,
    fail_next_map: AtomicBool,
    draw_count: AtomicUsize,
}

impl SoftwareDevice {
    /// Creates an empty device.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fills `region` of a color texture with `color`.
    pub fn fill_viewport(
        &self,
        texture: TextureId,
        region: Viewport,
        color: LinearRgba,
    ) -> Result<(), ResourceError> {
        let mut textures = self.textures.lock().unwrap();
        let texture = textures.get_mut(&texture).ok_or(ResourceError::NotFound)?;
        if texture.format.is_depth() {
            return Err(ResourceError::InvalidHandle);
        }
        if !texture.image.contains(region) {
            return Err(ResourceError::OutOfBounds);
        }
        texture.image.fill(region, color.to_array());
        Ok(())
    }

    /// Copies the texels of a texture, row-major.
    pub fn read_texture(&self, texture: TextureId) -> Result<Vec<[f32; 4]>, ResourceError> {
        let textures = self.textures.lock().unwrap();
        let texture = textures.get(&texture).ok_or(ResourceError::NotFound)?;
        Ok(texture.image.texels.clone())
    }

    /// Makes every later program created with `label` fail to compile.
    pub fn fail_program(&self, label: &str) {
        self.failing_programs
            .lock()
            .unwrap()
            .insert(label.to_owned());
    }

    /// Makes the next `map_buffer_read` fail.
    pub fn fail_next_map(&self) {
        self.fail_next_map.store(true, Ordering::Relaxed);
    }

    /// Number of resources not yet destroyed.
    pub fn live_resource_count(&self) -> usize {
        self.textures.lock().unwrap().len()
            + self.framebuffers.lock().unwrap().len()
            + self.programs.lock().unwrap().len()
            + self.buffers.lock().unwrap().len()
    }

    /// Number of fullscreen draws executed so far.
    pub fn draw_count(&self) -> usize {
        self.draw_count.load(Ordering::Relaxed)
    }

    fn framebuffer(&self, id: FramebufferId) -> Result<SoftwareFramebuffer, ResourceError> {
        self.framebuffers
            .lock()
            .unwrap()
            .get(&id)
            .copied()
            .ok_or(ResourceError::NotFound)
    }

    fn incomplete(descriptor: &FramebufferDescriptor, reason: &str) -> ResourceError {
        ResourceError::IncompleteFramebuffer {
            label: descriptor.label.as_deref().unwrap_or("unnamed").to_owned(),
            reason: reason.to_owned(),
        }
    }
}

impl GraphicsDevice for SoftwareDevice {
    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<TextureId, ResourceError> {
        if descriptor.size.area() == 0 {
            return Err(ResourceError::BackendError(format!(
                "texture '{}' has a zero-sized extent",
                descriptor.label.as_deref().unwrap_or("unnamed")
            )));
        }
        let id = TextureId(self.next_texture_id.fetch_add(1, Ordering::Relaxed));
        self.textures.lock().unwrap().insert(
            id,
            SoftwareTexture {
                format: descriptor.format,
                usage: descriptor.usage,
                image: TexelImage::new(descriptor.size),
            },
        );
        log::debug!(
            "SoftwareDevice: created {}x{} {:?} texture {id:?}",
            descriptor.size.width,
            descriptor.size.height,
            descriptor.format
        );
        Ok(id)
    }

    fn destroy_texture(&self, id: TextureId) -> Result<(), ResourceError> {
        self.textures
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(ResourceError::NotFound)
    }

    fn write_texture(
        &self,
        id: TextureId,
        data: &[u8],
        bytes_per_row: u32,
        size: Extent2D,
    ) -> Result<(), ResourceError> {
        let mut textures = self.textures.lock().unwrap();
        let texture = textures.get_mut(&id).ok_or(ResourceError::NotFound)?;
        if !texture.usage.contains(TextureUsage::COPY_DST) {
            return Err(ResourceError::InvalidHandle);
        }
        let channels = match texture.format {
            TextureFormat::Rg32Float => 2,
            TextureFormat::Rgba32Float => 4,
            TextureFormat::Depth24Plus => return Err(ResourceError::InvalidHandle),
        };
        let region = Viewport::new(0, 0, size.width, size.height);
        let row_bytes = size.width as usize * channels * 4;
        let needed = match size.height {
            0 => 0,
            rows => (rows as usize - 1) * bytes_per_row as usize + row_bytes,
        };
        if !texture.image.contains(region)
            || (bytes_per_row as usize) < row_bytes
            || data.len() < needed
        {
            return Err(ResourceError::OutOfBounds);
        }

        let mut values = Vec::with_capacity(size.area());
        for row in 0..size.height as usize {
            let start = row * bytes_per_row as usize;
            for texel in data[start..start + row_bytes].chunks_exact(channels * 4) {
                let mut value = [0.0f32; 4];
                for (channel, bytes) in value.iter_mut().zip(texel.chunks_exact(4)) {
                    *channel = bytemuck::pod_read_unaligned(bytes);
                }
                values.push(value);
            }
        }
        texture.image.write_region(region, &values);
        Ok(())
    }

    fn create_framebuffer(
        &self,
        descriptor: &FramebufferDescriptor,
    ) -> Result<FramebufferId, ResourceError> {
        {
            let textures = self.textures.lock().unwrap();
            let color = textures
                .get(&descriptor.color)
                .ok_or_else(|| Self::incomplete(descriptor, "unknown color attachment"))?;
            if color.format.is_depth() || !color.usage.contains(TextureUsage::RENDER_ATTACHMENT) {
                return Err(Self::incomplete(descriptor, "color attachment is not renderable"));
            }
            if let Some(depth) = descriptor.depth {
                let depth = textures
                    .get(&depth)
                    .ok_or_else(|| Self::incomplete(descriptor, "unknown depth attachment"))?;
                if !depth.format.is_depth() {
                    return Err(Self::incomplete(descriptor, "depth attachment is not a depth format"));
                }
                if depth.image.size != color.image.size {
                    return Err(Self::incomplete(descriptor, "attachment sizes differ"));
                }
            }
        }

        let id = FramebufferId(self.next_framebuffer_id.fetch_add(1, Ordering::Relaxed));
        self.framebuffers.lock().unwrap().insert(
            id,
            SoftwareFramebuffer {
                color: descriptor.color,
                depth: descriptor.depth,
            },
        );
        Ok(id)
    }

    fn destroy_framebuffer(&self, id: FramebufferId) -> Result<(), ResourceError> {
        self.framebuffers
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(ResourceError::NotFound)
    }

    fn create_shader_program(
        &self,
        descriptor: &ShaderProgramDescriptor,
    ) -> Result<ShaderProgramId, ResourceError> {
        let label = descriptor.label.unwrap_or("unnamed");
        if self.failing_programs.lock().unwrap().contains(label) {
            return Err(ShaderError::CompilationError {
                label: label.to_owned(),
                details: "compilation failure injected by the software device".to_owned(),
            }
            .into());
        }
        let expected_inputs = match descriptor.kernel {
            FullscreenKernel::WeightedDownsample => 2,
            FullscreenKernel::BoxDownsample => 1,
        };
        if descriptor.input_count != expected_inputs {
            return Err(ShaderError::CompilationError {
                label: label.to_owned(),
                details: format!(
                    "{:?} reads {expected_inputs} inputs, {} were declared",
                    descriptor.kernel, descriptor.input_count
                ),
            }
            .into());
        }

        let id = ShaderProgramId(self.next_program_id.fetch_add(1, Ordering::Relaxed));
        self.programs.lock().unwrap().insert(
            id,
            SoftwareProgram {
                kernel: descriptor.kernel,
                input_count: descriptor.input_count,
            },
        );
        log::debug!("SoftwareDevice: created program '{label}' as {id:?}");
        Ok(id)
    }

    fn destroy_shader_program(&self, id: ShaderProgramId) -> Result<(), ResourceError> {
        self.programs
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(ResourceError::NotFound)
    }

    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<BufferId, ResourceError> {
        let size = usize::try_from(descriptor.size).map_err(|_| ResourceError::OutOfBounds)?;
        let id = BufferId(self.next_buffer_id.fetch_add(1, Ordering::Relaxed));
        self.buffers.lock().unwrap().insert(
            id,
            SoftwareBuffer {
                usage: descriptor.usage,
                data: vec![0; size],
            },
        );
        Ok(id)
    }

    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError> {
        self.buffers
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(ResourceError::NotFound)
    }

    fn clear_framebuffer(&self, id: FramebufferId, color: LinearRgba) -> Result<(), ResourceError> {
        let framebuffer = self.framebuffer(id)?;
        let mut textures = self.textures.lock().unwrap();
        textures
            .get_mut(&framebuffer.color)
            .ok_or(ResourceError::NotFound)?
            .image
            .clear(color);
        if let Some(depth) = framebuffer.depth {
            textures
                .get_mut(&depth)
                .ok_or(ResourceError::NotFound)?
                .image
                .clear(LinearRgba::new(1.0, 0.0, 0.0, 0.0));
        }
        Ok(())
    }

    fn draw_fullscreen(&self, draw: &FullscreenDraw) -> Result<(), ResourceError> {
        let target = self.framebuffer(draw.target)?;
        let program = self
            .programs
            .lock()
            .unwrap()
            .get(&draw.program)
            .copied()
            .ok_or(ShaderError::NotFound { id: draw.program })?;
        if draw.inputs.len() != program.input_count as usize {
            return Err(ResourceError::InvalidHandle);
        }

        let mut textures = self.textures.lock().unwrap();
        let input = |index: usize| textures.get(&draw.inputs[index]).ok_or(ResourceError::NotFound);
        let values = match program.kernel {
            FullscreenKernel::WeightedDownsample => {
                kernels::weighted_downsample(&input(0)?.image, &input(1)?.image, draw.viewport)
            }
            FullscreenKernel::BoxDownsample => kernels::box_downsample(&input(0)?.image, draw.viewport),
        };

        let target = textures.get_mut(&target.color).ok_or(ResourceError::NotFound)?;
        if !target.image.contains(draw.viewport) {
            return Err(ResourceError::OutOfBounds);
        }
        target.image.write_region(draw.viewport, &values);
        self.draw_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn copy_framebuffer(
        &self,
        source: FramebufferId,
        destination: FramebufferId,
        region: Viewport,
    ) -> Result<(), ResourceError> {
        let source = self.framebuffer(source)?;
        let destination = self.framebuffer(destination)?;
        let mut textures = self.textures.lock().unwrap();
        let source = textures.get(&source.color).ok_or(ResourceError::NotFound)?;
        if !source.image.contains(region) {
            return Err(ResourceError::OutOfBounds);
        }
        let values = source.image.read_region(region);
        let destination = textures
            .get_mut(&destination.color)
            .ok_or(ResourceError::NotFound)?;
        if !destination.image.contains(region) {
            return Err(ResourceError::OutOfBounds);
        }
        destination.image.write_region(region, &values);
        Ok(())
    }

    fn read_pixels_async(
        &self,
        source: FramebufferId,
        region: Viewport,
        destination: BufferId,
    ) -> Result<(), ResourceError> {
        let source = self.framebuffer(source)?;
        let values = {
            let textures = self.textures.lock().unwrap();
            let source = textures.get(&source.color).ok_or(ResourceError::NotFound)?;
            if !source.image.contains(region) {
                return Err(ResourceError::OutOfBounds);
            }
            source.image.read_region(region)
        };

        let bytes: &[u8] = bytemuck::cast_slice(&values);
        let mut buffers = self.buffers.lock().unwrap();
        let buffer = buffers.get_mut(&destination).ok_or(ResourceError::NotFound)?;
        if !buffer.usage.contains(BufferUsage::COPY_DST) {
            return Err(ResourceError::InvalidHandle);
        }
        let target = buffer
            .data
            .get_mut(..bytes.len())
            .ok_or(ResourceError::OutOfBounds)?;
        target.copy_from_slice(bytes);
        Ok(())
    }

    fn map_buffer_read(
        &self,
        id: BufferId,
        reader: &mut dyn FnMut(&[u8]),
    ) -> Result<(), ResourceError> {
        if self.fail_next_map.swap(false, Ordering::Relaxed) {
            return Err(ResourceError::MapFailed(
                "mapping failure injected by the software device".to_owned(),
            ));
        }
        let buffers = self.buffers.lock().unwrap();
        let buffer = buffers.get(&id).ok_or(ResourceError::NotFound)?;
        if !buffer.usage.contains(BufferUsage::MAP_READ) {
            return Err(ResourceError::MapFailed(format!("{id:?} is not mappable")));
        }
        reader(&buffer.data);
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;
    use std::sync::Arc;

    fn color_texture(device: &SoftwareDevice, width: u32, height: u32) -> TextureId {
        device
            .create_texture(&TextureDescriptor {
                label: Some(Cow::Borrowed("color")),
                size: Extent2D::new(width, height),
                format: TextureFormat::Rgba32Float,
                usage: TextureUsage::RENDER_ATTACHMENT | TextureUsage::COPY_DST,
            })
            .unwrap()
    }

    #[test]
    fn resources_are_tracked_until_destroyed() {
        let device = SoftwareDevice::new();
        let texture = color_texture(&device, 4, 4);
        let framebuffer = device
            .create_framebuffer(&FramebufferDescriptor {
                label: None,
                color: texture,
                depth: None,
            })
            .unwrap();
        assert_eq!(device.live_resource_count(), 2);

        device.destroy_framebuffer(framebuffer).unwrap();
        device.destroy_texture(texture).unwrap();
        assert_eq!(device.live_resource_count(), 0);
        assert!(matches!(device.destroy_texture(texture), Err(ResourceError::NotFound)));
    }

    #[test]
    fn trait_objects_downcast_to_the_software_device() {
        let device: Arc<dyn GraphicsDevice> = Arc::new(SoftwareDevice::new());
        let texture = device
            .create_texture(&TextureDescriptor {
                label: None,
                size: Extent2D::new(2, 2),
                format: TextureFormat::Rgba32Float,
                usage: TextureUsage::RENDER_ATTACHMENT,
            })
            .unwrap();
        let software = device.as_any().downcast_ref::<SoftwareDevice>().unwrap();
        software
            .fill_viewport(texture, Viewport::new(1, 0, 1, 2), LinearRgba::WHITE)
            .unwrap();
        assert_eq!(software.read_texture(texture).unwrap()[1], [1.0; 4]);
    }

    #[test]
    fn framebuffers_need_renderable_color() {
        let device = SoftwareDevice::new();
        let texture = device
            .create_texture(&TextureDescriptor {
                label: None,
                size: Extent2D::new(4, 4),
                format: TextureFormat::Rgba32Float,
                usage: TextureUsage::COPY_DST,
            })
            .unwrap();
        let err = device
            .create_framebuffer(&FramebufferDescriptor {
                label: Some(Cow::Borrowed("bad")),
                color: texture,
                depth: None,
            })
            .unwrap_err();
        assert!(matches!(err, ResourceError::IncompleteFramebuffer { .. }));
    }

    #[test]
    fn write_texture_honours_row_stride() {
        let device = SoftwareDevice::new();
        let texture = device
            .create_texture(&TextureDescriptor {
                label: None,
                size: Extent2D::new(2, 2),
                format: TextureFormat::Rg32Float,
                usage: TextureUsage::TEXTURE_BINDING | TextureUsage::COPY_DST,
            })
            .unwrap();
        // Two texels per row plus 8 bytes of padding.
        let mut data = Vec::new();
        for row in [[1.0f32, 2.0, 3.0, 4.0, 0.0, 0.0], [5.0, 6.0, 7.0, 8.0, 0.0, 0.0]] {
            data.extend_from_slice(bytemuck::cast_slice(&row));
        }
        device
            .write_texture(texture, &data, 24, Extent2D::new(2, 2))
            .unwrap();
        let texels = device.read_texture(texture).unwrap();
        assert_eq!(texels[1], [3.0, 4.0, 0.0, 0.0]);
        assert_eq!(texels[2], [5.0, 6.0, 0.0, 0.0]);
    }

    #[test]
    fn readback_packs_the_region_tightly() {
        let device = SoftwareDevice::new();
        let texture = color_texture(&device, 4, 4);
        let framebuffer = device
            .create_framebuffer(&FramebufferDescriptor {
                label: None,
                color: texture,
                depth: None,
            })
            .unwrap();
        device
            .fill_viewport(texture, Viewport::new(1, 1, 1, 1), LinearRgba::new(1.0, 2.0, 3.0, 4.0))
            .unwrap();
        let buffer = device
            .create_buffer(&BufferDescriptor {
                label: None,
                size: 4 * 16,
                usage: BufferUsage::MAP_READ | BufferUsage::COPY_DST,
            })
            .unwrap();
        device
            .read_pixels_async(framebuffer, Viewport::new(0, 0, 2, 2), buffer)
            .unwrap();

        let mut texels = Vec::new();
        device
            .map_buffer_read(buffer, &mut |bytes| {
                texels = bytes
                    .chunks_exact(16)
                    .map(bytemuck::pod_read_unaligned::<[f32; 4]>)
                    .collect();
            })
            .unwrap();
        assert_eq!(texels[3], [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(texels[0], [0.0; 4]);
    }

    #[test]
    fn injected_failures_fire_once() {
        let device = SoftwareDevice::new();
        let buffer = device
            .create_buffer(&BufferDescriptor {
                label: None,
                size: 16,
                usage: BufferUsage::MAP_READ | BufferUsage::COPY_DST,
            })
            .unwrap();
        device.fail_next_map();
        assert!(matches!(
            device.map_buffer_read(buffer, &mut |_| {}),
            Err(ResourceError::MapFailed(_))
        ));
        assert!(device.map_buffer_read(buffer, &mut |_| {}).is_ok());
    }
}
