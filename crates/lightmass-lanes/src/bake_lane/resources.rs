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

//! GPU resources of a bake, released on drop.

use super::error::BakeError;
use super::hemicube::HemisphereGrid;
use super::shaders::{
    FRAGMENT_ENTRY_POINT, HEMISPHERE_DOWNSAMPLE_WGSL, HEMISPHERE_FIRST_PASS_WGSL,
    VERTEX_ENTRY_POINT,
};
use lightmass_core::bake::HemisphereWeight;
use lightmass_core::math::Extent2D;
use lightmass_core::renderer::{
    BufferDescriptor, BufferId, BufferUsage, FramebufferDescriptor, FramebufferId,
    FullscreenKernel, GraphicsDevice, ResourceError, ShaderProgramDescriptor, ShaderProgramId,
    ShaderSourceData, TextureDescriptor, TextureFormat, TextureId, TextureUsage,
};
use std::borrow::Cow;
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
enum OwnedResource {
    Texture(TextureId),
    Framebuffer(FramebufferId),
    Program(ShaderProgramId),
    Buffer(BufferId),
}

/// Every resource created through the arena is destroyed, newest first, when
/// the arena is dropped.
#[derive(Debug)]
pub(crate) struct ResourceArena {
    device: Arc<dyn GraphicsDevice>,
    owned: Vec<OwnedResource>,
}

impl ResourceArena {
    pub(crate) fn new(device: Arc<dyn GraphicsDevice>) -> Self {
        Self {
            device,
            owned: Vec::new(),
        }
    }

    pub(crate) fn device(&self) -> &dyn GraphicsDevice {
        self.device.as_ref()
    }

    pub(crate) fn texture(
        &mut self,
        descriptor: &TextureDescriptor,
    ) -> Result<TextureId, ResourceError> {
        let id = self.device.create_texture(descriptor)?;
        self.owned.push(OwnedResource::Texture(id));
        Ok(id)
    }

    pub(crate) fn framebuffer(
        &mut self,
        descriptor: &FramebufferDescriptor,
    ) -> Result<FramebufferId, ResourceError> {
        let id = self.device.create_framebuffer(descriptor)?;
        self.owned.push(OwnedResource::Framebuffer(id));
        Ok(id)
    }

    pub(crate) fn program(
        &mut self,
        descriptor: &ShaderProgramDescriptor,
    ) -> Result<ShaderProgramId, ResourceError> {
        let id = self.device.create_shader_program(descriptor)?;
        self.owned.push(OwnedResource::Program(id));
        Ok(id)
    }

    pub(crate) fn buffer(&mut self, descriptor: &BufferDescriptor) -> Result<BufferId, ResourceError> {
        let id = self.device.create_buffer(descriptor)?;
        self.owned.push(OwnedResource::Buffer(id));
        Ok(id)
    }

    fn release_all(&mut self) {
        while let Some(resource) = self.owned.pop() {
            let result = match resource {
                OwnedResource::Texture(id) => self.device.destroy_texture(id),
                OwnedResource::Framebuffer(id) => self.device.destroy_framebuffer(id),
                OwnedResource::Program(id) => self.device.destroy_shader_program(id),
                OwnedResource::Buffer(id) => self.device.destroy_buffer(id),
            };
            if let Err(e) = result {
                log::warn!("LightMassBaking: failed to release {resource:?}: {e}");
            }
        }
    }
}

impl Drop for ResourceArena {
    fn drop(&mut self) {
        self.release_all();
    }
}

/// The framebuffers, programs and readback buffer of a hemicube batch.
///
/// Framebuffer A (index 0) receives the rendered hemicubes and has a depth
/// attachment. Framebuffer B (index 1) is half its size. Reductions ping-pong
/// between both, and the fully reduced grid is read back from B.
#[derive(Debug)]
pub(crate) struct HemisphereResources {
    pub(crate) grid: HemisphereGrid,
    pub(crate) color: [TextureId; 2],
    pub(crate) depth: TextureId,
    pub(crate) framebuffers: [FramebufferId; 2],
    pub(crate) weights: TextureId,
    pub(crate) first_pass: ShaderProgramId,
    pub(crate) downsample: ShaderProgramId,
    pub(crate) transfer: BufferId,
    arena: ResourceArena,
}

impl HemisphereResources {
    /// Allocates everything a batch of `grid` needs.
    ///
    /// On failure, the resources created so far are released before returning.
    pub(crate) fn create(
        device: Arc<dyn GraphicsDevice>,
        grid: HemisphereGrid,
    ) -> Result<Self, BakeError> {
        let mut arena = ResourceArena::new(device);
        let extents = [grid.full_extent(), grid.half_extent()];
        let target_usage = TextureUsage::RENDER_ATTACHMENT
            | TextureUsage::TEXTURE_BINDING
            | TextureUsage::COPY_SRC
            | TextureUsage::COPY_DST;

        let mut color = [TextureId(0); 2];
        for (i, extent) in extents.iter().enumerate() {
            color[i] = arena
                .texture(&TextureDescriptor {
                    label: Some(Cow::Owned(format!("hemisphere_color_{i}"))),
                    size: *extent,
                    format: TextureFormat::Rgba32Float,
                    usage: target_usage,
                })
                .map_err(BakeError::resource("Could not create hemisphere texture"))?;
        }
        let depth = arena
            .texture(&TextureDescriptor {
                label: Some(Cow::Borrowed("hemisphere_depth")),
                size: extents[0],
                format: TextureFormat::Depth24Plus,
                usage: TextureUsage::RENDER_ATTACHMENT,
            })
            .map_err(BakeError::resource("Could not create hemisphere depth buffer"))?;

        let mut framebuffers = [FramebufferId(0); 2];
        for i in 0..2 {
            framebuffers[i] = arena
                .framebuffer(&FramebufferDescriptor {
                    label: Some(Cow::Owned(format!("hemisphere_framebuffer_{i}"))),
                    color: color[i],
                    depth: (i == 0).then_some(depth),
                })
                .map_err(BakeError::resource("Could not create framebuffer"))?;
        }

        let first_pass = arena
            .program(&ShaderProgramDescriptor {
                label: Some("hemisphere_first_pass"),
                source: ShaderSourceData::Wgsl(Cow::Borrowed(HEMISPHERE_FIRST_PASS_WGSL)),
                vertex_entry_point: VERTEX_ENTRY_POINT,
                fragment_entry_point: FRAGMENT_ENTRY_POINT,
                input_count: 2,
                target_format: TextureFormat::Rgba32Float,
                kernel: FullscreenKernel::WeightedDownsample,
            })
            .map_err(BakeError::resource(
                "Failed to load the hemisphere first pass shader program",
            ))?;
        let downsample = arena
            .program(&ShaderProgramDescriptor {
                label: Some("hemisphere_downsample"),
                source: ShaderSourceData::Wgsl(Cow::Borrowed(HEMISPHERE_DOWNSAMPLE_WGSL)),
                vertex_entry_point: VERTEX_ENTRY_POINT,
                fragment_entry_point: FRAGMENT_ENTRY_POINT,
                input_count: 1,
                target_format: TextureFormat::Rgba32Float,
                kernel: FullscreenKernel::BoxDownsample,
            })
            .map_err(BakeError::resource(
                "Failed to load the hemisphere downsample shader program",
            ))?;

        let weights = arena
            .texture(&TextureDescriptor {
                label: Some(Cow::Borrowed("hemisphere_weights")),
                size: Extent2D::new(3 * grid.size, grid.size),
                format: TextureFormat::Rg32Float,
                usage: TextureUsage::TEXTURE_BINDING | TextureUsage::COPY_DST,
            })
            .map_err(BakeError::resource(
                "Failed to create texture with hemisphere weights",
            ))?;

        let reduced = grid.reduced_extent();
        let transfer = arena
            .buffer(&BufferDescriptor {
                label: Some(Cow::Borrowed("hemisphere_transfer")),
                size: reduced.area() as u64 * TextureFormat::Rgba32Float.bytes_per_pixel() as u64,
                usage: BufferUsage::MAP_READ | BufferUsage::COPY_DST,
            })
            .map_err(BakeError::resource("Could not create hemisphere transfer buffer"))?;

        log::debug!(
            "LightMassBaking: allocated {}x{} hemicube batch of size {}",
            grid.count_x,
            grid.count_y,
            grid.size
        );

        Ok(Self {
            grid,
            color,
            depth,
            framebuffers,
            weights,
            first_pass,
            downsample,
            transfer,
            arena,
        })
    }

    pub(crate) fn device(&self) -> &dyn GraphicsDevice {
        self.arena.device()
    }

    /// Replaces the reduction kernel.
    pub(crate) fn upload_weights(&self, weights: &[HemisphereWeight]) -> Result<(), BakeError> {
        let extent = Extent2D::new(3 * self.grid.size, self.grid.size);
        self.device()
            .write_texture(
                self.weights,
                bytemuck::cast_slice(weights),
                extent.width * TextureFormat::Rg32Float.bytes_per_pixel(),
                extent,
            )
            .map_err(BakeError::resource(
                "Failed to upload texture with hemisphere weights",
            ))
    }
}
