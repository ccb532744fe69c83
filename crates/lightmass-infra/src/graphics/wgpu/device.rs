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

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Mutex};

use lightmass_core::math::{Extent2D, LinearRgba, Viewport};
use lightmass_core::renderer::{
    BufferDescriptor, BufferId, FramebufferDescriptor, FramebufferId, FullscreenDraw,
    GraphicsDevice, ResourceError, ShaderError, ShaderProgramDescriptor, ShaderProgramId,
    ShaderSourceData, TextureDescriptor, TextureFormat, TextureId,
};

use super::context::WgpuGraphicsContext;
use super::conversions::IntoWgpu;

#[derive(Debug)]
struct WgpuTextureEntry {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    format: TextureFormat,
    size: Extent2D,
}

#[derive(Debug, Clone, Copy)]
struct WgpuFramebufferEntry {
    color: TextureId,
    depth: Option<TextureId>,
}

#[derive(Debug)]
struct WgpuProgramEntry {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    input_count: u32,
}

/// The copy backing the last `read_pixels_async` into a buffer.
///
/// Texture-to-buffer copies need 256-byte aligned rows, so the device reads
/// into a padded staging buffer and repacks the rows when mapping.
#[derive(Debug)]
struct PendingReadback {
    staging: wgpu::Buffer,
    row_bytes: u32,
    padded_row_bytes: u32,
    rows: u32,
}

#[derive(Debug)]
struct WgpuBufferEntry {
    size: u64,
    readback: Option<PendingReadback>,
}

/// A headless [`GraphicsDevice`] backed by WGPU.
///
/// Fullscreen programs are compiled from their WGSL source; the kernel tag of
/// a program descriptor is ignored.
#[derive(Debug)]
pub struct WgpuBakeDevice {
    context: WgpuGraphicsContext,
    textures: Mutex<HashMap<TextureId, WgpuTextureEntry>>,
    framebuffers: Mutex<HashMap<FramebufferId, WgpuFramebufferEntry>>,
    programs: Mutex<HashMap<ShaderProgramId, WgpuProgramEntry>>,
    buffers: Mutex<HashMap<BufferId, WgpuBufferEntry>>,

    next_texture_id: AtomicUsize,
    next_framebuffer_id: AtomicUsize,
    next_program_id: AtomicUsize,
    next_buffer_id: AtomicUsize,
}

impl WgpuBakeDevice {
    /// Wraps an initialized context.
    pub fn new(context: WgpuGraphicsContext) -> Self {
        Self {
            context,
            textures: Mutex::new(HashMap::new()),
            framebuffers: Mutex::new(HashMap::new()),
            programs: Mutex::new(HashMap::new()),
            buffers: Mutex::new(HashMap::new()),
            next_texture_id: AtomicUsize::new(0),
            next_framebuffer_id: AtomicUsize::new(0),
            next_program_id: AtomicUsize::new(0),
            next_buffer_id: AtomicUsize::new(0),
        }
    }

    /// Blocks on the creation of a headless context.
    pub fn new_headless() -> anyhow::Result<Self> {
        let context = pollster::block_on(WgpuGraphicsContext::new_headless())?;
        Ok(Self::new(context))
    }

    /// The underlying context.
    pub fn context(&self) -> &WgpuGraphicsContext {
        &self.context
    }

    /// The native view of a texture, for scene passes that draw into the
    /// hemicube. `None` if the id is not a live texture.
    pub fn texture_view(&self, id: TextureId) -> Option<wgpu::TextureView> {
        self.textures
            .lock()
            .unwrap()
            .get(&id)
            .map(|entry| entry.view.clone())
    }

    /// The native format of a texture, to build pipelines targeting it.
    pub fn texture_format(&self, id: TextureId) -> Option<wgpu::TextureFormat> {
        self.textures
            .lock()
            .unwrap()
            .get(&id)
            .map(|entry| entry.format.into_wgpu())
    }

    /// The color view and, when attached, the depth view of a framebuffer.
    pub fn framebuffer_views(
        &self,
        id: FramebufferId,
    ) -> Option<(wgpu::TextureView, Option<wgpu::TextureView>)> {
        let framebuffer = self.framebuffer(id).ok()?;
        let color = self.texture_view(framebuffer.color)?;
        let depth = match framebuffer.depth {
            Some(depth) => Some(self.texture_view(depth)?),
            None => None,
        };
        Some((color, depth))
    }

    fn device(&self) -> &wgpu::Device {
        self.context.device()
    }

    fn queue(&self) -> &wgpu::Queue {
        self.context.queue()
    }

    fn framebuffer(&self, id: FramebufferId) -> Result<WgpuFramebufferEntry, ResourceError> {
        self.framebuffers
            .lock()
            .unwrap()
            .get(&id)
            .copied()
            .ok_or(ResourceError::NotFound)
    }

    fn texture(&self, id: TextureId) -> Result<(wgpu::Texture, wgpu::TextureView, Extent2D), ResourceError> {
        let textures = self.textures.lock().unwrap();
        let entry = textures.get(&id).ok_or(ResourceError::NotFound)?;
        Ok((entry.texture.clone(), entry.view.clone(), entry.size))
    }

    fn submit(&self, encoder: wgpu::CommandEncoder) {
        self.queue().submit(std::iter::once(encoder.finish()));
    }

    fn encoder(&self, label: &str) -> wgpu::CommandEncoder {
        self.device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(label) })
    }
}

fn fits(size: Extent2D, region: Viewport) -> bool {
    region.x as u64 + region.width as u64 <= size.width as u64
        && region.y as u64 + region.height as u64 <= size.height as u64
}

fn copy_origin<'a>(texture: &'a wgpu::Texture, region: Viewport) -> wgpu::TexelCopyTextureInfo<'a> {
    wgpu::TexelCopyTextureInfo {
        texture,
        mip_level: 0,
        origin: region.into_wgpu(),
        aspect: wgpu::TextureAspect::All,
    }
}

impl GraphicsDevice for WgpuBakeDevice {
    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<TextureId, ResourceError> {
        if descriptor.size.area() == 0 {
            return Err(ResourceError::BackendError(
                "cannot create a zero-sized texture".to_owned(),
            ));
        }
        let texture = self.device().create_texture(&wgpu::TextureDescriptor {
            label: descriptor.label.as_deref(),
            size: descriptor.size.into_wgpu(),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: descriptor.format.into_wgpu(),
            usage: descriptor.usage.into_wgpu(),
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let id = TextureId(self.next_texture_id.fetch_add(1, Ordering::Relaxed));
        self.textures.lock().unwrap().insert(
            id,
            WgpuTextureEntry {
                texture,
                view,
                format: descriptor.format,
                size: descriptor.size,
            },
        );
        log::debug!(
            "WgpuBakeDevice: created texture '{}' with ID: {id:?}",
            descriptor.label.as_deref().unwrap_or("unnamed")
        );
        Ok(id)
    }

    fn destroy_texture(&self, id: TextureId) -> Result<(), ResourceError> {
        let entry = self
            .textures
            .lock()
            .unwrap()
            .remove(&id)
            .ok_or(ResourceError::NotFound)?;
        entry.texture.destroy();
        log::debug!("WgpuBakeDevice: destroyed texture with ID: {id:?}");
        Ok(())
    }

    fn write_texture(
        &self,
        id: TextureId,
        data: &[u8],
        bytes_per_row: u32,
        size: Extent2D,
    ) -> Result<(), ResourceError> {
        let (texture, _, texture_size) = self.texture(id)?;
        let region = Viewport::new(0, 0, size.width, size.height);
        let needed = match size.height {
            0 => 0,
            rows => (rows as usize - 1) * bytes_per_row as usize,
        };
        if !fits(texture_size, region) || data.len() < needed {
            return Err(ResourceError::OutOfBounds);
        }
        self.queue().write_texture(
            copy_origin(&texture, region),
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(size.height),
            },
            size.into_wgpu(),
        );
        Ok(())
    }

    fn create_framebuffer(
        &self,
        descriptor: &FramebufferDescriptor,
    ) -> Result<FramebufferId, ResourceError> {
        let incomplete = |reason: &str| ResourceError::IncompleteFramebuffer {
            label: descriptor.label.as_deref().unwrap_or("unnamed").to_owned(),
            reason: reason.to_owned(),
        };
        {
            let textures = self.textures.lock().unwrap();
            let color = textures
                .get(&descriptor.color)
                .ok_or_else(|| incomplete("unknown color attachment"))?;
            if color.format.is_depth() {
                return Err(incomplete("color attachment has a depth format"));
            }
            if let Some(depth) = descriptor.depth {
                let depth = textures
                    .get(&depth)
                    .ok_or_else(|| incomplete("unknown depth attachment"))?;
                if !depth.format.is_depth() {
                    return Err(incomplete("depth attachment is not a depth format"));
                }
                if depth.size != color.size {
                    return Err(incomplete("attachment sizes differ"));
                }
            }
        }
        let id = FramebufferId(self.next_framebuffer_id.fetch_add(1, Ordering::Relaxed));
        self.framebuffers.lock().unwrap().insert(
            id,
            WgpuFramebufferEntry {
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
        let ShaderSourceData::Wgsl(source) = &descriptor.source;
        let device = self.device();

        // Compilation and linking errors surface through an error scope.
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: descriptor.label,
            source: wgpu::ShaderSource::Wgsl(source.clone()),
        });
        let entries: Vec<wgpu::BindGroupLayoutEntry> = (0..descriptor.input_count)
            .map(|binding| wgpu::BindGroupLayoutEntry {
                binding,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: false },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            })
            .collect();
        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: descriptor.label,
                entries: &entries,
            });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: descriptor.label,
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: descriptor.label,
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some(descriptor.vertex_entry_point),
                compilation_options: Default::default(),
                buffers: &[],
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some(descriptor.fragment_entry_point),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: descriptor.target_format.into_wgpu(),
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            multiview: None,
            cache: None,
        });
        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            log::error!("WgpuBakeDevice: program '{label}' failed to compile: {err}");
            return Err(ShaderError::CompilationError {
                label: label.to_owned(),
                details: err.to_string(),
            }
            .into());
        }

        let id = ShaderProgramId(self.next_program_id.fetch_add(1, Ordering::Relaxed));
        self.programs.lock().unwrap().insert(
            id,
            WgpuProgramEntry {
                pipeline,
                bind_group_layout,
                input_count: descriptor.input_count,
            },
        );
        log::info!("WgpuBakeDevice: created program '{label}' with ID: {id:?}");
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
        let id = BufferId(self.next_buffer_id.fetch_add(1, Ordering::Relaxed));
        self.buffers.lock().unwrap().insert(
            id,
            WgpuBufferEntry {
                size: descriptor.size,
                readback: None,
            },
        );
        log::debug!(
            "WgpuBakeDevice: created {}-byte buffer '{}' with ID: {id:?}",
            descriptor.size,
            descriptor.label.as_deref().unwrap_or("unnamed")
        );
        Ok(id)
    }

    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError> {
        let entry = self
            .buffers
            .lock()
            .unwrap()
            .remove(&id)
            .ok_or(ResourceError::NotFound)?;
        if let Some(readback) = entry.readback {
            readback.staging.destroy();
        }
        Ok(())
    }

    fn clear_framebuffer(&self, id: FramebufferId, color: LinearRgba) -> Result<(), ResourceError> {
        let framebuffer = self.framebuffer(id)?;
        let (_, color_view, _) = self.texture(framebuffer.color)?;
        let depth_view = match framebuffer.depth {
            Some(depth) => Some(self.texture(depth)?.1),
            None => None,
        };

        let mut encoder = self.encoder("LightMass Clear Encoder");
        {
            let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("LightMass Clear Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &color_view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(color.into_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: depth_view.as_ref().map(|view| {
                    wgpu::RenderPassDepthStencilAttachment {
                        view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }
        self.submit(encoder);
        Ok(())
    }

    fn draw_fullscreen(&self, draw: &FullscreenDraw) -> Result<(), ResourceError> {
        let target = self.framebuffer(draw.target)?;
        let (_, target_view, target_size) = self.texture(target.color)?;
        if !fits(target_size, draw.viewport) {
            return Err(ResourceError::OutOfBounds);
        }
        let input_views = draw
            .inputs
            .iter()
            .map(|&input| self.texture(input).map(|(_, view, _)| view))
            .collect::<Result<Vec<_>, _>>()?;

        let programs = self.programs.lock().unwrap();
        let program = programs
            .get(&draw.program)
            .ok_or(ShaderError::NotFound { id: draw.program })?;
        if input_views.len() != program.input_count as usize {
            return Err(ResourceError::InvalidHandle);
        }
        let entries: Vec<wgpu::BindGroupEntry> = input_views
            .iter()
            .enumerate()
            .map(|(binding, view)| wgpu::BindGroupEntry {
                binding: binding as u32,
                resource: wgpu::BindingResource::TextureView(view),
            })
            .collect();
        let bind_group = self.device().create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("LightMass Fullscreen Inputs"),
            layout: &program.bind_group_layout,
            entries: &entries,
        });

        let viewport = draw.viewport;
        let mut encoder = self.encoder("LightMass Fullscreen Encoder");
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("LightMass Fullscreen Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target_view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&program.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.set_viewport(
                viewport.x as f32,
                viewport.y as f32,
                viewport.width as f32,
                viewport.height as f32,
                0.0,
                1.0,
            );
            pass.set_scissor_rect(viewport.x, viewport.y, viewport.width, viewport.height);
            pass.draw(0..4, 0..1);
        }
        drop(programs);
        self.submit(encoder);
        Ok(())
    }

    fn copy_framebuffer(
        &self,
        source: FramebufferId,
        destination: FramebufferId,
        region: Viewport,
    ) -> Result<(), ResourceError> {
        let (source, _, source_size) = self.texture(self.framebuffer(source)?.color)?;
        let (destination, _, destination_size) =
            self.texture(self.framebuffer(destination)?.color)?;
        if !fits(source_size, region) || !fits(destination_size, region) {
            return Err(ResourceError::OutOfBounds);
        }
        let mut encoder = self.encoder("LightMass Copy Encoder");
        encoder.copy_texture_to_texture(
            copy_origin(&source, region),
            copy_origin(&destination, region),
            Extent2D::new(region.width, region.height).into_wgpu(),
        );
        self.submit(encoder);
        Ok(())
    }

    fn read_pixels_async(
        &self,
        source: FramebufferId,
        region: Viewport,
        destination: BufferId,
    ) -> Result<(), ResourceError> {
        let framebuffer = self.framebuffer(source)?;
        let (texture, format, source_size) = {
            let textures = self.textures.lock().unwrap();
            let entry = textures.get(&framebuffer.color).ok_or(ResourceError::NotFound)?;
            (entry.texture.clone(), entry.format, entry.size)
        };
        if !fits(source_size, region) {
            return Err(ResourceError::OutOfBounds);
        }

        let row_bytes = region.width * format.bytes_per_pixel();
        let padded_row_bytes = row_bytes.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
            * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let mut buffers = self.buffers.lock().unwrap();
        let entry = buffers.get_mut(&destination).ok_or(ResourceError::NotFound)?;
        if row_bytes as u64 * region.height as u64 > entry.size {
            return Err(ResourceError::OutOfBounds);
        }

        let staging = self.device().create_buffer(&wgpu::BufferDescriptor {
            label: Some("LightMass Readback Staging"),
            size: padded_row_bytes as u64 * region.height as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let mut encoder = self.encoder("LightMass Readback Encoder");
        encoder.copy_texture_to_buffer(
            copy_origin(&texture, region),
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row_bytes),
                    rows_per_image: Some(region.height),
                },
            },
            Extent2D::new(region.width, region.height).into_wgpu(),
        );
        self.submit(encoder);

        if let Some(previous) = entry.readback.replace(PendingReadback {
            staging,
            row_bytes,
            padded_row_bytes,
            rows: region.height,
        }) {
            previous.staging.destroy();
        }
        Ok(())
    }

    fn map_buffer_read(
        &self,
        id: BufferId,
        reader: &mut dyn FnMut(&[u8]),
    ) -> Result<(), ResourceError> {
        let buffers = self.buffers.lock().unwrap();
        let entry = buffers.get(&id).ok_or(ResourceError::NotFound)?;
        let Some(readback) = &entry.readback else {
            return Err(ResourceError::MapFailed(format!(
                "{id:?} has no pending readback"
            )));
        };

        let slice = readback.staging.slice(..);
        let (sender, receiver) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            // The receiver outlives the blocking poll below.
            let _ = sender.send(result);
        });
        self.device()
            .poll(wgpu::PollType::Wait)
            .map_err(|e| ResourceError::MapFailed(format!("device poll failed: {e}")))?;
        receiver
            .recv()
            .map_err(|e| ResourceError::MapFailed(format!("map callback dropped: {e}")))?
            .map_err(|e| ResourceError::MapFailed(e.to_string()))?;

        let mut packed = Vec::with_capacity(readback.row_bytes as usize * readback.rows as usize);
        {
            let mapped = slice.get_mapped_range();
            for row in mapped.chunks(readback.padded_row_bytes as usize) {
                packed.extend_from_slice(&row[..readback.row_bytes as usize]);
            }
        }
        readback.staging.unmap();
        reader(&packed);
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightmass_core::renderer::{BufferUsage, TextureUsage};
    use std::borrow::Cow;

    #[test]
    #[ignore = "requires a graphics adapter"]
    fn clear_and_read_back() {
        let _ = env_logger::builder().is_test(true).try_init();
        let device = WgpuBakeDevice::new_headless().unwrap();
        let color = device
            .create_texture(&TextureDescriptor {
                label: Some(Cow::Borrowed("color")),
                size: Extent2D::new(8, 4),
                format: TextureFormat::Rgba32Float,
                usage: TextureUsage::RENDER_ATTACHMENT | TextureUsage::COPY_SRC,
            })
            .unwrap();
        let framebuffer = device
            .create_framebuffer(&FramebufferDescriptor {
                label: None,
                color,
                depth: None,
            })
            .unwrap();
        let buffer = device
            .create_buffer(&BufferDescriptor {
                label: None,
                size: 3 * 2 * 16,
                usage: BufferUsage::MAP_READ | BufferUsage::COPY_DST,
            })
            .unwrap();

        device
            .clear_framebuffer(framebuffer, LinearRgba::new(0.5, 1.0, 2.0, 1.0))
            .unwrap();
        device
            .read_pixels_async(framebuffer, Viewport::new(1, 1, 3, 2), buffer)
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
        assert_eq!(texels, vec![[0.5, 1.0, 2.0, 1.0]; 6]);

        let dyn_device: &dyn GraphicsDevice = &device;
        let native = dyn_device
            .as_any()
            .downcast_ref::<WgpuBakeDevice>()
            .unwrap();
        let (_, depth) = native.framebuffer_views(framebuffer).unwrap();
        assert!(depth.is_none());
        assert_eq!(
            native.texture_format(color),
            Some(wgpu::TextureFormat::Rgba32Float)
        );
        device.destroy_texture(color).unwrap();
        assert!(native.texture_view(color).is_none());
        assert!(native.framebuffer_views(framebuffer).is_none());
    }
}
