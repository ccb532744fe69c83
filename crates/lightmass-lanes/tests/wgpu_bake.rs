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

use lightmass_core::bake::{IndexStream, LightSampleParams, LightmapTarget, MeshView, VertexStream};
use lightmass_core::math::LinearRgba;
use lightmass_core::renderer::{GraphicsDevice, RenderError, ResourceError};
use lightmass_infra::graphics::wgpu::WgpuBakeDevice;
use lightmass_lanes::{default_hemisphere_weights, HemisphereView, LightMassBaking, SceneRenderer};
use std::borrow::Cow;
use std::sync::Arc;

const SIZE: u32 = 16;

/// Draws a single fullscreen triangle of constant radiance into every face.
struct SkyDome {
    radiance: LinearRgba,
    pipeline: Option<wgpu::RenderPipeline>,
}

impl SkyDome {
    fn new(radiance: LinearRgba) -> Self {
        Self {
            radiance,
            pipeline: None,
        }
    }

    fn build_pipeline(
        &self,
        device: &wgpu::Device,
        color: wgpu::TextureFormat,
        depth: wgpu::TextureFormat,
    ) -> wgpu::RenderPipeline {
        let LinearRgba { r, g, b, .. } = self.radiance;
        let source = format!(
            "@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> @builtin(position) vec4<f32> {{
    let uv = vec2<f32>(f32((index << 1u) & 2u), f32(index & 2u));
    return vec4<f32>(uv * 2.0 - 1.0, 0.5, 1.0);
}}

@fragment
fn fs_main() -> @location(0) vec4<f32> {{
    return vec4<f32>({r:?}, {g:?}, {b:?}, 1.0);
}}
"
        );
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sky_dome"),
            source: wgpu::ShaderSource::Wgsl(Cow::Owned(source)),
        });
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sky_dome"),
            layout: None,
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: Some(wgpu::DepthStencilState {
                format: depth,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            multiview: None,
            cache: None,
        })
    }
}

impl SceneRenderer for SkyDome {
    fn render_hemisphere(
        &mut self,
        device: &dyn GraphicsDevice,
        view: &HemisphereView,
    ) -> Result<(), RenderError> {
        let device = device
            .as_any()
            .downcast_ref::<WgpuBakeDevice>()
            .ok_or_else(|| RenderError::RenderingFailed("expected a wgpu device".into()))?;
        let (color, depth) = device
            .framebuffer_views(view.framebuffer)
            .ok_or(RenderError::ResourceError(ResourceError::NotFound))?;
        let depth = depth.ok_or(RenderError::ResourceError(ResourceError::InvalidHandle))?;
        let formats = device
            .texture_format(view.color)
            .zip(device.texture_format(view.depth))
            .ok_or(RenderError::ResourceError(ResourceError::NotFound))?;

        let gpu = device.context().device();
        if self.pipeline.is_none() {
            self.pipeline = Some(self.build_pipeline(gpu, formats.0, formats.1));
        }
        let Some(pipeline) = &self.pipeline else {
            return Err(RenderError::RenderingFailed("no pipeline".into()));
        };

        let viewport = view.viewport;
        let mut encoder = gpu.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("sky_dome"),
        });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("sky_dome"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &color,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(pipeline);
            pass.set_viewport(
                viewport.x as f32,
                viewport.y as f32,
                viewport.width as f32,
                viewport.height as f32,
                0.0,
                1.0,
            );
            pass.set_scissor_rect(viewport.x, viewport.y, viewport.width, viewport.height);
            pass.draw(0..3, 0..1);
        }
        device
            .context()
            .queue()
            .submit(std::iter::once(encoder.finish()));
        Ok(())
    }
}

#[test]
#[ignore = "requires a graphics adapter"]
fn bakes_a_quad_with_a_scene_drawn_on_the_gpu() {
    let _ = env_logger::builder().is_test(true).try_init();
    let device = Arc::new(WgpuBakeDevice::new_headless().unwrap());
    let positions = [0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 1.0];
    let uvs = [0.0f32, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0];
    let indices = [0u32, 1, 2, 0, 2, 3];
    let radiance = LinearRgba::rgb(2.0, 1.0, 0.5);
    let mut data = vec![0.0f32; 4 * 4 * 3];
    {
        let mut baker = LightMassBaking::new(device.clone());
        baker
            .setup(&LightSampleParams {
                hemisphere_size: SIZE,
                interpolation_passes: 1,
                seed: Some(3),
                ..Default::default()
            })
            .unwrap();
        baker
            .set_render_target(LightmapTarget::new(&mut data, 4, 4, 3).unwrap())
            .unwrap();
        let mesh = MeshView::new(
            VertexStream::from_f32(&positions),
            VertexStream::from_f32(&uvs),
            Some(IndexStream::from_u32(&indices)),
            indices.len(),
        )
        .unwrap();
        baker.set_geometry(mesh).unwrap();
        baker.start(&mut SkyDome::new(radiance)).unwrap();
        assert_eq!(baker.sample_progress(), 1.0);
    }

    let cosine = default_hemisphere_weights(SIZE)
        .iter()
        .map(|w| w.color as f64)
        .sum::<f64>() as f32;
    let expected = [radiance.r * cosine, radiance.g * cosine, radiance.b * cosine];
    for (i, texel) in data.chunks_exact(3).enumerate() {
        for (got, want) in texel.iter().zip(expected) {
            assert!(
                (got - want).abs() <= 1e-2 * want.abs().max(1.0),
                "texel {i}: {texel:?}, expected {expected:?}"
            );
        }
    }
}
