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

//! The public baking facade.

use super::context::HemisphereContext;
use super::error::BakeError;
use super::hemicube::{HemicubeSide, SampleCamera};
use lightmass_core::bake::{
    HemisphereWeight, LightMassListener, LightSampleParams, LightmapTarget, MeshView,
};
use lightmass_core::math::{Mat4, Viewport};
use lightmass_core::renderer::{FramebufferId, GraphicsDevice, RenderError, TextureId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One hemicube face to render.
///
/// The renderer draws the scene into `viewport` of `framebuffer` as seen by
/// `camera`. The framebuffer is already cleared to the environment color at
/// the start of every batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HemisphereView {
    /// Framebuffer holding the batch of hemicubes.
    pub framebuffer: FramebufferId,
    /// Its color attachment.
    pub color: TextureId,
    /// Its depth attachment.
    pub depth: TextureId,
    /// Region of the framebuffer this face occupies.
    pub viewport: Viewport,
    /// Which face is being rendered.
    pub side: HemicubeSide,
    /// View and projection of the face.
    pub camera: SampleCamera,
    /// Lightmap texel the hemicube belongs to.
    pub texel: (u32, u32),
}

/// Renders the scene for a hemicube face.
///
/// The ids of a [`HemisphereView`] belong to the baker's device. A renderer
/// issuing its own draws recovers the backend with
/// [`GraphicsDevice::as_any`], e.g. `WgpuBakeDevice::framebuffer_views` for
/// the native color and depth views. Its commands must be submitted before
/// `render_hemisphere` returns.
pub trait SceneRenderer {
    /// Draws the scene into `view.viewport` of `view.framebuffer`.
    fn render_hemisphere(
        &mut self,
        device: &dyn GraphicsDevice,
        view: &HemisphereView,
    ) -> Result<(), RenderError>;
}

impl<F> SceneRenderer for F
where
    F: FnMut(&dyn GraphicsDevice, &HemisphereView) -> Result<(), RenderError>,
{
    fn render_hemisphere(
        &mut self,
        device: &dyn GraphicsDevice,
        view: &HemisphereView,
    ) -> Result<(), RenderError> {
        self(device, view)
    }
}

/// Cooperative cancellation of a running bake, shareable across threads.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    /// Requests the bake to stop after the face being rendered.
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Returns `true` once a stop was requested.
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Bakes irradiance into a lightmap by rendering a hemicube per texel.
///
/// Usage is `setup`, then `set_render_target` and `set_geometry`, then either
/// `start` with a [`SceneRenderer`] or a manual loop of
/// `begin_sample_hemisphere`/`end_sample_hemisphere`. Resources are released
/// by `close` or on drop.
pub struct LightMassBaking<'a> {
    device: Arc<dyn GraphicsDevice>,
    context: Option<HemisphereContext<'a>>,
    world: Mat4,
    listener: Option<Arc<dyn LightMassListener>>,
    stop: StopHandle,
}

impl<'a> LightMassBaking<'a> {
    /// Creates an idle baker on `device`.
    pub fn new(device: Arc<dyn GraphicsDevice>) -> Self {
        Self {
            device,
            context: None,
            world: Mat4::IDENTITY,
            listener: None,
            stop: StopHandle::default(),
        }
    }

    /// Allocates the hemicube batch for `params`, replacing any previous setup.
    ///
    /// On failure nothing stays allocated and the error is also reported to
    /// the listener.
    pub fn setup(&mut self, params: &LightSampleParams) -> Result<(), BakeError> {
        self.close();
        match HemisphereContext::new(self.device.clone(), params, self.world) {
            Ok(context) => {
                log::info!(
                    "LightMassBaking: set up {}px hemicubes, {} per batch",
                    params.hemisphere_size,
                    context.grid().capacity()
                );
                self.context = Some(context);
                Ok(())
            }
            Err(err) => Err(self.report(err)),
        }
    }

    /// Releases every resource created by `setup`. Safe to call repeatedly.
    pub fn close(&mut self) {
        if self.context.take().is_some() {
            log::info!("LightMassBaking: released hemisphere resources");
        }
    }

    /// Returns `true` between a successful `setup` and `close`.
    pub fn is_ready(&self) -> bool {
        self.context.is_some()
    }

    /// The running bake, if set up.
    pub fn context(&self) -> Option<&HemisphereContext<'a>> {
        self.context.as_ref()
    }

    /// The device the baker renders with.
    pub fn device(&self) -> &Arc<dyn GraphicsDevice> {
        &self.device
    }

    /// Installs or removes the progress and diagnostics listener.
    pub fn set_listener(&mut self, listener: Option<Arc<dyn LightMassListener>>) {
        self.listener = listener;
    }

    /// The current listener.
    pub fn listener(&self) -> Option<&Arc<dyn LightMassListener>> {
        self.listener.as_ref()
    }

    /// Sets the transform applied to mesh positions. Takes effect from the
    /// next triangle.
    pub fn set_world_transform(&mut self, world: Mat4) {
        self.world = world;
        if let Some(context) = &mut self.context {
            context.set_world_transform(world);
        }
    }

    /// The transform applied to mesh positions.
    pub fn world_transform(&self) -> &Mat4 {
        &self.world
    }

    /// Binds the lightmap the bake writes into.
    ///
    /// Replacing a lightmap resolves the finished hemicubes into the old one
    /// and unbinds the geometry, which must be set again.
    pub fn set_render_target(&mut self, lightmap: LightmapTarget<'a>) -> Result<(), BakeError> {
        self.with_context("setup must succeed before binding a render target", |context| {
            context.set_render_target(lightmap)
        })
    }

    /// The bound lightmap.
    pub fn lightmap(&self) -> Option<&LightmapTarget<'a>> {
        self.context.as_ref().and_then(HemisphereContext::lightmap)
    }

    /// Binds the mesh to bake and restarts from its first triangle.
    pub fn set_geometry(&mut self, mesh: MeshView<'a>) -> Result<(), BakeError> {
        self.with_context("setup must succeed before binding geometry", |context| {
            context.set_geometry(mesh)
        })
    }

    /// Replaces the weights texture. `weights` must hold `3 * size * size`
    /// entries.
    pub fn update_hemisphere_weights(
        &mut self,
        weights: &[HemisphereWeight],
    ) -> Result<(), BakeError> {
        self.with_context("setup must succeed before updating weights", |context| {
            context.update_hemisphere_weights(weights)
        })
    }

    /// The next face to render, or `None` once the bake is complete.
    pub fn begin_sample_hemisphere(&mut self) -> Result<Option<HemisphereView>, BakeError> {
        self.with_context("setup must succeed before sampling", |context| {
            context.begin_sample_hemisphere()
        })
    }

    /// Marks the face returned by `begin_sample_hemisphere` as rendered.
    pub fn end_sample_hemisphere(&mut self) -> Result<(), BakeError> {
        self.with_context("setup must succeed before sampling", |context| {
            context.end_sample_hemisphere()
        })
    }

    /// Fraction of the bake done, in `[0, 1]`.
    pub fn sample_progress(&self) -> f32 {
        self.context
            .as_ref()
            .map_or(0.0, HemisphereContext::sample_progress)
    }

    /// Runs the bake to completion or until stopped.
    ///
    /// Progress is reported to the listener each time a triangle is done and
    /// once more with `1.0` on completion. Any error closes the baker.
    pub fn start(&mut self, renderer: &mut dyn SceneRenderer) -> Result<(), BakeError> {
        match self.run(renderer) {
            Ok(()) => Ok(()),
            Err(err) => {
                let err = self.report(err);
                self.close();
                Err(err)
            }
        }
    }

    fn run(&mut self, renderer: &mut dyn SceneRenderer) -> Result<(), BakeError> {
        let Self {
            device,
            context,
            listener,
            stop,
            ..
        } = self;
        let context = context
            .as_mut()
            .ok_or(BakeError::NotReady("setup must succeed before baking"))?;

        log::info!(
            "LightMassBaking: baking in {} passes",
            context.schedule().pass_count()
        );
        let mut base_index = context.base_index();
        while !stop.is_stopped() {
            let Some(view) = context.begin_sample_hemisphere()? else {
                break;
            };
            renderer.render_hemisphere(device.as_ref(), &view)?;

            if base_index != context.base_index() {
                base_index = context.base_index();
                if let Some(listener) = listener {
                    listener.on_baking_progressing(context.sample_progress());
                }
            }
            context.end_sample_hemisphere()?;
        }

        if context.is_completed() {
            log::info!("LightMassBaking: bake completed");
            if let Some(listener) = listener {
                listener.on_baking_progressing(1.0);
            }
        } else {
            log::info!(
                "LightMassBaking: stopped at {:.1}%",
                context.sample_progress() * 100.0
            );
        }
        Ok(())
    }

    /// Requests a running `start` to return after the current face.
    pub fn stop(&self) {
        self.stop.stop();
    }

    /// A handle that stops this baker from another thread.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Returns `true` once a stop was requested.
    pub fn is_stopped(&self) -> bool {
        self.stop.is_stopped()
    }

    fn with_context<T>(
        &mut self,
        missing: &'static str,
        f: impl FnOnce(&mut HemisphereContext<'a>) -> Result<T, BakeError>,
    ) -> Result<T, BakeError> {
        let result = match self.context.as_mut() {
            Some(context) => f(context),
            None => Err(BakeError::NotReady(missing)),
        };
        result.map_err(|err| self.report(err))
    }

    fn report(&self, err: BakeError) -> BakeError {
        log::error!("LightMassBaking: {err}");
        if let Some(listener) = &self.listener {
            listener.on_message(&err.to_string());
        }
        err
    }
}

impl Drop for LightMassBaking<'_> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_handle_is_shared() {
        let handle = StopHandle::default();
        let clone = handle.clone();
        assert!(!handle.is_stopped());
        clone.stop();
        assert!(handle.is_stopped());
    }
}
