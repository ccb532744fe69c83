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

//! The state of a running bake.

use super::baker::HemisphereView;
use super::error::BakeError;
use super::hemicube::{HemicubeSide, HemisphereGrid};
use super::rasterizer::ConservativeRasterizer;
use super::reduction::{self, HemisphereBatch, PendingTransfer};
use super::resources::HemisphereResources;
use super::sampler::{SampleFrame, SampleTriangle};
use super::schedule::PassSchedule;
use super::weights::default_hemisphere_weights;
use lightmass_core::bake::{
    ConfigError, HemisphereWeight, LightSampleParams, LightmapTarget, MeshView,
};
use lightmass_core::math::{LinearRgba, Mat4};
use lightmass_core::renderer::GraphicsDevice;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

const SIDES_PER_HEMISPHERE: usize = HemicubeSide::ALL.len();

/// Where the bake is: pass, triangle, texel and hemicube face.
#[derive(Debug)]
struct MeshPosition {
    pass: u32,
    base_index: usize,
    /// Face being rendered; `SIDES_PER_HEMISPHERE` once the texel is done.
    side: usize,
    rasterizer: Option<ConservativeRasterizer>,
    sample: SampleFrame,
    completed: bool,
}

impl MeshPosition {
    fn new() -> Self {
        Self {
            pass: 0,
            base_index: 0,
            side: SIDES_PER_HEMISPHERE,
            rasterizer: None,
            sample: SampleFrame::default(),
            completed: false,
        }
    }
}

/// Everything a bake owns between `setup` and `close`: the GPU batch
/// resources, the bound mesh and lightmap, and the sampling cursor.
#[derive(Debug)]
pub struct HemisphereContext<'a> {
    resources: HemisphereResources,
    schedule: PassSchedule,
    interpolation_threshold: f32,
    near: f32,
    far: f32,
    clear_color: LinearRgba,
    world: Mat4,
    mesh: Option<MeshView<'a>>,
    lightmap: Option<LightmapTarget<'a>>,
    position: MeshPosition,
    batch: HemisphereBatch,
    transfer: PendingTransfer,
    rng: StdRng,
}

impl<'a> HemisphereContext<'a> {
    /// Validates `params` and allocates the batch resources.
    pub(crate) fn new(
        device: Arc<dyn GraphicsDevice>,
        params: &LightSampleParams,
        world: Mat4,
    ) -> Result<Self, BakeError> {
        params.validate()?;

        let grid = HemisphereGrid::new(params.hemisphere_size);
        let resources = HemisphereResources::create(device, grid)?;
        match &params.hemisphere_weights {
            Some(weights) => resources.upload_weights(weights)?,
            None => resources.upload_weights(&default_hemisphere_weights(grid.size))?,
        }

        let rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            resources,
            schedule: PassSchedule::new(params.interpolation_passes),
            interpolation_threshold: params.interpolation_threshold,
            near: params.hemisphere_near,
            far: params.hemisphere_far,
            clear_color: params.environment_color.with_alpha(1.0),
            world,
            mesh: None,
            lightmap: None,
            position: MeshPosition::new(),
            batch: HemisphereBatch::new(grid.capacity()),
            transfer: PendingTransfer::new(grid.capacity()),
            rng,
        })
    }

    /// The batch layout.
    pub fn grid(&self) -> HemisphereGrid {
        self.resources.grid
    }

    /// The pass sequence.
    pub fn schedule(&self) -> PassSchedule {
        self.schedule
    }

    /// The current pass.
    pub fn pass(&self) -> u32 {
        self.position.pass
    }

    /// First index of the triangle being rasterized.
    pub fn base_index(&self) -> usize {
        self.position.base_index
    }

    /// Returns `true` once every pass over the bound mesh has been resolved.
    pub fn is_completed(&self) -> bool {
        self.position.completed
    }

    /// Hemicubes rendered into the current batch so far.
    pub fn batched_hemispheres(&self) -> usize {
        self.batch.index()
    }

    /// The bound lightmap.
    pub fn lightmap(&self) -> Option<&LightmapTarget<'a>> {
        self.lightmap.as_ref()
    }

    pub(crate) fn set_world_transform(&mut self, world: Mat4) {
        self.world = world;
    }

    /// Binds `lightmap`, replacing any previous one.
    ///
    /// Hemicubes already rendered are resolved into the previous lightmap
    /// first. The mesh is unbound, since its cursor and batch slots address
    /// texels of the previous lightmap.
    pub(crate) fn set_render_target(
        &mut self,
        lightmap: LightmapTarget<'a>,
    ) -> Result<(), BakeError> {
        if self.lightmap.is_some() {
            self.finish_batch()?;
            self.begin_batch()?;
            self.finish_batch()?;
        }
        if self.mesh.take().is_some() {
            log::debug!("LightMassBaking: render target replaced, geometry unbound");
        }
        self.position = MeshPosition::new();

        log::debug!(
            "LightMassBaking: bound {}x{} lightmap with {} channels",
            lightmap.width(),
            lightmap.height(),
            lightmap.channels()
        );
        self.lightmap = Some(lightmap);
        Ok(())
    }

    pub(crate) fn update_hemisphere_weights(
        &self,
        weights: &[HemisphereWeight],
    ) -> Result<(), BakeError> {
        let size = self.resources.grid.size as usize;
        let expected = 3 * size * size;
        if weights.len() != expected {
            return Err(ConfigError::WeightCountMismatch {
                expected,
                actual: weights.len(),
            }
            .into());
        }
        self.resources.upload_weights(weights)
    }

    /// Binds a mesh and places the cursor on its first triangle of pass 0.
    pub(crate) fn set_geometry(&mut self, mesh: MeshView<'a>) -> Result<(), BakeError> {
        if self.lightmap.is_none() {
            return Err(BakeError::NotReady(
                "a render target must be bound before the geometry",
            ));
        }
        log::debug!(
            "LightMassBaking: bound mesh of {} triangles",
            mesh.triangle_count()
        );
        self.mesh = Some(mesh);
        self.position = MeshPosition::new();
        if mesh.count() == 0 {
            self.position.completed = true;
            return Ok(());
        }
        self.set_sample_position(0)
    }

    fn set_sample_position(&mut self, base_index: usize) -> Result<(), BakeError> {
        let (Some(mesh), Some(lightmap)) = (&self.mesh, &mut self.lightmap) else {
            return Err(BakeError::NotReady("geometry and render target must be bound"));
        };
        let (width, height) = (lightmap.width(), lightmap.height());
        let triangle = SampleTriangle::from_mesh(mesh, base_index, &self.world, width, height);
        let sub_pass = self.schedule.sub_pass(self.position.pass);
        let mut rasterizer = ConservativeRasterizer::new(triangle, width, height, sub_pass);

        let first = rasterizer.begin(lightmap, self.interpolation_threshold, &mut self.rng);
        self.position.base_index = base_index;
        self.position.rasterizer = Some(rasterizer);
        match first {
            Some(frame) => {
                self.position.sample = frame;
                self.position.side = 0;
            }
            None => self.position.side = SIDES_PER_HEMISPHERE,
        }
        Ok(())
    }

    fn update_sample_hemisphere(&mut self) -> Result<Option<HemisphereView>, BakeError> {
        let Some(side) = HemicubeSide::from_index(self.position.side) else {
            return Ok(None);
        };
        let Some(rasterizer) = &self.position.rasterizer else {
            return Ok(None);
        };
        let texel = rasterizer.texel();
        let resources = &self.resources;

        if side == HemicubeSide::Center {
            if self.batch.index() == 0 {
                resources
                    .device()
                    .clear_framebuffer(resources.framebuffers[0], self.clear_color)
                    .map_err(BakeError::resource("Could not clear hemisphere framebuffer"))?;
            }
            self.batch.record(texel);
        }

        let grid = resources.grid;
        let origin = grid.tile_origin(self.batch.index());
        Ok(Some(HemisphereView {
            framebuffer: resources.framebuffers[0],
            color: resources.color[0],
            depth: resources.depth,
            viewport: side.viewport(origin, grid.size),
            side,
            camera: side.camera(&self.position.sample, self.near, self.far),
            texel,
        }))
    }

    /// Moves to the next hemicube face to render, if any.
    ///
    /// Walks texels, triangles and passes until a face needs rendering.
    /// Finished passes are flushed entirely into the lightmap before the next
    /// pass starts. Returns `None` once the last pass completed.
    pub(crate) fn begin_sample_hemisphere(&mut self) -> Result<Option<HemisphereView>, BakeError> {
        if self.position.completed {
            return Ok(None);
        }
        let Some(mesh) = self.mesh else {
            return Err(BakeError::NotReady("geometry must be bound before sampling"));
        };

        loop {
            if let Some(view) = self.update_sample_hemisphere()? {
                return Ok(Some(view));
            }

            let next = match (&mut self.position.rasterizer, &mut self.lightmap) {
                (Some(rasterizer), Some(lightmap)) => {
                    rasterizer.find_next(lightmap, self.interpolation_threshold, &mut self.rng)
                }
                _ => None,
            };
            if let Some(frame) = next {
                self.position.sample = frame;
                self.position.side = 0;
                continue;
            }

            if self.position.base_index + 3 < mesh.count() {
                self.set_sample_position(self.position.base_index + 3)?;
                continue;
            }

            self.finish_batch()?;
            self.begin_batch()?;
            self.finish_batch()?;

            self.position.pass += 1;
            if self.position.pass == self.schedule.pass_count() {
                log::info!("LightMassBaking: all {} passes resolved", self.schedule.pass_count());
                self.position.completed = true;
                self.position.rasterizer = None;
                return Ok(None);
            }
            log::info!(
                "LightMassBaking: starting pass {} of {}",
                self.position.pass + 1,
                self.schedule.pass_count()
            );
            self.set_sample_position(0)?;
        }
    }

    /// Marks the current face as rendered.
    ///
    /// After the last face of a hemicube the batch moves to its next slot;
    /// a full batch resolves the previous one and starts reducing itself.
    pub(crate) fn end_sample_hemisphere(&mut self) -> Result<(), BakeError> {
        if self.position.side >= SIDES_PER_HEMISPHERE {
            return Err(BakeError::NotReady("no hemisphere face is being sampled"));
        }
        self.position.side += 1;
        if self.position.side == SIDES_PER_HEMISPHERE && self.batch.advance() {
            self.finish_batch()?;
            self.begin_batch()?;
        }
        Ok(())
    }

    /// Fraction of the bake done, in `[0, 1]`.
    pub fn sample_progress(&self) -> f32 {
        if self.position.completed {
            return 1.0;
        }
        let count = self.mesh.map_or(0, |mesh| mesh.count());
        if count == 0 {
            return 0.0;
        }
        let pass_progress = self.position.base_index as f32 / count as f32;
        (self.position.pass as f32 + pass_progress) / self.schedule.pass_count() as f32
    }

    fn begin_batch(&mut self) -> Result<(), BakeError> {
        reduction::begin_process_batch(&self.resources, &mut self.batch, &mut self.transfer)
    }

    fn finish_batch(&mut self) -> Result<(), BakeError> {
        if !self.transfer.is_started() {
            return Ok(());
        }
        let lightmap = self
            .lightmap
            .as_mut()
            .ok_or(BakeError::NotReady("a render target must be bound"))?;
        reduction::finish_process_batch(&self.resources, &mut self.transfer, lightmap)
    }
}
