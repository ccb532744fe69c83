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

//! GPU reduction of hemicube batches and resolve of their results.
//!
//! `begin_process_batch` turns the rendered tiles of a batch into one RGBA
//! texel per hemicube and starts an asynchronous readback of that grid.
//! `finish_process_batch` waits for the readback and writes every valid
//! result into the lightmap. The baker always finishes the previous batch
//! right before beginning the next one, so rendering of a batch overlaps the
//! readback of the one before it.

use super::error::BakeError;
use super::resources::HemisphereResources;
use lightmass_core::bake::LightmapTarget;
use lightmass_core::math::Viewport;
use lightmass_core::renderer::FullscreenDraw;

/// Results whose accumulated validity is at or below this are discarded.
const VALIDITY_THRESHOLD: f32 = 0.9;

/// Bytes of one reduced RGBA32F texel.
const TEXEL_BYTES: usize = 16;

/// The hemicube slots being rendered, and the texel each one belongs to.
#[derive(Debug)]
pub(crate) struct HemisphereBatch {
    slots: Vec<(u32, u32)>,
    index: usize,
}

impl HemisphereBatch {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            slots: vec![(0, 0); capacity],
            index: 0,
        }
    }

    /// The slot currently being rendered.
    pub(crate) fn index(&self) -> usize {
        self.index
    }

    /// Assigns the current slot to lightmap texel `texel`.
    pub(crate) fn record(&mut self, texel: (u32, u32)) {
        self.slots[self.index] = texel;
    }

    /// Moves to the next slot. Returns `true` when the batch is full.
    pub(crate) fn advance(&mut self) -> bool {
        self.index += 1;
        self.index == self.slots.len()
    }
}

/// A reduced batch whose readback has been issued but not yet resolved.
#[derive(Debug)]
pub(crate) struct PendingTransfer {
    started: bool,
    count: usize,
    slots: Vec<(u32, u32)>,
}

impl PendingTransfer {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            started: false,
            count: 0,
            slots: vec![(0, 0); capacity],
        }
    }

    /// Returns `true` while a readback waits to be resolved.
    pub(crate) fn is_started(&self) -> bool {
        self.started
    }
}

/// Reduces the rendered slots of `batch` and starts reading them back.
///
/// Does nothing for an empty batch. The slot table of `batch` moves into
/// `transfer`, and `batch` starts over at slot 0.
pub(crate) fn begin_process_batch(
    resources: &HemisphereResources,
    batch: &mut HemisphereBatch,
    transfer: &mut PendingTransfer,
) -> Result<(), BakeError> {
    if batch.index == 0 {
        return Ok(());
    }
    debug_assert!(!transfer.started, "previous batch was never resolved");

    let device = resources.device();
    let grid = resources.grid;
    let level = |size: u32| Viewport::new(0, 0, size * grid.count_x, size * grid.count_y);

    let (mut read, mut write) = (0, 1);
    let mut out_size = grid.size / 2;
    device
        .draw_fullscreen(&FullscreenDraw {
            program: resources.first_pass,
            target: resources.framebuffers[write],
            viewport: level(out_size),
            inputs: &[resources.color[read], resources.weights],
        })
        .map_err(BakeError::resource("Hemisphere weighting pass failed"))?;

    while out_size > 1 {
        std::mem::swap(&mut read, &mut write);
        out_size /= 2;
        device
            .draw_fullscreen(&FullscreenDraw {
                program: resources.downsample,
                target: resources.framebuffers[write],
                viewport: level(out_size),
                inputs: &[resources.color[read]],
            })
            .map_err(BakeError::resource("Hemisphere downsample pass failed"))?;
    }

    let reduced = level(1);
    if write == 0 {
        device
            .copy_framebuffer(resources.framebuffers[0], resources.framebuffers[1], reduced)
            .map_err(BakeError::resource("Could not copy the reduced hemispheres"))?;
    }
    device
        .read_pixels_async(resources.framebuffers[1], reduced, resources.transfer)
        .map_err(BakeError::resource("Could not read back the reduced hemispheres"))?;

    log::debug!("LightMassBaking: reducing a batch of {} hemispheres", batch.index);
    transfer.started = true;
    transfer.count = batch.index;
    std::mem::swap(&mut transfer.slots, &mut batch.slots);
    batch.index = 0;
    Ok(())
}

/// Resolves the pending readback into `lightmap`.
///
/// Succeeds trivially when no readback is pending. A slot is written only if
/// its validity exceeds 0.9 and its texel is still unresolved; the color is
/// divided by the validity.
pub(crate) fn finish_process_batch(
    resources: &HemisphereResources,
    transfer: &mut PendingTransfer,
    lightmap: &mut LightmapTarget<'_>,
) -> Result<(), BakeError> {
    if !transfer.started {
        return Ok(());
    }

    let slots = &transfer.slots[..transfer.count];
    let mut written = 0usize;
    resources
        .device()
        .map_buffer_read(resources.transfer, &mut |bytes| {
            for (slot, &(x, y)) in slots.iter().enumerate() {
                let start = slot * TEXEL_BYTES;
                let Some(chunk) = bytes.get(start..start + TEXEL_BYTES) else {
                    break;
                };
                let [r, g, b, validity]: [f32; 4] = bytemuck::pod_read_unaligned(chunk);
                if validity > VALIDITY_THRESHOLD && !lightmap.is_resolved(x, y) {
                    let scale = 1.0 / validity;
                    lightmap.write_irradiance(x, y, [r * scale, g * scale, b * scale]);
                    written += 1;
                }
            }
        })
        .map_err(BakeError::MapFailed)?;

    log::debug!(
        "LightMassBaking: resolved {written} of {} hemispheres",
        transfer.count
    );
    transfer.started = false;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bake_lane::hemicube::HemisphereGrid;
    use crate::bake_lane::weights::default_hemisphere_weights;
    use lightmass_core::math::LinearRgba;
    use lightmass_core::renderer::GraphicsDevice;
    use lightmass_infra::graphics::software::SoftwareDevice;
    use std::sync::Arc;

    const SIZE: u32 = 16;

    fn setup() -> (Arc<SoftwareDevice>, HemisphereResources) {
        let device = Arc::new(SoftwareDevice::new());
        let resources =
            HemisphereResources::create(device.clone(), HemisphereGrid::new(SIZE)).unwrap();
        resources
            .upload_weights(&default_hemisphere_weights(SIZE))
            .unwrap();
        (device, resources)
    }

    fn fill_tile(device: &SoftwareDevice, resources: &HemisphereResources, slot: usize, color: LinearRgba) {
        let (x, y) = resources.grid.tile_origin(slot);
        device
            .fill_viewport(resources.color[0], Viewport::new(x, y, 3 * SIZE, SIZE), color)
            .unwrap();
    }

    #[test]
    fn batch_reports_when_full() {
        let mut batch = HemisphereBatch::new(2);
        batch.record((3, 4));
        assert!(!batch.advance());
        assert!(batch.advance());
        assert_eq!(batch.index(), 2);
    }

    #[test]
    fn finishing_without_a_transfer_is_a_no_op() {
        let (_device, resources) = setup();
        let mut transfer = PendingTransfer::new(resources.grid.capacity());
        let mut data = vec![0.0; 4];
        let mut lightmap = LightmapTarget::new(&mut data, 2, 2, 1).unwrap();
        finish_process_batch(&resources, &mut transfer, &mut lightmap).unwrap();
        assert!(lightmap.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn reduction_resolves_valid_slots_into_their_texels() {
        let (device, resources) = setup();
        let capacity = resources.grid.capacity();
        let mut batch = HemisphereBatch::new(capacity);
        let mut transfer = PendingTransfer::new(capacity);

        device
            .clear_framebuffer(resources.framebuffers[0], LinearRgba::TRANSPARENT)
            .unwrap();
        fill_tile(&device, &resources, 0, LinearRgba::new(2.0, 1.0, 0.5, 1.0));
        fill_tile(&device, &resources, 1, LinearRgba::new(4.0, 4.0, 4.0, 0.0));
        batch.record((1, 0));
        batch.advance();
        batch.record((0, 1));
        batch.advance();

        begin_process_batch(&resources, &mut batch, &mut transfer).unwrap();
        assert_eq!(batch.index(), 0);
        assert!(transfer.is_started());

        let mut data = vec![0.0; 12];
        let mut lightmap = LightmapTarget::new(&mut data, 2, 2, 3).unwrap();
        finish_process_batch(&resources, &mut transfer, &mut lightmap).unwrap();
        assert!(!transfer.is_started());

        let cosine: f32 = default_hemisphere_weights(SIZE).iter().map(|w| w.color).sum();
        let texel = lightmap.texel(1, 0);
        for (got, radiance) in texel.iter().zip([2.0, 1.0, 0.5]) {
            assert!((got - radiance * cosine).abs() < 1e-4, "{texel:?}");
        }
        // Zero validity: the slot is discarded.
        assert!(!lightmap.is_resolved(0, 1));
    }

    #[test]
    fn resolve_never_overwrites_a_resolved_texel() {
        let (device, resources) = setup();
        let capacity = resources.grid.capacity();
        let mut batch = HemisphereBatch::new(capacity);
        let mut transfer = PendingTransfer::new(capacity);

        device
            .clear_framebuffer(resources.framebuffers[0], LinearRgba::WHITE)
            .unwrap();
        batch.record((0, 0));
        batch.advance();
        begin_process_batch(&resources, &mut batch, &mut transfer).unwrap();

        let mut data = vec![7.0];
        let mut lightmap = LightmapTarget::new(&mut data, 1, 1, 1).unwrap();
        finish_process_batch(&resources, &mut transfer, &mut lightmap).unwrap();
        assert_eq!(lightmap.texel(0, 0), &[7.0]);
    }

    #[test]
    fn map_failures_are_reported_as_such() {
        let (device, resources) = setup();
        let capacity = resources.grid.capacity();
        let mut batch = HemisphereBatch::new(capacity);
        let mut transfer = PendingTransfer::new(capacity);
        batch.record((0, 0));
        batch.advance();
        begin_process_batch(&resources, &mut batch, &mut transfer).unwrap();

        device.fail_next_map();
        let mut data = vec![0.0];
        let mut lightmap = LightmapTarget::new(&mut data, 1, 1, 1).unwrap();
        let err = finish_process_batch(&resources, &mut transfer, &mut lightmap).unwrap_err();
        assert!(matches!(err, BakeError::MapFailed(_)));
    }
}
