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

use anyhow::anyhow;
use anyhow::Result;
use wgpu::{Features, Instance};

/// Holds the core WGPU state objects required for offscreen baking.
/// No surface is involved: every target is a texture owned by the device.
#[derive(Debug)]
pub struct WgpuGraphicsContext {
    /// The selected adapter.
    pub adapter: wgpu::Adapter,
    /// The logical device.
    pub device: wgpu::Device,
    /// Its command queue.
    pub queue: wgpu::Queue,

    // Store info for easy access
    /// Human-readable adapter name.
    pub adapter_name: String,
    /// Backend API of the adapter.
    pub adapter_backend: wgpu::Backend,
    /// Features enabled on the device.
    pub active_device_features: wgpu::Features,
}

impl WgpuGraphicsContext {
    /// Asynchronously requests an adapter and a logical device without a surface.
    ///
    /// ## Returns
    /// * `Result<Self>` - The initialized context, or an error if no adapter
    ///   or device is available.
    pub async fn new_headless() -> Result<Self> {
        log::info!("Initializing headless WGPU Graphics Context...");

        // --- 1. Select Adapter ---
        let instance = Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                force_fallback_adapter: false,
                compatible_surface: None,
            })
            .await
            .map_err(|e| anyhow!("Failed to find a graphics adapter: {}", e))?;

        let adapter_info = adapter.get_info();
        log::info!(
            "Using graphics adapter: \"{}\" (Backend: {:?})",
            adapter_info.name,
            adapter_info.backend
        );

        // --- 2. Create Logical Device and Command Queue from Adapter ---
        // The reduction only needs core features: float targets, no filtering.
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("LightMass Logical Device"),
                required_features: Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            })
            .await
            .map_err(|e| anyhow!("Failed to create logical device: {}", e))?;
        log::info!("Logical device and command queue created.");

        device.on_uncaptured_error(Box::new(|e| {
            log::error!("WGPU Uncaptured Error: {e:?}");
        }));

        let active_device_features = device.features();
        log::debug!("Active device features: {active_device_features:?}");

        Ok(WgpuGraphicsContext {
            adapter,
            device,
            queue,
            adapter_name: adapter_info.name,
            adapter_backend: adapter_info.backend,
            active_device_features,
        })
    }

    /// The logical device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// The command queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}
