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

use anyhow::{anyhow, Result};
use lumen_core::renderer::DeviceCapabilities;
use wgpu::{Backend, Features};

/// Device features used when the adapter offers them.
const OPTIONAL_FEATURES: Features = Features::DEPTH_CLIP_CONTROL
    .union(Features::POLYGON_MODE_LINE)
    .union(Features::CONSERVATIVE_RASTERIZATION)
    .union(Features::TEXTURE_COMPRESSION_BC)
    .union(Features::TEXTURE_FORMAT_16BIT_NORM)
    .union(Features::DEPTH32FLOAT_STENCIL8);

/// Returns a human-readable name for a backend.
pub fn backend_name(backend: Backend) -> &'static str {
    match backend {
        Backend::Vulkan => "Vulkan",
        Backend::Metal => "Metal",
        Backend::Dx12 => "DirectX 12",
        Backend::Gl => "OpenGL",
        Backend::BrowserWebGpu => "WebGPU",
        Backend::Noop => "No-op",
    }
}

/// Holds the core wgpu state objects used by [`super::WgpuBackend`].
/// The context is headless: no surface is created.
#[derive(Debug)]
pub struct WgpuContext {
    /// The selected adapter.
    pub adapter: wgpu::Adapter,
    /// The logical device.
    pub device: wgpu::Device,
    /// The device's command queue.
    pub queue: wgpu::Queue,

    // Store info for easy access
    /// Adapter name as reported by the driver.
    pub adapter_name: String,
    /// Native API behind the adapter.
    pub adapter_backend: Backend,
    /// Features enabled on the device.
    pub active_device_features: Features,
    /// Optional rasterizer and blend features.
    pub capabilities: DeviceCapabilities,
}

impl WgpuContext {
    /// Asynchronously picks an adapter and creates a logical device without any surface.
    ///
    /// ## Returns
    /// * `Result<Self>` - The initialized context, or an error if no adapter or device
    ///   could be obtained.
    pub async fn new_headless() -> Result<Self> {
        log::info!("Initializing headless wgpu context...");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                force_fallback_adapter: false,
                compatible_surface: None,
            })
            .await
            .map_err(|e| anyhow!("No suitable graphics adapter: {e}"))?;
        Self::from_adapter(adapter).await
    }

    /// Creates the logical device and command queue from a pre-selected adapter.
    pub async fn from_adapter(adapter: wgpu::Adapter) -> Result<Self> {
        let adapter_info = adapter.get_info();
        log::info!(
            "Using graphics adapter: \"{}\" (Backend: {})",
            adapter_info.name,
            backend_name(adapter_info.backend)
        );

        let features_to_enable = adapter.features() & OPTIONAL_FEATURES;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Lumen Logical Device"),
                required_features: features_to_enable,
                required_limits: wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits()),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| anyhow!("Failed to create logical device: {e}"))?;
        log::info!("Logical device and command queue created.");

        device.on_uncaptured_error(Box::new(|e| {
            log::error!("wgpu uncaptured error: {e:?}");
        }));

        let active_device_features = device.features();
        log::debug!("Active device features: {active_device_features:?}");

        let capabilities = DeviceCapabilities {
            depth_clip_disable: active_device_features.contains(Features::DEPTH_CLIP_CONTROL),
            wireframe_fill: active_device_features.contains(Features::POLYGON_MODE_LINE),
            independent_blend: adapter
                .get_downlevel_capabilities()
                .flags
                .contains(wgpu::DownlevelFlags::INDEPENDENT_BLEND),
        };

        Ok(Self {
            adapter,
            device,
            queue,
            adapter_name: adapter_info.name,
            adapter_backend: adapter_info.backend,
            active_device_features,
            capabilities,
        })
    }
}
