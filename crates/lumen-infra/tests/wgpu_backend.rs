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

#![cfg(feature = "wgpu")]

use lumen_core::renderer::*;
use lumen_infra::WgpuBackend;

/// A device over the first available adapter, or `None` on machines without one.
fn device() -> Option<RenderDevice<WgpuBackend>> {
    let _ = lumen_infra::logging::try_init();
    let backend = match WgpuBackend::new_headless() {
        Ok(backend) => backend,
        Err(err) => {
            eprintln!("Skipping wgpu test: {err}");
            return None;
        }
    };
    RenderDevice::new(backend, RhiSettings::default()).ok()
}

#[test]
fn test_resources_round_trip_through_the_gpu_device() {
    let Some(device) = device() else { return };

    // --- 1. ARRANGE ---
    let texture_desc = TextureDescription {
        label: Some("Albedo".into()),
        width: 64,
        height: 64,
        mip_levels: 7,
        ..Default::default()
    };

    // --- 2. ACT ---
    let buffer = device
        .create_buffer(&BufferDescription {
            label: Some("Vertices".into()),
            size: 256,
            usage: BufferUsage::VERTEX,
            struct_stride: 16,
        })
        .unwrap();
    let texture = device.create_texture(&texture_desc).unwrap();
    let view = device
        .create_resource_view(ResourceRef::Texture(texture), &ResourceViewDescription::default())
        .unwrap();
    let sampler = device.create_sampler(&SamplerDescription::default()).unwrap();

    // --- 3. ASSERT ---
    assert!(device.stats().allocated_bytes >= 256 + 64 * 64 * 4);

    device.destroy_resource_view(view).unwrap();
    device.destroy_sampler(sampler).unwrap();
    device.destroy_texture(texture).unwrap();
    device.destroy_buffer(buffer).unwrap();
    for _ in 0..=device.settings().backbuffer_count {
        device.begin_frame();
    }
    assert_eq!(device.stats().pending_destructions, 0);
    assert_eq!(device.stats().allocated_bytes, 0);
}

#[test]
fn test_states_are_cached_on_the_gpu_device() {
    let Some(device) = device() else { return };

    let a = device
        .create_blend_state(&BlendStateDescription::alpha_blending())
        .unwrap();
    let b = device
        .create_blend_state(&BlendStateDescription::alpha_blending())
        .unwrap();
    assert_eq!(a.id(), b.id());

    let depth = device
        .create_depth_stencil_state(&DepthStencilStateDescription::default())
        .unwrap();
    assert!(depth.native().depth_write_enabled);

    let cache = device.stats().cache;
    assert_eq!(cache.hits, 1);
    assert_eq!(cache.misses, 2);
}

#[test]
fn test_unmappable_formats_are_reported_unsupported() {
    let Some(device) = device() else { return };

    let result = device.create_texture(&TextureDescription {
        format: ResourceFormat::R32G32B32Float,
        ..Default::default()
    });
    assert!(matches!(
        result,
        Err(ResourceError::Format(FormatError::UnsupportedByBackend {
            format: ResourceFormat::R32G32B32Float,
            backend: "wgpu",
        }))
    ));
}
