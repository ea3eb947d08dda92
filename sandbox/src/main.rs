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

// Lumen Sandbox
// Records a few frames against the null backend and reports what reached it.

use std::borrow::Cow;

use anyhow::Result;
use lumen_core::renderer::*;
use lumen_infra::graphics::null::NullBackend;

const FRAMES: u64 = 6;

const VERTEX_ELEMENTS: &[VertexElement] = &[
    VertexElement::new(VertexSemantic::Position, ResourceFormat::R32G32B32Float),
    VertexElement::new(VertexSemantic::Color, ResourceFormat::R32G32B32Float),
];

struct Scene {
    pipeline: PipelineId,
    vertex_buffer: BufferId,
    albedo_view: ResourceViewId,
    sampler: SamplerId,
}

fn forward_pass() -> RenderPassLayout {
    RenderPassLayout {
        color_formats: vec![ResourceFormat::B8G8R8A8UnormSrgb],
        depth_format: Some(ResourceFormat::D32Float),
        sample_count: 1,
    }
}

fn shader(
    device: &RenderDevice<NullBackend>,
    stage: ShaderStage,
    bindings: Vec<ShaderResourceBinding>,
) -> Result<ShaderId> {
    let id = device.create_shader(&ShaderDescription {
        label: Some(Cow::Owned(format!("{stage:?} shader"))),
        stage,
        bytecode: Cow::Borrowed(b"sandbox"),
        entry_point: Cow::Borrowed("main"),
        reflection: ShaderReflection {
            bindings,
            ..Default::default()
        },
    })?;
    Ok(id)
}

fn build_scene(device: &RenderDevice<NullBackend>) -> Result<Scene> {
    log::info!("Sandbox: creating scene resources...");

    let vertex_buffer = device.create_buffer(&BufferDescription {
        label: Some("Triangle Vertex Buffer".into()),
        size: 3 * 24,
        usage: BufferUsage::VERTEX,
        struct_stride: 24,
    })?;

    let albedo = device.create_texture(&TextureDescription {
        label: Some("Albedo".into()),
        width: 256,
        height: 256,
        mip_levels: 9,
        ..Default::default()
    })?;
    let albedo_view =
        device.create_resource_view(ResourceRef::Texture(albedo), &Default::default())?;
    let sampler = device.create_sampler(&SamplerDescription::default())?;

    let globals = ShaderResourceBinding::new("Globals", ViewType::ConstantBuffer, 0);
    let vertex_shader = shader(device, ShaderStage::Vertex, vec![globals.clone()])?;
    let pixel_shader = shader(
        device,
        ShaderStage::Pixel,
        vec![
            globals,
            ShaderResourceBinding::new("Albedo", ViewType::ShaderResource, 0)
                .with_dimension(BindingDimension::Texture2D),
            ShaderResourceBinding::new("LinearWrap", ViewType::Sampler, 0),
        ],
    )?;

    let pipeline = device.create_graphics_pipeline(&GraphicsPipelineDescription {
        label: Some("Unlit".into()),
        vertex_shader: Some(vertex_shader),
        pixel_shader: Some(pixel_shader),
        blend: BlendStateDescription::alpha_blending(),
        vertex_layouts: Cow::Owned(vec![VertexBufferLayout::new(24, VERTEX_ELEMENTS)]),
        render_pass: forward_pass(),
        ..Default::default()
    })?;

    Ok(Scene {
        pipeline,
        vertex_buffer,
        albedo_view,
        sampler,
    })
}

fn record_frame(device: &RenderDevice<NullBackend>, scene: &Scene) -> Result<CommandListStats> {
    let mut list = device.begin_command_list()?;
    list.begin_render_pass(&forward_pass())?;
    list.set_pipeline(scene.pipeline)?;
    list.set_viewport(&Viewport::from_size(1280.0, 720.0));
    list.set_primitive_topology(PrimitiveTopology::TriangleList);
    list.set_vertex_buffer(0, Some(scene.vertex_buffer), 0);

    // Two draws sharing the same material: the second set of binds is elided.
    for _ in 0..2 {
        list.set_resource_view(ShaderStage::Pixel, 0, Some(scene.albedo_view));
        list.set_sampler_state(ShaderStage::Pixel, 0, Some(scene.sampler));
    }
    list.end_render_pass();

    Ok(device.submit_command_list(list)?)
}

fn main() -> Result<()> {
    lumen_infra::logging::init();

    let settings = RhiSettings::from_json_str(r#"{ "backbuffer_count": 2, "debug_device": true }"#)?;
    let backend = NullBackend::new();
    let observer = backend.clone();
    let device = RenderDevice::new(backend, settings)?;

    let scene = build_scene(&device)?;
    let mut transient = None;

    for _ in 0..FRAMES {
        let frame = device.begin_frame();

        // A per-frame upload buffer, destroyed as soon as the frame is recorded.
        if let Some(buffer) = transient.take() {
            device.destroy_buffer(buffer)?;
        }
        transient = Some(device.create_buffer(&BufferDescription {
            label: Some(format!("Upload {frame}").into()),
            size: 64 * 1024,
            usage: BufferUsage::CONSTANT,
            struct_stride: 0,
        })?);

        let stats = record_frame(&device, &scene)?;
        log::info!(
            "Sandbox: frame {frame}: {} state changes, {} elided, {} objects pending release",
            stats.state_changes,
            stats.redundant_state_changes,
            device.stats().pending_destructions
        );
    }

    let stats = device.stats();
    log::info!(
        "Sandbox: {} command lists, cache {} hits / {} misses, {} objects reclaimed, {} bytes allocated",
        stats.submitted_command_lists,
        stats.cache.hits,
        stats.cache.misses,
        stats.reclaimed_objects,
        stats.allocated_bytes
    );
    log::info!(
        "Sandbox: null backend saw {} commands and holds {} live objects",
        observer.commands().len(),
        observer.live_count()
    );

    drop(device);
    log::info!(
        "Sandbox: shutdown left {} live objects",
        observer.live_count()
    );
    Ok(())
}
