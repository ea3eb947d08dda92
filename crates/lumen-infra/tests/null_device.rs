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

use lumen_core::renderer::*;
use lumen_infra::graphics::null::{NullBackend, NullCommand, NullHandle};
use std::borrow::Cow;

fn device_with(backend: NullBackend, settings: RhiSettings) -> RenderDevice<NullBackend> {
    RenderDevice::new(backend, settings).expect("null device")
}

fn device() -> RenderDevice<NullBackend> {
    device_with(NullBackend::new(), RhiSettings::default())
}

fn shader(
    device: &RenderDevice<NullBackend>,
    stage: ShaderStage,
    bindings: Vec<ShaderResourceBinding>,
) -> ShaderId {
    device
        .create_shader(&ShaderDescription {
            label: None,
            stage,
            bytecode: Cow::Borrowed(b"null bytecode"),
            entry_point: Cow::Borrowed("main"),
            reflection: ShaderReflection {
                bindings,
                ..Default::default()
            },
        })
        .expect("shader")
}

fn vertex_buffer(device: &RenderDevice<NullBackend>) -> BufferId {
    device
        .create_buffer(&BufferDescription {
            label: Some(Cow::Borrowed("vertices")),
            size: 1024,
            usage: BufferUsage::VERTEX,
            struct_stride: 16,
        })
        .expect("buffer")
}

fn forward_pass() -> RenderPassLayout {
    RenderPassLayout {
        color_formats: vec![ResourceFormat::R8G8B8A8UnormSrgb],
        depth_format: Some(ResourceFormat::D24UnormS8Uint),
        sample_count: 1,
    }
}

#[test]
fn test_identical_states_share_one_native_object() {
    let device = device();

    let a = device
        .create_blend_state(&BlendStateDescription::alpha_blending())
        .unwrap();
    let b = device
        .create_blend_state(&BlendStateDescription::alpha_blending())
        .unwrap();
    let opaque = device
        .create_blend_state(&BlendStateDescription::default())
        .unwrap();

    assert_eq!(a, b);
    assert_eq!(a.native(), b.native());
    assert_ne!(a.id(), opaque.id());
    assert_eq!(device.backend().created_count("blend state"), 2);

    let cache = device.stats().cache;
    assert_eq!(cache.hits, 1);
    assert_eq!(cache.misses, 2);
    assert_eq!(cache.blend_states, 2);
}

#[test]
fn test_input_layout_is_looked_up_without_recreation() {
    let device = device();
    let vs = shader(&device, ShaderStage::Vertex, Vec::new());
    let elements = [
        VertexElement::new(VertexSemantic::Position, ResourceFormat::R32G32B32Float),
        VertexElement::new(VertexSemantic::TexCoord, ResourceFormat::R32G32Float),
        VertexElement::new(VertexSemantic::TexCoord, ResourceFormat::R32G32Float),
    ];
    let layouts = [VertexBufferLayout::new(28, &elements[..])];

    let first = device.get_input_layout(&layouts, vs).unwrap().unwrap();
    let second = device.get_input_layout(&layouts, vs).unwrap().unwrap();
    assert_eq!(first.id(), second.id());
    assert_eq!(device.backend().created_count("input layout"), 1);

    // The second texture coordinate gets semantic index 1.
    let resolved = resolve_input_layout(&layouts).unwrap();
    assert_eq!(resolved.elements[2].semantic_index, 1);
    assert_eq!(resolved.elements[2].offset, 20);

    // No vertex input, no layout.
    assert!(device.get_input_layout(&[], vs).unwrap().is_none());
}

#[test]
fn test_destroyed_buffer_survives_in_flight_frames() {
    // --- 1. ARRANGE ---
    let device = device_with(
        NullBackend::new(),
        RhiSettings {
            backbuffer_count: 2,
            ..Default::default()
        },
    );
    let buffer = vertex_buffer(&device);
    assert_eq!(device.backend().live_count(), 2);

    // --- 2. ACT ---
    device.destroy_buffer(buffer).unwrap();

    // --- 3. ASSERT ---
    // Frames 1 and 2 may still read the buffer.
    for _ in 0..2 {
        device.begin_frame();
        assert_eq!(device.backend().live_count(), 2);
    }
    device.begin_frame();
    assert_eq!(device.backend().live_count(), 0);
    assert_eq!(device.stats().reclaimed_objects, 2);
}

#[test]
fn test_redundant_binds_never_reach_the_backend() {
    let device = device();
    let vb = vertex_buffer(&device);
    let viewport = Viewport::from_size(1280.0, 720.0);

    let mut list = device.begin_command_list().unwrap();
    assert!(list.set_vertex_buffer(0, Some(vb), 0));
    assert!(!list.set_vertex_buffer(0, Some(vb), 0));
    assert!(list.set_primitive_topology(PrimitiveTopology::TriangleList));
    assert!(!list.set_primitive_topology(PrimitiveTopology::TriangleList));
    assert!(list.set_viewport(&viewport));
    assert!(!list.set_viewport(&viewport));

    let stats = device.submit_command_list(list).unwrap();
    assert_eq!(stats.state_changes, 3);
    assert_eq!(stats.redundant_state_changes, 3);
    assert_eq!(
        device.backend().commands(),
        vec![
            NullCommand::BindVertexBuffer(0, Some(NullHandle(1)), 16, 0),
            NullCommand::SetPrimitiveTopology(PrimitiveTopology::TriangleList),
            NullCommand::SetViewport(viewport),
        ]
    );
    assert_eq!(device.stats().command_lists, stats);
}

#[test]
fn test_read_view_evicts_writable_view_of_same_texture() {
    let device = device();
    let texture = device
        .create_texture(&TextureDescription {
            width: 64,
            height: 64,
            usage: TextureUsage::SHADER_RESOURCE | TextureUsage::UNORDERED_ACCESS,
            ..Default::default()
        })
        .unwrap();
    let srv = device
        .create_resource_view(ResourceRef::Texture(texture), &ResourceViewDescription::default())
        .unwrap();
    let uav = device
        .create_unordered_access_view(
            ResourceRef::Texture(texture),
            &UnorderedAccessViewDescription::default(),
        )
        .unwrap();

    let mut list = device.begin_command_list().unwrap();
    assert!(list.set_unordered_access_view(ShaderStage::Pixel, 1, Some(uav)));
    assert!(list.set_resource_view(ShaderStage::Vertex, 0, Some(srv)));
    assert_eq!(list.unordered_access_view(ShaderStage::Pixel, 1), None);
    assert_eq!(list.resource_view(ShaderStage::Vertex, 0), Some(srv));
    device.submit_command_list(list).unwrap();

    // Handles: texture 1, allocation 2, read view 3, writable view 4.
    assert_eq!(
        device.backend().commands(),
        vec![
            NullCommand::BindUnorderedAccessView(ShaderStage::Pixel, 1, Some(NullHandle(4))),
            NullCommand::BindUnorderedAccessView(ShaderStage::Pixel, 1, None),
            NullCommand::Flush,
            NullCommand::BindResourceView(ShaderStage::Vertex, 0, Some(NullHandle(3))),
        ]
    );
}

#[test]
fn test_pipelines_with_identical_bindings_share_a_layout() {
    let device = device();
    let globals = ShaderResourceBinding::new("Globals", ViewType::ConstantBuffer, 0);
    let pixel_bindings = vec![
        globals.clone(),
        ShaderResourceBinding::new("Albedo", ViewType::ShaderResource, 0)
            .with_dimension(BindingDimension::Texture2D),
        ShaderResourceBinding::new("LinearWrap", ViewType::Sampler, 0),
    ];
    let vs = shader(&device, ShaderStage::Vertex, vec![globals]);
    let lit = shader(&device, ShaderStage::Pixel, pixel_bindings.clone());
    let unlit = shader(&device, ShaderStage::Pixel, pixel_bindings);

    let desc = GraphicsPipelineDescription {
        label: Some(Cow::Borrowed("lit")),
        vertex_shader: Some(vs),
        pixel_shader: Some(lit),
        vertex_layouts: Cow::Owned(vec![VertexBufferLayout::new(
            12,
            vec![VertexElement::new(
                VertexSemantic::Position,
                ResourceFormat::R32G32B32Float,
            )],
        )]),
        render_pass: forward_pass(),
        ..Default::default()
    };
    let lit = device.create_graphics_pipeline(&desc).unwrap();
    let unlit = device
        .create_graphics_pipeline(&GraphicsPipelineDescription {
            label: Some(Cow::Borrowed("unlit")),
            pixel_shader: Some(unlit),
            ..desc.clone()
        })
        .unwrap();

    assert!(device.shares_binding_layout(lit, unlit).unwrap());
    assert_eq!(device.backend().created_count("binding layout"), 1);
    assert_eq!(device.backend().created_count("pipeline"), 2);
    // Both pipelines reuse every cached fixed-function state.
    assert_eq!(device.backend().created_count("blend state"), 1);
    assert_eq!(device.backend().created_count("rasterizer state"), 1);

    let mut list = device.begin_command_list().unwrap();
    assert!(list.set_pipeline(lit).is_err(), "no render pass is open");
    list.begin_render_pass(&forward_pass()).unwrap();
    assert_eq!(list.set_pipeline(lit), Ok(true));
    assert_eq!(list.set_pipeline(lit), Ok(false));
    list.end_render_pass();

    let mut msaa = forward_pass();
    msaa.sample_count = 4;
    list.begin_render_pass(&msaa).unwrap();
    assert!(matches!(
        list.set_pipeline(unlit),
        Err(ValidationError::RenderPassMismatch(_))
    ));
    device.submit_command_list(list).unwrap();
}

#[test]
fn test_invalid_pipeline_creates_nothing() {
    let device = device();
    let ps = shader(&device, ShaderStage::Pixel, Vec::new());
    let result = device.create_graphics_pipeline(&GraphicsPipelineDescription {
        pixel_shader: Some(ps),
        render_pass: forward_pass(),
        ..Default::default()
    });
    assert!(matches!(
        result,
        Err(ResourceError::Validation(ValidationError::MissingVertexShader))
    ));
    assert_eq!(device.backend().created_count("pipeline"), 0);
    assert_eq!(device.stats().cache.misses, 0);
}

#[test]
fn test_pipeline_rebind_is_checked_against_each_new_pass() {
    // ARRANGE
    let device = device();
    let vs = shader(&device, ShaderStage::Vertex, Vec::new());
    let pipeline = device
        .create_graphics_pipeline(&GraphicsPipelineDescription {
            vertex_shader: Some(vs),
            render_pass: forward_pass(),
            ..Default::default()
        })
        .unwrap();
    let mut hdr = forward_pass();
    hdr.color_formats = vec![ResourceFormat::R16G16B16A16Float];

    // ACT
    let mut list = device.begin_command_list().unwrap();
    list.begin_render_pass(&forward_pass()).unwrap();
    let first = list.set_pipeline(pipeline);
    list.end_render_pass();
    let between_passes = list.set_pipeline(pipeline);
    list.begin_render_pass(&hdr).unwrap();
    let wrong_pass = list.set_pipeline(pipeline);
    list.end_render_pass();
    list.begin_render_pass(&forward_pass()).unwrap();
    let rebound = list.set_pipeline(pipeline);
    let stats = device.submit_command_list(list).unwrap();

    // ASSERT
    assert_eq!(first, Ok(true));
    assert!(between_passes.is_err());
    assert!(matches!(
        wrong_pass,
        Err(ValidationError::RenderPassMismatch(_))
    ));
    assert_eq!(rebound, Ok(true));
    assert_eq!(stats.state_changes, 2);
}

#[test]
fn test_out_of_range_descriptions_create_nothing() {
    // ARRANGE
    let device = device();
    let vs = shader(&device, ShaderStage::Vertex, Vec::new());
    let too_many_mips = TextureDescription {
        width: 4,
        height: 4,
        mip_levels: 40,
        ..Default::default()
    };
    let too_wide = TextureDescription {
        width: 1 << 30,
        format: ResourceFormat::R32G32B32A32Float,
        ..Default::default()
    };
    let past_vertex_end = GraphicsPipelineDescription {
        vertex_shader: Some(vs),
        vertex_layouts: Cow::Owned(vec![VertexBufferLayout::new(
            u32::MAX,
            vec![VertexElement::at_offset(
                VertexSemantic::TexCoord,
                ResourceFormat::R32G32Float,
                u32::MAX - 2,
            )],
        )]),
        render_pass: forward_pass(),
        ..Default::default()
    };

    // ACT
    let mips = device.create_texture(&too_many_mips);
    let wide = device.create_texture(&too_wide);
    let pipeline = device.create_graphics_pipeline(&past_vertex_end);

    // ASSERT
    assert!(matches!(
        mips,
        Err(ResourceError::CreationFailed { object: "texture", .. })
    ));
    assert!(matches!(
        wide,
        Err(ResourceError::Format(FormatError::SizeOverflow { .. }))
    ));
    assert!(matches!(
        pipeline,
        Err(ResourceError::Validation(
            ValidationError::VertexElementOutOfRange { slot: 0, element: 0 }
        ))
    ));
    assert_eq!(device.backend().created_count("texture"), 0);
    assert_eq!(device.backend().created_count("input layout"), 0);
    assert_eq!(device.backend().created_count("pipeline"), 0);
}

#[test]
fn test_missing_features_are_rejected_up_front() {
    let backend = NullBackend::with_capabilities(DeviceCapabilities {
        depth_clip_disable: false,
        wireframe_fill: false,
        independent_blend: false,
    })
    .without_formats(&[ResourceFormat::BC7Unorm]);
    let device = device_with(backend, RhiSettings::default());

    let wireframe = RasterizerStateDescription {
        fill_mode: FillMode::Wireframe,
        ..Default::default()
    };
    assert!(matches!(
        device.create_rasterizer_state(&wireframe, false),
        Err(ResourceError::Validation(ValidationError::WireframeUnsupported))
    ));

    let mut blend = BlendStateDescription::alpha_blending();
    blend.independent_blend = true;
    assert!(matches!(
        device.create_blend_state(&blend),
        Err(ResourceError::Validation(
            ValidationError::IndependentBlendUnsupported { target: 1 }
        ))
    ));

    let texture = TextureDescription {
        format: ResourceFormat::BC7Unorm,
        width: 256,
        height: 256,
        ..Default::default()
    };
    assert!(matches!(
        device.create_texture(&texture),
        Err(ResourceError::Format(FormatError::UnsupportedByBackend {
            format: ResourceFormat::BC7Unorm,
            backend: "null",
        }))
    ));
    assert_eq!(device.backend().live_count(), 0);
}

#[test]
fn test_query_slots_return_after_frame_lag() {
    let device = device_with(
        NullBackend::new(),
        RhiSettings {
            backbuffer_count: 1,
            max_timestamp_queries: 2,
            ..Default::default()
        },
    );
    let first = device.create_query(QueryType::Timestamp).unwrap();
    let _second = device.create_query(QueryType::Timestamp).unwrap();
    assert!(matches!(
        device.create_query(QueryType::Timestamp),
        Err(ResourceError::QueryPoolExhausted)
    ));
    assert_eq!(device.available_queries(QueryType::Occlusion), 1024);

    device.destroy_query(first).unwrap();
    device.begin_frame();
    assert_eq!(device.available_queries(QueryType::Timestamp), 0);
    device.begin_frame();
    assert_eq!(device.available_queries(QueryType::Timestamp), 1);
    assert!(device.create_query(QueryType::Timestamp).is_ok());
}

#[test]
fn test_command_lists_record_on_many_threads() {
    let device = device();
    let workers: Vec<_> = (0..4)
        .map(|_| {
            let device = device.clone();
            std::thread::spawn(move || {
                let mut list = device.begin_command_list()?;
                list.set_primitive_topology(PrimitiveTopology::LineStrip);
                list.set_scissor_rect(&ScissorRect {
                    x: 0,
                    y: 0,
                    width: 64,
                    height: 64,
                });
                device.submit_command_list(list)
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap().unwrap();
    }

    let stats = device.stats();
    assert_eq!(stats.submitted_command_lists, 4);
    assert_eq!(stats.command_lists.state_changes, 8);
    assert_eq!(device.backend().submitted_count(), 4);
}

#[test]
fn test_dropping_the_device_releases_every_native_object() {
    let backend = NullBackend::new();
    let observer = backend.clone();
    let device = device_with(backend, RhiSettings::default());

    let vb = vertex_buffer(&device);
    let _sampler = device.create_sampler(&SamplerDescription::default()).unwrap();
    let _state = device
        .create_depth_stencil_state(&DepthStencilStateDescription::default())
        .unwrap();
    device.destroy_buffer(vb).unwrap();
    device.begin_frame();
    assert_eq!(observer.live_count(), 4);

    drop(device);
    assert_eq!(observer.live_count(), 0);
    assert_eq!(observer.released_count(), 4);
}

#[test]
fn test_settings_from_json_drive_the_device() {
    let settings = RhiSettings::from_json_str(r#"{ "backbuffer_count": 1 }"#).unwrap();
    let device = device_with(NullBackend::new(), settings);
    let vb = vertex_buffer(&device);
    device.destroy_buffer(vb).unwrap();
    device.begin_frame();
    device.begin_frame();
    assert_eq!(device.backend().live_count(), 0);

    assert!(matches!(
        RhiSettings::from_json_str(r#"{ "backbuffer_count": 0 }"#),
        Err(RenderError::InvalidConfiguration(_))
    ));
}
