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

use super::command::WgpuCommandList;
use super::context::WgpuContext;
use super::conversions::{self, IntoWgpu};
use lumen_core::renderer::*;
use std::borrow::Cow;
use std::num::NonZeroU32;
use std::sync::Arc;

// --- Native objects ---

/// A buffer or texture.
#[derive(Debug, Clone)]
pub enum WgpuResource {
    /// A buffer.
    Buffer(wgpu::Buffer),
    /// A texture.
    Texture(wgpu::Texture),
}

/// A shader-read or writable view. Buffer views bind the whole buffer.
#[derive(Debug, Clone)]
pub enum WgpuView {
    /// A buffer bound as storage.
    Buffer(wgpu::Buffer),
    /// A texture view.
    Texture(wgpu::TextureView),
}

/// A compiled shader module with its entry point.
#[derive(Debug, Clone)]
pub struct WgpuShader {
    /// The shader module.
    pub module: wgpu::ShaderModule,
    /// Entry point name.
    pub entry_point: String,
    /// Stage the module runs in.
    pub stage: ShaderStage,
}

/// Per-target blend state, expanded to every color target slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WgpuBlendState {
    /// Blend equation per target, `None` when blending is off.
    pub targets: [Option<wgpu::BlendState>; MAX_RENDER_TARGETS],
    /// Written channels per target.
    pub write_masks: [wgpu::ColorWrites; MAX_RENDER_TARGETS],
    /// Enables alpha-to-coverage.
    pub alpha_to_coverage: bool,
}

/// Depth and stencil tests. The attachment format is supplied by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct WgpuDepthStencilState {
    /// Enables depth writes.
    pub depth_write_enabled: bool,
    /// Depth comparison, `Always` when the depth test is off.
    pub depth_compare: wgpu::CompareFunction,
    /// Stencil faces and masks.
    pub stencil: wgpu::StencilState,
}

/// Rasterizer state. Topology is supplied by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WgpuRasterizerState {
    /// Culled face.
    pub cull_mode: Option<wgpu::Face>,
    /// Front face winding.
    pub front_face: wgpu::FrontFace,
    /// Fill or line rasterization.
    pub polygon_mode: wgpu::PolygonMode,
    /// Disables depth clipping.
    pub unclipped_depth: bool,
    /// Conservative rasterization.
    pub conservative: bool,
    /// Depth bias.
    pub bias: wgpu::DepthBiasState,
    /// Enables the scissor test.
    pub scissor_test: bool,
    /// Used with a multisampled render target.
    pub multisampled: bool,
}

/// Vertex buffer layouts of a pipeline.
#[derive(Debug, Clone)]
pub struct WgpuInputLayout {
    /// One entry per vertex buffer slot.
    pub buffers: Arc<[WgpuVertexBuffer]>,
}

/// Stride, stepping and attributes of one vertex buffer slot.
#[derive(Debug, Clone)]
pub struct WgpuVertexBuffer {
    /// Bytes between two vertices.
    pub stride: u64,
    /// Per-vertex or per-instance stepping.
    pub step_mode: wgpu::VertexStepMode,
    /// Attributes read from the slot.
    pub attributes: Vec<wgpu::VertexAttribute>,
}

/// One bind group layout per descriptor table, and the pipeline layout using them.
#[derive(Debug, Clone)]
pub struct WgpuBindingLayout {
    /// Bind group layouts in table order.
    pub bind_group_layouts: Arc<[wgpu::BindGroupLayout]>,
    /// The pipeline layout.
    pub pipeline_layout: wgpu::PipelineLayout,
}

fn creation_failed(object: &'static str, details: impl Into<String>) -> ResourceError {
    ResourceError::CreationFailed {
        object,
        details: details.into(),
    }
}

// --- Backend ---

/// The wgpu backend.
#[derive(Debug, Clone)]
pub struct WgpuBackend {
    context: Arc<WgpuContext>,
}

impl WgpuBackend {
    /// Wraps an initialized context.
    pub fn new(context: WgpuContext) -> Self {
        Self {
            context: Arc::new(context),
        }
    }

    /// Creates a headless backend on the preferred adapter, blocking until the device
    /// is ready.
    pub fn new_headless() -> anyhow::Result<Self> {
        pollster::block_on(WgpuContext::new_headless()).map(Self::new)
    }

    /// The wgpu objects behind this backend.
    pub fn context(&self) -> &WgpuContext {
        &self.context
    }

    fn device(&self) -> &wgpu::Device {
        &self.context.device
    }

    /// Runs `create` inside a validation error scope, turning wgpu validation errors
    /// into `ResourceError::CreationFailed`.
    fn scoped<T>(
        &self,
        object: &'static str,
        create: impl FnOnce(&wgpu::Device) -> T,
    ) -> Result<T, ResourceError> {
        self.device().push_error_scope(wgpu::ErrorFilter::Validation);
        let value = create(self.device());
        match pollster::block_on(self.device().pop_error_scope()) {
            None => {
                log::debug!("WgpuBackend: created {object}");
                Ok(value)
            }
            Some(error) => {
                log::error!("WgpuBackend: failed to create {object}: {error}");
                Err(creation_failed(object, error.to_string()))
            }
        }
    }

    fn texture_format(&self, format: ResourceFormat) -> Result<wgpu::TextureFormat, ResourceError> {
        conversions::texture_format(format)
            .filter(|native| {
                self.context
                    .active_device_features
                    .contains(native.required_features())
            })
            .ok_or_else(|| {
                FormatError::UnsupportedByBackend {
                    format,
                    backend: self.name(),
                }
                .into()
            })
    }

    fn address_mode(&self, mode: AddressMode) -> wgpu::AddressMode {
        let clamp_to_border = self
            .context
            .active_device_features
            .contains(wgpu::Features::ADDRESS_MODE_CLAMP_TO_BORDER);
        match mode {
            AddressMode::Border if !clamp_to_border => {
                log::warn!("WgpuBackend: border addressing unsupported, clamping to edge");
                wgpu::AddressMode::ClampToEdge
            }
            mode => mode.into_wgpu(),
        }
    }
}

fn binding_type(entry: &BindingLayoutEntry) -> Result<wgpu::BindingType, ResourceError> {
    let is_buffer = matches!(
        entry.dimension,
        BindingDimension::Buffer
            | BindingDimension::StructuredBuffer
            | BindingDimension::ByteAddressBuffer
    );
    let storage = |read_only| wgpu::BindingType::Buffer {
        ty: wgpu::BufferBindingType::Storage { read_only },
        has_dynamic_offset: false,
        min_binding_size: None,
    };
    match entry.view_type {
        ViewType::ConstantBuffer => Ok(wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        }),
        ViewType::Sampler => Ok(wgpu::BindingType::Sampler(
            wgpu::SamplerBindingType::Filtering,
        )),
        ViewType::ShaderResource if is_buffer => Ok(storage(true)),
        ViewType::UnorderedAccess if is_buffer => Ok(storage(false)),
        ViewType::ShaderResource => {
            let multisampled = entry.dimension == BindingDimension::Texture2DMS;
            let view_dimension =
                conversions::binding_view_dimension(entry.dimension).ok_or_else(|| {
                    creation_failed(
                        "binding layout",
                        format!("{:?} bindings are not supported", entry.dimension),
                    )
                })?;
            Ok(wgpu::BindingType::Texture {
                sample_type: conversions::sample_type(entry.return_type, multisampled),
                view_dimension,
                multisampled,
            })
        }
        ViewType::UnorderedAccess => Err(creation_failed(
            "binding layout",
            format!(
                "writable texture at slot {} needs a storage format",
                entry.slot
            ),
        )),
    }
}

impl RhiBackend for WgpuBackend {
    type Resource = WgpuResource;
    type Allocation = ();
    type ResourceView = WgpuView;
    type UnorderedAccessView = WgpuView;
    type Sampler = wgpu::Sampler;
    type Shader = WgpuShader;
    type BlendState = WgpuBlendState;
    type DepthStencilState = WgpuDepthStencilState;
    type RasterizerState = WgpuRasterizerState;
    type InputLayout = WgpuInputLayout;
    type BindingLayout = WgpuBindingLayout;
    type Pipeline = wgpu::RenderPipeline;
    type CommandList = WgpuCommandList;

    fn name(&self) -> &'static str {
        "wgpu"
    }

    fn capabilities(&self) -> DeviceCapabilities {
        self.context.capabilities
    }

    fn supports_format(&self, format: ResourceFormat) -> bool {
        self.texture_format(format).is_ok()
    }

    fn create_buffer(
        &self,
        desc: &BufferDescription<'_>,
    ) -> Result<NativeResource<Self>, ResourceError> {
        let buffer = self.scoped("buffer", |device| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: desc.label.as_deref(),
                size: desc.size,
                usage: desc.usage.into_wgpu(),
                mapped_at_creation: false,
            })
        })?;
        Ok(NativeResource {
            resource: WgpuResource::Buffer(buffer),
            allocation: None,
        })
    }

    fn create_texture(
        &self,
        desc: &TextureDescription<'_>,
    ) -> Result<NativeResource<Self>, ResourceError> {
        let format = self.texture_format(desc.format)?;
        let texture = self.scoped("texture", |device| {
            device.create_texture(&wgpu::TextureDescriptor {
                label: desc.label.as_deref(),
                size: wgpu::Extent3d {
                    width: desc.width,
                    height: desc.height,
                    depth_or_array_layers: desc.depth_or_array_layers.max(1),
                },
                mip_level_count: desc.mip_levels.max(1),
                sample_count: desc.sample_count.max(1),
                dimension: desc.dimension.into_wgpu(),
                format,
                usage: desc.usage.into_wgpu(),
                view_formats: &[],
            })
        })?;
        Ok(NativeResource {
            resource: WgpuResource::Texture(texture),
            allocation: None,
        })
    }

    fn create_resource_view(
        &self,
        resource: &WgpuResource,
        desc: &ResourceViewDescription,
    ) -> Result<WgpuView, ResourceError> {
        match (resource, desc.dimension.into_wgpu()) {
            (WgpuResource::Buffer(buffer), None) => Ok(WgpuView::Buffer(buffer.clone())),
            (WgpuResource::Texture(texture), Some(dimension)) => {
                let format = desc.format.map(|f| self.texture_format(f)).transpose()?;
                let view = self.scoped("resource view", |_| {
                    texture.create_view(&wgpu::TextureViewDescriptor {
                        format,
                        dimension: Some(dimension),
                        base_mip_level: desc.base_mip,
                        mip_level_count: desc.mip_count,
                        base_array_layer: desc.base_layer,
                        array_layer_count: desc.layer_count,
                        ..Default::default()
                    })
                })?;
                Ok(WgpuView::Texture(view))
            }
            _ => Err(creation_failed(
                "resource view",
                format!("{:?} view does not match the resource", desc.dimension),
            )),
        }
    }

    fn create_unordered_access_view(
        &self,
        resource: &WgpuResource,
        desc: &UnorderedAccessViewDescription,
    ) -> Result<WgpuView, ResourceError> {
        match (resource, desc.dimension.into_wgpu()) {
            (WgpuResource::Buffer(buffer), None) => Ok(WgpuView::Buffer(buffer.clone())),
            (WgpuResource::Texture(texture), Some(dimension)) => {
                let format = desc.format.map(|f| self.texture_format(f)).transpose()?;
                let view = self.scoped("unordered access view", |_| {
                    texture.create_view(&wgpu::TextureViewDescriptor {
                        format,
                        dimension: Some(dimension),
                        base_mip_level: desc.mip,
                        mip_level_count: Some(1),
                        base_array_layer: desc.base_layer,
                        array_layer_count: desc.layer_count,
                        ..Default::default()
                    })
                })?;
                Ok(WgpuView::Texture(view))
            }
            _ => Err(creation_failed(
                "unordered access view",
                format!("{:?} view does not match the resource", desc.dimension),
            )),
        }
    }

    fn create_sampler(&self, desc: &SamplerDescription) -> Result<wgpu::Sampler, ResourceError> {
        let all_linear = [desc.min_filter, desc.mag_filter, desc.mip_filter]
            .iter()
            .all(|filter| *filter == FilterMode::Linear);
        // Anisotropy is only valid with linear filtering everywhere.
        let anisotropy_clamp = if all_linear {
            desc.max_anisotropy.max(1)
        } else {
            1
        };
        let uses_border = [desc.address_u, desc.address_v, desc.address_w]
            .contains(&AddressMode::Border);
        self.scoped("sampler", |device| {
            device.create_sampler(&wgpu::SamplerDescriptor {
                label: None,
                address_mode_u: self.address_mode(desc.address_u),
                address_mode_v: self.address_mode(desc.address_v),
                address_mode_w: self.address_mode(desc.address_w),
                mag_filter: desc.mag_filter.into_wgpu(),
                min_filter: desc.min_filter.into_wgpu(),
                mipmap_filter: desc.mip_filter.into_wgpu(),
                lod_min_clamp: desc.min_lod,
                lod_max_clamp: desc.max_lod,
                compare: desc.compare.map(|compare| compare.into_wgpu()),
                anisotropy_clamp,
                border_color: uses_border.then(|| desc.border_color.into_wgpu()),
            })
        })
    }

    fn create_shader(&self, desc: &ShaderDescription<'_>) -> Result<WgpuShader, ResourceError> {
        let stage: Option<wgpu::ShaderStages> = desc.stage.into_wgpu();
        if stage.is_none() {
            return Err(creation_failed(
                "shader",
                format!("{:?} shaders are not supported", desc.stage),
            ));
        }
        let source = std::str::from_utf8(&desc.bytecode)
            .map_err(|e| creation_failed("shader", format!("source is not UTF-8: {e}")))?;
        let module = self.scoped("shader", |device| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: desc.label.as_deref(),
                source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(source)),
            })
        })?;
        Ok(WgpuShader {
            module,
            entry_point: desc.entry_point.to_string(),
            stage: desc.stage,
        })
    }

    fn create_blend_state(
        &self,
        desc: &BlendStateDescription,
    ) -> Result<WgpuBlendState, ResourceError> {
        let mut state = WgpuBlendState {
            targets: [None; MAX_RENDER_TARGETS],
            write_masks: [wgpu::ColorWrites::ALL; MAX_RENDER_TARGETS],
            alpha_to_coverage: desc.alpha_to_coverage,
        };
        for index in 0..MAX_RENDER_TARGETS {
            let target = if desc.independent_blend {
                &desc.render_targets[index]
            } else {
                &desc.render_targets[0]
            };
            state.write_masks[index] = target.write_mask.into_wgpu();
            state.targets[index] = target.blending_enabled.then(|| wgpu::BlendState {
                color: wgpu::BlendComponent {
                    src_factor: target.source_blend.into_wgpu(),
                    dst_factor: target.dest_blend.into_wgpu(),
                    operation: target.blend_op.into_wgpu(),
                },
                alpha: wgpu::BlendComponent {
                    src_factor: target.source_blend_alpha.into_wgpu(),
                    dst_factor: target.dest_blend_alpha.into_wgpu(),
                    operation: target.blend_op_alpha.into_wgpu(),
                },
            });
        }
        Ok(state)
    }

    fn create_depth_stencil_state(
        &self,
        desc: &DepthStencilStateDescription,
    ) -> Result<WgpuDepthStencilState, ResourceError> {
        let stencil = if desc.stencil_test {
            let front: wgpu::StencilFaceState = desc.front_face.into_wgpu();
            let back = if desc.separate_front_and_back {
                desc.back_face.into_wgpu()
            } else {
                front
            };
            wgpu::StencilState {
                front,
                back,
                read_mask: desc.stencil_read_mask as u32,
                write_mask: desc.stencil_write_mask as u32,
            }
        } else {
            wgpu::StencilState::default()
        };
        Ok(WgpuDepthStencilState {
            depth_write_enabled: desc.depth_test && desc.depth_write,
            depth_compare: if desc.depth_test {
                desc.depth_test_func.into_wgpu()
            } else {
                wgpu::CompareFunction::Always
            },
            stencil,
        })
    }

    fn create_rasterizer_state(
        &self,
        desc: &RasterizerStateDescription,
        multisampled: bool,
    ) -> Result<WgpuRasterizerState, ResourceError> {
        let conservative = desc.conservative_rasterization
            && self
                .context
                .active_device_features
                .contains(wgpu::Features::CONSERVATIVE_RASTERIZATION);
        if desc.conservative_rasterization && !conservative {
            log::warn!("WgpuBackend: conservative rasterization unsupported, ignoring");
        }
        Ok(WgpuRasterizerState {
            cull_mode: desc.cull_mode.into_wgpu(),
            front_face: if desc.front_counter_clockwise {
                wgpu::FrontFace::Ccw
            } else {
                wgpu::FrontFace::Cw
            },
            polygon_mode: desc.fill_mode.into_wgpu(),
            unclipped_depth: !desc.depth_clip,
            conservative,
            bias: wgpu::DepthBiasState {
                constant: desc.depth_bias,
                slope_scale: desc.slope_scaled_depth_bias,
                clamp: desc.depth_bias_clamp,
            },
            scissor_test: desc.scissor_test,
            multisampled,
        })
    }

    fn create_input_layout(
        &self,
        layout: &ResolvedInputLayout,
        _bytecode: &[u8],
    ) -> Result<WgpuInputLayout, ResourceError> {
        let mut buffers = Vec::with_capacity(layout.buffers.len());
        for buffer in &layout.buffers {
            let mut attributes = Vec::new();
            for (location, element) in layout.elements.iter().enumerate() {
                if element.slot != buffer.slot {
                    continue;
                }
                let format = conversions::vertex_format(element.format).ok_or(
                    FormatError::UnsupportedByBackend {
                        format: element.format,
                        backend: self.name(),
                    },
                )?;
                attributes.push(wgpu::VertexAttribute {
                    format,
                    offset: element.offset as u64,
                    shader_location: location as u32,
                });
            }
            buffers.push(WgpuVertexBuffer {
                stride: buffer.stride as u64,
                step_mode: buffer.step_rate.into_wgpu(),
                attributes,
            });
        }
        Ok(WgpuInputLayout {
            buffers: buffers.into(),
        })
    }

    fn create_binding_layout(
        &self,
        desc: &BindingLayoutDescription,
    ) -> Result<WgpuBindingLayout, ResourceError> {
        let mut bind_group_layouts = Vec::with_capacity(desc.tables.len());
        for (index, table) in desc.tables.iter().enumerate() {
            let mut entries = Vec::with_capacity(table.entries.len());
            for entry in &table.entries {
                let range = table
                    .ranges
                    .iter()
                    .find(|range| {
                        range.view_type == entry.view_type
                            && (range.base_slot..range.base_slot + range.count)
                                .contains(&entry.slot)
                    })
                    .ok_or_else(|| {
                        creation_failed(
                            "binding layout",
                            format!("no range covers slot {} of table {index}", entry.slot),
                        )
                    })?;
                entries.push(wgpu::BindGroupLayoutEntry {
                    binding: range.offset_in_table + (entry.slot - range.base_slot),
                    visibility: entry.visibility.into_wgpu(),
                    ty: binding_type(entry)?,
                    count: if entry.count > 1 {
                        NonZeroU32::new(entry.count)
                    } else {
                        None
                    },
                });
            }
            let layout = self.scoped("binding layout", |device| {
                device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: None,
                    entries: &entries,
                })
            })?;
            bind_group_layouts.push(layout);
        }

        let layout_refs: Vec<&wgpu::BindGroupLayout> = bind_group_layouts.iter().collect();
        let pipeline_layout = self.scoped("binding layout", |device| {
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: None,
                bind_group_layouts: &layout_refs,
                push_constant_ranges: &[],
            })
        })?;
        Ok(WgpuBindingLayout {
            bind_group_layouts: bind_group_layouts.into(),
            pipeline_layout,
        })
    }

    fn create_graphics_pipeline(
        &self,
        desc: &NativePipelineDescription<'_, Self>,
    ) -> Result<wgpu::RenderPipeline, ResourceError> {
        let mut vertex = None;
        let mut pixel = None;
        for (stage, shader) in desc.shaders {
            match stage {
                ShaderStage::Vertex => vertex = Some(shader),
                ShaderStage::Pixel => pixel = Some(shader),
                other => {
                    return Err(creation_failed(
                        "pipeline",
                        format!("{other:?} shaders are not supported"),
                    ))
                }
            }
        }
        let vertex = vertex.ok_or_else(|| creation_failed("pipeline", "missing vertex shader"))?;

        let vertex_buffers: Vec<wgpu::VertexBufferLayout<'_>> = desc
            .input_layout
            .map(|layout| {
                layout
                    .buffers
                    .iter()
                    .map(|buffer| wgpu::VertexBufferLayout {
                        array_stride: buffer.stride,
                        step_mode: buffer.step_mode,
                        attributes: &buffer.attributes,
                    })
                    .collect()
            })
            .unwrap_or_default();

        let blend = desc.blend_state;
        let color_targets = desc
            .render_pass
            .color_formats
            .iter()
            .enumerate()
            .map(|(index, format)| {
                Ok(Some(wgpu::ColorTargetState {
                    format: self.texture_format(*format)?,
                    blend: blend.targets[index],
                    write_mask: blend.write_masks[index],
                }))
            })
            .collect::<Result<Vec<_>, ResourceError>>()?;

        let rasterizer = desc.rasterizer_state;
        let depth_stencil = desc
            .render_pass
            .depth_format
            .map(|format| -> Result<_, ResourceError> {
                Ok(wgpu::DepthStencilState {
                    format: self.texture_format(format)?,
                    depth_write_enabled: desc.depth_stencil_state.depth_write_enabled,
                    depth_compare: desc.depth_stencil_state.depth_compare,
                    stencil: desc.depth_stencil_state.stencil.clone(),
                    bias: rasterizer.bias,
                })
            })
            .transpose()?;

        let layout = &desc.binding_layout.pipeline_layout;
        self.scoped("pipeline", |device| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: desc.label,
                layout: Some(layout),
                vertex: wgpu::VertexState {
                    module: &vertex.module,
                    entry_point: Some(&vertex.entry_point),
                    compilation_options: Default::default(),
                    buffers: &vertex_buffers,
                },
                primitive: wgpu::PrimitiveState {
                    topology: desc.topology.into_wgpu(),
                    strip_index_format: None,
                    front_face: rasterizer.front_face,
                    cull_mode: rasterizer.cull_mode,
                    unclipped_depth: rasterizer.unclipped_depth,
                    polygon_mode: rasterizer.polygon_mode,
                    conservative: rasterizer.conservative,
                },
                depth_stencil,
                multisample: wgpu::MultisampleState {
                    count: desc.render_pass.sample_count.max(1),
                    mask: !0,
                    alpha_to_coverage_enabled: blend.alpha_to_coverage,
                },
                fragment: pixel.map(|pixel| wgpu::FragmentState {
                    module: &pixel.module,
                    entry_point: Some(&pixel.entry_point),
                    compilation_options: Default::default(),
                    targets: &color_targets,
                }),
                multiview: None,
                cache: None,
            })
        })
    }

    fn release(&self, object: NativeObject<Self>) {
        // Everything else is freed when its last handle drops.
        match object {
            NativeObject::Resource(WgpuResource::Buffer(buffer)) => buffer.destroy(),
            NativeObject::Resource(WgpuResource::Texture(texture)) => texture.destroy(),
            _ => {}
        }
    }

    fn begin_command_list(&self) -> Result<WgpuCommandList, ResourceError> {
        let encoder = self
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("lumen command list"),
            });
        Ok(WgpuCommandList::new(encoder))
    }

    fn submit_command_list(&self, list: WgpuCommandList) -> Result<(), ResourceError> {
        let buffer = list.finish();
        self.context.queue.submit(std::iter::once(buffer));
        Ok(())
    }
}
