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

use crate::renderer::api::*;
use crate::renderer::error::ResourceError;
use std::fmt::{self, Debug};

/// Bounds shared by every native handle type.
///
/// Handles are cheap to clone: an index, a raw driver handle or a reference-counted
/// wrapper. Cloning a handle never creates a new native object.
pub trait NativeHandle: Clone + Debug + Send + Sync + 'static {}

impl<T: Clone + Debug + Send + Sync + 'static> NativeHandle for T {}

/// Optional features that change which descriptions are valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceCapabilities {
    /// The rasterizer can run with depth clipping disabled.
    pub depth_clip_disable: bool,
    /// Triangles can be rasterized as wireframe.
    pub wireframe_fill: bool,
    /// Render targets can use different blend states.
    pub independent_blend: bool,
}

impl Default for DeviceCapabilities {
    fn default() -> Self {
        Self {
            depth_clip_disable: true,
            wireframe_fill: true,
            independent_blend: true,
        }
    }
}

/// A freshly created buffer or texture with its memory allocation, if the backend
/// manages memory separately from resources.
#[derive(Debug)]
pub struct NativeResource<B: RhiBackend + ?Sized> {
    /// The resource object.
    pub resource: B::Resource,
    /// The backing memory, released after the resource.
    pub allocation: Option<B::Allocation>,
}

/// Native objects and shared state handed to [`RhiBackend::create_graphics_pipeline`].
pub struct NativePipelineDescription<'a, B: RhiBackend + ?Sized> {
    /// Debug label.
    pub label: Option<&'a str>,
    /// Shaders with their stages, in pipeline order.
    pub shaders: &'a [(ShaderStage, B::Shader)],
    /// Cached blend state.
    pub blend_state: &'a B::BlendState,
    /// Cached depth/stencil state.
    pub depth_stencil_state: &'a B::DepthStencilState,
    /// Cached rasterizer state.
    pub rasterizer_state: &'a B::RasterizerState,
    /// Cached input layout, `None` when the pipeline reads no vertex buffers.
    pub input_layout: Option<&'a B::InputLayout>,
    /// Cached binding layout.
    pub binding_layout: &'a B::BindingLayout,
    /// Primitive topology.
    pub topology: PrimitiveTopology,
    /// Attachment formats and sample count.
    pub render_pass: &'a RenderPassLayout,
}

/// Category of a native object. Each category has its own destruction queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DestructionCategory {
    /// Memory allocations.
    Allocation,
    /// Buffers and textures.
    Resource,
    /// Timestamp query indices.
    TimestampQuery,
    /// Occlusion query indices.
    OcclusionQuery,
    /// Pipeline state objects and shaders.
    Pipeline,
    /// Root signatures and pipeline layouts.
    BindingLayout,
    /// Views and samplers.
    Descriptor,
}

impl DestructionCategory {
    /// Number of categories.
    pub const COUNT: usize = 7;

    /// Every category, in release order.
    pub const ALL: [DestructionCategory; Self::COUNT] = [
        DestructionCategory::Pipeline,
        DestructionCategory::BindingLayout,
        DestructionCategory::Descriptor,
        DestructionCategory::Resource,
        DestructionCategory::Allocation,
        DestructionCategory::TimestampQuery,
        DestructionCategory::OcclusionQuery,
    ];
}

/// Any native object owned by the device, tagged with its kind.
pub enum NativeObject<B: RhiBackend + ?Sized> {
    /// A memory allocation.
    Allocation(B::Allocation),
    /// A buffer or texture.
    Resource(B::Resource),
    /// A shader-read view.
    ResourceView(B::ResourceView),
    /// A writable view.
    UnorderedAccessView(B::UnorderedAccessView),
    /// A sampler.
    Sampler(B::Sampler),
    /// A shader.
    Shader(B::Shader),
    /// A blend state.
    BlendState(B::BlendState),
    /// A depth/stencil state.
    DepthStencilState(B::DepthStencilState),
    /// A rasterizer state.
    RasterizerState(B::RasterizerState),
    /// An input layout.
    InputLayout(B::InputLayout),
    /// A root signature or pipeline layout.
    BindingLayout(B::BindingLayout),
    /// A pipeline state object.
    Pipeline(B::Pipeline),
    /// A timestamp query index.
    TimestampQuery(u32),
    /// An occlusion query index.
    OcclusionQuery(u32),
}

impl<B: RhiBackend + ?Sized> NativeObject<B> {
    /// The destruction queue this object goes through.
    pub fn category(&self) -> DestructionCategory {
        match self {
            NativeObject::Allocation(_) => DestructionCategory::Allocation,
            NativeObject::Resource(_) => DestructionCategory::Resource,
            NativeObject::ResourceView(_)
            | NativeObject::UnorderedAccessView(_)
            | NativeObject::Sampler(_) => DestructionCategory::Descriptor,
            NativeObject::Shader(_)
            | NativeObject::BlendState(_)
            | NativeObject::DepthStencilState(_)
            | NativeObject::RasterizerState(_)
            | NativeObject::InputLayout(_)
            | NativeObject::Pipeline(_) => DestructionCategory::Pipeline,
            NativeObject::BindingLayout(_) => DestructionCategory::BindingLayout,
            NativeObject::TimestampQuery(_) => DestructionCategory::TimestampQuery,
            NativeObject::OcclusionQuery(_) => DestructionCategory::OcclusionQuery,
        }
    }
}

impl<B: RhiBackend + ?Sized> Debug for NativeObject<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeObject::Allocation(h) => f.debug_tuple("Allocation").field(h).finish(),
            NativeObject::Resource(h) => f.debug_tuple("Resource").field(h).finish(),
            NativeObject::ResourceView(h) => f.debug_tuple("ResourceView").field(h).finish(),
            NativeObject::UnorderedAccessView(h) => {
                f.debug_tuple("UnorderedAccessView").field(h).finish()
            }
            NativeObject::Sampler(h) => f.debug_tuple("Sampler").field(h).finish(),
            NativeObject::Shader(h) => f.debug_tuple("Shader").field(h).finish(),
            NativeObject::BlendState(h) => f.debug_tuple("BlendState").field(h).finish(),
            NativeObject::DepthStencilState(h) => {
                f.debug_tuple("DepthStencilState").field(h).finish()
            }
            NativeObject::RasterizerState(h) => f.debug_tuple("RasterizerState").field(h).finish(),
            NativeObject::InputLayout(h) => f.debug_tuple("InputLayout").field(h).finish(),
            NativeObject::BindingLayout(h) => f.debug_tuple("BindingLayout").field(h).finish(),
            NativeObject::Pipeline(h) => f.debug_tuple("Pipeline").field(h).finish(),
            NativeObject::TimestampQuery(i) => f.debug_tuple("TimestampQuery").field(i).finish(),
            NativeObject::OcclusionQuery(i) => f.debug_tuple("OcclusionQuery").field(i).finish(),
        }
    }
}

/// The handful of operations that differ between graphics APIs.
///
/// Everything else (caching, deferred destruction, redundant-state elision and
/// validation) lives in the generic core and is shared by every backend.
pub trait RhiBackend: Send + Sync + 'static {
    /// Native buffer or texture.
    type Resource: NativeHandle;
    /// Native memory allocation.
    type Allocation: NativeHandle;
    /// Native shader-read view.
    type ResourceView: NativeHandle;
    /// Native writable view.
    type UnorderedAccessView: NativeHandle;
    /// Native sampler.
    type Sampler: NativeHandle;
    /// Native shader.
    type Shader: NativeHandle;
    /// Native blend state.
    type BlendState: NativeHandle;
    /// Native depth/stencil state.
    type DepthStencilState: NativeHandle;
    /// Native rasterizer state.
    type RasterizerState: NativeHandle;
    /// Native input layout.
    type InputLayout: NativeHandle;
    /// Native root signature or pipeline layout.
    type BindingLayout: NativeHandle;
    /// Native pipeline state object.
    type Pipeline: NativeHandle;
    /// Native command list.
    type CommandList: NativeCommandList<Backend = Self>;

    /// A short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Optional features of the device.
    fn capabilities(&self) -> DeviceCapabilities;

    /// Returns `true` if the format has a native equivalent on this backend.
    fn supports_format(&self, format: ResourceFormat) -> bool;

    /// Creates a buffer.
    /// ## Errors
    /// * `ResourceError::CreationFailed` - If the driver rejects the buffer.
    fn create_buffer(
        &self,
        desc: &BufferDescription<'_>,
    ) -> Result<NativeResource<Self>, ResourceError>;

    /// Creates a texture.
    /// ## Errors
    /// * `ResourceError::Format` - If the format has no native equivalent.
    /// * `ResourceError::CreationFailed` - If the driver rejects the texture.
    fn create_texture(
        &self,
        desc: &TextureDescription<'_>,
    ) -> Result<NativeResource<Self>, ResourceError>;

    /// Creates a shader-read view of `resource`.
    fn create_resource_view(
        &self,
        resource: &Self::Resource,
        desc: &ResourceViewDescription,
    ) -> Result<Self::ResourceView, ResourceError>;

    /// Creates a writable view of `resource`.
    fn create_unordered_access_view(
        &self,
        resource: &Self::Resource,
        desc: &UnorderedAccessViewDescription,
    ) -> Result<Self::UnorderedAccessView, ResourceError>;

    /// Creates a sampler.
    fn create_sampler(&self, desc: &SamplerDescription) -> Result<Self::Sampler, ResourceError>;

    /// Creates a shader from compiled bytecode.
    fn create_shader(&self, desc: &ShaderDescription<'_>) -> Result<Self::Shader, ResourceError>;

    /// Translates a blend description into a native state object.
    fn create_blend_state(
        &self,
        desc: &BlendStateDescription,
    ) -> Result<Self::BlendState, ResourceError>;

    /// Translates a depth/stencil description into a native state object.
    fn create_depth_stencil_state(
        &self,
        desc: &DepthStencilStateDescription,
    ) -> Result<Self::DepthStencilState, ResourceError>;

    /// Translates a rasterizer description into a native state object.
    /// ## Arguments
    /// * `multisampled` - Whether the state is used with a multisampled render target.
    fn create_rasterizer_state(
        &self,
        desc: &RasterizerStateDescription,
        multisampled: bool,
    ) -> Result<Self::RasterizerState, ResourceError>;

    /// Creates an input layout matching `layout` against the vertex shader `bytecode`.
    fn create_input_layout(
        &self,
        layout: &ResolvedInputLayout,
        bytecode: &[u8],
    ) -> Result<Self::InputLayout, ResourceError>;

    /// Creates a root signature or pipeline layout.
    fn create_binding_layout(
        &self,
        desc: &BindingLayoutDescription,
    ) -> Result<Self::BindingLayout, ResourceError>;

    /// Creates a pipeline state object from already cached native state.
    fn create_graphics_pipeline(
        &self,
        desc: &NativePipelineDescription<'_, Self>,
    ) -> Result<Self::Pipeline, ResourceError>;

    /// Releases a native object. Release cannot fail.
    fn release(&self, object: NativeObject<Self>);

    /// Opens a native command list for recording.
    fn begin_command_list(&self) -> Result<Self::CommandList, ResourceError>;

    /// Closes and submits a native command list.
    fn submit_command_list(&self, list: Self::CommandList) -> Result<(), ResourceError>;
}

/// Native binding calls issued by the state tracker after redundancy checks.
///
/// `None` arguments unbind the slot.
pub trait NativeCommandList: Send + 'static {
    /// The backend this command list records for.
    type Backend: RhiBackend + ?Sized;

    /// Binds a pipeline state object.
    fn bind_pipeline(&mut self, pipeline: &<Self::Backend as RhiBackend>::Pipeline);

    /// Binds a shader to its stage.
    fn bind_shader(
        &mut self,
        stage: ShaderStage,
        shader: Option<&<Self::Backend as RhiBackend>::Shader>,
    );

    /// Binds a constant buffer.
    fn bind_constant_buffer(
        &mut self,
        stage: ShaderStage,
        slot: u32,
        buffer: Option<&<Self::Backend as RhiBackend>::Resource>,
    );

    /// Binds a sampler.
    fn bind_sampler(
        &mut self,
        stage: ShaderStage,
        slot: u32,
        sampler: Option<&<Self::Backend as RhiBackend>::Sampler>,
    );

    /// Binds a shader-read view.
    fn bind_resource_view(
        &mut self,
        stage: ShaderStage,
        slot: u32,
        view: Option<&<Self::Backend as RhiBackend>::ResourceView>,
    );

    /// Binds a writable view.
    fn bind_unordered_access_view(
        &mut self,
        stage: ShaderStage,
        slot: u32,
        view: Option<&<Self::Backend as RhiBackend>::UnorderedAccessView>,
    );

    /// Binds a blend state with its dynamic blend factor and sample mask.
    fn bind_blend_state(
        &mut self,
        state: &<Self::Backend as RhiBackend>::BlendState,
        blend_factor: [f32; 4],
        sample_mask: u32,
    );

    /// Binds a depth/stencil state with its dynamic stencil reference.
    fn bind_depth_stencil_state(
        &mut self,
        state: &<Self::Backend as RhiBackend>::DepthStencilState,
        stencil_ref: u8,
    );

    /// Binds a rasterizer state.
    fn bind_rasterizer_state(&mut self, state: &<Self::Backend as RhiBackend>::RasterizerState);

    /// Sets the viewport.
    fn set_viewport(&mut self, viewport: &Viewport);

    /// Sets the scissor rectangle.
    fn set_scissor_rect(&mut self, rect: &ScissorRect);

    /// Binds a vertex buffer.
    fn bind_vertex_buffer(
        &mut self,
        slot: u32,
        buffer: Option<&<Self::Backend as RhiBackend>::Resource>,
        stride: u32,
        offset: u64,
    );

    /// Binds an index buffer.
    fn bind_index_buffer(
        &mut self,
        buffer: Option<&<Self::Backend as RhiBackend>::Resource>,
        format: IndexFormat,
        offset: u64,
    );

    /// Sets the primitive topology.
    fn set_primitive_topology(&mut self, topology: PrimitiveTopology);

    /// Makes pending unbinds visible to the driver before further binds.
    fn flush(&mut self);
}
