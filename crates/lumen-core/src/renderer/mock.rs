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

//! A recording backend used by unit tests.

use crate::renderer::api::*;
use crate::renderer::error::ResourceError;
use crate::renderer::traits::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
pub(crate) struct MockBackend {
    next_handle: AtomicU64,
    pub(crate) capabilities: DeviceCapabilities,
    pub(crate) fail_creation: AtomicBool,
    creations: Mutex<HashMap<&'static str, usize>>,
    released: Arc<Mutex<Vec<String>>>,
    pub(crate) commands: Arc<Mutex<Vec<String>>>,
}

impl MockBackend {
    pub(crate) fn with_capabilities(capabilities: DeviceCapabilities) -> Self {
        Self {
            capabilities,
            ..Default::default()
        }
    }

    fn create(&self, kind: &'static str) -> Result<u64, ResourceError> {
        if self.fail_creation.load(Ordering::SeqCst) {
            return Err(ResourceError::CreationFailed {
                object: kind,
                details: "mock failure".to_string(),
            });
        }
        *self.creations.lock().unwrap().entry(kind).or_default() += 1;
        Ok(self.next_handle.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub(crate) fn creation_count(&self, kind: &str) -> usize {
        self.creations.lock().unwrap().get(kind).copied().unwrap_or(0)
    }

    pub(crate) fn released(&self) -> Vec<String> {
        self.released.lock().unwrap().clone()
    }

    /// The release log, readable after the backend itself is gone.
    pub(crate) fn released_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.released)
    }

    pub(crate) fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    pub(crate) fn clear_commands(&self) {
        self.commands.lock().unwrap().clear();
    }
}

impl RhiBackend for MockBackend {
    type Resource = u64;
    type Allocation = u64;
    type ResourceView = u64;
    type UnorderedAccessView = u64;
    type Sampler = u64;
    type Shader = u64;
    type BlendState = u64;
    type DepthStencilState = u64;
    type RasterizerState = u64;
    type InputLayout = u64;
    type BindingLayout = u64;
    type Pipeline = u64;
    type CommandList = MockCommandList;

    fn name(&self) -> &'static str {
        "mock"
    }

    fn capabilities(&self) -> DeviceCapabilities {
        self.capabilities
    }

    fn supports_format(&self, _format: ResourceFormat) -> bool {
        true
    }

    fn create_buffer(
        &self,
        _desc: &BufferDescription<'_>,
    ) -> Result<NativeResource<Self>, ResourceError> {
        Ok(NativeResource {
            resource: self.create("buffer")?,
            allocation: Some(self.create("allocation")?),
        })
    }

    fn create_texture(
        &self,
        _desc: &TextureDescription<'_>,
    ) -> Result<NativeResource<Self>, ResourceError> {
        Ok(NativeResource {
            resource: self.create("texture")?,
            allocation: None,
        })
    }

    fn create_resource_view(
        &self,
        _resource: &u64,
        _desc: &ResourceViewDescription,
    ) -> Result<u64, ResourceError> {
        self.create("resource_view")
    }

    fn create_unordered_access_view(
        &self,
        _resource: &u64,
        _desc: &UnorderedAccessViewDescription,
    ) -> Result<u64, ResourceError> {
        self.create("uav")
    }

    fn create_sampler(&self, _desc: &SamplerDescription) -> Result<u64, ResourceError> {
        self.create("sampler")
    }

    fn create_shader(&self, _desc: &ShaderDescription<'_>) -> Result<u64, ResourceError> {
        self.create("shader")
    }

    fn create_blend_state(&self, _desc: &BlendStateDescription) -> Result<u64, ResourceError> {
        self.create("blend_state")
    }

    fn create_depth_stencil_state(
        &self,
        _desc: &DepthStencilStateDescription,
    ) -> Result<u64, ResourceError> {
        self.create("depth_stencil_state")
    }

    fn create_rasterizer_state(
        &self,
        _desc: &RasterizerStateDescription,
        _multisampled: bool,
    ) -> Result<u64, ResourceError> {
        self.create("rasterizer_state")
    }

    fn create_input_layout(
        &self,
        _layout: &ResolvedInputLayout,
        _bytecode: &[u8],
    ) -> Result<u64, ResourceError> {
        self.create("input_layout")
    }

    fn create_binding_layout(
        &self,
        _desc: &BindingLayoutDescription,
    ) -> Result<u64, ResourceError> {
        self.create("binding_layout")
    }

    fn create_graphics_pipeline(
        &self,
        _desc: &NativePipelineDescription<'_, Self>,
    ) -> Result<u64, ResourceError> {
        self.create("pipeline")
    }

    fn release(&self, object: NativeObject<Self>) {
        self.released.lock().unwrap().push(format!("{object:?}"));
    }

    fn begin_command_list(&self) -> Result<MockCommandList, ResourceError> {
        Ok(MockCommandList {
            commands: Arc::clone(&self.commands),
        })
    }

    fn submit_command_list(&self, list: MockCommandList) -> Result<(), ResourceError> {
        list.record("submit".to_string());
        Ok(())
    }
}

pub(crate) struct MockCommandList {
    commands: Arc<Mutex<Vec<String>>>,
}

impl MockCommandList {
    fn record(&self, command: String) {
        self.commands.lock().unwrap().push(command);
    }
}

impl NativeCommandList for MockCommandList {
    type Backend = MockBackend;

    fn bind_pipeline(&mut self, pipeline: &u64) {
        self.record(format!("pipeline({pipeline})"));
    }

    fn bind_shader(&mut self, stage: ShaderStage, shader: Option<&u64>) {
        self.record(format!("shader({stage:?}, {shader:?})"));
    }

    fn bind_constant_buffer(&mut self, stage: ShaderStage, slot: u32, buffer: Option<&u64>) {
        self.record(format!("constant_buffer({stage:?}, {slot}, {buffer:?})"));
    }

    fn bind_sampler(&mut self, stage: ShaderStage, slot: u32, sampler: Option<&u64>) {
        self.record(format!("sampler({stage:?}, {slot}, {sampler:?})"));
    }

    fn bind_resource_view(&mut self, stage: ShaderStage, slot: u32, view: Option<&u64>) {
        self.record(format!("resource_view({stage:?}, {slot}, {view:?})"));
    }

    fn bind_unordered_access_view(&mut self, stage: ShaderStage, slot: u32, view: Option<&u64>) {
        self.record(format!("uav({stage:?}, {slot}, {view:?})"));
    }

    fn bind_blend_state(&mut self, state: &u64, blend_factor: [f32; 4], sample_mask: u32) {
        self.record(format!("blend({state}, {blend_factor:?}, {sample_mask:#x})"));
    }

    fn bind_depth_stencil_state(&mut self, state: &u64, stencil_ref: u8) {
        self.record(format!("depth_stencil({state}, {stencil_ref})"));
    }

    fn bind_rasterizer_state(&mut self, state: &u64) {
        self.record(format!("rasterizer({state})"));
    }

    fn set_viewport(&mut self, viewport: &Viewport) {
        self.record(format!("viewport({viewport:?})"));
    }

    fn set_scissor_rect(&mut self, rect: &ScissorRect) {
        self.record(format!("scissor({rect:?})"));
    }

    fn bind_vertex_buffer(&mut self, slot: u32, buffer: Option<&u64>, stride: u32, offset: u64) {
        self.record(format!("vertex_buffer({slot}, {buffer:?}, {stride}, {offset})"));
    }

    fn bind_index_buffer(&mut self, buffer: Option<&u64>, format: IndexFormat, offset: u64) {
        self.record(format!("index_buffer({buffer:?}, {format:?}, {offset})"));
    }

    fn set_primitive_topology(&mut self, topology: PrimitiveTopology) {
        self.record(format!("topology({topology:?})"));
    }

    fn flush(&mut self) {
        self.record("flush".to_string());
    }
}
