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

use super::backend::{NullBackend, NullHandle};
use lumen_core::renderer::*;
use std::sync::{Arc, Mutex, PoisonError};

/// A native call recorded by a [`NullCommandList`].
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub enum NullCommand {
    BindPipeline(NullHandle),
    BindShader(ShaderStage, Option<NullHandle>),
    BindConstantBuffer(ShaderStage, u32, Option<NullHandle>),
    BindSampler(ShaderStage, u32, Option<NullHandle>),
    BindResourceView(ShaderStage, u32, Option<NullHandle>),
    BindUnorderedAccessView(ShaderStage, u32, Option<NullHandle>),
    BindBlendState(NullHandle, [f32; 4], u32),
    BindDepthStencilState(NullHandle, u8),
    BindRasterizerState(NullHandle),
    SetViewport(Viewport),
    SetScissorRect(ScissorRect),
    BindVertexBuffer(u32, Option<NullHandle>, u32, u64),
    BindIndexBuffer(Option<NullHandle>, IndexFormat, u64),
    SetPrimitiveTopology(PrimitiveTopology),
    Flush,
}

/// Records native calls locally and appends them to the backend log on submission.
#[derive(Debug)]
pub struct NullCommandList {
    recorded: Vec<NullCommand>,
    log: Arc<Mutex<Vec<NullCommand>>>,
}

impl NullCommandList {
    pub(super) fn new(log: Arc<Mutex<Vec<NullCommand>>>) -> Self {
        Self {
            recorded: Vec::new(),
            log,
        }
    }

    /// Calls recorded so far.
    pub fn recorded(&self) -> &[NullCommand] {
        &self.recorded
    }

    pub(super) fn submit(self) -> usize {
        let count = self.recorded.len();
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(self.recorded);
        count
    }
}

impl NativeCommandList for NullCommandList {
    type Backend = NullBackend;

    fn bind_pipeline(&mut self, pipeline: &NullHandle) {
        self.recorded.push(NullCommand::BindPipeline(*pipeline));
    }

    fn bind_shader(&mut self, stage: ShaderStage, shader: Option<&NullHandle>) {
        self.recorded
            .push(NullCommand::BindShader(stage, shader.copied()));
    }

    fn bind_constant_buffer(&mut self, stage: ShaderStage, slot: u32, buffer: Option<&NullHandle>) {
        self.recorded
            .push(NullCommand::BindConstantBuffer(stage, slot, buffer.copied()));
    }

    fn bind_sampler(&mut self, stage: ShaderStage, slot: u32, sampler: Option<&NullHandle>) {
        self.recorded
            .push(NullCommand::BindSampler(stage, slot, sampler.copied()));
    }

    fn bind_resource_view(&mut self, stage: ShaderStage, slot: u32, view: Option<&NullHandle>) {
        self.recorded
            .push(NullCommand::BindResourceView(stage, slot, view.copied()));
    }

    fn bind_unordered_access_view(
        &mut self,
        stage: ShaderStage,
        slot: u32,
        view: Option<&NullHandle>,
    ) {
        self.recorded
            .push(NullCommand::BindUnorderedAccessView(stage, slot, view.copied()));
    }

    fn bind_blend_state(&mut self, state: &NullHandle, blend_factor: [f32; 4], sample_mask: u32) {
        self.recorded
            .push(NullCommand::BindBlendState(*state, blend_factor, sample_mask));
    }

    fn bind_depth_stencil_state(&mut self, state: &NullHandle, stencil_ref: u8) {
        self.recorded
            .push(NullCommand::BindDepthStencilState(*state, stencil_ref));
    }

    fn bind_rasterizer_state(&mut self, state: &NullHandle) {
        self.recorded.push(NullCommand::BindRasterizerState(*state));
    }

    fn set_viewport(&mut self, viewport: &Viewport) {
        self.recorded.push(NullCommand::SetViewport(*viewport));
    }

    fn set_scissor_rect(&mut self, rect: &ScissorRect) {
        self.recorded.push(NullCommand::SetScissorRect(*rect));
    }

    fn bind_vertex_buffer(
        &mut self,
        slot: u32,
        buffer: Option<&NullHandle>,
        stride: u32,
        offset: u64,
    ) {
        self.recorded
            .push(NullCommand::BindVertexBuffer(slot, buffer.copied(), stride, offset));
    }

    fn bind_index_buffer(&mut self, buffer: Option<&NullHandle>, format: IndexFormat, offset: u64) {
        self.recorded
            .push(NullCommand::BindIndexBuffer(buffer.copied(), format, offset));
    }

    fn set_primitive_topology(&mut self, topology: PrimitiveTopology) {
        self.recorded
            .push(NullCommand::SetPrimitiveTopology(topology));
    }

    fn flush(&mut self) {
        self.recorded.push(NullCommand::Flush);
    }
}
