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

use super::backend::{
    WgpuBackend, WgpuBlendState, WgpuDepthStencilState, WgpuRasterizerState, WgpuResource,
    WgpuShader, WgpuView,
};
use super::conversions::IntoWgpu;
use lumen_core::renderer::*;
use std::collections::BTreeMap;

/// Slot key of a per-stage binding.
pub type StageSlot = (ShaderStage, u32);

/// Everything bound on a [`WgpuCommandList`], consumed when draws are encoded.
#[allow(missing_docs)]
#[derive(Debug, Default)]
pub struct WgpuBoundState {
    pub pipeline: Option<wgpu::RenderPipeline>,
    pub shaders: BTreeMap<ShaderStage, WgpuShader>,
    pub constant_buffers: BTreeMap<StageSlot, wgpu::Buffer>,
    pub samplers: BTreeMap<StageSlot, wgpu::Sampler>,
    pub resource_views: BTreeMap<StageSlot, WgpuView>,
    pub unordered_access_views: BTreeMap<StageSlot, WgpuView>,
    pub blend: Option<(WgpuBlendState, wgpu::Color, u32)>,
    pub depth_stencil: Option<(WgpuDepthStencilState, u32)>,
    pub rasterizer: Option<WgpuRasterizerState>,
    pub viewport: Option<Viewport>,
    pub scissor: Option<ScissorRect>,
    pub vertex_buffers: BTreeMap<u32, (wgpu::Buffer, u32, u64)>,
    pub index_buffer: Option<(wgpu::Buffer, wgpu::IndexFormat, u64)>,
    pub topology: Option<wgpu::PrimitiveTopology>,
    pub flushes: u32,
}

/// A command encoder plus the state bound through the tracker.
#[derive(Debug)]
pub struct WgpuCommandList {
    encoder: wgpu::CommandEncoder,
    bound: WgpuBoundState,
}

fn rebind<K: Ord, V: Clone>(map: &mut BTreeMap<K, V>, key: K, value: Option<&V>) {
    match value {
        Some(value) => {
            map.insert(key, value.clone());
        }
        None => {
            map.remove(&key);
        }
    }
}

fn as_buffer(resource: Option<&WgpuResource>, what: &str) -> Option<wgpu::Buffer> {
    match resource {
        Some(WgpuResource::Buffer(buffer)) => Some(buffer.clone()),
        Some(WgpuResource::Texture(_)) => {
            log::warn!("WgpuCommandList: a texture cannot be bound as {what}");
            None
        }
        None => None,
    }
}

impl WgpuCommandList {
    pub(super) fn new(encoder: wgpu::CommandEncoder) -> Self {
        Self {
            encoder,
            bound: WgpuBoundState::default(),
        }
    }

    /// The state bound so far.
    pub fn bound(&self) -> &WgpuBoundState {
        &self.bound
    }

    /// The encoder, for recording copies and passes.
    pub fn encoder(&mut self) -> &mut wgpu::CommandEncoder {
        &mut self.encoder
    }

    pub(super) fn finish(self) -> wgpu::CommandBuffer {
        self.encoder.finish()
    }
}

impl NativeCommandList for WgpuCommandList {
    type Backend = WgpuBackend;

    fn bind_pipeline(&mut self, pipeline: &wgpu::RenderPipeline) {
        self.bound.pipeline = Some(pipeline.clone());
    }

    fn bind_shader(&mut self, stage: ShaderStage, shader: Option<&WgpuShader>) {
        rebind(&mut self.bound.shaders, stage, shader);
    }

    fn bind_constant_buffer(&mut self, stage: ShaderStage, slot: u32, buffer: Option<&WgpuResource>) {
        let buffer = as_buffer(buffer, "a constant buffer");
        rebind(&mut self.bound.constant_buffers, (stage, slot), buffer.as_ref());
    }

    fn bind_sampler(&mut self, stage: ShaderStage, slot: u32, sampler: Option<&wgpu::Sampler>) {
        rebind(&mut self.bound.samplers, (stage, slot), sampler);
    }

    fn bind_resource_view(&mut self, stage: ShaderStage, slot: u32, view: Option<&WgpuView>) {
        rebind(&mut self.bound.resource_views, (stage, slot), view);
    }

    fn bind_unordered_access_view(
        &mut self,
        stage: ShaderStage,
        slot: u32,
        view: Option<&WgpuView>,
    ) {
        rebind(&mut self.bound.unordered_access_views, (stage, slot), view);
    }

    fn bind_blend_state(&mut self, state: &WgpuBlendState, blend_factor: [f32; 4], sample_mask: u32) {
        let [r, g, b, a] = blend_factor.map(f64::from);
        self.bound.blend = Some((*state, wgpu::Color { r, g, b, a }, sample_mask));
    }

    fn bind_depth_stencil_state(&mut self, state: &WgpuDepthStencilState, stencil_ref: u8) {
        self.bound.depth_stencil = Some((state.clone(), stencil_ref as u32));
    }

    fn bind_rasterizer_state(&mut self, state: &WgpuRasterizerState) {
        self.bound.rasterizer = Some(*state);
    }

    fn set_viewport(&mut self, viewport: &Viewport) {
        self.bound.viewport = Some(*viewport);
    }

    fn set_scissor_rect(&mut self, rect: &ScissorRect) {
        self.bound.scissor = Some(*rect);
    }

    fn bind_vertex_buffer(
        &mut self,
        slot: u32,
        buffer: Option<&WgpuResource>,
        stride: u32,
        offset: u64,
    ) {
        match as_buffer(buffer, "a vertex buffer") {
            Some(buffer) => {
                self.bound
                    .vertex_buffers
                    .insert(slot, (buffer, stride, offset));
            }
            None => {
                self.bound.vertex_buffers.remove(&slot);
            }
        }
    }

    fn bind_index_buffer(&mut self, buffer: Option<&WgpuResource>, format: IndexFormat, offset: u64) {
        self.bound.index_buffer =
            as_buffer(buffer, "an index buffer").map(|buffer| (buffer, format.into_wgpu(), offset));
    }

    fn set_primitive_topology(&mut self, topology: PrimitiveTopology) {
        self.bound.topology = Some(topology.into_wgpu());
    }

    fn flush(&mut self) {
        // wgpu resolves read/write hazards itself; the count is kept for diagnostics.
        self.bound.flushes += 1;
    }
}
