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

//! Per-command-list shadow state that filters out redundant native bind calls.
//!
//! Every `set_*` call compares the request with the shadow slot. An identical request
//! only bumps the redundant counter. A different one resolves the id to its native
//! object, issues the native call and updates the slot. A resource is never bound
//! for reading and writing at the same time: binding it on one side unbinds it from
//! the other in every stage, followed by a single flush.

use crate::renderer::api::*;
use crate::renderer::cache::{CachedState, StateId};
use crate::renderer::device::DeviceShared;
use crate::renderer::error::{ResourceError, ValidationError};
use crate::renderer::pipeline::{
    check_render_pass_compatibility, validate_rasterizer_state, validate_render_pass_layout,
};
use crate::renderer::traits::{NativeCommandList, RhiBackend};
use std::fmt::Debug;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Constant buffer slots per stage.
pub const MAX_CONSTANT_BUFFERS: usize = 16;
/// Sampler slots per stage.
pub const MAX_SAMPLERS: usize = 16;
/// Shader-read view slots per stage.
pub const MAX_RESOURCE_VIEWS: usize = 128;
/// Writable view slots per stage.
pub const MAX_UNORDERED_ACCESS_VIEWS: usize = 8;
/// Vertex buffer slots.
pub const MAX_VERTEX_BUFFERS: usize = 16;

const STAGES: usize = ShaderStage::COUNT;

struct ShadowState {
    pipeline: Option<PipelineId>,
    shaders: [Option<ShaderId>; STAGES],
    constant_buffers: [[Option<BufferId>; MAX_CONSTANT_BUFFERS]; STAGES],
    samplers: [[Option<SamplerId>; MAX_SAMPLERS]; STAGES],
    resource_views: [[Option<(ResourceViewId, ResourceRef)>; MAX_RESOURCE_VIEWS]; STAGES],
    unordered_access_views:
        [[Option<(UnorderedAccessViewId, ResourceRef)>; MAX_UNORDERED_ACCESS_VIEWS]; STAGES],
    blend: Option<(StateId, [f32; 4], u32)>,
    depth_stencil: Option<(StateId, u8)>,
    rasterizer: Option<StateId>,
    viewport: Option<Viewport>,
    scissor: Option<ScissorRect>,
    vertex_buffers: [Option<(BufferId, u64)>; MAX_VERTEX_BUFFERS],
    index_buffer: Option<(BufferId, IndexFormat, u64)>,
    topology: Option<PrimitiveTopology>,
}

impl ShadowState {
    fn new() -> Box<Self> {
        Box::new(Self {
            pipeline: None,
            shaders: [None; STAGES],
            constant_buffers: [[None; MAX_CONSTANT_BUFFERS]; STAGES],
            samplers: [[None; MAX_SAMPLERS]; STAGES],
            resource_views: [[None; MAX_RESOURCE_VIEWS]; STAGES],
            unordered_access_views: [[None; MAX_UNORDERED_ACCESS_VIEWS]; STAGES],
            blend: None,
            depth_stencil: None,
            rasterizer: None,
            viewport: None,
            scissor: None,
            vertex_buffers: [None; MAX_VERTEX_BUFFERS],
            index_buffer: None,
            topology: None,
        })
    }
}

/// Holds one of the device's command list slots until dropped.
struct PoolSlot<B: RhiBackend> {
    shared: Arc<DeviceShared<B>>,
}

impl<B: RhiBackend> Drop for PoolSlot<B> {
    fn drop(&mut self) {
        self.shared.active_command_lists.fetch_sub(1, Ordering::AcqRel);
    }
}

/// A command list being recorded, with its private shadow state.
///
/// Obtained from [`RenderDevice::begin_command_list`](crate::renderer::RenderDevice::begin_command_list)
/// and handed back through `submit_command_list`. Dropping it without submitting
/// discards the recorded commands.
pub struct CommandList<B: RhiBackend> {
    slot: PoolSlot<B>,
    native: B::CommandList,
    shadow: Box<ShadowState>,
    render_pass: Option<RenderPassLayout>,
    stats: CommandListStats,
}

impl<B: RhiBackend> CommandList<B> {
    pub(crate) fn new(shared: Arc<DeviceShared<B>>, native: B::CommandList) -> Self {
        Self {
            slot: PoolSlot { shared },
            native,
            shadow: ShadowState::new(),
            render_pass: None,
            stats: CommandListStats::default(),
        }
    }

    pub(crate) fn belongs_to(&self, shared: &Arc<DeviceShared<B>>) -> bool {
        Arc::ptr_eq(&self.slot.shared, shared)
    }

    pub(crate) fn finish(self) -> (B::CommandList, CommandListStats) {
        let CommandList { native, stats, .. } = self;
        (native, stats)
    }

    fn shared(&self) -> &DeviceShared<B> {
        &self.slot.shared
    }

    /// Counters of this list so far.
    pub fn stats(&self) -> CommandListStats {
        self.stats
    }

    /// The render pass opened by [`begin_render_pass`](Self::begin_render_pass).
    pub fn render_pass(&self) -> Option<&RenderPassLayout> {
        self.render_pass.as_ref()
    }

    fn invalid(&self, what: &str, value: impl Debug) -> bool {
        log::error!("CommandList: invalid {what} {value:?}");
        if cfg!(debug_assertions) {
            panic!("Invalid {what} {value:?}");
        }
        false
    }

    fn redundant(&mut self) -> bool {
        self.stats.redundant_state_changes += 1;
        false
    }

    fn changed(&mut self) -> bool {
        self.stats.state_changes += 1;
        true
    }

    /// Opens a render pass. Pipelines bound until [`end_render_pass`](Self::end_render_pass)
    /// must match its layout, and its sample count selects multisampled rasterizer states.
    pub fn begin_render_pass(&mut self, layout: &RenderPassLayout) -> Result<(), ValidationError> {
        validate_render_pass_layout(layout)?;
        self.render_pass = Some(layout.clone());
        // A pipeline bound in a previous pass must be checked against this one.
        self.shadow.pipeline = None;
        Ok(())
    }

    /// Closes the current render pass. The next pass starts with no pipeline bound.
    pub fn end_render_pass(&mut self) {
        self.render_pass = None;
        self.shadow.pipeline = None;
    }

    /// Binds a graphics pipeline.
    /// ## Errors
    /// * `ValidationError::RenderPassMismatch` - If no render pass is open or the
    ///   pipeline was built for different attachments.
    pub fn set_pipeline(&mut self, pipeline: PipelineId) -> Result<bool, ValidationError> {
        let Some(pass) = &self.render_pass else {
            return Err(ValidationError::RenderPassMismatch(
                "no render pass is open".to_string(),
            ));
        };
        if self.shadow.pipeline == Some(pipeline) {
            return Ok(self.redundant());
        }
        let resolved = self
            .shared()
            .registry
            .pipelines
            .with(pipeline, |e| ((*e.native).clone(), e.render_pass.clone()));
        let Ok((native, layout)) = resolved else {
            return Ok(self.invalid("pipeline", pipeline));
        };
        check_render_pass_compatibility(&layout, pass)?;

        self.native.bind_pipeline(&native);
        self.shadow.pipeline = Some(pipeline);
        Ok(self.changed())
    }

    /// Binds a shader to its stage, or unbinds the stage with `None`.
    pub fn set_shader(&mut self, stage: ShaderStage, shader: Option<ShaderId>) -> bool {
        if self.shadow.shaders[stage as usize] == shader {
            return self.redundant();
        }
        let native = match shader {
            Some(id) => {
                let resolved = self
                    .shared()
                    .registry
                    .shaders
                    .with(id, |e| (e.stage, (*e.native).clone()));
                match resolved {
                    Ok((declared, native)) if declared == stage => Some(native),
                    _ => return self.invalid("shader", (stage, id)),
                }
            }
            None => None,
        };
        self.native.bind_shader(stage, native.as_ref());
        self.shadow.shaders[stage as usize] = shader;
        self.changed()
    }

    /// Binds a constant buffer.
    pub fn set_constant_buffer(
        &mut self,
        stage: ShaderStage,
        slot: u32,
        buffer: Option<BufferId>,
    ) -> bool {
        let Some(&current) = self.shadow.constant_buffers[stage as usize].get(slot as usize) else {
            return self.invalid("constant buffer slot", slot);
        };
        if current == buffer {
            return self.redundant();
        }
        let native = match buffer {
            Some(id) => match self.shared().registry.buffers.with(id, |e| (*e.resource).clone()) {
                Ok(native) => Some(native),
                Err(_) => return self.invalid("buffer", id),
            },
            None => None,
        };
        self.native.bind_constant_buffer(stage, slot, native.as_ref());
        self.shadow.constant_buffers[stage as usize][slot as usize] = buffer;
        self.changed()
    }

    /// Binds a sampler.
    pub fn set_sampler_state(
        &mut self,
        stage: ShaderStage,
        slot: u32,
        sampler: Option<SamplerId>,
    ) -> bool {
        let Some(&current) = self.shadow.samplers[stage as usize].get(slot as usize) else {
            return self.invalid("sampler slot", slot);
        };
        if current == sampler {
            return self.redundant();
        }
        let native = match sampler {
            Some(id) => match self.shared().registry.samplers.with(id, |e| (**e).clone()) {
                Ok(native) => Some(native),
                Err(_) => return self.invalid("sampler", id),
            },
            None => None,
        };
        self.native.bind_sampler(stage, slot, native.as_ref());
        self.shadow.samplers[stage as usize][slot as usize] = sampler;
        self.changed()
    }

    /// Binds a shader-read view. The underlying resource is first unbound from every
    /// writable view slot.
    pub fn set_resource_view(
        &mut self,
        stage: ShaderStage,
        slot: u32,
        view: Option<ResourceViewId>,
    ) -> bool {
        let Some(&current) = self.shadow.resource_views[stage as usize].get(slot as usize) else {
            return self.invalid("resource view slot", slot);
        };
        if current.map(|(id, _)| id) == view {
            return self.redundant();
        }
        let bound = match view {
            Some(id) => {
                let resolved = self
                    .shared()
                    .registry
                    .resource_views
                    .with(id, |e| ((*e.native).clone(), e.source));
                match resolved {
                    Ok((native, source)) => Some((id, native, source)),
                    Err(_) => return self.invalid("resource view", id),
                }
            }
            None => None,
        };
        if let Some((_, _, source)) = &bound {
            self.unbind_unordered_access_views_of(*source);
        }
        self.native
            .bind_resource_view(stage, slot, bound.as_ref().map(|(_, native, _)| native));
        self.shadow.resource_views[stage as usize][slot as usize] =
            bound.map(|(id, _, source)| (id, source));
        self.changed()
    }

    /// Binds a writable view. The underlying resource is first unbound from every
    /// shader-read view slot.
    pub fn set_unordered_access_view(
        &mut self,
        stage: ShaderStage,
        slot: u32,
        view: Option<UnorderedAccessViewId>,
    ) -> bool {
        let Some(&current) = self.shadow.unordered_access_views[stage as usize].get(slot as usize)
        else {
            return self.invalid("unordered access view slot", slot);
        };
        if current.map(|(id, _)| id) == view {
            return self.redundant();
        }
        let bound = match view {
            Some(id) => {
                let resolved = self
                    .shared()
                    .registry
                    .unordered_access_views
                    .with(id, |e| ((*e.native).clone(), e.source));
                match resolved {
                    Ok((native, source)) => Some((id, native, source)),
                    Err(_) => return self.invalid("unordered access view", id),
                }
            }
            None => None,
        };
        if let Some((_, _, source)) = &bound {
            self.unbind_resource_views_of(*source);
        }
        self.native
            .bind_unordered_access_view(stage, slot, bound.as_ref().map(|(_, native, _)| native));
        self.shadow.unordered_access_views[stage as usize][slot as usize] =
            bound.map(|(id, _, source)| (id, source));
        self.changed()
    }

    fn unbind_resource_views_of(&mut self, resource: ResourceRef) {
        let mut unbound = false;
        for stage in ShaderStage::ALL {
            for slot in 0..MAX_RESOURCE_VIEWS {
                let bound = &mut self.shadow.resource_views[stage as usize][slot];
                if matches!(bound, Some((_, source)) if *source == resource) {
                    *bound = None;
                    self.native.bind_resource_view(stage, slot as u32, None);
                    self.stats.state_changes += 1;
                    unbound = true;
                }
            }
        }
        if unbound {
            self.flush();
        }
    }

    fn unbind_unordered_access_views_of(&mut self, resource: ResourceRef) {
        let mut unbound = false;
        for stage in ShaderStage::ALL {
            for slot in 0..MAX_UNORDERED_ACCESS_VIEWS {
                let bound = &mut self.shadow.unordered_access_views[stage as usize][slot];
                if matches!(bound, Some((_, source)) if *source == resource) {
                    *bound = None;
                    self.native.bind_unordered_access_view(stage, slot as u32, None);
                    self.stats.state_changes += 1;
                    unbound = true;
                }
            }
        }
        if unbound {
            self.flush();
        }
    }

    fn flush(&mut self) {
        self.native.flush();
        self.stats.flushes += 1;
    }

    /// Binds a blend state with its blend factor and sample mask.
    pub fn set_blend_state(
        &mut self,
        state: &CachedState<B::BlendState>,
        blend_factor: [f32; 4],
        sample_mask: u32,
    ) -> bool {
        let key = (state.id(), blend_factor, sample_mask);
        if self.shadow.blend == Some(key) {
            return self.redundant();
        }
        self.native
            .bind_blend_state(state.native(), blend_factor, sample_mask);
        self.shadow.blend = Some(key);
        self.changed()
    }

    /// Binds a depth/stencil state with its stencil reference value.
    pub fn set_depth_stencil_state(
        &mut self,
        state: &CachedState<B::DepthStencilState>,
        stencil_ref: u8,
    ) -> bool {
        let key = (state.id(), stencil_ref);
        if self.shadow.depth_stencil == Some(key) {
            return self.redundant();
        }
        self.native
            .bind_depth_stencil_state(state.native(), stencil_ref);
        self.shadow.depth_stencil = Some(key);
        self.changed()
    }

    /// Binds the rasterizer state for `desc`, multisampled if the open render pass is.
    /// ## Errors
    /// * `ResourceError::Validation` - If the device lacks a feature `desc` needs.
    /// * Any error of the cache lookup.
    pub fn set_rasterizer_state(
        &mut self,
        desc: &RasterizerStateDescription,
    ) -> Result<bool, ResourceError> {
        let shared = Arc::clone(&self.slot.shared);
        validate_rasterizer_state(desc, &shared.backend.capabilities())?;
        let multisampled = self
            .render_pass
            .as_ref()
            .is_some_and(|pass| pass.sample_count > 1);
        let state = shared.cache.get_rasterizer_state(desc, multisampled)?;
        if self.shadow.rasterizer == Some(state.id()) {
            return Ok(self.redundant());
        }
        self.native.bind_rasterizer_state(state.native());
        self.shadow.rasterizer = Some(state.id());
        Ok(self.changed())
    }

    /// Sets the viewport.
    pub fn set_viewport(&mut self, viewport: &Viewport) -> bool {
        if self.shadow.viewport.as_ref() == Some(viewport) {
            return self.redundant();
        }
        self.native.set_viewport(viewport);
        self.shadow.viewport = Some(*viewport);
        self.changed()
    }

    /// Sets the scissor rectangle.
    pub fn set_scissor_rect(&mut self, rect: &ScissorRect) -> bool {
        if self.shadow.scissor.as_ref() == Some(rect) {
            return self.redundant();
        }
        self.native.set_scissor_rect(rect);
        self.shadow.scissor = Some(*rect);
        self.changed()
    }

    /// Binds a vertex buffer. The stride is the buffer's element stride.
    pub fn set_vertex_buffer(&mut self, slot: u32, buffer: Option<BufferId>, offset: u64) -> bool {
        let Some(&current) = self.shadow.vertex_buffers.get(slot as usize) else {
            return self.invalid("vertex buffer slot", slot);
        };
        let requested = buffer.map(|id| (id, offset));
        if current == requested {
            return self.redundant();
        }
        let native = match buffer {
            Some(id) => {
                let resolved = self
                    .shared()
                    .registry
                    .buffers
                    .with(id, |e| ((*e.resource).clone(), e.stride));
                match resolved {
                    Ok(native) => Some(native),
                    Err(_) => return self.invalid("buffer", id),
                }
            }
            None => None,
        };
        let stride = native.as_ref().map_or(0, |(_, stride)| *stride);
        self.native
            .bind_vertex_buffer(slot, native.as_ref().map(|(n, _)| n), stride, offset);
        self.shadow.vertex_buffers[slot as usize] = requested;
        self.changed()
    }

    /// Binds an index buffer.
    pub fn set_index_buffer(
        &mut self,
        buffer: Option<BufferId>,
        format: IndexFormat,
        offset: u64,
    ) -> bool {
        let requested = buffer.map(|id| (id, format, offset));
        if self.shadow.index_buffer == requested {
            return self.redundant();
        }
        let native = match buffer {
            Some(id) => match self.shared().registry.buffers.with(id, |e| (*e.resource).clone()) {
                Ok(native) => Some(native),
                Err(_) => return self.invalid("buffer", id),
            },
            None => None,
        };
        self.native.bind_index_buffer(native.as_ref(), format, offset);
        self.shadow.index_buffer = requested;
        self.changed()
    }

    /// Sets the primitive topology.
    pub fn set_primitive_topology(&mut self, topology: PrimitiveTopology) -> bool {
        if self.shadow.topology == Some(topology) {
            return self.redundant();
        }
        self.native.set_primitive_topology(topology);
        self.shadow.topology = Some(topology);
        self.changed()
    }

    /// The shader-read view bound at `(stage, slot)`.
    pub fn resource_view(&self, stage: ShaderStage, slot: u32) -> Option<ResourceViewId> {
        self.shadow.resource_views[stage as usize]
            .get(slot as usize)
            .copied()
            .flatten()
            .map(|(id, _)| id)
    }

    /// The writable view bound at `(stage, slot)`.
    pub fn unordered_access_view(
        &self,
        stage: ShaderStage,
        slot: u32,
    ) -> Option<UnorderedAccessViewId> {
        self.shadow.unordered_access_views[stage as usize]
            .get(slot as usize)
            .copied()
            .flatten()
            .map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::mock::MockBackend;
    use crate::renderer::RenderDevice;
    use std::borrow::Cow;

    fn device() -> RenderDevice<MockBackend> {
        RenderDevice::new(MockBackend::default(), RhiSettings::default()).unwrap()
    }

    fn count(device: &RenderDevice<MockBackend>, prefix: &str) -> usize {
        device
            .backend()
            .commands()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn texture_with_views(
        device: &RenderDevice<MockBackend>,
    ) -> (ResourceViewId, UnorderedAccessViewId) {
        let texture = device
            .create_texture(&TextureDescription {
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
        (srv, uav)
    }

    #[test]
    fn test_identical_blend_state_is_bound_once() {
        let device = device();
        let state = device
            .create_blend_state(&BlendStateDescription::alpha_blending())
            .unwrap();
        let mut list = device.begin_command_list().unwrap();

        assert!(list.set_blend_state(&state, [1.0; 4], 0xffff_ffff));
        assert!(!list.set_blend_state(&state, [1.0; 4], 0xffff_ffff));
        assert_eq!(count(&device, "blend("), 1);
        assert_eq!(list.stats().state_changes, 1);
        assert_eq!(list.stats().redundant_state_changes, 1);

        // A different blend factor is a different binding.
        assert!(list.set_blend_state(&state, [0.5; 4], 0xffff_ffff));
        assert_eq!(count(&device, "blend("), 2);
    }

    #[test]
    fn test_uav_bind_unbinds_resource_view_of_same_resource() {
        let device = device();
        let (srv, uav) = texture_with_views(&device);
        let mut list = device.begin_command_list().unwrap();

        assert!(list.set_resource_view(ShaderStage::Pixel, 0, Some(srv)));
        device.backend().clear_commands();
        assert!(list.set_unordered_access_view(ShaderStage::Pixel, 0, Some(uav)));

        assert_eq!(list.resource_view(ShaderStage::Pixel, 0), None);
        assert_eq!(list.unordered_access_view(ShaderStage::Pixel, 0), Some(uav));
        assert_eq!(
            device.backend().commands(),
            vec![
                "resource_view(Pixel, 0, None)".to_string(),
                "flush".to_string(),
                "uav(Pixel, 0, Some(3))".to_string(),
            ]
        );
        assert_eq!(list.stats().flushes, 1);
    }

    #[test]
    fn test_resource_view_bind_unbinds_uavs_in_every_stage() {
        let device = device();
        let (srv, uav) = texture_with_views(&device);
        let mut list = device.begin_command_list().unwrap();

        list.set_unordered_access_view(ShaderStage::Pixel, 1, Some(uav));
        list.set_unordered_access_view(ShaderStage::Compute, 3, Some(uav));
        device.backend().clear_commands();

        assert!(list.set_resource_view(ShaderStage::Vertex, 0, Some(srv)));
        assert_eq!(list.unordered_access_view(ShaderStage::Pixel, 1), None);
        assert_eq!(list.unordered_access_view(ShaderStage::Compute, 3), None);
        assert_eq!(count(&device, "uav("), 2);
        assert_eq!(count(&device, "flush"), 1);
    }

    #[test]
    fn test_unrelated_resources_do_not_flush() {
        let device = device();
        let (srv, _) = texture_with_views(&device);
        let (_, other_uav) = texture_with_views(&device);
        let mut list = device.begin_command_list().unwrap();

        list.set_resource_view(ShaderStage::Pixel, 0, Some(srv));
        list.set_unordered_access_view(ShaderStage::Pixel, 0, Some(other_uav));
        assert_eq!(list.resource_view(ShaderStage::Pixel, 0), Some(srv));
        assert_eq!(list.stats().flushes, 0);
    }

    #[test]
    fn test_unbinding_is_a_state_change() {
        let device = device();
        let sampler = device.create_sampler(&SamplerDescription::default()).unwrap();
        let mut list = device.begin_command_list().unwrap();

        assert!(!list.set_sampler_state(ShaderStage::Pixel, 2, None));
        assert!(list.set_sampler_state(ShaderStage::Pixel, 2, Some(sampler)));
        assert!(list.set_sampler_state(ShaderStage::Pixel, 2, None));
        assert_eq!(
            device.backend().commands().last().map(String::as_str),
            Some("sampler(Pixel, 2, None)")
        );
    }

    #[test]
    fn test_dynamic_state_elision() {
        let device = device();
        let buffer = device
            .create_buffer(&BufferDescription {
                label: None,
                size: 64,
                usage: BufferUsage::VERTEX | BufferUsage::INDEX,
                struct_stride: 16,
            })
            .unwrap();
        let mut list = device.begin_command_list().unwrap();

        let viewport = Viewport::from_size(1280.0, 720.0);
        assert!(list.set_viewport(&viewport));
        assert!(!list.set_viewport(&viewport));
        let rect = ScissorRect {
            x: 0,
            y: 0,
            width: 64,
            height: 64,
        };
        assert!(list.set_scissor_rect(&rect));
        assert!(!list.set_scissor_rect(&rect));
        assert!(list.set_primitive_topology(PrimitiveTopology::LineList));
        assert!(!list.set_primitive_topology(PrimitiveTopology::LineList));
        assert!(list.set_vertex_buffer(0, Some(buffer), 0));
        assert!(!list.set_vertex_buffer(0, Some(buffer), 0));
        assert!(list.set_vertex_buffer(0, Some(buffer), 16));
        assert!(list.set_index_buffer(Some(buffer), IndexFormat::Uint16, 0));
        assert!(!list.set_index_buffer(Some(buffer), IndexFormat::Uint16, 0));

        assert_eq!(list.stats().state_changes, 6);
        assert_eq!(list.stats().redundant_state_changes, 5);
        assert!(device
            .backend()
            .commands()
            .contains(&"vertex_buffer(0, Some(1), 16, 16)".to_string()));
    }

    #[test]
    fn test_rasterizer_follows_render_pass_sample_count() {
        let device = device();
        let desc = RasterizerStateDescription::default();
        let mut list = device.begin_command_list().unwrap();

        assert!(list.set_rasterizer_state(&desc).unwrap());
        assert!(!list.set_rasterizer_state(&desc).unwrap());

        list.begin_render_pass(&RenderPassLayout {
            color_formats: vec![ResourceFormat::R8G8B8A8Unorm],
            depth_format: None,
            sample_count: 4,
        })
        .unwrap();
        assert!(list.set_rasterizer_state(&desc).unwrap());
        assert_eq!(device.backend().creation_count("rasterizer_state"), 2);
    }

    #[test]
    fn test_pipeline_must_match_open_render_pass() {
        let device = device();
        let vs = device
            .create_shader(&ShaderDescription {
                label: None,
                stage: ShaderStage::Vertex,
                bytecode: Cow::Borrowed(&[1, 2, 3]),
                entry_point: Cow::Borrowed("main"),
                reflection: ShaderReflection::default(),
            })
            .unwrap();
        let layout = RenderPassLayout {
            color_formats: vec![ResourceFormat::B8G8R8A8UnormSrgb],
            depth_format: Some(ResourceFormat::D24UnormS8Uint),
            sample_count: 1,
        };
        let pipeline = device
            .create_graphics_pipeline(&GraphicsPipelineDescription {
                vertex_shader: Some(vs),
                render_pass: layout.clone(),
                ..Default::default()
            })
            .unwrap();

        let mut list = device.begin_command_list().unwrap();
        assert!(matches!(
            list.set_pipeline(pipeline),
            Err(ValidationError::RenderPassMismatch(_))
        ));

        list.begin_render_pass(&RenderPassLayout {
            depth_format: None,
            ..layout.clone()
        })
        .unwrap();
        assert!(list.set_pipeline(pipeline).is_err());

        list.end_render_pass();
        list.begin_render_pass(&layout).unwrap();
        assert!(list.set_pipeline(pipeline).unwrap());
        assert!(!list.set_pipeline(pipeline).unwrap());
    }

    #[test]
    fn test_pipeline_is_revalidated_after_the_pass_changes() {
        let device = device();
        let vs = device
            .create_shader(&ShaderDescription {
                label: None,
                stage: ShaderStage::Vertex,
                bytecode: Cow::Borrowed(&[1, 2, 3]),
                entry_point: Cow::Borrowed("main"),
                reflection: ShaderReflection::default(),
            })
            .unwrap();
        let forward = RenderPassLayout {
            color_formats: vec![ResourceFormat::R8G8B8A8Unorm],
            depth_format: None,
            sample_count: 1,
        };
        let pipeline = device
            .create_graphics_pipeline(&GraphicsPipelineDescription {
                vertex_shader: Some(vs),
                render_pass: forward.clone(),
                ..Default::default()
            })
            .unwrap();

        let mut list = device.begin_command_list().unwrap();
        list.begin_render_pass(&forward).unwrap();
        assert_eq!(list.set_pipeline(pipeline), Ok(true));
        list.end_render_pass();

        // Still bound from the closed pass, but no pass is open.
        assert!(matches!(
            list.set_pipeline(pipeline),
            Err(ValidationError::RenderPassMismatch(_))
        ));

        list.begin_render_pass(&RenderPassLayout {
            color_formats: vec![ResourceFormat::R16G16B16A16Float],
            depth_format: Some(ResourceFormat::D32Float),
            sample_count: 4,
        })
        .unwrap();
        assert!(matches!(
            list.set_pipeline(pipeline),
            Err(ValidationError::RenderPassMismatch(_))
        ));
        list.end_render_pass();

        // Back in a compatible pass the pipeline is bound again, not elided.
        list.begin_render_pass(&forward).unwrap();
        assert_eq!(list.set_pipeline(pipeline), Ok(true));
        assert_eq!(list.stats().state_changes, 2);
    }

    #[test]
    fn test_command_list_pool_is_bounded() {
        let device = device();
        let mut lists: Vec<_> = (0..COMMANDLIST_COUNT)
            .map(|_| device.begin_command_list().unwrap())
            .collect();
        assert!(matches!(
            device.begin_command_list(),
            Err(ResourceError::CommandListPoolExhausted)
        ));

        lists.pop();
        let list = device.begin_command_list().unwrap();
        device.submit_command_list(list).unwrap();
        assert!(device.begin_command_list().is_ok());
    }

    #[test]
    fn test_submission_folds_stats_into_device() {
        let device = device();
        let mut list = device.begin_command_list().unwrap();
        list.set_primitive_topology(PrimitiveTopology::TriangleStrip);
        list.set_primitive_topology(PrimitiveTopology::TriangleStrip);
        let stats = device.submit_command_list(list).unwrap();
        assert_eq!(stats.state_changes, 1);

        // Shadow state starts empty on every list.
        let mut list = device.begin_command_list().unwrap();
        assert!(list.set_primitive_topology(PrimitiveTopology::TriangleStrip));
        device.submit_command_list(list).unwrap();

        let totals = device.stats();
        assert_eq!(totals.submitted_command_lists, 2);
        assert_eq!(totals.command_lists.state_changes, 2);
        assert_eq!(totals.command_lists.redundant_state_changes, 1);
        assert_eq!(count(&device, "submit"), 2);
    }

    #[test]
    fn test_list_from_other_device_is_rejected() {
        let a = device();
        let b = device();
        let list = b.begin_command_list().unwrap();
        assert!(matches!(
            a.submit_command_list(list),
            Err(ResourceError::InvalidHandle)
        ));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "Invalid buffer")]
    fn test_stale_handle_asserts() {
        let device = device();
        let buffer = device
            .create_buffer(&BufferDescription {
                label: None,
                size: 16,
                usage: BufferUsage::CONSTANT,
                struct_stride: 0,
            })
            .unwrap();
        device.destroy_buffer(buffer).unwrap();
        let mut list = device.begin_command_list().unwrap();
        list.set_constant_buffer(ShaderStage::Vertex, 0, Some(buffer));
    }
}
