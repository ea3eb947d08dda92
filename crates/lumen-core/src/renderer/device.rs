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

//! The render device: the entry point tying the backend to the generic machinery.

use crate::renderer::api::*;
use crate::renderer::cache::{CachedState, ResourceCache};
use crate::renderer::destruction::{DeferredDestructionQueue, Owned};
use crate::renderer::error::{FormatError, RenderError, ResourceError, ValidationError};
use crate::renderer::pipeline::{validate_blend_state, validate_rasterizer_state, PipelineBuilder};
use crate::renderer::query::QueryPool;
use crate::renderer::registry::*;
use crate::renderer::traits::{DeviceCapabilities, NativeObject, RhiBackend};
use crate::renderer::tracker::CommandList;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// State shared by a device and every command list recorded on it.
pub(crate) struct DeviceShared<B: RhiBackend> {
    pub(crate) backend: Arc<B>,
    pub(crate) settings: RhiSettings,
    pub(crate) cache: ResourceCache<B>,
    pub(crate) registry: Registry<B>,
    pub(crate) destruction: Arc<DeferredDestructionQueue<B>>,
    queries: Arc<QueryPool>,
    frame: AtomicU64,
    pub(crate) active_command_lists: AtomicUsize,
    command_list_stats: Mutex<CommandListStats>,
    submitted_command_lists: AtomicU64,
    allocated_bytes: AtomicU64,
}

impl<B: RhiBackend> Drop for DeviceShared<B> {
    fn drop(&mut self) {
        let live = self.registry.clear();
        let released = self.destruction.flush_all();
        self.cache.dispose();
        log::info!(
            "RenderDevice: {} device destroyed ({live} objects still registered, {released} released on shutdown)",
            self.backend.name()
        );
    }
}

/// A render device over one backend.
///
/// Cloning is cheap and every clone refers to the same device. All operations take
/// `&self` and can be called from any thread.
pub struct RenderDevice<B: RhiBackend> {
    shared: Arc<DeviceShared<B>>,
}

impl<B: RhiBackend> Clone for RenderDevice<B> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<B: RhiBackend> std::fmt::Debug for RenderDevice<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderDevice")
            .field("backend", &self.shared.backend.name())
            .field("frame", &self.frame_index())
            .finish()
    }
}

impl<B: RhiBackend> RenderDevice<B> {
    /// Creates a device over `backend`.
    /// ## Errors
    /// * `RenderError::InvalidConfiguration` - If `settings` fail validation.
    pub fn new(backend: B, settings: RhiSettings) -> Result<Self, RenderError> {
        settings.validate()?;

        let backend = Arc::new(backend);
        let queries = Arc::new(QueryPool::new(
            settings.max_timestamp_queries,
            settings.max_occlusion_queries,
        ));
        let destruction = Arc::new(DeferredDestructionQueue::new(
            Arc::clone(&backend),
            Arc::clone(&queries),
        ));
        log::info!(
            "RenderDevice: created on the {} backend ({} backbuffers, debug device: {})",
            backend.name(),
            settings.backbuffer_count,
            settings.debug_device
        );

        Ok(Self {
            shared: Arc::new(DeviceShared {
                cache: ResourceCache::new(Arc::clone(&backend)),
                registry: Registry::new(),
                backend,
                settings,
                destruction,
                queries,
                frame: AtomicU64::new(0),
                active_command_lists: AtomicUsize::new(0),
                command_list_stats: Mutex::new(CommandListStats::default()),
                submitted_command_lists: AtomicU64::new(0),
                allocated_bytes: AtomicU64::new(0),
            }),
        })
    }

    /// The backend the device was created over.
    pub fn backend(&self) -> &B {
        &self.shared.backend
    }

    /// The settings the device was created with.
    pub fn settings(&self) -> &RhiSettings {
        &self.shared.settings
    }

    /// Optional features of the backend.
    pub fn capabilities(&self) -> DeviceCapabilities {
        self.shared.backend.capabilities()
    }

    /// The resource cache of this device.
    pub fn cache(&self) -> &ResourceCache<B> {
        &self.shared.cache
    }

    /// Starts a new frame and releases objects the GPU can no longer reference.
    ///
    /// Returns the new frame index.
    pub fn begin_frame(&self) -> u64 {
        let frame = self.shared.frame.fetch_add(1, Ordering::AcqRel) + 1;
        let released = self
            .shared
            .destruction
            .update(frame, self.shared.settings.backbuffer_count);
        log::trace!("RenderDevice: frame {frame} began, {released} objects released");
        frame
    }

    /// The current frame index. Starts at 0.
    pub fn frame_index(&self) -> u64 {
        self.shared.frame.load(Ordering::Acquire)
    }

    /// Releases every object waiting in the destruction queue.
    ///
    /// Only safe once the GPU is idle.
    pub fn flush_destruction(&self) -> usize {
        self.shared.destruction.flush_all()
    }

    fn owned<T: Clone>(&self, native: T, wrap: fn(T) -> NativeObject<B>) -> Owned<B, T> {
        Owned::new(native, wrap, Arc::clone(&self.shared.destruction))
    }

    fn check_format(&self, format: ResourceFormat) -> Result<(), ResourceError> {
        if self.shared.backend.supports_format(format) {
            Ok(())
        } else {
            Err(FormatError::UnsupportedByBackend {
                format,
                backend: self.shared.backend.name(),
            }
            .into())
        }
    }

    /// Creates a buffer.
    /// ## Errors
    /// * `ResourceError::CreationFailed` - If the size is zero or the backend fails.
    pub fn create_buffer(&self, desc: &BufferDescription<'_>) -> Result<BufferId, ResourceError> {
        if desc.size == 0 {
            return Err(ResourceError::CreationFailed {
                object: "buffer",
                details: "size must be non-zero".to_string(),
            });
        }
        let native = self.shared.backend.create_buffer(desc)?;
        let entry = BufferEntry {
            resource: self.owned(native.resource, NativeObject::Resource),
            _allocation: native
                .allocation
                .map(|allocation| self.owned(allocation, NativeObject::Allocation)),
            size: desc.size,
            stride: desc.struct_stride,
        };
        let id = self.shared.registry.buffers.insert(entry)?;
        self.shared.allocated_bytes.fetch_add(desc.size, Ordering::Relaxed);
        log::debug!("RenderDevice: created buffer {id:?} ({:?}, {} bytes)", desc.label, desc.size);
        Ok(id)
    }

    /// Destroys a buffer. The native buffer is released once the GPU is done with it.
    pub fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError> {
        let entry = self.shared.registry.buffers.remove(id)?;
        self.shared.allocated_bytes.fetch_sub(entry.size, Ordering::Relaxed);
        Ok(())
    }

    /// Creates a texture.
    /// ## Errors
    /// * `ResourceError::Format` - If the backend has no equivalent of the format or
    ///   the texture size overflows.
    /// * `ResourceError::Validation` - If the usage does not fit the format.
    /// * `ResourceError::CreationFailed` - If an extent is zero, the mip chain is longer
    ///   than the extent allows, or the backend fails.
    pub fn create_texture(&self, desc: &TextureDescription<'_>) -> Result<TextureId, ResourceError> {
        if desc.width == 0
            || desc.height == 0
            || desc.depth_or_array_layers == 0
            || desc.mip_levels == 0
            || desc.sample_count == 0
        {
            return Err(ResourceError::CreationFailed {
                object: "texture",
                details: format!(
                    "extent {}x{}x{}, {} mips, {} samples must all be non-zero",
                    desc.width, desc.height, desc.depth_or_array_layers, desc.mip_levels, desc.sample_count
                ),
            });
        }
        if desc.mip_levels > desc.max_mip_levels() {
            return Err(ResourceError::CreationFailed {
                object: "texture",
                details: format!(
                    "{} mips requested, a {}x{} texture has at most {}",
                    desc.mip_levels,
                    desc.width,
                    desc.height,
                    desc.max_mip_levels()
                ),
            });
        }
        self.check_format(desc.format)?;
        if desc.usage.contains(TextureUsage::RENDER_TARGET) && !desc.format.is_color_renderable() {
            return Err(ValidationError::IncompatibleColorTarget {
                index: 0,
                format: desc.format,
            }
            .into());
        }
        if desc.usage.contains(TextureUsage::DEPTH_STENCIL) && !desc.format.is_depth() {
            return Err(ValidationError::IncompatibleDepthStencilFormat(desc.format).into());
        }

        let byte_size = desc.total_byte_size()?;
        let native = self.shared.backend.create_texture(desc)?;
        let entry = TextureEntry {
            resource: self.owned(native.resource, NativeObject::Resource),
            _allocation: native
                .allocation
                .map(|allocation| self.owned(allocation, NativeObject::Allocation)),
            byte_size,
        };
        let id = self.shared.registry.textures.insert(entry)?;
        self.shared.allocated_bytes.fetch_add(byte_size, Ordering::Relaxed);
        log::debug!(
            "RenderDevice: created texture {id:?} ({:?}, {}x{} {:?})",
            desc.label,
            desc.width,
            desc.height,
            desc.format
        );
        Ok(id)
    }

    /// Destroys a texture. Views created from it stay valid until destroyed themselves.
    pub fn destroy_texture(&self, id: TextureId) -> Result<(), ResourceError> {
        let entry = self.shared.registry.textures.remove(id)?;
        self.shared.allocated_bytes.fetch_sub(entry.byte_size, Ordering::Relaxed);
        Ok(())
    }

    /// Creates a shader-read view of a buffer or texture.
    pub fn create_resource_view(
        &self,
        resource: ResourceRef,
        desc: &ResourceViewDescription,
    ) -> Result<ResourceViewId, ResourceError> {
        if let Some(format) = desc.format {
            self.check_format(format)?;
        }
        let native_resource = self.shared.registry.native_resource(resource)?;
        let native = self
            .shared
            .backend
            .create_resource_view(&native_resource, desc)?;
        self.shared.registry.resource_views.insert(ViewEntry {
            native: self.owned(native, NativeObject::ResourceView),
            source: resource,
        })
    }

    /// Destroys a shader-read view.
    pub fn destroy_resource_view(&self, id: ResourceViewId) -> Result<(), ResourceError> {
        self.shared.registry.resource_views.remove(id).map(drop)
    }

    /// Creates a writable view of a buffer or texture.
    pub fn create_unordered_access_view(
        &self,
        resource: ResourceRef,
        desc: &UnorderedAccessViewDescription,
    ) -> Result<UnorderedAccessViewId, ResourceError> {
        if let Some(format) = desc.format {
            self.check_format(format)?;
        }
        let native_resource = self.shared.registry.native_resource(resource)?;
        let native = self
            .shared
            .backend
            .create_unordered_access_view(&native_resource, desc)?;
        self.shared.registry.unordered_access_views.insert(ViewEntry {
            native: self.owned(native, NativeObject::UnorderedAccessView),
            source: resource,
        })
    }

    /// Destroys a writable view.
    pub fn destroy_unordered_access_view(
        &self,
        id: UnorderedAccessViewId,
    ) -> Result<(), ResourceError> {
        self.shared.registry.unordered_access_views.remove(id).map(drop)
    }

    /// Creates a sampler.
    /// ## Errors
    /// * `ResourceError::CreationFailed` - If the anisotropy is outside `1..=16` or
    ///   the LOD range is inverted.
    pub fn create_sampler(&self, desc: &SamplerDescription) -> Result<SamplerId, ResourceError> {
        if !(1..=16).contains(&desc.max_anisotropy) || desc.min_lod > desc.max_lod {
            return Err(ResourceError::CreationFailed {
                object: "sampler",
                details: format!(
                    "anisotropy {} (expected 1..=16), lod range {}..{}",
                    desc.max_anisotropy, desc.min_lod, desc.max_lod
                ),
            });
        }
        let native = self.shared.backend.create_sampler(desc)?;
        self.shared
            .registry
            .samplers
            .insert(self.owned(native, NativeObject::Sampler))
    }

    /// Destroys a sampler.
    pub fn destroy_sampler(&self, id: SamplerId) -> Result<(), ResourceError> {
        self.shared.registry.samplers.remove(id).map(drop)
    }

    /// Creates a shader from compiled bytecode and its reflection.
    pub fn create_shader(&self, desc: &ShaderDescription<'_>) -> Result<ShaderId, ResourceError> {
        if desc.bytecode.is_empty() {
            return Err(ResourceError::CreationFailed {
                object: "shader",
                details: "bytecode is empty".to_string(),
            });
        }
        let native = self.shared.backend.create_shader(desc)?;
        let id = self.shared.registry.shaders.insert(ShaderEntry {
            native: self.owned(native, NativeObject::Shader),
            stage: desc.stage,
            bytecode: Arc::from(desc.bytecode.as_ref()),
            reflection: Arc::new(desc.reflection.clone()),
        })?;
        log::debug!("RenderDevice: created {:?} shader {id:?} ({:?})", desc.stage, desc.label);
        Ok(id)
    }

    /// Destroys a shader. Pipelines built from it are unaffected.
    pub fn destroy_shader(&self, id: ShaderId) -> Result<(), ResourceError> {
        self.shared.registry.shaders.remove(id).map(drop)
    }

    /// Returns the cached blend state for `desc`.
    /// ## Errors
    /// * `ValidationError::IndependentBlendUnsupported` - If targets differ on a
    ///   device without independent blending.
    pub fn create_blend_state(
        &self,
        desc: &BlendStateDescription,
    ) -> Result<CachedState<B::BlendState>, ResourceError> {
        validate_blend_state(desc, &self.capabilities())?;
        self.shared.cache.get_blend_state(desc)
    }

    /// Returns the cached depth/stencil state for `desc`.
    pub fn create_depth_stencil_state(
        &self,
        desc: &DepthStencilStateDescription,
    ) -> Result<CachedState<B::DepthStencilState>, ResourceError> {
        self.shared.cache.get_depth_stencil_state(desc)
    }

    /// Returns the cached rasterizer state for `desc`.
    /// ## Errors
    /// * `ValidationError::DepthClipDisableUnsupported` / `WireframeUnsupported` -
    ///   If the device lacks the feature.
    pub fn create_rasterizer_state(
        &self,
        desc: &RasterizerStateDescription,
        multisampled: bool,
    ) -> Result<CachedState<B::RasterizerState>, ResourceError> {
        validate_rasterizer_state(desc, &self.capabilities())?;
        self.shared.cache.get_rasterizer_state(desc, multisampled)
    }

    /// Returns the cached input layout matching `layouts` against a vertex shader.
    pub fn get_input_layout(
        &self,
        layouts: &[VertexBufferLayout<'_>],
        vertex_shader: ShaderId,
    ) -> Result<Option<CachedState<B::InputLayout>>, ResourceError> {
        let bytecode = self
            .shared
            .registry
            .shaders
            .with(vertex_shader, |e| Arc::clone(&e.bytecode))?;
        self.shared.cache.get_input_layout(layouts, &bytecode)
    }

    /// Validates `desc` and creates a graphics pipeline.
    /// ## Errors
    /// * `ResourceError::Validation` - If the description breaks a pipeline rule.
    /// * `ResourceError::InvalidHandle` - If a shader id is not live.
    pub fn create_graphics_pipeline(
        &self,
        desc: &GraphicsPipelineDescription<'_>,
    ) -> Result<PipelineId, ResourceError> {
        let built = PipelineBuilder {
            backend: self.shared.backend.as_ref(),
            cache: &self.shared.cache,
            registry: &self.shared.registry,
        }
        .build(desc)?;
        self.shared.registry.pipelines.insert(PipelineEntry {
            native: self.owned(built.native, NativeObject::Pipeline),
            render_pass: desc.render_pass.clone(),
            binding_layout: built.binding_layout,
        })
    }

    /// Destroys a graphics pipeline.
    pub fn destroy_pipeline(&self, id: PipelineId) -> Result<(), ResourceError> {
        self.shared.registry.pipelines.remove(id).map(drop)
    }

    /// Returns `true` if both pipelines use the same native binding layout.
    pub fn shares_binding_layout(&self, a: PipelineId, b: PipelineId) -> Result<bool, ResourceError> {
        let pipelines = &self.shared.registry.pipelines;
        Ok(pipelines.with(a, |e| e.binding_layout)? == pipelines.with(b, |e| e.binding_layout)?)
    }

    /// Takes a query slot from the pool of `kind`.
    /// ## Errors
    /// * `ResourceError::QueryPoolExhausted` - If every slot is in use.
    pub fn create_query(&self, kind: QueryType) -> Result<QueryId, ResourceError> {
        let index = self.shared.queries.allocate(kind)?;
        let wrap: fn(u32) -> NativeObject<B> = match kind {
            QueryType::Timestamp => NativeObject::TimestampQuery,
            QueryType::Occlusion => NativeObject::OcclusionQuery,
        };
        let id = QueryId { kind, index };
        self.shared.registry.queries.insert_at(id, self.owned(index, wrap))?;
        Ok(id)
    }

    /// Returns a query slot. It becomes available again after the frame lag.
    pub fn destroy_query(&self, id: QueryId) -> Result<(), ResourceError> {
        self.shared.registry.queries.remove(id).map(drop)
    }

    /// Free query slots of `kind`.
    pub fn available_queries(&self, kind: QueryType) -> usize {
        self.shared.queries.available(kind)
    }

    /// Acquires a command list from the pool of [`COMMANDLIST_COUNT`] lists.
    /// ## Errors
    /// * `ResourceError::CommandListPoolExhausted` - If every list is recording.
    pub fn begin_command_list(&self) -> Result<CommandList<B>, ResourceError> {
        let acquired = self.shared.active_command_lists.fetch_update(
            Ordering::AcqRel,
            Ordering::Acquire,
            |active| (active < COMMANDLIST_COUNT).then_some(active + 1),
        );
        if acquired.is_err() {
            log::error!("RenderDevice: all {COMMANDLIST_COUNT} command lists are recording");
            return Err(ResourceError::CommandListPoolExhausted);
        }
        match self.shared.backend.begin_command_list() {
            Ok(native) => Ok(CommandList::new(Arc::clone(&self.shared), native)),
            Err(err) => {
                self.shared.active_command_lists.fetch_sub(1, Ordering::AcqRel);
                Err(err)
            }
        }
    }

    /// Submits a recorded command list and returns its counters.
    /// ## Errors
    /// * `ResourceError::InvalidHandle` - If the list was recorded on another device.
    pub fn submit_command_list(
        &self,
        list: CommandList<B>,
    ) -> Result<CommandListStats, ResourceError> {
        if !list.belongs_to(&self.shared) {
            return Err(ResourceError::InvalidHandle);
        }
        let (native, stats) = list.finish();
        self.shared.backend.submit_command_list(native)?;

        *self
            .shared
            .command_list_stats
            .lock()
            .map_err(|e| ResourceError::BackendError(format!("Mutex poisoned (stats): {e}")))? +=
            stats;
        self.shared.submitted_command_lists.fetch_add(1, Ordering::Relaxed);
        Ok(stats)
    }

    /// Device-wide counters.
    pub fn stats(&self) -> RhiStats {
        let command_lists = self
            .shared
            .command_list_stats
            .lock()
            .map(|stats| *stats)
            .unwrap_or_default();
        RhiStats {
            frame_index: self.frame_index(),
            command_lists,
            submitted_command_lists: self.shared.submitted_command_lists.load(Ordering::Relaxed),
            cache: self.shared.cache.stats(),
            pending_destructions: self.shared.destruction.pending_count(),
            reclaimed_objects: self.shared.destruction.reclaimed_count(),
            allocated_bytes: self.shared.allocated_bytes.load(Ordering::Relaxed),
        }
    }
}
