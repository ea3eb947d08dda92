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

use super::command::{NullCommand, NullCommandList};
use lumen_core::renderer::*;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A native object of the null backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NullHandle(pub u64);

#[derive(Debug, Default)]
struct Tracking {
    live: HashSet<u64>,
    created: HashMap<&'static str, usize>,
    released: usize,
}

#[derive(Debug, Default)]
struct Shared {
    next_handle: AtomicU64,
    tracking: Mutex<Tracking>,
    commands: Arc<Mutex<Vec<NullCommand>>>,
    submitted: AtomicU64,
}

/// The null backend.
///
/// Clones share their object tracking, so a clone kept aside can observe a backend
/// owned by a device, including after the device is dropped.
#[derive(Debug, Clone)]
pub struct NullBackend {
    capabilities: DeviceCapabilities,
    unsupported_formats: Vec<ResourceFormat>,
    shared: Arc<Shared>,
}

impl Default for NullBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl NullBackend {
    /// A backend supporting every feature and format.
    pub fn new() -> Self {
        Self::with_capabilities(DeviceCapabilities::default())
    }

    /// A backend with the given optional features.
    pub fn with_capabilities(capabilities: DeviceCapabilities) -> Self {
        Self {
            capabilities,
            unsupported_formats: Vec::new(),
            shared: Arc::default(),
        }
    }

    /// Marks `formats` as having no native equivalent.
    pub fn without_formats(mut self, formats: &[ResourceFormat]) -> Self {
        self.unsupported_formats.extend_from_slice(formats);
        self
    }

    fn tracking(&self) -> MutexGuard<'_, Tracking> {
        self.shared
            .tracking
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn create(&self, kind: &'static str) -> NullHandle {
        let handle = NullHandle(self.shared.next_handle.fetch_add(1, Ordering::Relaxed) + 1);
        let mut tracking = self.tracking();
        tracking.live.insert(handle.0);
        *tracking.created.entry(kind).or_default() += 1;
        log::trace!("NullBackend: created {kind} {handle:?}");
        handle
    }

    fn check_format(&self, format: ResourceFormat) -> Result<(), ResourceError> {
        if self.supports_format(format) {
            Ok(())
        } else {
            Err(FormatError::UnsupportedByBackend {
                format,
                backend: self.name(),
            }
            .into())
        }
    }

    /// Native objects created and not yet released.
    pub fn live_count(&self) -> usize {
        self.tracking().live.len()
    }

    /// Native objects of `kind` created so far. Kinds are the lowercase object names
    /// used in `ResourceError::CreationFailed` (`"buffer"`, `"blend state"`, ...).
    pub fn created_count(&self, kind: &str) -> usize {
        self.tracking().created.get(kind).copied().unwrap_or(0)
    }

    /// Native objects released so far.
    pub fn released_count(&self) -> usize {
        self.tracking().released
    }

    /// Command lists submitted so far.
    pub fn submitted_count(&self) -> u64 {
        self.shared.submitted.load(Ordering::Relaxed)
    }

    /// Every native call recorded by command lists of this backend.
    pub fn commands(&self) -> Vec<NullCommand> {
        self.shared
            .commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Forgets the recorded native calls.
    pub fn clear_commands(&self) {
        self.shared
            .commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl RhiBackend for NullBackend {
    type Resource = NullHandle;
    type Allocation = NullHandle;
    type ResourceView = NullHandle;
    type UnorderedAccessView = NullHandle;
    type Sampler = NullHandle;
    type Shader = NullHandle;
    type BlendState = NullHandle;
    type DepthStencilState = NullHandle;
    type RasterizerState = NullHandle;
    type InputLayout = NullHandle;
    type BindingLayout = NullHandle;
    type Pipeline = NullHandle;
    type CommandList = NullCommandList;

    fn name(&self) -> &'static str {
        "null"
    }

    fn capabilities(&self) -> DeviceCapabilities {
        self.capabilities
    }

    fn supports_format(&self, format: ResourceFormat) -> bool {
        !self.unsupported_formats.contains(&format)
    }

    fn create_buffer(
        &self,
        _desc: &BufferDescription<'_>,
    ) -> Result<NativeResource<Self>, ResourceError> {
        Ok(NativeResource {
            resource: self.create("buffer"),
            allocation: Some(self.create("allocation")),
        })
    }

    fn create_texture(
        &self,
        desc: &TextureDescription<'_>,
    ) -> Result<NativeResource<Self>, ResourceError> {
        self.check_format(desc.format)?;
        Ok(NativeResource {
            resource: self.create("texture"),
            allocation: Some(self.create("allocation")),
        })
    }

    fn create_resource_view(
        &self,
        resource: &NullHandle,
        _desc: &ResourceViewDescription,
    ) -> Result<NullHandle, ResourceError> {
        if !self.tracking().live.contains(&resource.0) {
            return Err(ResourceError::InvalidHandle);
        }
        Ok(self.create("resource view"))
    }

    fn create_unordered_access_view(
        &self,
        resource: &NullHandle,
        _desc: &UnorderedAccessViewDescription,
    ) -> Result<NullHandle, ResourceError> {
        if !self.tracking().live.contains(&resource.0) {
            return Err(ResourceError::InvalidHandle);
        }
        Ok(self.create("unordered access view"))
    }

    fn create_sampler(&self, _desc: &SamplerDescription) -> Result<NullHandle, ResourceError> {
        Ok(self.create("sampler"))
    }

    fn create_shader(&self, _desc: &ShaderDescription<'_>) -> Result<NullHandle, ResourceError> {
        Ok(self.create("shader"))
    }

    fn create_blend_state(&self, _desc: &BlendStateDescription) -> Result<NullHandle, ResourceError> {
        Ok(self.create("blend state"))
    }

    fn create_depth_stencil_state(
        &self,
        _desc: &DepthStencilStateDescription,
    ) -> Result<NullHandle, ResourceError> {
        Ok(self.create("depth stencil state"))
    }

    fn create_rasterizer_state(
        &self,
        _desc: &RasterizerStateDescription,
        _multisampled: bool,
    ) -> Result<NullHandle, ResourceError> {
        Ok(self.create("rasterizer state"))
    }

    fn create_input_layout(
        &self,
        layout: &ResolvedInputLayout,
        _bytecode: &[u8],
    ) -> Result<NullHandle, ResourceError> {
        for element in &layout.elements {
            self.check_format(element.format)?;
        }
        Ok(self.create("input layout"))
    }

    fn create_binding_layout(
        &self,
        _desc: &BindingLayoutDescription,
    ) -> Result<NullHandle, ResourceError> {
        Ok(self.create("binding layout"))
    }

    fn create_graphics_pipeline(
        &self,
        desc: &NativePipelineDescription<'_, Self>,
    ) -> Result<NullHandle, ResourceError> {
        for format in desc.render_pass.color_formats.iter().chain(&desc.render_pass.depth_format) {
            self.check_format(*format)?;
        }
        Ok(self.create("pipeline"))
    }

    fn release(&self, object: NativeObject<Self>) {
        let handle = match object {
            NativeObject::Allocation(h)
            | NativeObject::Resource(h)
            | NativeObject::ResourceView(h)
            | NativeObject::UnorderedAccessView(h)
            | NativeObject::Sampler(h)
            | NativeObject::Shader(h)
            | NativeObject::BlendState(h)
            | NativeObject::DepthStencilState(h)
            | NativeObject::RasterizerState(h)
            | NativeObject::InputLayout(h)
            | NativeObject::BindingLayout(h)
            | NativeObject::Pipeline(h) => h,
            NativeObject::TimestampQuery(_) | NativeObject::OcclusionQuery(_) => return,
        };
        let mut tracking = self.tracking();
        if tracking.live.remove(&handle.0) {
            tracking.released += 1;
        } else {
            log::error!("NullBackend: {handle:?} released twice");
        }
    }

    fn begin_command_list(&self) -> Result<NullCommandList, ResourceError> {
        Ok(NullCommandList::new(Arc::clone(&self.shared.commands)))
    }

    fn submit_command_list(&self, list: NullCommandList) -> Result<(), ResourceError> {
        let recorded = list.submit();
        self.shared.submitted.fetch_add(1, Ordering::Relaxed);
        log::trace!("NullBackend: submitted a command list with {recorded} commands");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_tracks_live_handles() {
        let backend = NullBackend::new();
        let native = backend
            .create_buffer(&BufferDescription {
                label: None,
                size: 4,
                usage: BufferUsage::VERTEX,
                struct_stride: 0,
            })
            .unwrap();
        assert_eq!(backend.live_count(), 2);

        backend.release(NativeObject::Resource(native.resource));
        assert_eq!(backend.live_count(), 1);
        assert_eq!(backend.released_count(), 1);

        // A second release is reported, not counted.
        backend.release(NativeObject::Resource(native.resource));
        assert_eq!(backend.released_count(), 1);
    }

    #[test]
    fn test_unsupported_formats_are_rejected() {
        let backend = NullBackend::new().without_formats(&[ResourceFormat::BC7Unorm]);
        let desc = TextureDescription {
            format: ResourceFormat::BC7Unorm,
            width: 4,
            height: 4,
            ..Default::default()
        };
        assert!(matches!(
            backend.create_texture(&desc),
            Err(ResourceError::Format(FormatError::UnsupportedByBackend { backend: "null", .. }))
        ));
        assert_eq!(backend.live_count(), 0);
    }

    #[test]
    fn test_clones_share_tracking() {
        let backend = NullBackend::new();
        let observer = backend.clone();
        let sampler = backend.create_sampler(&SamplerDescription::default()).unwrap();
        assert_eq!(observer.live_count(), 1);
        assert_eq!(observer.created_count("sampler"), 1);

        drop(backend);
        observer.release(NativeObject::Sampler(sampler));
        assert_eq!(observer.live_count(), 0);
    }

    #[test]
    fn test_commands_reach_the_log_on_submit() {
        let backend = NullBackend::new();
        let mut list = backend.begin_command_list().unwrap();
        list.set_primitive_topology(PrimitiveTopology::LineList);
        list.flush();
        assert_eq!(list.recorded().len(), 2);
        assert!(backend.commands().is_empty());

        backend.submit_command_list(list).unwrap();
        assert_eq!(
            backend.commands(),
            vec![
                NullCommand::SetPrimitiveTopology(PrimitiveTopology::LineList),
                NullCommand::Flush,
            ]
        );
        assert_eq!(backend.submitted_count(), 1);
    }
}
