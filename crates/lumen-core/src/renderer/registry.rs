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

//! Handle tables mapping device ids to the native objects they own.

use crate::renderer::api::*;
use crate::renderer::cache::StateId;
use crate::renderer::destruction::Owned;
use crate::renderer::error::ResourceError;
use crate::renderer::traits::RhiBackend;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Ids handed out by a [`HandleTable`].
pub(crate) trait Handle: Copy + Eq + Hash + std::fmt::Debug {
    fn from_index(index: usize) -> Self;
}

macro_rules! impl_handle {
    ($($id:ident),* $(,)?) => {
        $(
            impl Handle for $id {
                fn from_index(index: usize) -> Self {
                    $id(index)
                }
            }
        )*
    };
}

impl_handle!(
    BufferId,
    TextureId,
    ResourceViewId,
    UnorderedAccessViewId,
    SamplerId,
    ShaderId,
    PipelineId,
);

/// A mutex-guarded id-to-entry map with a monotonic id counter.
pub(crate) struct HandleTable<K, T> {
    name: &'static str,
    next_id: AtomicUsize,
    entries: Mutex<HashMap<K, T>>,
}

impl<K: Handle, T> HandleTable<K, T> {
    pub(crate) fn insert(&self, entry: T) -> Result<K, ResourceError> {
        let id = K::from_index(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock()?.insert(id, entry);
        Ok(id)
    }
}

impl<K: Copy + Eq + Hash + std::fmt::Debug, T> HandleTable<K, T> {
    pub(crate) fn new(name: &'static str) -> Self {
        Self {
            name,
            next_id: AtomicUsize::new(0),
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<K, T>>, ResourceError> {
        self.entries
            .lock()
            .map_err(|e| ResourceError::BackendError(format!("Mutex poisoned ({}): {e}", self.name)))
    }

    pub(crate) fn insert_at(&self, id: K, entry: T) -> Result<(), ResourceError> {
        self.lock()?.insert(id, entry);
        Ok(())
    }

    /// Removes the entry. Dropping it schedules its native objects for release.
    pub(crate) fn remove(&self, id: K) -> Result<T, ResourceError> {
        let entry = self.lock()?.remove(&id).ok_or(ResourceError::InvalidHandle)?;
        log::debug!("Registry: destroyed {} {id:?}", self.name);
        Ok(entry)
    }

    /// Runs `f` on the entry under the table lock.
    pub(crate) fn with<R>(&self, id: K, f: impl FnOnce(&T) -> R) -> Result<R, ResourceError> {
        let entries = self.lock()?;
        entries.get(&id).map(f).ok_or(ResourceError::InvalidHandle)
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Drops every entry and returns how many there were.
    pub(crate) fn clear(&self) -> usize {
        let drained: Vec<T> = match self.entries.lock() {
            Ok(mut entries) => entries.drain().map(|(_, entry)| entry).collect(),
            Err(poisoned) => poisoned.into_inner().drain().map(|(_, entry)| entry).collect(),
        };
        // Entries drop outside the lock.
        drained.len()
    }
}

pub(crate) struct BufferEntry<B: RhiBackend> {
    pub(crate) resource: Owned<B, B::Resource>,
    pub(crate) _allocation: Option<Owned<B, B::Allocation>>,
    pub(crate) size: u64,
    pub(crate) stride: u32,
}

pub(crate) struct TextureEntry<B: RhiBackend> {
    pub(crate) resource: Owned<B, B::Resource>,
    pub(crate) _allocation: Option<Owned<B, B::Allocation>>,
    pub(crate) byte_size: u64,
}

pub(crate) struct ViewEntry<B: RhiBackend, T: Clone> {
    pub(crate) native: Owned<B, T>,
    pub(crate) source: ResourceRef,
}

pub(crate) struct ShaderEntry<B: RhiBackend> {
    pub(crate) native: Owned<B, B::Shader>,
    pub(crate) stage: ShaderStage,
    pub(crate) bytecode: Arc<[u8]>,
    pub(crate) reflection: Arc<ShaderReflection>,
}

pub(crate) struct PipelineEntry<B: RhiBackend> {
    pub(crate) native: Owned<B, B::Pipeline>,
    pub(crate) render_pass: RenderPassLayout,
    pub(crate) binding_layout: StateId,
}

/// Every object created through a device, by id.
pub(crate) struct Registry<B: RhiBackend> {
    pub(crate) buffers: HandleTable<BufferId, BufferEntry<B>>,
    pub(crate) textures: HandleTable<TextureId, TextureEntry<B>>,
    pub(crate) resource_views: HandleTable<ResourceViewId, ViewEntry<B, B::ResourceView>>,
    pub(crate) unordered_access_views:
        HandleTable<UnorderedAccessViewId, ViewEntry<B, B::UnorderedAccessView>>,
    pub(crate) samplers: HandleTable<SamplerId, Owned<B, B::Sampler>>,
    pub(crate) shaders: HandleTable<ShaderId, ShaderEntry<B>>,
    pub(crate) pipelines: HandleTable<PipelineId, PipelineEntry<B>>,
    pub(crate) queries: HandleTable<QueryId, Owned<B, u32>>,
}

impl<B: RhiBackend> Registry<B> {
    pub(crate) fn new() -> Self {
        Self {
            buffers: HandleTable::new("buffer"),
            textures: HandleTable::new("texture"),
            resource_views: HandleTable::new("resource view"),
            unordered_access_views: HandleTable::new("unordered access view"),
            samplers: HandleTable::new("sampler"),
            shaders: HandleTable::new("shader"),
            pipelines: HandleTable::new("pipeline"),
            queries: HandleTable::new("query"),
        }
    }

    /// Native resource behind a buffer or texture.
    pub(crate) fn native_resource(&self, resource: ResourceRef) -> Result<B::Resource, ResourceError> {
        match resource {
            ResourceRef::Buffer(id) => self.buffers.with(id, |e| (*e.resource).clone()),
            ResourceRef::Texture(id) => self.textures.with(id, |e| (*e.resource).clone()),
        }
    }

    /// Schedules every registered object for release, views before resources.
    pub(crate) fn clear(&self) -> usize {
        self.pipelines.clear()
            + self.shaders.clear()
            + self.resource_views.clear()
            + self.unordered_access_views.clear()
            + self.samplers.clear()
            + self.textures.clear()
            + self.buffers.clear()
            + self.queries.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_removal_is_checked() {
        let table: HandleTable<BufferId, &str> = HandleTable::new("buffer");
        let a = table.insert("a").unwrap();
        let b = table.insert("b").unwrap();
        assert_ne!(a, b);
        assert_eq!(table.with(b, |e| *e).unwrap(), "b");

        assert_eq!(table.remove(a).unwrap(), "a");
        assert!(matches!(table.remove(a), Err(ResourceError::InvalidHandle)));
        assert!(matches!(table.with(a, |_| ()), Err(ResourceError::InvalidHandle)));

        // Ids are never reused.
        let c = table.insert("c").unwrap();
        assert!(c != a && c != b);
        assert_eq!(table.len(), 2);
        assert_eq!(table.clear(), 2);
        assert_eq!(table.len(), 0);
    }
}
