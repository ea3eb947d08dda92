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

//! Exactly-once creation of native state objects.
//!
//! Each sub-cache maps a description to the native object created for it. A single
//! mutex guards the whole lookup-or-insert sequence, so two threads asking for the
//! same description can never both create a native object. Native state objects
//! live as long as the cache and are released by [`ResourceCache::dispose`].

use crate::renderer::api::*;
use crate::renderer::error::ResourceError;
use crate::renderer::traits::{NativeObject, RhiBackend};
use std::collections::hash_map::RandomState;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};
use std::sync::{Arc, Mutex, MutexGuard};

/// Identity of a cached state object, unique within one cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(pub u64);

/// A native state object handed out by the cache.
///
/// Two `CachedState`s are equal when they come from the same cache entry.
#[derive(Debug, Clone)]
pub struct CachedState<T> {
    id: StateId,
    native: T,
}

impl<T> CachedState<T> {
    /// The cache-assigned identity.
    pub fn id(&self) -> StateId {
        self.id
    }

    /// The native handle.
    pub fn native(&self) -> &T {
        &self.native
    }
}

impl<T> PartialEq for CachedState<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for CachedState<T> {}

#[derive(Debug, Default)]
struct Counters {
    next_id: u64,
    hits: u64,
    misses: u64,
}

impl Counters {
    fn hit<T: Clone>(&mut self, state: &CachedState<T>) -> CachedState<T> {
        self.hits += 1;
        state.clone()
    }

    fn insert<T>(&mut self, native: T) -> CachedState<T> {
        self.misses += 1;
        self.next_id += 1;
        CachedState {
            id: StateId(self.next_id),
            native,
        }
    }
}

type InputLayoutBucket<T> = Vec<(InputLayoutKey<'static>, CachedState<T>)>;

struct CacheMaps<B: RhiBackend> {
    disposed: bool,
    counters: Counters,
    blend_states: HashMap<BlendStateDescription, CachedState<B::BlendState>>,
    depth_stencil_states: HashMap<DepthStencilStateDescription, CachedState<B::DepthStencilState>>,
    rasterizer_states: HashMap<(RasterizerStateDescription, bool), CachedState<B::RasterizerState>>,
    input_layouts: HashMap<u64, InputLayoutBucket<B::InputLayout>>,
    binding_layouts: HashMap<BindingLayoutDescription, CachedState<B::BindingLayout>>,
}

impl<B: RhiBackend> CacheMaps<B> {
    fn new() -> Self {
        Self {
            disposed: false,
            counters: Counters::default(),
            blend_states: HashMap::new(),
            depth_stencil_states: HashMap::new(),
            rasterizer_states: HashMap::new(),
            input_layouts: HashMap::new(),
            binding_layouts: HashMap::new(),
        }
    }
}

fn get_or_create<K, T>(
    map: &mut HashMap<K, CachedState<T>>,
    counters: &mut Counters,
    key: &K,
    kind: &str,
    create: impl FnOnce() -> Result<T, ResourceError>,
) -> Result<CachedState<T>, ResourceError>
where
    K: Hash + Eq + Clone,
    T: Clone,
{
    if let Some(state) = map.get(key) {
        return Ok(counters.hit(state));
    }
    let state = counters.insert(create()?);
    log::debug!("ResourceCache: created {kind} {:?}", state.id);
    // The key is cloned into the map, never borrowed from the caller.
    map.insert(key.clone(), state.clone());
    Ok(state)
}

/// Per-device cache of native blend, depth/stencil, rasterizer, input and binding
/// layout objects.
pub struct ResourceCache<B: RhiBackend> {
    backend: Arc<B>,
    hasher: RandomState,
    maps: Mutex<CacheMaps<B>>,
}

impl<B: RhiBackend> ResourceCache<B> {
    /// Creates an empty cache creating its objects through `backend`.
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            hasher: RandomState::new(),
            maps: Mutex::new(CacheMaps::new()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, CacheMaps<B>>, ResourceError> {
        let guard = self
            .maps
            .lock()
            .map_err(|e| ResourceError::BackendError(format!("Mutex poisoned (cache): {e}")))?;
        if guard.disposed {
            return Err(ResourceError::CacheDisposed);
        }
        Ok(guard)
    }

    /// Returns the native blend state for `desc`, creating it on first use.
    /// ## Errors
    /// * `ResourceError::CacheDisposed` - If [`dispose`](Self::dispose) was called.
    /// * Any creation error of the backend. Nothing is cached in that case.
    pub fn get_blend_state(
        &self,
        desc: &BlendStateDescription,
    ) -> Result<CachedState<B::BlendState>, ResourceError> {
        let mut guard = self.lock()?;
        let maps = &mut *guard;
        get_or_create(
            &mut maps.blend_states,
            &mut maps.counters,
            desc,
            "blend state",
            || self.backend.create_blend_state(desc),
        )
    }

    /// Returns the native depth/stencil state for `desc`, creating it on first use.
    pub fn get_depth_stencil_state(
        &self,
        desc: &DepthStencilStateDescription,
    ) -> Result<CachedState<B::DepthStencilState>, ResourceError> {
        let mut guard = self.lock()?;
        let maps = &mut *guard;
        get_or_create(
            &mut maps.depth_stencil_states,
            &mut maps.counters,
            desc,
            "depth/stencil state",
            || self.backend.create_depth_stencil_state(desc),
        )
    }

    /// Returns the native rasterizer state for `desc`, creating it on first use.
    ///
    /// `multisampled` comes from the render target bound at the time and is part
    /// of the key.
    pub fn get_rasterizer_state(
        &self,
        desc: &RasterizerStateDescription,
        multisampled: bool,
    ) -> Result<CachedState<B::RasterizerState>, ResourceError> {
        let mut guard = self.lock()?;
        let maps = &mut *guard;
        get_or_create(
            &mut maps.rasterizer_states,
            &mut maps.counters,
            &(*desc, multisampled),
            "rasterizer state",
            || self.backend.create_rasterizer_state(desc, multisampled),
        )
    }

    /// Returns the native input layout matching `layouts` against `bytecode`.
    ///
    /// Returns `Ok(None)` when either is empty: such a pipeline reads no vertex input.
    /// A hit performs no allocation: the lookup key only borrows the arguments.
    pub fn get_input_layout(
        &self,
        layouts: &[VertexBufferLayout<'_>],
        bytecode: &[u8],
    ) -> Result<Option<CachedState<B::InputLayout>>, ResourceError> {
        if layouts.is_empty() || bytecode.is_empty() {
            return Ok(None);
        }

        let lookup = InputLayoutKey::borrowed(layouts, bytecode);
        let hash = self.hasher.hash_one(&lookup);

        let mut guard = self.lock()?;
        let maps = &mut *guard;
        if let Some(bucket) = maps.input_layouts.get(&hash) {
            if let Some((_, state)) = bucket.iter().find(|(key, _)| key.matches(&lookup)) {
                return Ok(Some(maps.counters.hit(state)));
            }
        }

        let resolved = resolve_input_layout(layouts)?;
        let native = self.backend.create_input_layout(&resolved, bytecode)?;
        let state = maps.counters.insert(native);
        log::debug!(
            "ResourceCache: created input layout {:?} ({} elements)",
            state.id,
            resolved.elements.len()
        );
        maps.input_layouts
            .entry(hash)
            .or_default()
            .push((lookup.to_permanent(), state.clone()));
        Ok(Some(state))
    }

    /// Returns the native binding layout for `desc`, creating it on first use.
    ///
    /// Pipelines declaring structurally identical bindings share one native object.
    pub fn get_binding_layout(
        &self,
        desc: &BindingLayoutDescription,
    ) -> Result<CachedState<B::BindingLayout>, ResourceError> {
        let mut guard = self.lock()?;
        let maps = &mut *guard;
        get_or_create(
            &mut maps.binding_layouts,
            &mut maps.counters,
            desc,
            "binding layout",
            || self.backend.create_binding_layout(desc),
        )
    }

    /// Lookup counters and entry counts.
    pub fn stats(&self) -> CacheStats {
        let Ok(maps) = self.maps.lock() else {
            return CacheStats::default();
        };
        CacheStats {
            hits: maps.counters.hits,
            misses: maps.counters.misses,
            blend_states: maps.blend_states.len(),
            depth_stencil_states: maps.depth_stencil_states.len(),
            rasterizer_states: maps.rasterizer_states.len(),
            input_layouts: maps.input_layouts.values().map(Vec::len).sum(),
            binding_layouts: maps.binding_layouts.len(),
        }
    }

    /// Releases every cached native object. Later lookups fail with
    /// [`ResourceError::CacheDisposed`]. Calling it twice is a no-op.
    pub fn dispose(&self) {
        let mut maps = match self.maps.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if maps.disposed {
            return;
        }
        maps.disposed = true;

        let mut released = 0usize;
        for (_, state) in maps.blend_states.drain() {
            self.backend.release(NativeObject::BlendState(state.native));
            released += 1;
        }
        for (_, state) in maps.depth_stencil_states.drain() {
            self.backend.release(NativeObject::DepthStencilState(state.native));
            released += 1;
        }
        for (_, state) in maps.rasterizer_states.drain() {
            self.backend.release(NativeObject::RasterizerState(state.native));
            released += 1;
        }
        for (_, bucket) in maps.input_layouts.drain() {
            for (_, state) in bucket {
                self.backend.release(NativeObject::InputLayout(state.native));
                released += 1;
            }
        }
        for (_, state) in maps.binding_layouts.drain() {
            self.backend.release(NativeObject::BindingLayout(state.native));
            released += 1;
        }
        log::debug!("ResourceCache: disposed, released {released} native objects");
    }
}

impl<B: RhiBackend> Drop for ResourceCache<B> {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::mock::MockBackend;
    use std::sync::atomic::Ordering;
    use std::thread;

    fn cache() -> (Arc<MockBackend>, ResourceCache<MockBackend>) {
        let backend = Arc::new(MockBackend::default());
        let cache = ResourceCache::new(Arc::clone(&backend));
        (backend, cache)
    }

    #[test]
    fn test_equal_descriptions_share_one_native_object() {
        let (backend, cache) = cache();
        let d1 = BlendStateDescription::alpha_blending();
        let d2 = BlendStateDescription::alpha_blending();

        let a = cache.get_blend_state(&d1).unwrap();
        let b = cache.get_blend_state(&d2).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.native(), b.native());
        assert_eq!(backend.creation_count("blend_state"), 1);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.blend_states, 1);
    }

    #[test]
    fn test_mutating_caller_description_does_not_alias_cache_key() {
        let (backend, cache) = cache();
        let original = DepthStencilStateDescription::default();
        let mut desc = original;
        let first = cache.get_depth_stencil_state(&desc).unwrap();

        desc.depth_write = false;
        desc.stencil_test = true;

        let again = cache.get_depth_stencil_state(&original).unwrap();
        assert_eq!(first, again);
        assert_eq!(backend.creation_count("depth_stencil_state"), 1);

        let other = cache.get_depth_stencil_state(&desc).unwrap();
        assert_ne!(first, other);
        assert_eq!(backend.creation_count("depth_stencil_state"), 2);
    }

    #[test]
    fn test_rasterizer_key_includes_multisample_flag() {
        let (backend, cache) = cache();
        let desc = RasterizerStateDescription::default();
        let single = cache.get_rasterizer_state(&desc, false).unwrap();
        let multi = cache.get_rasterizer_state(&desc, true).unwrap();
        assert_ne!(single, multi);
        assert_eq!(cache.get_rasterizer_state(&desc, true).unwrap(), multi);
        assert_eq!(backend.creation_count("rasterizer_state"), 2);
    }

    #[test]
    fn test_input_layout_lookup() {
        let (backend, cache) = cache();
        let elements = [
            VertexElement::new(VertexSemantic::Position, ResourceFormat::R32G32B32Float),
            VertexElement::new(VertexSemantic::TexCoord, ResourceFormat::R32G32Float),
        ];
        let layouts = [VertexBufferLayout::new(20, &elements[..])];
        let bytecode = vec![0xde, 0xad];

        assert!(cache.get_input_layout(&[], &bytecode).unwrap().is_none());
        assert!(cache.get_input_layout(&layouts, &[]).unwrap().is_none());
        assert_eq!(backend.creation_count("input_layout"), 0);

        let first = cache.get_input_layout(&layouts, &bytecode).unwrap().unwrap();
        // A structurally equal layout built from separate arrays hits the cache.
        let copy = [VertexBufferLayout::new(20, elements.to_vec())];
        let second = cache.get_input_layout(&copy, &bytecode.clone()).unwrap().unwrap();
        assert_eq!(first, second);
        assert_eq!(backend.creation_count("input_layout"), 1);

        let third = cache.get_input_layout(&layouts, &[0xbe, 0xef]).unwrap().unwrap();
        assert_ne!(first, third);
        assert_eq!(cache.stats().input_layouts, 2);
    }

    #[test]
    fn test_invalid_input_layout_is_not_cached() {
        let (backend, cache) = cache();
        let elements = [
            VertexElement::at_offset(VertexSemantic::Position, ResourceFormat::R32G32B32Float, 0),
            VertexElement::new(VertexSemantic::Normal, ResourceFormat::R32G32B32Float),
        ];
        let layouts = [VertexBufferLayout::new(24, &elements[..])];
        let err = cache.get_input_layout(&layouts, &[1]).unwrap_err();
        assert!(matches!(err, ResourceError::Validation(_)));
        assert_eq!(backend.creation_count("input_layout"), 0);
        assert_eq!(cache.stats().input_layouts, 0);
    }

    #[test]
    fn test_creation_failure_is_not_cached() {
        let (backend, cache) = cache();
        let desc = BlendStateDescription::default();
        backend.fail_creation.store(true, Ordering::SeqCst);
        assert!(matches!(
            cache.get_blend_state(&desc),
            Err(ResourceError::CreationFailed { .. })
        ));

        backend.fail_creation.store(false, Ordering::SeqCst);
        cache.get_blend_state(&desc).unwrap();
        assert_eq!(backend.creation_count("blend_state"), 1);
        assert_eq!(cache.stats().blend_states, 1);
    }

    #[test]
    fn test_dispose_releases_everything_and_blocks_lookups() {
        let (backend, cache) = cache();
        cache.get_blend_state(&BlendStateDescription::default()).unwrap();
        cache
            .get_rasterizer_state(&RasterizerStateDescription::default(), false)
            .unwrap();
        cache
            .get_binding_layout(&BindingLayoutDescription::default())
            .unwrap();

        cache.dispose();
        assert_eq!(backend.released().len(), 3);
        assert!(matches!(
            cache.get_blend_state(&BlendStateDescription::default()),
            Err(ResourceError::CacheDisposed)
        ));

        cache.dispose();
        drop(cache);
        assert_eq!(backend.released().len(), 3);
    }

    #[test]
    fn test_concurrent_lookups_create_once() {
        let (backend, cache) = cache();
        let cache = Arc::new(cache);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    cache
                        .get_blend_state(&BlendStateDescription::alpha_blending())
                        .unwrap()
                        .id()
                })
            })
            .collect();
        let ids: Vec<StateId> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(ids.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(backend.creation_count("blend_state"), 1);
    }
}
