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

//! Frame-pipelined release of native objects.
//!
//! A native object may still be referenced by command lists the GPU has not
//! finished executing. Instead of releasing it immediately, its owner pushes it into
//! the queue of its category together with the current frame index. An entry
//! recorded at frame `f` is released by the first `update(current, backbuffers)`
//! with `f + backbuffers < current`.

use crate::renderer::api::QueryType;
use crate::renderer::query::QueryPool;
use crate::renderer::traits::{DestructionCategory, NativeObject, RhiBackend};
use std::collections::VecDeque;
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type CategoryQueues<B> = [VecDeque<(NativeObject<B>, u64)>; DestructionCategory::COUNT];

/// Per-category FIFO queues of native objects awaiting release.
pub struct DeferredDestructionQueue<B: RhiBackend> {
    backend: Arc<B>,
    queries: Arc<QueryPool>,
    current_frame: AtomicU64,
    queues: Mutex<CategoryQueues<B>>,
    reclaimed: AtomicU64,
}

impl<B: RhiBackend> DeferredDestructionQueue<B> {
    /// Creates an empty queue releasing through `backend`. Query indices go back
    /// to `queries`.
    pub fn new(backend: Arc<B>, queries: Arc<QueryPool>) -> Self {
        Self {
            backend,
            queries,
            current_frame: AtomicU64::new(0),
            queues: Mutex::new(std::array::from_fn(|_| VecDeque::new())),
            reclaimed: AtomicU64::new(0),
        }
    }

    // Release never fails, so a poisoned lock is recovered rather than reported.
    fn lock_queues(&self) -> MutexGuard<'_, CategoryQueues<B>> {
        self.queues.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Schedules `object` for release, tagged with the current frame index.
    pub fn request_destroy(&self, object: NativeObject<B>) {
        let frame = self.current_frame.load(Ordering::Acquire);
        let category = object.category();
        log::trace!("DestructionQueue: {object:?} scheduled at frame {frame}");
        self.lock_queues()[category as usize].push_back((object, frame));
    }

    /// Advances the frame index and releases every entry whose frame lags behind
    /// `current_frame` by more than `backbuffer_count` frames.
    ///
    /// Returns the number of released objects.
    pub fn update(&self, current_frame: u64, backbuffer_count: u32) -> usize {
        self.current_frame.store(current_frame, Ordering::Release);
        self.release_expired(current_frame, backbuffer_count)
    }

    fn release_expired(&self, current_frame: u64, backbuffer_count: u32) -> usize {
        let mut expired = Vec::new();
        {
            let mut queues = self.lock_queues();
            for category in DestructionCategory::ALL {
                let queue = &mut queues[category as usize];
                // Entries are pushed in non-decreasing frame order, so the first
                // live entry ends the scan.
                while let Some((_, frame)) = queue.front() {
                    if frame.saturating_add(backbuffer_count as u64) >= current_frame {
                        break;
                    }
                    if let Some((object, _)) = queue.pop_front() {
                        expired.push(object);
                    }
                }
            }
        }

        let count = expired.len();
        for object in expired {
            self.release(object);
        }
        if count > 0 {
            self.reclaimed.fetch_add(count as u64, Ordering::Relaxed);
            log::debug!("DestructionQueue: released {count} objects");
        }
        count
    }

    fn release(&self, object: NativeObject<B>) {
        match object {
            NativeObject::TimestampQuery(index) => self.queries.free(QueryType::Timestamp, index),
            NativeObject::OcclusionQuery(index) => self.queries.free(QueryType::Occlusion, index),
            other => self.backend.release(other),
        }
    }

    /// Releases every pending entry regardless of its frame. The frame index is
    /// left untouched.
    pub fn flush_all(&self) -> usize {
        self.release_expired(u64::MAX, 0)
    }

    /// The frame index last passed to [`update`](Self::update).
    pub fn current_frame(&self) -> u64 {
        self.current_frame.load(Ordering::Acquire)
    }

    /// Number of entries waiting for release.
    pub fn pending_count(&self) -> usize {
        self.lock_queues().iter().map(VecDeque::len).sum()
    }

    /// Number of entries waiting in one category.
    pub fn pending_in(&self, category: DestructionCategory) -> usize {
        self.lock_queues()[category as usize].len()
    }

    /// Total objects released since creation.
    pub fn reclaimed_count(&self) -> u64 {
        self.reclaimed.load(Ordering::Relaxed)
    }
}

impl<B: RhiBackend> Drop for DeferredDestructionQueue<B> {
    fn drop(&mut self) {
        let released = self.flush_all();
        if released > 0 {
            log::debug!("DestructionQueue: drained {released} objects on shutdown");
        }
    }
}

/// Sole owner of a native handle. Dropping it schedules the handle for deferred
/// release instead of releasing it on the spot.
pub struct Owned<B: RhiBackend, T: Clone> {
    native: T,
    wrap: fn(T) -> NativeObject<B>,
    queue: Arc<DeferredDestructionQueue<B>>,
}

impl<B: RhiBackend, T: Clone> Owned<B, T> {
    /// Takes ownership of `native`. `wrap` tags it with its [`NativeObject`] kind.
    pub fn new(
        native: T,
        wrap: fn(T) -> NativeObject<B>,
        queue: Arc<DeferredDestructionQueue<B>>,
    ) -> Self {
        Self {
            native,
            wrap,
            queue,
        }
    }
}

impl<B: RhiBackend, T: Clone> Deref for Owned<B, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.native
    }
}

impl<B: RhiBackend, T: Clone + std::fmt::Debug> std::fmt::Debug for Owned<B, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Owned").field(&self.native).finish()
    }
}

impl<B: RhiBackend, T: Clone> Drop for Owned<B, T> {
    fn drop(&mut self) {
        self.queue.request_destroy((self.wrap)(self.native.clone()));
    }
}
