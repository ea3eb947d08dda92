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

//! Query index allocation.
//!
//! Queries live in fixed native heaps and are addressed by index. Free indices are
//! kept in a bounded lock-free queue so the allocation path never takes the
//! destruction queue lock.

use crate::renderer::api::QueryType;
use crate::renderer::error::ResourceError;
use crossbeam_queue::ArrayQueue;

/// A bounded FIFO of free `u32` indices, safe to push and pop from any thread.
pub struct IndexRing {
    queue: ArrayQueue<u32>,
}

impl IndexRing {
    /// Creates a ring holding every index in `0..count`.
    pub fn with_indices(count: u32) -> Self {
        // ArrayQueue rejects a zero capacity.
        let queue = ArrayQueue::new((count as usize).max(1));
        for index in 0..count {
            let _ = queue.push(index);
        }
        Self { queue }
    }

    /// Appends an index. Returns `false` if the ring is full.
    pub fn push(&self, value: u32) -> bool {
        self.queue.push(value).is_ok()
    }

    /// Removes the oldest index. Returns `None` if the ring is empty.
    pub fn pop(&self) -> Option<u32> {
        self.queue.pop()
    }

    /// Number of indices currently stored.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns `true` if no index is available.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Maximum number of indices the ring can hold.
    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }
}

/// Free lists of timestamp and occlusion query indices.
pub struct QueryPool {
    timestamps: IndexRing,
    occlusions: IndexRing,
}

impl QueryPool {
    /// Creates pools holding `timestamps` and `occlusions` indices.
    pub fn new(timestamps: u32, occlusions: u32) -> Self {
        Self {
            timestamps: IndexRing::with_indices(timestamps),
            occlusions: IndexRing::with_indices(occlusions),
        }
    }

    fn ring(&self, kind: QueryType) -> &IndexRing {
        match kind {
            QueryType::Timestamp => &self.timestamps,
            QueryType::Occlusion => &self.occlusions,
        }
    }

    /// Takes a free query index.
    /// ## Errors
    /// * `ResourceError::QueryPoolExhausted` - If every index of `kind` is in use.
    pub fn allocate(&self, kind: QueryType) -> Result<u32, ResourceError> {
        self.ring(kind)
            .pop()
            .ok_or(ResourceError::QueryPoolExhausted)
    }

    /// Returns a query index to its pool.
    pub fn free(&self, kind: QueryType, index: u32) {
        if !self.ring(kind).push(index) {
            log::error!("QueryPool: {kind:?} index {index} returned to a full pool");
        }
    }

    /// Free indices of `kind`.
    pub fn available(&self, kind: QueryType) -> usize {
        self.ring(kind).len()
    }
}
