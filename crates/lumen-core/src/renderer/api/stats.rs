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

//! Counters exposed by the device, its caches and its command lists.

use std::ops::AddAssign;

/// State-change counters of one command list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandListStats {
    /// Bind calls forwarded to the native command list.
    pub state_changes: u64,
    /// Bind calls skipped because the state was already bound.
    pub redundant_state_changes: u64,
    /// Native flushes issued to resolve view hazards.
    pub flushes: u64,
}

impl AddAssign for CommandListStats {
    fn add_assign(&mut self, other: Self) {
        self.state_changes += other.state_changes;
        self.redundant_state_changes += other.redundant_state_changes;
        self.flushes += other.flushes;
    }
}

/// Lookup counters of the resource cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that created a native object.
    pub misses: u64,
    /// Cached blend states.
    pub blend_states: usize,
    /// Cached depth/stencil states.
    pub depth_stencil_states: usize,
    /// Cached rasterizer states.
    pub rasterizer_states: usize,
    /// Cached input layouts.
    pub input_layouts: usize,
    /// Cached binding layouts.
    pub binding_layouts: usize,
}

/// Device-wide counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RhiStats {
    /// Current frame index.
    pub frame_index: u64,
    /// Counters accumulated from every submitted command list.
    pub command_lists: CommandListStats,
    /// Command lists submitted since the device was created.
    pub submitted_command_lists: u64,
    /// Resource cache counters.
    pub cache: CacheStats,
    /// Objects waiting in the deferred destruction queue.
    pub pending_destructions: usize,
    /// Objects released by the deferred destruction queue.
    pub reclaimed_objects: u64,
    /// Bytes held by live buffers and textures.
    pub allocated_bytes: u64,
}
