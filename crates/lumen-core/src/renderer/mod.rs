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

//! The render hardware interface: backend-neutral contracts and the generic
//! machinery every backend shares.

pub mod api;
pub mod cache;
pub mod destruction;
pub mod error;
pub mod pipeline;
pub mod query;
pub mod traits;

mod device;
mod registry;
mod tracker;

#[cfg(test)]
pub(crate) mod mock;

pub use self::api::*;
pub use self::cache::{CachedState, ResourceCache, StateId};
pub use self::destruction::{DeferredDestructionQueue, Owned};
pub use self::device::RenderDevice;
pub use self::error::{FormatError, RenderError, ResourceError, ValidationError};
pub use self::query::{IndexRing, QueryPool};
pub use self::traits::*;
pub use self::tracker::{
    CommandList, MAX_CONSTANT_BUFFERS, MAX_RESOURCE_VIEWS, MAX_SAMPLERS,
    MAX_UNORDERED_ACCESS_VIEWS, MAX_VERTEX_BUFFERS,
};
