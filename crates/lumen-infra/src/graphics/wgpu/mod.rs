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

//! Backend built on wgpu.
//!
//! Native state objects are plain wgpu descriptors, finalized when the pipeline is
//! created, since wgpu bakes every fixed-function state into the render pipeline.

mod backend;
mod command;
mod context;
pub mod conversions;

pub use self::backend::{
    WgpuBackend, WgpuBindingLayout, WgpuBlendState, WgpuDepthStencilState, WgpuInputLayout,
    WgpuRasterizerState, WgpuResource, WgpuShader, WgpuVertexBuffer, WgpuView,
};
pub use self::command::{StageSlot, WgpuBoundState, WgpuCommandList};
pub use self::context::{backend_name, WgpuContext};
