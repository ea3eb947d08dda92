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

//! Descriptions and handles of GPU resources: buffers, textures, views, samplers,
//! shaders and queries.

use super::binding::{ShaderReflection, ShaderStage};
use super::format::{compute_subresource_layout, ResourceFormat};
use super::state::CompareFunction;
use bitflags::bitflags;
use crate::renderer::error::FormatError;
use std::borrow::Cow;

bitflags! {
    /// A set of flags describing the allowed usages of a [`BufferId`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BufferUsage: u32 {
        /// The buffer can be used as the source of a copy operation.
        const COPY_SRC = 1 << 0;
        /// The buffer can be used as the destination of a copy operation.
        const COPY_DST = 1 << 1;
        /// The buffer can be bound as a vertex buffer.
        const VERTEX = 1 << 2;
        /// The buffer can be bound as an index buffer.
        const INDEX = 1 << 3;
        /// The buffer can be bound as a constant buffer.
        const CONSTANT = 1 << 4;
        /// The buffer can be read through a resource view.
        const SHADER_RESOURCE = 1 << 5;
        /// The buffer can be written through an unordered access view.
        const UNORDERED_ACCESS = 1 << 6;
        /// The buffer can be used for indirect draw or dispatch arguments.
        const INDIRECT = 1 << 7;
    }
}

bitflags! {
    /// A set of flags describing the allowed usages of a [`TextureId`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TextureUsage: u32 {
        /// The texture can be used as the source of a copy operation.
        const COPY_SRC = 1 << 0;
        /// The texture can be used as the destination of a copy operation.
        const COPY_DST = 1 << 1;
        /// The texture can be sampled or read through a resource view.
        const SHADER_RESOURCE = 1 << 2;
        /// The texture can be a color render target.
        const RENDER_TARGET = 1 << 3;
        /// The texture can be a depth/stencil target.
        const DEPTH_STENCIL = 1 << 4;
        /// The texture can be written through an unordered access view.
        const UNORDERED_ACCESS = 1 << 5;
    }
}

/// A descriptor used to create a [`BufferId`].
#[derive(Debug, Clone)]
pub struct BufferDescription<'a> {
    /// An optional debug label for the buffer.
    pub label: Option<Cow<'a, str>>,
    /// The total size of the buffer in bytes.
    pub size: u64,
    /// How the buffer will be used.
    pub usage: BufferUsage,
    /// Element stride of a structured buffer, 0 otherwise.
    pub struct_stride: u32,
}

/// The shape of a texture.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureDimension {
    D1,
    #[default]
    D2,
    D3,
    Cube,
}

/// A descriptor used to create a [`TextureId`].
#[derive(Debug, Clone)]
pub struct TextureDescription<'a> {
    /// An optional debug label for the texture.
    pub label: Option<Cow<'a, str>>,
    /// Shape of the texture.
    pub dimension: TextureDimension,
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Depth for 3D textures, array layer count otherwise (6 per cube).
    pub depth_or_array_layers: u32,
    /// Number of mip levels.
    pub mip_levels: u32,
    /// Samples per texel.
    pub sample_count: u32,
    /// Texel format.
    pub format: ResourceFormat,
    /// How the texture will be used.
    pub usage: TextureUsage,
}

impl Default for TextureDescription<'_> {
    fn default() -> Self {
        Self {
            label: None,
            dimension: TextureDimension::D2,
            width: 1,
            height: 1,
            depth_or_array_layers: 1,
            mip_levels: 1,
            sample_count: 1,
            format: ResourceFormat::R8G8B8A8Unorm,
            usage: TextureUsage::SHADER_RESOURCE,
        }
    }
}

impl TextureDescription<'_> {
    /// Length of the full mip chain for this extent.
    pub fn max_mip_levels(&self) -> u32 {
        let depth = match self.dimension {
            TextureDimension::D3 => self.depth_or_array_layers,
            _ => 1,
        };
        let largest = self.width.max(self.height).max(depth).max(1);
        u32::BITS - largest.leading_zeros()
    }

    /// Sum of the tightly packed byte sizes of every subresource.
    /// ## Errors
    /// * `FormatError::SizeOverflow` - If the total does not fit in a `u64`.
    pub fn total_byte_size(&self) -> Result<u64, FormatError> {
        let overflow = FormatError::SizeOverflow {
            format: self.format,
            width: self.width,
            height: self.height,
        };
        let mut total = 0u64;
        for mip in 0..self.mip_levels.max(1) {
            let width = self.width.checked_shr(mip).unwrap_or(0).max(1);
            let height = self.height.checked_shr(mip).unwrap_or(0).max(1);
            let slices = match self.dimension {
                TextureDimension::D3 => self.depth_or_array_layers.checked_shr(mip).unwrap_or(0),
                _ => self.depth_or_array_layers,
            }
            .max(1);
            let layout = compute_subresource_layout(width, height, self.format, 1)?;
            total = layout
                .num_bytes
                .checked_mul(slices as u64)
                .and_then(|bytes| total.checked_add(bytes))
                .ok_or_else(|| overflow.clone())?;
        }
        total
            .checked_mul(self.sample_count.max(1) as u64)
            .ok_or(overflow)
    }
}

/// How a view interprets its resource.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewDimension {
    Buffer,
    D1,
    #[default]
    D2,
    D2Array,
    Cube,
    CubeArray,
    D3,
}

/// A descriptor used to create a shader-read view ([`ResourceViewId`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ResourceViewDescription {
    /// Reinterpretation format, `None` keeps the resource's format.
    pub format: Option<ResourceFormat>,
    /// View shape.
    pub dimension: ViewDimension,
    /// First visible mip level.
    pub base_mip: u32,
    /// Visible mip count, `None` for all remaining.
    pub mip_count: Option<u32>,
    /// First visible array layer, or first element for buffers.
    pub base_layer: u32,
    /// Visible layer count (element count for buffers), `None` for all remaining.
    pub layer_count: Option<u32>,
}

/// A descriptor used to create a writable view ([`UnorderedAccessViewId`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct UnorderedAccessViewDescription {
    /// Reinterpretation format, `None` keeps the resource's format.
    pub format: Option<ResourceFormat>,
    /// View shape.
    pub dimension: ViewDimension,
    /// Mip level written by the view.
    pub mip: u32,
    /// First visible array layer, or first element for buffers.
    pub base_layer: u32,
    /// Visible layer count, `None` for all remaining.
    pub layer_count: Option<u32>,
}

/// Texel filtering.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterMode {
    Nearest,
    #[default]
    Linear,
}

/// Behavior of texture coordinates outside `[0, 1]`.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AddressMode {
    #[default]
    Repeat,
    Mirror,
    Clamp,
    Border,
}

/// Color used by [`AddressMode::Border`].
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BorderColor {
    #[default]
    TransparentBlack,
    OpaqueBlack,
    OpaqueWhite,
}

/// A descriptor used to create a [`SamplerId`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerDescription {
    /// Minification filter.
    pub min_filter: FilterMode,
    /// Magnification filter.
    pub mag_filter: FilterMode,
    /// Filter between mip levels.
    pub mip_filter: FilterMode,
    /// Addressing along U.
    pub address_u: AddressMode,
    /// Addressing along V.
    pub address_v: AddressMode,
    /// Addressing along W.
    pub address_w: AddressMode,
    /// Bias added to the computed mip level.
    pub mip_lod_bias: f32,
    /// Lowest accessible mip level.
    pub min_lod: f32,
    /// Highest accessible mip level.
    pub max_lod: f32,
    /// Anisotropy clamp, 1 disables anisotropic filtering.
    pub max_anisotropy: u16,
    /// Comparison for shadow samplers.
    pub compare: Option<CompareFunction>,
    /// Border color for [`AddressMode::Border`].
    pub border_color: BorderColor,
}

impl Default for SamplerDescription {
    fn default() -> Self {
        Self {
            min_filter: FilterMode::Linear,
            mag_filter: FilterMode::Linear,
            mip_filter: FilterMode::Linear,
            address_u: AddressMode::Repeat,
            address_v: AddressMode::Repeat,
            address_w: AddressMode::Repeat,
            mip_lod_bias: 0.0,
            min_lod: 0.0,
            max_lod: 32.0,
            max_anisotropy: 1,
            compare: None,
            border_color: BorderColor::TransparentBlack,
        }
    }
}

/// A compiled shader handed over by the shader compiler.
#[derive(Debug, Clone)]
pub struct ShaderDescription<'a> {
    /// An optional debug label for the shader.
    pub label: Option<Cow<'a, str>>,
    /// Pipeline stage the bytecode targets.
    pub stage: ShaderStage,
    /// Opaque bytecode (WGSL text for the wgpu backend).
    pub bytecode: Cow<'a, [u8]>,
    /// Entry point name.
    pub entry_point: Cow<'a, str>,
    /// Reflection data produced alongside the bytecode.
    pub reflection: ShaderReflection,
}

/// Kind of GPU query.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryType {
    Timestamp,
    Occlusion,
}

/// An opaque handle to a GPU buffer resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub usize);

/// An opaque handle to a GPU texture resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub usize);

/// An opaque handle to a shader-read view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceViewId(pub usize);

/// An opaque handle to an unordered access view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnorderedAccessViewId(pub usize);

/// An opaque handle to a sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplerId(pub usize);

/// An opaque handle to a shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderId(pub usize);

/// An opaque handle to a graphics pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineId(pub usize);

/// A query slot: its kind plus the index inside the query pool of that kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryId {
    /// Kind of query.
    pub kind: QueryType,
    /// Index inside the pool.
    pub index: u32,
}

/// The underlying resource of a view.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceRef {
    Buffer(BufferId),
    Texture(TextureId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_byte_size_sums_mips() {
        let desc = TextureDescription {
            width: 4,
            height: 4,
            mip_levels: 3,
            format: ResourceFormat::R8G8B8A8Unorm,
            ..Default::default()
        };
        // 4x4 + 2x2 + 1x1 texels.
        assert_eq!(desc.total_byte_size(), Ok((16 + 4 + 1) * 4));
    }

    #[test]
    fn test_mip_chain_length_follows_largest_extent() {
        let square = TextureDescription {
            width: 4,
            height: 4,
            ..Default::default()
        };
        assert_eq!(square.max_mip_levels(), 3);

        let wide = TextureDescription {
            width: 1024,
            height: 1,
            ..Default::default()
        };
        assert_eq!(wide.max_mip_levels(), 11);

        let volume = TextureDescription {
            dimension: TextureDimension::D3,
            width: 2,
            height: 2,
            depth_or_array_layers: 64,
            ..Default::default()
        };
        assert_eq!(volume.max_mip_levels(), 7);
    }

    #[test]
    fn test_total_byte_size_survives_absurd_mip_counts() {
        let desc = TextureDescription {
            width: 4,
            height: 4,
            mip_levels: 40,
            format: ResourceFormat::R8Unorm,
            ..Default::default()
        };
        // 16 + 4 + 1 texels, then 37 more 1x1 levels.
        assert_eq!(desc.total_byte_size(), Ok(21 + 37));
    }

    #[test]
    fn test_total_byte_size_reports_overflow() {
        let desc = TextureDescription {
            width: 1 << 16,
            height: 1 << 16,
            depth_or_array_layers: u32::MAX,
            format: ResourceFormat::R32G32B32A32Float,
            ..Default::default()
        };
        assert!(matches!(
            desc.total_byte_size(),
            Err(FormatError::SizeOverflow { .. })
        ));
    }

    #[test]
    fn test_total_byte_size_compressed_array() {
        let desc = TextureDescription {
            width: 8,
            height: 8,
            depth_or_array_layers: 2,
            mip_levels: 2,
            format: ResourceFormat::BC1Unorm,
            ..Default::default()
        };
        // Mip 0: 2x2 blocks, mip 1: 1x1 block, 8 bytes each, two layers.
        assert_eq!(desc.total_byte_size(), Ok((4 + 1) * 8 * 2));
    }

    #[test]
    fn test_total_byte_size_volume_shrinks_depth() {
        let desc = TextureDescription {
            dimension: TextureDimension::D3,
            width: 2,
            height: 2,
            depth_or_array_layers: 4,
            mip_levels: 2,
            format: ResourceFormat::R8Unorm,
            ..Default::default()
        };
        assert_eq!(desc.total_byte_size(), Ok(2 * 2 * 4 + 1 * 1 * 2));
    }
}
