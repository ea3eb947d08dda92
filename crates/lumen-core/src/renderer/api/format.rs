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

//! The neutral resource format enumeration and its metadata table.
//!
//! Metadata is computed by an exhaustive `const fn` match, so every format has an
//! entry by construction and the table needs no lazy initialization.

use crate::renderer::error::FormatError;

/// Texel extent of one compressed block (1x1x1 for linear formats).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockExtent {
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Depth in texels.
    pub depth: u32,
}

impl BlockExtent {
    /// The extent of a linear (non-compressed) format.
    pub const TEXEL: Self = Self {
        width: 1,
        height: 1,
        depth: 1,
    };
    /// The extent of every BC format.
    pub const BC: Self = Self {
        width: 4,
        height: 4,
        depth: 1,
    };
}

/// Static metadata describing a [`ResourceFormat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatInfo {
    /// Byte size of one element: a texel for linear formats, a block for compressed ones.
    pub element_bytes: u32,
    /// Number of color or depth/stencil channels.
    pub channels: u8,
    /// `true` for BC formats.
    pub block_compressed: bool,
    /// Texels covered by one element.
    pub block_extent: BlockExtent,
    /// `true` if the format carries a depth channel.
    pub depth: bool,
    /// `true` if the format carries a stencil channel.
    pub stencil: bool,
    /// `true` if the color channels are normalized unsigned integers.
    pub unorm: bool,
    /// `true` if the color channels are sRGB encoded.
    pub srgb: bool,
}

impl FormatInfo {
    const fn linear(element_bytes: u32, channels: u8) -> Self {
        Self {
            element_bytes,
            channels,
            block_compressed: false,
            block_extent: BlockExtent::TEXEL,
            depth: false,
            stencil: false,
            unorm: false,
            srgb: false,
        }
    }

    const fn block(element_bytes: u32, channels: u8) -> Self {
        Self {
            block_compressed: true,
            block_extent: BlockExtent::BC,
            ..Self::linear(element_bytes, channels)
        }
    }

    const fn depth(element_bytes: u32, stencil: bool) -> Self {
        Self {
            depth: true,
            stencil,
            channels: if stencil { 2 } else { 1 },
            ..Self::linear(element_bytes, 1)
        }
    }

    const fn unorm(mut self) -> Self {
        self.unorm = true;
        self
    }

    const fn srgb(mut self) -> Self {
        self.unorm = true;
        self.srgb = true;
        self
    }
}

/// A backend-neutral pixel or vertex-attribute format.
///
/// The enumeration is closed: native formats the engine does not model translate
/// to `None` instead of an "unknown" variant.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceFormat {
    R32G32B32A32Float,
    R32G32B32A32Uint,
    R32G32B32A32Sint,
    R32G32B32Float,
    R32G32B32Uint,
    R32G32B32Sint,
    R16G16B16A16Float,
    R16G16B16A16Unorm,
    R16G16B16A16Uint,
    R16G16B16A16Snorm,
    R16G16B16A16Sint,
    R32G32Float,
    R32G32Uint,
    R32G32Sint,
    R10G10B10A2Unorm,
    R10G10B10A2Uint,
    R11G11B10Float,
    R8G8B8A8Unorm,
    R8G8B8A8UnormSrgb,
    R8G8B8A8Uint,
    R8G8B8A8Snorm,
    R8G8B8A8Sint,
    B8G8R8A8Unorm,
    B8G8R8A8UnormSrgb,
    R16G16Float,
    R16G16Unorm,
    R16G16Uint,
    R16G16Snorm,
    R16G16Sint,
    R32Float,
    R32Uint,
    R32Sint,
    R8G8Unorm,
    R8G8Uint,
    R8G8Snorm,
    R8G8Sint,
    R16Float,
    R16Unorm,
    R16Uint,
    R16Snorm,
    R16Sint,
    R8Unorm,
    R8Uint,
    R8Snorm,
    R8Sint,
    B5G6R5Unorm,
    D32Float,
    D32FloatS8X24Uint,
    D24UnormS8Uint,
    D16Unorm,
    BC1Unorm,
    BC1UnormSrgb,
    BC2Unorm,
    BC2UnormSrgb,
    BC3Unorm,
    BC3UnormSrgb,
    BC4Unorm,
    BC4Snorm,
    BC5Unorm,
    BC5Snorm,
    BC6HUf16,
    BC6HSf16,
    BC7Unorm,
    BC7UnormSrgb,
}

impl ResourceFormat {
    /// Every format, in declaration order.
    pub const ALL: [ResourceFormat; 64] = {
        use ResourceFormat::*;
        [
            R32G32B32A32Float,
            R32G32B32A32Uint,
            R32G32B32A32Sint,
            R32G32B32Float,
            R32G32B32Uint,
            R32G32B32Sint,
            R16G16B16A16Float,
            R16G16B16A16Unorm,
            R16G16B16A16Uint,
            R16G16B16A16Snorm,
            R16G16B16A16Sint,
            R32G32Float,
            R32G32Uint,
            R32G32Sint,
            R10G10B10A2Unorm,
            R10G10B10A2Uint,
            R11G11B10Float,
            R8G8B8A8Unorm,
            R8G8B8A8UnormSrgb,
            R8G8B8A8Uint,
            R8G8B8A8Snorm,
            R8G8B8A8Sint,
            B8G8R8A8Unorm,
            B8G8R8A8UnormSrgb,
            R16G16Float,
            R16G16Unorm,
            R16G16Uint,
            R16G16Snorm,
            R16G16Sint,
            R32Float,
            R32Uint,
            R32Sint,
            R8G8Unorm,
            R8G8Uint,
            R8G8Snorm,
            R8G8Sint,
            R16Float,
            R16Unorm,
            R16Uint,
            R16Snorm,
            R16Sint,
            R8Unorm,
            R8Uint,
            R8Snorm,
            R8Sint,
            B5G6R5Unorm,
            D32Float,
            D32FloatS8X24Uint,
            D24UnormS8Uint,
            D16Unorm,
            BC1Unorm,
            BC1UnormSrgb,
            BC2Unorm,
            BC2UnormSrgb,
            BC3Unorm,
            BC3UnormSrgb,
            BC4Unorm,
            BC4Snorm,
            BC5Unorm,
            BC5Snorm,
            BC6HUf16,
            BC6HSf16,
            BC7Unorm,
            BC7UnormSrgb,
        ]
    };

    /// Returns the metadata entry of this format.
    pub const fn info(self) -> FormatInfo {
        use ResourceFormat::*;
        match self {
            R32G32B32A32Float | R32G32B32A32Uint | R32G32B32A32Sint => FormatInfo::linear(16, 4),
            R32G32B32Float | R32G32B32Uint | R32G32B32Sint => FormatInfo::linear(12, 3),
            R16G16B16A16Unorm => FormatInfo::linear(8, 4).unorm(),
            R16G16B16A16Float | R16G16B16A16Uint | R16G16B16A16Snorm | R16G16B16A16Sint => {
                FormatInfo::linear(8, 4)
            }
            R32G32Float | R32G32Uint | R32G32Sint => FormatInfo::linear(8, 2),
            R10G10B10A2Unorm => FormatInfo::linear(4, 4).unorm(),
            R10G10B10A2Uint => FormatInfo::linear(4, 4),
            R11G11B10Float => FormatInfo::linear(4, 3),
            R8G8B8A8Unorm | B8G8R8A8Unorm => FormatInfo::linear(4, 4).unorm(),
            R8G8B8A8UnormSrgb | B8G8R8A8UnormSrgb => FormatInfo::linear(4, 4).srgb(),
            R8G8B8A8Uint | R8G8B8A8Snorm | R8G8B8A8Sint => FormatInfo::linear(4, 4),
            R16G16Unorm => FormatInfo::linear(4, 2).unorm(),
            R16G16Float | R16G16Uint | R16G16Snorm | R16G16Sint => FormatInfo::linear(4, 2),
            R32Float | R32Uint | R32Sint => FormatInfo::linear(4, 1),
            R8G8Unorm => FormatInfo::linear(2, 2).unorm(),
            R8G8Uint | R8G8Snorm | R8G8Sint => FormatInfo::linear(2, 2),
            R16Unorm => FormatInfo::linear(2, 1).unorm(),
            R16Float | R16Uint | R16Snorm | R16Sint => FormatInfo::linear(2, 1),
            R8Unorm => FormatInfo::linear(1, 1).unorm(),
            R8Uint | R8Snorm | R8Sint => FormatInfo::linear(1, 1),
            B5G6R5Unorm => FormatInfo::linear(2, 3).unorm(),
            D32Float => FormatInfo::depth(4, false),
            D32FloatS8X24Uint => FormatInfo::depth(8, true),
            D24UnormS8Uint => FormatInfo::depth(4, true).unorm(),
            D16Unorm => FormatInfo::depth(2, false).unorm(),
            BC1Unorm => FormatInfo::block(8, 4).unorm(),
            BC1UnormSrgb => FormatInfo::block(8, 4).srgb(),
            BC2Unorm => FormatInfo::block(16, 4).unorm(),
            BC2UnormSrgb => FormatInfo::block(16, 4).srgb(),
            BC3Unorm => FormatInfo::block(16, 4).unorm(),
            BC3UnormSrgb => FormatInfo::block(16, 4).srgb(),
            BC4Unorm => FormatInfo::block(8, 1).unorm(),
            BC4Snorm => FormatInfo::block(8, 1),
            BC5Unorm => FormatInfo::block(16, 2).unorm(),
            BC5Snorm => FormatInfo::block(16, 2),
            BC6HUf16 | BC6HSf16 => FormatInfo::block(16, 3),
            BC7Unorm => FormatInfo::block(16, 4).unorm(),
            BC7UnormSrgb => FormatInfo::block(16, 4).srgb(),
        }
    }

    /// Byte size of one element (one texel, or one block for compressed formats).
    pub const fn stride(self) -> u32 {
        self.info().element_bytes
    }

    /// Number of channels.
    pub const fn channel_count(self) -> u8 {
        self.info().channels
    }

    /// Returns `true` for block-compressed formats.
    pub const fn is_compressed(self) -> bool {
        self.info().block_compressed
    }

    /// Returns `true` if the format carries a depth channel.
    pub const fn is_depth(self) -> bool {
        self.info().depth
    }

    /// Returns `true` if the format carries a stencil channel.
    pub const fn has_stencil(self) -> bool {
        self.info().stencil
    }

    /// Returns `true` if the color (or depth) channels are normalized unsigned integers.
    pub const fn is_unorm(self) -> bool {
        self.info().unorm
    }

    /// Returns `true` if the format is sRGB encoded.
    pub const fn is_srgb(self) -> bool {
        self.info().srgb
    }

    /// Returns `true` if the format can be bound as a color render target.
    pub const fn is_color_renderable(self) -> bool {
        let info = self.info();
        !info.block_compressed && !info.depth
    }

    /// Byte size of one compressed block.
    pub fn block_size(self) -> Result<u32, FormatError> {
        let info = self.info();
        if !info.block_compressed {
            return Err(FormatError::NotBlockCompressed(self));
        }
        Ok(info.element_bytes)
    }

    /// Texel extent of one compressed block.
    pub fn block_extent(self) -> Result<BlockExtent, FormatError> {
        let info = self.info();
        if !info.block_compressed {
            return Err(FormatError::NotBlockCompressed(self));
        }
        Ok(info.block_extent)
    }

    /// The sRGB counterpart of a linear format, if one exists.
    pub const fn srgb_equivalent(self) -> Option<ResourceFormat> {
        use ResourceFormat::*;
        match self {
            R8G8B8A8Unorm => Some(R8G8B8A8UnormSrgb),
            B8G8R8A8Unorm => Some(B8G8R8A8UnormSrgb),
            BC1Unorm => Some(BC1UnormSrgb),
            BC2Unorm => Some(BC2UnormSrgb),
            BC3Unorm => Some(BC3UnormSrgb),
            BC7Unorm => Some(BC7UnormSrgb),
            _ => None,
        }
    }

    /// The linear counterpart of an sRGB format, if one exists.
    pub const fn linear_equivalent(self) -> Option<ResourceFormat> {
        use ResourceFormat::*;
        match self {
            R8G8B8A8UnormSrgb => Some(R8G8B8A8Unorm),
            B8G8R8A8UnormSrgb => Some(B8G8R8A8Unorm),
            BC1UnormSrgb => Some(BC1Unorm),
            BC2UnormSrgb => Some(BC2Unorm),
            BC3UnormSrgb => Some(BC3Unorm),
            BC7UnormSrgb => Some(BC7Unorm),
            _ => None,
        }
    }
}

/// Byte layout of one 2D subresource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubresourceLayout {
    /// Total bytes (`row_bytes * num_rows`).
    pub num_bytes: u64,
    /// Bytes per row of texels (or row of blocks), aligned.
    pub row_bytes: u32,
    /// Number of rows of texels (or rows of blocks).
    pub num_rows: u32,
}

/// Rounds `value` up to a multiple of `alignment`, which must be a power of two.
/// Returns `None` if the result does not fit in a `u32`.
#[inline]
pub const fn align_up(value: u32, alignment: u32) -> Option<u32> {
    match value.checked_add(alignment - 1) {
        Some(padded) => Some(padded & !(alignment - 1)),
        None => None,
    }
}

/// Computes the row pitch and row count of a `width` x `height` subresource.
///
/// Compressed formats count rows of blocks. `alignment` applies to the row pitch
/// and must be a non-zero power of two.
/// ## Errors
/// * `FormatError::InvalidAlignment` - If `alignment` is not a power of two.
/// * `FormatError::SizeOverflow` - If the row pitch does not fit in a `u32`.
pub fn compute_subresource_layout(
    width: u32,
    height: u32,
    format: ResourceFormat,
    alignment: u32,
) -> Result<SubresourceLayout, FormatError> {
    if alignment == 0 || !alignment.is_power_of_two() {
        return Err(FormatError::InvalidAlignment(alignment));
    }

    let info = format.info();
    let (unaligned, num_rows) = if info.block_compressed {
        let blocks_wide = width.div_ceil(info.block_extent.width);
        let blocks_high = height.div_ceil(info.block_extent.height);
        (info.element_bytes.checked_mul(blocks_wide), blocks_high)
    } else {
        (width.checked_mul(info.element_bytes), height)
    };
    let row_bytes = unaligned
        .and_then(|bytes| align_up(bytes, alignment))
        .ok_or(FormatError::SizeOverflow {
            format,
            width,
            height,
        })?;

    Ok(SubresourceLayout {
        num_bytes: row_bytes as u64 * num_rows as u64,
        row_bytes,
        num_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bc1_subresource_layout() {
        let layout = compute_subresource_layout(18, 10, ResourceFormat::BC1Unorm, 1).unwrap();
        assert_eq!(layout.row_bytes, 40);
        assert_eq!(layout.num_rows, 3);
        assert_eq!(layout.num_bytes, 120);
    }

    #[test]
    fn test_linear_subresource_layout_is_aligned() {
        let layout =
            compute_subresource_layout(100, 7, ResourceFormat::R8G8B8A8Unorm, 256).unwrap();
        assert_eq!(layout.row_bytes, 512);
        assert_eq!(layout.num_rows, 7);
        assert_eq!(layout.num_bytes, 512 * 7);

        let unaligned = compute_subresource_layout(3, 2, ResourceFormat::R16Float, 1).unwrap();
        assert_eq!(unaligned.row_bytes, 6);
        assert_eq!(unaligned.num_bytes, 12);
    }

    #[test]
    fn test_invalid_alignment_is_rejected() {
        for alignment in [0, 3, 12, 255] {
            assert_eq!(
                compute_subresource_layout(4, 4, ResourceFormat::R8Unorm, alignment),
                Err(FormatError::InvalidAlignment(alignment))
            );
        }
    }

    #[test]
    fn test_oversized_rows_are_reported() {
        assert_eq!(
            compute_subresource_layout(1 << 30, 1, ResourceFormat::R32G32B32A32Float, 1),
            Err(FormatError::SizeOverflow {
                format: ResourceFormat::R32G32B32A32Float,
                width: 1 << 30,
                height: 1,
            })
        );
        // Fits before alignment, overflows after.
        assert!(compute_subresource_layout(u32::MAX, 1, ResourceFormat::R8Unorm, 256).is_err());
        assert_eq!(align_up(u32::MAX - 3, 4), Some(u32::MAX - 3));
        assert_eq!(align_up(u32::MAX - 2, 4), None);

        let widest = compute_subresource_layout(u32::MAX, u32::MAX, ResourceFormat::R8Unorm, 1)
            .unwrap();
        assert_eq!(widest.num_bytes, u32::MAX as u64 * u32::MAX as u64);
    }

    #[test]
    fn test_block_queries_require_compressed_format() {
        assert_eq!(ResourceFormat::BC7UnormSrgb.block_size(), Ok(16));
        assert_eq!(ResourceFormat::BC4Snorm.block_extent(), Ok(BlockExtent::BC));
        assert_eq!(
            ResourceFormat::R32Float.block_size(),
            Err(FormatError::NotBlockCompressed(ResourceFormat::R32Float))
        );
        assert!(ResourceFormat::D24UnormS8Uint.block_extent().is_err());
    }

    #[test]
    fn test_metadata_table_is_consistent() {
        for format in ResourceFormat::ALL {
            let info = format.info();
            assert!(info.element_bytes > 0, "{format:?} has no stride");
            assert!(info.channels > 0, "{format:?} has no channels");
            if info.block_compressed {
                assert_eq!(info.block_extent, BlockExtent::BC);
                assert!(matches!(info.element_bytes, 8 | 16));
            } else {
                assert_eq!(info.block_extent, BlockExtent::TEXEL);
            }
            if info.stencil {
                assert!(info.depth, "{format:?} has stencil without depth");
            }
            if info.srgb {
                assert_eq!(format.linear_equivalent().and_then(|f| f.srgb_equivalent()), Some(format));
            }
        }
    }

    #[test]
    fn test_all_is_sorted_and_unique() {
        let mut sorted = ResourceFormat::ALL.to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.as_slice(), &ResourceFormat::ALL[..]);
    }

    #[test]
    fn test_predicates() {
        assert!(ResourceFormat::D24UnormS8Uint.has_stencil());
        assert!(!ResourceFormat::D32Float.has_stencil());
        assert!(ResourceFormat::R8G8B8A8UnormSrgb.is_srgb());
        assert!(ResourceFormat::R8Unorm.is_unorm());
        assert!(!ResourceFormat::R8Snorm.is_unorm());
        assert!(ResourceFormat::R16G16B16A16Float.is_color_renderable());
        assert!(!ResourceFormat::BC3Unorm.is_color_renderable());
        assert!(!ResourceFormat::D16Unorm.is_color_renderable());
    }
}
