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

use ash::vk;
use lumen_core::renderer::api::ResourceFormat;

/// Converts neutral types into their Vulkan equivalents.
pub trait IntoVk<T> {
    /// Consumes self and converts it into a Vulkan type.
    fn into_vk(self) -> T;
}

impl IntoVk<vk::Format> for ResourceFormat {
    fn into_vk(self) -> vk::Format {
        match self {
            ResourceFormat::R32G32B32A32Float => vk::Format::R32G32B32A32_SFLOAT,
            ResourceFormat::R32G32B32A32Uint => vk::Format::R32G32B32A32_UINT,
            ResourceFormat::R32G32B32A32Sint => vk::Format::R32G32B32A32_SINT,
            ResourceFormat::R32G32B32Float => vk::Format::R32G32B32_SFLOAT,
            ResourceFormat::R32G32B32Uint => vk::Format::R32G32B32_UINT,
            ResourceFormat::R32G32B32Sint => vk::Format::R32G32B32_SINT,
            ResourceFormat::R16G16B16A16Float => vk::Format::R16G16B16A16_SFLOAT,
            ResourceFormat::R16G16B16A16Unorm => vk::Format::R16G16B16A16_UNORM,
            ResourceFormat::R16G16B16A16Uint => vk::Format::R16G16B16A16_UINT,
            ResourceFormat::R16G16B16A16Snorm => vk::Format::R16G16B16A16_SNORM,
            ResourceFormat::R16G16B16A16Sint => vk::Format::R16G16B16A16_SINT,
            ResourceFormat::R32G32Float => vk::Format::R32G32_SFLOAT,
            ResourceFormat::R32G32Uint => vk::Format::R32G32_UINT,
            ResourceFormat::R32G32Sint => vk::Format::R32G32_SINT,
            // Vulkan names packed formats from the most significant bit.
            ResourceFormat::R10G10B10A2Unorm => vk::Format::A2B10G10R10_UNORM_PACK32,
            ResourceFormat::R10G10B10A2Uint => vk::Format::A2B10G10R10_UINT_PACK32,
            ResourceFormat::R11G11B10Float => vk::Format::B10G11R11_UFLOAT_PACK32,
            ResourceFormat::R8G8B8A8Unorm => vk::Format::R8G8B8A8_UNORM,
            ResourceFormat::R8G8B8A8UnormSrgb => vk::Format::R8G8B8A8_SRGB,
            ResourceFormat::R8G8B8A8Uint => vk::Format::R8G8B8A8_UINT,
            ResourceFormat::R8G8B8A8Snorm => vk::Format::R8G8B8A8_SNORM,
            ResourceFormat::R8G8B8A8Sint => vk::Format::R8G8B8A8_SINT,
            ResourceFormat::B8G8R8A8Unorm => vk::Format::B8G8R8A8_UNORM,
            ResourceFormat::B8G8R8A8UnormSrgb => vk::Format::B8G8R8A8_SRGB,
            ResourceFormat::R16G16Float => vk::Format::R16G16_SFLOAT,
            ResourceFormat::R16G16Unorm => vk::Format::R16G16_UNORM,
            ResourceFormat::R16G16Uint => vk::Format::R16G16_UINT,
            ResourceFormat::R16G16Snorm => vk::Format::R16G16_SNORM,
            ResourceFormat::R16G16Sint => vk::Format::R16G16_SINT,
            ResourceFormat::R32Float => vk::Format::R32_SFLOAT,
            ResourceFormat::R32Uint => vk::Format::R32_UINT,
            ResourceFormat::R32Sint => vk::Format::R32_SINT,
            ResourceFormat::R8G8Unorm => vk::Format::R8G8_UNORM,
            ResourceFormat::R8G8Uint => vk::Format::R8G8_UINT,
            ResourceFormat::R8G8Snorm => vk::Format::R8G8_SNORM,
            ResourceFormat::R8G8Sint => vk::Format::R8G8_SINT,
            ResourceFormat::R16Float => vk::Format::R16_SFLOAT,
            ResourceFormat::R16Unorm => vk::Format::R16_UNORM,
            ResourceFormat::R16Uint => vk::Format::R16_UINT,
            ResourceFormat::R16Snorm => vk::Format::R16_SNORM,
            ResourceFormat::R16Sint => vk::Format::R16_SINT,
            ResourceFormat::R8Unorm => vk::Format::R8_UNORM,
            ResourceFormat::R8Uint => vk::Format::R8_UINT,
            ResourceFormat::R8Snorm => vk::Format::R8_SNORM,
            ResourceFormat::R8Sint => vk::Format::R8_SINT,
            ResourceFormat::B5G6R5Unorm => vk::Format::R5G6B5_UNORM_PACK16,
            ResourceFormat::D32Float => vk::Format::D32_SFLOAT,
            ResourceFormat::D32FloatS8X24Uint => vk::Format::D32_SFLOAT_S8_UINT,
            ResourceFormat::D24UnormS8Uint => vk::Format::D24_UNORM_S8_UINT,
            ResourceFormat::D16Unorm => vk::Format::D16_UNORM,
            ResourceFormat::BC1Unorm => vk::Format::BC1_RGBA_UNORM_BLOCK,
            ResourceFormat::BC1UnormSrgb => vk::Format::BC1_RGBA_SRGB_BLOCK,
            ResourceFormat::BC2Unorm => vk::Format::BC2_UNORM_BLOCK,
            ResourceFormat::BC2UnormSrgb => vk::Format::BC2_SRGB_BLOCK,
            ResourceFormat::BC3Unorm => vk::Format::BC3_UNORM_BLOCK,
            ResourceFormat::BC3UnormSrgb => vk::Format::BC3_SRGB_BLOCK,
            ResourceFormat::BC4Unorm => vk::Format::BC4_UNORM_BLOCK,
            ResourceFormat::BC4Snorm => vk::Format::BC4_SNORM_BLOCK,
            ResourceFormat::BC5Unorm => vk::Format::BC5_UNORM_BLOCK,
            ResourceFormat::BC5Snorm => vk::Format::BC5_SNORM_BLOCK,
            ResourceFormat::BC6HUf16 => vk::Format::BC6H_UFLOAT_BLOCK,
            ResourceFormat::BC6HSf16 => vk::Format::BC6H_SFLOAT_BLOCK,
            ResourceFormat::BC7Unorm => vk::Format::BC7_UNORM_BLOCK,
            ResourceFormat::BC7UnormSrgb => vk::Format::BC7_SRGB_BLOCK,
        }
    }
}

/// Maps a Vulkan format back to its neutral format.
///
/// Returns `None` for formats the engine does not expose, including `UNDEFINED`.
pub fn from_vk_format(format: vk::Format) -> Option<ResourceFormat> {
    ResourceFormat::ALL
        .iter()
        .copied()
        .find(|neutral| neutral.into_vk() == format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_format_round_trips() {
        for format in ResourceFormat::ALL {
            let native = format.into_vk();
            assert_ne!(native, vk::Format::UNDEFINED, "{format:?}");
            assert_eq!(from_vk_format(native), Some(format));
        }
    }

    #[test]
    fn test_packed_formats_use_vulkan_bit_order() {
        assert_eq!(
            ResourceFormat::R10G10B10A2Unorm.into_vk(),
            vk::Format::A2B10G10R10_UNORM_PACK32
        );
        assert_eq!(
            ResourceFormat::B5G6R5Unorm.into_vk(),
            vk::Format::R5G6B5_UNORM_PACK16
        );
    }

    #[test]
    fn test_unexposed_formats_map_to_none() {
        assert_eq!(from_vk_format(vk::Format::UNDEFINED), None);
        assert_eq!(from_vk_format(vk::Format::ASTC_4X4_UNORM_BLOCK), None);
        assert_eq!(from_vk_format(vk::Format::R8G8B8_UNORM), None);
    }
}
