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

use lumen_core::renderer::api::{
    AddressMode, BindingDimension, BlendFactor, BlendOperation, BorderColor, BufferUsage,
    ColorWriteMask, CompareFunction, CullMode, FillMode, FilterMode, IndexFormat,
    PrimitiveTopology, ResourceFormat, ReturnType, ShaderStage, ShaderStageFlags,
    StencilOpDescription, StencilOperation, TextureDimension, TextureUsage, VertexStepRate,
    ViewDimension,
};

/// Converts neutral types into their wgpu equivalents.
pub trait IntoWgpu<T> {
    /// Consumes self and converts it into a wgpu type.
    fn into_wgpu(self) -> T;
}

// --- Formats ---

/// The texture format backing `format`, `None` if wgpu has no equivalent.
pub fn texture_format(format: ResourceFormat) -> Option<wgpu::TextureFormat> {
    use wgpu::TextureFormat as T;
    let native = match format {
        ResourceFormat::R32G32B32A32Float => T::Rgba32Float,
        ResourceFormat::R32G32B32A32Uint => T::Rgba32Uint,
        ResourceFormat::R32G32B32A32Sint => T::Rgba32Sint,
        ResourceFormat::R32G32B32Float
        | ResourceFormat::R32G32B32Uint
        | ResourceFormat::R32G32B32Sint
        | ResourceFormat::B5G6R5Unorm => return None,
        ResourceFormat::R16G16B16A16Float => T::Rgba16Float,
        ResourceFormat::R16G16B16A16Unorm => T::Rgba16Unorm,
        ResourceFormat::R16G16B16A16Uint => T::Rgba16Uint,
        ResourceFormat::R16G16B16A16Snorm => T::Rgba16Snorm,
        ResourceFormat::R16G16B16A16Sint => T::Rgba16Sint,
        ResourceFormat::R32G32Float => T::Rg32Float,
        ResourceFormat::R32G32Uint => T::Rg32Uint,
        ResourceFormat::R32G32Sint => T::Rg32Sint,
        ResourceFormat::R10G10B10A2Unorm => T::Rgb10a2Unorm,
        ResourceFormat::R10G10B10A2Uint => T::Rgb10a2Uint,
        ResourceFormat::R11G11B10Float => T::Rg11b10Ufloat,
        ResourceFormat::R8G8B8A8Unorm => T::Rgba8Unorm,
        ResourceFormat::R8G8B8A8UnormSrgb => T::Rgba8UnormSrgb,
        ResourceFormat::R8G8B8A8Uint => T::Rgba8Uint,
        ResourceFormat::R8G8B8A8Snorm => T::Rgba8Snorm,
        ResourceFormat::R8G8B8A8Sint => T::Rgba8Sint,
        ResourceFormat::B8G8R8A8Unorm => T::Bgra8Unorm,
        ResourceFormat::B8G8R8A8UnormSrgb => T::Bgra8UnormSrgb,
        ResourceFormat::R16G16Float => T::Rg16Float,
        ResourceFormat::R16G16Unorm => T::Rg16Unorm,
        ResourceFormat::R16G16Uint => T::Rg16Uint,
        ResourceFormat::R16G16Snorm => T::Rg16Snorm,
        ResourceFormat::R16G16Sint => T::Rg16Sint,
        ResourceFormat::R32Float => T::R32Float,
        ResourceFormat::R32Uint => T::R32Uint,
        ResourceFormat::R32Sint => T::R32Sint,
        ResourceFormat::R8G8Unorm => T::Rg8Unorm,
        ResourceFormat::R8G8Uint => T::Rg8Uint,
        ResourceFormat::R8G8Snorm => T::Rg8Snorm,
        ResourceFormat::R8G8Sint => T::Rg8Sint,
        ResourceFormat::R16Float => T::R16Float,
        ResourceFormat::R16Unorm => T::R16Unorm,
        ResourceFormat::R16Uint => T::R16Uint,
        ResourceFormat::R16Snorm => T::R16Snorm,
        ResourceFormat::R16Sint => T::R16Sint,
        ResourceFormat::R8Unorm => T::R8Unorm,
        ResourceFormat::R8Uint => T::R8Uint,
        ResourceFormat::R8Snorm => T::R8Snorm,
        ResourceFormat::R8Sint => T::R8Sint,
        ResourceFormat::D32Float => T::Depth32Float,
        ResourceFormat::D32FloatS8X24Uint => T::Depth32FloatStencil8,
        ResourceFormat::D24UnormS8Uint => T::Depth24PlusStencil8,
        ResourceFormat::D16Unorm => T::Depth16Unorm,
        ResourceFormat::BC1Unorm => T::Bc1RgbaUnorm,
        ResourceFormat::BC1UnormSrgb => T::Bc1RgbaUnormSrgb,
        ResourceFormat::BC2Unorm => T::Bc2RgbaUnorm,
        ResourceFormat::BC2UnormSrgb => T::Bc2RgbaUnormSrgb,
        ResourceFormat::BC3Unorm => T::Bc3RgbaUnorm,
        ResourceFormat::BC3UnormSrgb => T::Bc3RgbaUnormSrgb,
        ResourceFormat::BC4Unorm => T::Bc4RUnorm,
        ResourceFormat::BC4Snorm => T::Bc4RSnorm,
        ResourceFormat::BC5Unorm => T::Bc5RgUnorm,
        ResourceFormat::BC5Snorm => T::Bc5RgSnorm,
        ResourceFormat::BC6HUf16 => T::Bc6hRgbUfloat,
        ResourceFormat::BC6HSf16 => T::Bc6hRgbFloat,
        ResourceFormat::BC7Unorm => T::Bc7RgbaUnorm,
        ResourceFormat::BC7UnormSrgb => T::Bc7RgbaUnormSrgb,
    };
    Some(native)
}

/// Maps a wgpu texture format back to its neutral format.
pub fn from_texture_format(format: wgpu::TextureFormat) -> Option<ResourceFormat> {
    ResourceFormat::ALL
        .iter()
        .copied()
        .find(|neutral| texture_format(*neutral) == Some(format))
}

/// The vertex attribute format reading `format`, `None` if wgpu cannot fetch it.
pub fn vertex_format(format: ResourceFormat) -> Option<wgpu::VertexFormat> {
    use wgpu::VertexFormat as V;
    let native = match format {
        ResourceFormat::R32G32B32A32Float => V::Float32x4,
        ResourceFormat::R32G32B32A32Uint => V::Uint32x4,
        ResourceFormat::R32G32B32A32Sint => V::Sint32x4,
        ResourceFormat::R32G32B32Float => V::Float32x3,
        ResourceFormat::R32G32B32Uint => V::Uint32x3,
        ResourceFormat::R32G32B32Sint => V::Sint32x3,
        ResourceFormat::R16G16B16A16Float => V::Float16x4,
        ResourceFormat::R16G16B16A16Unorm => V::Unorm16x4,
        ResourceFormat::R16G16B16A16Uint => V::Uint16x4,
        ResourceFormat::R16G16B16A16Snorm => V::Snorm16x4,
        ResourceFormat::R16G16B16A16Sint => V::Sint16x4,
        ResourceFormat::R32G32Float => V::Float32x2,
        ResourceFormat::R32G32Uint => V::Uint32x2,
        ResourceFormat::R32G32Sint => V::Sint32x2,
        ResourceFormat::R10G10B10A2Unorm => V::Unorm10_10_10_2,
        ResourceFormat::R8G8B8A8Unorm => V::Unorm8x4,
        ResourceFormat::R8G8B8A8Uint => V::Uint8x4,
        ResourceFormat::R8G8B8A8Snorm => V::Snorm8x4,
        ResourceFormat::R8G8B8A8Sint => V::Sint8x4,
        ResourceFormat::B8G8R8A8Unorm => V::Unorm8x4Bgra,
        ResourceFormat::R16G16Float => V::Float16x2,
        ResourceFormat::R16G16Unorm => V::Unorm16x2,
        ResourceFormat::R16G16Uint => V::Uint16x2,
        ResourceFormat::R16G16Snorm => V::Snorm16x2,
        ResourceFormat::R16G16Sint => V::Sint16x2,
        ResourceFormat::R32Float => V::Float32,
        ResourceFormat::R32Uint => V::Uint32,
        ResourceFormat::R32Sint => V::Sint32,
        ResourceFormat::R8G8Unorm => V::Unorm8x2,
        ResourceFormat::R8G8Uint => V::Uint8x2,
        ResourceFormat::R8G8Snorm => V::Snorm8x2,
        ResourceFormat::R8G8Sint => V::Sint8x2,
        ResourceFormat::R16Float => V::Float16,
        ResourceFormat::R16Unorm => V::Unorm16,
        ResourceFormat::R16Uint => V::Uint16,
        ResourceFormat::R16Snorm => V::Snorm16,
        ResourceFormat::R16Sint => V::Sint16,
        ResourceFormat::R8Unorm => V::Unorm8,
        ResourceFormat::R8Uint => V::Uint8,
        ResourceFormat::R8Snorm => V::Snorm8,
        ResourceFormat::R8Sint => V::Sint8,
        _ => return None,
    };
    Some(native)
}

// --- Pipeline state ---

impl IntoWgpu<wgpu::BlendFactor> for BlendFactor {
    fn into_wgpu(self) -> wgpu::BlendFactor {
        match self {
            BlendFactor::Zero => wgpu::BlendFactor::Zero,
            BlendFactor::One => wgpu::BlendFactor::One,
            BlendFactor::SrcColor => wgpu::BlendFactor::Src,
            BlendFactor::InvSrcColor => wgpu::BlendFactor::OneMinusSrc,
            BlendFactor::SrcAlpha => wgpu::BlendFactor::SrcAlpha,
            BlendFactor::InvSrcAlpha => wgpu::BlendFactor::OneMinusSrcAlpha,
            BlendFactor::DestAlpha => wgpu::BlendFactor::DstAlpha,
            BlendFactor::InvDestAlpha => wgpu::BlendFactor::OneMinusDstAlpha,
            BlendFactor::DestColor => wgpu::BlendFactor::Dst,
            BlendFactor::InvDestColor => wgpu::BlendFactor::OneMinusDst,
            BlendFactor::SrcAlphaSaturated => wgpu::BlendFactor::SrcAlphaSaturated,
            BlendFactor::BlendFactor => wgpu::BlendFactor::Constant,
            BlendFactor::InvBlendFactor => wgpu::BlendFactor::OneMinusConstant,
        }
    }
}

impl IntoWgpu<wgpu::BlendOperation> for BlendOperation {
    fn into_wgpu(self) -> wgpu::BlendOperation {
        match self {
            BlendOperation::Add => wgpu::BlendOperation::Add,
            BlendOperation::Subtract => wgpu::BlendOperation::Subtract,
            BlendOperation::RevSubtract => wgpu::BlendOperation::ReverseSubtract,
            BlendOperation::Min => wgpu::BlendOperation::Min,
            BlendOperation::Max => wgpu::BlendOperation::Max,
        }
    }
}

impl IntoWgpu<wgpu::ColorWrites> for ColorWriteMask {
    fn into_wgpu(self) -> wgpu::ColorWrites {
        let mut writes = wgpu::ColorWrites::empty();
        if self.contains(ColorWriteMask::RED) {
            writes |= wgpu::ColorWrites::RED;
        }
        if self.contains(ColorWriteMask::GREEN) {
            writes |= wgpu::ColorWrites::GREEN;
        }
        if self.contains(ColorWriteMask::BLUE) {
            writes |= wgpu::ColorWrites::BLUE;
        }
        if self.contains(ColorWriteMask::ALPHA) {
            writes |= wgpu::ColorWrites::ALPHA;
        }
        writes
    }
}

impl IntoWgpu<wgpu::CompareFunction> for CompareFunction {
    fn into_wgpu(self) -> wgpu::CompareFunction {
        match self {
            CompareFunction::Never => wgpu::CompareFunction::Never,
            CompareFunction::Less => wgpu::CompareFunction::Less,
            CompareFunction::Equal => wgpu::CompareFunction::Equal,
            CompareFunction::LessEqual => wgpu::CompareFunction::LessEqual,
            CompareFunction::Greater => wgpu::CompareFunction::Greater,
            CompareFunction::NotEqual => wgpu::CompareFunction::NotEqual,
            CompareFunction::GreaterEqual => wgpu::CompareFunction::GreaterEqual,
            CompareFunction::Always => wgpu::CompareFunction::Always,
        }
    }
}

impl IntoWgpu<wgpu::StencilOperation> for StencilOperation {
    fn into_wgpu(self) -> wgpu::StencilOperation {
        match self {
            StencilOperation::Keep => wgpu::StencilOperation::Keep,
            StencilOperation::Zero => wgpu::StencilOperation::Zero,
            StencilOperation::Replace => wgpu::StencilOperation::Replace,
            StencilOperation::IncrementSaturated => wgpu::StencilOperation::IncrementClamp,
            StencilOperation::DecrementSaturated => wgpu::StencilOperation::DecrementClamp,
            StencilOperation::Invert => wgpu::StencilOperation::Invert,
            StencilOperation::Increment => wgpu::StencilOperation::IncrementWrap,
            StencilOperation::Decrement => wgpu::StencilOperation::DecrementWrap,
        }
    }
}

impl IntoWgpu<wgpu::StencilFaceState> for StencilOpDescription {
    fn into_wgpu(self) -> wgpu::StencilFaceState {
        wgpu::StencilFaceState {
            compare: self.stencil_func.into_wgpu(),
            fail_op: self.fail_op.into_wgpu(),
            depth_fail_op: self.depth_fail_op.into_wgpu(),
            pass_op: self.pass_op.into_wgpu(),
        }
    }
}

impl IntoWgpu<Option<wgpu::Face>> for CullMode {
    fn into_wgpu(self) -> Option<wgpu::Face> {
        match self {
            CullMode::None => None,
            CullMode::Front => Some(wgpu::Face::Front),
            CullMode::Back => Some(wgpu::Face::Back),
        }
    }
}

impl IntoWgpu<wgpu::PolygonMode> for FillMode {
    fn into_wgpu(self) -> wgpu::PolygonMode {
        match self {
            FillMode::Solid => wgpu::PolygonMode::Fill,
            FillMode::Wireframe => wgpu::PolygonMode::Line,
        }
    }
}

impl IntoWgpu<wgpu::PrimitiveTopology> for PrimitiveTopology {
    fn into_wgpu(self) -> wgpu::PrimitiveTopology {
        match self {
            PrimitiveTopology::PointList => wgpu::PrimitiveTopology::PointList,
            PrimitiveTopology::LineList => wgpu::PrimitiveTopology::LineList,
            PrimitiveTopology::LineStrip => wgpu::PrimitiveTopology::LineStrip,
            PrimitiveTopology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
            PrimitiveTopology::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
        }
    }
}

impl IntoWgpu<wgpu::IndexFormat> for IndexFormat {
    fn into_wgpu(self) -> wgpu::IndexFormat {
        match self {
            IndexFormat::Uint16 => wgpu::IndexFormat::Uint16,
            IndexFormat::Uint32 => wgpu::IndexFormat::Uint32,
        }
    }
}

impl IntoWgpu<wgpu::VertexStepMode> for VertexStepRate {
    fn into_wgpu(self) -> wgpu::VertexStepMode {
        match self {
            VertexStepRate::Vertex => wgpu::VertexStepMode::Vertex,
            VertexStepRate::Instance => wgpu::VertexStepMode::Instance,
        }
    }
}

// --- Shaders and bindings ---

impl IntoWgpu<Option<wgpu::ShaderStages>> for ShaderStage {
    /// `None` for stages wgpu has no equivalent for.
    fn into_wgpu(self) -> Option<wgpu::ShaderStages> {
        match self {
            ShaderStage::Vertex => Some(wgpu::ShaderStages::VERTEX),
            ShaderStage::Pixel => Some(wgpu::ShaderStages::FRAGMENT),
            ShaderStage::Compute => Some(wgpu::ShaderStages::COMPUTE),
            ShaderStage::Hull | ShaderStage::Domain | ShaderStage::Geometry => None,
        }
    }
}

impl IntoWgpu<wgpu::ShaderStages> for ShaderStageFlags {
    fn into_wgpu(self) -> wgpu::ShaderStages {
        ShaderStage::ALL
            .iter()
            .filter(|stage| self.contains(stage.flag()))
            .filter_map(|stage| stage.into_wgpu())
            .fold(wgpu::ShaderStages::NONE, |acc, stage| acc | stage)
    }
}

/// The view dimension of a texture binding, `None` for buffers and shapes wgpu lacks.
pub fn binding_view_dimension(dimension: BindingDimension) -> Option<wgpu::TextureViewDimension> {
    match dimension {
        BindingDimension::Unknown | BindingDimension::Texture2D | BindingDimension::Texture2DMS => {
            Some(wgpu::TextureViewDimension::D2)
        }
        BindingDimension::Texture1D => Some(wgpu::TextureViewDimension::D1),
        BindingDimension::Texture2DArray => Some(wgpu::TextureViewDimension::D2Array),
        BindingDimension::Texture3D => Some(wgpu::TextureViewDimension::D3),
        BindingDimension::TextureCube => Some(wgpu::TextureViewDimension::Cube),
        BindingDimension::TextureCubeArray => Some(wgpu::TextureViewDimension::CubeArray),
        BindingDimension::Buffer
        | BindingDimension::StructuredBuffer
        | BindingDimension::ByteAddressBuffer
        | BindingDimension::Texture1DArray
        | BindingDimension::Texture2DMSArray => None,
    }
}

/// Sample type of a texture binding.
pub fn sample_type(return_type: ReturnType, multisampled: bool) -> wgpu::TextureSampleType {
    match return_type {
        ReturnType::Uint => wgpu::TextureSampleType::Uint,
        ReturnType::Sint => wgpu::TextureSampleType::Sint,
        ReturnType::None | ReturnType::Float | ReturnType::Unorm | ReturnType::Snorm => {
            wgpu::TextureSampleType::Float {
                filterable: !multisampled,
            }
        }
    }
}

// --- Resources ---

impl IntoWgpu<wgpu::BufferUsages> for BufferUsage {
    fn into_wgpu(self) -> wgpu::BufferUsages {
        let table = [
            (BufferUsage::COPY_SRC, wgpu::BufferUsages::COPY_SRC),
            (BufferUsage::COPY_DST, wgpu::BufferUsages::COPY_DST),
            (BufferUsage::VERTEX, wgpu::BufferUsages::VERTEX),
            (BufferUsage::INDEX, wgpu::BufferUsages::INDEX),
            (BufferUsage::CONSTANT, wgpu::BufferUsages::UNIFORM),
            (BufferUsage::SHADER_RESOURCE, wgpu::BufferUsages::STORAGE),
            (BufferUsage::UNORDERED_ACCESS, wgpu::BufferUsages::STORAGE),
            (BufferUsage::INDIRECT, wgpu::BufferUsages::INDIRECT),
        ];
        table
            .iter()
            .filter(|(neutral, _)| self.contains(*neutral))
            .fold(wgpu::BufferUsages::empty(), |acc, (_, native)| acc | *native)
    }
}

impl IntoWgpu<wgpu::TextureUsages> for TextureUsage {
    fn into_wgpu(self) -> wgpu::TextureUsages {
        let table = [
            (TextureUsage::COPY_SRC, wgpu::TextureUsages::COPY_SRC),
            (TextureUsage::COPY_DST, wgpu::TextureUsages::COPY_DST),
            (TextureUsage::SHADER_RESOURCE, wgpu::TextureUsages::TEXTURE_BINDING),
            (TextureUsage::RENDER_TARGET, wgpu::TextureUsages::RENDER_ATTACHMENT),
            (TextureUsage::DEPTH_STENCIL, wgpu::TextureUsages::RENDER_ATTACHMENT),
            (TextureUsage::UNORDERED_ACCESS, wgpu::TextureUsages::STORAGE_BINDING),
        ];
        table
            .iter()
            .filter(|(neutral, _)| self.contains(*neutral))
            .fold(wgpu::TextureUsages::empty(), |acc, (_, native)| acc | *native)
    }
}

impl IntoWgpu<wgpu::TextureDimension> for TextureDimension {
    fn into_wgpu(self) -> wgpu::TextureDimension {
        match self {
            TextureDimension::D1 => wgpu::TextureDimension::D1,
            TextureDimension::D2 => wgpu::TextureDimension::D2,
            TextureDimension::D3 => wgpu::TextureDimension::D3,
        }
    }
}

impl IntoWgpu<Option<wgpu::TextureViewDimension>> for ViewDimension {
    /// `None` for buffer views.
    fn into_wgpu(self) -> Option<wgpu::TextureViewDimension> {
        match self {
            ViewDimension::Buffer => None,
            ViewDimension::D1 => Some(wgpu::TextureViewDimension::D1),
            ViewDimension::D2 => Some(wgpu::TextureViewDimension::D2),
            ViewDimension::D2Array => Some(wgpu::TextureViewDimension::D2Array),
            ViewDimension::Cube => Some(wgpu::TextureViewDimension::Cube),
            ViewDimension::CubeArray => Some(wgpu::TextureViewDimension::CubeArray),
            ViewDimension::D3 => Some(wgpu::TextureViewDimension::D3),
        }
    }
}

impl IntoWgpu<wgpu::FilterMode> for FilterMode {
    fn into_wgpu(self) -> wgpu::FilterMode {
        match self {
            FilterMode::Nearest => wgpu::FilterMode::Nearest,
            FilterMode::Linear => wgpu::FilterMode::Linear,
        }
    }
}

impl IntoWgpu<wgpu::AddressMode> for AddressMode {
    fn into_wgpu(self) -> wgpu::AddressMode {
        match self {
            AddressMode::Repeat => wgpu::AddressMode::Repeat,
            AddressMode::Mirror => wgpu::AddressMode::MirrorRepeat,
            AddressMode::Clamp => wgpu::AddressMode::ClampToEdge,
            AddressMode::Border => wgpu::AddressMode::ClampToBorder,
        }
    }
}

impl IntoWgpu<wgpu::SamplerBorderColor> for BorderColor {
    fn into_wgpu(self) -> wgpu::SamplerBorderColor {
        match self {
            BorderColor::TransparentBlack => wgpu::SamplerBorderColor::TransparentBlack,
            BorderColor::OpaqueBlack => wgpu::SamplerBorderColor::OpaqueBlack,
            BorderColor::OpaqueWhite => wgpu::SamplerBorderColor::OpaqueWhite,
        }
    }
}
