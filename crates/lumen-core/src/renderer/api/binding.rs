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

//! Shader stages, shader reflection data and the binding layouts assembled from it.

use bitflags::bitflags;

/// A programmable pipeline stage.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderStage {
    Vertex,
    Hull,
    Domain,
    Geometry,
    Pixel,
    Compute,
}

impl ShaderStage {
    /// Number of stages.
    pub const COUNT: usize = 6;

    /// Every stage, in pipeline order.
    pub const ALL: [ShaderStage; Self::COUNT] = [
        ShaderStage::Vertex,
        ShaderStage::Hull,
        ShaderStage::Domain,
        ShaderStage::Geometry,
        ShaderStage::Pixel,
        ShaderStage::Compute,
    ];

    /// The visibility flag of this stage.
    pub const fn flag(self) -> ShaderStageFlags {
        ShaderStageFlags::from_bits_truncate(1 << self as u32)
    }
}

bitflags! {
    /// Set of shader stages a binding is visible to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ShaderStageFlags: u32 {
        /// Vertex stage.
        const VERTEX = 1 << 0;
        /// Hull (tessellation control) stage.
        const HULL = 1 << 1;
        /// Domain (tessellation evaluation) stage.
        const DOMAIN = 1 << 2;
        /// Geometry stage.
        const GEOMETRY = 1 << 3;
        /// Pixel (fragment) stage.
        const PIXEL = 1 << 4;
        /// Compute stage.
        const COMPUTE = 1 << 5;
        /// Every graphics stage.
        const ALL_GRAPHICS = 0b01_1111;
    }
}

/// Kind of descriptor a binding consumes. The order defines the range order
/// inside a descriptor table.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ViewType {
    ConstantBuffer,
    ShaderResource,
    UnorderedAccess,
    Sampler,
}

/// Resource shape expected by a binding.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BindingDimension {
    #[default]
    Unknown,
    Buffer,
    StructuredBuffer,
    ByteAddressBuffer,
    Texture1D,
    Texture1DArray,
    Texture2D,
    Texture2DArray,
    Texture2DMS,
    Texture2DMSArray,
    Texture3D,
    TextureCube,
    TextureCubeArray,
}

/// Component type returned by a texture binding.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReturnType {
    #[default]
    None,
    Float,
    Unorm,
    Snorm,
    Uint,
    Sint,
}

/// One resource binding declared by a shader.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShaderResourceBinding {
    /// Declared name.
    pub name: String,
    /// Descriptor kind.
    pub view_type: ViewType,
    /// Register (or binding number).
    pub slot: u32,
    /// Register space (or descriptor set).
    pub space: u32,
    /// Array size, 1 for non-arrays.
    pub count: u32,
    /// Expected resource shape.
    pub dimension: BindingDimension,
    /// Texture component type.
    pub return_type: ReturnType,
    /// Element stride for structured buffers.
    pub structure_stride: u32,
}

impl ShaderResourceBinding {
    /// A single, non-array binding.
    pub fn new(name: impl Into<String>, view_type: ViewType, slot: u32) -> Self {
        Self {
            name: name.into(),
            view_type,
            slot,
            space: 0,
            count: 1,
            dimension: BindingDimension::Unknown,
            return_type: ReturnType::None,
            structure_stride: 0,
        }
    }

    /// Sets the expected resource shape.
    pub fn with_dimension(mut self, dimension: BindingDimension) -> Self {
        self.dimension = dimension;
        self
    }

    /// Moves the binding into another register space.
    pub fn in_space(mut self, space: u32) -> Self {
        self.space = space;
        self
    }
}

/// A shader entry point.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryPoint {
    /// Function name.
    pub name: String,
    /// Stage of the entry point.
    pub stage: ShaderStage,
    /// Ray payload size in bytes, 0 outside ray tracing.
    pub payload_size: u32,
    /// Hit attribute size in bytes, 0 outside ray tracing.
    pub attribute_size: u32,
}

/// Scalar type of a constant buffer member.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShaderScalarType {
    #[default]
    Float,
    Int,
    Uint,
    Bool,
    Struct,
}

/// A member of a constant buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConstantBufferMember {
    /// Member name.
    pub name: String,
    /// Byte offset inside the buffer.
    pub offset: u32,
    /// Byte size.
    pub size: u32,
    /// Matrix rows (1 for vectors and scalars).
    pub rows: u32,
    /// Matrix columns or vector width.
    pub columns: u32,
    /// Scalar type.
    pub element_type: ShaderScalarType,
}

/// Member layout of one constant buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConstantBufferLayout {
    /// Name of the constant buffer binding.
    pub name: String,
    /// Total byte size.
    pub size: u32,
    /// Members ordered by offset.
    pub members: Vec<ConstantBufferMember>,
}

/// Everything the shader compiler reports about one shader.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ShaderReflection {
    /// Entry points.
    pub entry_points: Vec<EntryPoint>,
    /// Resource bindings.
    pub bindings: Vec<ShaderResourceBinding>,
    /// Constant buffer layouts.
    pub constant_buffers: Vec<ConstantBufferLayout>,
}

/// A binding after merging every stage that declares it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingLayoutEntry {
    /// Descriptor kind.
    pub view_type: ViewType,
    /// Register.
    pub slot: u32,
    /// Array size.
    pub count: u32,
    /// Expected resource shape.
    pub dimension: BindingDimension,
    /// Texture component type.
    pub return_type: ReturnType,
    /// Element stride for structured buffers.
    pub structure_stride: u32,
    /// Stages that declare the binding.
    pub visibility: ShaderStageFlags,
}

/// A run of consecutive slots of one view type inside a descriptor table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DescriptorRange {
    /// Descriptor kind.
    pub view_type: ViewType,
    /// First register of the run.
    pub base_slot: u32,
    /// Descriptors in the run.
    pub count: u32,
    /// Offset of the first descriptor inside the table.
    pub offset_in_table: u32,
}

/// Whether a descriptor table holds resources or samplers.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TableKind {
    Resources,
    Samplers,
}

/// A group of descriptors bound as a unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DescriptorTable {
    /// Register space (descriptor set) of the table.
    pub space: u32,
    /// Resources or samplers.
    pub kind: TableKind,
    /// Union of the entries' visibility.
    pub visibility: ShaderStageFlags,
    /// Entries sorted by (view type, slot).
    pub entries: Vec<BindingLayoutEntry>,
    /// Contiguous ranges covering the entries.
    pub ranges: Vec<DescriptorRange>,
}

impl DescriptorTable {
    /// Total descriptors in the table.
    pub fn descriptor_count(&self) -> u32 {
        self.ranges.iter().map(|range| range.count).sum()
    }
}

/// The native binding signature of a pipeline, as a value type so structurally
/// identical layouts can share one native object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BindingLayoutDescription {
    /// Tables in root parameter order.
    pub tables: Vec<DescriptorTable>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_flags_match_stage_order() {
        assert_eq!(ShaderStage::Vertex.flag(), ShaderStageFlags::VERTEX);
        assert_eq!(ShaderStage::Pixel.flag(), ShaderStageFlags::PIXEL);
        assert_eq!(ShaderStage::Compute.flag(), ShaderStageFlags::COMPUTE);
        let graphics = ShaderStage::ALL[..5]
            .iter()
            .fold(ShaderStageFlags::empty(), |acc, stage| acc | stage.flag());
        assert_eq!(graphics, ShaderStageFlags::ALL_GRAPHICS);
    }
}
