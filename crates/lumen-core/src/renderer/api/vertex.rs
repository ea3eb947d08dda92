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

//! Vertex input descriptions and their resolution into semantic-indexed elements.

use super::format::ResourceFormat;
use crate::renderer::error::ValidationError;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// The role of a vertex attribute.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VertexSemantic {
    Position,
    Normal,
    Tangent,
    BiTangent,
    Color,
    TexCoord,
    BoneIndices,
    BoneWeights,
}

impl VertexSemantic {
    /// Number of semantics.
    pub const COUNT: usize = 8;

    /// The standard semantic name shaders declare for this role.
    pub const fn name(self) -> &'static str {
        match self {
            VertexSemantic::Position => "POSITION",
            VertexSemantic::Normal => "NORMAL",
            VertexSemantic::Tangent => "TANGENT",
            VertexSemantic::BiTangent => "BINORMAL",
            VertexSemantic::Color => "COLOR",
            VertexSemantic::TexCoord => "TEXCOORD",
            VertexSemantic::BoneIndices => "BLENDINDICES",
            VertexSemantic::BoneWeights => "BLENDWEIGHT",
        }
    }
}

/// A semantic name that does not correspond to any [`VertexSemantic`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSemanticError(pub String);

impl fmt::Display for UnknownSemanticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown vertex semantic '{}'", self.0)
    }
}

impl std::error::Error for UnknownSemanticError {}

impl FromStr for VertexSemantic {
    type Err = UnknownSemanticError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "POSITION" => Ok(VertexSemantic::Position),
            "NORMAL" => Ok(VertexSemantic::Normal),
            "TANGENT" => Ok(VertexSemantic::Tangent),
            "BINORMAL" => Ok(VertexSemantic::BiTangent),
            "COLOR" => Ok(VertexSemantic::Color),
            "TEXCOORD" => Ok(VertexSemantic::TexCoord),
            "BLENDINDICES" => Ok(VertexSemantic::BoneIndices),
            "BLENDWEIGHT" => Ok(VertexSemantic::BoneWeights),
            other => Err(UnknownSemanticError(other.to_string())),
        }
    }
}

/// One attribute inside a vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexElement {
    /// Role of the attribute.
    pub semantic: VertexSemantic,
    /// Data format of the attribute.
    pub format: ResourceFormat,
    /// Byte offset inside the vertex. `None` packs the element after the previous one.
    pub offset: Option<u32>,
}

impl VertexElement {
    /// An element placed right after the previous one.
    pub const fn new(semantic: VertexSemantic, format: ResourceFormat) -> Self {
        Self {
            semantic,
            format,
            offset: None,
        }
    }

    /// An element at an explicit byte offset.
    pub const fn at_offset(semantic: VertexSemantic, format: ResourceFormat, offset: u32) -> Self {
        Self {
            semantic,
            format,
            offset: Some(offset),
        }
    }
}

/// How often a vertex buffer advances.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VertexStepRate {
    #[default]
    Vertex,
    Instance,
}

/// Layout of the vertices stored in one vertex buffer slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexBufferLayout<'a> {
    /// Bytes between two consecutive vertices.
    pub stride: u32,
    /// Per-vertex or per-instance stepping.
    pub step_rate: VertexStepRate,
    /// Attributes in declaration order.
    pub elements: Cow<'a, [VertexElement]>,
}

impl<'a> VertexBufferLayout<'a> {
    /// Creates a per-vertex layout.
    pub fn new(stride: u32, elements: impl Into<Cow<'a, [VertexElement]>>) -> Self {
        Self {
            stride,
            step_rate: VertexStepRate::Vertex,
            elements: elements.into(),
        }
    }

    /// Deep-copies the element array so the layout no longer borrows caller data.
    pub fn into_static(self) -> VertexBufferLayout<'static> {
        VertexBufferLayout {
            stride: self.stride,
            step_rate: self.step_rate,
            elements: Cow::Owned(self.elements.into_owned()),
        }
    }
}

/// A vertex element after offset resolution and semantic indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResolvedVertexElement {
    /// Role of the attribute.
    pub semantic: VertexSemantic,
    /// Index among elements sharing the same semantic, in slot-major order.
    pub semantic_index: u32,
    /// Data format.
    pub format: ResourceFormat,
    /// Vertex buffer slot.
    pub slot: u32,
    /// Byte offset inside the vertex.
    pub offset: u32,
}

impl ResolvedVertexElement {
    /// The semantic name, e.g. `"TEXCOORD"`.
    pub const fn semantic_name(&self) -> &'static str {
        self.semantic.name()
    }
}

/// Stride and stepping of one vertex buffer slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResolvedVertexBuffer {
    /// Vertex buffer slot.
    pub slot: u32,
    /// Bytes between two vertices.
    pub stride: u32,
    /// Per-vertex or per-instance stepping.
    pub step_rate: VertexStepRate,
}

/// A fully resolved input layout, ready for native translation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ResolvedInputLayout {
    /// One entry per vertex buffer slot.
    pub buffers: Vec<ResolvedVertexBuffer>,
    /// Elements in slot-major, element-minor order.
    pub elements: Vec<ResolvedVertexElement>,
}

/// Resolves offsets and semantic indices for a set of vertex buffer layouts.
///
/// Inside a layout, element offsets must be all explicit or all automatic.
/// Explicit offsets must not overlap the previous element, and the stride must
/// cover the last element.
pub fn resolve_input_layout(
    layouts: &[VertexBufferLayout<'_>],
) -> Result<ResolvedInputLayout, ValidationError> {
    let mut resolved = ResolvedInputLayout::default();
    let mut semantic_counters = [0u32; VertexSemantic::COUNT];

    for (slot, layout) in layouts.iter().enumerate() {
        let slot = slot as u32;
        let explicit = layout
            .elements
            .iter()
            .filter(|element| element.offset.is_some())
            .count();
        if explicit != 0 && explicit != layout.elements.len() {
            return Err(ValidationError::MixedVertexOffsets { slot });
        }

        let mut cursor = 0u32;
        for (index, element) in layout.elements.iter().enumerate() {
            if element.format.is_compressed() || element.format.is_depth() {
                return Err(ValidationError::InvalidVertexFormat {
                    format: element.format,
                });
            }

            let offset = match element.offset {
                Some(offset) if offset < cursor => {
                    return Err(ValidationError::OverlappingVertexElements {
                        slot,
                        element: index,
                    });
                }
                Some(offset) => offset,
                None => cursor,
            };
            cursor = offset.checked_add(element.format.stride()).ok_or(
                ValidationError::VertexElementOutOfRange {
                    slot,
                    element: index,
                },
            )?;

            let counter = &mut semantic_counters[element.semantic as usize];
            resolved.elements.push(ResolvedVertexElement {
                semantic: element.semantic,
                semantic_index: *counter,
                format: element.format,
                slot,
                offset,
            });
            *counter += 1;
        }

        if layout.stride < cursor {
            return Err(ValidationError::VertexStrideTooSmall {
                slot,
                stride: layout.stride,
                required: cursor,
            });
        }

        resolved.buffers.push(ResolvedVertexBuffer {
            slot,
            stride: layout.stride,
            step_rate: layout.step_rate,
        });
    }

    Ok(resolved)
}

/// Cache key of an input layout: the vertex layouts plus the vertex shader bytecode.
///
/// A key built with [`InputLayoutKey::borrowed`] only references caller data and is
/// used for lookups. [`InputLayoutKey::to_permanent`] produces the deep copy that is
/// stored in the cache.
#[derive(Debug, Clone, Hash)]
pub struct InputLayoutKey<'a> {
    layouts: Cow<'a, [VertexBufferLayout<'a>]>,
    bytecode: Cow<'a, [u8]>,
}

impl<'a> InputLayoutKey<'a> {
    /// A lookup key referencing caller-owned arrays. Does not allocate.
    pub fn borrowed(layouts: &'a [VertexBufferLayout<'a>], bytecode: &'a [u8]) -> Self {
        Self {
            layouts: Cow::Borrowed(layouts),
            bytecode: Cow::Borrowed(bytecode),
        }
    }

    /// Deep-copies every array referenced by this key.
    pub fn to_permanent(&self) -> InputLayoutKey<'static> {
        InputLayoutKey {
            layouts: Cow::Owned(
                self.layouts
                    .iter()
                    .map(|layout| layout.clone().into_static())
                    .collect(),
            ),
            bytecode: Cow::Owned(self.bytecode.to_vec()),
        }
    }

    /// Structural equality across key lifetimes.
    pub fn matches(&self, other: &InputLayoutKey<'_>) -> bool {
        self.bytecode[..] == other.bytecode[..]
            && self.layouts.len() == other.layouts.len()
            && self
                .layouts
                .iter()
                .zip(other.layouts.iter())
                .all(|(a, b)| {
                    a.stride == b.stride && a.step_rate == b.step_rate && a.elements[..] == b.elements[..]
                })
    }

    /// The vertex buffer layouts of this key.
    pub fn layouts(&self) -> &[VertexBufferLayout<'a>] {
        &self.layouts
    }

    /// The vertex shader bytecode of this key.
    pub fn bytecode(&self) -> &[u8] {
        &self.bytecode
    }

    /// Returns `true` if the key points at data it owns.
    pub fn is_permanent(&self) -> bool {
        matches!(self.bytecode, Cow::Owned(_))
            && matches!(self.layouts, Cow::Owned(_))
            && self
                .layouts
                .iter()
                .all(|layout| matches!(layout.elements, Cow::Owned(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ResourceFormat as F;
    use VertexSemantic as S;

    #[test]
    fn test_semantic_indices_are_assigned_slot_major() {
        let slot0 = [
            VertexElement::new(S::Position, F::R32G32B32Float),
            VertexElement::new(S::TexCoord, F::R32G32Float),
        ];
        let slot1 = [
            VertexElement::new(S::TexCoord, F::R32G32Float),
            VertexElement::new(S::Normal, F::R32G32B32Float),
            VertexElement::new(S::TexCoord, F::R16G16Float),
        ];
        let layouts = [
            VertexBufferLayout::new(20, &slot0[..]),
            VertexBufferLayout::new(24, &slot1[..]),
        ];

        let resolved = resolve_input_layout(&layouts).unwrap();
        let names: Vec<String> = resolved
            .elements
            .iter()
            .map(|e| format!("{}{}", e.semantic_name(), e.semantic_index))
            .collect();
        assert_eq!(
            names,
            ["POSITION0", "TEXCOORD0", "TEXCOORD1", "NORMAL0", "TEXCOORD2"]
        );
        assert_eq!(resolved.elements[2].slot, 1);
    }

    #[test]
    fn test_automatic_offsets_accumulate() {
        let elements = vec![
            VertexElement::new(S::Position, F::R32G32B32Float),
            VertexElement::new(S::Color, F::R8G8B8A8Unorm),
            VertexElement::new(S::TexCoord, F::R32G32Float),
        ];
        let resolved = resolve_input_layout(&[VertexBufferLayout::new(24, elements)]).unwrap();
        let offsets: Vec<u32> = resolved.elements.iter().map(|e| e.offset).collect();
        assert_eq!(offsets, [0, 12, 16]);
        assert_eq!(resolved.buffers[0].stride, 24);
    }

    #[test]
    fn test_mixed_offsets_are_rejected() {
        let elements = vec![
            VertexElement::at_offset(S::Position, F::R32G32B32Float, 0),
            VertexElement::new(S::Normal, F::R32G32B32Float),
        ];
        let layouts = [
            VertexBufferLayout::new(12, vec![VertexElement::new(S::Color, F::R8G8B8A8Unorm)]),
            VertexBufferLayout::new(24, elements),
        ];
        assert_eq!(
            resolve_input_layout(&layouts),
            Err(ValidationError::MixedVertexOffsets { slot: 1 })
        );
    }

    #[test]
    fn test_overlapping_explicit_offsets_are_rejected() {
        let elements = vec![
            VertexElement::at_offset(S::Position, F::R32G32B32Float, 0),
            VertexElement::at_offset(S::Normal, F::R32G32B32Float, 8),
        ];
        assert_eq!(
            resolve_input_layout(&[VertexBufferLayout::new(32, elements)]),
            Err(ValidationError::OverlappingVertexElements { slot: 0, element: 1 })
        );
    }

    #[test]
    fn test_stride_must_cover_last_element() {
        let elements = vec![
            VertexElement::at_offset(S::Position, F::R32G32B32Float, 0),
            VertexElement::at_offset(S::TexCoord, F::R32G32Float, 16),
        ];
        assert_eq!(
            resolve_input_layout(&[VertexBufferLayout::new(20, elements.clone())]),
            Err(ValidationError::VertexStrideTooSmall {
                slot: 0,
                stride: 20,
                required: 24
            })
        );
        assert!(resolve_input_layout(&[VertexBufferLayout::new(24, elements)]).is_ok());
    }

    #[test]
    fn test_offsets_near_the_end_of_the_vertex_are_rejected() {
        let past_end = vec![
            VertexElement::at_offset(S::Position, F::R32G32B32Float, 0),
            VertexElement::at_offset(S::TexCoord, F::R32G32Float, u32::MAX - 2),
        ];
        assert_eq!(
            resolve_input_layout(&[VertexBufferLayout::new(u32::MAX, past_end)]),
            Err(ValidationError::VertexElementOutOfRange { slot: 0, element: 1 })
        );

        let flush = vec![VertexElement::at_offset(S::Color, F::R32Float, u32::MAX - 4)];
        let resolved = resolve_input_layout(&[VertexBufferLayout::new(u32::MAX, flush)]).unwrap();
        assert_eq!(resolved.elements[0].offset, u32::MAX - 4);
    }

    #[test]
    fn test_compressed_vertex_format_is_rejected() {
        let elements = vec![VertexElement::new(S::Color, F::BC1Unorm)];
        assert_eq!(
            resolve_input_layout(&[VertexBufferLayout::new(8, elements)]),
            Err(ValidationError::InvalidVertexFormat { format: F::BC1Unorm })
        );
    }

    #[test]
    fn test_semantic_names_round_trip() {
        for semantic in [
            S::Position,
            S::Normal,
            S::Tangent,
            S::BiTangent,
            S::Color,
            S::TexCoord,
            S::BoneIndices,
            S::BoneWeights,
        ] {
            assert_eq!(semantic.name().parse::<VertexSemantic>(), Ok(semantic));
        }
        assert_eq!(
            "SV_Position".parse::<VertexSemantic>(),
            Err(UnknownSemanticError("SV_Position".to_string()))
        );
    }

    #[test]
    fn test_permanent_key_matches_borrowed_key() {
        let elements = [VertexElement::new(S::Position, F::R32G32B32Float)];
        let layouts = [VertexBufferLayout::new(12, &elements[..])];
        let bytecode = [1u8, 2, 3];

        let borrowed = InputLayoutKey::borrowed(&layouts, &bytecode);
        assert!(!borrowed.is_permanent());
        let permanent = borrowed.to_permanent();
        assert!(permanent.is_permanent());
        assert!(permanent.matches(&borrowed));

        let other_code = [1u8, 2, 4];
        assert!(!permanent.matches(&InputLayoutKey::borrowed(&layouts, &other_code)));
    }
}
