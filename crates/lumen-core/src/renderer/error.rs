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

//! Defines the hierarchy of error types for the render hardware interface.

use crate::renderer::api::format::ResourceFormat;
use std::fmt;

/// An error raised by a format metadata query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// A block-size or block-extent query was made on a linear format.
    NotBlockCompressed(ResourceFormat),
    /// A row alignment of zero or a non power of two was requested.
    InvalidAlignment(u32),
    /// The byte size of a subresource does not fit the size types.
    SizeOverflow {
        /// Format of the subresource.
        format: ResourceFormat,
        /// Width in texels.
        width: u32,
        /// Height in texels.
        height: u32,
    },
    /// The active backend has no native equivalent for the format.
    UnsupportedByBackend {
        /// The requested neutral format.
        format: ResourceFormat,
        /// The backend that rejected it.
        backend: &'static str,
    },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::NotBlockCompressed(format) => {
                write!(f, "Format {format:?} is not block compressed")
            }
            FormatError::InvalidAlignment(alignment) => {
                write!(f, "Alignment {alignment} is not a non-zero power of two")
            }
            FormatError::SizeOverflow {
                format,
                width,
                height,
            } => write!(f, "A {width}x{height} {format:?} subresource is too large"),
            FormatError::UnsupportedByBackend { format, backend } => {
                write!(f, "Format {format:?} has no native equivalent on the {backend} backend")
            }
        }
    }
}

impl std::error::Error for FormatError {}

/// A description was rejected before any native object was created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Depth clipping was disabled on a device that cannot disable it.
    DepthClipDisableUnsupported,
    /// Wireframe fill mode was requested on a device without wireframe support.
    WireframeUnsupported,
    /// Render target blend states differ on a device without independent blending.
    IndependentBlendUnsupported {
        /// The first render target whose state differs from target 0.
        target: usize,
    },
    /// Explicit and automatic vertex element offsets were mixed in one layout.
    MixedVertexOffsets {
        /// The vertex buffer slot of the offending layout.
        slot: u32,
    },
    /// Two vertex elements overlap or are declared out of order.
    OverlappingVertexElements {
        /// The vertex buffer slot of the offending layout.
        slot: u32,
        /// Index of the element inside the layout.
        element: usize,
    },
    /// A vertex element uses a block-compressed or depth format.
    InvalidVertexFormat {
        /// The offending format.
        format: ResourceFormat,
    },
    /// A vertex element ends past the addressable range of a vertex.
    VertexElementOutOfRange {
        /// The vertex buffer slot of the offending layout.
        slot: u32,
        /// Index of the element inside the layout.
        element: usize,
    },
    /// The declared vertex stride is smaller than the elements require.
    VertexStrideTooSmall {
        /// The vertex buffer slot of the offending layout.
        slot: u32,
        /// The declared stride.
        stride: u32,
        /// The minimum stride implied by the elements.
        required: u32,
    },
    /// The pipeline has no vertex shader.
    MissingVertexShader,
    /// The number of color targets exceeds the supported maximum.
    TooManyColorTargets(usize),
    /// A color target format cannot be rendered to.
    IncompatibleColorTarget {
        /// Index of the color target.
        index: usize,
        /// The offending format.
        format: ResourceFormat,
    },
    /// The depth/stencil target format is not a depth format.
    IncompatibleDepthStencilFormat(ResourceFormat),
    /// The pipeline outputs do not match the render pass it is bound in.
    RenderPassMismatch(String),
    /// Two shader stages declare the same binding with different shapes.
    ConflictingBinding {
        /// Register space of the binding.
        space: u32,
        /// Slot of the binding.
        slot: u32,
    },
    /// A binding range runs past the last addressable slot.
    BindingRangeOverflow {
        /// Register space of the range.
        space: u32,
        /// First slot of the range.
        base_slot: u32,
        /// Number of slots in the range.
        count: u32,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::DepthClipDisableUnsupported => {
                write!(f, "The device does not support disabling depth clipping")
            }
            ValidationError::WireframeUnsupported => {
                write!(f, "The device does not support wireframe fill mode")
            }
            ValidationError::IndependentBlendUnsupported { target } => {
                write!(
                    f,
                    "Render target {target} blend state differs from target 0 but independent blending is unsupported"
                )
            }
            ValidationError::MixedVertexOffsets { slot } => {
                write!(
                    f,
                    "Vertex layout in slot {slot} mixes explicit and automatic element offsets"
                )
            }
            ValidationError::OverlappingVertexElements { slot, element } => {
                write!(
                    f,
                    "Vertex element {element} in slot {slot} overlaps the previous element"
                )
            }
            ValidationError::InvalidVertexFormat { format } => {
                write!(f, "Format {format:?} cannot be used as a vertex element")
            }
            ValidationError::VertexElementOutOfRange { slot, element } => {
                write!(
                    f,
                    "Vertex element {element} in slot {slot} ends past the largest vertex offset"
                )
            }
            ValidationError::VertexStrideTooSmall {
                slot,
                stride,
                required,
            } => {
                write!(
                    f,
                    "Vertex stride {stride} in slot {slot} is smaller than the required {required} bytes"
                )
            }
            ValidationError::MissingVertexShader => {
                write!(f, "A graphics pipeline requires a vertex shader")
            }
            ValidationError::TooManyColorTargets(count) => {
                write!(f, "{count} color targets exceed the supported maximum")
            }
            ValidationError::IncompatibleColorTarget { index, format } => {
                write!(f, "Color target {index} uses non-renderable format {format:?}")
            }
            ValidationError::IncompatibleDepthStencilFormat(format) => {
                write!(f, "Incompatible depth/stencil format: {format:?}")
            }
            ValidationError::RenderPassMismatch(msg) => {
                write!(f, "Pipeline is incompatible with the render pass: {msg}")
            }
            ValidationError::ConflictingBinding { space, slot } => {
                write!(
                    f,
                    "Binding at space {space}, slot {slot} is declared with conflicting shapes"
                )
            }
            ValidationError::BindingRangeOverflow {
                space,
                base_slot,
                count,
            } => {
                write!(
                    f,
                    "Binding range of {count} slots at space {space}, slot {base_slot} overflows the slot index"
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// An error related to the creation or use of a GPU object.
#[derive(Debug)]
pub enum ResourceError {
    /// The description failed validation.
    Validation(ValidationError),
    /// A format query or translation failed.
    Format(FormatError),
    /// The backend failed to create a native object.
    CreationFailed {
        /// The kind of object being created.
        object: &'static str,
        /// Detailed error message from the backend.
        details: String,
    },
    /// The handle or ID used to reference a resource is invalid.
    InvalidHandle,
    /// The resource cache has already released its native objects.
    CacheDisposed,
    /// All command list slots are in use.
    CommandListPoolExhausted,
    /// All query indices of the given kind are in use.
    QueryPoolExhausted,
    /// An error originating from the specific graphics backend implementation.
    BackendError(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::Validation(err) => write!(f, "Validation failed: {err}"),
            ResourceError::Format(err) => write!(f, "Format error: {err}"),
            ResourceError::CreationFailed { object, details } => {
                write!(f, "Failed to create native {object}: {details}")
            }
            ResourceError::InvalidHandle => write!(f, "Invalid resource handle or ID."),
            ResourceError::CacheDisposed => {
                write!(f, "The resource cache has been disposed.")
            }
            ResourceError::CommandListPoolExhausted => {
                write!(f, "No free command list slot is available.")
            }
            ResourceError::QueryPoolExhausted => write!(f, "No free query index is available."),
            ResourceError::BackendError(msg) => {
                write!(f, "Backend-specific resource error: {msg}")
            }
        }
    }
}

impl std::error::Error for ResourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResourceError::Validation(err) => Some(err),
            ResourceError::Format(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ResourceError {
    fn from(err: ValidationError) -> Self {
        ResourceError::Validation(err)
    }
}

impl From<FormatError> for ResourceError {
    fn from(err: FormatError) -> Self {
        ResourceError::Format(err)
    }
}

/// A high-level error raised while setting up or running a render device.
#[derive(Debug)]
pub enum RenderError {
    /// The settings handed to the device are not usable.
    InvalidConfiguration(String),
    /// A failure occurred during the initialization of the graphics backend.
    InitializationFailed(String),
    /// An error occurred while managing a GPU resource.
    ResourceError(ResourceError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::InvalidConfiguration(msg) => {
                write!(f, "Invalid render configuration: {msg}")
            }
            RenderError::InitializationFailed(msg) => {
                write!(f, "Failed to initialize graphics backend: {msg}")
            }
            RenderError::ResourceError(err) => {
                write!(f, "Graphics resource operation failed: {err}")
            }
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::ResourceError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResourceError> for RenderError {
    fn from(err: ResourceError) -> Self {
        RenderError::ResourceError(err)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn format_error_display() {
        let err = FormatError::NotBlockCompressed(ResourceFormat::R8G8B8A8Unorm);
        assert_eq!(
            format!("{err}"),
            "Format R8G8B8A8Unorm is not block compressed"
        );
        assert_eq!(
            format!("{}", FormatError::InvalidAlignment(3)),
            "Alignment 3 is not a non-zero power of two"
        );
    }

    #[test]
    fn resource_error_display_wrapping_validation_error() {
        let res_err: ResourceError = ValidationError::MixedVertexOffsets { slot: 1 }.into();
        assert_eq!(
            format!("{res_err}"),
            "Validation failed: Vertex layout in slot 1 mixes explicit and automatic element offsets"
        );
        assert!(res_err.source().is_some());
    }

    #[test]
    fn render_error_display_wrapping_resource_error() {
        let res_err: ResourceError = FormatError::InvalidAlignment(0).into();
        let render_err: RenderError = res_err.into();
        assert_eq!(
            format!("{render_err}"),
            "Graphics resource operation failed: Format error: Alignment 0 is not a non-zero power of two"
        );
        assert!(render_err.source().is_some());
        assert!(render_err.source().unwrap().source().is_some());
    }
}
