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

//! Graphics pipeline descriptions and the dynamic state bound next to them.

use super::format::ResourceFormat;
use super::resource::ShaderId;
use super::state::{BlendStateDescription, DepthStencilStateDescription, RasterizerStateDescription};
use super::vertex::VertexBufferLayout;
use std::borrow::Cow;

/// How vertices are assembled into primitives.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveTopology {
    PointList,
    LineList,
    LineStrip,
    #[default]
    TriangleList,
    TriangleStrip,
}

/// Width of the indices in an index buffer.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexFormat {
    Uint16,
    #[default]
    Uint32,
}

impl IndexFormat {
    /// Bytes per index.
    pub const fn byte_size(self) -> u32 {
        match self {
            IndexFormat::Uint16 => 2,
            IndexFormat::Uint32 => 4,
        }
    }
}

/// The viewport transform.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    /// Left edge in pixels.
    pub x: f32,
    /// Top edge in pixels.
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
    /// Depth mapped to the near plane.
    pub min_depth: f32,
    /// Depth mapped to the far plane.
    pub max_depth: f32,
}

impl Viewport {
    /// A viewport covering `width` x `height` pixels with the full depth range.
    pub fn from_size(width: f32, height: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// A scissor rectangle in pixels.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScissorRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Formats and sample count of the attachments of a render pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderPassLayout {
    /// Color attachment formats, in target order.
    pub color_formats: Vec<ResourceFormat>,
    /// Depth/stencil attachment format.
    pub depth_format: Option<ResourceFormat>,
    /// Samples per pixel.
    pub sample_count: u32,
}

impl Default for RenderPassLayout {
    fn default() -> Self {
        Self {
            color_formats: Vec::new(),
            depth_format: None,
            sample_count: 1,
        }
    }
}

/// A descriptor used to create a [`PipelineId`](super::resource::PipelineId).
#[derive(Debug, Clone)]
pub struct GraphicsPipelineDescription<'a> {
    /// An optional debug label for the pipeline.
    pub label: Option<Cow<'a, str>>,
    /// Vertex shader, required.
    pub vertex_shader: Option<ShaderId>,
    /// Hull shader.
    pub hull_shader: Option<ShaderId>,
    /// Domain shader.
    pub domain_shader: Option<ShaderId>,
    /// Geometry shader.
    pub geometry_shader: Option<ShaderId>,
    /// Pixel shader.
    pub pixel_shader: Option<ShaderId>,
    /// Blend state.
    pub blend: BlendStateDescription,
    /// Depth/stencil state.
    pub depth_stencil: DepthStencilStateDescription,
    /// Rasterizer state.
    pub rasterizer: RasterizerStateDescription,
    /// Vertex buffer layouts, one per slot.
    pub vertex_layouts: Cow<'a, [VertexBufferLayout<'a>]>,
    /// Primitive topology.
    pub topology: PrimitiveTopology,
    /// Formats and sample count the pipeline renders into.
    pub render_pass: RenderPassLayout,
}

impl Default for GraphicsPipelineDescription<'_> {
    fn default() -> Self {
        Self {
            label: None,
            vertex_shader: None,
            hull_shader: None,
            domain_shader: None,
            geometry_shader: None,
            pixel_shader: None,
            blend: BlendStateDescription::default(),
            depth_stencil: DepthStencilStateDescription::default(),
            rasterizer: RasterizerStateDescription::default(),
            vertex_layouts: Cow::Borrowed(&[]),
            topology: PrimitiveTopology::TriangleList,
            render_pass: RenderPassLayout::default(),
        }
    }
}

impl GraphicsPipelineDescription<'_> {
    /// The bound shaders with their stages, in pipeline order.
    pub fn shaders(&self) -> impl Iterator<Item = (super::binding::ShaderStage, ShaderId)> + '_ {
        use super::binding::ShaderStage;
        [
            (ShaderStage::Vertex, self.vertex_shader),
            (ShaderStage::Hull, self.hull_shader),
            (ShaderStage::Domain, self.domain_shader),
            (ShaderStage::Geometry, self.geometry_shader),
            (ShaderStage::Pixel, self.pixel_shader),
        ]
        .into_iter()
        .filter_map(|(stage, shader)| shader.map(|id| (stage, id)))
    }
}
