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

//! Cross-field checks run before any native pipeline object is created.

use crate::renderer::api::*;
use crate::renderer::error::ValidationError;
use crate::renderer::traits::DeviceCapabilities;

/// Sample counts a render pass may declare.
const SUPPORTED_SAMPLE_COUNTS: [u32; 5] = [1, 2, 4, 8, 16];

/// Checks a rasterizer description against the device features.
pub fn validate_rasterizer_state(
    desc: &RasterizerStateDescription,
    capabilities: &DeviceCapabilities,
) -> Result<(), ValidationError> {
    if !desc.depth_clip && !capabilities.depth_clip_disable {
        return Err(ValidationError::DepthClipDisableUnsupported);
    }
    if desc.fill_mode == FillMode::Wireframe && !capabilities.wireframe_fill {
        return Err(ValidationError::WireframeUnsupported);
    }
    Ok(())
}

/// Checks a blend description against the device features.
///
/// Without independent blending every render target must use the state of target 0.
pub fn validate_blend_state(
    desc: &BlendStateDescription,
    capabilities: &DeviceCapabilities,
) -> Result<(), ValidationError> {
    if !desc.independent_blend || capabilities.independent_blend {
        return Ok(());
    }
    let first = &desc.render_targets[0];
    match desc.render_targets[1..].iter().position(|target| target != first) {
        Some(index) => Err(ValidationError::IndependentBlendUnsupported { target: index + 1 }),
        None => Ok(()),
    }
}

/// Checks that every attachment format of `layout` can be rendered to.
pub fn validate_render_pass_layout(layout: &RenderPassLayout) -> Result<(), ValidationError> {
    if layout.color_formats.len() > MAX_RENDER_TARGETS {
        return Err(ValidationError::TooManyColorTargets(layout.color_formats.len()));
    }
    for (index, format) in layout.color_formats.iter().enumerate() {
        if !format.is_color_renderable() {
            return Err(ValidationError::IncompatibleColorTarget {
                index,
                format: *format,
            });
        }
    }
    if let Some(format) = layout.depth_format {
        if !format.is_depth() {
            return Err(ValidationError::IncompatibleDepthStencilFormat(format));
        }
    }
    if !SUPPORTED_SAMPLE_COUNTS.contains(&layout.sample_count) {
        return Err(ValidationError::RenderPassMismatch(format!(
            "unsupported sample count {}",
            layout.sample_count
        )));
    }
    Ok(())
}

/// Checks that a pipeline built for `pipeline` can be used inside `pass`.
pub fn check_render_pass_compatibility(
    pipeline: &RenderPassLayout,
    pass: &RenderPassLayout,
) -> Result<(), ValidationError> {
    if pipeline.color_formats.len() != pass.color_formats.len() {
        return Err(ValidationError::RenderPassMismatch(format!(
            "pipeline writes {} color targets, render pass has {}",
            pipeline.color_formats.len(),
            pass.color_formats.len()
        )));
    }
    let mismatch = pipeline
        .color_formats
        .iter()
        .zip(&pass.color_formats)
        .position(|(ours, theirs)| ours != theirs);
    if let Some(index) = mismatch {
        return Err(ValidationError::RenderPassMismatch(format!(
            "color target {index} is {:?} in the pipeline and {:?} in the render pass",
            pipeline.color_formats[index], pass.color_formats[index]
        )));
    }
    if pipeline.depth_format != pass.depth_format {
        return Err(ValidationError::RenderPassMismatch(format!(
            "depth target is {:?} in the pipeline and {:?} in the render pass",
            pipeline.depth_format, pass.depth_format
        )));
    }
    if pipeline.sample_count != pass.sample_count {
        return Err(ValidationError::RenderPassMismatch(format!(
            "pipeline uses {} samples, render pass uses {}",
            pipeline.sample_count, pass.sample_count
        )));
    }
    Ok(())
}

/// Runs every description-level check of a graphics pipeline.
pub fn validate_pipeline_description(
    desc: &GraphicsPipelineDescription<'_>,
    capabilities: &DeviceCapabilities,
) -> Result<(), ValidationError> {
    if desc.vertex_shader.is_none() {
        return Err(ValidationError::MissingVertexShader);
    }
    validate_rasterizer_state(&desc.rasterizer, capabilities)?;
    validate_blend_state(&desc.blend, capabilities)?;
    validate_render_pass_layout(&desc.render_pass)?;
    if !desc.vertex_layouts.is_empty() {
        resolve_input_layout(&desc.vertex_layouts)?;
    }
    Ok(())
}
