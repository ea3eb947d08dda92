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

//! Assembly of native graphics pipelines from backend-neutral descriptions.

mod binding_layout;
mod validation;

pub use self::binding_layout::build_binding_layout;
pub use self::validation::*;

use crate::renderer::api::*;
use crate::renderer::cache::{CachedState, ResourceCache, StateId};
use crate::renderer::error::ResourceError;
use crate::renderer::registry::Registry;
use crate::renderer::traits::{NativePipelineDescription, RhiBackend};
use std::sync::Arc;

/// A native pipeline with the cache entry of its binding layout.
pub(crate) struct BuiltPipeline<B: RhiBackend> {
    pub(crate) native: B::Pipeline,
    pub(crate) binding_layout: StateId,
}

/// Validates a pipeline description, resolves its shaders and fixed-function state
/// through the cache, and creates the native pipeline.
pub(crate) struct PipelineBuilder<'a, B: RhiBackend> {
    pub(crate) backend: &'a B,
    pub(crate) cache: &'a ResourceCache<B>,
    pub(crate) registry: &'a Registry<B>,
}

impl<B: RhiBackend> PipelineBuilder<'_, B> {
    pub(crate) fn build(
        &self,
        desc: &GraphicsPipelineDescription<'_>,
    ) -> Result<BuiltPipeline<B>, ResourceError> {
        let capabilities = self.backend.capabilities();
        if let Err(err) = validate_pipeline_description(desc, &capabilities) {
            log::warn!("PipelineBuilder: rejected pipeline {:?}: {err}", desc.label);
            return Err(err.into());
        }

        let mut shaders = Vec::new();
        let mut reflections = Vec::new();
        let mut vertex_bytecode = None;
        for (stage, id) in desc.shaders() {
            let (declared, native, bytecode, reflection) = self.registry.shaders.with(id, |e| {
                (
                    e.stage,
                    (*e.native).clone(),
                    Arc::clone(&e.bytecode),
                    Arc::clone(&e.reflection),
                )
            })?;
            if declared != stage {
                return Err(ResourceError::CreationFailed {
                    object: "pipeline",
                    details: format!("shader {id:?} is a {declared:?} shader bound as {stage:?}"),
                });
            }
            if stage == ShaderStage::Vertex {
                vertex_bytecode = Some(bytecode);
            }
            shaders.push((stage, native));
            reflections.push((stage, reflection));
        }

        let blend = self.cache.get_blend_state(&desc.blend)?;
        let depth_stencil = self.cache.get_depth_stencil_state(&desc.depth_stencil)?;
        let rasterizer = self
            .cache
            .get_rasterizer_state(&desc.rasterizer, desc.render_pass.sample_count > 1)?;
        let input_layout = match &vertex_bytecode {
            Some(bytecode) => self.cache.get_input_layout(&desc.vertex_layouts, bytecode)?,
            None => None,
        };

        let declared: Vec<(ShaderStage, &ShaderReflection)> = reflections
            .iter()
            .map(|(stage, reflection)| (*stage, reflection.as_ref()))
            .collect();
        let binding_layout = self.cache.get_binding_layout(&build_binding_layout(&declared)?)?;

        let native = self.backend.create_graphics_pipeline(&NativePipelineDescription {
            label: desc.label.as_deref(),
            shaders: &shaders,
            blend_state: blend.native(),
            depth_stencil_state: depth_stencil.native(),
            rasterizer_state: rasterizer.native(),
            input_layout: input_layout.as_ref().map(CachedState::native),
            binding_layout: binding_layout.native(),
            topology: desc.topology,
            render_pass: &desc.render_pass,
        })?;
        log::debug!(
            "PipelineBuilder: created pipeline {:?} with {} shader stages",
            desc.label,
            shaders.len()
        );

        Ok(BuiltPipeline {
            native,
            binding_layout: binding_layout.id(),
        })
    }
}
