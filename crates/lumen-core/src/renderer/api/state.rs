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

//! Fixed-function state descriptions used as resource cache keys.
//!
//! Every description is a plain value type with structural equality and a stable
//! hash. Arrays compare element by element, so order matters.

use bitflags::bitflags;
use std::hash::{Hash, Hasher};

/// Maximum number of simultaneously bound color targets.
pub const MAX_RENDER_TARGETS: usize = 8;

/// A multiplier applied to a blend source or destination.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendFactor {
    Zero,
    #[default]
    One,
    SrcColor,
    InvSrcColor,
    SrcAlpha,
    InvSrcAlpha,
    DestAlpha,
    InvDestAlpha,
    DestColor,
    InvDestColor,
    SrcAlphaSaturated,
    BlendFactor,
    InvBlendFactor,
}

/// How source and destination terms are combined.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendOperation {
    #[default]
    Add,
    Subtract,
    RevSubtract,
    Min,
    Max,
}

bitflags! {
    /// Color channels written by a render target.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ColorWriteMask: u8 {
        /// Red channel.
        const RED = 1 << 0;
        /// Green channel.
        const GREEN = 1 << 1;
        /// Blue channel.
        const BLUE = 1 << 2;
        /// Alpha channel.
        const ALPHA = 1 << 3;
        /// All four channels.
        const ALL = 0b1111;
    }
}

/// Blend configuration of one render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTargetBlendDescription {
    /// Enables blending on this target.
    pub blending_enabled: bool,
    /// Color source factor.
    pub source_blend: BlendFactor,
    /// Color destination factor.
    pub dest_blend: BlendFactor,
    /// Color operation.
    pub blend_op: BlendOperation,
    /// Alpha source factor.
    pub source_blend_alpha: BlendFactor,
    /// Alpha destination factor.
    pub dest_blend_alpha: BlendFactor,
    /// Alpha operation.
    pub blend_op_alpha: BlendOperation,
    /// Channels written by the target.
    pub write_mask: ColorWriteMask,
}

impl Default for RenderTargetBlendDescription {
    fn default() -> Self {
        Self {
            blending_enabled: false,
            source_blend: BlendFactor::One,
            dest_blend: BlendFactor::One,
            blend_op: BlendOperation::Add,
            source_blend_alpha: BlendFactor::One,
            dest_blend_alpha: BlendFactor::One,
            blend_op_alpha: BlendOperation::Add,
            write_mask: ColorWriteMask::ALL,
        }
    }
}

/// Blend state of a pipeline, covering every render target slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlendStateDescription {
    /// Per-target blend configuration.
    pub render_targets: [RenderTargetBlendDescription; MAX_RENDER_TARGETS],
    /// Enables alpha-to-coverage.
    pub alpha_to_coverage: bool,
    /// When `false`, only `render_targets[0]` is meaningful.
    pub independent_blend: bool,
}

impl BlendStateDescription {
    /// Straight alpha blending on target 0.
    pub fn alpha_blending() -> Self {
        let mut desc = Self::default();
        desc.render_targets[0] = RenderTargetBlendDescription {
            blending_enabled: true,
            source_blend: BlendFactor::SrcAlpha,
            dest_blend: BlendFactor::InvSrcAlpha,
            ..Default::default()
        };
        desc
    }
}

/// Comparison used by depth and stencil tests.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompareFunction {
    Never,
    #[default]
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

/// Action applied to the stencil buffer.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StencilOperation {
    #[default]
    Keep,
    Zero,
    Replace,
    IncrementSaturated,
    DecrementSaturated,
    Invert,
    Increment,
    Decrement,
}

/// Stencil behavior of one face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StencilOpDescription {
    /// Operation when the stencil test fails.
    pub fail_op: StencilOperation,
    /// Operation when the stencil test passes but the depth test fails.
    pub depth_fail_op: StencilOperation,
    /// Operation when both tests pass.
    pub pass_op: StencilOperation,
    /// Stencil comparison.
    pub stencil_func: CompareFunction,
}

impl Default for StencilOpDescription {
    fn default() -> Self {
        Self {
            fail_op: StencilOperation::Keep,
            depth_fail_op: StencilOperation::Keep,
            pass_op: StencilOperation::Keep,
            stencil_func: CompareFunction::Always,
        }
    }
}

/// Depth and stencil test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthStencilStateDescription {
    /// Front-face stencil behavior.
    pub front_face: StencilOpDescription,
    /// Back-face stencil behavior, used when `separate_front_and_back` is set.
    pub back_face: StencilOpDescription,
    /// Uses `back_face` for back faces instead of mirroring `front_face`.
    pub separate_front_and_back: bool,
    /// Enables the depth test.
    pub depth_test: bool,
    /// Enables depth writes.
    pub depth_write: bool,
    /// Enables the stencil test.
    pub stencil_test: bool,
    /// Stencil read mask.
    pub stencil_read_mask: u8,
    /// Stencil write mask.
    pub stencil_write_mask: u8,
    /// Depth comparison.
    pub depth_test_func: CompareFunction,
}

impl Default for DepthStencilStateDescription {
    fn default() -> Self {
        Self {
            front_face: StencilOpDescription::default(),
            back_face: StencilOpDescription::default(),
            separate_front_and_back: false,
            depth_test: true,
            depth_write: true,
            stencil_test: false,
            stencil_read_mask: 0xff,
            stencil_write_mask: 0xff,
            depth_test_func: CompareFunction::Less,
        }
    }
}

/// Which triangle faces are discarded.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CullMode {
    None,
    Front,
    #[default]
    Back,
}

/// How triangles are filled.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FillMode {
    #[default]
    Solid,
    Wireframe,
}

/// Rasterizer configuration.
///
/// Float fields compare and hash by bit pattern, so `-0.0` and `0.0` are distinct keys.
#[derive(Debug, Clone, Copy)]
pub struct RasterizerStateDescription {
    /// Face culling.
    pub cull_mode: CullMode,
    /// Triangle fill.
    pub fill_mode: FillMode,
    /// Counter-clockwise triangles are front facing.
    pub front_counter_clockwise: bool,
    /// Constant depth bias.
    pub depth_bias: i32,
    /// Maximum depth bias.
    pub depth_bias_clamp: f32,
    /// Slope-scaled depth bias.
    pub slope_scaled_depth_bias: f32,
    /// Enables the scissor test.
    pub scissor_test: bool,
    /// Enables conservative rasterization.
    pub conservative_rasterization: bool,
    /// Clips primitives against the depth range. Disabling needs device support.
    pub depth_clip: bool,
}

impl Default for RasterizerStateDescription {
    fn default() -> Self {
        Self {
            cull_mode: CullMode::Back,
            fill_mode: FillMode::Solid,
            front_counter_clockwise: false,
            depth_bias: 0,
            depth_bias_clamp: 0.0,
            slope_scaled_depth_bias: 0.0,
            scissor_test: false,
            conservative_rasterization: false,
            depth_clip: true,
        }
    }
}

impl RasterizerStateDescription {
    fn key(&self) -> (CullMode, FillMode, bool, i32, u32, u32, bool, bool, bool) {
        (
            self.cull_mode,
            self.fill_mode,
            self.front_counter_clockwise,
            self.depth_bias,
            self.depth_bias_clamp.to_bits(),
            self.slope_scaled_depth_bias.to_bits(),
            self.scissor_test,
            self.conservative_rasterization,
            self.depth_clip,
        )
    }
}

impl PartialEq for RasterizerStateDescription {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for RasterizerStateDescription {}

impl Hash for RasterizerStateDescription {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_blend_target_order_matters() {
        let mut a = BlendStateDescription {
            independent_blend: true,
            ..Default::default()
        };
        a.render_targets[0].blending_enabled = true;
        let mut b = a;
        b.render_targets[0].blending_enabled = false;
        b.render_targets[1].blending_enabled = true;

        let copy = a;
        assert_ne!(a, b);
        assert_eq!(a, copy);
        assert_eq!(hash_of(&a), hash_of(&copy));
    }

    #[test]
    fn test_rasterizer_float_fields_compare_by_bits() {
        let a = RasterizerStateDescription {
            slope_scaled_depth_bias: 1.5,
            ..Default::default()
        };
        let b = RasterizerStateDescription {
            slope_scaled_depth_bias: 1.5,
            ..Default::default()
        };
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));

        let nan = RasterizerStateDescription {
            depth_bias_clamp: f32::NAN,
            ..Default::default()
        };
        assert_eq!(nan, nan);

        let neg_zero = RasterizerStateDescription {
            depth_bias_clamp: -0.0,
            ..Default::default()
        };
        assert_ne!(neg_zero, RasterizerStateDescription::default());
    }

    #[test]
    fn test_depth_stencil_defaults() {
        let desc = DepthStencilStateDescription::default();
        assert!(desc.depth_test);
        assert!(desc.depth_write);
        assert!(!desc.stencil_test);
        assert_eq!(desc.front_face.stencil_func, CompareFunction::Always);
    }
}
