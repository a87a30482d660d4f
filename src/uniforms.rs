//! Uniform blocks shared with the WGSL passes.
//!
//! Each struct mirrors a WGSL struct field for field. They are rebuilt every
//! frame from the config, pointer, clock and viewport and written with
//! `queue.write_buffer`; nothing is looked up implicitly inside a pass.

use bytemuck::{Pod, Zeroable};

use crate::config::ChainConfig;
use crate::input::{PointerState, Viewport};

/// `SimParams` in `simulate.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SimParams {
    /// `[x, y, pressed, 0]`
    pub pointer: [f32; 4],
    pub view: [f32; 2],
    pub time: f32,
    pub spacing: f32,
    pub point_count: u32,
    pub window: u32,
    pub divergence: f32,
    pub correction_divisor: f32,
    pub head_step: f32,
    pub idle_amplitude: f32,
    pub idle_offset: f32,
    pub idle_ratio: f32,
    pub scale: f32,
    pub tangent_mode: u32,
    pub forward_mode: u32,
    pub blend_edge: f32,
    /// `+1` pushes away from the window line, `-1` pulls toward it.
    pub correction_sign: f32,
    pub _pad: [u32; 3],
}

impl SimParams {
    pub fn new(config: &ChainConfig, pointer: PointerState, viewport: Viewport, time: f32) -> Self {
        Self {
            pointer: pointer.to_uniform(),
            view: [viewport.width as f32, viewport.height as f32],
            time,
            spacing: config.spacing,
            point_count: config.point_count,
            window: config.window,
            divergence: config.divergence,
            correction_divisor: config.correction_divisor,
            head_step: config.max_head_step(),
            idle_amplitude: config.idle.amplitude,
            idle_offset: config.idle.offset,
            idle_ratio: config.idle.ratio,
            scale: config.position_scale,
            tangent_mode: config.tangent.code(),
            forward_mode: config.forward.code(),
            blend_edge: config.forward_blend.edge(),
            correction_sign: config.correction.factor(),
            _pad: [0; 3],
        }
    }
}

/// `RibbonParams` in `ribbon.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct RibbonParams {
    pub color: [f32; 4],
    /// Clip-space squash along the longer axis.
    pub squash: [f32; 2],
    pub render_points: u32,
    pub state_points: u32,
    pub half_width: f32,
    pub scale: f32,
    pub color_law: u32,
    pub _pad: u32,
}

impl RibbonParams {
    pub fn new(config: &ChainConfig, viewport: Viewport) -> Self {
        Self {
            color: config.color.base_color(),
            squash: viewport.clip_squash().to_array(),
            render_points: config.render_points,
            state_points: config.point_count,
            half_width: config.half_width,
            scale: config.position_scale,
            color_law: config.color.code(),
            _pad: 0,
        }
    }
}

/// `DebugParams` in `debug.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DebugParams {
    pub point_count: u32,
    pub scale: f32,
    pub _pad: [u32; 2],
}

impl DebugParams {
    pub fn new(config: &ChainConfig) -> Self {
        Self {
            point_count: config.point_count,
            scale: config.position_scale,
            _pad: [0; 2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ColorLaw, CorrectionSign, ForwardBlend};

    #[test]
    fn test_uniform_sizes_are_16_byte_multiples() {
        assert_eq!(std::mem::size_of::<SimParams>(), 96);
        assert_eq!(std::mem::size_of::<RibbonParams>(), 48);
        assert_eq!(std::mem::size_of::<DebugParams>(), 16);
    }

    #[test]
    fn test_sim_params_from_config() {
        let config = ChainConfig::default()
            .with_forward_blend(ForwardBlend::Smoothstep { edge: 0.2 });
        let pointer = PointerState {
            x: 0.5,
            y: -0.5,
            pressed: true,
        };
        let params = SimParams::new(&config, pointer, Viewport::new(1280, 720), 3.5);

        assert_eq!(params.pointer, [0.5, -0.5, 1.0, 0.0]);
        assert_eq!(params.view, [1280.0, 720.0]);
        assert_eq!(params.time, 3.5);
        assert_eq!(params.point_count, 101);
        assert_eq!(params.window, 11);
        assert!((params.head_step - 0.75).abs() < 1e-6);
        assert_eq!(params.blend_edge, 0.2);
        assert_eq!(params.tangent_mode, 0);
        assert_eq!(params.correction_sign, 1.0);

        let toward = config.with_correction(CorrectionSign::TowardLine);
        let params = SimParams::new(&toward, pointer, Viewport::new(1280, 720), 3.5);
        assert_eq!(params.correction_sign, -1.0);
    }

    #[test]
    fn test_ribbon_params_from_config() {
        let config = ChainConfig::default().with_color(ColorLaw::Parametric);
        let params = RibbonParams::new(&config, Viewport::new(1000, 500));

        assert_eq!(params.squash, [0.5, 1.0]);
        assert_eq!(params.render_points, 400);
        assert_eq!(params.state_points, 101);
        assert_eq!(params.color_law, 1);
        assert_eq!(params.color, [1.0; 4]);
    }
}
