//! Chain simulation step.
//!
//! This is the CPU form of `simulate.wgsl`, operation for operation. Each
//! point's next position depends only on the current buffer, so the step is
//! a plain loop reading `current` and writing `next`.
//!
//! Per point:
//! - the head steps toward the pointer (while pressed) or the idle path,
//!   never farther than `spacing * head_step_fraction`;
//! - every other point takes a window of neighbors, is nudged along the
//!   perpendicular of the window direction by its clamped offset from the
//!   window mean, then is re-projected to lie exactly `spacing` away from its
//!   predecessor.

use glam::Vec2;

use crate::config::{ChainConfig, ForwardBlend, ForwardProjection, IdleMotion, TangentEstimate};
use crate::input::{PointerState, Viewport};
use crate::state::{seed_positions, DoubleBuffer};

/// Vectors shorter than this count as zero when normalizing.
pub const EPSILON: f32 = 1e-6;

/// `v` normalized, or `fallback` when `v` is too short to have a direction.
#[inline]
pub fn safe_normalize(v: Vec2, fallback: Vec2) -> Vec2 {
    let len = v.length();
    if len > EPSILON {
        v / len
    } else {
        fallback
    }
}

/// Hermite step between `edge0` and `edge1`, as in WGSL.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Idle target of the head at time `t`, in encoded units.
pub fn idle_target(t: f32, idle: &IdleMotion, scale: f32) -> Vec2 {
    let wave = Vec2::new(t.sin(), (t * idle.ratio).sin());
    (wave * idle.amplitude + idle.offset) * scale
}

/// Pointer position in encoded units, stretched along the longer axis.
pub fn pointer_target(pointer: &PointerState, viewport: Viewport, scale: f32) -> Vec2 {
    let m = pointer.position() * viewport.pointer_stretch();
    (m * 0.5 + 0.5) * scale
}

/// Everything a step reads besides the chain itself.
#[derive(Debug, Clone, Copy)]
pub struct StepInput {
    pub pointer: PointerState,
    pub viewport: Viewport,
    /// Elapsed seconds, phase of the idle motion.
    pub time: f32,
}

/// Head target for this step.
pub fn head_target(config: &ChainConfig, input: &StepInput) -> Vec2 {
    if input.pointer.pressed {
        pointer_target(&input.pointer, input.viewport, config.position_scale)
    } else {
        idle_target(input.time, &config.idle, config.position_scale)
    }
}

/// Move the head toward `goal` by at most the configured head step.
pub fn step_head(config: &ChainConfig, head: Vec2, goal: Vec2) -> Vec2 {
    let offset = goal - head;
    let dist = offset.length();
    if dist <= EPSILON {
        return head;
    }
    head + offset / dist * dist.min(config.max_head_step())
}

/// Next position of interior or tail point `index` (> 0).
pub fn step_interior(config: &ChainConfig, current: &[Vec2], index: usize) -> Vec2 {
    let last = current.len() as i64 - 1;
    let half = (config.window / 2) as i64;
    let load = |offset: i64| current[(index as i64 + offset).clamp(0, last) as usize];

    let mut mean = Vec2::ZERO;
    for k in -half..=half {
        mean += load(k);
    }
    mean /= config.window as f32;

    let mut tangent = Vec2::ZERO;
    for k in -half..=half {
        let deviation = load(k) - mean;
        tangent += match config.tangent {
            TangentEstimate::MeanDeviation => deviation,
            TangentEstimate::IndexWeighted => deviation * k as f32,
        };
    }
    let dir = safe_normalize(tangent, Vec2::ZERO);

    let mut p = current[index];

    let forward = match config.forward {
        ForwardProjection::AwayFromNext => {
            p + safe_normalize(p - load(1), Vec2::ZERO) * config.max_head_step()
        }
        ForwardProjection::AlongTangent => p + dir * config.spacing * 0.5,
    };

    let perp = Vec2::new(dir.y, -dir.x);
    let line_dist = perp
        .dot(p - mean)
        .clamp(-config.divergence, config.divergence);
    p += perp * line_dist * config.correction.factor() / config.correction_divisor;

    let prev = current[index - 1];
    let fallback = if dir == Vec2::ZERO { Vec2::X } else { dir };
    p = prev + safe_normalize(p - prev, fallback) * config.spacing;

    if let ForwardBlend::Smoothstep { edge } = config.forward_blend {
        let t = index as f32 / config.point_count as f32;
        p = forward.lerp(p, smoothstep(0.0, edge, t));
    }

    p
}

/// Compute every point of `next` from `current`.
pub fn step(config: &ChainConfig, input: &StepInput, current: &[Vec2], next: &mut [Vec2]) {
    debug_assert_eq!(current.len(), next.len());
    if current.is_empty() {
        return;
    }

    next[0] = step_head(config, current[0], head_target(config, input));
    for index in 1..current.len() {
        next[index] = step_interior(config, current, index);
    }
}

/// Chain simulated on the CPU with double-buffered state.
///
/// Used for headless runs, tests and benchmarks. The GPU path runs the same
/// step in `simulate.wgsl`.
#[derive(Debug)]
pub struct ChainSolver {
    config: ChainConfig,
    buffers: DoubleBuffer<Vec<Vec2>>,
}

impl ChainSolver {
    /// Seed a chain from `config`.
    pub fn new(config: ChainConfig) -> Self {
        let positions = seed_positions(&config);
        Self::from_positions(config, positions)
    }

    /// Start from explicit encoded positions. The chain length is taken from
    /// `positions`, overriding `config.point_count`.
    pub fn from_positions(config: ChainConfig, positions: Vec<Vec2>) -> Self {
        let mut config = config.sanitized();
        config.point_count = positions.len() as u32;
        let scratch = positions.clone();
        Self {
            config,
            buffers: DoubleBuffer::new(positions, scratch),
        }
    }

    #[inline]
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Positions after the latest step, in encoded units.
    #[inline]
    pub fn positions(&self) -> &[Vec2] {
        self.buffers.current()
    }

    /// Steps taken so far.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.buffers.frame()
    }

    /// Run one frame and swap buffers.
    pub fn step(&mut self, input: &StepInput) {
        let (current, next) = self.buffers.split();
        step(&self.config, input, current, next);
        self.buffers.swap();
    }

    /// Largest deviation from `spacing` between neighbors of the latest
    /// buffer.
    pub fn max_spacing_error(&self) -> f32 {
        self.positions()
            .windows(2)
            .map(|pair| (pair[0].distance(pair[1]) - self.config.spacing).abs())
            .fold(0.0, f32::max)
    }
}
