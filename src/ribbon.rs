//! Ribbon expansion.
//!
//! CPU form of the vertex and fragment logic in `ribbon.wgsl`. The chain is
//! sampled at `render_points` evenly spaced parameters; each parameter yields
//! a vertex pair offset to either side of the local tangent, which together
//! form a triangle strip of constant width.

use glam::{Vec2, Vec3, Vec4};

use crate::chain::{safe_normalize, smoothstep};
use crate::config::{ChainConfig, ColorLaw};
use crate::input::Viewport;

/// Sample the chain at parameter `t` in `[0, 1]`, decoded to `[0, 1]` space.
///
/// Matches linear texture filtering of a 1×N row: texel centers sit at
/// `(i + 0.5) / N` and parameters outside the centers clamp to the edge
/// texel.
pub fn sample(points: &[Vec2], t: f32, scale: f32) -> Vec2 {
    let n = points.len();
    if n == 0 {
        return Vec2::ZERO;
    }
    let last = n as i64 - 1;
    let x = t * n as f32 - 0.5;
    let base = x.floor();
    let frac = x - base;
    let i0 = (base as i64).clamp(0, last) as usize;
    let i1 = (base as i64 + 1).clamp(0, last) as usize;
    points[i0].lerp(points[i1], frac) / scale
}

/// Clip-space position of strip vertex `vertex_index`.
pub fn ribbon_vertex(
    points: &[Vec2],
    vertex_index: u32,
    config: &ChainConfig,
    viewport: Viewport,
) -> Vec2 {
    let v = (vertex_index / 2) as f32;
    let side = (vertex_index % 2) as f32 * 2.0 - 1.0;
    let count = config.render_points as f32;

    let mut pos = sample(points, v / count, config.position_scale);
    let ahead = sample(points, (v + 1.0) / count, config.position_scale);
    let normal = safe_normalize(ahead - pos, Vec2::ZERO);
    let perp = Vec2::new(normal.y, -normal.x);

    pos += perp * config.half_width * side;
    pos = pos * 2.0 - 1.0;
    pos * viewport.clip_squash()
}

/// All strip vertices for the current chain.
pub fn ribbon_vertices(points: &[Vec2], config: &ChainConfig, viewport: Viewport) -> Vec<Vec2> {
    (0..config.render_vertex_count())
        .map(|k| ribbon_vertex(points, k, config, viewport))
        .collect()
}

/// Fragment color at chain parameter `t`.
pub fn color_at(law: ColorLaw, t: f32) -> Vec4 {
    match law {
        ColorLaw::Solid { color } => Vec4::from_array(color),
        ColorLaw::Parametric => {
            let on = smoothstep(0.0, 0.5, t);
            let base = Vec3::new(on, 1.0 - on, 1.0);
            let band = (t * 1000.0).cos() * 0.5 + 0.5;
            let col = base.lerp(base * 0.25, band) * (1.0 - t);
            col.extend(1.0)
        }
    }
}
