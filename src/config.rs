//! Startup configuration for the chain.
//!
//! Every constant the passes use lives in [`ChainConfig`]. Values are fixed
//! once the simulation starts; they can come from [`Default`], the builder
//! methods, a JSON file, or the command line.
//!
//! ```ignore
//! let config = ChainConfig::default()
//!     .with_point_count(201)
//!     .with_spacing(2.5)
//!     .with_color(ColorLaw::Parametric)
//!     .sanitized();
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ChainError;

/// How the interior pass estimates the local tangent from its window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TangentEstimate {
    /// Plain sum of deviations from the window mean. The sum is zero up to
    /// rounding, so the direction it yields is mostly rounding noise.
    #[default]
    MeanDeviation,
    /// Deviations from the window mean weighted by their signed offset from
    /// the window center. Points from head toward tail.
    IndexWeighted,
}

impl TangentEstimate {
    /// Value written to the shader uniform.
    pub fn code(self) -> u32 {
        match self {
            TangentEstimate::MeanDeviation => 0,
            TangentEstimate::IndexWeighted => 1,
        }
    }
}

/// Direction of the perpendicular correction relative to the window line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionSign {
    /// `p += perp * dist / divisor`: the point's offset from the window mean
    /// grows along the perpendicular.
    #[default]
    AwayFromLine,
    /// `p -= perp * dist / divisor`: the point is pulled onto the line.
    TowardLine,
}

impl CorrectionSign {
    /// Factor applied to the correction, written to the shader uniform.
    pub fn factor(self) -> f32 {
        match self {
            CorrectionSign::AwayFromLine => 1.0,
            CorrectionSign::TowardLine => -1.0,
        }
    }
}

/// Forward projection used by [`ForwardBlend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForwardProjection {
    /// Step away from the next point by one head step.
    #[default]
    AwayFromNext,
    /// Step along the smoothed tangent by half the spacing.
    AlongTangent,
}

impl ForwardProjection {
    /// Value written to the shader uniform.
    pub fn code(self) -> u32 {
        match self {
            ForwardProjection::AwayFromNext => 0,
            ForwardProjection::AlongTangent => 1,
        }
    }
}

/// Blend between the forward projection and the constrained position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForwardBlend {
    /// Use the constrained position as is.
    #[default]
    Off,
    /// `mix(forward, constrained, smoothstep(0, edge, i / N))`.
    Smoothstep { edge: f32 },
}

impl ForwardBlend {
    /// Blend edge for the shader uniform, `0.0` meaning off.
    pub fn edge(self) -> f32 {
        match self {
            ForwardBlend::Off => 0.0,
            ForwardBlend::Smoothstep { edge } => edge,
        }
    }
}

/// Fill color of the ribbon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorLaw {
    /// A single RGBA color.
    Solid { color: [f32; 4] },
    /// Green-to-red gradient along the chain with fine banding, fading to
    /// black at the tail.
    Parametric,
}

impl Default for ColorLaw {
    fn default() -> Self {
        ColorLaw::Solid {
            color: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

impl ColorLaw {
    /// Value written to the shader uniform.
    pub fn code(self) -> u32 {
        match self {
            ColorLaw::Solid { .. } => 0,
            ColorLaw::Parametric => 1,
        }
    }

    /// Solid color, white when the law is parametric.
    pub fn base_color(self) -> [f32; 4] {
        match self {
            ColorLaw::Solid { color } => color,
            ColorLaw::Parametric => [1.0, 1.0, 1.0, 1.0],
        }
    }
}

/// Idle path of the head: `(sin t, sin(ratio * t)) * amplitude + offset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdleMotion {
    pub amplitude: f32,
    pub offset: f32,
    pub ratio: f32,
}

impl Default for IdleMotion {
    fn default() -> Self {
        Self {
            amplitude: 0.33,
            offset: 0.5,
            ratio: 1.8,
        }
    }
}

/// Chain configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Number of simulated points (texels in the state row).
    pub point_count: u32,
    /// Number of ribbon segments; the strip has twice as many vertices.
    pub render_points: u32,
    /// Distance kept between neighbors, in encoded units.
    pub spacing: f32,
    /// Smoothing window size, odd.
    pub window: u32,
    /// Largest perpendicular deviation the smoothing step reacts to.
    pub divergence: f32,
    /// The perpendicular correction is divided by this every frame.
    pub correction_divisor: f32,
    /// Maximum head step as a fraction of `spacing`.
    pub head_step_fraction: f32,
    /// Ribbon half width in decoded units.
    pub half_width: f32,
    pub idle: IdleMotion,
    /// Factor between normalized positions and stored texel values.
    pub position_scale: f32,
    /// Multiplier on the vertical seed jitter; 0 gives a straight chain.
    pub jitter: f32,
    /// Seed for the jitter. `None` seeds from entropy.
    pub seed: Option<u64>,
    pub tangent: TangentEstimate,
    pub correction: CorrectionSign,
    pub forward: ForwardProjection,
    pub forward_blend: ForwardBlend,
    pub color: ColorLaw,
    /// Start with the debug strip visible.
    pub debug_view: bool,
    /// Fixed simulation timestep in seconds.
    pub fixed_delta: Option<f32>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            point_count: 101,
            render_points: 400,
            spacing: 5.0,
            window: 11,
            divergence: 0.1,
            correction_divisor: 5.0,
            head_step_fraction: 0.15,
            half_width: 0.01,
            idle: IdleMotion::default(),
            position_scale: 255.0,
            jitter: 1.0,
            seed: None,
            tangent: TangentEstimate::default(),
            correction: CorrectionSign::default(),
            forward: ForwardProjection::default(),
            forward_blend: ForwardBlend::default(),
            color: ColorLaw::default(),
            debug_view: false,
            fixed_delta: None,
        }
    }
}

impl ChainConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ChainError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ChainError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ChainError::ConfigParse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn with_point_count(mut self, count: u32) -> Self {
        self.point_count = count;
        self
    }

    pub fn with_render_points(mut self, count: u32) -> Self {
        self.render_points = count;
        self
    }

    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_window(mut self, window: u32) -> Self {
        self.window = window;
        self
    }

    pub fn with_divergence(mut self, divergence: f32) -> Self {
        self.divergence = divergence;
        self
    }

    pub fn with_head_step_fraction(mut self, fraction: f32) -> Self {
        self.head_step_fraction = fraction;
        self
    }

    pub fn with_half_width(mut self, half_width: f32) -> Self {
        self.half_width = half_width;
        self
    }

    pub fn with_jitter(mut self, jitter: f32) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_tangent(mut self, tangent: TangentEstimate) -> Self {
        self.tangent = tangent;
        self
    }

    pub fn with_correction(mut self, correction: CorrectionSign) -> Self {
        self.correction = correction;
        self
    }

    pub fn with_forward(mut self, forward: ForwardProjection) -> Self {
        self.forward = forward;
        self
    }

    pub fn with_forward_blend(mut self, blend: ForwardBlend) -> Self {
        self.forward_blend = blend;
        self
    }

    pub fn with_color(mut self, color: ColorLaw) -> Self {
        self.color = color;
        self
    }

    pub fn with_debug_view(mut self, enabled: bool) -> Self {
        self.debug_view = enabled;
        self
    }

    pub fn with_fixed_delta(mut self, delta: Option<f32>) -> Self {
        self.fixed_delta = delta;
        self
    }

    /// Largest distance the head moves in one frame.
    #[inline]
    pub fn max_head_step(&self) -> f32 {
        self.spacing * self.head_step_fraction
    }

    /// Vertices in the ribbon strip.
    #[inline]
    pub fn render_vertex_count(&self) -> u32 {
        self.render_points * 2
    }

    /// Repair values the passes cannot use, logging each repair.
    ///
    /// Bad values never stop the chain from running; they are replaced with
    /// the closest usable setting.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        if self.point_count < 2 {
            log::warn!("point_count {} raised to 2", self.point_count);
            self.point_count = 2;
        }
        if self.render_points == 0 {
            log::warn!("render_points 0 raised to 1");
            self.render_points = 1;
        }
        if self.window % 2 == 0 {
            log::warn!("smoothing window {} is even, using {}", self.window, self.window + 1);
            self.window += 1;
        }
        if !(self.spacing.is_finite() && self.spacing > 0.0) {
            log::warn!("spacing {} unusable, using {}", self.spacing, defaults.spacing);
            self.spacing = defaults.spacing;
        }
        if !self.divergence.is_finite() || self.divergence < 0.0 {
            log::warn!("divergence {} unusable, using {}", self.divergence, defaults.divergence);
            self.divergence = defaults.divergence;
        }
        if !(self.correction_divisor.is_finite() && self.correction_divisor > 0.0) {
            log::warn!("correction_divisor {} unusable, using 1", self.correction_divisor);
            self.correction_divisor = 1.0;
        }
        if !self.head_step_fraction.is_finite() || self.head_step_fraction < 0.0 {
            log::warn!(
                "head_step_fraction {} unusable, using {}",
                self.head_step_fraction,
                defaults.head_step_fraction
            );
            self.head_step_fraction = defaults.head_step_fraction;
        }
        if !(self.position_scale.is_finite() && self.position_scale > 0.0) {
            log::warn!("position_scale {} unusable, using 255", self.position_scale);
            self.position_scale = defaults.position_scale;
        }
        if let ForwardBlend::Smoothstep { edge } = self.forward_blend {
            if !(edge.is_finite() && edge > 0.0) {
                log::warn!("forward blend edge {} unusable, blend disabled", edge);
                self.forward_blend = ForwardBlend::Off;
            }
        }
        if let Some(delta) = self.fixed_delta {
            if !(delta.is_finite() && delta > 0.0) {
                log::warn!("fixed_delta {} unusable, using real frame time", delta);
                self.fixed_delta = None;
            }
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ChainConfig::default();
        assert_eq!(config.point_count, 101);
        assert_eq!(config.render_vertex_count(), 800);
        assert_eq!(config.window, 11);
        assert!((config.max_head_step() - 0.75).abs() < 1e-6);
        assert_eq!(config.tangent, TangentEstimate::MeanDeviation);
        assert_eq!(config.tangent.code(), 0);
        assert_eq!(config.correction, CorrectionSign::AwayFromLine);
        assert_eq!(config.correction.factor(), 1.0);
        assert_eq!(config.color.code(), 0);
        assert_eq!(config.forward_blend.edge(), 0.0);
    }

    #[test]
    fn test_default_is_already_sane() {
        let config = ChainConfig::default();
        assert_eq!(config.clone().sanitized(), config);
    }

    #[test]
    fn test_sanitize_even_window() {
        let config = ChainConfig::default().with_window(10).sanitized();
        assert_eq!(config.window, 11);

        let config = ChainConfig::default().with_window(0).sanitized();
        assert_eq!(config.window, 1);
    }

    #[test]
    fn test_sanitize_repairs_bad_values() {
        let mut config = ChainConfig::default()
            .with_point_count(0)
            .with_spacing(-3.0)
            .with_divergence(f32::NAN)
            .with_forward_blend(ForwardBlend::Smoothstep { edge: 0.0 })
            .with_fixed_delta(Some(0.0));
        config.correction_divisor = 0.0;
        let config = config.sanitized();

        assert_eq!(config.point_count, 2);
        assert_eq!(config.spacing, 5.0);
        assert_eq!(config.divergence, 0.1);
        assert_eq!(config.correction_divisor, 1.0);
        assert_eq!(config.forward_blend, ForwardBlend::Off);
        assert_eq!(config.fixed_delta, None);
    }

    #[test]
    fn test_json_round_trip() {
        let config = ChainConfig::default()
            .with_seed(7)
            .with_tangent(TangentEstimate::IndexWeighted)
            .with_correction(CorrectionSign::TowardLine)
            .with_forward_blend(ForwardBlend::Smoothstep { edge: 0.2 })
            .with_color(ColorLaw::Parametric);
        let json = serde_json::to_string(&config).unwrap();
        let back: ChainConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ChainConfig =
            serde_json::from_str(r#"{ "point_count": 33, "idle": { "ratio": 2.0 } }"#).unwrap();
        assert_eq!(config.point_count, 33);
        assert_eq!(config.idle.ratio, 2.0);
        assert_eq!(config.idle.amplitude, 0.33);
        assert_eq!(config.spacing, 5.0);
    }

    #[test]
    fn test_color_law_json() {
        let law: ColorLaw =
            serde_json::from_str(r#"{ "solid": { "color": [1.0, 0.0, 0.0, 1.0] } }"#).unwrap();
        assert_eq!(law.base_color(), [1.0, 0.0, 0.0, 1.0]);
        let law: ColorLaw = serde_json::from_str(r#""parametric""#).unwrap();
        assert_eq!(law, ColorLaw::Parametric);
    }

    #[test]
    fn test_missing_config_file() {
        let err = ChainConfig::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ChainError::ConfigRead { .. }));
    }
}
