use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use ropeline::prelude::*;
use ropeline::ribbon;
use ropeline::time::FrameTick;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Tangent {
    /// Plain sum of deviations from the window mean (default)
    Mean,
    /// Deviations weighted by their offset in the window
    Weighted,
}

impl From<Tangent> for TangentEstimate {
    fn from(t: Tangent) -> Self {
        match t {
            Tangent::Mean => TangentEstimate::MeanDeviation,
            Tangent::Weighted => TangentEstimate::IndexWeighted,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Correction {
    /// Push away from the window line (default)
    Away,
    /// Pull toward the window line
    Toward,
}

impl From<Correction> for CorrectionSign {
    fn from(c: Correction) -> Self {
        match c {
            Correction::Away => CorrectionSign::AwayFromLine,
            Correction::Toward => CorrectionSign::TowardLine,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Forward {
    /// Step away from the next point (default)
    AwayFromNext,
    /// Half a spacing along the window direction
    AlongTangent,
}

impl From<Forward> for ForwardProjection {
    fn from(f: Forward) -> Self {
        match f {
            Forward::AwayFromNext => ForwardProjection::AwayFromNext,
            Forward::AlongTangent => ForwardProjection::AlongTangent,
        }
    }
}

/// Rope chain chasing the pointer.
#[derive(Debug, Parser)]
#[command(name = "ropeline", version, about)]
struct Args {
    /// JSON configuration file; flags below override it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of simulated points
    #[arg(long, value_name = "N")]
    points: Option<u32>,

    /// Number of ribbon segments
    #[arg(long, value_name = "N")]
    render_points: Option<u32>,

    /// Distance between neighbors, in encoded units
    #[arg(long)]
    spacing: Option<f32>,

    /// Smoothing window size (odd)
    #[arg(long)]
    window: Option<u32>,

    /// Largest perpendicular deviation that is corrected
    #[arg(long)]
    divergence: Option<f32>,

    /// Maximum head step as a fraction of the spacing
    #[arg(long, value_name = "FRACTION")]
    head_step: Option<f32>,

    /// Ribbon half width, in normalized units
    #[arg(long)]
    half_width: Option<f32>,

    /// Seed for the initial jitter
    #[arg(long)]
    seed: Option<u64>,

    /// Multiplier on the initial vertical jitter
    #[arg(long)]
    jitter: Option<f32>,

    /// Tangent estimate for the smoothing step [default: mean]
    #[arg(long, value_enum)]
    tangent: Option<Tangent>,

    /// Direction of the perpendicular correction [default: away]
    #[arg(long, value_enum)]
    correction: Option<Correction>,

    /// Forward projection used by --forward-blend [default: away-from-next]
    #[arg(long, value_enum)]
    forward: Option<Forward>,

    /// Blend the forward projection in near the head, up to this chain parameter
    #[arg(long, value_name = "EDGE")]
    forward_blend: Option<f32>,

    /// Color the ribbon with the parametric gradient
    #[arg(long)]
    parametric_color: bool,

    /// Start with the raw state strip visible
    #[arg(long)]
    debug: bool,

    /// Fixed timestep in seconds instead of wall time
    #[arg(long, value_name = "DT")]
    fixed_delta: Option<f32>,

    /// Run this many frames on the CPU without a window and print a summary
    #[arg(long, value_name = "FRAMES")]
    headless: Option<u64>,
}

impl Args {
    fn chain_config(&self) -> Result<ChainConfig, ChainError> {
        let mut config = match &self.config {
            Some(path) => ChainConfig::from_json_file(path)?,
            None => ChainConfig::default(),
        };

        if let Some(n) = self.points {
            config = config.with_point_count(n);
        }
        if let Some(n) = self.render_points {
            config = config.with_render_points(n);
        }
        if let Some(s) = self.spacing {
            config = config.with_spacing(s);
        }
        if let Some(w) = self.window {
            config = config.with_window(w);
        }
        if let Some(d) = self.divergence {
            config = config.with_divergence(d);
        }
        if let Some(f) = self.head_step {
            config = config.with_head_step_fraction(f);
        }
        if let Some(h) = self.half_width {
            config = config.with_half_width(h);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(j) = self.jitter {
            config = config.with_jitter(j);
        }
        if let Some(t) = self.tangent {
            config = config.with_tangent(t.into());
        }
        if let Some(c) = self.correction {
            config = config.with_correction(c.into());
        }
        if let Some(f) = self.forward {
            config = config.with_forward(f.into());
        }
        if let Some(edge) = self.forward_blend {
            config = config.with_forward_blend(ForwardBlend::Smoothstep { edge });
        }
        if self.parametric_color {
            config = config.with_color(ColorLaw::Parametric);
        }
        if self.debug {
            config = config.with_debug_view(true);
        }
        if self.fixed_delta.is_some() {
            config = config.with_fixed_delta(self.fixed_delta);
        }

        Ok(config.sanitized())
    }
}

/// Idle run on the CPU solver, logging how the chain behaves.
fn run_headless(config: ChainConfig, frames: u64) {
    let delta = config.fixed_delta.unwrap_or(1.0 / 60.0);
    let mut clock = FrameClock::with_fixed_delta(delta);
    let viewport = Viewport::new(800, 800);
    let mut solver = ChainSolver::new(config);
    let mut worst_error = 0.0_f32;

    log::info!(
        "Headless run: {} frames of {} points at {:.4}s",
        frames,
        solver.config().point_count,
        delta
    );

    for _ in 0..frames {
        let Some(FrameTick { elapsed, frame, .. }) = clock.advance() else {
            break;
        };
        solver.step(&StepInput {
            pointer: PointerState::default(),
            viewport,
            time: elapsed,
        });

        let error = solver.max_spacing_error();
        if frame > 2 * u64::from(solver.config().point_count) {
            worst_error = worst_error.max(error);
        }
        if frame % 100 == 0 {
            log::debug!("frame {frame}: head {:?}, spacing error {error:.4}", solver.positions()[0]);
        }
    }

    let positions = solver.positions();
    let vertices = ribbon::ribbon_vertices(positions, solver.config(), viewport);
    let (min, max) = vertices.iter().fold(
        (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
        |(min, max), v| (min.min(*v), max.max(*v)),
    );

    log::info!("Head at {:?} after {} steps", positions[0], solver.frame());
    log::info!("Worst settled spacing error {worst_error:.4}");
    log::info!("Ribbon bounds {min:?} .. {max:?} ({} vertices)", vertices.len());
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = match args.chain_config() {
        Ok(config) => config,
        Err(err) => {
            log::error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(frames) = args.headless {
        run_headless(config, frames);
        return ExitCode::SUCCESS;
    }

    match Simulation::new(config).run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ChainConfig {
        let args = Args::try_parse_from(std::iter::once("ropeline").chain(args.iter().copied()))
            .expect("arguments parse");
        args.chain_config().expect("config builds")
    }

    #[test]
    fn test_defaults_without_flags() {
        let config = parse(&[]);
        assert_eq!(config.tangent, TangentEstimate::MeanDeviation);
        assert_eq!(config.correction, CorrectionSign::AwayFromLine);
        assert_eq!(config.forward, ForwardProjection::AwayFromNext);
    }

    #[test]
    fn test_strategy_flags_override_defaults() {
        let config = parse(&[
            "--tangent",
            "weighted",
            "--correction",
            "toward",
            "--forward",
            "along-tangent",
            "--forward-blend",
            "0.3",
        ]);
        assert_eq!(config.tangent, TangentEstimate::IndexWeighted);
        assert_eq!(config.correction, CorrectionSign::TowardLine);
        assert_eq!(config.forward, ForwardProjection::AlongTangent);
        assert_eq!(config.forward_blend, ForwardBlend::Smoothstep { edge: 0.3 });
    }

    #[test]
    fn test_unknown_forward_value_is_rejected() {
        let args = ["ropeline", "--forward", "sideways"];
        assert!(Args::try_parse_from(args).is_err());
    }
}
