//! End-to-end scenarios for the CPU chain.
//!
//! These run the same step the compute shader runs, frame by frame through a
//! fixed-delta clock, and check the chain's shape and the head's path.

use glam::Vec2;
use ropeline::chain::{idle_target, pointer_target};
use ropeline::input::{PointerState, Viewport};
use ropeline::time::FrameClock;
use ropeline::{ChainConfig, ChainSolver, CorrectionSign, StepInput, TangentEstimate};

const DT: f32 = 1.0 / 60.0;

fn idle_config() -> ChainConfig {
    ChainConfig::default().with_jitter(0.0).with_seed(0)
}

fn idle_input(time: f32) -> StepInput {
    StepInput {
        pointer: PointerState::default(),
        viewport: Viewport::new(800, 800),
        time,
    }
}

/// Largest `| |next[i] - current[i-1]| - spacing |` over the chain.
fn max_link_error(before: &[Vec2], after: &[Vec2], spacing: f32) -> f32 {
    (1..after.len())
        .map(|i| (after[i].distance(before[i - 1]) - spacing).abs())
        .fold(0.0, f32::max)
}

// ============================================================================
// Idle run
// ============================================================================

#[test]
fn test_idle_run_keeps_links() {
    let config = idle_config();
    let tolerance = config.max_head_step() * 1.1;
    let settle = 2 * u64::from(config.point_count);
    let mut clock = FrameClock::with_fixed_delta(DT);
    let mut solver = ChainSolver::new(config);

    for _ in 0..500 {
        let tick = clock.advance().expect("clock is never paused");
        let before = solver.positions().to_vec();
        solver.step(&idle_input(tick.elapsed));

        let links = max_link_error(&before, solver.positions(), solver.config().spacing);
        assert!(links < 1e-3, "frame {}: link error {links}", tick.frame);

        if tick.frame >= settle {
            let error = solver.max_spacing_error();
            assert!(
                error <= tolerance,
                "frame {}: adjacent error {error} > {tolerance}",
                tick.frame
            );
        }
    }
}

#[test]
fn test_idle_head_follows_closed_form_chase() {
    let config = idle_config();
    let scale = config.position_scale;
    let max_step = config.max_head_step();
    let mut clock = FrameClock::with_fixed_delta(DT);
    let mut solver = ChainSolver::new(config.clone());

    let mut expected = solver.positions()[0];
    for _ in 0..500 {
        let tick = clock.advance().expect("clock is never paused");
        solver.step(&idle_input(tick.elapsed));

        let offset = idle_target(tick.elapsed, &config.idle, scale) - expected;
        let dist = offset.length();
        if dist > 1e-6 {
            expected += offset / dist * dist.min(max_step);
        }

        let head = solver.positions()[0];
        assert!(
            head.distance(expected) < 1e-3,
            "frame {}: head {head:?}, expected {expected:?}",
            tick.frame
        );
    }
}

#[test]
fn test_idle_head_stays_in_idle_box() {
    let config = idle_config();
    let idle = config.idle;
    let lo = (idle.offset - idle.amplitude) * config.position_scale - 1e-3;
    let hi = (idle.offset + idle.amplitude) * config.position_scale + 1e-3;
    let mut clock = FrameClock::with_fixed_delta(DT);
    let mut solver = ChainSolver::new(config);

    let head = solver.positions()[0];
    assert!(head.cmpge(Vec2::splat(lo)).all() && head.cmple(Vec2::splat(hi)).all());

    for _ in 0..500 {
        let tick = clock.advance().expect("clock is never paused");
        solver.step(&idle_input(tick.elapsed));
        let head = solver.positions()[0];
        assert!(
            head.cmpge(Vec2::splat(lo)).all() && head.cmple(Vec2::splat(hi)).all(),
            "frame {}: head {head:?} left [{lo}, {hi}]",
            tick.frame
        );
    }
}

#[test]
fn test_idle_config_uses_plain_tangent_and_outward_correction() {
    let config = idle_config();
    assert_eq!(config.tangent, TangentEstimate::MeanDeviation);
    assert_eq!(config.correction, CorrectionSign::AwayFromLine);
}

#[test]
fn test_weighted_tangent_pulling_inward_keeps_links() {
    let config = idle_config()
        .with_tangent(TangentEstimate::IndexWeighted)
        .with_correction(CorrectionSign::TowardLine);
    let mut clock = FrameClock::with_fixed_delta(DT);
    let mut solver = ChainSolver::new(config);

    for _ in 0..300 {
        let tick = clock.advance().expect("clock is never paused");
        let before = solver.positions().to_vec();
        solver.step(&idle_input(tick.elapsed));
        let links = max_link_error(&before, solver.positions(), solver.config().spacing);
        assert!(links < 1e-3, "frame {}: link error {links}", tick.frame);
        assert!(solver.positions().iter().all(|p| p.is_finite()));
    }
}

// ============================================================================
// Pressed pointer
// ============================================================================

#[test]
fn test_head_converges_to_stationary_pointer() {
    let config = idle_config();
    let max_step = config.max_head_step();
    let viewport = Viewport::new(800, 800);
    let pointer = PointerState {
        x: 0.2,
        y: -0.3,
        pressed: true,
    };
    let goal = pointer_target(&pointer, viewport, config.position_scale);
    let mut solver = ChainSolver::new(config);

    let mut last_dist = solver.positions()[0].distance(goal);
    let mut last_head = solver.positions()[0];
    for frame in 0..200 {
        solver.step(&StepInput {
            pointer,
            viewport,
            time: frame as f32 * DT,
        });
        let head = solver.positions()[0];
        let dist = head.distance(goal);

        assert!(dist <= last_dist + 1e-4, "frame {frame}: {dist} > {last_dist}");
        assert!(head.distance(last_head) <= max_step + 1e-4);
        last_dist = dist;
        last_head = head;
    }

    assert!(last_dist < 1e-3, "head did not arrive: {last_dist}");
}

#[test]
fn test_pointer_on_wide_surface_is_stretched() {
    let config = idle_config();
    let pointer = PointerState {
        x: 0.5,
        y: 0.5,
        pressed: true,
    };
    let square = pointer_target(&pointer, Viewport::new(800, 800), config.position_scale);
    let wide = pointer_target(&pointer, Viewport::new(1600, 800), config.position_scale);

    assert_eq!(square.y, wide.y);
    assert!(wide.x > square.x);
}

// ============================================================================
// Degenerate starts
// ============================================================================

#[test]
fn test_coincident_start_stays_finite() {
    let config = idle_config();
    let spacing = config.spacing;
    let start = vec![Vec2::splat(100.0); 101];
    let mut solver = ChainSolver::from_positions(config, start.clone());

    solver.step(&idle_input(0.0));

    assert!(solver.positions().iter().all(|p| p.is_finite()));
    assert!(max_link_error(&start, solver.positions(), spacing) < 1e-3);

    for frame in 1..60 {
        solver.step(&idle_input(frame as f32 * DT));
        assert!(solver.positions().iter().all(|p| p.is_finite()));
    }
}

#[test]
fn test_two_point_chain() {
    let config = idle_config();
    let mut solver = ChainSolver::from_positions(
        config,
        vec![Vec2::new(127.5, 127.5), Vec2::new(132.5, 127.5)],
    );
    for frame in 0..100 {
        let before = solver.positions().to_vec();
        solver.step(&idle_input(frame as f32 * DT));
        assert!(max_link_error(&before, solver.positions(), 5.0) < 1e-3);
    }
}
