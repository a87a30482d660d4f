//! Benchmarks for the CPU chain step and ribbon expansion.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use ropeline::input::{PointerState, Viewport};
use ropeline::ribbon;
use ropeline::{ChainConfig, ChainSolver, StepInput, TangentEstimate};

fn idle_input(time: f32) -> StepInput {
    StepInput {
        pointer: PointerState::default(),
        viewport: Viewport::new(800, 800),
        time,
    }
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain_step");

    for points in [101_u32, 1_001, 10_001] {
        group.bench_with_input(BenchmarkId::new("default", points), &points, |b, &n| {
            let config = ChainConfig::default().with_point_count(n).with_seed(1);
            let mut solver = ChainSolver::new(config);
            let mut time = 0.0;
            b.iter(|| {
                time += 1.0 / 60.0;
                solver.step(black_box(&idle_input(time)));
            })
        });
    }

    group.bench_function("index_weighted_101", |b| {
        let config = ChainConfig::default()
            .with_tangent(TangentEstimate::IndexWeighted)
            .with_seed(1);
        let mut solver = ChainSolver::new(config);
        let mut time = 0.0;
        b.iter(|| {
            time += 1.0 / 60.0;
            solver.step(black_box(&idle_input(time)));
        })
    });

    group.bench_function("wide_window_101", |b| {
        let config = ChainConfig::default().with_window(31).with_seed(1);
        let mut solver = ChainSolver::new(config);
        let mut time = 0.0;
        b.iter(|| {
            time += 1.0 / 60.0;
            solver.step(black_box(&idle_input(time)));
        })
    });

    group.finish();
}

fn bench_ribbon(c: &mut Criterion) {
    let mut group = c.benchmark_group("ribbon");

    let config = ChainConfig::default().with_seed(1);
    let solver = ChainSolver::new(config.clone());
    let viewport = Viewport::new(1280, 720);

    group.bench_function("vertices_400", |b| {
        b.iter(|| black_box(ribbon::ribbon_vertices(solver.positions(), &config, viewport)))
    });

    group.finish();
}

criterion_group!(benches, bench_step, bench_ribbon);
criterion_main!(benches);
