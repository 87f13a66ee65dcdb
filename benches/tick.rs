//! Benchmarks for the per-tick CPU cost.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec2;
use murmur::prelude::*;
use murmur::NeighborQuery;

fn running(scenario: Scenario, count: u32) -> Flock {
    let mut flock = scenario
        .simulation(count)
        .with_seed(7)
        .build()
        .expect("preset builds");
    flock.start().expect("fresh flock starts");
    flock
}

fn bench_step_per_scenario(c: &mut Criterion) {
    let mut group = c.benchmark_group("step");

    for scenario in Scenario::ALL {
        group.bench_function(scenario.name(), |b| {
            let mut flock = running(scenario, 30);
            b.iter(|| black_box(flock.step().expect("flock is running")))
        });
    }

    group.finish();
}

fn bench_step_population(c: &mut Criterion) {
    let mut group = c.benchmark_group("population");

    for count in [30, 100, 300] {
        group.bench_with_input(BenchmarkId::new("plain", count), &count, |b, &count| {
            let mut flock = running(Scenario::Plain, count);
            b.iter(|| black_box(flock.step().expect("flock is running")))
        });
    }

    group.finish();
}

fn bench_neighbor_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("neighbors");
    let config = FlockConfig::default();
    let query = NeighborQuery::from_config(&config);

    let agents: Vec<Agent> = (0..200)
        .map(|i| {
            let x = 200.0 + (i % 20) as f32 * 30.0;
            let y = 100.0 + (i / 20) as f32 * 30.0;
            Agent::new(Vec2::new(x, y), i as f32 * 0.1, 3.0)
        })
        .collect();

    group.bench_function("neighborhood_200", |b| {
        b.iter(|| black_box(query.neighborhood(black_box(105), &agents)))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_step_per_scenario,
    bench_step_population,
    bench_neighbor_query,
);
criterion_main!(benches);
