//! Criterion benchmarks for the tracker calls.
//!
//! Run with: cargo bench --bench tracker
//! Run specific group: cargo bench -- byte_track

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

use deepsort_cascade_rs::{
    Assigner, GreedyAssigner, HungarianAssigner, NoOpReporter, ScenarioConfig, ScenarioFrame,
    ScenarioGenerator, Tracker, TrackerConfig,
};

// =============================================================================
// Helpers
// =============================================================================

fn frames(objects_per_class: usize, feature_dim: Option<usize>) -> Vec<ScenarioFrame> {
    let config = ScenarioConfig {
        num_frames: 100,
        objects_per_class,
        classes: (0..4).map(deepsort_cascade_rs::ClassId).collect(),
        clutter_rate: 2.0,
        feature_dim,
        ..ScenarioConfig::default()
    };
    match ScenarioGenerator::new(config, 42) {
        Ok(mut g) => g.generate(),
        Err(e) => panic!("invalid benchmark scenario: {}", e),
    }
}

fn run_frames<A: Assigner>(tracker: &mut Tracker<NoOpReporter, A>, frames: &mut [ScenarioFrame], reid: bool) {
    for frame in frames.iter_mut() {
        let _ = tracker.byte_track_objects(&mut frame.detections, reid);
    }
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_byte_track(c: &mut Criterion) {
    let mut group = c.benchmark_group("byte_track");
    group.measurement_time(Duration::from_secs(5));

    for objects in [2, 8, 16] {
        let scenario = frames(objects, None);

        group.bench_with_input(BenchmarkId::new("hungarian", objects), &scenario, |b, s| {
            b.iter_batched(
                || s.clone(),
                |mut s| {
                    let mut tracker =
                        Tracker::with_parts(TrackerConfig::default(), NoOpReporter, HungarianAssigner::new())
                            .unwrap();
                    run_frames(&mut tracker, &mut s, false);
                },
                BatchSize::LargeInput,
            )
        });

        group.bench_with_input(BenchmarkId::new("greedy", objects), &scenario, |b, s| {
            b.iter_batched(
                || s.clone(),
                |mut s| {
                    let mut tracker =
                        Tracker::with_parts(TrackerConfig::default(), NoOpReporter, GreedyAssigner::new())
                            .unwrap();
                    run_frames(&mut tracker, &mut s, false);
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn bench_reid(c: &mut Criterion) {
    let mut group = c.benchmark_group("reid");
    group.measurement_time(Duration::from_secs(5));

    for dim in [64, 256] {
        let scenario = frames(8, Some(dim));
        group.bench_with_input(BenchmarkId::new("feature_dim", dim), &scenario, |b, s| {
            b.iter_batched(
                || s.clone(),
                |mut s| {
                    let mut tracker = Tracker::new(TrackerConfig::default()).unwrap();
                    run_frames(&mut tracker, &mut s, true);
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn bench_assigners(c: &mut Criterion) {
    let mut group = c.benchmark_group("assigners");
    let mut rng = StdRng::seed_from_u64(7);

    for n in [8, 32, 64] {
        let cost = Array2::from_shape_fn((n, n), |_| {
            if rng.gen_bool(0.3) {
                f64::INFINITY
            } else {
                rng.gen_range(0.0..1.0)
            }
        });
        group.bench_with_input(BenchmarkId::new("hungarian", n), &cost, |b, m| {
            b.iter(|| HungarianAssigner::new().assign(m))
        });
        group.bench_with_input(BenchmarkId::new("greedy", n), &cost, |b, m| {
            b.iter(|| GreedyAssigner::new().assign(m))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_byte_track, bench_reid, bench_assigners);
criterion_main!(benches);
