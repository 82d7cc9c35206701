//! Performance benchmarks for the hot paths of the workload engine
//!
//! The aggregator's record path and the traffic synthesizer run once per
//! simulated request across every virtual user, so their overhead bounds
//! the request rates the tool can generate.

use cache_load_tester::{
    models::{OpCategory, OperationOutcome},
    stats::StatsAggregator,
    workload::{filler_value, TrafficSynthesizer},
};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use std::time::Duration;

fn bench_stats_record(c: &mut Criterion) {
    let stats = StatsAggregator::new();
    let outcome = OperationOutcome::success(OpCategory::GetHit, Duration::from_millis(1));

    c.bench_function("stats_record", |b| {
        b.iter(|| stats.record(black_box(&outcome)))
    });
}

fn bench_stats_snapshot(c: &mut Criterion) {
    let stats = StatsAggregator::new();
    for category in [
        OpCategory::GetHit,
        OpCategory::SetHit,
        OpCategory::GetMiss,
        OpCategory::SetMiss,
    ] {
        for i in 0..1000u64 {
            stats.record(&OperationOutcome::success(
                category,
                Duration::from_micros(100 + i),
            ));
        }
    }

    c.bench_function("stats_snapshot", |b| b.iter(|| black_box(stats.snapshot())));
}

fn bench_traffic_decide(c: &mut Criterion) {
    let mut group = c.benchmark_group("traffic_decide");
    for hit_rate in [0.0, 0.5, 1.0] {
        group.bench_with_input(
            BenchmarkId::from_parameter(hit_rate),
            &hit_rate,
            |b, &hit_rate| {
                let mut synth = TrafficSynthesizer::new(hit_rate, 1);
                b.iter(|| black_box(synth.decide()))
            },
        );
    }
    group.finish();
}

fn bench_filler_value(c: &mut Criterion) {
    let mut group = c.benchmark_group("filler_value");
    for size_kb in [1usize, 16, 256] {
        group.bench_with_input(
            BenchmarkId::from_parameter(size_kb),
            &size_kb,
            |b, &size_kb| b.iter(|| black_box(filler_value(size_kb))),
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_stats_record,
    bench_stats_snapshot,
    bench_traffic_decide,
    bench_filler_value
);
criterion_main!(benches);
