//! Criterion micro-benchmarks for container allocation, traversal,
//! compaction and persistence.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use strata_bench::{churn, fragment, reference_container, REFERENCE_ROWS};
use strata_container::AttributeContainer;

/// Benchmark: allocate 100K single rows into an empty four-column container.
fn bench_allocate_100k(c: &mut Criterion) {
    c.bench_function("allocate_100k", |b| {
        b.iter(|| black_box(reference_container(REFERENCE_ROWS)));
    });
}

/// Benchmark: 10K steps of mixed allocate/free on a warm container.
fn bench_churn_10k(c: &mut Criterion) {
    c.bench_function("churn_10k", |b| {
        b.iter_batched(
            || reference_container(10_000),
            |mut container| {
                churn(&mut container, 10_000, 42);
                container
            },
            BatchSize::LargeInput,
        );
    });
}

/// Benchmark: hole-skipping traversal over a 30% fragmented container.
fn bench_traverse_fragmented(c: &mut Criterion) {
    let mut container = reference_container(REFERENCE_ROWS);
    fragment(&mut container, 30, 7);
    c.bench_function("traverse_fragmented_100k", |b| {
        b.iter(|| black_box(container.rows().count()));
    });
}

/// Benchmark: compact a 30% fragmented 100K-row container.
fn bench_compact(c: &mut Criterion) {
    c.bench_function("compact_100k", |b| {
        b.iter_batched(
            || {
                let mut container = reference_container(REFERENCE_ROWS);
                fragment(&mut container, 30, 7);
                container
            },
            |mut container| black_box(container.compact::<1>()),
            BatchSize::LargeInput,
        );
    });
}

/// Benchmark: save then load the reference container through memory.
fn bench_save_load(c: &mut Criterion) {
    let container = reference_container(REFERENCE_ROWS);
    let mut bytes = Vec::new();
    container.save(&mut bytes).unwrap();

    c.bench_function("save_100k", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(bytes.len());
            container.save(&mut out).unwrap();
            black_box(out.len())
        });
    });

    c.bench_function("load_100k", |b| {
        b.iter(|| {
            let mut loaded = AttributeContainer::default();
            loaded.load(&mut bytes.as_slice()).unwrap();
            black_box(loaded.size())
        });
    });
}

criterion_group!(
    benches,
    bench_allocate_100k,
    bench_churn_10k,
    bench_traverse_fragmented,
    bench_compact,
    bench_save_load
);
criterion_main!(benches);
