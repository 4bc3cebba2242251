//! Benchmarks for temporal reducers

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lulcview_algorithms::composite::{reduce, Reducer};
use lulcview_core::Raster;

fn create_stack(size: usize, depth: usize) -> Vec<Raster<f64>> {
    (0..depth)
        .map(|i| Raster::from_fn(size, size, |(row, col)| ((row * 31 + col * 17 + i * 7) % 9) as f64))
        .collect()
}

fn bench_reducers(c: &mut Criterion) {
    let stack = create_stack(512, 12);
    let mut group = c.benchmark_group("composite/512x512x12");
    for (name, reducer) in [
        ("median", Reducer::Median),
        ("mode", Reducer::Mode),
        ("mean", Reducer::Mean),
        ("max", Reducer::Max),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &reducer, |b, &r| {
            b.iter(|| reduce(black_box(&stack), r).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_reducers);
criterion_main!(benches);
