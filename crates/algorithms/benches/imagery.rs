//! Benchmarks for imagery algorithms

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lulcview_algorithms::imagery::{apply_qa_mask, ndvi};
use lulcview_core::{GeoTransform, Raster};

fn create_band(size: usize, base: f64) -> Raster<f64> {
    let mut r = Raster::from_fn(size, size, |(row, col)| {
        base + ((row * 7 + col * 13) % 200) as f64
    });
    r.set_transform(GeoTransform::new(0.0, size as f64, 1.0, -1.0));
    r
}

fn bench_ndvi(c: &mut Criterion) {
    let mut group = c.benchmark_group("imagery/ndvi");
    for size in [256, 512, 1024] {
        let nir = create_band(size, 300.0);
        let red = create_band(size, 100.0);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| ndvi(black_box(&nir), black_box(&red)).unwrap())
        });
    }
    group.finish();
}

fn bench_qa_mask(c: &mut Criterion) {
    let mut group = c.benchmark_group("imagery/qa_mask");
    for size in [256, 512, 1024] {
        let band = create_band(size, 1000.0);
        let qa = Raster::from_fn(size, size, |(row, col)| {
            if (row + col) % 5 == 0 { 1024.0 } else { 0.0 }
        });
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| apply_qa_mask(black_box(&band), black_box(&qa)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_ndvi, bench_qa_mask);
criterion_main!(benches);
