//! Benchmarks for exact neighbour search.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mosaic_vecstore::{MemoryIndex, Metric, VecIndex};

fn pseudo_random_vec(dim: usize, seed: u64) -> Vec<f32> {
    let mut state = seed;
    (0..dim)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            ((state >> 33) as f32) / (u32::MAX as f32) - 0.5
        })
        .collect()
}

fn build_index(points: usize, dim: usize, metric: Metric) -> MemoryIndex {
    let vectors: Vec<Vec<f32>> = (0..points)
        .map(|i| pseudo_random_vec(dim, i as u64 * 7919 + 1))
        .collect();
    let refs: Vec<&[f32]> = vectors.iter().map(|v| v.as_slice()).collect();
    let ids: Vec<usize> = (0..points).collect();
    let mut idx = MemoryIndex::new(metric);
    idx.train(&ids, &refs).unwrap();
    idx
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("memory_search");
    let dim = 24;
    let query = pseudo_random_vec(dim, 42);

    for points in [500, 2000, 8000].iter() {
        for metric in [Metric::Euclidean, Metric::Cosine] {
            let idx = build_index(*points, dim, metric);
            let id = format!("{metric:?}").to_lowercase();
            group.bench_with_input(BenchmarkId::new(id, points), points, |b, _| {
                b.iter(|| black_box(idx.search(&query, 10).unwrap()));
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_search);
criterion_main!(benches);
