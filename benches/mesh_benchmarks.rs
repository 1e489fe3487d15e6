//! Benchmarks for mesh construction and centroid

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use face_glow_mesh::{
    keypoint::Keypoint,
    mesh::{face_centroid, nearest_indices, MeshBuilder},
};

/// Points on a wobbly ring, roughly face shaped
fn ring(n: usize) -> Vec<Keypoint> {
    (0..n)
        .map(|i| {
            let angle = (i as f32) * 2.0 * std::f32::consts::PI / n as f32;
            let wobble = 1.0 + 0.1 * (angle * 5.0).sin();
            Keypoint::new(320.0 + 100.0 * wobble * angle.cos(), 240.0 + 120.0 * wobble * angle.sin())
        })
        .collect()
}

fn bench_mesh_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("mesh_build");

    for n in [5, 68, 136, 340] {
        let points = ring(n);
        group.bench_with_input(BenchmarkId::new("k3", n), &points, |b, points| {
            let builder = MeshBuilder::default();
            b.iter(|| black_box(builder.build(black_box(points))));
        });
    }

    let points = ring(68);
    for k in [1, 3, 8] {
        group.bench_with_input(BenchmarkId::new("68_points_k", k), &k, |b, &k| {
            let builder = MeshBuilder::new(k);
            b.iter(|| black_box(builder.build(black_box(&points))));
        });
    }

    group.finish();
}

fn bench_single_query(c: &mut Criterion) {
    let points = ring(68);
    c.bench_function("nearest_indices_68", |b| {
        b.iter(|| black_box(nearest_indices(black_box(&points), 30, 3)));
    });
    c.bench_function("face_centroid_68", |b| {
        b.iter(|| black_box(face_centroid(black_box(&points))));
    });
}

criterion_group!(benches, bench_mesh_build, bench_single_query);
criterion_main!(benches);
