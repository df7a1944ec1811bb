use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use parapet::cache::GeometryCache;
use parapet::config::{CacheConfig, OffsetConfig};
use parapet::context::OperationContext;
use parapet::geometry::boolean::BooleanEngine;
use parapet::geometry::network::NetworkOptimizer;
use parapet::geometry::offset::{JoinSelection, OffsetEngine};
use parapet::geometry::{Curve, JoinType, WallSolid, WallType};

fn zigzag_baseline(vertices: usize) -> Curve {
    let coords: Vec<(f64, f64)> = (0..vertices)
        .map(|i| (i as f64 * 500.0, if i % 2 == 0 { 0.0 } else { 400.0 }))
        .collect();
    Curve::polyline(&coords, 1e-6).unwrap()
}

fn wall(id: u64, coords: &[(f64, f64)]) -> WallSolid {
    let baseline = Curve::polyline(coords, 1e-6).unwrap();
    OffsetEngine::new(OffsetConfig::default())
        .sweep_solid(
            id,
            baseline,
            250.0,
            WallType::Zone,
            JoinSelection::Fixed(JoinType::Miter),
            1e-6,
        )
        .unwrap()
}

/// Benchmark offsetting across baseline sizes and join types
fn bench_offset(c: &mut Criterion) {
    let mut group = c.benchmark_group("offset");
    let engine = OffsetEngine::new(OffsetConfig::default());

    for vertices in [4usize, 16, 64, 256] {
        let baseline = zigzag_baseline(vertices);
        for (label, join) in [
            ("miter", JoinType::Miter),
            ("bevel", JoinType::Bevel),
            ("round", JoinType::Round),
        ] {
            group.bench_with_input(
                BenchmarkId::new(label, vertices),
                &baseline,
                |b, baseline| {
                    b.iter(|| {
                        engine
                            .offset(
                                black_box(baseline),
                                black_box(125.0),
                                JoinSelection::Fixed(join),
                                black_box(1e-6),
                            )
                            .unwrap()
                    })
                },
            );
        }
    }
    group.finish();
}

/// Benchmark pairwise union of overlapping wall bands
fn bench_boolean(c: &mut Criterion) {
    let mut group = c.benchmark_group("boolean_union");
    let engine = BooleanEngine::new();

    let a = wall(1, &[(0.0, 0.0), (4000.0, 0.0)]);
    let b = wall(2, &[(2000.0, 0.0), (2000.0, 4000.0)]);
    group.bench_function("t_junction_pair", |bench| {
        bench.iter(|| {
            engine
                .union(black_box(&a.polygons), black_box(&b.polygons), 1e-6)
                .unwrap()
        })
    });
    group.finish();
}

/// Benchmark network resolution with a cold and a warm cache
fn bench_network(c: &mut Criterion) {
    let mut group = c.benchmark_group("network");
    let optimizer = NetworkOptimizer::new(OffsetConfig::default());

    // A grid corridor: one long spine with perpendicular branches.
    let mut walls = vec![wall(1, &[(0.0, 0.0), (20_000.0, 0.0)])];
    for i in 0..8u64 {
        let x = 2000.0 + i as f64 * 2000.0;
        walls.push(wall(i + 2, &[(x, 0.0), (x, 3000.0)]));
    }

    group.bench_function("cold_cache", |bench| {
        bench.iter(|| {
            let cache = GeometryCache::new(CacheConfig::default());
            optimizer
                .resolve_network(
                    black_box(&walls),
                    &cache,
                    1e-6,
                    1,
                    &OperationContext::new(),
                )
                .unwrap()
        })
    });

    let warm_cache = GeometryCache::new(CacheConfig::default());
    optimizer
        .resolve_network(&walls, &warm_cache, 1e-6, 1, &OperationContext::new())
        .unwrap();
    group.bench_function("warm_cache", |bench| {
        bench.iter(|| {
            optimizer
                .resolve_network(
                    black_box(&walls),
                    &warm_cache,
                    1e-6,
                    100,
                    &OperationContext::new(),
                )
                .unwrap()
        })
    });
    group.finish();
}

criterion_group!(benches, bench_offset, bench_boolean, bench_network);
criterion_main!(benches);
