//! tests/cache_tests.rs
//!
//! Tests for the intersection/miter cache: round-trip laws, key
//! determinism, eviction, statistics, and the resolve-twice scenario
//! where the second resolution is served from the cache.

use parapet::cache::GeometryCache;
use parapet::config::{CacheConfig, OffsetConfig};
use parapet::context::OperationContext;
use parapet::geometry::network::NetworkOptimizer;
use parapet::geometry::offset::{JoinSelection, OffsetEngine};
use parapet::geometry::types::{
    IntersectionKind, IntersectionRecord, IntersectionState, JoinType, MiterCalculation,
    ResolutionMethod,
};
use parapet::geometry::{Curve, Point2D, WallSolid, WallType};

fn record(id: u64, wall_ids: &[u64]) -> IntersectionRecord {
    IntersectionRecord {
        id,
        kind: IntersectionKind::T,
        wall_ids: wall_ids.to_vec(),
        intersection_point: (1000.0, 0.0),
        miter_apex: Some((1000.0, 125.0)),
        offset_intersections: vec![(875.0, 125.0), (1125.0, 125.0)],
        resolved_geometry: Vec::new(),
        method: ResolutionMethod::ExactGeometric,
        accuracy: 0.95,
        state: IntersectionState::Validated,
    }
}

/// put(k, v); get(k) = v, and get after clear() is a miss
#[test]
fn test_round_trip_and_clear() {
    let cache = GeometryCache::new(CacheConfig::default());
    let key = GeometryCache::intersection_key(&[1, 2], IntersectionKind::T, (1000.0, 0.0), 1e-6);

    cache.put_intersection(key.clone(), record(1, &[1, 2]));
    let fetched = cache.get_intersection(&key).expect("hit after put");
    assert_eq!(fetched.id, 1);
    assert_eq!(fetched.state, IntersectionState::Cached);

    cache.clear();
    assert!(cache.get_intersection(&key).is_none(), "miss after clear");
}

/// Keys quantize the point to 6 decimals and normalize wall-id order
#[test]
fn test_key_determinism() {
    let a = GeometryCache::intersection_key(&[7, 3], IntersectionKind::L, (1.0000001, 2.0), 1e-6);
    let b = GeometryCache::intersection_key(&[3, 7], IntersectionKind::L, (1.0000002, 2.0), 1e-6);
    assert_eq!(a, b, "sub-quantum point differences share a key");

    let different_kind =
        GeometryCache::intersection_key(&[3, 7], IntersectionKind::T, (1.0, 2.0), 1e-6);
    assert_ne!(a, different_kind);

    let different_tolerance =
        GeometryCache::intersection_key(&[3, 7], IntersectionKind::L, (1.0, 2.0), 1e-3);
    assert_ne!(a, different_tolerance);
}

/// Miter calculations cache independently of intersection records
#[test]
fn test_miter_round_trip() {
    let cache = GeometryCache::new(CacheConfig::default());
    let key = GeometryCache::miter_key(&[1, 2], (1125.0, -125.0), 1e-6);
    let miter = MiterCalculation {
        apex: (1125.0, -125.0),
        offset_intersections: ((1125.0, -125.0), (875.0, 125.0)),
        angle_degrees: 90.0,
        join_type: JoinType::Miter,
        fallback_used: false,
    };
    cache.put_miter(key.clone(), miter);
    let fetched = cache.get_miter(&key).expect("hit");
    assert_eq!(fetched, miter);
}

/// The entry cap bounds the cache and eviction keeps the hot entry
#[test]
fn test_eviction_respects_the_cap() {
    let cache = GeometryCache::new(CacheConfig {
        max_entries: 8,
        ..CacheConfig::default()
    });
    let hot_key = GeometryCache::intersection_key(&[0, 1], IntersectionKind::T, (0.0, 0.0), 1e-6);
    cache.put_intersection(hot_key.clone(), record(0, &[0, 1]));
    for _ in 0..5 {
        let _ = cache.get_intersection(&hot_key);
    }

    for i in 1..40u64 {
        let key = GeometryCache::intersection_key(
            &[i, i + 1],
            IntersectionKind::T,
            (i as f64, 0.0),
            1e-6,
        );
        cache.put_intersection(key, record(i, &[i, i + 1]));
    }
    assert!(cache.entry_count() <= 8);
}

/// Statistics report hits, misses, and the hit rate
#[test]
fn test_statistics() {
    let cache = GeometryCache::new(CacheConfig::default());
    let key = GeometryCache::intersection_key(&[1, 2], IntersectionKind::T, (0.0, 0.0), 1e-6);

    assert!(cache.get_intersection(&key).is_none());
    cache.put_intersection(key.clone(), record(1, &[1, 2]));
    assert!(cache.get_intersection(&key).is_some());
    assert!(cache.get_intersection(&key).is_some());

    let stats = cache.statistics().expect("enabled by default");
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 2);
    assert!((stats.hit_rate - 2.0 / 3.0).abs() < 1e-9);
}

/// Resolving the same T-junction twice with identical inputs: the
/// second resolution hits the cache exactly once and skips the kernels
#[test]
fn test_repeat_resolution_hits_the_cache() {
    fn wall(id: u64, coords: &[Point2D]) -> WallSolid {
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

    let cache = GeometryCache::new(CacheConfig::default());
    let optimizer = NetworkOptimizer::new(OffsetConfig::default());
    let walls = vec![
        wall(1, &[(0.0, 0.0), (2000.0, 0.0)]),
        wall(2, &[(1000.0, 0.0), (1000.0, 1000.0)]),
    ];

    let first = optimizer
        .resolve_network(&walls, &cache, 1e-6, 1, &OperationContext::new())
        .expect("first resolution succeeds");
    assert_eq!(first.resolutions.len(), 1);
    let hits_before = cache.statistics().unwrap().hits;

    let second = optimizer
        .resolve_network(&walls, &cache, 1e-6, 100, &OperationContext::new())
        .expect("second resolution succeeds");
    assert_eq!(second.resolutions.len(), 1);
    assert!(second.resolutions[0].record.is_cached());

    let hits_after = cache.statistics().unwrap().hits;
    assert_eq!(hits_after, hits_before + 1, "exactly one extra cache hit");
    // The cached record carries the same junction geometry.
    assert_eq!(
        second.resolutions[0].record.kind,
        first.resolutions[0].record.kind
    );
    assert_eq!(
        second.resolutions[0].record.wall_ids,
        first.resolutions[0].record.wall_ids
    );
}

/// Manual sweep removes entries older than the TTL
#[test]
fn test_manual_sweep_is_safe_on_fresh_entries() {
    let cache = GeometryCache::new(CacheConfig::default());
    let key = GeometryCache::intersection_key(&[1, 2], IntersectionKind::T, (0.0, 0.0), 1e-6);
    cache.put_intersection(key.clone(), record(1, &[1, 2]));
    // Entries far younger than the TTL survive a sweep.
    cache.sweep_expired();
    assert!(cache.get_intersection(&key).is_some());
}
