//! tests/scenario_tests.rs
//!
//! End-to-end scenarios driving the full pipeline through the store:
//! a small floor plan is created, junctions are resolved, solids are
//! healed and scored, and the resulting geometry honors the universal
//! invariants.

use parapet::config::CoreConfig;
use parapet::context::OperationContext;
use parapet::geometry::primitives::ring_self_intersections;
use parapet::geometry::{Curve, IntersectionKind, WallType};
use parapet::store::types::WallMode;
use parapet::store::WallStore;

fn baseline(coords: &[(f64, f64)]) -> Curve {
    Curve::polyline(coords, 1e-6).expect("valid baseline")
}

/// A rectangular room with an internal partition: three junctions
/// resolve, every solid heals clean, and metrics come back healthy
#[test]
fn test_room_with_partition() {
    let store = WallStore::new(CoreConfig::default()).unwrap();
    let ctx = OperationContext::new();

    // Three outer walls and one partition ending on the south wall.
    let south = store
        .create(
            baseline(&[(0.0, 0.0), (6000.0, 0.0)]),
            WallType::Layout,
            None,
            WallMode::Basic,
        )
        .unwrap();
    let west = store
        .create(
            baseline(&[(0.0, 0.0), (0.0, 4000.0)]),
            WallType::Layout,
            None,
            WallMode::Basic,
        )
        .unwrap();
    let east = store
        .create(
            baseline(&[(6000.0, 0.0), (6000.0, 4000.0)]),
            WallType::Layout,
            None,
            WallMode::Basic,
        )
        .unwrap();
    let partition = store
        .create(
            baseline(&[(3000.0, 0.0), (3000.0, 4000.0)]),
            WallType::Zone,
            None,
            WallMode::Basic,
        )
        .unwrap();

    let ids = [south, west, east, partition];
    let network = store.resolve_junctions(&ids, &ctx).expect("network resolves");

    // Two corners plus the partition's T onto the south wall.
    assert_eq!(network.resolutions.len(), 3, "L + L + T expected");
    let kinds: Vec<IntersectionKind> = network
        .resolutions
        .iter()
        .map(|r| r.record.kind)
        .collect();
    assert_eq!(
        kinds
            .iter()
            .filter(|k| **k == IntersectionKind::L)
            .count(),
        2
    );
    assert_eq!(
        kinds
            .iter()
            .filter(|k| **k == IntersectionKind::T)
            .count(),
        1
    );

    // Every junction union is simple near the meeting point.
    for resolution in &network.resolutions {
        for polygon in &resolution.record.resolved_geometry {
            assert_eq!(ring_self_intersections(&polygon.outer, 1e-9), 0);
        }
        assert!(resolution.record.accuracy >= 0.80);
        assert!(resolution.record.is_validated());
    }

    // Healing finds nothing pathological and metrics stay healthy.
    let reports = store.heal(&ids, &ctx).expect("healing succeeds");
    for report in reports.values() {
        assert!(report.reached_fixed_point);
    }
    let metrics = store.quality_metrics(&ids).expect("metrics compute");
    assert_eq!(metrics.wall_count, 4);
    assert!(metrics.mean_overall_score > 0.7, "{}", metrics.mean_overall_score);

    // Validation agrees.
    let validations = store.validate(&ids).expect("validation runs");
    for (id, report) in &validations {
        assert!(report.is_valid, "wall {id}: {:?}", report.issues);
    }
}

/// The universal area invariant holds for every freshly swept wall:
/// polygon area = baseline length x thickness within tolerance x perimeter
#[test]
fn test_area_invariant_over_wall_shapes() {
    let store = WallStore::new(CoreConfig::default()).unwrap();
    let ctx = OperationContext::new();

    let shapes: Vec<Vec<(f64, f64)>> = vec![
        vec![(0.0, 0.0), (2500.0, 0.0)],
        vec![(0.0, 0.0), (1800.0, 0.0), (1800.0, 1200.0)],
        vec![(0.0, 0.0), (900.0, 900.0), (1800.0, 0.0)],
    ];
    for coords in shapes {
        let id = store
            .create(baseline(&coords), WallType::Zone, None, WallMode::Basic)
            .unwrap();
        store.synchronize(id, &ctx).unwrap();
        let wall = store.wall(id).unwrap();
        let solid = wall.bim.expect("solid");
        let expected = solid.baseline.length() * solid.thickness;
        let budget = 1e-3 * solid.perimeter() + expected * 1e-9;
        assert!(
            (solid.area() - expected).abs() <= budget,
            "area {} vs {expected} for {:?}",
            solid.area(),
            solid.baseline.coords()
        );
    }
}

/// Dragging a wall re-resolves its junctions: mutation invalidates,
/// re-resolution restores, and the change stream sees every commit
#[test]
fn test_drag_and_rebuild_cycle() {
    let store = WallStore::new(CoreConfig::default()).unwrap();
    let ctx = OperationContext::new();

    let main = store
        .create(
            baseline(&[(0.0, 0.0), (4000.0, 0.0)]),
            WallType::Layout,
            None,
            WallMode::Basic,
        )
        .unwrap();
    let branch = store
        .create(
            baseline(&[(2000.0, 0.0), (2000.0, 2000.0)]),
            WallType::Zone,
            None,
            WallMode::Basic,
        )
        .unwrap();

    let sub = store.subscribe(|_| true);

    store.resolve_junctions(&[main, branch], &ctx).unwrap();
    assert_eq!(store.intersection_count(), 1);

    // Drag the branch 500mm east.
    store
        .update_baseline(branch, baseline(&[(2500.0, 0.0), (2500.0, 2000.0)]))
        .unwrap();
    assert_eq!(store.intersection_count(), 0, "drag invalidates the junction");

    store.resolve_junctions(&[main, branch], &ctx).unwrap();
    assert_eq!(store.intersection_count(), 1);
    let record = store
        .intersection(store.wall(branch).unwrap().intersection_ids()[0])
        .expect("record stored");
    assert!((record.intersection_point.0 - 2500.0).abs() < 1.0);

    assert!(!sub.drain().is_empty(), "commits were announced");
}

/// Persistence mid-pipeline: a resolved plan survives a save/load and
/// further editing
#[test]
fn test_save_load_and_continue_editing() {
    let store = WallStore::new(CoreConfig::default()).unwrap();
    let ctx = OperationContext::new();

    let a = store
        .create(
            baseline(&[(0.0, 0.0), (3000.0, 0.0)]),
            WallType::Layout,
            None,
            WallMode::Basic,
        )
        .unwrap();
    let b = store
        .create(
            baseline(&[(3000.0, 0.0), (3000.0, 2000.0)]),
            WallType::Layout,
            None,
            WallMode::Basic,
        )
        .unwrap();
    store.resolve_junctions(&[a, b], &ctx).unwrap();
    let json = store.save_to_json().unwrap();

    let restored = WallStore::new(CoreConfig::default()).unwrap();
    restored.load_from_json(&json).unwrap();
    assert_eq!(restored.wall_count(), 2);
    assert_eq!(restored.intersection_count(), 1);

    // The restored plan keeps editing cleanly.
    restored
        .update_baseline(a, baseline(&[(0.0, 0.0), (3500.0, 0.0)]))
        .unwrap();
    restored.synchronize(a, &ctx).unwrap();
    let wall = restored.wall(a).unwrap();
    assert!((wall.bim.unwrap().area() - 3500.0 * 350.0).abs() < 1.0);
}
