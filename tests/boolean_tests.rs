//! tests/boolean_tests.rs
//!
//! Tests for the boolean engine: the three operations, batch union
//! boundary behavior, complexity warnings, and healing flags.

use parapet::config::OffsetConfig;
use parapet::context::OperationContext;
use parapet::geometry::boolean::BooleanEngine;
use parapet::geometry::offset::{JoinSelection, OffsetEngine};
use parapet::geometry::{Curve, JoinType, Point2D, Polygon, Ring, WallSolid, WallType};
use parapet::BooleanError;

fn engine() -> BooleanEngine {
    BooleanEngine::new()
}

fn square(origin: Point2D, size: f64) -> Polygon {
    Polygon::new(
        Ring::new(vec![
            origin,
            (origin.0 + size, origin.1),
            (origin.0 + size, origin.1 + size),
            (origin.0, origin.1 + size),
        ]),
        Vec::new(),
    )
}

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

/// Union of overlapping squares merges into one region with the
/// inclusion-exclusion area
#[test]
fn test_union_merges_overlap() {
    let result = engine()
        .union(&[square((0.0, 0.0), 100.0)], &[square((50.0, 0.0), 100.0)], 1e-9)
        .expect("union succeeds");
    assert_eq!(result.polygons.len(), 1);
    let area: f64 = result.polygons.iter().map(|p| p.area()).sum();
    assert!((area - 15_000.0).abs() < 1e-6);
}

/// Intersection and difference agree with the set model
#[test]
fn test_intersection_and_difference() {
    let a = [square((0.0, 0.0), 100.0)];
    let b = [square((50.0, 0.0), 100.0)];

    let intersection = engine().intersection(&a, &b, 1e-9).expect("intersection");
    let overlap: f64 = intersection.polygons.iter().map(|p| p.area()).sum();
    assert!((overlap - 5_000.0).abs() < 1e-6);

    let difference = engine().difference(&a, &b, 1e-9).expect("difference");
    let remainder: f64 = difference.polygons.iter().map(|p| p.area()).sum();
    assert!((remainder - 5_000.0).abs() < 1e-6);
}

/// Batch union of zero walls fails with an explanatory error
#[test]
fn test_batch_union_of_nothing_fails() {
    let result = engine().batch_union(&[], 1e-9, &OperationContext::new());
    assert!(matches!(result, Err(BooleanError::EmptyInput)));
}

/// Batch union of a single wall returns it unchanged: union([s]) = s
#[test]
fn test_batch_union_of_one_is_identity() {
    let solid = wall(1, &[(0.0, 0.0), (2000.0, 0.0)]);
    let result = engine()
        .batch_union(&[&solid], 1e-9, &OperationContext::new())
        .expect("identity union succeeds");
    assert_eq!(result.polygons, solid.polygons);
    assert!(!result.requires_healing);
}

/// Small batches fold sequentially; the result covers every operand
#[test]
fn test_small_batch_union_covers_all_walls() {
    let walls = [
        wall(1, &[(0.0, 0.0), (2000.0, 0.0)]),
        wall(2, &[(1000.0, 0.0), (1000.0, 2000.0)]),
        wall(3, &[(0.0, 2000.0), (2000.0, 2000.0)]),
    ];
    let refs: Vec<&WallSolid> = walls.iter().collect();
    let result = engine()
        .batch_union(&refs, 1e-6, &OperationContext::new())
        .expect("batch union succeeds");

    let union_area: f64 = result.polygons.iter().map(|p| p.area()).sum();
    let sum_area: f64 = walls.iter().map(|w| w.area()).sum();
    // Overlapping junction regions shrink the union below the plain sum.
    assert!(union_area > 0.0);
    assert!(union_area <= sum_area + 1e-6);
}

/// Large batches take the divide-and-conquer path and still union all
/// operands
#[test]
fn test_large_batch_union_divide_and_conquer() {
    // Twelve collinear overlapping stubs along one corridor.
    let walls: Vec<WallSolid> = (0..12)
        .map(|i| {
            let x = i as f64 * 400.0;
            wall(i as u64 + 1, &[(x, 0.0), (x + 600.0, 0.0)])
        })
        .collect();
    let refs: Vec<&WallSolid> = walls.iter().collect();
    let result = engine()
        .batch_union(&refs, 1e-6, &OperationContext::new())
        .expect("batch union succeeds");

    // One continuous corridor: 0 .. 11*400+600 at thickness 250.
    assert_eq!(result.polygons.len(), 1);
    let area: f64 = result.polygons.iter().map(|p| p.area()).sum();
    assert!((area - 5000.0 * 250.0).abs() < 1.0, "area {area}");
}

/// Degenerate input (no polygons) is reported, not worked around
#[test]
fn test_degenerate_input_is_an_error() {
    let result = engine().union(&[], &[square((0.0, 0.0), 10.0)], 1e-9);
    assert!(matches!(result, Err(BooleanError::DegenerateInput { .. })));
}

/// The cancelled context interrupts a batch union between folds
#[test]
fn test_cancelled_batch_union() {
    let walls = [
        wall(1, &[(0.0, 0.0), (2000.0, 0.0)]),
        wall(2, &[(1000.0, 0.0), (1000.0, 2000.0)]),
    ];
    let refs: Vec<&WallSolid> = walls.iter().collect();
    let ctx = OperationContext::new();
    ctx.cancel();
    let result = engine().batch_union(&refs, 1e-6, &ctx);
    assert!(matches!(result, Err(BooleanError::Interrupted(_))));
}
