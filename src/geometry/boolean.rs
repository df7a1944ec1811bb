//! geometry/boolean.rs - Boolean Engine
//!
//! Polygon union, intersection, and difference over wall solids, built on
//! the `geo` clipping kernel. Wall polygons are converted to the kernel's
//! exchange form (closed exterior ring, closed holes), clipped, and
//! converted back.
//!
//! The kernel is treated as fallible: refused input triggers an ordered
//! fallback cascade (collinearity simplification, then a symmetric random
//! jitter of one tolerance magnitude) before the operation aborts.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

use geo::{BooleanOps, LineString, MultiPolygon as GeoMultiPolygon, Polygon as GeoPolygon};
use log::{debug, warn};
use rand::Rng;

use crate::config::constants;
use crate::context::OperationContext;
use crate::error::{BooleanError, BooleanOpResult};
use crate::geometry::types::{Point2D, Polygon, Ring, WallSolid};

/// The three boolean operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOpKind {
    Union,
    Intersection,
    Difference,
}

/// Outcome of a boolean operation
#[derive(Debug, Clone)]
pub struct BooleanResult {
    pub polygons: Vec<Polygon>,
    pub processing_time_ms: f64,
    pub warnings: Vec<String>,
    /// Set when the result carries rings the healer should visit: fewer
    /// than 4 vertices, or area below tolerance^2 * 100
    pub requires_healing: bool,
}

/// The boolean engine
///
/// Stateless; safe to invoke concurrently across independent walls.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanEngine;

impl BooleanEngine {
    pub fn new() -> Self {
        Self
    }

    /// Union of two polygon sets
    pub fn union(
        &self,
        a: &[Polygon],
        b: &[Polygon],
        tolerance: f64,
    ) -> BooleanOpResult<BooleanResult> {
        self.operate(BooleanOpKind::Union, a, b, tolerance)
    }

    /// Intersection of two polygon sets
    pub fn intersection(
        &self,
        a: &[Polygon],
        b: &[Polygon],
        tolerance: f64,
    ) -> BooleanOpResult<BooleanResult> {
        self.operate(BooleanOpKind::Intersection, a, b, tolerance)
    }

    /// Difference `a − b`
    pub fn difference(
        &self,
        a: &[Polygon],
        b: &[Polygon],
        tolerance: f64,
    ) -> BooleanOpResult<BooleanResult> {
        self.operate(BooleanOpKind::Difference, a, b, tolerance)
    }

    /// Union the boundary polygons of many wall solids
    ///
    /// Small batches fold sequentially in ascending complexity order so
    /// cheap operands accumulate first; larger batches recurse by halving.
    pub fn batch_union(
        &self,
        solids: &[&WallSolid],
        tolerance: f64,
        ctx: &OperationContext,
    ) -> BooleanOpResult<BooleanResult> {
        if solids.is_empty() {
            return Err(BooleanError::EmptyInput);
        }
        let start = Instant::now();
        let mut warnings = Vec::new();

        if solids.len() == 1 {
            // Single operand: returned unchanged.
            return Ok(BooleanResult {
                polygons: solids[0].polygons.clone(),
                processing_time_ms: elapsed_ms(start),
                warnings,
                requires_healing: false,
            });
        }

        let total_complexity: usize = solids.iter().map(|s| s.complexity).sum();
        if total_complexity * solids.len() > constants::MAX_BOOLEAN_COMPLEXITY {
            warnings.push(format!(
                "batch union complexity {} exceeds the budget of {} vertex-pairs",
                total_complexity * solids.len(),
                constants::MAX_BOOLEAN_COMPLEXITY
            ));
        }

        let mut operands: Vec<&WallSolid> = solids.to_vec();
        let polygons = if operands.len() <= constants::SEQUENTIAL_UNION_LIMIT {
            operands.sort_by_key(|s| s.complexity);
            let mut acc = operands[0].polygons.clone();
            for solid in &operands[1..] {
                ctx.check()?;
                let step = self.operate(BooleanOpKind::Union, &acc, &solid.polygons, tolerance)?;
                warnings.extend(step.warnings);
                acc = step.polygons;
            }
            acc
        } else {
            self.divide_union(&operands, tolerance, ctx, &mut warnings)?
        };

        let requires_healing = needs_healing(&polygons, tolerance);
        Ok(BooleanResult {
            polygons,
            processing_time_ms: elapsed_ms(start),
            warnings,
            requires_healing,
        })
    }

    fn divide_union(
        &self,
        solids: &[&WallSolid],
        tolerance: f64,
        ctx: &OperationContext,
        warnings: &mut Vec<String>,
    ) -> BooleanOpResult<Vec<Polygon>> {
        ctx.check()?;
        if solids.len() == 1 {
            return Ok(solids[0].polygons.clone());
        }
        let mid = solids.len() / 2;
        let left = self.divide_union(&solids[..mid], tolerance, ctx, warnings)?;
        let right = self.divide_union(&solids[mid..], tolerance, ctx, warnings)?;
        let merged = self.operate(BooleanOpKind::Union, &left, &right, tolerance)?;
        warnings.extend(merged.warnings);
        Ok(merged.polygons)
    }

    fn operate(
        &self,
        op: BooleanOpKind,
        a: &[Polygon],
        b: &[Polygon],
        tolerance: f64,
    ) -> BooleanOpResult<BooleanResult> {
        let start = Instant::now();
        validate_operand(a, "left operand")?;
        validate_operand(b, "right operand")?;

        let pair_count = edge_count(a) * edge_count(b);
        let mut warnings = Vec::new();
        if pair_count > constants::MAX_BOOLEAN_COMPLEXITY {
            warnings.push(format!(
                "operation complexity {pair_count} exceeds the budget of {} vertex-pairs",
                constants::MAX_BOOLEAN_COMPLEXITY
            ));
        }

        debug!("boolean {op:?} over {}x{} polygons", a.len(), b.len());

        // Primary attempt, then the fallback cascade.
        let mut attempts = 0;
        let outcome = loop {
            attempts += 1;
            let (left, right): (Vec<Polygon>, Vec<Polygon>) = match attempts {
                1 => (a.to_vec(), b.to_vec()),
                2 => (
                    simplify_set(a, tolerance),
                    simplify_set(b, tolerance),
                ),
                3 => (jitter_set(a, tolerance), jitter_set(b, tolerance)),
                _ => {
                    return Err(BooleanError::KernelFailure {
                        reason: "clipping kernel rejected the input in every fallback stage"
                            .to_string(),
                        attempts: attempts - 1,
                    })
                }
            };
            match run_kernel(op, &left, &right) {
                Ok(result) => break result,
                Err(reason) => {
                    warn!("boolean kernel attempt {attempts} failed: {reason}");
                    warnings.push(format!("kernel attempt {attempts} failed: {reason}"));
                }
            }
        };
        if attempts > 1 {
            warnings.push(format!("boolean succeeded on fallback attempt {attempts}"));
        }

        let requires_healing = needs_healing(&outcome, tolerance);
        Ok(BooleanResult {
            polygons: outcome,
            processing_time_ms: elapsed_ms(start),
            warnings,
            requires_healing,
        })
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

fn edge_count(polygons: &[Polygon]) -> usize {
    polygons.iter().map(Polygon::edge_count).sum()
}

fn validate_operand(polygons: &[Polygon], label: &str) -> BooleanOpResult<()> {
    if polygons.is_empty() {
        return Err(BooleanError::degenerate(format!(
            "{label} carries no polygons"
        )));
    }
    for polygon in polygons {
        if polygon.outer.vertex_count() < 3 {
            return Err(BooleanError::degenerate(format!(
                "{label} has an outer ring with fewer than 3 vertices"
            )));
        }
        for &(x, y) in &polygon.outer.points {
            if !x.is_finite() || !y.is_finite() {
                return Err(BooleanError::degenerate(format!(
                    "{label} has a non-finite coordinate"
                )));
            }
        }
    }
    Ok(())
}

/// Invoke the clipping kernel, containing any internal panic
fn run_kernel(
    op: BooleanOpKind,
    a: &[Polygon],
    b: &[Polygon],
) -> Result<Vec<Polygon>, String> {
    let geo_a = to_geo(a);
    let geo_b = to_geo(b);
    let result = catch_unwind(AssertUnwindSafe(|| match op {
        BooleanOpKind::Union => geo_a.union(&geo_b),
        BooleanOpKind::Intersection => geo_a.intersection(&geo_b),
        BooleanOpKind::Difference => geo_a.difference(&geo_b),
    }))
    .map_err(|_| "clipping kernel panicked".to_string())?;

    let polygons = from_geo(&result);
    for polygon in &polygons {
        for &(x, y) in &polygon.outer.points {
            if !x.is_finite() || !y.is_finite() {
                return Err("kernel produced a non-finite coordinate".to_string());
            }
        }
    }
    Ok(polygons)
}

fn to_geo(polygons: &[Polygon]) -> GeoMultiPolygon<f64> {
    GeoMultiPolygon(
        polygons
            .iter()
            .map(|p| {
                GeoPolygon::new(
                    LineString::from(p.outer.points.clone()),
                    p.holes
                        .iter()
                        .map(|h| LineString::from(h.points.clone()))
                        .collect(),
                )
            })
            .collect(),
    )
}

fn from_geo(multi: &GeoMultiPolygon<f64>) -> Vec<Polygon> {
    multi
        .0
        .iter()
        .map(|p| {
            let outer = Ring::new(p.exterior().0.iter().map(|c| (c.x, c.y)).collect());
            let holes = p
                .interiors()
                .iter()
                .map(|ls| Ring::new(ls.0.iter().map(|c| (c.x, c.y)).collect()))
                .collect();
            Polygon::new(outer, holes)
        })
        .collect()
}

/// Drop ring vertices whose neighbor cross-product magnitude is at or
/// below the tolerance
fn simplify_set(polygons: &[Polygon], tolerance: f64) -> Vec<Polygon> {
    polygons
        .iter()
        .map(|p| {
            Polygon::new(
                simplify_ring(&p.outer, tolerance),
                p.holes.iter().map(|h| simplify_ring(h, tolerance)).collect(),
            )
        })
        .collect()
}

fn simplify_ring(ring: &Ring, tolerance: f64) -> Ring {
    let n = ring.vertex_count();
    if n <= 3 {
        return ring.clone();
    }
    let mut kept: Vec<Point2D> = Vec::with_capacity(n);
    for i in 0..n {
        let prev = ring.points[(i + n - 1) % n];
        let here = ring.points[i];
        let next = ring.points[(i + 1) % n];
        let v1 = (here.0 - prev.0, here.1 - prev.1);
        let v2 = (next.0 - here.0, next.1 - here.1);
        let cross = v1.0 * v2.1 - v1.1 * v2.0;
        if cross.abs() > tolerance {
            kept.push(here);
        }
    }
    if kept.len() < 3 {
        return ring.clone();
    }
    Ring::new(kept)
}

/// Perturb every vertex by a uniform random offset of one tolerance
fn jitter_set(polygons: &[Polygon], tolerance: f64) -> Vec<Polygon> {
    let mut rng = rand::thread_rng();
    let mut jitter_ring = |ring: &Ring| {
        let n = ring.vertex_count();
        let coords: Vec<Point2D> = ring.points[..n]
            .iter()
            .map(|&(x, y)| {
                (
                    x + rng.gen_range(-tolerance..=tolerance),
                    y + rng.gen_range(-tolerance..=tolerance),
                )
            })
            .collect();
        Ring::new(coords)
    };
    polygons
        .iter()
        .map(|p| {
            Polygon::new(
                jitter_ring(&p.outer),
                p.holes.iter().map(&mut jitter_ring).collect(),
            )
        })
        .collect()
}

fn needs_healing(polygons: &[Polygon], tolerance: f64) -> bool {
    let area_floor = tolerance * tolerance * 100.0;
    polygons.iter().any(|p| {
        std::iter::once(&p.outer).chain(p.holes.iter()).any(|ring| {
            ring.vertex_count() < 4 || ring.signed_area().abs() < area_floor
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn union_of_overlapping_squares_merges_area() {
        let engine = BooleanEngine::new();
        let result = engine
            .union(&[square((0.0, 0.0), 10.0)], &[square((5.0, 0.0), 10.0)], 1e-9)
            .expect("union succeeds");
        assert_eq!(result.polygons.len(), 1);
        let area: f64 = result.polygons.iter().map(Polygon::area).sum();
        assert!((area - 150.0).abs() < 1e-6);
    }

    #[test]
    fn intersection_of_disjoint_squares_is_empty() {
        let engine = BooleanEngine::new();
        let result = engine
            .intersection(
                &[square((0.0, 0.0), 10.0)],
                &[square((100.0, 100.0), 10.0)],
                1e-9,
            )
            .expect("intersection succeeds");
        assert!(result.polygons.is_empty());
    }

    #[test]
    fn difference_carves_a_hole() {
        let engine = BooleanEngine::new();
        let result = engine
            .difference(&[square((0.0, 0.0), 10.0)], &[square((4.0, 4.0), 2.0)], 1e-9)
            .expect("difference succeeds");
        let area: f64 = result.polygons.iter().map(Polygon::area).sum();
        assert!((area - 96.0).abs() < 1e-6);
    }

    #[test]
    fn empty_operand_is_degenerate_input() {
        let engine = BooleanEngine::new();
        let result = engine.union(&[], &[square((0.0, 0.0), 10.0)], 1e-9);
        assert!(matches!(result, Err(BooleanError::DegenerateInput { .. })));
    }

    #[test]
    fn tiny_result_ring_requests_healing() {
        // Two squares sharing a hair-thin overlap: intersection area is
        // far below tolerance^2 * 100 at a coarse tolerance.
        let engine = BooleanEngine::new();
        let result = engine
            .intersection(
                &[square((0.0, 0.0), 10.0)],
                &[square((9.999999, 0.0), 10.0)],
                1e-2,
            )
            .expect("intersection succeeds");
        if !result.polygons.is_empty() {
            assert!(result.requires_healing);
        }
    }
}
