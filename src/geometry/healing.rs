//! geometry/healing.rs - Shape Healer
//!
//! Boolean output is rarely pristine: hair-thin sliver faces, duplicated
//! vertices, and micro-gaps all survive clipping. The healer removes them
//! with three atomic operations applied in a loop until the geometry
//! stops changing or the iteration cap is reached.
//!
//! Every pass is recorded in the solid's append-only healing history, so
//! a wall carries the full story of how its boundary reached its current
//! shape.

use log::{debug, warn};

use crate::config::HealingConfig;
use crate::context::OperationContext;
use crate::error::{HealingError, HealingOpResult};
use crate::geometry::primitives::{distance, midpoint, ring_contains_point};
use crate::geometry::types::{
    CreationMethod, HealingOperation, HealingOperationKind, Point2D, Polygon, Ring, WallSolid,
};

/// Counts from one atomic healing operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HealingResult {
    pub changed: bool,
    pub slivers_removed: usize,
    pub duplicates_merged: usize,
    pub gaps_eliminated: usize,
}

/// Summary of a composite healing run
#[derive(Debug, Clone)]
pub struct HealingReport {
    /// Iterations of the composite loop that ran
    pub iterations: usize,
    pub slivers_removed: usize,
    pub duplicates_merged: usize,
    pub gaps_eliminated: usize,
    /// True when the loop stopped because nothing changed, rather than
    /// because it hit the iteration cap
    pub reached_fixed_point: bool,
    /// The operations appended to the solid's history by this run
    pub operations: Vec<HealingOperation>,
}

/// The shape healer
///
/// Stateless apart from configuration; safe for concurrent use across
/// independent walls.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapeHealer {
    config: HealingConfig,
}

impl ShapeHealer {
    pub fn new(config: HealingConfig) -> Self {
        Self { config }
    }

    /// Remove sliver rings from the solid's polygons
    ///
    /// A ring is a sliver when its area is below tolerance squared, its
    /// isoperimetric ratio is below the configured threshold, or it has
    /// fewer than 4 distinct vertices. A sliver outer ring drops the whole
    /// polygon; a sliver hole drops only the hole.
    pub fn remove_sliver_faces(&self, solid: &mut WallSolid, tolerance: f64) -> HealingResult {
        let protected = protected_points(solid, self.config.preserve_architectural_features);
        let mut removed = 0;
        let mut skipped = false;

        solid.polygons.retain(|polygon| {
            if !is_sliver_ring(&polygon.outer, tolerance, self.config.sliver_threshold) {
                return true;
            }
            if protected
                .iter()
                .any(|&p| ring_contains_point(&polygon.outer, p, tolerance))
            {
                skipped = true;
                return true;
            }
            removed += 1;
            false
        });
        for polygon in &mut solid.polygons {
            let before = polygon.holes.len();
            polygon
                .holes
                .retain(|hole| !is_sliver_ring(hole, tolerance, self.config.sliver_threshold));
            removed += before - polygon.holes.len();
        }

        if skipped {
            solid.healing_history.push(HealingOperation {
                kind: HealingOperationKind::PreservationSkip,
                elements_affected: 0,
                tolerance,
                iteration: 0,
            });
        }
        if removed > 0 {
            solid.refresh_estimates();
        }
        HealingResult {
            changed: removed > 0,
            slivers_removed: removed,
            ..HealingResult::default()
        }
    }

    /// Merge ring vertices closer than the duplicate-edge tolerance
    pub fn merge_duplicate_vertices(&self, solid: &mut WallSolid, _tolerance: f64) -> HealingResult {
        let weld = self.config.duplicate_edge_tolerance;
        let protected = protected_points(solid, self.config.preserve_architectural_features);
        let mut merged = 0;

        for polygon in &mut solid.polygons {
            merged += merge_ring_duplicates(&mut polygon.outer, weld, &protected);
            for hole in &mut polygon.holes {
                merged += merge_ring_duplicates(hole, weld, &protected);
            }
        }

        if merged > 0 {
            solid.refresh_estimates();
        }
        HealingResult {
            changed: merged > 0,
            duplicates_merged: merged,
            ..HealingResult::default()
        }
    }

    /// Close micro-gaps by collapsing each gap pair onto its midpoint
    ///
    /// A gap is a pair of consecutive vertices separated by more than
    /// zero but no more than the micro-gap threshold. Collapsing onto the
    /// midpoint closes the gap in a single pass, keeping the composite
    /// loop convergent.
    pub fn close_micro_gaps(&self, solid: &mut WallSolid, _tolerance: f64) -> HealingResult {
        let threshold = self.config.micro_gap_threshold;
        let floor = self.config.duplicate_edge_tolerance;
        let mut closed = 0;

        for polygon in &mut solid.polygons {
            closed += close_ring_gaps(&mut polygon.outer, floor, threshold);
            for hole in &mut polygon.holes {
                closed += close_ring_gaps(hole, floor, threshold);
            }
        }

        if closed > 0 {
            solid.refresh_estimates();
        }
        HealingResult {
            changed: closed > 0,
            gaps_eliminated: closed,
            ..HealingResult::default()
        }
    }

    /// Run the three atomic operations in a loop until a fixed point
    ///
    /// Order per iteration: slivers, duplicates, gaps. Each pass that
    /// changed anything appends to the solid's healing history. The loop
    /// stops at the first iteration with no change, or at the configured
    /// iteration cap.
    pub fn heal(
        &self,
        solid: &mut WallSolid,
        tolerance: f64,
        ctx: &OperationContext,
    ) -> HealingOpResult<HealingReport> {
        if solid.polygons.is_empty() {
            return Err(HealingError::EmptySolid { wall_id: solid.id });
        }

        let mut report = HealingReport {
            iterations: 0,
            slivers_removed: 0,
            duplicates_merged: 0,
            gaps_eliminated: 0,
            reached_fixed_point: false,
            operations: Vec::new(),
        };

        for iteration in 0..self.config.max_iterations {
            if let Err(interrupt) = ctx.check() {
                return Err(HealingError::Interrupted {
                    interrupt,
                    completed_iterations: iteration,
                });
            }

            let mut changed = false;
            for (kind, result) in [
                (
                    HealingOperationKind::RemoveSliverFaces,
                    self.remove_sliver_faces(solid, tolerance),
                ),
                (
                    HealingOperationKind::MergeDuplicateVertices,
                    self.merge_duplicate_vertices(solid, tolerance),
                ),
                (
                    HealingOperationKind::CloseMicroGaps,
                    self.close_micro_gaps(solid, tolerance),
                ),
            ] {
                report.slivers_removed += result.slivers_removed;
                report.duplicates_merged += result.duplicates_merged;
                report.gaps_eliminated += result.gaps_eliminated;
                if result.changed {
                    changed = true;
                    let operation = HealingOperation {
                        kind,
                        elements_affected: result.slivers_removed
                            + result.duplicates_merged
                            + result.gaps_eliminated,
                        tolerance,
                        iteration,
                    };
                    solid.healing_history.push(operation.clone());
                    report.operations.push(operation);
                }
            }

            report.iterations = iteration + 1;
            if !changed {
                report.reached_fixed_point = true;
                break;
            }
        }

        if !report.reached_fixed_point {
            // One quiet pass confirms the cap did not hide leftover work.
            warn!(
                "healing of wall {} hit the {}-iteration cap",
                solid.id, self.config.max_iterations
            );
        }
        debug!(
            "healed wall {}: {} slivers, {} duplicates, {} gaps over {} iterations",
            solid.id,
            report.slivers_removed,
            report.duplicates_merged,
            report.gaps_eliminated,
            report.iterations
        );
        Ok(report)
    }
}

/// Vertices the healer must not remove
fn protected_points(solid: &WallSolid, preserve: bool) -> Vec<Point2D> {
    if !preserve {
        return Vec::new();
    }
    solid
        .baseline
        .points
        .iter()
        .filter(|p| p.creation_method == CreationMethod::Manual)
        .map(|p| p.coords())
        .collect()
}

fn is_sliver_ring(ring: &Ring, tolerance: f64, sliver_threshold: f64) -> bool {
    if ring.vertex_count() < 4 {
        return true;
    }
    let area = ring.signed_area().abs();
    if area < tolerance * tolerance {
        return true;
    }
    let perimeter = ring.perimeter();
    if perimeter > 0.0 {
        let isoperimetric = 4.0 * std::f64::consts::PI * area / (perimeter * perimeter);
        if isoperimetric < sliver_threshold {
            return true;
        }
    }
    false
}

fn merge_ring_duplicates(ring: &mut Ring, weld: f64, protected: &[Point2D]) -> usize {
    let n = ring.vertex_count();
    if n == 0 {
        return 0;
    }
    let open = &ring.points[..n];
    let mut kept: Vec<Point2D> = Vec::with_capacity(n);
    let mut merged = 0;

    let protected_distance = |p: Point2D| {
        protected
            .iter()
            .map(|&q| distance(q, p))
            .fold(f64::INFINITY, f64::min)
    };
    for &p in open {
        match kept.last() {
            Some(&prev) if distance(prev, p) <= weld && distance(prev, p) > 0.0 => {
                // Keep whichever vertex sits closer to a protected point.
                if protected_distance(p) < protected_distance(prev) {
                    *kept.last_mut().unwrap() = p;
                }
                merged += 1;
            }
            Some(&prev) if prev == p => {
                merged += 1;
            }
            _ => kept.push(p),
        }
    }
    // The seam: first and last may close within the weld distance.
    if kept.len() > 1 {
        let first = kept[0];
        let last = *kept.last().unwrap();
        if distance(first, last) <= weld && first != last {
            kept.pop();
            merged += 1;
        }
    }

    if merged > 0 {
        *ring = Ring::new(kept);
    }
    merged
}

fn close_ring_gaps(ring: &mut Ring, floor: f64, threshold: f64) -> usize {
    let n = ring.vertex_count();
    if n == 0 {
        return 0;
    }
    let open = ring.points[..n].to_vec();
    let mut rebuilt: Vec<Point2D> = Vec::with_capacity(n);
    let mut closed = 0;

    let mut i = 0;
    while i < open.len() {
        let here = open[i];
        if i + 1 < open.len() {
            let next = open[i + 1];
            let d = distance(here, next);
            if d > floor && d <= threshold {
                rebuilt.push(midpoint(here, next));
                closed += 1;
                i += 2;
                continue;
            }
        }
        rebuilt.push(here);
        i += 1;
    }
    // Seam gap between the last and first distinct vertices.
    if rebuilt.len() > 2 {
        let d = distance(*rebuilt.last().unwrap(), rebuilt[0]);
        if d > floor && d <= threshold {
            let mid = midpoint(*rebuilt.last().unwrap(), rebuilt[0]);
            rebuilt.pop();
            rebuilt[0] = mid;
            closed += 1;
        }
    }

    if closed > 0 {
        *ring = Ring::new(rebuilt);
    }
    closed
}
