//! geometry/junctions.rs - Junction Resolvers
//!
//! Walls meet at T-, L-, cross-, and parallel-overlap junctions. Each
//! resolver computes the exact offset-line intersections bracketing the
//! junction, derives the miter apex, nudges the participating walls so
//! their boundaries share those points, and unions the result into one
//! watertight region.
//!
//! T and L share a skeleton: find the baseline intersection, bracket it
//! with the two offset-line crossings, place the apex on the bisector.
//! Cross junctions approximate: the apex is the centroid of the four
//! outermost offset crossings. Parallel overlaps skip apex geometry
//! entirely and merge the two bands.

use log::{debug, warn};

use crate::config::{constants, OffsetConfig};
use crate::error::{BooleanError, BooleanOpResult};
use crate::geometry::boolean::BooleanEngine;
use crate::geometry::offset::select_join;
use crate::geometry::primitives::{
    curve_intersections, distance, line_intersection, midpoint, normalize, point_curve_distance,
    point_segment_distance,
};
use crate::geometry::types::{
    Curve, IntersectionKind, IntersectionRecord, IntersectionState, JoinType, MiterCalculation,
    Point2D, Polygon, ResolutionMethod, Ring, WallSolid,
};

/// Nominal accuracy of an exactly-resolved junction
const NOMINAL_ACCURACY: f64 = 0.95;
/// Accuracy reported when a fallback placed the apex
const FALLBACK_ACCURACY: f64 = 0.80;

/// Outcome of resolving one junction
#[derive(Debug, Clone)]
pub struct JunctionResolution {
    /// The intersection record in `Validated` state
    pub record: IntersectionRecord,
    /// Miter bookkeeping for T and L junctions
    pub miter: Option<MiterCalculation>,
    /// Copies of the participating walls with boundaries nudged to share
    /// the offset intersections; callers commit these back to the store
    pub modified_walls: Vec<WallSolid>,
    pub warnings: Vec<String>,
}

/// Resolver for all four junction kinds
#[derive(Debug, Clone, Copy, Default)]
pub struct JunctionResolver {
    boolean: BooleanEngine,
    offset_config: OffsetConfig,
}

impl JunctionResolver {
    pub fn new(offset_config: OffsetConfig) -> Self {
        Self {
            boolean: BooleanEngine::new(),
            offset_config,
        }
    }

    /// Resolve a branch wall ending on the interior of a main wall
    pub fn resolve_t(
        &self,
        record_id: u64,
        main: &WallSolid,
        branch: &WallSolid,
        tolerance: f64,
    ) -> BooleanOpResult<JunctionResolution> {
        let mut warnings = Vec::new();
        let (p, approximate) = baseline_meeting_point(&main.baseline, &branch.baseline, tolerance);
        if approximate {
            warnings.push("baselines do not intersect; using closest approach".to_string());
        }

        // The branch approaches one side of the main wall; bracket the
        // junction where the branch offsets cross that side's offset.
        let branch_dir = tangent_towards(&branch.baseline, p);
        let away = (-branch_dir.0, -branch_dir.1);
        let main_offset = nearest_side_offset(main, offset_probe(p, away, main.thickness));
        let mut crossings = offset_crossings(branch, main_offset, tolerance);
        crossings.sort_by(|a, b| {
            distance(*a, p)
                .partial_cmp(&distance(*b, p))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let (l_int, r_int) = match bracket_pair(&crossings, tolerance) {
            Some(pair) => pair,
            None => {
                warnings.push("offset crossings missing; bracketing with band edges".to_string());
                fallback_bracket(p, branch_dir, main.thickness / 2.0, branch.thickness / 2.0)
            }
        };

        let angle = junction_angle_degrees(&main.baseline, &branch.baseline, p);
        let (apex, miter) = self.place_apex(p, branch_dir, l_int, r_int, angle, main.thickness);
        if miter.fallback_used {
            warnings.push("miter limit exceeded; junction beveled at the chord midpoint".into());
        }

        let mut modified_branch = branch.clone();
        snap_terminals(&mut modified_branch, &[l_int, r_int], branch.thickness);
        let modified_main = main.clone();

        let union = self.boolean.union(
            &modified_main.polygons,
            &modified_branch.polygons,
            tolerance,
        )?;
        warnings.extend(union.warnings.clone());

        let record = build_record(
            record_id,
            IntersectionKind::T,
            &[main.id, branch.id],
            p,
            Some(apex),
            vec![l_int, r_int],
            union.polygons,
            if miter.fallback_used {
                ResolutionMethod::MidpointFallback
            } else {
                ResolutionMethod::ExactGeometric
            },
            if miter.fallback_used || approximate {
                FALLBACK_ACCURACY
            } else {
                NOMINAL_ACCURACY
            },
        );

        Ok(JunctionResolution {
            record,
            miter: Some(miter),
            modified_walls: vec![modified_main, modified_branch],
            warnings,
        })
    }

    /// Resolve two walls meeting end-to-end at a corner
    pub fn resolve_l(
        &self,
        record_id: u64,
        a: &WallSolid,
        b: &WallSolid,
        tolerance: f64,
    ) -> BooleanOpResult<JunctionResolution> {
        let mut warnings = Vec::new();
        let (p, approximate) = baseline_meeting_point(&a.baseline, &b.baseline, tolerance);
        if approximate {
            warnings.push("baselines do not meet exactly; using closest approach".to_string());
        }

        // Directions walking away from the corner along each baseline.
        let away_a = tangent_away(&a.baseline, p);
        let away_b = tangent_away(&b.baseline, p);

        // Outer corner pair: extend the offset lines adjacent to the
        // corner and intersect them algebraically. Each wall's outer
        // offset is the one pointing away from the interior bisector;
        // left/right alone is not enough because a wall may meet the
        // corner at either terminal.
        let interior = normalize((away_a.0 + away_b.0, away_a.1 + away_b.1)).unwrap_or((1.0, 0.0));
        let (outer_a, inner_a) = outer_inner_offsets(a, p, interior);
        let (outer_b, inner_b) = outer_inner_offsets(b, p, interior);
        let l_int = extended_crossing(outer_a, outer_b, p, tolerance).unwrap_or_else(|| {
            warnings.push("outer offset lines are parallel; using chord midpoint".to_string());
            midpoint(terminal_nearest(outer_a, p), terminal_nearest(outer_b, p))
        });
        let r_int = extended_crossing(inner_a, inner_b, p, tolerance).unwrap_or_else(|| {
            warnings.push("inner offset lines are parallel; using chord midpoint".to_string());
            midpoint(terminal_nearest(inner_a, p), terminal_nearest(inner_b, p))
        });

        let angle = junction_angle_degrees(&a.baseline, &b.baseline, p);
        // Skew corners outside the right-angle window resolve with the
        // same construction but degraded accuracy expectations.
        let skew = (angle - 90.0).abs() > constants::RIGHT_ANGLE_WINDOW_DEG;
        // The outward bisector points into the outer corner.
        let bisector = normalize((-(away_a.0 + away_b.0), -(away_a.1 + away_b.1)))
            .unwrap_or((1.0, 0.0));
        let (apex, miter) = self.place_apex(p, bisector, l_int, r_int, angle, a.thickness);
        if miter.fallback_used {
            warnings.push("miter limit exceeded; corner beveled at the chord midpoint".into());
        }

        let mut modified_a = a.clone();
        let mut modified_b = b.clone();
        snap_terminals(&mut modified_a, &[l_int, r_int], a.thickness);
        snap_terminals(&mut modified_b, &[l_int, r_int], b.thickness);

        let union = self
            .boolean
            .union(&modified_a.polygons, &modified_b.polygons, tolerance)?;
        warnings.extend(union.warnings.clone());

        let record = build_record(
            record_id,
            IntersectionKind::L,
            &[a.id, b.id],
            p,
            Some(apex),
            vec![l_int, r_int],
            union.polygons,
            if miter.fallback_used {
                ResolutionMethod::MidpointFallback
            } else {
                ResolutionMethod::ExactGeometric
            },
            if miter.fallback_used || approximate || skew {
                FALLBACK_ACCURACY
            } else {
                NOMINAL_ACCURACY
            },
        );

        Ok(JunctionResolution {
            record,
            miter: Some(miter),
            modified_walls: vec![modified_a, modified_b],
            warnings,
        })
    }

    /// Resolve walls passing through a shared point
    ///
    /// The apex is the centroid of the four outermost offset crossings, a
    /// documented approximation for junctions with many incident walls.
    pub fn resolve_cross(
        &self,
        record_id: u64,
        walls: &[&WallSolid],
        tolerance: f64,
    ) -> BooleanOpResult<JunctionResolution> {
        if walls.len() < 2 {
            return Err(BooleanError::degenerate(
                "a cross junction needs at least two walls",
            ));
        }
        let mut warnings = Vec::new();
        let (p, approximate) =
            baseline_meeting_point(&walls[0].baseline, &walls[1].baseline, tolerance);
        if approximate {
            warnings.push("baselines do not intersect; using closest approach".to_string());
        }

        // All-pairs crossings among every incident wall's offsets.
        let mut crossings: Vec<Point2D> = Vec::new();
        for (i, wa) in walls.iter().enumerate() {
            for wb in walls.iter().skip(i + 1) {
                for ca in [&wa.offsets.left.curve, &wa.offsets.right.curve] {
                    for cb in [&wb.offsets.left.curve, &wb.offsets.right.curve] {
                        crossings.extend(curve_intersections(ca, cb, tolerance));
                    }
                }
            }
        }

        let (apex, method, accuracy) = if crossings.len() >= 4 {
            let mean = centroid(&crossings);
            crossings.sort_by(|a, b| {
                distance(*b, mean)
                    .partial_cmp(&distance(*a, mean))
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            let outermost = &crossings[..4];
            (
                centroid(outermost),
                ResolutionMethod::ApproximateCentroid,
                NOMINAL_ACCURACY,
            )
        } else {
            warnings.push("fewer than four offset crossings; apex falls back to the baseline intersection".to_string());
            (p, ResolutionMethod::ApproximateCentroid, FALLBACK_ACCURACY)
        };

        let solids: Vec<&WallSolid> = walls.to_vec();
        let union = self
            .boolean
            .batch_union(&solids, tolerance, &crate::context::OperationContext::new())?;
        warnings.extend(union.warnings.clone());

        let ids: Vec<u64> = walls.iter().map(|w| w.id).collect();
        let offset_intersections = crossings.iter().take(4).copied().collect();
        let record = build_record(
            record_id,
            IntersectionKind::Cross,
            &ids,
            p,
            Some(apex),
            offset_intersections,
            union.polygons,
            method,
            accuracy,
        );

        Ok(JunctionResolution {
            record,
            miter: None,
            modified_walls: walls.iter().map(|w| (*w).clone()).collect(),
            warnings,
        })
    }

    /// Merge two near-parallel walls whose offset bands overlap
    pub fn resolve_parallel_overlap(
        &self,
        record_id: u64,
        a: &WallSolid,
        b: &WallSolid,
        tolerance: f64,
    ) -> BooleanOpResult<JunctionResolution> {
        let mut warnings = Vec::new();
        if !walls_parallel(a, b) {
            warnings.push("baselines exceed the parallel threshold; merging anyway".to_string());
        }
        if !bands_overlap(a, b) {
            return Err(BooleanError::degenerate(
                "offset bands do not overlap; nothing to merge",
            ));
        }

        let union = self.boolean.union(&a.polygons, &b.polygons, tolerance)?;
        warnings.extend(union.warnings.clone());

        // Record the overlap at the midpoint of the two baseline midpoints.
        let mid_a = curve_midpoint(&a.baseline);
        let mid_b = curve_midpoint(&b.baseline);
        let record = build_record(
            record_id,
            IntersectionKind::ParallelOverlap,
            &[a.id, b.id],
            midpoint(mid_a, mid_b),
            None,
            Vec::new(),
            union.polygons,
            ResolutionMethod::ParallelMerge,
            NOMINAL_ACCURACY,
        );

        Ok(JunctionResolution {
            record,
            miter: None,
            modified_walls: vec![a.clone(), b.clone()],
            warnings,
        })
    }

    /// Place the miter apex on the bisector ray, honoring the miter limit
    fn place_apex(
        &self,
        p: Point2D,
        bisector: Point2D,
        l_int: Point2D,
        r_int: Point2D,
        angle_degrees: f64,
        thickness: f64,
    ) -> (Point2D, MiterCalculation) {
        let chord = (r_int.0 - l_int.0, r_int.1 - l_int.1);
        let exact = line_intersection(p, bisector, l_int, chord, 1e-12)
            .filter(|apex| {
                // Keep the apex on the chord, not on its extension.
                point_segment_distance(*apex, l_int, r_int)
                    <= distance(l_int, r_int).max(1.0) * 1e-6
            })
            // A right-angle corner puts the bisector along the chord
            // itself; the outer crossing is the exact apex.
            .unwrap_or(l_int);

        let half_distance = thickness / 2.0;
        let miter_ratio = distance(exact, p) / half_distance.max(f64::EPSILON);
        let join = select_join(angle_degrees, thickness, 0.0, self.offset_config.miter_limit);

        if miter_ratio > self.offset_config.miter_limit {
            let apex = midpoint(l_int, r_int);
            debug!(
                "miter ratio {miter_ratio:.2} exceeds limit {}; beveling",
                self.offset_config.miter_limit
            );
            (
                apex,
                MiterCalculation {
                    apex,
                    offset_intersections: (l_int, r_int),
                    angle_degrees,
                    join_type: JoinType::Bevel,
                    fallback_used: true,
                },
            )
        } else {
            (
                exact,
                MiterCalculation {
                    apex: exact,
                    offset_intersections: (l_int, r_int),
                    angle_degrees,
                    join_type: join,
                    fallback_used: false,
                },
            )
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn build_record(
    id: u64,
    kind: IntersectionKind,
    wall_ids: &[u64],
    intersection_point: Point2D,
    miter_apex: Option<Point2D>,
    offset_intersections: Vec<Point2D>,
    resolved_geometry: Vec<Polygon>,
    method: ResolutionMethod,
    accuracy: f64,
) -> IntersectionRecord {
    let mut ids = wall_ids.to_vec();
    ids.sort_unstable();
    let state = if resolved_geometry.is_empty() {
        warn!("junction {id} resolved to empty geometry; leaving record proposed");
        IntersectionState::Proposed
    } else {
        IntersectionState::Validated
    };
    IntersectionRecord {
        id,
        kind,
        wall_ids: ids,
        intersection_point,
        miter_apex,
        offset_intersections,
        resolved_geometry,
        method,
        accuracy,
        state,
    }
}

/// Baseline intersection, or the closest approach when they miss
fn baseline_meeting_point(a: &Curve, b: &Curve, tolerance: f64) -> (Point2D, bool) {
    let hits = curve_intersections(a, b, tolerance);
    if let Some(&p) = hits.first() {
        return (p, false);
    }
    // Closest approach: the b vertex nearest to a, projected onto a.
    let mut best = (a.start(), f64::INFINITY);
    for q in b.coords() {
        let d = point_curve_distance(q, a);
        if d < best.1 {
            best = (q, d);
        }
    }
    (best.0, true)
}

/// Unit tangent of the curve terminal nearest `p`, pointing toward `p`
fn tangent_towards(curve: &Curve, p: Point2D) -> Point2D {
    let away = tangent_away(curve, p);
    (-away.0, -away.1)
}

/// Unit tangent of the curve terminal nearest `p`, pointing away from it
fn tangent_away(curve: &Curve, p: Point2D) -> Point2D {
    let start_d = distance(curve.start(), p);
    let end_d = distance(curve.end(), p);
    let tangents = curve.tangents();
    if start_d <= end_d {
        tangents[0]
    } else {
        let t = tangents[tangents.len() - 1];
        (-t.0, -t.1)
    }
}

/// A probe point one half-thickness from `p` opposite the approach
fn offset_probe(p: Point2D, away: Point2D, thickness: f64) -> Point2D {
    (
        p.0 + away.0 * thickness / 2.0,
        p.1 + away.1 * thickness / 2.0,
    )
}

/// Whichever of the wall's two offsets passes nearer the probe
fn nearest_side_offset<'a>(wall: &'a WallSolid, probe: Point2D) -> &'a Curve {
    let left = &wall.offsets.left.curve;
    let right = &wall.offsets.right.curve;
    if point_curve_distance(probe, left) <= point_curve_distance(probe, right) {
        left
    } else {
        right
    }
}

/// Crossings between either of a wall's offsets and a target curve
fn offset_crossings(wall: &WallSolid, target: &Curve, tolerance: f64) -> Vec<Point2D> {
    let mut hits = curve_intersections(&wall.offsets.left.curve, target, tolerance);
    hits.extend(curve_intersections(&wall.offsets.right.curve, target, tolerance));
    hits
}

/// First two crossings at least a tolerance apart
fn bracket_pair(sorted: &[Point2D], tolerance: f64) -> Option<(Point2D, Point2D)> {
    let first = *sorted.first()?;
    let second = sorted
        .iter()
        .skip(1)
        .find(|q| distance(first, **q) > tolerance)?;
    Some((first, *second))
}

/// Synthetic bracket when the offsets never cross (detached branch)
fn fallback_bracket(
    p: Point2D,
    branch_dir: Point2D,
    main_half: f64,
    branch_half: f64,
) -> (Point2D, Point2D) {
    let normal = (-branch_dir.1, branch_dir.0);
    let foot = (p.0 + branch_dir.0 * main_half, p.1 + branch_dir.1 * main_half);
    (
        (foot.0 + normal.0 * branch_half, foot.1 + normal.1 * branch_half),
        (foot.0 - normal.0 * branch_half, foot.1 - normal.1 * branch_half),
    )
}

/// Split a wall's offsets into (outer, inner) relative to the corner
/// interior direction at `p`
fn outer_inner_offsets<'a>(
    wall: &'a WallSolid,
    p: Point2D,
    interior: Point2D,
) -> (&'a Curve, &'a Curve) {
    let left = &wall.offsets.left.curve;
    let right = &wall.offsets.right.curve;
    let score = |curve: &Curve| {
        let t = terminal_nearest(curve, p);
        (t.0 - p.0) * interior.0 + (t.1 - p.1) * interior.1
    };
    if score(left) < score(right) {
        (left, right)
    } else {
        (right, left)
    }
}

/// Intersect the terminal segments of two offset curves as infinite lines
fn extended_crossing(a: &Curve, b: &Curve, near: Point2D, tolerance: f64) -> Option<Point2D> {
    let (a_origin, a_dir) = terminal_segment(a, near);
    let (b_origin, b_dir) = terminal_segment(b, near);
    line_intersection(a_origin, a_dir, b_origin, b_dir, tolerance * 1e-3)
}

/// Origin and direction of the curve segment adjacent to `near`
fn terminal_segment(curve: &Curve, near: Point2D) -> (Point2D, Point2D) {
    let coords = curve.coords();
    let n = coords.len();
    if distance(coords[0], near) <= distance(coords[n - 1], near) {
        let dir = normalize((coords[1].0 - coords[0].0, coords[1].1 - coords[0].1))
            .unwrap_or((1.0, 0.0));
        (coords[0], dir)
    } else {
        let dir = normalize((
            coords[n - 1].0 - coords[n - 2].0,
            coords[n - 1].1 - coords[n - 2].1,
        ))
        .unwrap_or((1.0, 0.0));
        (coords[n - 1], dir)
    }
}

/// The curve terminal vertex nearest `p`
fn terminal_nearest(curve: &Curve, p: Point2D) -> Point2D {
    if distance(curve.start(), p) <= distance(curve.end(), p) {
        curve.start()
    } else {
        curve.end()
    }
}

/// Interior angle between two baselines at their meeting point, degrees
fn junction_angle_degrees(a: &Curve, b: &Curve, p: Point2D) -> f64 {
    let da = tangent_away(a, p);
    let db = tangent_away(b, p);
    let cos = (da.0 * db.0 + da.1 * db.1).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Move each offset terminal nearest a target onto that target, then
/// rebuild the solid's boundary polygon from the adjusted offsets
fn snap_terminals(solid: &mut WallSolid, targets: &[Point2D], max_snap: f64) {
    for &target in targets {
        let mut best: Option<(usize, usize, f64)> = None; // curve idx, vertex idx, dist
        for (curve_idx, curve) in [&solid.offsets.left.curve, &solid.offsets.right.curve]
            .iter()
            .enumerate()
        {
            let n = curve.points.len();
            for vertex_idx in [0, n - 1] {
                let d = distance(curve.points[vertex_idx].coords(), target);
                if d <= max_snap && best.map(|(_, _, bd)| d < bd).unwrap_or(true) {
                    best = Some((curve_idx, vertex_idx, d));
                }
            }
        }
        if let Some((curve_idx, vertex_idx, _)) = best {
            let curve = if curve_idx == 0 {
                &mut solid.offsets.left.curve
            } else {
                &mut solid.offsets.right.curve
            };
            curve.points[vertex_idx].x = target.0;
            curve.points[vertex_idx].y = target.1;
        }
    }
    rebuild_band_polygon(solid);
}

/// Rebuild the boundary polygon as left offset forward, right backward
fn rebuild_band_polygon(solid: &mut WallSolid) {
    let mut coords = solid.offsets.left.curve.coords();
    let mut right = solid.offsets.right.curve.coords();
    right.reverse();
    coords.extend(right);
    solid.polygons = vec![Polygon::new(Ring::new(coords), Vec::new())];
    solid.refresh_estimates();
}

fn centroid(points: &[Point2D]) -> Point2D {
    let n = points.len().max(1) as f64;
    let sum = points
        .iter()
        .fold((0.0, 0.0), |acc, p| (acc.0 + p.0, acc.1 + p.1));
    (sum.0 / n, sum.1 / n)
}

fn curve_midpoint(curve: &Curve) -> Point2D {
    let coords = curve.coords();
    let target = curve.length() / 2.0;
    let mut walked = 0.0;
    for w in coords.windows(2) {
        let seg = distance(w[0], w[1]);
        if walked + seg >= target && seg > 0.0 {
            let t = (target - walked) / seg;
            return crate::geometry::primitives::lerp(w[0], w[1], t);
        }
        walked += seg;
    }
    curve.end()
}

/// True when the walls' dominant directions differ by less than the
/// parallel-overlap threshold
pub fn walls_parallel(a: &WallSolid, b: &WallSolid) -> bool {
    let da = dominant_direction(&a.baseline);
    let db = dominant_direction(&b.baseline);
    let cross = (da.0 * db.1 - da.1 * db.0).abs();
    cross.asin().abs() < constants::PARALLEL_OVERLAP_THRESHOLD
}

/// True when the two offset bands share area
pub fn bands_overlap(a: &WallSolid, b: &WallSolid) -> bool {
    if !a.bounding_box().intersects(&b.bounding_box()) {
        return false;
    }
    // Bands overlap when either baseline runs closer to the other than
    // the mean of the two half-thicknesses.
    let reach = (a.thickness + b.thickness) / 2.0;
    let closest = a
        .baseline
        .coords()
        .iter()
        .map(|&p| point_curve_distance(p, &b.baseline))
        .fold(f64::INFINITY, f64::min);
    closest < reach
}

fn dominant_direction(curve: &Curve) -> Point2D {
    normalize((
        curve.end().0 - curve.start().0,
        curve.end().1 - curve.start().1,
    ))
    .unwrap_or((1.0, 0.0))
}

/// Classify the junction between two walls from their baselines
///
/// Near-parallel pairs are overlaps; otherwise termination at the
/// meeting point separates L (both end there), T (one ends there), and
/// cross (neither ends there).
pub fn classify_junction(a: &WallSolid, b: &WallSolid, tolerance: f64) -> Option<IntersectionKind> {
    if walls_parallel(a, b) {
        return if bands_overlap(a, b) {
            Some(IntersectionKind::ParallelOverlap)
        } else {
            None
        };
    }
    let (p, approximate) = baseline_meeting_point(&a.baseline, &b.baseline, tolerance);
    if approximate {
        let near = point_curve_distance(p, &a.baseline) <= (a.thickness + b.thickness) / 2.0
            && point_curve_distance(p, &b.baseline) <= (a.thickness + b.thickness) / 2.0;
        if !near {
            return None;
        }
    }
    // Terminal slack scales with thickness so junctions drawn to the
    // baseline rather than the boundary still classify.
    let slack = |w: &WallSolid| (w.thickness / 2.0).max(tolerance * 10.0);
    let a_terminates =
        distance(a.baseline.start(), p) <= slack(a) || distance(a.baseline.end(), p) <= slack(a);
    let b_terminates =
        distance(b.baseline.start(), p) <= slack(b) || distance(b.baseline.end(), p) <= slack(b);
    match (a_terminates, b_terminates) {
        (true, true) => Some(IntersectionKind::L),
        (false, false) => Some(IntersectionKind::Cross),
        _ => Some(IntersectionKind::T),
    }
}
