//! geometry/offset.rs - Robust Offset Engine
//!
//! Offsets a baseline curve to both sides at a signed distance, producing
//! the left/right offset pair that bounds a wall solid. Joins at segment
//! junctions are miter, bevel, or round, with an automatic selector when
//! the caller does not care.
//!
//! Failure never surfaces from a single numeric mishap: the engine runs an
//! ordered cascade of fallback strategies (baseline simplification with
//! all-bevel joins, relaxed tolerance with a tight miter limit, windowed
//! processing with stitching) and reports which strategy produced the
//! result. Only when every stage fails does the caller see an error.

use log::{debug, warn};

use crate::config::{constants, OffsetConfig};
use crate::context::OperationContext;
use crate::error::{GeometryResult, OffsetError, OffsetOpResult};
use crate::geometry::primitives::{
    cross, direction, distance, line_intersection, normalize, point_line_distance, rot90,
};
use crate::geometry::types::{
    Curve, CurveKind, JoinType, OffsetCurve, OffsetPair, Point, Point2D, Polygon, Ring, WallSolid,
    WallType,
};

/// Baseline curvature above which the auto selector prefers bevel joins
/// in the mid-angle band (radians per unit length)
const HIGH_CURVATURE_THRESHOLD: f64 = 0.05;

/// Thickness above which the auto selector treats a wall as "thick" (mm)
const THICK_WALL_THRESHOLD: f64 = 200.0;

/// Join request passed to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinSelection {
    /// Let the engine pick per junction from angle, thickness, curvature
    Auto,
    /// Use one join type at every junction (still subject to the miter
    /// limit downgrade)
    Fixed(JoinType),
}

/// Outcome of an offset operation
#[derive(Debug, Clone)]
pub struct OffsetResult {
    pub left: OffsetCurve,
    pub right: OffsetCurve,
    /// The join that ended up dominating the junctions: the requested one
    /// when every junction honored it, otherwise the downgrade
    pub join_type_used: JoinType,
    pub warnings: Vec<String>,
    /// True when a fallback strategy or a miter-limit downgrade fired
    pub fallback_used: bool,
}

/// Pure join selector used when the caller passes [`JoinSelection::Auto`]
///
/// The decision table trades sharp geometry for robustness: very acute
/// junctions get round joins, the mid band bevels on thick or strongly
/// curved walls, and everything wider than 120 degrees miters safely.
pub fn select_join(
    angle_degrees: f64,
    thickness: f64,
    curvature: f64,
    miter_limit: f64,
) -> JoinType {
    if angle_degrees < 15.0 {
        return JoinType::Round;
    }
    if angle_degrees < 45.0 {
        if thickness > THICK_WALL_THRESHOLD || curvature.abs() > HIGH_CURVATURE_THRESHOLD {
            return JoinType::Bevel;
        }
        return JoinType::Round;
    }
    if angle_degrees <= 120.0 {
        let half = (angle_degrees / 2.0).to_radians();
        let miter_length = if half.sin() > 0.0 {
            thickness / (2.0 * half.sin())
        } else {
            f64::INFINITY
        };
        if miter_length <= miter_limit * thickness {
            return JoinType::Miter;
        }
        return JoinType::Bevel;
    }
    JoinType::Miter
}

/// One side of an offset attempt, before post-validation
struct SideOutcome {
    coords: Vec<Point2D>,
    joins: Vec<JoinType>,
    downgraded: bool,
}

/// Both sides of a successful attempt
struct AttemptOutcome {
    left: SideOutcome,
    right: SideOutcome,
}

/// A recovery strategy tried in order after the primary algorithm fails
///
/// Strategies own their parameter overrides; the engine records the name
/// of the strategy that succeeded in the result warnings.
trait OffsetFallbackStrategy {
    fn name(&self) -> &'static str;

    fn attempt(
        &self,
        engine: &OffsetEngine,
        coords: &[Point2D],
        offset_distance: f64,
        join: JoinSelection,
    ) -> Result<AttemptOutcome, String>;
}

/// Stage 1: drop near-collinear vertices, retry with all-bevel joins
struct SimplifyAndBevel;

impl OffsetFallbackStrategy for SimplifyAndBevel {
    fn name(&self) -> &'static str {
        "simplify-bevel"
    }

    fn attempt(
        &self,
        engine: &OffsetEngine,
        coords: &[Point2D],
        offset_distance: f64,
        _join: JoinSelection,
    ) -> Result<AttemptOutcome, String> {
        let simplified = simplify_collinear(coords, constants::SIMPLIFY_COLLINEAR_DISTANCE);
        if simplified.len() < 2 {
            return Err("baseline collapsed during collinear simplification".into());
        }
        engine.attempt_both_sides(
            &simplified,
            offset_distance,
            JoinSelection::Fixed(JoinType::Bevel),
            1e-3,
            engine.config.miter_limit,
        )
    }
}

/// Stage 2: retry at a coarse tolerance with a tight miter limit
struct RelaxedTolerance;

impl OffsetFallbackStrategy for RelaxedTolerance {
    fn name(&self) -> &'static str {
        "relaxed-tolerance"
    }

    fn attempt(
        &self,
        engine: &OffsetEngine,
        coords: &[Point2D],
        offset_distance: f64,
        join: JoinSelection,
    ) -> Result<AttemptOutcome, String> {
        engine.attempt_both_sides(
            coords,
            offset_distance,
            join,
            1e-2,
            constants::RELAXED_MITER_LIMIT,
        )
    }
}

/// Stage 3: offset overlapping vertex windows independently and stitch
struct WindowedProcessing;

impl OffsetFallbackStrategy for WindowedProcessing {
    fn name(&self) -> &'static str {
        "windowed"
    }

    fn attempt(
        &self,
        engine: &OffsetEngine,
        coords: &[Point2D],
        offset_distance: f64,
        _join: JoinSelection,
    ) -> Result<AttemptOutcome, String> {
        let window = (coords.len() / 4).max(2);
        let mut left = SideOutcome {
            coords: Vec::new(),
            joins: Vec::new(),
            downgraded: true,
        };
        let mut right = SideOutcome {
            coords: Vec::new(),
            joins: Vec::new(),
            downgraded: true,
        };

        let mut start = 0;
        while start + 1 < coords.len() {
            let end = (start + window + 1).min(coords.len());
            let slice = &coords[start..end];
            let outcome = engine.attempt_both_sides(
                slice,
                offset_distance,
                JoinSelection::Fixed(JoinType::Bevel),
                1e-2,
                constants::RELAXED_MITER_LIMIT,
            )?;
            stitch(&mut left, outcome.left, offset_distance.abs());
            stitch(&mut right, outcome.right, offset_distance.abs());
            if end == coords.len() {
                break;
            }
            // Windows share one vertex so the stitch has an anchor.
            start = end - 1;
        }

        if left.coords.len() < 2 || right.coords.len() < 2 {
            return Err("windowed processing produced a degenerate side".into());
        }
        Ok(AttemptOutcome { left, right })
    }
}

fn stitch(into: &mut SideOutcome, piece: SideOutcome, tolerance_hint: f64) {
    let weld = tolerance_hint.max(1e-6);
    for (i, p) in piece.coords.into_iter().enumerate() {
        if let Some(&last) = into.coords.last() {
            if distance(last, p) <= weld {
                continue;
            }
        }
        into.coords.push(p);
        into.joins
            .push(piece.joins.get(i).copied().unwrap_or(JoinType::Bevel));
    }
}

/// Remove vertices whose perpendicular distance to the chord of their
/// neighbors is at or below `max_deviation`
pub fn simplify_collinear(coords: &[Point2D], max_deviation: f64) -> Vec<Point2D> {
    if coords.len() <= 2 {
        return coords.to_vec();
    }
    let mut kept = vec![coords[0]];
    for i in 1..coords.len() - 1 {
        let prev = *kept.last().unwrap();
        let next = coords[i + 1];
        if point_line_distance(coords[i], prev, next) > max_deviation {
            kept.push(coords[i]);
        }
    }
    kept.push(coords[coords.len() - 1]);
    kept
}

/// The robust offset engine
///
/// Stateless apart from configuration; safe to share across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct OffsetEngine {
    config: OffsetConfig,
}

impl OffsetEngine {
    pub fn new(config: OffsetConfig) -> Self {
        Self { config }
    }

    /// Offset `baseline` to both sides at `offset_distance`
    ///
    /// The left offset lies along the left normal of the walk direction at
    /// `+offset_distance`; the right offset mirrors it. Errors are limited
    /// to invalid input and full fallback exhaustion.
    pub fn offset(
        &self,
        baseline: &Curve,
        offset_distance: f64,
        join: JoinSelection,
        tolerance: f64,
    ) -> OffsetOpResult<OffsetResult> {
        self.offset_with_context(
            baseline,
            offset_distance,
            join,
            tolerance,
            &OperationContext::new(),
        )
    }

    /// As [`offset`](Self::offset), polling `ctx` between fallback stages
    pub fn offset_with_context(
        &self,
        baseline: &Curve,
        offset_distance: f64,
        join: JoinSelection,
        tolerance: f64,
        ctx: &OperationContext,
    ) -> OffsetOpResult<OffsetResult> {
        if tolerance <= 0.0 || !tolerance.is_finite() {
            return Err(OffsetError::InvalidTolerance { value: tolerance });
        }
        if baseline.points.len() < 2 {
            return Err(OffsetError::BaselineTooShort {
                count: baseline.points.len(),
            });
        }
        if offset_distance.abs() <= tolerance {
            return Err(OffsetError::InvalidDistance {
                distance: offset_distance,
                tolerance,
            });
        }

        let coords = baseline.coords();
        let mut warnings = Vec::new();

        debug!(
            "offsetting baseline of {} points at distance {}",
            coords.len(),
            offset_distance
        );

        match self.attempt_both_sides(
            &coords,
            offset_distance,
            join,
            tolerance,
            self.config.miter_limit,
        ) {
            Ok(outcome) => {
                return self.finish(baseline, offset_distance, join, outcome, warnings, false)
            }
            Err(reason) => {
                warn!("primary offset failed: {reason}");
                warnings.push(format!("primary offset failed: {reason}"));
            }
        }

        let strategies: [&dyn OffsetFallbackStrategy; 3] =
            [&SimplifyAndBevel, &RelaxedTolerance, &WindowedProcessing];
        for strategy in strategies {
            ctx.check()?;
            match strategy.attempt(self, &coords, offset_distance, join) {
                Ok(outcome) => {
                    warnings.push(format!("recovered via {} fallback", strategy.name()));
                    return self.finish(baseline, offset_distance, join, outcome, warnings, true);
                }
                Err(reason) => {
                    warnings.push(format!("{} fallback failed: {reason}", strategy.name()));
                }
            }
        }

        Err(OffsetError::NumericalFailure { warnings })
    }

    /// Sweep a baseline into a full wall solid
    ///
    /// Offsets at half the thickness to each side and closes the band
    /// with end caps into a single boundary polygon.
    pub fn sweep_solid(
        &self,
        id: u64,
        baseline: Curve,
        thickness: f64,
        wall_type: WallType,
        join: JoinSelection,
        tolerance: f64,
    ) -> OffsetOpResult<WallSolid> {
        let result = self.offset(&baseline, thickness / 2.0, join, tolerance)?;
        let solid = assemble_solid(id, baseline, thickness, wall_type, &result)
            .map_err(|e| OffsetError::NumericalFailure {
                warnings: vec![format!("solid assembly failed: {e}")],
            })?;
        Ok(solid)
    }

    fn finish(
        &self,
        baseline: &Curve,
        offset_distance: f64,
        join: JoinSelection,
        outcome: AttemptOutcome,
        warnings: Vec<String>,
        via_fallback: bool,
    ) -> OffsetOpResult<OffsetResult> {
        let downgraded = outcome.left.downgraded || outcome.right.downgraded;
        let left = side_to_curve(outcome.left, offset_distance, baseline.tolerance)
            .map_err(|reason| OffsetError::NumericalFailure {
                warnings: vec![format!("left side post-validation failed: {reason}")],
            })?;
        let right = side_to_curve(outcome.right, -offset_distance, baseline.tolerance)
            .map_err(|reason| OffsetError::NumericalFailure {
                warnings: vec![format!("right side post-validation failed: {reason}")],
            })?;

        let requested = match join {
            JoinSelection::Fixed(j) => j,
            JoinSelection::Auto => JoinType::Miter,
        };
        let join_type_used = if downgraded && requested == JoinType::Miter {
            JoinType::Bevel
        } else {
            requested
        };

        Ok(OffsetResult {
            left,
            right,
            join_type_used,
            warnings,
            fallback_used: via_fallback || downgraded,
        })
    }

    fn attempt_both_sides(
        &self,
        coords: &[Point2D],
        offset_distance: f64,
        join: JoinSelection,
        tolerance: f64,
        miter_limit: f64,
    ) -> Result<AttemptOutcome, String> {
        let left = self.offset_one_side(coords, offset_distance, join, tolerance, miter_limit)?;
        let right = self.offset_one_side(coords, -offset_distance, join, tolerance, miter_limit)?;
        Ok(AttemptOutcome { left, right })
    }

    /// Walk the segments, offset each along its left normal, and join
    /// adjacent offset segments at the shared baseline vertex
    fn offset_one_side(
        &self,
        coords: &[Point2D],
        offset_distance: f64,
        join: JoinSelection,
        tolerance: f64,
        miter_limit: f64,
    ) -> Result<SideOutcome, String> {
        // Offset every usable segment.
        let mut segments: Vec<(Point2D, Point2D, Point2D)> = Vec::new(); // start, end, unit dir
        for w in coords.windows(2) {
            let seg_len = distance(w[0], w[1]);
            if seg_len < constants::MIN_SEGMENT_LENGTH {
                continue;
            }
            let dir = normalize(direction(w[0], w[1])).ok_or("zero-length segment survived")?;
            let normal = rot90(dir);
            let start = (
                w[0].0 + normal.0 * offset_distance,
                w[0].1 + normal.1 * offset_distance,
            );
            let end = (
                w[1].0 + normal.0 * offset_distance,
                w[1].1 + normal.1 * offset_distance,
            );
            segments.push((start, end, dir));
        }
        if segments.is_empty() {
            return Err("no segment exceeds the minimum length".into());
        }

        let thickness = 2.0 * offset_distance.abs();
        let mut out = SideOutcome {
            coords: vec![segments[0].0],
            joins: vec![self.config.default_join],
            downgraded: false,
        };

        for i in 0..segments.len() - 1 {
            let (_, prev_end, prev_dir) = segments[i];
            let (next_start, _, next_dir) = segments[i + 1];

            // Interior angle between the incoming and outgoing segments.
            let angle_degrees = {
                let reversed = (-prev_dir.0, -prev_dir.1);
                let cos = (reversed.0 * next_dir.0 + reversed.1 * next_dir.1).clamp(-1.0, 1.0);
                cos.acos().to_degrees()
            };

            let requested = match join {
                JoinSelection::Fixed(j) => j,
                JoinSelection::Auto => {
                    let curvature = cross(prev_dir, next_dir);
                    select_join(angle_degrees, thickness, curvature, miter_limit)
                }
            };

            // The miter limit caps the apex excursion regardless of the
            // requested join.
            let half_angle = (angle_degrees / 2.0).to_radians();
            let miter_ratio = if half_angle.sin() > 0.0 {
                1.0 / half_angle.sin()
            } else {
                f64::INFINITY
            };
            let applied = if requested == JoinType::Miter && miter_ratio > miter_limit {
                out.downgraded = true;
                JoinType::Bevel
            } else {
                requested
            };

            if distance(prev_end, next_start) <= tolerance {
                // Collinear junction: nothing to join.
                push_vertex(&mut out, prev_end, applied, tolerance);
                continue;
            }

            match applied {
                JoinType::Miter => {
                    let apex = line_intersection(
                        prev_end,
                        prev_dir,
                        next_start,
                        next_dir,
                        tolerance * 1e-3,
                    )
                    .ok_or("miter lines are parallel")?;
                    if !apex.0.is_finite() || !apex.1.is_finite() {
                        return Err("miter apex is not finite".into());
                    }
                    push_vertex(&mut out, apex, JoinType::Miter, tolerance);
                }
                JoinType::Bevel => {
                    push_vertex(&mut out, prev_end, JoinType::Bevel, tolerance);
                    push_vertex(&mut out, next_start, JoinType::Bevel, tolerance);
                }
                JoinType::Round => {
                    push_vertex(&mut out, prev_end, JoinType::Round, tolerance);
                    // The arc center is the baseline vertex: the offset
                    // endpoint pulled back along the segment normal.
                    let prev_normal = rot90(prev_dir);
                    let vertex = (
                        prev_end.0 - prev_normal.0 * offset_distance,
                        prev_end.1 - prev_normal.1 * offset_distance,
                    );
                    for p in round_join_points(
                        vertex,
                        prev_end,
                        next_start,
                        offset_distance.abs(),
                        self.config.round_segments,
                    ) {
                        push_vertex(&mut out, p, JoinType::Round, tolerance);
                    }
                    push_vertex(&mut out, next_start, JoinType::Round, tolerance);
                }
            }
        }

        let last = segments[segments.len() - 1].1;
        push_vertex(&mut out, last, self.config.default_join, tolerance);

        if out.coords.len() < 2 {
            return Err("offset side collapsed below two points".into());
        }
        Ok(out)
    }
}

fn push_vertex(out: &mut SideOutcome, p: Point2D, join: JoinType, tolerance: f64) {
    if let Some(&last) = out.coords.last() {
        if distance(last, p) <= tolerance {
            return;
        }
    }
    out.coords.push(p);
    out.joins.push(join);
}

/// Sample an arc of radius `radius` around `center` from `from` to `to`
fn round_join_points(
    center: Point2D,
    from: Point2D,
    to: Point2D,
    radius: f64,
    segments: usize,
) -> Vec<Point2D> {
    let a0 = (from.1 - center.1).atan2(from.0 - center.0);
    let a1 = (to.1 - center.1).atan2(to.0 - center.0);
    let mut sweep = a1 - a0;
    while sweep > std::f64::consts::PI {
        sweep -= 2.0 * std::f64::consts::PI;
    }
    while sweep < -std::f64::consts::PI {
        sweep += 2.0 * std::f64::consts::PI;
    }
    let mut points = Vec::with_capacity(segments.saturating_sub(1));
    for k in 1..segments {
        let angle = a0 + sweep * (k as f64 / segments as f64);
        points.push((
            center.0 + radius * angle.cos(),
            center.1 + radius * angle.sin(),
        ));
    }
    points
}

fn side_to_curve(
    side: SideOutcome,
    signed_distance: f64,
    tolerance: f64,
) -> Result<OffsetCurve, String> {
    for &(x, y) in &side.coords {
        if !x.is_finite() || !y.is_finite() {
            return Err("non-finite coordinate".into());
        }
    }
    let points: Vec<Point> = side
        .coords
        .iter()
        .map(|&(x, y)| Point::with_method(x, y, crate::geometry::types::CreationMethod::OffsetOperation))
        .collect();
    let curve = Curve::new(CurveKind::Polyline, points, tolerance.min(1e-9).max(1e-12))
        .map_err(|e| e.to_string())?;
    Ok(OffsetCurve {
        curve,
        distance: signed_distance,
        joins: side.joins,
    })
}

/// Close an offset pair into the solid's boundary polygon
///
/// The ring walks the left offset forward and the right offset backward;
/// the two connecting edges are the wall's end caps.
pub fn assemble_solid(
    id: u64,
    baseline: Curve,
    thickness: f64,
    wall_type: WallType,
    offsets: &OffsetResult,
) -> GeometryResult<WallSolid> {
    let mut ring_coords = offsets.left.curve.coords();
    let mut right_coords = offsets.right.curve.coords();
    right_coords.reverse();
    ring_coords.extend(right_coords);
    let polygon = Polygon::new(Ring::new(ring_coords), Vec::new());

    WallSolid::new(
        id,
        baseline,
        thickness,
        wall_type,
        OffsetPair {
            left: offsets.left.clone(),
            right: offsets.right.clone(),
        },
        vec![polygon],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::primitives::point_curve_distance;

    fn engine() -> OffsetEngine {
        OffsetEngine::new(OffsetConfig::default())
    }

    #[test]
    fn straight_baseline_offsets_both_sides() {
        let baseline = Curve::polyline(&[(0.0, 0.0), (1000.0, 0.0)], 1e-6).unwrap();
        let result = engine()
            .offset(&baseline, 125.0, JoinSelection::Fixed(JoinType::Miter), 1e-6)
            .expect("offset succeeds");
        assert!(!result.fallback_used);
        assert_eq!(result.left.curve.start(), (0.0, 125.0));
        assert_eq!(result.left.curve.end(), (1000.0, 125.0));
        assert_eq!(result.right.curve.start(), (0.0, -125.0));
        assert_eq!(result.right.curve.end(), (1000.0, -125.0));
    }

    #[test]
    fn zero_distance_is_invalid_input() {
        let baseline = Curve::polyline(&[(0.0, 0.0), (1000.0, 0.0)], 1e-6).unwrap();
        let result = engine().offset(&baseline, 0.0, JoinSelection::Fixed(JoinType::Miter), 1e-6);
        assert!(matches!(result, Err(OffsetError::InvalidDistance { .. })));
    }

    #[test]
    fn right_angle_miter_meets_at_apex() {
        let baseline = Curve::polyline(&[(0.0, 0.0), (1000.0, 0.0), (1000.0, 1000.0)], 1e-6).unwrap();
        let result = engine()
            .offset(&baseline, 125.0, JoinSelection::Fixed(JoinType::Miter), 1e-6)
            .expect("offset succeeds");
        assert!(!result.fallback_used);
        // Outer corner (right side) miters at (1125, -125).
        let right = result.right.curve.coords();
        assert!(right
            .iter()
            .any(|&p| distance(p, (1125.0, -125.0)) < 1e-6));
    }

    #[test]
    fn sharp_angle_downgrades_miter_to_bevel() {
        // Interior angle of 5 degrees is far below 2*asin(1/10) ~ 11.48.
        let spike = (
            0.0 + 1000.0 * (5.0f64).to_radians().cos(),
            1000.0 * (5.0f64).to_radians().sin(),
        );
        let baseline = Curve::polyline(&[(1000.0, 0.0), (0.0, 0.0), spike], 1e-6).unwrap();
        let result = engine()
            .offset(&baseline, 125.0, JoinSelection::Fixed(JoinType::Miter), 1e-6)
            .expect("offset succeeds");
        assert_eq!(result.join_type_used, JoinType::Bevel);
        assert!(result.fallback_used);
    }

    #[test]
    fn offset_distance_invariant_holds_along_baseline() {
        let baseline =
            Curve::polyline(&[(0.0, 0.0), (800.0, 0.0), (800.0, 600.0), (0.0, 600.0)], 1e-6)
                .unwrap();
        let result = engine()
            .offset(&baseline, 125.0, JoinSelection::Fixed(JoinType::Miter), 1e-6)
            .expect("offset succeeds");
        for t in [0.1, 0.35, 0.6, 0.85] {
            let idx = ((baseline.points.len() - 1) as f64 * t) as usize;
            let (a, b) = (
                baseline.points[idx].coords(),
                baseline.points[idx + 1].coords(),
            );
            let sample = crate::geometry::primitives::lerp(a, b, 0.5);
            let dl = point_curve_distance(sample, &result.left.curve);
            let dr = point_curve_distance(sample, &result.right.curve);
            assert!((dl - 125.0).abs() < 1e-6, "left distance {dl}");
            assert!((dr - 125.0).abs() < 1e-6, "right distance {dr}");
        }
    }

    #[test]
    fn duplicate_consecutive_vertices_are_dropped() {
        // The duplicate collapses at curve construction; offsetting then
        // sees a clean two-segment baseline and succeeds.
        let baseline = Curve::polyline(
            &[(0.0, 0.0), (500.0, 0.0), (500.0, 0.0), (1000.0, 0.0)],
            1e-6,
        )
        .unwrap();
        let result = engine()
            .offset(&baseline, 125.0, JoinSelection::Fixed(JoinType::Miter), 1e-6)
            .expect("offset succeeds");
        assert!(!result.fallback_used);
        assert_eq!(result.left.curve.end(), (1000.0, 125.0));
    }

    #[test]
    fn round_join_samples_the_configured_chord_count() {
        let baseline = Curve::polyline(&[(0.0, 0.0), (1000.0, 0.0), (1000.0, 1000.0)], 1e-6).unwrap();
        let result = engine()
            .offset(&baseline, 125.0, JoinSelection::Fixed(JoinType::Round), 1e-6)
            .expect("offset succeeds");
        // Outer corner carries the arc: 2 endpoints + (segments - 1)
        // interior samples beyond the straight sides.
        let expected = 2 + 2 + (constants::DEFAULT_ROUND_SEGMENTS - 1);
        assert_eq!(result.right.curve.points.len(), expected);
    }

    #[test]
    fn auto_selection_miters_right_angles() {
        assert_eq!(select_join(90.0, 250.0, 0.0, 10.0), JoinType::Miter);
        assert_eq!(select_join(130.0, 250.0, 0.0, 10.0), JoinType::Miter);
        assert_eq!(select_join(10.0, 250.0, 0.0, 10.0), JoinType::Round);
        assert_eq!(select_join(30.0, 250.0, 0.0, 10.0), JoinType::Bevel);
        assert_eq!(select_join(30.0, 150.0, 0.0, 10.0), JoinType::Round);
    }

    #[test]
    fn collinear_simplification_preserves_corners() {
        let coords = [
            (0.0, 0.0),
            (500.0, 0.3),
            (1000.0, 0.0),
            (1000.0, 1000.0),
        ];
        let simplified = simplify_collinear(&coords, constants::SIMPLIFY_COLLINEAR_DISTANCE);
        assert_eq!(simplified.len(), 3);
        assert_eq!(simplified[1], (1000.0, 0.0));
    }

    #[test]
    fn swept_solid_area_matches_length_times_thickness() {
        let baseline = Curve::polyline(&[(0.0, 0.0), (2000.0, 0.0)], 1e-6).unwrap();
        let solid = engine()
            .sweep_solid(1, baseline, 250.0, WallType::Zone, JoinSelection::Auto, 1e-6)
            .expect("sweep succeeds");
        let expected = 2000.0 * 250.0;
        assert!((solid.area() - expected).abs() < 1e-6 * solid.perimeter());
    }
}
