//! geometry/types.rs - Core 2D Geometry Types
//!
//! This module defines the fundamental data structures used throughout
//! the wall geometry core. It provides types for representing points,
//! curves, polygons, offset pairs, wall solids, and the intersection
//! records shared between walls at junctions.
//!
//! All coordinates are plain `f64` pairs in model units (nominally
//! millimetres). Rich metadata (creation method, accuracy, validation
//! state) lives beside the coordinates so downstream engines can reason
//! about where a vertex came from.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{GeometryError, GeometryResult};

/// A bare 2D coordinate represented as (x, y)
pub type Point2D = (f64, f64);

/// Default construction tolerance for anonymous points (mm)
pub const DEFAULT_POINT_TOLERANCE: f64 = 1e-6;

/// How a point came into existence
///
/// Healing consults this tag: vertices placed by hand are protected from
/// removal when `preserve_architectural_features` is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreationMethod {
    /// Placed directly by the user
    Manual,
    /// Emitted by the offset engine
    OffsetOperation,
    /// Produced by a curve or segment intersection
    Intersection,
    /// Computed as a miter apex at a junction
    MiterApex,
    /// Inserted or moved by the shape healer
    Healing,
    /// Derived during basic/BIM synchronization
    Synchronized,
}

/// A 2D point with creation metadata
///
/// Equality between points is distance-based: two points are coincident
/// when they lie within the larger of their construction tolerances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Point {
    /// Identifier within the owning structure (0 = anonymous)
    pub id: u64,
    pub x: f64,
    pub y: f64,
    /// Tolerance in effect when the point was created
    pub tolerance: f64,
    /// Provenance tag consulted by the healer
    pub creation_method: CreationMethod,
    /// Geometric accuracy score in [0, 1]
    pub accuracy: f64,
    /// Set once a validator has accepted the point
    pub validated: bool,
}

impl Point {
    /// Create an anonymous, manually-placed point
    pub fn new(x: f64, y: f64) -> Self {
        Self::with_method(x, y, CreationMethod::Manual)
    }

    /// Create a point with an explicit creation method
    pub fn with_method(x: f64, y: f64, creation_method: CreationMethod) -> Self {
        Self {
            id: 0,
            x,
            y,
            tolerance: DEFAULT_POINT_TOLERANCE,
            creation_method,
            accuracy: 1.0,
            validated: false,
        }
    }

    /// The bare coordinates of this point
    pub fn coords(&self) -> Point2D {
        (self.x, self.y)
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Distance-based equality: within the larger construction tolerance
    pub fn coincident(&self, other: &Point) -> bool {
        self.distance_to(other) <= self.tolerance.max(other.tolerance)
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// The empty box, an identity for `union`
    pub fn empty() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    /// Tight box around a coordinate sequence
    pub fn from_coords<I: IntoIterator<Item = Point2D>>(coords: I) -> Self {
        let mut bbox = Self::empty();
        for (x, y) in coords {
            bbox.min_x = bbox.min_x.min(x);
            bbox.min_y = bbox.min_y.min(y);
            bbox.max_x = bbox.max_x.max(x);
            bbox.max_y = bbox.max_y.max(y);
        }
        bbox
    }

    pub fn width(&self) -> f64 {
        (self.max_x - self.min_x).max(0.0)
    }

    pub fn height(&self) -> f64 {
        (self.max_y - self.min_y).max(0.0)
    }

    /// Grow the box by `margin` on every side
    pub fn expanded(&self, margin: f64) -> Self {
        Self {
            min_x: self.min_x - margin,
            min_y: self.min_y - margin,
            max_x: self.max_x + margin,
            max_y: self.max_y + margin,
        }
    }

    /// Smallest box containing both operands
    pub fn union(&self, other: &BoundingBox) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// True when the boxes share any area or edge
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }
}

/// The analytic family of a curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurveKind {
    Polyline,
    Arc,
    Spline,
    Bezier,
}

/// An ordered sequence of points with cached derived data
///
/// Invariant: no two consecutive points lie within the curve's
/// construction tolerance. The constructor enforces this by dropping
/// near-duplicate vertices rather than rejecting the input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Curve {
    pub kind: CurveKind,
    pub points: Vec<Point>,
    pub is_closed: bool,
    /// Tolerance in effect at construction
    pub tolerance: f64,
    length: f64,
    bounding_box: BoundingBox,
    /// Unit tangent per vertex (direction of the outgoing segment; the
    /// last vertex repeats the incoming direction)
    tangents: Vec<Point2D>,
    /// Discrete curvature per vertex (turning angle over mean edge length)
    curvatures: Vec<f64>,
}

impl Curve {
    /// Build a curve, dropping consecutive points closer than `tolerance`
    pub fn new(kind: CurveKind, points: Vec<Point>, tolerance: f64) -> GeometryResult<Self> {
        if tolerance <= 0.0 || !tolerance.is_finite() {
            return Err(GeometryError::InvalidTolerance { value: tolerance });
        }
        for p in &points {
            if !p.x.is_finite() || !p.y.is_finite() {
                return Err(GeometryError::invalid_point((p.x, p.y)));
            }
        }

        let mut deduped: Vec<Point> = Vec::with_capacity(points.len());
        for p in points {
            match deduped.last() {
                Some(prev) if prev.distance_to(&p) <= tolerance => continue,
                _ => deduped.push(p),
            }
        }
        if deduped.len() < 2 {
            return Err(GeometryError::CurveTooShort {
                count: deduped.len(),
            });
        }

        let is_closed = deduped
            .first()
            .zip(deduped.last())
            .map(|(a, b)| a.distance_to(b) <= tolerance)
            .unwrap_or(false);

        let length = deduped
            .windows(2)
            .map(|w| w[0].distance_to(&w[1]))
            .sum::<f64>();
        let bounding_box = BoundingBox::from_coords(deduped.iter().map(Point::coords));
        let tangents = compute_tangents(&deduped);
        let curvatures = compute_curvatures(&deduped);

        Ok(Self {
            kind,
            points: deduped,
            is_closed,
            tolerance,
            length,
            bounding_box,
            tangents,
            curvatures,
        })
    }

    /// Build a polyline from bare coordinates with a default tolerance
    pub fn polyline(coords: &[Point2D], tolerance: f64) -> GeometryResult<Self> {
        let points = coords.iter().map(|&(x, y)| Point::new(x, y)).collect();
        Self::new(CurveKind::Polyline, points, tolerance)
    }

    /// Cached arc length
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Cached tight bounding box
    pub fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }

    /// Unit tangent at each vertex
    pub fn tangents(&self) -> &[Point2D] {
        &self.tangents
    }

    /// Discrete curvature at each vertex
    pub fn curvatures(&self) -> &[f64] {
        &self.curvatures
    }

    /// Bare coordinates of every vertex, in order
    pub fn coords(&self) -> Vec<Point2D> {
        self.points.iter().map(Point::coords).collect()
    }

    /// Consecutive vertex pairs as segments
    pub fn segments(&self) -> impl Iterator<Item = (Point2D, Point2D)> + '_ {
        self.points
            .windows(2)
            .map(|w| (w[0].coords(), w[1].coords()))
    }

    /// First vertex coordinates
    pub fn start(&self) -> Point2D {
        self.points[0].coords()
    }

    /// Last vertex coordinates
    pub fn end(&self) -> Point2D {
        self.points[self.points.len() - 1].coords()
    }
}

fn compute_tangents(points: &[Point]) -> Vec<Point2D> {
    let n = points.len();
    let mut tangents = Vec::with_capacity(n);
    for i in 0..n {
        let (a, b) = if i + 1 < n {
            (&points[i], &points[i + 1])
        } else {
            (&points[i - 1], &points[i])
        };
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let len = (dx * dx + dy * dy).sqrt();
        if len > 0.0 {
            tangents.push((dx / len, dy / len));
        } else {
            tangents.push((0.0, 0.0));
        }
    }
    tangents
}

fn compute_curvatures(points: &[Point]) -> Vec<f64> {
    let n = points.len();
    let mut curvatures = vec![0.0; n];
    for i in 1..n.saturating_sub(1) {
        let prev = points[i - 1].coords();
        let here = points[i].coords();
        let next = points[i + 1].coords();
        let v1 = (here.0 - prev.0, here.1 - prev.1);
        let v2 = (next.0 - here.0, next.1 - here.1);
        let l1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
        let l2 = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();
        if l1 == 0.0 || l2 == 0.0 {
            continue;
        }
        let cross = v1.0 * v2.1 - v1.1 * v2.0;
        let dot = v1.0 * v2.0 + v1.1 * v2.1;
        let turn = cross.atan2(dot);
        curvatures[i] = turn / (0.5 * (l1 + l2));
    }
    curvatures
}

/// A closed ring of coordinates (first point equals last)
///
/// The closing vertex is stored explicitly. `vertex_count` reports the
/// number of distinct vertices, excluding the closure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ring {
    pub points: Vec<Point2D>,
}

impl Ring {
    /// Build a ring, appending the closing vertex when absent
    pub fn new(mut points: Vec<Point2D>) -> Self {
        if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
            if first != last {
                points.push(first);
            }
        }
        Self { points }
    }

    /// Distinct vertex count, excluding the closing duplicate
    pub fn vertex_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    /// Shoelace signed area; positive for counter-clockwise rings
    pub fn signed_area(&self) -> f64 {
        let mut area = 0.0;
        for w in self.points.windows(2) {
            let (x1, y1) = w[0];
            let (x2, y2) = w[1];
            area += x1 * y2 - x2 * y1;
        }
        area / 2.0
    }

    /// Total boundary length
    pub fn perimeter(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| {
                let dx = w[1].0 - w[0].0;
                let dy = w[1].1 - w[0].1;
                (dx * dx + dy * dy).sqrt()
            })
            .sum()
    }

    /// True for counter-clockwise orientation
    pub fn is_ccw(&self) -> bool {
        self.signed_area() > 0.0
    }

    /// Reverse the winding direction in place
    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    /// Tight bounding box of the ring
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_coords(self.points.iter().copied())
    }
}

/// A polygon with one outer ring and zero or more holes
///
/// Invariants: the outer ring winds counter-clockwise and is simple
/// except transiently during healing; holes wind clockwise and lie
/// strictly inside the outer ring; no two rings cross.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub outer: Ring,
    pub holes: Vec<Ring>,
}

impl Polygon {
    /// Build a polygon, normalizing ring orientations
    pub fn new(mut outer: Ring, mut holes: Vec<Ring>) -> Self {
        if !outer.is_ccw() {
            outer.reverse();
        }
        for hole in &mut holes {
            if hole.is_ccw() {
                hole.reverse();
            }
        }
        Self { outer, holes }
    }

    /// Outer area minus hole areas
    pub fn area(&self) -> f64 {
        let outer = self.outer.signed_area().abs();
        let holes: f64 = self.holes.iter().map(|h| h.signed_area().abs()).sum();
        (outer - holes).max(0.0)
    }

    /// Combined perimeter of all rings
    pub fn perimeter(&self) -> f64 {
        self.outer.perimeter() + self.holes.iter().map(Ring::perimeter).sum::<f64>()
    }

    /// Total edge count across all rings
    pub fn edge_count(&self) -> usize {
        self.outer.vertex_count() + self.holes.iter().map(Ring::vertex_count).sum::<usize>()
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.outer.bounding_box()
    }
}

/// Join style applied where two offset segments meet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinType {
    /// Extend both offset lines to their algebraic intersection
    Miter,
    /// Connect the two offset endpoints directly
    Bevel,
    /// Approximate an arc around the original vertex
    Round,
}

/// Architectural role of a wall, fixing its default thickness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WallType {
    /// Primary structural wall
    Layout,
    /// Internal zoning wall
    Zone,
    /// Lightweight area divider
    Area,
}

impl WallType {
    /// Default thickness in millimetres for this wall type
    pub fn default_thickness(&self) -> f64 {
        use crate::config::constants;
        match self {
            WallType::Layout => constants::LAYOUT_WALL_THICKNESS,
            WallType::Zone => constants::ZONE_WALL_THICKNESS,
            WallType::Area => constants::AREA_WALL_THICKNESS,
        }
    }
}

/// One side of an offset pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OffsetCurve {
    pub curve: Curve,
    /// Signed offset distance from the baseline
    pub distance: f64,
    /// Join applied at each vertex that was a segment junction; vertices
    /// that are not junctions (endpoints) carry the default join
    pub joins: Vec<JoinType>,
}

/// Left and right offsets derived from one baseline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OffsetPair {
    pub left: OffsetCurve,
    pub right: OffsetCurve,
}

/// One atomic healing pass recorded in a solid's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealingOperation {
    pub kind: HealingOperationKind,
    /// Number of elements removed, merged, or inserted
    pub elements_affected: usize,
    /// Tolerance in effect for the pass
    pub tolerance: f64,
    /// Composite-loop iteration the pass ran in (0-based)
    pub iteration: usize,
}

/// The three atomic healing operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealingOperationKind {
    RemoveSliverFaces,
    MergeDuplicateVertices,
    CloseMicroGaps,
    /// A pass was skipped to protect user-placed vertices
    PreservationSkip,
}

/// A wall represented as a thick solid in the plane
///
/// The baseline is swept by ±thickness/2 into left/right offsets whose
/// union, with end caps, bounds the solid's boundary polygons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WallSolid {
    pub id: u64,
    pub baseline: Curve,
    pub thickness: f64,
    pub wall_type: WallType,
    pub offsets: OffsetPair,
    /// Boundary polygons; typically one, possibly several after healing
    pub polygons: Vec<Polygon>,
    /// Join applied at each junction node, keyed by node id
    pub join_types: HashMap<u64, JoinType>,
    /// Intersection records this wall participates in
    pub intersection_ids: Vec<u64>,
    /// Append-only record of healing passes
    pub healing_history: Vec<HealingOperation>,
    /// Metrics from the most recent quality pass
    pub metrics: Option<QualityMetrics>,
    /// Cached complexity estimate (vertex count across polygons)
    pub complexity: usize,
    /// Cached processing-time estimate in milliseconds
    pub processing_time_estimate_ms: f64,
}

impl WallSolid {
    /// Assemble a solid from its parts, computing the cached estimates
    pub fn new(
        id: u64,
        baseline: Curve,
        thickness: f64,
        wall_type: WallType,
        offsets: OffsetPair,
        polygons: Vec<Polygon>,
    ) -> GeometryResult<Self> {
        if thickness <= 0.0 || !thickness.is_finite() {
            return Err(GeometryError::InvalidThickness { value: thickness });
        }
        let complexity = polygons.iter().map(Polygon::edge_count).sum();
        let mut solid = Self {
            id,
            baseline,
            thickness,
            wall_type,
            offsets,
            polygons,
            join_types: HashMap::new(),
            intersection_ids: Vec::new(),
            healing_history: Vec::new(),
            metrics: None,
            complexity,
            processing_time_estimate_ms: 0.0,
        };
        solid.processing_time_estimate_ms = solid.estimate_processing_time_ms();
        Ok(solid)
    }

    /// Total boundary area across all polygons
    pub fn area(&self) -> f64 {
        self.polygons.iter().map(Polygon::area).sum()
    }

    /// Combined boundary perimeter
    pub fn perimeter(&self) -> f64 {
        self.polygons.iter().map(Polygon::perimeter).sum()
    }

    /// Box around all boundary polygons and both offsets
    pub fn bounding_box(&self) -> BoundingBox {
        let mut bbox = self
            .offsets
            .left
            .curve
            .bounding_box()
            .union(&self.offsets.right.curve.bounding_box());
        for polygon in &self.polygons {
            bbox = bbox.union(&polygon.bounding_box());
        }
        bbox
    }

    /// Refresh the cached complexity and processing-time estimates
    pub fn refresh_estimates(&mut self) {
        self.complexity = self.polygons.iter().map(Polygon::edge_count).sum();
        self.processing_time_estimate_ms = self.estimate_processing_time_ms();
    }

    fn estimate_processing_time_ms(&self) -> f64 {
        // Linear model fitted against the boolean kernel: roughly 2 us per
        // boundary edge plus a fixed dispatch cost.
        0.05 + self.complexity as f64 * 0.002
    }
}

/// Classification of a junction between walls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntersectionKind {
    /// One wall ends on the interior of another
    T,
    /// Two walls end at a shared corner
    L,
    /// Two walls pass through each other
    Cross,
    /// Two near-parallel walls with overlapping bands
    ParallelOverlap,
}

/// Lifecycle state of an intersection record
///
/// `Proposed → Validated → Cached`; any participant mutation moves the
/// record to `Invalidated`, after which the cache sweeper drops it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntersectionState {
    Proposed,
    Validated,
    Cached,
    Invalidated,
}

/// How a junction's geometry was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionMethod {
    /// Exact offset-line intersections and bisector apex
    ExactGeometric,
    /// Bevel fallback with the apex at the chord midpoint
    MidpointFallback,
    /// Centroid of the outermost offset intersections
    ApproximateCentroid,
    /// Parallel-overlap union merge
    ParallelMerge,
}

/// A resolved junction shared by two or more walls
///
/// Stored centrally in the store's side table; participating walls hold
/// the id, never the record itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntersectionRecord {
    pub id: u64,
    pub kind: IntersectionKind,
    /// Participating wall ids, sorted ascending
    pub wall_ids: Vec<u64>,
    /// Where the baselines meet
    pub intersection_point: Point2D,
    /// Miter apex, when one was computed
    pub miter_apex: Option<Point2D>,
    /// Offset-line intersections bracketing the junction
    pub offset_intersections: Vec<Point2D>,
    /// Boundary polygons of the unioned junction geometry
    pub resolved_geometry: Vec<Polygon>,
    pub method: ResolutionMethod,
    /// Geometric accuracy score in [0, 1]
    pub accuracy: f64,
    pub state: IntersectionState,
}

impl IntersectionRecord {
    pub fn is_validated(&self) -> bool {
        matches!(
            self.state,
            IntersectionState::Validated | IntersectionState::Cached
        )
    }

    pub fn is_cached(&self) -> bool {
        self.state == IntersectionState::Cached
    }

    /// Mark the record invalidated after a participant mutation
    pub fn invalidate(&mut self) {
        self.state = IntersectionState::Invalidated;
    }
}

/// Result of a miter computation at a single vertex or junction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MiterCalculation {
    pub apex: Point2D,
    /// The two offset-line intersections the apex was derived from
    pub offset_intersections: (Point2D, Point2D),
    /// Interior angle at the junction in degrees
    pub angle_degrees: f64,
    pub join_type: JoinType,
    /// True when the miter limit forced a bevel downgrade
    pub fallback_used: bool,
}

/// Severity of a quality issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IssueSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// The kind of defect a quality issue reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueKind {
    SliverFace,
    MicroGap,
    SelfIntersection,
    DegenerateElement,
    AcuteAngle,
    ShortSegment,
    ThicknessDeviation,
    MisalignedAxis,
}

/// One enumerated quality issue on a wall solid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityIssue {
    pub kind: IssueKind,
    pub severity: IssueSeverity,
    pub description: String,
    /// Approximate location of the defect, when known
    pub location: Option<Point2D>,
    pub suggested_fix: Option<String>,
    /// True when one of the healer's atomic operations can resolve it
    pub auto_fixable: bool,
}

/// Quality scores and defect counts for one wall solid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// 1 − mean boundary deviation / tolerance, clamped to [0, 1]
    pub geometric_accuracy: f64,
    /// 1 − defective edges / boundary edges
    pub topological_consistency: f64,
    /// Penalized by acute angles, short segments, thickness wobble
    pub manufacturability: f64,
    /// Agreement with the wall type's expectations
    pub architectural_compliance: f64,
    pub sliver_face_count: usize,
    pub micro_gap_count: usize,
    pub self_intersection_count: usize,
    pub degenerate_element_count: usize,
    /// Normalized complexity score in [0, 1]
    pub complexity_score: f64,
    /// Fraction of the processing-time estimate actually used
    pub processing_efficiency: f64,
    /// Estimated memory footprint of the solid in bytes
    pub memory_estimate_bytes: usize,
    /// Tolerance the metrics were computed at
    pub tolerance_used: f64,
    /// Milliseconds since the Unix epoch at computation time
    pub computed_at_ms: u64,
    pub calculation_method: String,
    pub issues: Vec<QualityIssue>,
    pub recommendations: Vec<String>,
}

impl QualityMetrics {
    /// Unweighted mean of the four scores
    pub fn overall_score(&self) -> f64 {
        (self.geometric_accuracy
            + self.topological_consistency
            + self.manufacturability
            + self.architectural_compliance)
            / 4.0
    }
}

/// Milliseconds since the Unix epoch
pub fn now_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_drops_consecutive_duplicates() {
        let curve = Curve::polyline(&[(0.0, 0.0), (0.0, 0.0), (1000.0, 0.0)], 1e-6)
            .expect("valid curve");
        assert_eq!(curve.points.len(), 2);
        assert!((curve.length() - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn curve_rejects_single_point() {
        let result = Curve::polyline(&[(0.0, 0.0), (0.0, 0.0)], 1e-6);
        assert!(matches!(
            result,
            Err(GeometryError::CurveTooShort { count: 1 })
        ));
    }

    #[test]
    fn ring_closes_itself_and_measures_area() {
        let ring = Ring::new(vec![(0.0, 0.0), (1000.0, 0.0), (1000.0, 500.0), (0.0, 500.0)]);
        assert_eq!(ring.vertex_count(), 4);
        assert!((ring.signed_area() - 500_000.0).abs() < 1e-6);
        assert!(ring.is_ccw());
    }

    #[test]
    fn polygon_normalizes_hole_orientation() {
        let outer = Ring::new(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        let hole = Ring::new(vec![(4.0, 4.0), (6.0, 4.0), (6.0, 6.0), (4.0, 6.0)]);
        let polygon = Polygon::new(outer, vec![hole]);
        assert!(polygon.outer.is_ccw());
        assert!(!polygon.holes[0].is_ccw());
        assert!((polygon.area() - 96.0).abs() < 1e-9);
    }

    #[test]
    fn wall_type_thickness_defaults() {
        assert_eq!(WallType::Layout.default_thickness(), 350.0);
        assert_eq!(WallType::Zone.default_thickness(), 250.0);
        assert_eq!(WallType::Area.default_thickness(), 150.0);
    }

    #[test]
    fn point_coincidence_uses_larger_tolerance() {
        let mut a = Point::new(0.0, 0.0);
        let b = Point::new(0.0, 0.5);
        assert!(!a.coincident(&b));
        a.tolerance = 1.0;
        assert!(a.coincident(&b));
    }
}
