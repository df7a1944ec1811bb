//! geometry/quality.rs - Quality Metrics
//!
//! Scores a healed wall solid along four axes: geometric accuracy,
//! topological consistency, manufacturability, and architectural
//! compliance. Defects are enumerated as issues with severity and an
//! auto-fixable flag so the UI can offer one-click healing, and the
//! threshold rules behind the recommendations live here too.

use std::collections::HashMap;

use crate::config::HealingConfig;
use crate::geometry::primitives::{distance, point_curve_distance, ring_self_intersections};
use crate::geometry::types::{
    now_millis, IssueKind, IssueSeverity, Point2D, QualityIssue, QualityMetrics, Ring, WallSolid,
    WallType,
};

/// Interior angles below this many degrees hurt manufacturability
const ACUTE_ANGLE_LIMIT_DEG: f64 = 10.0;
/// Segments shorter than this multiple of the tolerance hurt
/// manufacturability
const SHORT_SEGMENT_TOLERANCE_FACTOR: f64 = 5.0;
/// Relative thickness deviation tolerated before compliance suffers
const THICKNESS_DEVIATION_LIMIT: f64 = 0.05;
/// Edge count at which the complexity score saturates
const COMPLEXITY_SATURATION_EDGES: f64 = 1000.0;

/// Quality summary over a set of walls
#[derive(Debug, Clone)]
pub struct AggregatedMetrics {
    pub wall_count: usize,
    pub mean_overall_score: f64,
    pub worst_overall_score: f64,
    pub mean_geometric_accuracy: f64,
    pub total_issue_count: usize,
    pub critical_issue_count: usize,
    pub per_wall: HashMap<u64, QualityMetrics>,
}

/// Computes quality metrics for wall solids
#[derive(Debug, Clone, Copy, Default)]
pub struct QualityAnalyzer {
    healing: HealingConfig,
}

impl QualityAnalyzer {
    pub fn new(healing: HealingConfig) -> Self {
        Self { healing }
    }

    /// Score one wall solid
    pub fn analyze(&self, solid: &WallSolid, tolerance: f64) -> QualityMetrics {
        let mut issues = Vec::new();

        let sliver_face_count = self.count_slivers(solid, tolerance, &mut issues);
        let micro_gap_count = self.count_micro_gaps(solid, &mut issues);
        let self_intersection_count = self.count_self_intersections(solid, tolerance, &mut issues);
        let degenerate_element_count = self.count_degenerates(solid, tolerance, &mut issues);

        let geometric_accuracy = self.geometric_accuracy(solid, tolerance);
        let topological_consistency = self.topological_consistency(
            solid,
            self_intersection_count,
            degenerate_element_count,
        );
        let manufacturability = self.manufacturability(solid, tolerance, &mut issues);
        let architectural_compliance = self.architectural_compliance(solid, &mut issues);

        let edge_count: usize = solid.polygons.iter().map(|p| p.edge_count()).sum();
        let complexity_score = (edge_count as f64 / COMPLEXITY_SATURATION_EDGES).min(1.0);
        let processing_efficiency = 1.0 / (1.0 + complexity_score);
        let memory_estimate_bytes = 256 + edge_count * 16 + solid.baseline.points.len() * 64;

        let mut metrics = QualityMetrics {
            geometric_accuracy,
            topological_consistency,
            manufacturability,
            architectural_compliance,
            sliver_face_count,
            micro_gap_count,
            self_intersection_count,
            degenerate_element_count,
            complexity_score,
            processing_efficiency,
            memory_estimate_bytes,
            tolerance_used: tolerance,
            computed_at_ms: now_millis(),
            calculation_method: "boundary-sweep-v2".to_string(),
            issues,
            recommendations: Vec::new(),
        };
        metrics.recommendations = recommendations(&metrics);
        metrics
    }

    /// Combine per-wall metrics into a set-level summary
    pub fn aggregate(per_wall: HashMap<u64, QualityMetrics>) -> AggregatedMetrics {
        let wall_count = per_wall.len();
        let overall: Vec<f64> = per_wall.values().map(QualityMetrics::overall_score).collect();
        let mean = |xs: &[f64]| {
            if xs.is_empty() {
                1.0
            } else {
                xs.iter().sum::<f64>() / xs.len() as f64
            }
        };
        let accuracy: Vec<f64> = per_wall.values().map(|m| m.geometric_accuracy).collect();
        AggregatedMetrics {
            wall_count,
            mean_overall_score: mean(&overall),
            worst_overall_score: overall.iter().copied().fold(1.0, f64::min),
            mean_geometric_accuracy: mean(&accuracy),
            total_issue_count: per_wall.values().map(|m| m.issues.len()).sum(),
            critical_issue_count: per_wall
                .values()
                .flat_map(|m| m.issues.iter())
                .filter(|i| i.severity == IssueSeverity::Critical)
                .count(),
            per_wall,
        }
    }

    /// Mean perpendicular deviation between the offsets and the boundary,
    /// mapped into [0, 1]
    fn geometric_accuracy(&self, solid: &WallSolid, tolerance: f64) -> f64 {
        let mut deviations: Vec<f64> = Vec::new();
        for offset in [&solid.offsets.left, &solid.offsets.right] {
            for p in offset.curve.coords() {
                let d = solid
                    .polygons
                    .iter()
                    .map(|poly| boundary_distance(poly_rings(poly), p))
                    .fold(f64::INFINITY, f64::min);
                if d.is_finite() {
                    deviations.push(d);
                }
            }
        }
        if deviations.is_empty() {
            return 0.0;
        }
        let mean = deviations.iter().sum::<f64>() / deviations.len() as f64;
        1.0 - (mean / tolerance).min(1.0)
    }

    fn topological_consistency(
        &self,
        solid: &WallSolid,
        self_intersections: usize,
        degenerates: usize,
    ) -> f64 {
        let edges: usize = solid.polygons.iter().map(|p| p.edge_count()).sum();
        if edges == 0 {
            return 0.0;
        }
        (1.0 - (self_intersections + degenerates) as f64 / edges as f64).max(0.0)
    }

    fn manufacturability(
        &self,
        solid: &WallSolid,
        tolerance: f64,
        issues: &mut Vec<QualityIssue>,
    ) -> f64 {
        let mut penalty = 0.0;
        let short_limit = tolerance * SHORT_SEGMENT_TOLERANCE_FACTOR;

        for polygon in &solid.polygons {
            let ring = &polygon.outer;
            let n = ring.vertex_count();
            for i in 0..n {
                let prev = ring.points[(i + n - 1) % n];
                let here = ring.points[i];
                let next = ring.points[(i + 1) % n];

                let seg = distance(here, next);
                if seg > 0.0 && seg < short_limit {
                    penalty += 0.05;
                    issues.push(QualityIssue {
                        kind: IssueKind::ShortSegment,
                        severity: IssueSeverity::Low,
                        description: format!("boundary segment of length {seg:.6} at ({:.1}, {:.1})", here.0, here.1),
                        location: Some(here),
                        suggested_fix: Some("merge duplicate vertices".to_string()),
                        auto_fixable: true,
                    });
                }

                if let Some(angle) = interior_angle_degrees(prev, here, next) {
                    if angle < ACUTE_ANGLE_LIMIT_DEG {
                        penalty += 0.1;
                        issues.push(QualityIssue {
                            kind: IssueKind::AcuteAngle,
                            severity: IssueSeverity::Medium,
                            description: format!("acute boundary angle of {angle:.1} degrees"),
                            location: Some(here),
                            suggested_fix: Some("use a bevel or round join".to_string()),
                            auto_fixable: false,
                        });
                    }
                }
            }
        }

        // Local thickness wobble: the baseline should sit mid-band.
        let wobble = self.thickness_wobble(solid);
        if wobble > THICKNESS_DEVIATION_LIMIT {
            penalty += wobble.min(0.3);
        }

        (1.0 - penalty).clamp(0.0, 1.0)
    }

    fn architectural_compliance(
        &self,
        solid: &WallSolid,
        issues: &mut Vec<QualityIssue>,
    ) -> f64 {
        let mut score = 1.0;

        // Effective thickness from the area model.
        let length = solid.baseline.length();
        if length > 0.0 {
            let effective = solid.area() / length;
            let deviation = (effective - solid.thickness).abs() / solid.thickness;
            if deviation > THICKNESS_DEVIATION_LIMIT {
                score -= deviation.min(0.4);
                issues.push(QualityIssue {
                    kind: IssueKind::ThicknessDeviation,
                    severity: IssueSeverity::Medium,
                    description: format!(
                        "effective thickness {effective:.1} deviates from nominal {:.1}",
                        solid.thickness
                    ),
                    location: None,
                    suggested_fix: Some("re-run junction resolution and healing".to_string()),
                    auto_fixable: false,
                });
            }
        }

        // Straightness: layout walls are expected to run straight.
        if solid.wall_type == WallType::Layout {
            let chord = distance(solid.baseline.start(), solid.baseline.end());
            if chord > 0.0 {
                let wander = solid.baseline.length() / chord - 1.0;
                score -= (wander * 0.5).min(0.2);
            }
        }

        // Axis alignment: most architectural walls snap to the grid.
        let misaligned = misaligned_segment_fraction(&solid.baseline);
        if misaligned > 0.5 {
            score -= 0.1;
            issues.push(QualityIssue {
                kind: IssueKind::MisalignedAxis,
                severity: IssueSeverity::Low,
                description: "most baseline segments are off the 45-degree grid".to_string(),
                location: None,
                suggested_fix: None,
                auto_fixable: false,
            });
        }

        score.clamp(0.0, 1.0)
    }

    fn thickness_wobble(&self, solid: &WallSolid) -> f64 {
        let mut worst: f64 = 0.0;
        for p in solid.baseline.coords() {
            let dl = point_curve_distance(p, &solid.offsets.left.curve);
            let dr = point_curve_distance(p, &solid.offsets.right.curve);
            let local = dl + dr;
            if local.is_finite() && solid.thickness > 0.0 {
                worst = worst.max((local - solid.thickness).abs() / solid.thickness);
            }
        }
        worst
    }

    fn count_slivers(
        &self,
        solid: &WallSolid,
        tolerance: f64,
        issues: &mut Vec<QualityIssue>,
    ) -> usize {
        let mut count = 0;
        for polygon in &solid.polygons {
            for ring in poly_rings(polygon) {
                let area = ring.signed_area().abs();
                let perimeter = ring.perimeter();
                let isoperimetric = if perimeter > 0.0 {
                    4.0 * std::f64::consts::PI * area / (perimeter * perimeter)
                } else {
                    0.0
                };
                if ring.vertex_count() >= 4
                    && area >= tolerance * tolerance
                    && isoperimetric >= self.healing.sliver_threshold
                {
                    continue;
                }
                count += 1;
                issues.push(QualityIssue {
                    kind: IssueKind::SliverFace,
                    severity: IssueSeverity::Medium,
                    description: format!(
                        "sliver ring: area {area:.6}, isoperimetric ratio {isoperimetric:.6}"
                    ),
                    location: ring.points.first().copied(),
                    suggested_fix: Some("remove sliver faces".to_string()),
                    auto_fixable: true,
                });
            }
        }
        count
    }

    fn count_micro_gaps(&self, solid: &WallSolid, issues: &mut Vec<QualityIssue>) -> usize {
        let mut count = 0;
        for polygon in &solid.polygons {
            for ring in poly_rings(polygon) {
                for w in ring.points.windows(2) {
                    let d = distance(w[0], w[1]);
                    if d > self.healing.duplicate_edge_tolerance
                        && d <= self.healing.micro_gap_threshold
                    {
                        count += 1;
                        issues.push(QualityIssue {
                            kind: IssueKind::MicroGap,
                            severity: IssueSeverity::Low,
                            description: format!("micro-gap of {d:.8} between boundary vertices"),
                            location: Some(w[0]),
                            suggested_fix: Some("close micro-gaps".to_string()),
                            auto_fixable: true,
                        });
                    }
                }
            }
        }
        count
    }

    fn count_self_intersections(
        &self,
        solid: &WallSolid,
        tolerance: f64,
        issues: &mut Vec<QualityIssue>,
    ) -> usize {
        let mut count = 0;
        for polygon in &solid.polygons {
            let hits = ring_self_intersections(&polygon.outer, tolerance);
            if hits > 0 {
                count += hits;
                issues.push(QualityIssue {
                    kind: IssueKind::SelfIntersection,
                    severity: IssueSeverity::Critical,
                    description: format!("outer ring crosses itself {hits} time(s)"),
                    location: polygon.outer.points.first().copied(),
                    suggested_fix: Some("re-run boolean resolution".to_string()),
                    auto_fixable: false,
                });
            }
        }
        count
    }

    fn count_degenerates(
        &self,
        solid: &WallSolid,
        tolerance: f64,
        issues: &mut Vec<QualityIssue>,
    ) -> usize {
        let mut count = 0;
        for polygon in &solid.polygons {
            for ring in poly_rings(polygon) {
                if ring.vertex_count() < 4 {
                    count += 1;
                    issues.push(QualityIssue {
                        kind: IssueKind::DegenerateElement,
                        severity: IssueSeverity::High,
                        description: format!(
                            "ring with only {} distinct vertices",
                            ring.vertex_count()
                        ),
                        location: ring.points.first().copied(),
                        suggested_fix: Some("remove sliver faces".to_string()),
                        auto_fixable: true,
                    });
                }
                count += ring
                    .points
                    .windows(2)
                    .filter(|w| {
                        let d = distance(w[0], w[1]);
                        d > 0.0 && d <= tolerance
                    })
                    .count();
            }
        }
        count
    }
}

fn poly_rings(polygon: &crate::geometry::types::Polygon) -> impl Iterator<Item = &Ring> {
    std::iter::once(&polygon.outer).chain(polygon.holes.iter())
}

fn boundary_distance<'a, I: Iterator<Item = &'a Ring>>(rings: I, p: Point2D) -> f64 {
    let mut best = f64::INFINITY;
    for ring in rings {
        for w in ring.points.windows(2) {
            best = best.min(crate::geometry::primitives::point_segment_distance(
                p, w[0], w[1],
            ));
        }
    }
    best
}

fn interior_angle_degrees(prev: Point2D, here: Point2D, next: Point2D) -> Option<f64> {
    let v1 = (prev.0 - here.0, prev.1 - here.1);
    let v2 = (next.0 - here.0, next.1 - here.1);
    let l1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
    let l2 = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();
    if l1 == 0.0 || l2 == 0.0 {
        return None;
    }
    let cos = ((v1.0 * v2.0 + v1.1 * v2.1) / (l1 * l2)).clamp(-1.0, 1.0);
    Some(cos.acos().to_degrees())
}

/// Fraction of baseline segments more than 5 degrees off the 45-degree
/// grid
fn misaligned_segment_fraction(curve: &crate::geometry::types::Curve) -> f64 {
    let mut total = 0usize;
    let mut misaligned = 0usize;
    for (a, b) in curve.segments() {
        total += 1;
        let angle = (b.1 - a.1).atan2(b.0 - a.0).to_degrees().rem_euclid(45.0);
        let off_grid = angle.min(45.0 - angle);
        if off_grid > 5.0 {
            misaligned += 1;
        }
    }
    if total == 0 {
        0.0
    } else {
        misaligned as f64 / total as f64
    }
}

/// Threshold rules mapping metrics to user-facing recommendations
fn recommendations(metrics: &QualityMetrics) -> Vec<String> {
    let mut out = Vec::new();
    if metrics.self_intersection_count > 0 {
        out.push("critical: resolve self-intersections immediately".to_string());
    }
    if metrics.geometric_accuracy < 0.8 {
        out.push("adjust tolerance: boundary deviates from the offsets".to_string());
    }
    if metrics.sliver_face_count > 0 || metrics.micro_gap_count > 0 {
        out.push("run shape healing to remove slivers and close gaps".to_string());
    }
    if metrics.manufacturability < 0.7 {
        out.push("simplify sharp corners and very short segments".to_string());
    }
    if metrics.architectural_compliance < 0.7 {
        out.push("review wall thickness and alignment against its type".to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OffsetConfig;
    use crate::geometry::offset::{JoinSelection, OffsetEngine};
    use crate::geometry::types::{Curve, JoinType};

    fn clean_wall() -> WallSolid {
        let baseline = Curve::polyline(&[(0.0, 0.0), (2000.0, 0.0)], 1e-6).unwrap();
        OffsetEngine::new(OffsetConfig::default())
            .sweep_solid(
                1,
                baseline,
                250.0,
                WallType::Layout,
                JoinSelection::Fixed(JoinType::Miter),
                1e-6,
            )
            .unwrap()
    }

    #[test]
    fn clean_wall_scores_high_on_every_axis() {
        let analyzer = QualityAnalyzer::new(HealingConfig::default());
        let metrics = analyzer.analyze(&clean_wall(), 0.25);
        assert!(metrics.geometric_accuracy > 0.95, "{}", metrics.geometric_accuracy);
        assert!(metrics.topological_consistency > 0.95);
        assert!(metrics.manufacturability > 0.9);
        assert!(metrics.architectural_compliance > 0.9);
        assert_eq!(metrics.self_intersection_count, 0);
        assert_eq!(metrics.sliver_face_count, 0);
        assert!(metrics.recommendations.is_empty());
    }

    #[test]
    fn micro_gap_is_counted_and_auto_fixable() {
        let analyzer = QualityAnalyzer::new(HealingConfig::default());
        let mut wall = clean_wall();
        wall.polygons = vec![crate::geometry::types::Polygon::new(
            Ring::new(vec![
                (0.0, 0.0),
                (1000.0, 0.0),
                (1000.0, 0.00005),
                (1000.0, 500.0),
                (0.0, 500.0),
            ]),
            Vec::new(),
        )];
        let metrics = analyzer.analyze(&wall, 1e-6);
        assert_eq!(metrics.micro_gap_count, 1);
        let issue = metrics
            .issues
            .iter()
            .find(|i| i.kind == IssueKind::MicroGap)
            .expect("micro-gap issue");
        assert!(issue.auto_fixable);
        assert!(metrics
            .recommendations
            .iter()
            .any(|r| r.contains("shape healing")));
    }

    #[test]
    fn self_intersection_is_critical() {
        let analyzer = QualityAnalyzer::new(HealingConfig::default());
        let mut wall = clean_wall();
        wall.polygons = vec![crate::geometry::types::Polygon::new(
            Ring::new(vec![(0.0, 0.0), (100.0, 100.0), (100.0, 0.0), (0.0, 100.0)]),
            Vec::new(),
        )];
        let metrics = analyzer.analyze(&wall, 1e-6);
        assert!(metrics.self_intersection_count > 0);
        assert!(metrics
            .issues
            .iter()
            .any(|i| i.severity == IssueSeverity::Critical));
        assert!(metrics
            .recommendations
            .iter()
            .any(|r| r.starts_with("critical")));
    }

    #[test]
    fn aggregation_reports_worst_and_mean() {
        let analyzer = QualityAnalyzer::new(HealingConfig::default());
        let wall = clean_wall();
        let metrics = analyzer.analyze(&wall, 0.25);
        let mut per_wall = HashMap::new();
        per_wall.insert(1u64, metrics.clone());
        per_wall.insert(2u64, metrics);
        let aggregated = QualityAnalyzer::aggregate(per_wall);
        assert_eq!(aggregated.wall_count, 2);
        assert!(aggregated.worst_overall_score <= aggregated.mean_overall_score + 1e-12);
        assert_eq!(aggregated.critical_issue_count, 0);
    }
}
