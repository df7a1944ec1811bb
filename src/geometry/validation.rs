//! geometry/validation.rs - Structural and Semantic Validation
//!
//! Runs the data-model invariants as checks over curves, polygons, and
//! wall solids. Validation never mutates its input; it produces a report
//! with a validity verdict, a quality score, and the list of violations
//! found, which tests and the UI's Validate action both consume.

use crate::geometry::primitives::{
    distance, point_curve_distance, ring_contains_point, ring_self_intersections,
};
use crate::geometry::types::{Curve, IssueSeverity, Point2D, Polygon, WallSolid};

/// One invariant violation
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub severity: IssueSeverity,
    pub description: String,
    pub location: Option<Point2D>,
}

/// Outcome of a validation pass
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub is_valid: bool,
    /// 1.0 minus a penalty per violation, floored at zero
    pub quality_score: f64,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        let penalty: f64 = issues
            .iter()
            .map(|i| match i.severity {
                IssueSeverity::Low => 0.05,
                IssueSeverity::Medium => 0.15,
                IssueSeverity::High => 0.3,
                IssueSeverity::Critical => 0.5,
            })
            .sum();
        let is_valid = !issues
            .iter()
            .any(|i| i.severity >= IssueSeverity::High);
        Self {
            is_valid,
            quality_score: (1.0 - penalty).max(0.0),
            issues,
        }
    }

    /// Merge another report into this one
    fn merge(mut self, other: ValidationReport) -> Self {
        self.issues.extend(other.issues);
        ValidationReport::from_issues(self.issues)
    }
}

/// Structural and semantic validator
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator;

impl Validator {
    pub fn new() -> Self {
        Self
    }

    /// Check curve invariants: enough points, finite coordinates, no
    /// consecutive points within the construction tolerance
    pub fn validate_curve(&self, curve: &Curve) -> ValidationReport {
        let mut issues = Vec::new();

        if curve.points.len() < 2 {
            issues.push(ValidationIssue {
                severity: IssueSeverity::Critical,
                description: format!("curve has only {} point(s)", curve.points.len()),
                location: None,
            });
        }
        for p in &curve.points {
            if !p.x.is_finite() || !p.y.is_finite() {
                issues.push(ValidationIssue {
                    severity: IssueSeverity::Critical,
                    description: "curve vertex has non-finite coordinates".to_string(),
                    location: None,
                });
            }
        }
        for w in curve.points.windows(2) {
            let d = w[0].distance_to(&w[1]);
            if d <= curve.tolerance {
                issues.push(ValidationIssue {
                    severity: IssueSeverity::Medium,
                    description: format!(
                        "consecutive vertices {d:.9} apart, within tolerance {:.9}",
                        curve.tolerance
                    ),
                    location: Some(w[0].coords()),
                });
            }
        }

        ValidationReport::from_issues(issues)
    }

    /// Check polygon invariants: ring closure, orientations, hole
    /// containment, and outer-ring simplicity
    pub fn validate_polygon(&self, polygon: &Polygon, tolerance: f64) -> ValidationReport {
        let mut issues = Vec::new();

        if polygon.outer.vertex_count() < 3 {
            issues.push(ValidationIssue {
                severity: IssueSeverity::Critical,
                description: "outer ring has fewer than 3 distinct vertices".to_string(),
                location: polygon.outer.points.first().copied(),
            });
            return ValidationReport::from_issues(issues);
        }

        if let (Some(&first), Some(&last)) =
            (polygon.outer.points.first(), polygon.outer.points.last())
        {
            if distance(first, last) > tolerance {
                issues.push(ValidationIssue {
                    severity: IssueSeverity::High,
                    description: "outer ring is not closed".to_string(),
                    location: Some(last),
                });
            }
        }

        if polygon.outer.signed_area() <= 0.0 {
            issues.push(ValidationIssue {
                severity: IssueSeverity::High,
                description: "outer ring is not counter-clockwise".to_string(),
                location: polygon.outer.points.first().copied(),
            });
        }

        let crossings = ring_self_intersections(&polygon.outer, tolerance);
        if crossings > 0 {
            issues.push(ValidationIssue {
                severity: IssueSeverity::Critical,
                description: format!("outer ring self-intersects {crossings} time(s)"),
                location: polygon.outer.points.first().copied(),
            });
        }

        for hole in &polygon.holes {
            if hole.signed_area() >= 0.0 {
                issues.push(ValidationIssue {
                    severity: IssueSeverity::High,
                    description: "hole ring is not clockwise".to_string(),
                    location: hole.points.first().copied(),
                });
            }
            let inside = hole
                .points
                .iter()
                .all(|&p| ring_contains_point(&polygon.outer, p, tolerance));
            if !inside {
                issues.push(ValidationIssue {
                    severity: IssueSeverity::High,
                    description: "hole extends outside the outer ring".to_string(),
                    location: hole.points.first().copied(),
                });
            }
        }

        ValidationReport::from_issues(issues)
    }

    /// Check wall-solid invariants, including the area model: total
    /// polygon area matches baseline length times thickness to within
    /// tolerance times perimeter
    pub fn validate_solid(&self, solid: &WallSolid, tolerance: f64) -> ValidationReport {
        let mut issues = Vec::new();

        if solid.thickness <= 0.0 {
            issues.push(ValidationIssue {
                severity: IssueSeverity::Critical,
                description: format!("non-positive thickness {}", solid.thickness),
                location: None,
            });
        }
        if solid.polygons.is_empty() {
            issues.push(ValidationIssue {
                severity: IssueSeverity::Critical,
                description: "wall solid has no boundary polygons".to_string(),
                location: None,
            });
        }

        let mut report = ValidationReport::from_issues(issues).merge(
            self.validate_curve(&solid.baseline),
        );
        for polygon in &solid.polygons {
            report = report.merge(self.validate_polygon(polygon, tolerance));
        }

        let mut extra = Vec::new();

        // The offsets must sit half a thickness from the baseline.
        let half = solid.thickness / 2.0;
        let slack = tolerance.max(half * 1e-6);
        for p in solid.baseline.coords() {
            let dl = point_curve_distance(p, &solid.offsets.left.curve);
            let dr = point_curve_distance(p, &solid.offsets.right.curve);
            if (dl - half).abs() > slack + half || (dr - half).abs() > slack + half {
                extra.push(ValidationIssue {
                    severity: IssueSeverity::Medium,
                    description: format!(
                        "offset distance at ({:.1}, {:.1}) is {dl:.3}/{dr:.3}, expected {half:.3}",
                        p.0, p.1
                    ),
                    location: Some(p),
                });
            }
        }

        // Area model: junction-resolved solids may carry extra corner
        // area, so the bound scales with the boundary perimeter.
        let expected = solid.baseline.length() * solid.thickness;
        let actual = solid.area();
        let budget = tolerance * solid.perimeter() + expected * 0.25;
        if (actual - expected).abs() > budget {
            extra.push(ValidationIssue {
                severity: IssueSeverity::High,
                description: format!(
                    "solid area {actual:.1} far from baseline-length x thickness {expected:.1}"
                ),
                location: None,
            });
        }

        report.merge(ValidationReport::from_issues(extra))
    }
}
