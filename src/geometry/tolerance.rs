//! geometry/tolerance.rs - Adaptive Tolerance Manager
//!
//! Numerical tolerance in the core is never a single global constant: it
//! scales with wall thickness, loosens near parallel geometry, and
//! tightens or relaxes per operation. This module owns that policy.
//!
//! The base rule is 0.1% of wall thickness, clamped to the configured
//! ratio band. Context and angle modifiers are applied before the clamp
//! so the band is an absolute guarantee.

use crate::config::{constants, ToleranceConfig};

/// The operation a tolerance is being selected for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToleranceContext {
    /// Deciding whether two vertices are the same point
    VertexMerge,
    /// Offsetting a baseline
    OffsetOperation,
    /// Polygon boolean operations
    BooleanOperation,
    /// Shape healing passes
    ShapeHealing,
}

impl ToleranceContext {
    /// Multiplier applied to the base tolerance for this context
    fn factor(&self) -> f64 {
        match self {
            ToleranceContext::VertexMerge => 1.0,
            ToleranceContext::OffsetOperation => 1.5,
            ToleranceContext::BooleanOperation => 2.0,
            ToleranceContext::ShapeHealing => 1.0,
        }
    }
}

/// A tolerance suggestion surfaced to the UI layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToleranceRecommendation {
    pub tolerance: f64,
    /// Confidence in [0, 1]; drops as the recommendation departs from the
    /// base rule
    pub confidence: f64,
}

/// Context-aware tolerance selection
#[derive(Debug, Clone, Copy, Default)]
pub struct ToleranceManager {
    config: ToleranceConfig,
}

impl ToleranceManager {
    pub fn new(config: ToleranceConfig) -> Self {
        Self { config }
    }

    /// Select a tolerance for an operation
    ///
    /// * `thickness` - wall thickness in model units; a non-positive value
    ///   falls back to the configured default tolerance
    /// * `local_precision` - caller's precision multiplier, floored at 0.1
    /// * `angle_degrees` - smallest angle involved in the operation;
    ///   angles under 30 degrees loosen the tolerance to survive
    ///   near-parallel intersections
    /// * `context` - the operation kind
    pub fn tolerance(
        &self,
        thickness: f64,
        local_precision: f64,
        angle_degrees: f64,
        context: ToleranceContext,
    ) -> f64 {
        if thickness <= 0.0 || !thickness.is_finite() {
            return self.config.default;
        }

        let base = thickness * constants::TOLERANCE_BASE_RATIO;
        let mut tolerance = base * context.factor();

        if angle_degrees < constants::TOLERANCE_LOOSENING_ANGLE_DEG {
            let shortfall =
                (constants::TOLERANCE_LOOSENING_ANGLE_DEG - angle_degrees.max(0.0))
                    / constants::TOLERANCE_LOOSENING_ANGLE_DEG;
            tolerance *= 1.0 + shortfall;
        }

        tolerance *= local_precision.max(constants::MIN_PRECISION_FACTOR);

        tolerance.clamp(
            thickness * self.config.min_ratio,
            thickness * self.config.max_ratio,
        )
    }

    /// Shorthand for a context tolerance at neutral precision and angle
    pub fn base_tolerance(&self, thickness: f64, context: ToleranceContext) -> f64 {
        self.tolerance(thickness, 1.0, 90.0, context)
    }

    /// Tolerance plus a confidence score for UI display
    pub fn recommend(
        &self,
        thickness: f64,
        local_precision: f64,
        angle_degrees: f64,
        context: ToleranceContext,
    ) -> ToleranceRecommendation {
        let tolerance = self.tolerance(thickness, local_precision, angle_degrees, context);
        let base = if thickness > 0.0 {
            thickness * constants::TOLERANCE_BASE_RATIO
        } else {
            self.config.default
        };
        let confidence = (1.0 - (tolerance / base).log10().abs() / 2.0).clamp(0.0, 1.0);
        ToleranceRecommendation {
            tolerance,
            confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> ToleranceManager {
        ToleranceManager::new(ToleranceConfig::default())
    }

    #[test]
    fn base_rule_is_a_tenth_of_a_percent() {
        let t = manager().tolerance(250.0, 1.0, 90.0, ToleranceContext::VertexMerge);
        assert!((t - 0.25).abs() < 1e-12);
    }

    #[test]
    fn context_factors_scale_the_base() {
        let m = manager();
        let merge = m.tolerance(250.0, 1.0, 90.0, ToleranceContext::VertexMerge);
        let offset = m.tolerance(250.0, 1.0, 90.0, ToleranceContext::OffsetOperation);
        let boolean = m.tolerance(250.0, 1.0, 90.0, ToleranceContext::BooleanOperation);
        assert!((offset / merge - 1.5).abs() < 1e-12);
        assert!((boolean / merge - 2.0).abs() < 1e-12);
    }

    #[test]
    fn sharp_angles_loosen_the_tolerance() {
        let m = manager();
        let square = m.tolerance(250.0, 1.0, 90.0, ToleranceContext::VertexMerge);
        let sharp = m.tolerance(250.0, 1.0, 15.0, ToleranceContext::VertexMerge);
        assert!((sharp / square - 1.5).abs() < 1e-12);
    }

    #[test]
    fn result_stays_inside_the_ratio_band() {
        let m = manager();
        // Boolean context at a near-zero angle with high precision would
        // exceed 1% of thickness without the clamp.
        let t = m.tolerance(250.0, 5.0, 0.0, ToleranceContext::BooleanOperation);
        assert!(t <= 250.0 * constants::TOLERANCE_MAX_RATIO + 1e-12);
        let tight = m.tolerance(250.0, 0.0001, 90.0, ToleranceContext::VertexMerge);
        assert!(tight >= 250.0 * constants::TOLERANCE_MIN_RATIO - 1e-12);
    }

    #[test]
    fn non_positive_thickness_falls_back_to_default() {
        let t = manager().tolerance(0.0, 1.0, 90.0, ToleranceContext::VertexMerge);
        assert_eq!(t, ToleranceConfig::default().default);
    }

    #[test]
    fn recommendation_confidence_is_full_at_base() {
        let rec = manager().recommend(250.0, 1.0, 90.0, ToleranceContext::VertexMerge);
        assert!((rec.confidence - 1.0).abs() < 1e-9);
        let relaxed = manager().recommend(250.0, 1.0, 0.0, ToleranceContext::BooleanOperation);
        assert!(relaxed.confidence < 1.0);
        assert!(relaxed.confidence >= 0.0);
    }
}
