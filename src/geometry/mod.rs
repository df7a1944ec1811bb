//! geometry/mod.rs

pub mod boolean;
pub mod healing;
pub mod junctions;
pub mod network;
pub mod offset;
pub mod primitives;
pub mod quality;
pub mod tolerance;
pub mod types;
pub mod validation;

pub use self::{
    boolean::{BooleanEngine, BooleanOpKind, BooleanResult},
    healing::{HealingReport, HealingResult, ShapeHealer},
    junctions::{JunctionResolution, JunctionResolver},
    network::{NetworkOptimizer, NetworkResult},
    offset::{JoinSelection, OffsetEngine, OffsetResult},
    quality::{AggregatedMetrics, QualityAnalyzer},
    tolerance::{ToleranceContext, ToleranceManager, ToleranceRecommendation},
    types::{
        BoundingBox, CreationMethod, Curve, CurveKind, IntersectionKind, IntersectionRecord,
        IntersectionState, JoinType, MiterCalculation, OffsetCurve, OffsetPair, Point, Point2D,
        Polygon, QualityIssue, QualityMetrics, Ring, WallSolid, WallType,
    },
    validation::{ValidationIssue, ValidationReport, Validator},
};
