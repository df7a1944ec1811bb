//! error.rs - Domain-Specific Error Types
//!
//! This module provides comprehensive error types for the wall geometry
//! core. Each error type is designed to provide clear, actionable
//! information: offending values are carried in the variant so callers can
//! report exactly what was wrong without re-deriving it.
//!
//! Engines never panic across a component boundary. Recoverable conditions
//! (degenerate geometry, kernel refusals) are absorbed by fallback cascades
//! and surface as warnings; only unrecoverable conditions become errors.

use crate::context::Interrupt;
use thiserror::Error;

/// Main error type for the parapet library
///
/// This enum encompasses all possible errors that can occur during
/// wall geometry operations.
#[derive(Error, Debug)]
pub enum WallError {
    /// Errors related to geometric primitives and value types
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// Errors from the robust offset engine
    #[error("Offset error: {0}")]
    Offset(#[from] OffsetError),

    /// Errors from the boolean engine
    #[error("Boolean error: {0}")]
    Boolean(#[from] BooleanError),

    /// Errors from the shape healer
    #[error("Healing error: {0}")]
    Healing(#[from] HealingError),

    /// Errors related to configuration validation
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Errors from the unified wall store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors related to geometric primitives and value types
#[derive(Error, Debug)]
pub enum GeometryError {
    /// Invalid point coordinates
    #[error("Invalid point coordinates: ({x}, {y}). Coordinates must be finite numbers.")]
    InvalidPoint { x: f64, y: f64 },

    /// A curve needs at least two distinct points
    #[error("Curve has too few points: {count}. A curve requires at least 2 distinct points.")]
    CurveTooShort { count: usize },

    /// Non-positive wall thickness
    #[error("Invalid wall thickness: {value}. Thickness must be positive.")]
    InvalidThickness { value: f64 },

    /// Non-positive tolerance
    #[error("Invalid tolerance: {value}. Tolerance must be positive.")]
    InvalidTolerance { value: f64 },

    /// A polygon ring violates a structural invariant
    #[error("Malformed polygon: {reason}")]
    MalformedPolygon { reason: String },

    /// Geometry collapsed below tolerance during an operation
    #[error("Degenerate geometry: {reason}")]
    DegenerateGeometry { reason: String },
}

impl GeometryError {
    pub fn invalid_point(point: (f64, f64)) -> Self {
        GeometryError::InvalidPoint {
            x: point.0,
            y: point.1,
        }
    }

    pub fn malformed_polygon<S: Into<String>>(reason: S) -> Self {
        GeometryError::MalformedPolygon {
            reason: reason.into(),
        }
    }

    pub fn degenerate<S: Into<String>>(reason: S) -> Self {
        GeometryError::DegenerateGeometry {
            reason: reason.into(),
        }
    }
}

/// Errors from the robust offset engine
#[derive(Error, Debug)]
pub enum OffsetError {
    /// Baseline has fewer than two usable points
    #[error("Baseline too short for offsetting: {count} points. At least 2 are required.")]
    BaselineTooShort { count: usize },

    /// Offset distance does not exceed the working tolerance
    #[error("Invalid offset distance: {distance} (tolerance {tolerance}). |distance| must exceed the tolerance.")]
    InvalidDistance { distance: f64, tolerance: f64 },

    /// Non-positive tolerance
    #[error("Invalid offset tolerance: {value}. Tolerance must be positive.")]
    InvalidTolerance { value: f64 },

    /// Every fallback stage was exhausted
    #[error("Numerical failure: all offset fallback stages exhausted. Warnings: {}", warnings.join("; "))]
    NumericalFailure { warnings: Vec<String> },

    /// The operation was cancelled or timed out
    #[error("Offset operation interrupted: {0:?}")]
    Interrupted(Interrupt),
}

impl From<Interrupt> for OffsetError {
    fn from(interrupt: Interrupt) -> Self {
        OffsetError::Interrupted(interrupt)
    }
}

/// Errors from the boolean engine
#[derive(Error, Debug)]
pub enum BooleanError {
    /// An operand carries no usable geometry
    #[error("Degenerate boolean input: {reason}")]
    DegenerateInput { reason: String },

    /// Batch union invoked over an empty wall set
    #[error("Boolean operation requires at least one operand")]
    EmptyInput,

    /// The clipping kernel refused the input and all fallbacks failed
    #[error("Boolean kernel failure after {attempts} fallback attempts: {reason}")]
    KernelFailure { reason: String, attempts: usize },

    /// The operation was cancelled or timed out
    #[error("Boolean operation interrupted: {0:?}")]
    Interrupted(Interrupt),
}

impl BooleanError {
    pub fn degenerate<S: Into<String>>(reason: S) -> Self {
        BooleanError::DegenerateInput {
            reason: reason.into(),
        }
    }
}

impl From<Interrupt> for BooleanError {
    fn from(interrupt: Interrupt) -> Self {
        BooleanError::Interrupted(interrupt)
    }
}

/// Errors from the shape healer
#[derive(Error, Debug)]
pub enum HealingError {
    /// The solid to heal carries no polygons at all
    #[error("Cannot heal wall solid {wall_id}: it has no boundary polygons")]
    EmptySolid { wall_id: u64 },

    /// The operation was cancelled or timed out; completed passes are kept
    #[error("Healing interrupted after {completed_iterations} iterations: {interrupt:?}")]
    Interrupted {
        interrupt: Interrupt,
        completed_iterations: usize,
    },
}

/// Errors related to configuration validation
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// A configuration field is outside its documented bounds
    #[error("Invalid configuration: {field} = {value}. {constraint}")]
    InvalidValue {
        field: String,
        value: f64,
        constraint: String,
    },

    /// Two configuration values contradict each other
    #[error("Conflicting configuration values: {conflict}")]
    ConflictingValues { conflict: String },
}

impl ConfigurationError {
    pub fn invalid_value<S: Into<String>, C: Into<String>>(
        field: S,
        value: f64,
        constraint: C,
    ) -> Self {
        ConfigurationError::InvalidValue {
            field: field.into(),
            value,
            constraint: constraint.into(),
        }
    }
}

/// Errors from the unified wall store
#[derive(Error, Debug)]
pub enum StoreError {
    /// No wall with the given id exists
    #[error("Wall {id} not found in the store")]
    WallNotFound { id: u64 },

    /// Re-deriving the non-authoritative representation failed
    #[error("Synchronization of wall {id} failed: {reason}")]
    SyncFailed { id: u64, reason: String },

    /// A mode switch was rejected by the compatibility check
    #[error("Mode switch for wall {id} rejected: {reason}")]
    ModeSwitchRejected { id: u64, reason: String },

    /// A persisted document could not be read or written
    #[error("Persistence error: {0}")]
    Persistence(#[from] serde_json::Error),

    /// A persisted document carries an unknown schema version
    #[error("Unsupported document schema version {found}; this build reads versions up to {supported}")]
    UnsupportedSchema { found: u32, supported: u32 },

    /// The operation was cancelled or timed out
    #[error("Store operation interrupted: {0:?}")]
    Interrupted(Interrupt),
}

impl From<Interrupt> for StoreError {
    fn from(interrupt: Interrupt) -> Self {
        StoreError::Interrupted(interrupt)
    }
}

/// Result type alias for operations that can produce any parapet error
pub type WallResult<T> = Result<T, WallError>;

/// Result type alias for geometry primitive operations
pub type GeometryResult<T> = Result<T, GeometryError>;

/// Result type alias for offset operations
pub type OffsetOpResult<T> = Result<T, OffsetError>;

/// Result type alias for boolean operations
pub type BooleanOpResult<T> = Result<T, BooleanError>;

/// Result type alias for healing operations
pub type HealingOpResult<T> = Result<T, HealingError>;

/// Result type alias for configuration operations
pub type ConfigurationResult<T> = Result<T, ConfigurationError>;

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
