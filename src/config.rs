//! config.rs - Core Configuration
//!
//! This module provides configuration management for the wall geometry
//! core. It centralizes all tunable values and eliminates scattered magic
//! numbers by providing validated configuration types with clear
//! constraints and relationships.
//!
//! # Design Principles
//!
//! - **Single Source of Truth**: every default and bound is defined once,
//!   in the [`constants`] module
//! - **Validation**: all configurations are validated at creation time
//! - **Immutability**: configurations are immutable after creation
//! - **Composability**: the composite [`CoreConfig`] is built from the
//!   per-engine configurations

use crate::error::{ConfigurationError, ConfigurationResult};

/// Configuration constants for the geometry core
pub mod constants {
    /// Tolerance as a fraction of wall thickness (0.1%)
    pub const TOLERANCE_BASE_RATIO: f64 = 1e-3;
    /// Lower tolerance clamp as a fraction of wall thickness
    pub const TOLERANCE_MIN_RATIO: f64 = 1e-4;
    /// Upper tolerance clamp as a fraction of wall thickness
    pub const TOLERANCE_MAX_RATIO: f64 = 1e-2;
    /// Angle below which numeric tests are loosened (degrees)
    pub const TOLERANCE_LOOSENING_ANGLE_DEG: f64 = 30.0;
    /// Floor applied to the local-precision multiplier
    pub const MIN_PRECISION_FACTOR: f64 = 0.1;

    /// Default miter limit (multiples of the offset distance)
    pub const DEFAULT_MITER_LIMIT: f64 = 10.0;
    /// Relaxed miter limit used by the offset fallback cascade
    pub const RELAXED_MITER_LIMIT: f64 = 2.0;
    /// Default chord count for round joins
    pub const DEFAULT_ROUND_SEGMENTS: usize = 8;
    /// Segments shorter than this are skipped during offsetting (mm)
    pub const MIN_SEGMENT_LENGTH: f64 = 1e-6;
    /// Perpendicular distance below which a vertex counts as collinear
    /// during baseline simplification (mm)
    pub const SIMPLIFY_COLLINEAR_DISTANCE: f64 = 1.0;

    /// Isoperimetric ratio below which a ring counts as a sliver
    pub const DEFAULT_SLIVER_THRESHOLD: f64 = 1e-3;
    /// Distance below which two consecutive vertices are duplicates (mm)
    pub const DEFAULT_DUPLICATE_EDGE_TOLERANCE: f64 = 1e-6;
    /// Largest vertex gap closed by midpoint insertion (mm)
    pub const DEFAULT_MICRO_GAP_THRESHOLD: f64 = 1e-4;
    /// Cap on composite healing iterations
    pub const DEFAULT_MAX_HEALING_ITERATIONS: usize = 10;

    /// Default cache entry cap
    pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 1000;
    /// Default cache memory budget (MB)
    pub const DEFAULT_CACHE_MAX_MEMORY_MB: usize = 50;
    /// Default cache entry time-to-live (minutes)
    pub const DEFAULT_CACHE_TTL_MINUTES: u64 = 60;
    /// Default sweep interval for the cache cleaner (minutes)
    pub const DEFAULT_CACHE_CLEANUP_INTERVAL_MINUTES: u64 = 10;

    /// Complexity budget for boolean operations (vertex-pairs)
    pub const MAX_BOOLEAN_COMPLEXITY: usize = 10_000;
    /// Batch unions above this operand count use divide-and-conquer
    pub const SEQUENTIAL_UNION_LIMIT: usize = 10;

    /// Baselines closer in direction than this are parallel (radians)
    pub const PARALLEL_OVERLAP_THRESHOLD: f64 = 0.1;
    /// Half-width of the angular window around 90 degrees used when
    /// classifying L-junctions (degrees)
    pub const RIGHT_ANGLE_WINDOW_DEG: f64 = 15.0;

    /// Default thickness for layout walls (mm)
    pub const LAYOUT_WALL_THICKNESS: f64 = 350.0;
    /// Default thickness for zone walls (mm)
    pub const ZONE_WALL_THICKNESS: f64 = 250.0;
    /// Default thickness for area walls (mm)
    pub const AREA_WALL_THICKNESS: f64 = 150.0;
}

/// Configuration for the adaptive tolerance manager
#[derive(Clone, Copy, Debug)]
pub struct ToleranceConfig {
    /// Fallback tolerance when no thickness is in play
    pub default: f64,
    /// Lower clamp as a fraction of thickness
    pub min_ratio: f64,
    /// Upper clamp as a fraction of thickness
    pub max_ratio: f64,
}

impl ToleranceConfig {
    /// Create a new tolerance configuration with validation
    pub fn new(default: f64, min_ratio: f64, max_ratio: f64) -> ConfigurationResult<Self> {
        let config = Self {
            default,
            min_ratio,
            max_ratio,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the tolerance configuration
    pub fn validate(&self) -> ConfigurationResult<()> {
        if self.default <= 0.0 || !self.default.is_finite() {
            return Err(ConfigurationError::invalid_value(
                "tolerance.default",
                self.default,
                "Must be a positive finite number.",
            ));
        }
        if self.min_ratio <= 0.0 {
            return Err(ConfigurationError::invalid_value(
                "tolerance.min_ratio",
                self.min_ratio,
                "Must be positive.",
            ));
        }
        if self.max_ratio <= 0.0 {
            return Err(ConfigurationError::invalid_value(
                "tolerance.max_ratio",
                self.max_ratio,
                "Must be positive.",
            ));
        }
        if self.min_ratio >= self.max_ratio {
            return Err(ConfigurationError::ConflictingValues {
                conflict: format!(
                    "tolerance.min_ratio ({}) must be below tolerance.max_ratio ({})",
                    self.min_ratio, self.max_ratio
                ),
            });
        }
        Ok(())
    }
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            default: 1e-6,
            min_ratio: constants::TOLERANCE_MIN_RATIO,
            max_ratio: constants::TOLERANCE_MAX_RATIO,
        }
    }
}

/// Configuration for the robust offset engine
#[derive(Clone, Copy, Debug)]
pub struct OffsetConfig {
    /// Join used when the caller does not ask for automatic selection
    pub default_join: crate::geometry::JoinType,
    /// Miter length limit in multiples of the offset distance
    pub miter_limit: f64,
    /// Chord count used to approximate round joins
    pub round_segments: usize,
}

impl OffsetConfig {
    /// Create a new offset configuration with validation
    pub fn new(
        default_join: crate::geometry::JoinType,
        miter_limit: f64,
        round_segments: usize,
    ) -> ConfigurationResult<Self> {
        let config = Self {
            default_join,
            miter_limit,
            round_segments,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the offset configuration
    pub fn validate(&self) -> ConfigurationResult<()> {
        if self.miter_limit < 1.0 || !self.miter_limit.is_finite() {
            return Err(ConfigurationError::invalid_value(
                "offset.miter_limit",
                self.miter_limit,
                "Must be at least 1.",
            ));
        }
        if self.round_segments < 2 {
            return Err(ConfigurationError::invalid_value(
                "offset.round_segments",
                self.round_segments as f64,
                "Must be at least 2 chords.",
            ));
        }
        Ok(())
    }
}

impl Default for OffsetConfig {
    fn default() -> Self {
        Self {
            default_join: crate::geometry::JoinType::Miter,
            miter_limit: constants::DEFAULT_MITER_LIMIT,
            round_segments: constants::DEFAULT_ROUND_SEGMENTS,
        }
    }
}

/// Configuration for the shape healer
#[derive(Clone, Copy, Debug)]
pub struct HealingConfig {
    /// Isoperimetric ratio below which a ring is a sliver
    pub sliver_threshold: f64,
    /// Distance below which consecutive vertices merge
    pub duplicate_edge_tolerance: f64,
    /// Largest gap closed by midpoint insertion
    pub micro_gap_threshold: f64,
    /// Cap on composite healing iterations
    pub max_iterations: usize,
    /// Protect user-placed vertices from removal
    pub preserve_architectural_features: bool,
}

impl HealingConfig {
    /// Create a new healing configuration with validation
    pub fn new(
        sliver_threshold: f64,
        duplicate_edge_tolerance: f64,
        micro_gap_threshold: f64,
        max_iterations: usize,
        preserve_architectural_features: bool,
    ) -> ConfigurationResult<Self> {
        let config = Self {
            sliver_threshold,
            duplicate_edge_tolerance,
            micro_gap_threshold,
            max_iterations,
            preserve_architectural_features,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the healing configuration
    pub fn validate(&self) -> ConfigurationResult<()> {
        if self.sliver_threshold <= 0.0 || self.sliver_threshold >= 1.0 {
            return Err(ConfigurationError::invalid_value(
                "healing.sliver_threshold",
                self.sliver_threshold,
                "Must lie strictly between 0 and 1.",
            ));
        }
        if self.duplicate_edge_tolerance <= 0.0 {
            return Err(ConfigurationError::invalid_value(
                "healing.duplicate_edge_tolerance",
                self.duplicate_edge_tolerance,
                "Must be positive.",
            ));
        }
        if self.micro_gap_threshold <= 0.0 {
            return Err(ConfigurationError::invalid_value(
                "healing.micro_gap_threshold",
                self.micro_gap_threshold,
                "Must be positive.",
            ));
        }
        if self.duplicate_edge_tolerance >= self.micro_gap_threshold {
            return Err(ConfigurationError::ConflictingValues {
                conflict: format!(
                    "healing.duplicate_edge_tolerance ({}) must be below healing.micro_gap_threshold ({})",
                    self.duplicate_edge_tolerance, self.micro_gap_threshold
                ),
            });
        }
        if self.max_iterations == 0 {
            return Err(ConfigurationError::invalid_value(
                "healing.max_iterations",
                0.0,
                "Must be at least 1.",
            ));
        }
        Ok(())
    }
}

impl Default for HealingConfig {
    fn default() -> Self {
        Self {
            sliver_threshold: constants::DEFAULT_SLIVER_THRESHOLD,
            duplicate_edge_tolerance: constants::DEFAULT_DUPLICATE_EDGE_TOLERANCE,
            micro_gap_threshold: constants::DEFAULT_MICRO_GAP_THRESHOLD,
            max_iterations: constants::DEFAULT_MAX_HEALING_ITERATIONS,
            preserve_architectural_features: true,
        }
    }
}

/// Configuration for the intersection/miter cache
#[derive(Clone, Copy, Debug)]
pub struct CacheConfig {
    /// Entry cap before eviction starts
    pub max_entries: usize,
    /// Estimated memory budget in megabytes
    pub max_memory_mb: usize,
    /// Entry time-to-live in minutes
    pub ttl_minutes: u64,
    /// Interval between sweeper passes in minutes
    pub cleanup_interval_minutes: u64,
    /// Record hit/miss statistics
    pub enable_statistics: bool,
}

impl CacheConfig {
    /// Create a new cache configuration with validation
    pub fn new(
        max_entries: usize,
        max_memory_mb: usize,
        ttl_minutes: u64,
        cleanup_interval_minutes: u64,
        enable_statistics: bool,
    ) -> ConfigurationResult<Self> {
        let config = Self {
            max_entries,
            max_memory_mb,
            ttl_minutes,
            cleanup_interval_minutes,
            enable_statistics,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the cache configuration
    pub fn validate(&self) -> ConfigurationResult<()> {
        if self.max_entries == 0 {
            return Err(ConfigurationError::invalid_value(
                "cache.max_entries",
                0.0,
                "Must be at least 1.",
            ));
        }
        if self.max_memory_mb == 0 {
            return Err(ConfigurationError::invalid_value(
                "cache.max_memory_mb",
                0.0,
                "Must be at least 1 MB.",
            ));
        }
        if self.ttl_minutes == 0 {
            return Err(ConfigurationError::invalid_value(
                "cache.ttl_minutes",
                0.0,
                "Must be at least 1 minute.",
            ));
        }
        if self.cleanup_interval_minutes == 0 {
            return Err(ConfigurationError::invalid_value(
                "cache.cleanup_interval_minutes",
                0.0,
                "Must be at least 1 minute.",
            ));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: constants::DEFAULT_CACHE_MAX_ENTRIES,
            max_memory_mb: constants::DEFAULT_CACHE_MAX_MEMORY_MB,
            ttl_minutes: constants::DEFAULT_CACHE_TTL_MINUTES,
            cleanup_interval_minutes: constants::DEFAULT_CACHE_CLEANUP_INTERVAL_MINUTES,
            enable_statistics: true,
        }
    }
}

/// Composite configuration for the whole geometry core
#[derive(Clone, Copy, Debug, Default)]
pub struct CoreConfig {
    pub tolerance: ToleranceConfig,
    pub offset: OffsetConfig,
    pub healing: HealingConfig,
    pub cache: CacheConfig,
}

impl CoreConfig {
    /// Validate every section of the configuration
    pub fn validate(&self) -> ConfigurationResult<()> {
        self.tolerance.validate()?;
        self.offset.validate()?;
        self.healing.validate()?;
        self.cache.validate()?;
        Ok(())
    }

    /// Start building a configuration from the defaults
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }
}

/// Builder for [`CoreConfig`]
///
/// Sections not overridden keep their defaults; the final `build()` call
/// validates the composite.
#[derive(Debug, Default)]
pub struct CoreConfigBuilder {
    tolerance: Option<ToleranceConfig>,
    offset: Option<OffsetConfig>,
    healing: Option<HealingConfig>,
    cache: Option<CacheConfig>,
}

impl CoreConfigBuilder {
    pub fn tolerance(mut self, config: ToleranceConfig) -> Self {
        self.tolerance = Some(config);
        self
    }

    pub fn offset(mut self, config: OffsetConfig) -> Self {
        self.offset = Some(config);
        self
    }

    pub fn healing(mut self, config: HealingConfig) -> Self {
        self.healing = Some(config);
        self
    }

    pub fn cache(mut self, config: CacheConfig) -> Self {
        self.cache = Some(config);
        self
    }

    pub fn build(self) -> ConfigurationResult<CoreConfig> {
        let config = CoreConfig {
            tolerance: self.tolerance.unwrap_or_default(),
            offset: self.offset.unwrap_or_default(),
            healing: self.healing.unwrap_or_default(),
            cache: self.cache.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }
}
