//! Parapet - 2D BIM Wall Geometry Core
//!
//! A focused library for architectural walls represented as thick solids
//! in the 2D plane. Walls are centerline curves swept at a thickness; the
//! core produces watertight, topologically consistent wall solids whose
//! boundaries meet exactly at T-, L-, cross-, and parallel-overlap
//! junctions, and which stay robust against the usual numerical
//! pathologies of 2D computational geometry.
//!
//! # Architecture
//!
//! The library is organized into several key modules:
//!
//! - **geometry**: the geometric pipeline
//!   - `types`: fundamental data structures (Point, Curve, Polygon, WallSolid…)
//!   - `primitives`: total geometric predicates with explicit tolerances
//!   - `tolerance`: adaptive tolerance selection from thickness and context
//!   - `offset`: robust offsetting with join strategies and fallbacks
//!   - `boolean`: polygon union/intersection/difference over the clipping kernel
//!   - `junctions`: T/L/cross/parallel-overlap resolvers
//!   - `healing`: sliver removal, duplicate merging, micro-gap closure
//!   - `network`: spatially indexed, batched junction resolution
//!   - `quality`: accuracy/topology/manufacturability/compliance scoring
//!   - `validation`: structural and semantic invariant checks
//! - **store**: the dual basic/BIM wall store, sync engine, mode switcher,
//!   persistence, and change stream
//! - **cache**: TTL + LRU intersection/miter cache with a sweeper thread
//! - **config**: validated configuration types for every engine
//! - **visualizations**: plan-view rendering for debugging
//! - **error**: domain-specific error types
//!
//! # Example
//!
//! ```rust
//! use parapet::{
//!     config::CoreConfig,
//!     context::OperationContext,
//!     geometry::{Curve, WallType},
//!     store::{types::WallMode, WallStore},
//! };
//!
//! let store = WallStore::new(CoreConfig::default()).expect("valid config");
//! let baseline = Curve::polyline(&[(0.0, 0.0), (2000.0, 0.0)], 1e-6).unwrap();
//! let id = store
//!     .create(baseline, WallType::Zone, None, WallMode::Basic)
//!     .unwrap();
//! store.synchronize(id, &OperationContext::new()).unwrap();
//! let wall = store.wall(id).unwrap();
//! assert!(wall.bim.is_some());
//! ```

pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod geometry;
pub mod store;
pub mod visualizations;

pub use cache::{CacheStatistics, GeometryCache};
pub use config::{CacheConfig, CoreConfig, HealingConfig, OffsetConfig, ToleranceConfig};
pub use context::{Interrupt, OperationContext};
pub use error::{
    BooleanError, ConfigurationError, GeometryError, HealingError, OffsetError, StoreError,
    WallError, WallResult,
};
pub use store::types::{CompatibilityStatus, ModeSwitchResult, UnifiedWallData, WallMode};
pub use store::WallStore;
pub use visualizations::plot_walls;
