//! store/mod.rs - Unified Wall Store
//!
//! The store owns every wall in both representations, the intersection
//! side table, the cache, and the change stream. It is the single entry
//! point the UI layer talks to: mutations are serialized per wall by the
//! version counter, derived state is refreshed through the sync engine,
//! and every committed change is announced to subscribers.

pub mod events;
pub mod persistence;
pub mod sync;
pub mod types;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use log::{debug, info};

use crate::cache::{CacheStatistics, GeometryCache};
use crate::config::CoreConfig;
use crate::context::OperationContext;
use crate::error::{GeometryError, StoreError, StoreResult, WallError, WallResult};
use crate::geometry::healing::{HealingReport, ShapeHealer};
use crate::geometry::network::{NetworkOptimizer, NetworkResult};
use crate::geometry::quality::{AggregatedMetrics, QualityAnalyzer};
use crate::geometry::tolerance::ToleranceContext;
use crate::geometry::types::{Curve, IntersectionRecord, JoinType, WallType};
use crate::geometry::validation::{ValidationReport, Validator};

use self::events::{ChangeEvent, SubscriberRegistry, Subscription};
use self::persistence::ProjectDocument;
use self::sync::{CompatibilityChecker, SyncEngine};
use self::types::{CompatibilityStatus, ModeSwitchResult, UnifiedWallData, WallMode};

struct StoreState {
    walls: HashMap<u64, UnifiedWallData>,
    intersections: HashMap<u64, IntersectionRecord>,
}

/// The unified wall store
///
/// Interior-locked: share by reference (or `Arc`) across threads. One
/// writer at a time; reads see committed versions only.
pub struct WallStore {
    state: RwLock<StoreState>,
    next_wall_id: AtomicU64,
    next_intersection_id: AtomicU64,
    cache: GeometryCache,
    config: CoreConfig,
    sync: SyncEngine,
    checker: CompatibilityChecker,
    validator: Validator,
    healer: ShapeHealer,
    analyzer: QualityAnalyzer,
    optimizer: NetworkOptimizer,
    subscribers: SubscriberRegistry,
}

impl WallStore {
    /// Create an empty store with a validated configuration
    pub fn new(config: CoreConfig) -> WallResult<Self> {
        config.validate().map_err(WallError::Configuration)?;
        Ok(Self {
            state: RwLock::new(StoreState {
                walls: HashMap::new(),
                intersections: HashMap::new(),
            }),
            next_wall_id: AtomicU64::new(1),
            next_intersection_id: AtomicU64::new(1),
            cache: GeometryCache::new(config.cache),
            sync: SyncEngine::new(&config),
            checker: CompatibilityChecker,
            validator: Validator::new(),
            healer: ShapeHealer::new(config.healing),
            analyzer: QualityAnalyzer::new(config.healing),
            optimizer: NetworkOptimizer::new(config.offset),
            subscribers: SubscriberRegistry::new(),
            config,
        })
    }

    /// Create a wall from a baseline
    ///
    /// `thickness` of `None` uses the wall type's default. The wall is
    /// authoritative in `mode` and pending sync into the other.
    pub fn create(
        &self,
        baseline: Curve,
        wall_type: WallType,
        thickness: Option<f64>,
        mode: WallMode,
    ) -> WallResult<u64> {
        let thickness = thickness.unwrap_or_else(|| wall_type.default_thickness());
        if thickness <= 0.0 || !thickness.is_finite() {
            return Err(GeometryError::InvalidThickness { value: thickness }.into());
        }

        let id = self.next_wall_id.fetch_add(1, Ordering::SeqCst);
        let wall = UnifiedWallData::new(id, baseline, wall_type, thickness, mode);
        let version = wall.version;
        {
            let mut state = self.state.write().expect("store lock poisoned");
            state.walls.insert(id, wall);
        }
        self.subscribers.notify(ChangeEvent {
            wall_id: id,
            version,
        });
        info!("created wall {id} ({wall_type:?}, thickness {thickness})");
        Ok(id)
    }

    /// Replace a wall's baseline
    ///
    /// A baseline edit is a basic-mode mutation: the BIM side goes stale
    /// and every junction record touching the wall is invalidated.
    pub fn update_baseline(&self, id: u64, baseline: Curve) -> StoreResult<()> {
        let version = {
            let mut state = self.state.write().expect("store lock poisoned");
            let wall = state.walls.get_mut(&id).ok_or(StoreError::WallNotFound { id })?;
            wall.baseline = baseline;
            wall.basic = None;
            wall.touch(WallMode::Basic);
            let version = wall.version;
            invalidate_wall_records(&mut state, id, &self.cache);
            version
        };
        self.subscribers.notify(ChangeEvent {
            wall_id: id,
            version,
        });
        Ok(())
    }

    /// Show or hide a set of walls
    pub fn set_visible(&self, ids: &[u64], visible: bool) -> StoreResult<()> {
        self.mutate_each(ids, |wall| {
            wall.visible = visible;
            // Visibility is presentation state, not geometry; neither
            // representation goes stale.
            wall.version += 1;
            wall.updated_at_ms = crate::geometry::types::now_millis();
            Ok(())
        })
    }

    /// Set the preferred join type for a set of walls
    pub fn set_join_type(&self, ids: &[u64], join: JoinType) -> StoreResult<()> {
        let changed = self.mutate_each(ids, |wall| {
            wall.preferred_join = join;
            wall.touch(WallMode::Basic);
            Ok(())
        });
        if changed.is_ok() {
            let mut state = self.state.write().expect("store lock poisoned");
            for &id in ids {
                invalidate_wall_records(&mut state, id, &self.cache);
            }
        }
        changed
    }

    /// Override the working tolerance for a set of walls
    pub fn set_tolerance(&self, ids: &[u64], tolerance: f64) -> StoreResult<()> {
        if tolerance <= 0.0 || !tolerance.is_finite() {
            return Err(StoreError::SyncFailed {
                id: ids.first().copied().unwrap_or(0),
                reason: format!("tolerance {tolerance} must be positive"),
            });
        }
        self.mutate_each(ids, |wall| {
            wall.tolerance_override = Some(tolerance);
            wall.touch(WallMode::Basic);
            Ok(())
        })
    }

    /// Delete walls, cascading to their intersection records
    pub fn delete(&self, ids: &[u64]) -> StoreResult<()> {
        let mut state = self.state.write().expect("store lock poisoned");
        for &id in ids {
            if state.walls.remove(&id).is_none() {
                return Err(StoreError::WallNotFound { id });
            }
            // Cascade: every record referencing the wall dies with it.
            let dead: Vec<u64> = state
                .intersections
                .iter()
                .filter(|(_, r)| r.wall_ids.contains(&id))
                .map(|(&rid, _)| rid)
                .collect();
            for rid in dead {
                state.intersections.remove(&rid);
                for wall in state.walls.values_mut() {
                    if let Some(solid) = wall.bim.as_mut() {
                        solid.intersection_ids.retain(|&x| x != rid);
                    }
                }
            }
            self.cache.invalidate_wall(id);
        }
        debug!("deleted {} wall(s)", ids.len());
        Ok(())
    }

    /// Lazily re-derive the stale representation of one wall
    pub fn synchronize(&self, id: u64, ctx: &OperationContext) -> StoreResult<()> {
        let mut state = self.state.write().expect("store lock poisoned");
        let wall = state.walls.get_mut(&id).ok_or(StoreError::WallNotFound { id })?;
        self.sync.synchronize(wall, ctx)
    }

    /// Switch a wall set to the target representation
    pub fn switch_mode(
        &self,
        ids: &[u64],
        target: WallMode,
        ctx: &OperationContext,
    ) -> StoreResult<ModeSwitchResult> {
        let start = std::time::Instant::now();
        let compatibility = self.compatibility_status(ids, target)?;
        let mut result = ModeSwitchResult {
            success: true,
            converted_ids: Vec::new(),
            failed_ids: Vec::new(),
            warnings: Vec::new(),
            preserved_data: compatibility.potential_data_loss.is_empty(),
            processing_time_ms: 0.0,
            quality_impact: compatibility.quality_impact,
            approximations_used: compatibility.potential_data_loss,
        };

        let mut events = Vec::new();
        {
            let mut state = self.state.write().expect("store lock poisoned");
            for &id in ids {
                ctx.check()?;
                let Some(wall) = state.walls.get_mut(&id) else {
                    result.failed_ids.push(id);
                    result.success = false;
                    result.warnings.push(format!("wall {id} not found"));
                    continue;
                };
                match self.sync.synchronize(wall, ctx) {
                    Ok(()) => {
                        // An explicit switch transfers authorship. Both
                        // representations were just derived, so both stay
                        // valid and no further sync is pending.
                        wall.touch(target);
                        wall.requires_sync = false;
                        wall.basic_valid = true;
                        wall.bim_valid = true;
                        events.push(ChangeEvent {
                            wall_id: id,
                            version: wall.version,
                        });
                        result.converted_ids.push(id);
                    }
                    Err(e) => {
                        result.failed_ids.push(id);
                        result.success = false;
                        result.warnings.push(format!("wall {id}: {e}"));
                    }
                }
            }
        }
        for event in events {
            self.subscribers.notify(event);
        }
        result.processing_time_ms = start.elapsed().as_secs_f64() * 1000.0;
        Ok(result)
    }

    /// Evaluate a mode switch without performing it
    pub fn compatibility_status(
        &self,
        ids: &[u64],
        target: WallMode,
    ) -> StoreResult<CompatibilityStatus> {
        let state = self.state.read().expect("store lock poisoned");
        let mut walls = Vec::with_capacity(ids.len());
        for &id in ids {
            walls.push(state.walls.get(&id).ok_or(StoreError::WallNotFound { id })?);
        }
        Ok(self.checker.check(&walls, target))
    }

    /// Validate a wall set against the data-model invariants
    pub fn validate(&self, ids: &[u64]) -> StoreResult<HashMap<u64, ValidationReport>> {
        let state = self.state.read().expect("store lock poisoned");
        let mut reports = HashMap::with_capacity(ids.len());
        for &id in ids {
            let wall = state.walls.get(&id).ok_or(StoreError::WallNotFound { id })?;
            let report = match &wall.bim {
                Some(solid) => {
                    let tolerance =
                        self.sync.wall_tolerance(wall, ToleranceContext::VertexMerge);
                    self.validator.validate_solid(solid, tolerance)
                }
                None => self.validator.validate_curve(&wall.baseline),
            };
            reports.insert(id, report);
        }
        Ok(reports)
    }

    /// Heal the BIM solids of a wall set
    pub fn heal(
        &self,
        ids: &[u64],
        ctx: &OperationContext,
    ) -> StoreResult<HashMap<u64, HealingReport>> {
        let mut reports = HashMap::with_capacity(ids.len());
        let mut events = Vec::new();
        {
            let mut state = self.state.write().expect("store lock poisoned");
            for &id in ids {
                ctx.check()?;
                let wall = state.walls.get_mut(&id).ok_or(StoreError::WallNotFound { id })?;
                self.sync.synchronize(wall, ctx)?;
                let tolerance = self.sync.wall_tolerance(wall, ToleranceContext::ShapeHealing);
                let solid = wall.bim.as_mut().ok_or(StoreError::SyncFailed {
                    id,
                    reason: "synchronization left no BIM solid".to_string(),
                })?;
                let report =
                    self.healer
                        .heal(solid, tolerance, ctx)
                        .map_err(|e| StoreError::SyncFailed {
                            id,
                            reason: e.to_string(),
                        })?;
                solid.metrics = Some(self.analyzer.analyze(solid, tolerance));
                if !report.operations.is_empty() {
                    wall.version += 1;
                    wall.updated_at_ms = crate::geometry::types::now_millis();
                    events.push(ChangeEvent {
                        wall_id: id,
                        version: wall.version,
                    });
                }
                reports.insert(id, report);
            }
        }
        for event in events {
            self.subscribers.notify(event);
        }
        Ok(reports)
    }

    /// Quality metrics for a wall set, aggregated
    pub fn quality_metrics(&self, ids: &[u64]) -> StoreResult<AggregatedMetrics> {
        let state = self.state.read().expect("store lock poisoned");
        let mut per_wall = HashMap::with_capacity(ids.len());
        for &id in ids {
            let wall = state.walls.get(&id).ok_or(StoreError::WallNotFound { id })?;
            let tolerance = self.sync.wall_tolerance(wall, ToleranceContext::VertexMerge);
            let metrics = match (&wall.bim, wall.bim_valid) {
                (Some(solid), true) => solid
                    .metrics
                    .clone()
                    .unwrap_or_else(|| self.analyzer.analyze(solid, tolerance)),
                (Some(solid), false) => self.analyzer.analyze(solid, tolerance),
                (None, _) => {
                    return Err(StoreError::SyncFailed {
                        id,
                        reason: "wall has no BIM solid; synchronize first".to_string(),
                    })
                }
            };
            per_wall.insert(id, metrics);
        }
        Ok(QualityAnalyzer::aggregate(per_wall))
    }

    /// Resolve every junction among the given walls
    ///
    /// Walls are synchronized first; resolutions are applied to the BIM
    /// solids, the records land in the side table, and the basic view is
    /// re-derived so both representations stay committed together.
    pub fn resolve_junctions(
        &self,
        ids: &[u64],
        ctx: &OperationContext,
    ) -> StoreResult<NetworkResult> {
        let mut events = Vec::new();
        let result = {
            let mut state = self.state.write().expect("store lock poisoned");
            let mut sorted = ids.to_vec();
            sorted.sort_unstable();
            let mut solids = Vec::with_capacity(sorted.len());
            for &id in &sorted {
                let wall = state.walls.get_mut(&id).ok_or(StoreError::WallNotFound { id })?;
                self.sync.synchronize(wall, ctx)?;
                let solid = wall.bim.clone().ok_or(StoreError::SyncFailed {
                    id,
                    reason: "synchronization left no BIM solid".to_string(),
                })?;
                solids.push(solid);
            }

            let tolerance = solids
                .first()
                .map(|s| {
                    self.sync.wall_tolerance(
                        &state.walls[&s.id],
                        ToleranceContext::BooleanOperation,
                    )
                })
                .unwrap_or(self.config.tolerance.default);
            let id_base = self.next_intersection_id.load(Ordering::SeqCst);
            let network = self
                .optimizer
                .resolve_network(&solids, &self.cache, tolerance, id_base, ctx)
                .map_err(|e| StoreError::SyncFailed {
                    id: sorted.first().copied().unwrap_or(0),
                    reason: e.to_string(),
                })?;

            for resolution in &network.resolutions {
                let record = resolution.record.clone();
                self.next_intersection_id
                    .fetch_max(record.id + 1, Ordering::SeqCst);
                for modified in &resolution.modified_walls {
                    if let Some(wall) = state.walls.get_mut(&modified.id) {
                        let mut solid = modified.clone();
                        if !solid.intersection_ids.contains(&record.id) {
                            solid.intersection_ids.push(record.id);
                        }
                        if let Some(miter) = &resolution.miter {
                            solid.join_types.insert(record.id, miter.join_type);
                        }
                        wall.bim = Some(solid);
                        wall.bim_valid = true;
                        // Re-derive the basic view in the same commit so
                        // neither side is left stale.
                        wall.basic = Some(self.sync.derive_basic(wall));
                        wall.basic_valid = true;
                        wall.requires_sync = false;
                        wall.version += 1;
                        wall.updated_at_ms = crate::geometry::types::now_millis();
                        events.push(ChangeEvent {
                            wall_id: wall.id,
                            version: wall.version,
                        });
                    }
                }
                state.intersections.insert(record.id, record);
            }
            network
        };
        for event in events {
            self.subscribers.notify(event);
        }
        Ok(result)
    }

    /// Subscribe to committed changes matching `predicate`
    pub fn subscribe<F>(&self, predicate: F) -> Subscription
    where
        F: Fn(&ChangeEvent) -> bool + Send + Sync + 'static,
    {
        self.subscribers.subscribe(predicate)
    }

    /// Snapshot of one wall
    pub fn wall(&self, id: u64) -> StoreResult<UnifiedWallData> {
        let state = self.state.read().expect("store lock poisoned");
        state
            .walls
            .get(&id)
            .cloned()
            .ok_or(StoreError::WallNotFound { id })
    }

    /// Snapshot of one intersection record
    pub fn intersection(&self, id: u64) -> Option<IntersectionRecord> {
        let state = self.state.read().expect("store lock poisoned");
        state.intersections.get(&id).cloned()
    }

    /// Ids of all stored walls, sorted
    pub fn wall_ids(&self) -> Vec<u64> {
        let state = self.state.read().expect("store lock poisoned");
        let mut ids: Vec<u64> = state.walls.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn wall_count(&self) -> usize {
        self.state.read().expect("store lock poisoned").walls.len()
    }

    pub fn intersection_count(&self) -> usize {
        self.state
            .read()
            .expect("store lock poisoned")
            .intersections
            .len()
    }

    /// Cache statistics, when statistics are enabled
    pub fn cache_statistics(&self) -> Option<CacheStatistics> {
        self.cache.statistics()
    }

    /// Serialize the project to a JSON document
    pub fn save_to_json(&self) -> StoreResult<String> {
        let state = self.state.read().expect("store lock poisoned");
        ProjectDocument::from_state(&state.walls, &state.intersections).to_json()
    }

    /// Replace the store contents with a parsed document
    pub fn load_from_json(&self, json: &str) -> StoreResult<()> {
        let document = ProjectDocument::from_json(json)?;
        let (walls, intersections) = document.into_state();
        let max_wall = walls.keys().copied().max().unwrap_or(0);
        let max_record = intersections.keys().copied().max().unwrap_or(0);
        {
            let mut state = self.state.write().expect("store lock poisoned");
            state.walls = walls;
            state.intersections = intersections;
        }
        self.next_wall_id.store(max_wall + 1, Ordering::SeqCst);
        self.next_intersection_id
            .store(max_record + 1, Ordering::SeqCst);
        self.cache.clear();
        Ok(())
    }

    fn mutate_each<F>(&self, ids: &[u64], mut apply: F) -> StoreResult<()>
    where
        F: FnMut(&mut UnifiedWallData) -> StoreResult<()>,
    {
        let mut events = Vec::with_capacity(ids.len());
        {
            let mut state = self.state.write().expect("store lock poisoned");
            for &id in ids {
                let wall = state.walls.get_mut(&id).ok_or(StoreError::WallNotFound { id })?;
                apply(wall)?;
                events.push(ChangeEvent {
                    wall_id: id,
                    version: wall.version,
                });
            }
        }
        for event in events {
            self.subscribers.notify(event);
        }
        Ok(())
    }
}

/// Mark and drop every record referencing a mutated wall
fn invalidate_wall_records(state: &mut StoreState, wall_id: u64, cache: &GeometryCache) {
    let dead: Vec<u64> = state
        .intersections
        .iter()
        .filter(|(_, r)| r.wall_ids.contains(&wall_id))
        .map(|(&rid, _)| rid)
        .collect();
    for rid in &dead {
        if let Some(record) = state.intersections.get_mut(rid) {
            record.invalidate();
        }
    }
    state.intersections.retain(|_, r| r.is_validated() || r.state == crate::geometry::types::IntersectionState::Proposed);
    for wall in state.walls.values_mut() {
        if let Some(solid) = wall.bim.as_mut() {
            solid.intersection_ids.retain(|rid| !dead.contains(rid));
        }
    }
    cache.invalidate_wall(wall_id);
}

impl std::fmt::Debug for WallStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WallStore")
            .field("wall_count", &self.wall_count())
            .field("intersection_count", &self.intersection_count())
            .finish()
    }
}
