//! store/sync.rs - Synchronization and Mode Switching
//!
//! The sync engine re-derives whichever representation is stale from the
//! authoritative one. Basic to BIM builds a wall solid through the offset
//! engine and heals it; BIM to basic flattens the solid back into
//! segments, nodes, and outline polygons. The compatibility checker
//! announces ahead of a switch what a conversion would lose.

use log::debug;

use crate::config::CoreConfig;
use crate::context::OperationContext;
use crate::error::{StoreError, StoreResult};
use crate::geometry::healing::ShapeHealer;
use crate::geometry::offset::{JoinSelection, OffsetEngine};
use crate::geometry::quality::QualityAnalyzer;
use crate::geometry::tolerance::{ToleranceContext, ToleranceManager};
use crate::store::types::{
    BasicGeometry, BasicNode, BasicSegment, CompatibilityStatus, UnifiedWallData, WallMode,
};

/// Derives the stale representation from the authoritative one
#[derive(Debug, Clone, Copy)]
pub struct SyncEngine {
    offset: OffsetEngine,
    healer: ShapeHealer,
    analyzer: QualityAnalyzer,
    tolerances: ToleranceManager,
}

impl SyncEngine {
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            offset: OffsetEngine::new(config.offset),
            healer: ShapeHealer::new(config.healing),
            analyzer: QualityAnalyzer::new(config.healing),
            tolerances: ToleranceManager::new(config.tolerance),
        }
    }

    /// Working tolerance for a wall, honoring its override
    pub fn wall_tolerance(&self, wall: &UnifiedWallData, context: ToleranceContext) -> f64 {
        wall.tolerance_override
            .unwrap_or_else(|| self.tolerances.base_tolerance(wall.thickness, context))
    }

    /// Re-derive the stale representation and clear `requires_sync`
    ///
    /// Authorship is untouched: `last_modified_mode` still names the mode
    /// that last received a user mutation.
    pub fn synchronize(
        &self,
        wall: &mut UnifiedWallData,
        ctx: &OperationContext,
    ) -> StoreResult<()> {
        if !wall.requires_sync {
            return Ok(());
        }
        ctx.check()?;

        match wall.last_modified_mode {
            WallMode::Basic => {
                let solid = self.derive_solid(wall, ctx)?;
                wall.bim = Some(solid);
                wall.bim_valid = true;
            }
            WallMode::Bim => {
                // A wall created straight in BIM mode may not have been
                // materialized yet; the basic view flattens the solid.
                if wall.bim.is_none() {
                    wall.bim = Some(self.derive_solid(wall, ctx)?);
                }
                let basic = self.derive_basic(wall);
                wall.basic = Some(basic);
                wall.basic_valid = true;
            }
        }
        // A basic-authoritative wall may also lack its own view.
        if wall.basic.is_none() {
            wall.basic = Some(self.derive_basic(wall));
            wall.basic_valid = true;
        }

        wall.requires_sync = false;
        debug!("synchronized wall {} at version {}", wall.id, wall.version);
        Ok(())
    }

    /// Build the BIM solid from the baseline
    pub fn derive_solid(
        &self,
        wall: &UnifiedWallData,
        ctx: &OperationContext,
    ) -> StoreResult<crate::geometry::types::WallSolid> {
        let tolerance = self.wall_tolerance(wall, ToleranceContext::OffsetOperation);
        let mut solid = self
            .offset
            .sweep_solid(
                wall.id,
                wall.baseline.clone(),
                wall.thickness,
                wall.wall_type,
                JoinSelection::Fixed(wall.preferred_join),
                tolerance,
            )
            .map_err(|e| StoreError::SyncFailed {
                id: wall.id,
                reason: e.to_string(),
            })?;

        let healing_tolerance = self.wall_tolerance(wall, ToleranceContext::ShapeHealing);
        self.healer
            .heal(&mut solid, healing_tolerance, ctx)
            .map_err(|e| StoreError::SyncFailed {
                id: wall.id,
                reason: e.to_string(),
            })?;
        solid.metrics = Some(self.analyzer.analyze(&solid, healing_tolerance));
        Ok(solid)
    }

    /// Flatten the wall into the basic representation
    ///
    /// Segments and nodes come from the baseline; outline polygons come
    /// from the BIM solid when present, otherwise they are left empty
    /// until the solid exists.
    pub fn derive_basic(&self, wall: &UnifiedWallData) -> BasicGeometry {
        let coords = wall.baseline.coords();
        let nodes: Vec<BasicNode> = coords
            .iter()
            .enumerate()
            .map(|(i, &point)| {
                let mut segments = Vec::new();
                if i > 0 {
                    segments.push(i as u64 - 1);
                }
                if i + 1 < coords.len() {
                    segments.push(i as u64);
                }
                BasicNode {
                    id: i as u64,
                    point,
                    segments,
                }
            })
            .collect();
        let segments: Vec<BasicSegment> = coords
            .windows(2)
            .enumerate()
            .map(|(i, w)| BasicSegment {
                id: i as u64,
                start: w[0],
                end: w[1],
            })
            .collect();
        let polygons = wall
            .bim
            .as_ref()
            .map(|solid| solid.polygons.clone())
            .unwrap_or_default();
        BasicGeometry {
            segments,
            nodes,
            polygons,
        }
    }
}

/// Announces what a mode switch would cost before it runs
#[derive(Debug, Clone, Copy, Default)]
pub struct CompatibilityChecker;

impl CompatibilityChecker {
    /// Evaluate a switch of `walls` to `target`
    ///
    /// BIM to basic is lossy when any wall carries intersection records
    /// or a visibly non-constant local thickness; each loss is listed.
    pub fn check(&self, walls: &[&UnifiedWallData], target: WallMode) -> CompatibilityStatus {
        let mut data_loss = Vec::new();
        let mut actions = Vec::new();
        let mut estimated_ms = 0.0;
        let mut quality_impact: f64 = 0.0;

        for wall in walls {
            estimated_ms += wall
                .bim
                .as_ref()
                .map(|s| s.processing_time_estimate_ms)
                .unwrap_or(0.5);

            if target == WallMode::Basic {
                let intersections = wall.intersection_ids();
                if !intersections.is_empty() {
                    data_loss.push(format!(
                        "wall {}: {} junction record(s) will be dropped",
                        wall.id,
                        intersections.len()
                    ));
                    quality_impact -= 0.1;
                }
                if let Some(solid) = &wall.bim {
                    if !solid.healing_history.is_empty() {
                        data_loss.push(format!(
                            "wall {}: healing history of {} step(s) will be dropped",
                            wall.id,
                            solid.healing_history.len()
                        ));
                    }
                    let length = solid.baseline.length();
                    if length > 0.0 {
                        let effective = solid.area() / length;
                        if (effective - solid.thickness).abs() / solid.thickness > 0.05 {
                            data_loss.push(format!(
                                "wall {}: non-constant local thickness flattens to nominal",
                                wall.id
                            ));
                            quality_impact -= 0.05;
                        }
                    }
                }
            }
        }

        if !data_loss.is_empty() {
            actions.push("export or re-resolve junctions after switching back".to_string());
        }

        CompatibilityStatus {
            is_compatible: true,
            can_switch_to_bim: true,
            // Basic is always reachable; the listed losses are the price.
            can_switch_to_basic: true,
            potential_data_loss: data_loss,
            recommended_actions: actions,
            estimated_processing_time_ms: estimated_ms,
            quality_impact: quality_impact.max(-1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::types::{Curve, WallType};
    use crate::store::types::UnifiedWallData;

    fn wall(mode: WallMode) -> UnifiedWallData {
        let baseline = Curve::polyline(&[(0.0, 0.0), (2000.0, 0.0)], 1e-6).unwrap();
        UnifiedWallData::new(1, baseline, WallType::Zone, 250.0, mode)
    }

    #[test]
    fn basic_wall_materializes_bim_on_sync() {
        let engine = SyncEngine::new(&CoreConfig::default());
        let mut wall = wall(WallMode::Basic);
        engine
            .synchronize(&mut wall, &OperationContext::new())
            .expect("sync succeeds");
        assert!(!wall.requires_sync);
        assert!(wall.bim_valid);
        assert!(wall.basic_valid);
        let solid = wall.bim.as_ref().expect("solid materialized");
        assert!((solid.area() - 2000.0 * 250.0).abs() < 1.0);
        // Authorship is untouched by automatic sync.
        assert_eq!(wall.last_modified_mode, WallMode::Basic);
    }

    #[test]
    fn sync_is_idempotent() {
        let engine = SyncEngine::new(&CoreConfig::default());
        let mut wall = wall(WallMode::Basic);
        engine
            .synchronize(&mut wall, &OperationContext::new())
            .unwrap();
        let version = wall.version;
        let area = wall.bim.as_ref().unwrap().area();
        engine
            .synchronize(&mut wall, &OperationContext::new())
            .unwrap();
        assert_eq!(wall.version, version);
        assert_eq!(wall.bim.as_ref().unwrap().area(), area);
    }

    #[test]
    fn derive_basic_preserves_baseline_vertices_exactly() {
        let engine = SyncEngine::new(&CoreConfig::default());
        let mut wall = wall(WallMode::Basic);
        engine
            .synchronize(&mut wall, &OperationContext::new())
            .unwrap();
        let basic = wall.basic.as_ref().expect("basic materialized");
        assert_eq!(basic.nodes.len(), 2);
        assert_eq!(basic.nodes[0].point, (0.0, 0.0));
        assert_eq!(basic.nodes[1].point, (2000.0, 0.0));
        assert_eq!(basic.segments.len(), 1);
    }

    #[test]
    fn compatibility_check_lists_junction_losses() {
        let engine = SyncEngine::new(&CoreConfig::default());
        let mut wall = wall(WallMode::Basic);
        engine
            .synchronize(&mut wall, &OperationContext::new())
            .unwrap();
        wall.bim.as_mut().unwrap().intersection_ids.push(42);

        let status = CompatibilityChecker.check(&[&wall], WallMode::Basic);
        assert!(status.is_compatible);
        assert!(!status.potential_data_loss.is_empty());
        assert!(status.quality_impact < 0.0);

        let to_bim = CompatibilityChecker.check(&[&wall], WallMode::Bim);
        assert!(to_bim.potential_data_loss.is_empty());
    }
}
