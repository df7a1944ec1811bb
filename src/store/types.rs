//! store/types.rs - Unified Wall Data Model
//!
//! Each wall lives in two representations at once: a lightweight "basic"
//! view (segments, nodes, outline polygons) that the sketching tools
//! edit, and a full BIM wall solid. The two are kept in lock-step by the
//! sync engine; the flags here record which side is authoritative and
//! whether a re-derivation is pending.

use serde::{Deserialize, Serialize};

use crate::geometry::types::{now_millis, Curve, JoinType, Point2D, Polygon, WallSolid, WallType};

/// Which representation an operation addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WallMode {
    Basic,
    Bim,
}

/// A straight edge of the basic representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicSegment {
    pub id: u64,
    pub start: Point2D,
    pub end: Point2D,
}

/// A connection point of the basic representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicNode {
    pub id: u64,
    pub point: Point2D,
    /// Ids of the segments meeting at this node
    pub segments: Vec<u64>,
}

/// The basic (sketch) view of a wall
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicGeometry {
    pub segments: Vec<BasicSegment>,
    pub nodes: Vec<BasicNode>,
    /// Outline polygons approximating the wall band
    pub polygons: Vec<Polygon>,
}

/// A wall held in both representations
///
/// Every mutation bumps `version`, marks the mutated mode valid, and
/// raises `requires_sync`; the sync engine consumes the flag and
/// re-derives the other side. `last_modified_mode` records authorship:
/// automatic synchronization never changes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnifiedWallData {
    pub id: u64,
    pub wall_type: WallType,
    pub thickness: f64,
    pub visible: bool,
    pub baseline: Curve,
    /// Join requested for this wall's junctions and offset corners
    pub preferred_join: JoinType,
    /// Per-wall tolerance override; `None` uses the adaptive manager
    pub tolerance_override: Option<f64>,
    pub basic: Option<BasicGeometry>,
    pub bim: Option<WallSolid>,
    pub basic_valid: bool,
    pub bim_valid: bool,
    pub requires_sync: bool,
    pub last_modified_mode: WallMode,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
    pub version: u64,
}

impl UnifiedWallData {
    /// A freshly created wall, authoritative in `mode`, pending sync
    pub fn new(
        id: u64,
        baseline: Curve,
        wall_type: WallType,
        thickness: f64,
        mode: WallMode,
    ) -> Self {
        let now = now_millis();
        Self {
            id,
            wall_type,
            thickness,
            visible: true,
            baseline,
            preferred_join: JoinType::Miter,
            tolerance_override: None,
            basic: None,
            bim: None,
            basic_valid: mode == WallMode::Basic,
            bim_valid: mode == WallMode::Bim,
            requires_sync: true,
            last_modified_mode: mode,
            created_at_ms: now,
            updated_at_ms: now,
            version: 1,
        }
    }

    /// Record a mutation made in `mode`
    pub fn touch(&mut self, mode: WallMode) {
        self.version += 1;
        self.updated_at_ms = now_millis();
        self.last_modified_mode = mode;
        match mode {
            WallMode::Basic => {
                self.basic_valid = true;
                self.bim_valid = false;
            }
            WallMode::Bim => {
                self.bim_valid = true;
                self.basic_valid = false;
            }
        }
        self.requires_sync = true;
    }

    /// Intersection records this wall participates in
    pub fn intersection_ids(&self) -> &[u64] {
        self.bim
            .as_ref()
            .map(|solid| solid.intersection_ids.as_slice())
            .unwrap_or(&[])
    }
}

/// Outcome of a mode switch over a wall set
#[derive(Debug, Clone)]
pub struct ModeSwitchResult {
    pub success: bool,
    pub converted_ids: Vec<u64>,
    pub failed_ids: Vec<u64>,
    pub warnings: Vec<String>,
    /// False when the switch dropped data (e.g. intersection records)
    pub preserved_data: bool,
    pub processing_time_ms: f64,
    /// Expected quality change in [-1, 1]; negative means degradation
    pub quality_impact: f64,
    /// Approximations the conversion had to take, for the caller to vet
    pub approximations_used: Vec<String>,
}

/// Outcome of a compatibility check ahead of a mode switch
#[derive(Debug, Clone)]
pub struct CompatibilityStatus {
    pub is_compatible: bool,
    pub can_switch_to_bim: bool,
    pub can_switch_to_basic: bool,
    /// What a lossy switch would drop, enumerated explicitly
    pub potential_data_loss: Vec<String>,
    pub recommended_actions: Vec<String>,
    pub estimated_processing_time_ms: f64,
    pub quality_impact: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::types::CurveKind;
    use crate::geometry::types::Point;

    fn baseline() -> Curve {
        Curve::new(
            CurveKind::Polyline,
            vec![Point::new(0.0, 0.0), Point::new(1000.0, 0.0)],
            1e-6,
        )
        .unwrap()
    }

    #[test]
    fn new_wall_starts_pending_sync() {
        let wall = UnifiedWallData::new(1, baseline(), WallType::Zone, 250.0, WallMode::Basic);
        assert!(wall.requires_sync);
        assert!(wall.basic_valid);
        assert!(!wall.bim_valid);
        assert_eq!(wall.version, 1);
        assert_eq!(wall.last_modified_mode, WallMode::Basic);
    }

    #[test]
    fn touch_flips_validity_and_bumps_version() {
        let mut wall = UnifiedWallData::new(1, baseline(), WallType::Zone, 250.0, WallMode::Basic);
        wall.requires_sync = false;
        wall.touch(WallMode::Bim);
        assert_eq!(wall.version, 2);
        assert!(wall.bim_valid);
        assert!(!wall.basic_valid);
        assert!(wall.requires_sync);
        assert_eq!(wall.last_modified_mode, WallMode::Bim);
    }
}
