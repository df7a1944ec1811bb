//! store/persistence.rs - Versioned Project Documents
//!
//! A project serializes to a single JSON document: wall records plus the
//! intersection side table keyed by record id. The document carries a
//! schema version; older versions are accepted and upgraded on load so a
//! file written by a previous build opens cleanly.

use std::collections::HashMap;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::geometry::types::{Curve, IntersectionRecord, JoinType, Polygon, WallSolid, WallType};
use crate::store::types::{UnifiedWallData, WallMode};

/// Schema version written by this build
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// One persisted wall
///
/// Version 1 documents predate the dual-representation flags; their
/// fields default on load and the wall is marked as needing sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WallRecord {
    pub id: u64,
    pub wall_type: WallType,
    pub thickness: f64,
    pub visible: bool,
    pub baseline: Curve,
    #[serde(default)]
    pub preferred_join: Option<JoinType>,
    #[serde(default)]
    pub tolerance_override: Option<f64>,
    #[serde(default)]
    pub basic_polygons: Vec<Polygon>,
    #[serde(default)]
    pub bim_solid: Option<WallSolid>,
    #[serde(default)]
    pub basic_valid: bool,
    #[serde(default)]
    pub bim_valid: bool,
    #[serde(default = "default_true")]
    pub requires_sync: bool,
    #[serde(default = "default_mode")]
    pub last_modified_mode: WallMode,
    #[serde(default)]
    pub created_at_ms: u64,
    #[serde(default)]
    pub updated_at_ms: u64,
    #[serde(default = "default_version")]
    pub version: u64,
}

fn default_true() -> bool {
    true
}

fn default_mode() -> WallMode {
    WallMode::Basic
}

fn default_version() -> u64 {
    1
}

/// The persisted project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDocument {
    pub schema_version: u32,
    pub walls: Vec<WallRecord>,
    /// Intersection side table, keyed by record id
    #[serde(default)]
    pub intersections: HashMap<u64, IntersectionRecord>,
}

impl ProjectDocument {
    /// Snapshot live store state into a document
    pub fn from_state(
        walls: &HashMap<u64, UnifiedWallData>,
        intersections: &HashMap<u64, IntersectionRecord>,
    ) -> Self {
        let mut records: Vec<WallRecord> = walls
            .values()
            .map(|wall| WallRecord {
                id: wall.id,
                wall_type: wall.wall_type,
                thickness: wall.thickness,
                visible: wall.visible,
                baseline: wall.baseline.clone(),
                preferred_join: Some(wall.preferred_join),
                tolerance_override: wall.tolerance_override,
                basic_polygons: wall
                    .basic
                    .as_ref()
                    .map(|b| b.polygons.clone())
                    .unwrap_or_default(),
                bim_solid: wall.bim.clone(),
                basic_valid: wall.basic_valid,
                bim_valid: wall.bim_valid,
                requires_sync: wall.requires_sync,
                last_modified_mode: wall.last_modified_mode,
                created_at_ms: wall.created_at_ms,
                updated_at_ms: wall.updated_at_ms,
                version: wall.version,
            })
            .collect();
        records.sort_by_key(|r| r.id);
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            walls: records,
            intersections: intersections.clone(),
        }
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> StoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a document, upgrading older schema versions in place
    pub fn from_json(json: &str) -> StoreResult<Self> {
        let mut document: ProjectDocument = serde_json::from_str(json)?;
        if document.schema_version > CURRENT_SCHEMA_VERSION {
            return Err(StoreError::UnsupportedSchema {
                found: document.schema_version,
                supported: CURRENT_SCHEMA_VERSION,
            });
        }
        if document.schema_version < CURRENT_SCHEMA_VERSION {
            info!(
                "upgrading project document from schema {} to {}",
                document.schema_version, CURRENT_SCHEMA_VERSION
            );
            document.upgrade();
        }
        Ok(document)
    }

    /// Bring a v1 document up to the current schema
    ///
    /// Version 1 predates the dual-representation flags: every wall is
    /// treated as basic-authoritative and queued for synchronization.
    fn upgrade(&mut self) {
        for wall in &mut self.walls {
            wall.requires_sync = true;
            if !wall.basic_valid && !wall.bim_valid {
                wall.basic_valid = true;
                wall.last_modified_mode = WallMode::Basic;
            }
        }
        self.schema_version = CURRENT_SCHEMA_VERSION;
    }

    /// Rebuild live wall state from this document
    pub fn into_state(
        self,
    ) -> (
        HashMap<u64, UnifiedWallData>,
        HashMap<u64, IntersectionRecord>,
    ) {
        let walls = self
            .walls
            .into_iter()
            .map(|record| {
                let basic = if record.basic_polygons.is_empty() && record.bim_solid.is_none() {
                    None
                } else {
                    Some(crate::store::types::BasicGeometry {
                        segments: Vec::new(),
                        nodes: Vec::new(),
                        polygons: record.basic_polygons,
                    })
                };
                let wall = UnifiedWallData {
                    id: record.id,
                    wall_type: record.wall_type,
                    thickness: record.thickness,
                    visible: record.visible,
                    baseline: record.baseline,
                    preferred_join: record.preferred_join.unwrap_or(JoinType::Miter),
                    tolerance_override: record.tolerance_override,
                    basic,
                    bim: record.bim_solid,
                    basic_valid: record.basic_valid,
                    bim_valid: record.bim_valid,
                    requires_sync: record.requires_sync,
                    last_modified_mode: record.last_modified_mode,
                    created_at_ms: record.created_at_ms,
                    updated_at_ms: record.updated_at_ms,
                    version: record.version,
                };
                (wall.id, wall)
            })
            .collect();
        (walls, self.intersections)
    }
}
