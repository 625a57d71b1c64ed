// Copyright 2025 Lars Brubaker
// License: MIT
//
// Construction-time settings for the mesh and the pathfinder.

use serde::{Deserialize, Serialize};

use crate::arena::INVALID;
use crate::error::ConfigError;
use crate::geom::Real;

/// Default vertex arena size.
pub const DEFAULT_MAX_VERTICES: u32 = 4096;

/// Default face arena size.
pub const DEFAULT_MAX_FACES: u32 = 8192;

/// Default half-edge arena size (always even: half-edges come in pairs).
pub const DEFAULT_MAX_HALF_EDGES: u32 = 24576;

/// Default flip budget for one Delaunay repair pass.
pub const DEFAULT_MAX_FLIPS: u32 = 1 << 16;

/// Arena capacities and snapping tolerances for a `HalfEdgeMesh`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    pub max_vertices: u32,
    pub max_faces: u32,
    pub max_half_edges: u32,
    /// Insertions closer than this to an existing vertex reuse it.
    pub weld_threshold: Real,
    /// Points closer than this to a face edge are classified as on the edge.
    pub edge_threshold: Real,
    /// Upper bound on flips performed by a single repair pass.
    pub max_flips_per_repair: u32,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            max_vertices: DEFAULT_MAX_VERTICES,
            max_faces: DEFAULT_MAX_FACES,
            max_half_edges: DEFAULT_MAX_HALF_EDGES,
            weld_threshold: Real::from_raw(64), // ~0.001 units
            edge_threshold: Real::from_raw(64),
            max_flips_per_repair: DEFAULT_MAX_FLIPS,
        }
    }
}

impl MeshConfig {
    /// Config sized for roughly `vertices` points: a planar triangulation has
    /// fewer than 2V faces and 3V edges.
    pub fn with_vertex_capacity(vertices: u32) -> Self {
        let vertices = vertices.max(4);
        Self {
            max_vertices: vertices,
            max_faces: vertices.saturating_mul(2),
            max_half_edges: vertices.saturating_mul(6).min(INVALID - 1) & !1,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_capacity("max_vertices", self.max_vertices, 3)?;
        check_capacity("max_faces", self.max_faces, 1)?;
        check_capacity("max_half_edges", self.max_half_edges, 6)?;
        if self.max_half_edges % 2 != 0 {
            return Err(ConfigError::OddHalfEdgeCapacity(self.max_half_edges));
        }
        if self.weld_threshold.is_negative() {
            return Err(ConfigError::NegativeThreshold("weld_threshold"));
        }
        if self.edge_threshold.is_negative() {
            return Err(ConfigError::NegativeThreshold("edge_threshold"));
        }
        Ok(())
    }
}

fn check_capacity(name: &'static str, value: u32, min: u32) -> Result<(), ConfigError> {
    if value < min {
        return Err(ConfigError::CapacityTooSmall { name, min });
    }
    // INVALID must never be a live index
    if value >= INVALID {
        return Err(ConfigError::CapacityTooLarge { name, value });
    }
    Ok(())
}

/// Search settings for a `NavPathfinder`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathfinderConfig {
    /// A portal is discarded when `length * portal_width_factor` is below the
    /// agent radius.
    pub portal_width_factor: Real,
    /// Stop with `Failed` after this many expansions; 0 means unbounded.
    pub max_expansions: u32,
}

impl Default for PathfinderConfig {
    fn default() -> Self {
        Self {
            portal_width_factor: Real::ONE,
            max_expansions: 0,
        }
    }
}

impl PathfinderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.portal_width_factor.is_negative() {
            return Err(ConfigError::NegativeThreshold("portal_width_factor"));
        }
        Ok(())
    }
}
