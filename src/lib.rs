// cdt-nav: deterministic navigation meshes on a fixed-point constrained
// Delaunay triangulation
// Copyright 2025 Lars Brubaker
// License: MIT

pub mod arena;
pub mod config;
pub mod dump;
pub mod error;
pub mod funnel;
pub mod geom;
pub mod mesh;
pub mod pathfinder;
pub mod priorityq;

pub use config::{MeshConfig, PathfinderConfig};
pub use dump::{Dump, DumpMesh};
pub use error::{ConfigError, DumpError, NavError, TopologyError};
pub use funnel::{Corner, FunnelStep, PathFunnel, Side};
pub use geom::{Line, Real, Vec2};
pub use mesh::{EdgeIdx, FaceIdx, HalfEdgeMesh, PointInFace, VertIdx, INVALID};
pub use pathfinder::{NavPathfinder, SearchState, StepResult};
