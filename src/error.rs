// Copyright 2025 Lars Brubaker
// License: MIT
//
// Error types. Geometric failures inside the mesh and the pathfinder are
// reported through INVALID indices and search states; these types cover
// configuration, topology validation and dump I/O.

use crate::geom::Vec2;
use crate::mesh::{EdgeIdx, FaceIdx, VertIdx};

/// Rejected mesh or pathfinder configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("capacity `{name}` must be at least {min}")]
    CapacityTooSmall { name: &'static str, min: u32 },
    #[error("capacity `{name}` = {value} collides with the INVALID index")]
    CapacityTooLarge { name: &'static str, value: u32 },
    #[error("half-edge capacity must be even, got {0}")]
    OddHalfEdgeCapacity(u32),
    #[error("threshold `{0}` must not be negative")]
    NegativeThreshold(&'static str),
}

/// A broken mesh invariant found by `HalfEdgeMesh::validate`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TopologyError {
    #[error("half-edge {0}: next cycle does not close after three steps")]
    NotTriangle(EdgeIdx),
    #[error("half-edge {edge}: next {next} belongs to a different face")]
    FaceMismatch { edge: EdgeIdx, next: EdgeIdx },
    #[error("half-edge {edge}: head does not match tail of next {next}")]
    BrokenChain { edge: EdgeIdx, next: EdgeIdx },
    #[error("face {0}: anchor half-edge does not point back to it")]
    BadFaceAnchor(FaceIdx),
    #[error("vertex {0}: anchor half-edge does not start at it")]
    BadVertexAnchor(VertIdx),
    #[error("half-edge {0} is locked but its twin is not")]
    HalfLocked(EdgeIdx),
    #[error("face {0} is not counter-clockwise")]
    Clockwise(FaceIdx),
    #[error("edge {0} violates the Delaunay condition")]
    NotDelaunay(EdgeIdx),
}

/// Failure while reading or writing a point/line dump.
#[derive(Debug, thiserror::Error)]
pub enum DumpError {
    #[error("dump truncated: needed {needed} more bytes")]
    Truncated { needed: usize },
    #[error("dump has {0} trailing bytes")]
    TrailingBytes(usize),
    #[error("dump holds {count} {what}, more than a u32 count can describe")]
    TooManyRecords { what: &'static str, count: usize },
    #[error("dump has no points or lines")]
    Empty,
    #[error("dump spans {lo:?}..{hi:?}, outside the supported coordinate range")]
    OutOfRange { lo: Vec2, hi: Vec2 },
    #[error("dump bounds {lo:?}..{hi:?} do not enclose an area")]
    Degenerate { lo: Vec2, hi: Vec2 },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Any error surfaced by the crate; returned by `Dump::build_mesh`, which
/// can fail on configuration, input or validation.
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Topology(#[from] TopologyError),
    #[error(transparent)]
    Dump(#[from] DumpError),
}
