// Copyright 2025 Lars Brubaker
// License: MIT
//
// Structural checks for HalfEdgeMesh. Used by tests and by callers that
// want to assert a mesh assembled from untrusted input is sound.

use super::{twin, HalfEdgeMesh, INVALID};
use crate::error::TopologyError;
use crate::geom::orient2d;

impl<D: Clone> HalfEdgeMesh<D> {
    /// Check every connectivity invariant the mutators maintain.
    pub fn validate(&self) -> Result<(), TopologyError> {
        for f in self.faces() {
            let e0 = self.faces[f].an_edge;
            if self.edges[e0].face != f {
                return Err(TopologyError::BadFaceAnchor(f));
            }
            let [a, b, c] = self.face_points(f);
            if orient2d(a, b, c) <= 0 {
                return Err(TopologyError::Clockwise(f));
            }
        }

        for (e, he) in self.edges.iter() {
            let t = &self.edges[twin(e)];
            if he.locked != t.locked {
                return Err(TopologyError::HalfLocked(e));
            }
            if he.face == INVALID {
                continue;
            }
            if !self.face_is_valid(he.face) {
                return Err(TopologyError::BadFaceAnchor(he.face));
            }
            let n1 = he.next;
            if n1 == INVALID {
                return Err(TopologyError::NotTriangle(e));
            }
            let n2 = self.edges[n1].next;
            if n2 == INVALID || self.edges[n2].next != e {
                return Err(TopologyError::NotTriangle(e));
            }
            if self.edges[n1].face != he.face {
                return Err(TopologyError::FaceMismatch { edge: e, next: n1 });
            }
            if t.org != self.edges[n1].org {
                return Err(TopologyError::BrokenChain { edge: e, next: n1 });
            }
        }

        for (v, vert) in self.verts.iter() {
            if vert.an_edge != INVALID && self.edges[vert.an_edge].org != v {
                return Err(TopologyError::BadVertexAnchor(v));
            }
        }
        Ok(())
    }

    /// `validate`, plus the local Delaunay condition on every unlocked
    /// interior edge.
    pub fn validate_delaunay(&self) -> Result<(), TopologyError> {
        self.validate()?;
        let n = self.edges.len() as u32;
        for e in (0..n).step_by(2) {
            if self.edges[e].locked || !self.is_interior(e) {
                continue;
            }
            if !self.is_edge_locally_delaunay(e) {
                return Err(TopologyError::NotDelaunay(e));
            }
        }
        Ok(())
    }
}
