// Copyright 2025 Lars Brubaker
// License: MIT
//
// Delaunay repair for HalfEdgeMesh.

use tracing::{trace, warn};

use super::{twin, EdgeIdx, HalfEdgeMesh, VertIdx, INVALID};
use crate::geom::in_circle;

impl<D: Clone> HalfEdgeMesh<D> {
    /// True when the vertex opposite `e` across its twin is not strictly
    /// inside the circumcircle of `face(e)`. Boundary edges are trivially
    /// Delaunay; co-circular quads count as Delaunay.
    pub fn is_edge_locally_delaunay(&self, e: EdgeIdx) -> bool {
        if !self.is_interior(e) {
            return true;
        }
        let en = self.next(e);
        let a = self.pos(self.org(e));
        let b = self.pos(self.org(en));
        let c = self.pos(self.org(self.next(en)));
        let d = self.pos(self.opposite_vertex(twin(e)));
        in_circle(a, b, c, d) <= 0
    }

    /// Can the flip loop touch this edge at all?
    #[inline]
    fn is_flippable(&self, e: EdgeIdx) -> bool {
        !self.edges[e].locked && self.is_interior(e)
    }

    /// Restore the Delaunay condition around `v` after it was inserted.
    /// Returns the number of flips performed.
    pub fn fix_delaunay_conditions(&mut self, v: VertIdx) -> u32 {
        if v == INVALID {
            return 0;
        }
        let mut seed = Vec::new();
        self.for_each_vertex_edge(v, |e| {
            if !self.is_boundary(e) {
                seed.push(self.next(e));
            }
        });
        self.repair_delaunay(seed)
    }

    /// Flip edges until none reachable from `seed` violates the Delaunay
    /// condition, or the configured flip cap is hit.
    pub(crate) fn repair_delaunay(&mut self, seed: Vec<EdgeIdx>) -> u32 {
        let mut stack: Vec<EdgeIdx> = Vec::with_capacity(seed.len());
        for e in seed {
            if self.is_flippable(e) && !self.edges[e].mark {
                self.edges[e].mark = true;
                self.edges[twin(e)].mark = true;
                stack.push(e);
            }
        }

        let max_flips = self.config().max_flips_per_repair;
        let mut flips = 0;

        while let Some(e) = stack.pop() {
            self.edges[e].mark = false;
            self.edges[twin(e)].mark = false;

            if !self.is_flippable(e) || self.is_edge_locally_delaunay(e) {
                continue;
            }
            if flips >= max_flips {
                warn!(flips, "delaunay repair hit its flip cap");
                break;
            }

            let neighbors = [
                self.next(e),
                self.prev(e),
                self.next(twin(e)),
                self.prev(twin(e)),
            ];
            if !self.flip_edge(e) {
                trace!(edge = e, "non-delaunay edge has a non-convex quad");
                continue;
            }
            flips += 1;
            for &nb in &neighbors {
                if !self.edges[nb].mark && self.is_flippable(nb) {
                    self.edges[nb].mark = true;
                    self.edges[twin(nb)].mark = true;
                    stack.push(nb);
                }
            }
        }

        // Leftovers after an early exit must not keep stale marks.
        for e in stack {
            self.edges[e].mark = false;
            self.edges[twin(e)].mark = false;
        }
        flips
    }
}

#[cfg(test)]
mod tests {
    use crate::config::MeshConfig;
    use crate::geom::Vec2;
    use crate::mesh::{HalfEdgeMesh, INVALID};

    // Two triangles over a thin quad, diagonal along the long axis.
    fn skinny_pair() -> HalfEdgeMesh {
        let mut mesh = HalfEdgeMesh::new(MeshConfig::default()).unwrap();
        let a = mesh.insert_vertex(Vec2::from_ints(0, 0), Default::default());
        let b = mesh.insert_vertex(Vec2::from_ints(2, -1), Default::default());
        let c = mesh.insert_vertex(Vec2::from_ints(4, 0), Default::default());
        let d = mesh.insert_vertex(Vec2::from_ints(2, 1), Default::default());
        assert_ne!(mesh.insert_face_by_verts(a, b, c, ()), INVALID);
        assert_ne!(mesh.insert_face_by_verts(a, c, d, ()), INVALID);
        mesh
    }

    #[test]
    fn long_diagonal_is_not_delaunay() {
        let mesh = skinny_pair();
        let diag = mesh.find_half_edge(0, 2);
        assert!(!mesh.is_edge_locally_delaunay(diag));
        assert!(mesh.validate_delaunay().is_err());
    }

    #[test]
    fn repair_flips_once() {
        let mut mesh = skinny_pair();
        assert_eq!(mesh.fix_delaunay_conditions(1), 1);
        assert_ne!(mesh.find_edge(1, 3), INVALID);
        assert!(mesh.validate_delaunay().is_ok());
        assert_eq!(mesh.fix_delaunay_conditions(1), 0);
    }

    #[test]
    fn locked_diagonal_is_left_alone() {
        let mut mesh = skinny_pair();
        let diag = mesh.find_half_edge(0, 2);
        mesh.set_locked(diag, true);
        assert_eq!(mesh.fix_delaunay_conditions(1), 0);
        assert!(mesh.validate_delaunay().is_ok());
    }

    #[test]
    fn cocircular_square_is_stable() {
        let mut mesh = HalfEdgeMesh::new(MeshConfig::default()).unwrap();
        let p = |x, y| Vec2::from_ints(x, y);
        mesh.insert_face(p(0, 0), p(1, 0), p(1, 1), ());
        mesh.insert_face(p(0, 0), p(1, 1), p(0, 1), ());
        assert_eq!(mesh.fix_delaunay_conditions(1), 0);
        assert_ne!(mesh.find_edge(0, 2), INVALID);
    }

    #[test]
    fn flip_cap_stops_repair_and_clears_marks() {
        let config = MeshConfig {
            max_flips_per_repair: 0,
            ..MeshConfig::default()
        };
        let mut mesh = HalfEdgeMesh::new(config).unwrap();
        let a = mesh.insert_vertex(Vec2::from_ints(0, 0), Default::default());
        let b = mesh.insert_vertex(Vec2::from_ints(2, -1), Default::default());
        let c = mesh.insert_vertex(Vec2::from_ints(4, 0), Default::default());
        let d = mesh.insert_vertex(Vec2::from_ints(2, 1), Default::default());
        mesh.insert_face_by_verts(a, b, c, ());
        mesh.insert_face_by_verts(a, c, d, ());
        assert_eq!(mesh.fix_delaunay_conditions(b), 0);
        assert!((0..mesh.half_edge_count() as u32).all(|e| !mesh.half_edge(e).mark));
    }
}
