// Copyright 2025 Lars Brubaker
// License: MIT
//
// Point location, nearest-vertex and edge lookup, and per-element measures.

use super::{twin, EdgeIdx, FaceIdx, HalfEdgeMesh, VertIdx, INVALID};
use crate::geom::{dist_sq_wide, dot_wide, orient2d, Real, Vec2, Wide, FRAC_BITS};

/// Where a point falls relative to a triangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointInFace {
    Inside,
    /// Within the edge threshold of this half-edge of the face.
    OnEdge(EdgeIdx),
    Outside,
}

impl<D: Clone> HalfEdgeMesh<D> {
    /// Classify `p` against face `f`. A point whose distance to a side is at
    /// most `threshold` (and which projects onto that side) is `OnEdge`.
    pub fn is_point_in_face(&self, f: FaceIdx, p: Vec2, threshold: Real) -> PointInFace {
        if !self.face_is_valid(f) {
            return PointInFace::Outside;
        }
        let thr = threshold.raw() as Wide;
        let thr_sq = thr.saturating_mul(thr);
        let mut near = INVALID;
        let mut all_positive = true;
        for e in self.face_edges(f) {
            let s = self.pos(self.org(e));
            let t = self.pos(self.dst(e));
            let o = orient2d(s, t, p);
            let len_sq = dist_sq_wide(s, t);
            // |o| / |st| <= thr, squared on both sides
            let in_band = o.saturating_mul(o) <= thr_sq.saturating_mul(len_sq);
            let along = dot_wide(s, t, p);
            let on_side = in_band && along >= 0 && along <= len_sq;
            if o < 0 && !in_band {
                return PointInFace::Outside;
            }
            if on_side && near == INVALID {
                near = e;
            }
            if o <= 0 {
                all_positive = false;
            }
        }
        if near != INVALID {
            PointInFace::OnEdge(near)
        } else if all_positive {
            PointInFace::Inside
        } else {
            PointInFace::Outside
        }
    }

    /// First live face (in index order) that contains `p` or has it on an
    /// edge, using the configured edge threshold.
    pub fn locate_point(&self, p: Vec2) -> Option<(FaceIdx, PointInFace)> {
        let threshold = self.config().edge_threshold;
        self.faces().find_map(|f| match self.is_point_in_face(f, p, threshold) {
            PointInFace::Outside => None,
            hit => Some((f, hit)),
        })
    }

    /// Face containing `p`, or INVALID.
    pub fn find_face_containing_point(&self, p: Vec2) -> FaceIdx {
        self.locate_point(p).map_or(INVALID, |(f, _)| f)
    }

    /// Nearest vertex to `p`; ties go to the lower index.
    pub fn find_closest_vertex(&self, p: Vec2) -> VertIdx {
        let mut best = INVALID;
        let mut best_d = Wide::MAX;
        for (v, vert) in self.verts.iter() {
            let d = dist_sq_wide(vert.pos, p);
            if d < best_d {
                best_d = d;
                best = v;
            }
        }
        best
    }

    /// Every vertex within `radius` of `p`, nearest first.
    pub fn find_closest_vertices(&self, p: Vec2, radius: Real) -> Vec<VertIdx> {
        let mut hits: Vec<(Wide, VertIdx)> = self
            .verts
            .iter()
            .filter(|(_, vert)| vert.pos.within(p, radius))
            .map(|(v, vert)| (dist_sq_wide(vert.pos, p), v))
            .collect();
        hits.sort_unstable();
        hits.into_iter().map(|(_, v)| v).collect()
    }

    /// The half-edge `v0 -> v1`, or INVALID. Linear in the edge count.
    pub fn find_half_edge(&self, v0: VertIdx, v1: VertIdx) -> EdgeIdx {
        let n = self.edges.len() as u32;
        let mut e = 0;
        while e + 1 < n {
            let a = self.edges[e].org;
            let b = self.edges[e + 1].org;
            if a == v0 && b == v1 {
                return e;
            }
            if a == v1 && b == v0 {
                return e + 1;
            }
            e += 2;
        }
        INVALID
    }

    /// The half-edge between the vertices welded at `p0` and `p1`.
    pub fn find_half_edge_at(&self, p0: Vec2, p1: Vec2) -> EdgeIdx {
        let weld = self.config().weld_threshold;
        let v0 = self.find_closest_vertex(p0);
        let v1 = self.find_closest_vertex(p1);
        if v0 == INVALID || v1 == INVALID {
            return INVALID;
        }
        if !self.pos(v0).within(p0, weld) || !self.pos(v1).within(p1, weld) {
            return INVALID;
        }
        self.find_half_edge(v0, v1)
    }

    /// Undirected lookup: the even half of the pair joining `v0` and `v1`.
    pub fn find_edge(&self, v0: VertIdx, v1: VertIdx) -> EdgeIdx {
        let e = self.find_half_edge(v0, v1);
        if e == INVALID {
            INVALID
        } else {
            e & !1
        }
    }

    /// Vertex of `face(e)` that is not on `e`.
    pub fn opposite_vertex(&self, e: EdgeIdx) -> VertIdx {
        if self.is_boundary(e) {
            return INVALID;
        }
        self.org(self.prev(e))
    }

    pub fn edge_length(&self, e: EdgeIdx) -> Real {
        self.pos(self.org(e)).distance(self.pos(self.dst(e)))
    }

    pub fn edge_center(&self, e: EdgeIdx) -> Vec2 {
        self.pos(self.org(e)).midpoint(self.pos(self.org(twin(e))))
    }

    /// Unsigned area of a face.
    pub fn face_area(&self, f: FaceIdx) -> Real {
        let [a, b, c] = self.face_points(f);
        let twice = orient2d(a, b, c).abs();
        Real::from_raw(((twice / 2) >> FRAC_BITS) as i64)
    }

    pub fn face_centroid(&self, f: FaceIdx) -> Vec2 {
        let [a, b, c] = self.face_points(f);
        let three = Real::from_int(3);
        Vec2::new((a.x + b.x + c.x) / three, (a.y + b.y + c.y) / three)
    }
}
