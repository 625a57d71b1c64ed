// Copyright 2025 Lars Brubaker
// License: MIT
//
// Arena-backed half-edge mesh of CCW triangles.
//
// Design:
//   - INVALID: u32::MAX  (the "none" index)
//   - Half-edges are allocated in pairs: edges[i] and edges[i^1] are always
//     twins.  twin(e) = e ^ 1.
//   - A half-edge with face == INVALID lies on the mesh boundary; its `next`
//     is INVALID as well.
//   - Faces are never freed; a removed face keeps its slot with
//     an_edge == INVALID.
//   - `locked` is a property of the edge: both halves always agree.

mod cdt;
mod delaunay;
mod query;
mod validate;

pub use query::PointInFace;

use tracing::{trace, warn};

use crate::arena::Arena;
pub use crate::arena::INVALID;
use crate::config::MeshConfig;
use crate::error::ConfigError;
use crate::geom::{orient2d, Real, Vec2};

/// Index into the vertex arena
pub type VertIdx = u32;
/// Index into the face arena
pub type FaceIdx = u32;
/// Index into the half-edge arena
pub type EdgeIdx = u32;

/// The other half of the pair.
#[inline(always)]
pub fn twin(e: EdgeIdx) -> EdgeIdx {
    e ^ 1
}

#[derive(Clone, Debug)]
pub struct Vertex {
    pub pos: Vec2,
    /// Some outgoing half-edge, preferably one that bounds a face.
    pub an_edge: EdgeIdx,
}

#[derive(Clone, Debug)]
pub struct HalfEdge {
    /// Tail vertex; the head is `org` of the twin.
    pub org: VertIdx,
    /// Next half-edge CCW around `face`.
    pub next: EdgeIdx,
    pub face: FaceIdx,
    /// Constraint: never flipped, never crossed by a path.
    pub locked: bool,
    /// Scratch flag used by Delaunay repair.
    pub mark: bool,
}

impl Default for HalfEdge {
    fn default() -> Self {
        Self {
            org: INVALID,
            next: INVALID,
            face: INVALID,
            locked: false,
            mark: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Face<D> {
    pub an_edge: EdgeIdx,
    pub data: D,
}

impl<D> Face<D> {
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.an_edge != INVALID
    }
}

/// The navigation mesh.
#[derive(Clone, Debug)]
pub struct HalfEdgeMesh<D = ()> {
    config: MeshConfig,
    pub(crate) verts: Arena<Vertex>,
    pub(crate) edges: Arena<HalfEdge>,
    pub(crate) faces: Arena<Face<D>>,
    live_faces: u32,
}

impl<D: Clone> HalfEdgeMesh<D> {
    pub fn new(config: MeshConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            verts: Arena::new(config.max_vertices as usize),
            edges: Arena::new(config.max_half_edges as usize),
            faces: Arena::new(config.max_faces as usize),
            live_faces: 0,
            config,
        })
    }

    pub fn config(&self) -> &MeshConfig {
        &self.config
    }

    /// Drop all vertices, edges and faces. Every previously returned index
    /// becomes meaningless.
    pub fn reset(&mut self) {
        self.verts.clear();
        self.edges.clear();
        self.faces.clear();
        self.live_faces = 0;
    }

    // ─────────────────────────────── Counts ──────────────────────────────────

    pub fn vertex_count(&self) -> usize {
        self.verts.len()
    }

    pub fn half_edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len() / 2
    }

    /// Number of live (not removed) faces.
    pub fn face_count(&self) -> usize {
        self.live_faces as usize
    }

    /// Number of face slots, including removed faces.
    pub fn face_slots(&self) -> usize {
        self.faces.len()
    }

    pub fn half_edge_capacity(&self) -> usize {
        self.edges.capacity()
    }

    // ───────────────────────────── Accessors ─────────────────────────────────

    #[inline]
    pub fn vertex(&self, v: VertIdx) -> &Vertex {
        &self.verts[v]
    }

    #[inline]
    pub fn pos(&self, v: VertIdx) -> Vec2 {
        self.verts[v].pos
    }

    #[inline]
    pub fn half_edge(&self, e: EdgeIdx) -> &HalfEdge {
        &self.edges[e]
    }

    #[inline]
    pub fn face(&self, f: FaceIdx) -> &Face<D> {
        &self.faces[f]
    }

    pub fn face_data_mut(&mut self, f: FaceIdx) -> &mut D {
        &mut self.faces[f].data
    }

    #[inline]
    pub fn face_is_valid(&self, f: FaceIdx) -> bool {
        f != INVALID && self.faces.get(f).is_some_and(Face::is_valid)
    }

    #[inline]
    pub fn org(&self, e: EdgeIdx) -> VertIdx {
        self.edges[e].org
    }

    #[inline]
    pub fn dst(&self, e: EdgeIdx) -> VertIdx {
        self.edges[twin(e)].org
    }

    #[inline]
    pub fn next(&self, e: EdgeIdx) -> EdgeIdx {
        self.edges[e].next
    }

    /// Previous half-edge around the face (faces are triangles).
    #[inline]
    pub fn prev(&self, e: EdgeIdx) -> EdgeIdx {
        let n = self.edges[e].next;
        self.edges[n].next
    }

    #[inline]
    pub fn edge_face(&self, e: EdgeIdx) -> FaceIdx {
        self.edges[e].face
    }

    #[inline]
    pub fn is_locked(&self, e: EdgeIdx) -> bool {
        self.edges[e].locked
    }

    /// True when `e` has no face on its left.
    #[inline]
    pub fn is_boundary(&self, e: EdgeIdx) -> bool {
        self.edges[e].face == INVALID
    }

    /// True when the edge has a face on both sides.
    #[inline]
    pub fn is_interior(&self, e: EdgeIdx) -> bool {
        self.edges[e].face != INVALID && self.edges[twin(e)].face != INVALID
    }

    /// Lock or unlock both halves of an edge.
    pub fn set_locked(&mut self, e: EdgeIdx, locked: bool) {
        self.edges[e].locked = locked;
        self.edges[twin(e)].locked = locked;
    }

    // ──────────────────────────── Traversal ──────────────────────────────────

    /// Outgoing half-edge after `e` rotating CCW around its tail.
    #[inline]
    fn rotate_ccw(&self, e: EdgeIdx) -> EdgeIdx {
        if self.edges[e].face == INVALID {
            return INVALID;
        }
        twin(self.prev(e))
    }

    /// Outgoing half-edge after `e` rotating CW around its tail.
    #[inline]
    fn rotate_cw(&self, e: EdgeIdx) -> EdgeIdx {
        let t = twin(e);
        if self.edges[t].face == INVALID {
            return INVALID;
        }
        self.edges[t].next
    }

    /// Visit every outgoing half-edge of `v`: first CCW from its anchor, then,
    /// if the fan is open, CW from the anchor to cover the rest.
    pub fn for_each_vertex_edge(&self, v: VertIdx, mut f: impl FnMut(EdgeIdx)) {
        let start = self.verts[v].an_edge;
        if start == INVALID {
            return;
        }
        let limit = self.edges.len();
        let mut e = start;
        let mut steps = 0;
        loop {
            f(e);
            let n = self.rotate_ccw(e);
            steps += 1;
            if n == start {
                return;
            }
            if n == INVALID || steps > limit {
                break;
            }
            e = n;
        }
        let mut e = self.rotate_cw(start);
        while e != INVALID && e != start && steps <= limit {
            f(e);
            e = self.rotate_cw(e);
            steps += 1;
        }
    }

    pub fn vertex_edges(&self, v: VertIdx) -> Vec<EdgeIdx> {
        let mut out = Vec::new();
        self.for_each_vertex_edge(v, |e| out.push(e));
        out
    }

    /// Visit the three half-edges of a face in CCW order.
    pub fn for_each_face_edge(&self, f: FaceIdx, mut visit: impl FnMut(EdgeIdx)) {
        let e0 = self.faces[f].an_edge;
        if e0 == INVALID {
            return;
        }
        let e1 = self.edges[e0].next;
        let e2 = self.edges[e1].next;
        visit(e0);
        visit(e1);
        visit(e2);
    }

    /// Visit each neighbor across the face's edges as `(shared half-edge, neighbor)`.
    pub fn for_each_face_neighbor(&self, f: FaceIdx, mut visit: impl FnMut(EdgeIdx, FaceIdx)) {
        self.for_each_face_edge(f, |e| {
            let nf = self.edges[twin(e)].face;
            if nf != INVALID {
                visit(e, nf);
            }
        });
    }

    pub fn face_edges(&self, f: FaceIdx) -> [EdgeIdx; 3] {
        let e0 = self.faces[f].an_edge;
        let e1 = self.edges[e0].next;
        let e2 = self.edges[e1].next;
        [e0, e1, e2]
    }

    pub fn face_vertices(&self, f: FaceIdx) -> [VertIdx; 3] {
        let [e0, e1, e2] = self.face_edges(f);
        [self.org(e0), self.org(e1), self.org(e2)]
    }

    pub fn face_points(&self, f: FaceIdx) -> [Vec2; 3] {
        let [a, b, c] = self.face_vertices(f);
        [self.pos(a), self.pos(b), self.pos(c)]
    }

    /// Indices of all live faces in ascending order.
    pub fn faces(&self) -> impl Iterator<Item = FaceIdx> + '_ {
        self.faces
            .iter()
            .filter(|(_, face)| face.is_valid())
            .map(|(i, _)| i)
    }

    // ──────────────────────── Private allocation helpers ─────────────────────

    /// Logs and returns false when a mutation would overflow any arena.
    fn has_room(&self, verts: usize, pairs: usize, faces: usize) -> bool {
        let ok = self.verts.remaining() >= verts
            && self.edges.remaining() >= pairs * 2
            && self.faces.remaining() >= faces;
        if !ok {
            warn!(
                verts = self.verts.len(),
                half_edges = self.edges.len(),
                faces = self.faces.len(),
                "mesh arena capacity exhausted"
            );
        }
        ok
    }

    /// Allocate a faceless pair; returns `org -> dst`, its twin is `dst -> org`.
    /// Capacity must have been checked.
    fn make_edge_pair(&mut self, org: VertIdx, dst: VertIdx) -> EdgeIdx {
        let e = self.edges.alloc(HalfEdge {
            org,
            ..HalfEdge::default()
        });
        let t = self.edges.alloc(HalfEdge {
            org: dst,
            ..HalfEdge::default()
        });
        debug_assert!(e != INVALID && t == twin(e));
        e
    }

    /// Close three half-edges into a triangle owned by `f`.
    fn link_face(&mut self, f: FaceIdx, [e0, e1, e2]: [EdgeIdx; 3]) {
        self.edges[e0].next = e1;
        self.edges[e1].next = e2;
        self.edges[e2].next = e0;
        self.edges[e0].face = f;
        self.edges[e1].face = f;
        self.edges[e2].face = f;
        self.faces[f].an_edge = e0;
    }

    fn alloc_face(&mut self, data: D) -> FaceIdx {
        let f = self.faces.alloc(Face {
            an_edge: INVALID,
            data,
        });
        if f != INVALID {
            self.live_faces += 1;
        }
        f
    }

    /// Reanchor `v` on an outgoing half-edge that still has a face, if any.
    fn refresh_anchor(&mut self, v: VertIdx) {
        let cur = self.verts[v].an_edge;
        if cur == INVALID || self.edges[cur].face != INVALID {
            return;
        }
        let mut best = INVALID;
        self.for_each_vertex_edge(v, |e| {
            if best == INVALID && self.edges[e].face != INVALID {
                best = e;
            }
        });
        if best != INVALID {
            self.verts[v].an_edge = best;
        }
    }

    // ────────────────────────────── Insertion ────────────────────────────────

    /// Return a vertex within `threshold` of `point`, creating one if none is
    /// close enough. Never touches topology.
    pub fn insert_vertex(&mut self, point: Vec2, threshold: Real) -> VertIdx {
        if !point.in_range() {
            warn!(?point, "vertex outside the supported coordinate range");
            return INVALID;
        }
        let near = self.find_closest_vertex(point);
        if near != INVALID && self.verts[near].pos.within(point, threshold) {
            return near;
        }
        let v = self.verts.alloc(Vertex {
            pos: point,
            an_edge: INVALID,
        });
        if v == INVALID {
            warn!(count = self.verts.len(), "vertex arena full");
        }
        v
    }

    /// Add the triangle (a, b, c), welding its corners onto existing vertices.
    pub fn insert_face(&mut self, a: Vec2, b: Vec2, c: Vec2, data: D) -> FaceIdx {
        let weld = self.config.weld_threshold;
        let v0 = self.insert_vertex(a, weld);
        let v1 = self.insert_vertex(b, weld);
        let v2 = self.insert_vertex(c, weld);
        self.insert_face_by_verts(v0, v1, v2, data)
    }

    /// Add the triangle over three existing vertices. The winding is made CCW.
    /// Sides that already exist as faceless half-edges are reused. Returns
    /// INVALID for degenerate or non-manifold requests and when full.
    pub fn insert_face_by_verts(&mut self, v0: VertIdx, mut v1: VertIdx, mut v2: VertIdx, data: D) -> FaceIdx {
        if v0 == INVALID || v1 == INVALID || v2 == INVALID || v0 == v1 || v1 == v2 || v0 == v2 {
            return INVALID;
        }
        let o = orient2d(self.pos(v0), self.pos(v1), self.pos(v2));
        if o == 0 {
            return INVALID;
        }
        if o < 0 {
            core::mem::swap(&mut v1, &mut v2);
        }

        let corners = [v0, v1, v2];
        let mut sides = [INVALID; 3];
        let mut new_pairs = 0;
        for i in 0..3 {
            let (from, to) = (corners[i], corners[(i + 1) % 3]);
            let e = self.find_half_edge(from, to);
            if e == INVALID {
                new_pairs += 1;
            } else if self.edges[e].face != INVALID {
                trace!(from, to, "side already bounds a face");
                return INVALID;
            }
            sides[i] = e;
        }
        if !self.has_room(0, new_pairs, 1) {
            return INVALID;
        }

        let f = self.alloc_face(data);
        for i in 0..3 {
            if sides[i] == INVALID {
                sides[i] = self.make_edge_pair(corners[i], corners[(i + 1) % 3]);
            }
        }
        self.link_face(f, sides);
        for i in 0..3 {
            let v = corners[i];
            let anchor = self.verts[v].an_edge;
            if anchor == INVALID || self.edges[anchor].face == INVALID {
                self.verts[v].an_edge = sides[i];
            }
        }
        f
    }

    /// Split face `f` into three around a new vertex at `p`, which must lie
    /// strictly inside it.
    pub fn split_face(&mut self, f: FaceIdx, p: Vec2) -> VertIdx {
        debug_assert!(self.face_is_valid(f), "split_face on removed face {}", f);
        if !self.has_room(1, 3, 2) {
            return INVALID;
        }
        let [e0, e1, e2] = self.face_edges(f);
        let (a, b, c) = (self.org(e0), self.org(e1), self.org(e2));
        let data = self.faces[f].data.clone();

        let v = self.verts.alloc(Vertex {
            pos: p,
            an_edge: INVALID,
        });
        let ap = self.make_edge_pair(a, v);
        let bp = self.make_edge_pair(b, v);
        let cp = self.make_edge_pair(c, v);
        let f1 = self.alloc_face(data.clone());
        let f2 = self.alloc_face(data);

        self.link_face(f, [e0, bp, twin(ap)]);
        self.link_face(f1, [e1, cp, twin(bp)]);
        self.link_face(f2, [e2, ap, twin(cp)]);
        self.verts[v].an_edge = twin(ap);
        trace!(face = f, vertex = v, "split face");
        v
    }

    /// Split the edge of `e` at `p`, which must lie on it, splitting the one
    /// or two adjacent faces. Halves of a locked edge stay locked.
    pub fn split_edge(&mut self, e: EdgeIdx, p: Vec2) -> VertIdx {
        let e = if self.edges[e].face == INVALID { twin(e) } else { e };
        if self.edges[e].face == INVALID {
            return INVALID;
        }
        let t = twin(e);
        let f = self.edges[e].face;
        let g = self.edges[t].face;
        let two_sided = g != INVALID;
        if !self.has_room(1, 2 + two_sided as usize, 1 + two_sided as usize) {
            return INVALID;
        }

        let b = self.dst(e);
        let en = self.next(e);
        let ep = self.next(en);
        let c = self.org(ep);
        let locked = self.edges[e].locked;

        let v = self.verts.alloc(Vertex {
            pos: p,
            an_edge: INVALID,
        });
        let pb = self.make_edge_pair(v, b);
        let pc = self.make_edge_pair(v, c);
        self.edges[t].org = v;
        self.set_locked(pb, locked);

        let f_data = self.faces[f].data.clone();
        let f2 = self.alloc_face(f_data);
        self.link_face(f, [e, pc, ep]);
        self.link_face(f2, [pb, en, twin(pc)]);

        if two_sided {
            let tn = self.next(t);
            let tp = self.next(tn);
            let d = self.org(tp);
            let pd = self.make_edge_pair(v, d);
            let g_data = self.faces[g].data.clone();
            let g2 = self.alloc_face(g_data);
            self.link_face(g, [t, tn, twin(pd)]);
            self.link_face(g2, [twin(pb), pd, tp]);
        }

        self.verts[v].an_edge = pb;
        self.verts[b].an_edge = en;
        trace!(edge = e, vertex = v, two_sided, "split edge");
        v
    }

    /// Replace the shared diagonal of the two faces around `e` with the other
    /// diagonal. Refuses locked or boundary edges and non-convex quads.
    pub fn flip_edge(&mut self, e: EdgeIdx) -> bool {
        let t = twin(e);
        if self.edges[e].locked || !self.is_interior(e) {
            return false;
        }
        let f = self.edges[e].face;
        let g = self.edges[t].face;
        let en = self.next(e);
        let ep = self.next(en);
        let tn = self.next(t);
        let tp = self.next(tn);
        let a = self.org(e);
        let b = self.org(t);
        let c = self.org(ep);
        let d = self.org(tp);

        let (pa, pb, pc, pd) = (self.pos(a), self.pos(b), self.pos(c), self.pos(d));
        if orient2d(pc, pd, pb) <= 0 || orient2d(pd, pc, pa) <= 0 {
            return false;
        }

        self.edges[e].org = c;
        self.edges[t].org = d;
        self.link_face(f, [e, tp, en]);
        self.link_face(g, [t, ep, tn]);
        self.verts[a].an_edge = tn;
        self.verts[b].an_edge = en;
        trace!(edge = e, "flip edge");
        true
    }

    /// Detach a face without re-triangulating the hole it leaves.
    pub fn remove_face(&mut self, f: FaceIdx) {
        if !self.face_is_valid(f) {
            return;
        }
        let sides = self.face_edges(f);
        for &e in &sides {
            self.edges[e].face = INVALID;
            self.edges[e].next = INVALID;
        }
        self.faces[f].an_edge = INVALID;
        self.live_faces -= 1;
        for &e in &sides {
            let v = self.edges[e].org;
            self.refresh_anchor(v);
        }
    }
}
