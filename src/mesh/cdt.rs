// Copyright 2025 Lars Brubaker
// License: MIT
//
// Constrained Delaunay insertion of points and segments.
//
// A segment is inserted by tracing it through the triangulation from one
// endpoint. Sub-segments that still need work sit on an explicit stack, so
// splitting at a vertex or at a crossing constraint never recurses.

use std::collections::VecDeque;

use tracing::{debug, warn};

use super::{twin, EdgeIdx, HalfEdgeMesh, PointInFace, VertIdx, INVALID};
use crate::geom::{
    dist_sq_wide, dot_wide, line_intersection, orient2d, project_onto_segment, segments_cross,
    Line, Vec2,
};

/// What tracing a segment from its first vertex ran into.
#[derive(Debug)]
enum Trace {
    /// The segment already is this half-edge.
    Edge(EdgeIdx),
    /// This half-edge runs along the segment and stops at a vertex short of
    /// the far endpoint.
    Collinear(EdgeIdx, VertIdx),
    /// The segment crosses these unlocked edges and ends at `end`, which is
    /// either the far endpoint or a vertex lying on the segment.
    Crossing { crossed: Vec<EdgeIdx>, end: VertIdx },
    /// The segment crosses a locked edge at `point`.
    Blocked { edge: EdgeIdx, point: Vec2 },
    /// The segment leaves the mesh.
    Outside,
}

impl<D: Clone> HalfEdgeMesh<D> {
    /// Insert a point into the triangulation, welding onto an existing vertex
    /// when one is close enough.
    pub fn cdt_insert_point(&mut self, point: Vec2, fix_delaunay: bool) -> VertIdx {
        if !point.in_range() {
            warn!(?point, "point outside the supported coordinate range");
            return INVALID;
        }
        let near = self.find_closest_vertex(point);
        if near != INVALID && self.pos(near).within(point, self.config().weld_threshold) {
            return near;
        }

        let v = match self.locate_point(point) {
            Some((f, PointInFace::Inside)) => self.split_face(f, point),
            Some((_, PointInFace::OnEdge(e))) => {
                let (va, vb) = (self.org(e), self.dst(e));
                let q = project_onto_segment(point, self.pos(va), self.pos(vb));
                // projecting can pull the point into an endpoint's weld radius
                let weld = self.config().weld_threshold;
                if self.pos(va).within(q, weld) {
                    va
                } else if self.pos(vb).within(q, weld) {
                    vb
                } else {
                    self.split_edge(e, q)
                }
            }
            _ => {
                debug!(?point, "point is outside the mesh");
                return INVALID;
            }
        };

        if v != INVALID && fix_delaunay {
            self.fix_delaunay_conditions(v);
        }
        v
    }

    /// Insert a constrained segment. Every mesh edge along it ends up locked.
    /// Returns false when an endpoint cannot be inserted, the segment has
    /// zero length, or it leaves the mesh. A walk that fails partway keeps
    /// the sub-segments it already locked, and the flips it made are still
    /// repaired.
    pub fn cdt_insert_edge(&mut self, line: Line, fix_delaunay: bool) -> bool {
        let va = self.cdt_insert_point(line.a, fix_delaunay);
        let vb = self.cdt_insert_point(line.b, fix_delaunay);
        if va == INVALID || vb == INVALID {
            return false;
        }
        if va == vb {
            return false;
        }

        let mut fresh: Vec<EdgeIdx> = Vec::new();
        let result = self.walk_constraint(va, vb, fix_delaunay, &mut fresh);

        if fix_delaunay {
            fresh.retain(|&e| !self.edges[e].locked);
            self.repair_delaunay(fresh);
        }
        match result {
            Some(locked) => {
                debug!(locked, "constraint inserted");
                true
            }
            None => false,
        }
    }

    /// Lock every edge from `va` to `vb`, splitting and flipping as needed.
    /// Flipped edges go to `fresh`. Returns the number of edges locked, or
    /// `None` when the walk cannot finish.
    fn walk_constraint(
        &mut self,
        va: VertIdx,
        vb: VertIdx,
        fix_delaunay: bool,
        fresh: &mut Vec<EdgeIdx>,
    ) -> Option<u32> {
        let mut pending: Vec<(VertIdx, VertIdx)> = vec![(va, vb)];
        let mut locked = 0u32;
        // Every pass locks an edge or adds a vertex, both bounded by capacity.
        let mut budget = self.verts.capacity() + self.edges.capacity();

        while let Some((from, to)) = pending.pop() {
            if from == to {
                continue;
            }
            if budget == 0 {
                warn!(from, to, "constraint insertion made no progress");
                return None;
            }
            budget -= 1;

            match self.trace_segment(from, to) {
                Trace::Edge(e) => {
                    self.set_locked(e, true);
                    locked += 1;
                }
                Trace::Collinear(e, w) => {
                    self.set_locked(e, true);
                    locked += 1;
                    pending.push((w, to));
                }
                Trace::Crossing { crossed, end } => {
                    let Some(e) = self.flip_out_crossings(from, end, crossed, fresh) else {
                        warn!(from, to = end, "could not clear edges crossing a constraint");
                        return None;
                    };
                    self.set_locked(e, true);
                    locked += 1;
                    pending.push((end, to));
                }
                Trace::Blocked { edge, point } => {
                    let s = self.vertex_at_crossing(edge, point);
                    if s == INVALID {
                        return None;
                    }
                    if fix_delaunay {
                        self.fix_delaunay_conditions(s);
                    }
                    pending.push((s, to));
                    pending.push((from, s));
                }
                Trace::Outside => {
                    warn!(from, to, "constraint leaves the mesh");
                    return None;
                }
            }
        }
        Some(locked)
    }

    /// Vertex where a segment crosses the locked edge `e`: an endpoint of `e`
    /// when the crossing welds onto it, otherwise a new vertex splitting `e`.
    fn vertex_at_crossing(&mut self, e: EdgeIdx, point: Vec2) -> VertIdx {
        let weld = self.config().weld_threshold;
        for v in [self.org(e), self.dst(e)] {
            if self.pos(v).within(point, weld) {
                return v;
            }
        }
        self.split_edge(e, point)
    }

    /// Find the first obstacle met when walking from `from` toward `to`.
    fn trace_segment(&self, from: VertIdx, to: VertIdx) -> Trace {
        let direct = self.find_half_edge(from, to);
        if direct != INVALID {
            return Trace::Edge(direct);
        }
        let pa = self.pos(from);
        let pb = self.pos(to);
        let target = dist_sq_wide(pa, pb);
        let outgoing = self.vertex_edges(from);

        for &e in &outgoing {
            let px = self.pos(self.dst(e));
            if orient2d(pa, pb, px) == 0 && dot_wide(pa, pb, px) > 0 && dist_sq_wide(pa, px) < target {
                return Trace::Collinear(e, self.dst(e));
            }
        }

        for &e in &outgoing {
            if self.is_boundary(e) {
                continue;
            }
            let ex = self.next(e);
            let px = self.pos(self.org(ex));
            let py = self.pos(self.dst(ex));
            // x right of the segment, y left of it
            if orient2d(pa, px, pb) > 0 && orient2d(pa, py, pb) < 0 {
                return self.walk_crossings(pa, pb, to, ex);
            }
        }
        Trace::Outside
    }

    /// Walk across the triangles the segment pierces, starting at the edge
    /// `h` opposite its first vertex. `h` is always oriented from the right
    /// of the segment to its left.
    fn walk_crossings(&self, pa: Vec2, pb: Vec2, to: VertIdx, mut h: EdgeIdx) -> Trace {
        let mut crossed = Vec::new();
        loop {
            if self.edges[h].locked {
                let point = line_intersection(pa, pb, self.pos(self.org(h)), self.pos(self.dst(h)));
                return Trace::Blocked { edge: h, point };
            }
            crossed.push(h);
            let t = twin(h);
            if self.is_boundary(t) {
                return Trace::Outside;
            }
            let z = self.opposite_vertex(t);
            if z == to {
                return Trace::Crossing { crossed, end: to };
            }
            let o = orient2d(pa, pb, self.pos(z));
            if o == 0 {
                return Trace::Crossing { crossed, end: z };
            }
            h = if o > 0 { self.next(t) } else { self.prev(t) };
        }
    }

    /// Flip the crossing edges until `from`-`to` is a mesh edge. Flipped
    /// edges that no longer cross go to `fresh` for Delaunay repair.
    fn flip_out_crossings(
        &mut self,
        from: VertIdx,
        to: VertIdx,
        crossed: Vec<EdgeIdx>,
        fresh: &mut Vec<EdgeIdx>,
    ) -> Option<EdgeIdx> {
        let pa = self.pos(from);
        let pb = self.pos(to);
        let mut queue: VecDeque<EdgeIdx> = crossed.into();
        let mut stalled = 0;

        while let Some(e) = queue.pop_front() {
            if !self.flip_edge(e) {
                queue.push_back(e);
                stalled += 1;
                if stalled > queue.len() {
                    return None;
                }
                continue;
            }
            stalled = 0;
            let c = self.org(e);
            let d = self.dst(e);
            if (c == from && d == to) || (c == to && d == from) {
                continue;
            }
            if segments_cross(pa, pb, self.pos(c), self.pos(d)) {
                queue.push_back(e);
            } else {
                fresh.push(e);
            }
        }

        let e = self.find_half_edge(from, to);
        (e != INVALID).then_some(e)
    }
}
