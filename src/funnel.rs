// Copyright 2025 Lars Brubaker
// License: MIT
//
// Simple stupid funnel over a half-edge corridor, with corners pushed out by
// the agent radius.
//
// Portal i is (left[i], right[i]) as seen by an agent walking the corridor.
// Portal 0 is (start, start); the last one is (goal, goal). The funnel state
// is explicit so the pathfinder can advance it one portal per call.

use tracing::trace;

use crate::geom::{orient2d, Real, Vec2};
use crate::mesh::{EdgeIdx, HalfEdgeMesh};

/// Which rail a corner was pulled around.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Corner {
    /// The wall vertex the path bends around.
    pub pos: Vec2,
    pub side: Side,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FunnelStep {
    Continue,
    Done,
}

#[derive(Clone, Debug, Default)]
pub struct PathFunnel {
    left: Vec<Vec2>,
    right: Vec<Vec2>,

    apex: Vec2,
    apex_index: usize,
    portal_left: Vec2,
    left_index: usize,
    portal_right: Vec2,
    right_index: usize,
    /// Next portal to feed into the funnel.
    resume_at: usize,

    radius: Real,
    corners: Vec<Corner>,
    path: Vec<Vec2>,
    done: bool,
}

impl PathFunnel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the portal rails for `corridor` and rewind the funnel.
    /// Each corridor half-edge is crossed from its own face into its twin's.
    pub fn trace_portal_edge_verts<D: Clone>(
        &mut self,
        mesh: &HalfEdgeMesh<D>,
        corridor: &[EdgeIdx],
        start: Vec2,
        goal: Vec2,
    ) {
        self.left.clear();
        self.right.clear();
        self.left.push(start);
        self.right.push(start);
        for &e in corridor {
            self.left.push(mesh.pos(mesh.dst(e)));
            self.right.push(mesh.pos(mesh.org(e)));
        }
        self.left.push(goal);
        self.right.push(goal);
        self.rewind();
    }

    /// Build the rails directly; used when the portals do not come from a mesh.
    pub fn set_portals(&mut self, start: Vec2, portals: &[(Vec2, Vec2)], goal: Vec2) {
        self.left.clear();
        self.right.clear();
        self.left.push(start);
        self.right.push(start);
        for &(l, r) in portals {
            self.left.push(l);
            self.right.push(r);
        }
        self.left.push(goal);
        self.right.push(goal);
        self.rewind();
    }

    pub fn set_agent_radius(&mut self, radius: Real) {
        self.radius = radius;
    }

    fn rewind(&mut self) {
        let start = self.left.first().copied().unwrap_or_default();
        self.apex = start;
        self.portal_left = start;
        self.portal_right = start;
        self.apex_index = 0;
        self.left_index = 0;
        self.right_index = 0;
        self.resume_at = 1;
        self.corners.clear();
        self.path.clear();
        self.done = false;
    }

    pub fn portals(&self) -> (&[Vec2], &[Vec2]) {
        (&self.left, &self.right)
    }

    /// Raw corners found so far, before the radius offset.
    pub fn corners(&self) -> &[Corner] {
        &self.corners
    }

    /// The smoothed path; empty until the funnel is done.
    pub fn path(&self) -> &[Vec2] {
        &self.path
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feed one portal into the funnel.
    pub fn step(&mut self) -> FunnelStep {
        if self.done {
            return FunnelStep::Done;
        }
        let i = self.resume_at;
        if i >= self.left.len() {
            self.finish();
            return FunnelStep::Done;
        }
        self.resume_at = i + 1;
        let (l, r) = (self.left[i], self.right[i]);

        // r on or left of apex->portal_right narrows from the right
        if orient2d(self.apex, self.portal_right, r) >= 0 {
            if self.apex == self.portal_right || orient2d(self.apex, self.portal_left, r) < 0 {
                self.portal_right = r;
                self.right_index = i;
            } else {
                self.restart_at(self.portal_left, self.left_index, Side::Left);
                return FunnelStep::Continue;
            }
        }

        // l on or right of apex->portal_left narrows from the left
        if orient2d(self.apex, self.portal_left, l) <= 0 {
            if self.apex == self.portal_left || orient2d(self.apex, self.portal_right, l) > 0 {
                self.portal_left = l;
                self.left_index = i;
            } else {
                self.restart_at(self.portal_right, self.right_index, Side::Right);
            }
        }
        FunnelStep::Continue
    }

    /// Step until the path is complete.
    ///
    /// Clearance is guaranteed at the path's vertices only: each offset corner
    /// sits `agent_radius` from its wall vertex, but the segments between
    /// corners can pass closer to it.
    pub fn run(&mut self) -> &[Vec2] {
        while self.step() == FunnelStep::Continue {}
        &self.path
    }

    fn restart_at(&mut self, pos: Vec2, index: usize, side: Side) {
        // the goal portal is never a corner
        if pos != self.apex && index + 1 < self.left.len() {
            trace!(?pos, ?side, "funnel corner");
            self.corners.push(Corner { pos, side });
        }
        self.apex = pos;
        self.apex_index = index;
        self.portal_left = pos;
        self.portal_right = pos;
        self.left_index = index;
        self.right_index = index;
        self.resume_at = index + 1;
    }

    fn finish(&mut self) {
        self.done = true;
        self.path.clear();
        let (Some(&start), Some(&goal)) = (self.left.first(), self.left.last()) else {
            return;
        };
        self.path.push(start);
        for k in 0..self.corners.len() {
            let prev = if k == 0 { start } else { self.corners[k - 1].pos };
            let next = self.corners.get(k + 1).map_or(goal, |c| c.pos);
            let offset = clearance_offset(prev, self.corners[k], next, self.radius);
            self.path.push(offset);
        }
        if self.path.last() != Some(&goal) {
            self.path.push(goal);
        }
    }
}

/// Normal of `dir` pointing away from a wall on `side`.
fn away_from_wall(dir: Vec2, side: Side) -> Vec2 {
    match side {
        // the wall is on the left, so push right
        Side::Left => -dir.perp(),
        Side::Right => dir.perp(),
    }
}

/// Push `corner` by `radius` along the bisector of the incoming and outgoing
/// segment normals. Only the returned point is held at `radius`.
pub fn clearance_offset(prev: Vec2, corner: Corner, next: Vec2, radius: Real) -> Vec2 {
    if radius == Real::ZERO {
        return corner.pos;
    }
    let n_in = away_from_wall((corner.pos - prev).normalized(), corner.side);
    let n_out = away_from_wall((next - corner.pos).normalized(), corner.side);
    let mut push = (n_in + n_out).normalized();
    if push == Vec2::ZERO {
        push = n_in;
    }
    corner.pos + push * radius
}
