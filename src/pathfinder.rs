// Copyright 2025 Lars Brubaker
// License: MIT
//
// A* over the half-edges of a HalfEdgeMesh.
//
// The node for half-edge e means "entered face(twin(e)) through e"; its
// position is the midpoint of e. Locked edges are walls, boundary edges lead
// nowhere, and edges narrower than the agent are discarded.

use tracing::{debug, trace};

use crate::config::PathfinderConfig;
use crate::error::ConfigError;
use crate::funnel::{FunnelStep, PathFunnel};
use crate::geom::{Real, Vec2};
use crate::mesh::{twin, EdgeIdx, FaceIdx, HalfEdgeMesh, INVALID};
use crate::priorityq::OpenSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchState {
    Idle,
    Searching,
    FoundPath,
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepResult {
    Continue,
    FoundPath,
    Failed,
}

#[derive(Clone, Copy, Debug)]
struct Node {
    g: Real,
    h: Real,
    came_from: EdgeIdx,
    center: Vec2,
    discarded: bool,
    visited: bool,
    open: bool,
    touched: bool,
}

impl Node {
    const EMPTY: Node = Node {
        g: Real::ZERO,
        h: Real::ZERO,
        came_from: INVALID,
        center: Vec2::ZERO,
        discarded: false,
        visited: false,
        open: false,
        touched: false,
    };
}

#[derive(Clone, Debug)]
pub struct NavPathfinder {
    config: PathfinderConfig,
    nodes: Vec<Node>,
    touched: Vec<EdgeIdx>,
    open: OpenSet,

    state: SearchState,
    last_result: StepResult,
    stepping: bool,
    expansions: u32,

    start: Vec2,
    goal: Vec2,
    goal_face: FaceIdx,
    goal_edge: EdgeIdx,
    agent_radius: Real,

    path_edges: Vec<EdgeIdx>,
    funnel: PathFunnel,
    path: Vec<Vec2>,
}

impl NavPathfinder {
    /// `half_edge_capacity` should match the mesh's so the node table never
    /// has to grow.
    pub fn new(config: PathfinderConfig, half_edge_capacity: usize) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            nodes: vec![Node::EMPTY; half_edge_capacity],
            touched: Vec::new(),
            open: OpenSet::new(half_edge_capacity),
            state: SearchState::Idle,
            last_result: StepResult::Failed,
            stepping: false,
            expansions: 0,
            start: Vec2::ZERO,
            goal: Vec2::ZERO,
            goal_face: INVALID,
            goal_edge: INVALID,
            agent_radius: Real::ZERO,
            path_edges: Vec::new(),
            funnel: PathFunnel::new(),
            path: Vec::new(),
        })
    }

    /// Sized for `mesh`.
    pub fn for_mesh<D: Clone>(config: PathfinderConfig, mesh: &HalfEdgeMesh<D>) -> Result<Self, ConfigError> {
        Self::new(config, mesh.half_edge_capacity())
    }

    pub fn config(&self) -> &PathfinderConfig {
        &self.config
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn last_step_result(&self) -> StepResult {
        self.last_result
    }

    /// Number of nodes popped by the current search.
    pub fn expansions(&self) -> u32 {
        self.expansions
    }

    /// The smoothed path, start and goal included.
    pub fn path(&self) -> &[Vec2] {
        &self.path
    }

    /// The corridor: half-edges crossed from start face to goal face.
    pub fn path_edges(&self) -> &[EdgeIdx] {
        &self.path_edges
    }

    pub fn funnel(&self) -> &PathFunnel {
        &self.funnel
    }

    fn reset_search(&mut self) {
        for &e in &self.touched {
            self.nodes[e as usize] = Node::EMPTY;
        }
        self.touched.clear();
        self.open.clear();
        self.path_edges.clear();
        self.path.clear();
        self.expansions = 0;
        self.goal_face = INVALID;
        self.goal_edge = INVALID;
        self.state = SearchState::Idle;
    }

    /// Fill in the lazily computed parts of a node on first contact.
    fn touch<D: Clone>(&mut self, mesh: &HalfEdgeMesh<D>, e: EdgeIdx) -> &mut Node {
        let i = e as usize;
        if i >= self.nodes.len() {
            self.nodes.resize(i + 1, Node::EMPTY);
        }
        if !self.nodes[i].touched {
            let narrow = mesh.edge_length(e) * self.config.portal_width_factor < self.agent_radius;
            let node = &mut self.nodes[i];
            node.touched = true;
            node.center = mesh.edge_center(e);
            node.discarded = narrow;
            self.touched.push(e);
        }
        &mut self.nodes[i]
    }

    /// Can the search cross `e` at all?
    fn is_passable<D: Clone>(mesh: &HalfEdgeMesh<D>, e: EdgeIdx) -> bool {
        !mesh.is_locked(e) && mesh.is_interior(e)
    }

    /// Start a search. Without `stepping` the search and the funnel run to
    /// completion and the return value says whether a path was found; with
    /// it, the return value says whether the search started.
    pub fn find_path<D: Clone>(
        &mut self,
        mesh: &HalfEdgeMesh<D>,
        start: Vec2,
        goal: Vec2,
        agent_radius: Real,
        stepping: bool,
    ) -> bool {
        self.reset_search();
        self.start = start;
        self.goal = goal;
        self.agent_radius = agent_radius;
        self.stepping = stepping;

        let start_face = mesh.find_face_containing_point(start);
        let goal_face = mesh.find_face_containing_point(goal);
        if start_face == INVALID || goal_face == INVALID {
            debug!(?start, ?goal, "path endpoint outside the mesh");
            self.state = SearchState::Failed;
            self.last_result = StepResult::Failed;
            return false;
        }
        self.goal_face = goal_face;

        if start_face == goal_face {
            self.path = vec![start, goal];
            self.state = SearchState::FoundPath;
            self.last_result = StepResult::FoundPath;
            return true;
        }

        for e in mesh.face_edges(start_face) {
            if !Self::is_passable(mesh, e) {
                continue;
            }
            let node = self.touch(mesh, e);
            if node.discarded {
                continue;
            }
            let g = start.distance(node.center);
            let h = node.center.distance(goal);
            node.g = g;
            node.h = h;
            node.open = true;
            self.open.push_or_decrease(e, g + h, h);
        }

        self.state = SearchState::Searching;
        self.last_result = StepResult::Continue;
        if stepping {
            return true;
        }
        loop {
            match self.step(mesh) {
                StepResult::Continue => {}
                StepResult::FoundPath => return self.resolve_path(mesh),
                StepResult::Failed => return false,
            }
        }
    }

    fn fail(&mut self) -> StepResult {
        debug!(expansions = self.expansions, "no path");
        self.state = SearchState::Failed;
        self.last_result = StepResult::Failed;
        StepResult::Failed
    }

    /// Expand one node.
    pub fn step<D: Clone>(&mut self, mesh: &HalfEdgeMesh<D>) -> StepResult {
        if self.state != SearchState::Searching {
            return self.last_result;
        }
        let Some(key) = self.open.pop() else {
            return self.fail();
        };
        let e = key.edge;
        self.expansions += 1;
        if self.config.max_expansions != 0 && self.expansions > self.config.max_expansions {
            return self.fail();
        }

        let (g, center) = {
            let node = &mut self.nodes[e as usize];
            node.open = false;
            node.visited = true;
            (node.g, node.center)
        };
        trace!(edge = e, f = ?key.f, "expand");

        let t = twin(e);
        if mesh.edge_face(e) == self.goal_face || mesh.edge_face(t) == self.goal_face {
            self.goal_edge = e;
            self.state = SearchState::FoundPath;
            self.last_result = StepResult::FoundPath;
            return StepResult::FoundPath;
        }

        let n1 = mesh.next(t);
        let n2 = mesh.next(n1);
        let goal = self.goal;
        for cand in [n1, n2] {
            if !Self::is_passable(mesh, cand) {
                continue;
            }
            let node = self.touch(mesh, cand);
            if node.discarded || node.visited {
                continue;
            }
            let tentative = g + center.distance(node.center);
            if node.open && tentative >= node.g {
                continue;
            }
            let h = node.center.distance(goal);
            node.g = tentative;
            node.h = h;
            node.came_from = e;
            node.open = true;
            self.open.push_or_decrease(cand, tentative + h, h);
        }

        self.last_result = StepResult::Continue;
        StepResult::Continue
    }

    /// Build the corridor and its portals after `FoundPath`. Without stepping
    /// the funnel also runs to completion.
    pub fn resolve_path<D: Clone>(&mut self, mesh: &HalfEdgeMesh<D>) -> bool {
        if self.state != SearchState::FoundPath {
            return false;
        }
        if self.goal_edge == INVALID {
            // start and goal share a face; the path is already set
            return !self.path.is_empty();
        }

        self.path_edges.clear();
        let mut e = self.goal_edge;
        while e != INVALID {
            self.path_edges.push(e);
            e = self.nodes[e as usize].came_from;
        }
        self.path_edges.reverse();

        self.funnel
            .trace_portal_edge_verts(mesh, &self.path_edges, self.start, self.goal);
        self.funnel.set_agent_radius(self.agent_radius);
        if !self.stepping {
            self.path = self.funnel.run().to_vec();
            debug!(
                corridor = self.path_edges.len(),
                points = self.path.len(),
                "path resolved"
            );
        }
        true
    }

    /// Advance the funnel by one portal. `path()` is filled once this
    /// reports `Done`.
    pub fn funnel_step(&mut self) -> FunnelStep {
        if self.state != SearchState::FoundPath {
            return FunnelStep::Done;
        }
        if self.goal_edge == INVALID {
            return FunnelStep::Done;
        }
        let step = self.funnel.step();
        if step == FunnelStep::Done && self.path.is_empty() {
            self.path = self.funnel.path().to_vec();
            debug!(points = self.path.len(), "path resolved");
        }
        step
    }
}
