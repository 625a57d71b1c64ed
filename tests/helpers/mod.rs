// Copyright 2025 Lars Brubaker
// Shared test utilities for cdt-nav tests.

#![allow(dead_code)]

use cdt_nav::geom::{distance_to_segment, segments_cross};
use cdt_nav::mesh::twin;
use cdt_nav::{HalfEdgeMesh, MeshConfig, Real, Vec2, INVALID};

pub fn p(x: i32, y: i32) -> Vec2 {
    Vec2::from_ints(x, y)
}

pub fn pf(x: f64, y: f64) -> Vec2 {
    Vec2::from_f64(x, y)
}

/// Two seed triangles covering [0, size]².
pub fn square_mesh(size: i32) -> HalfEdgeMesh {
    square_mesh_with(size, MeshConfig::default())
}

pub fn square_mesh_with(size: i32, config: MeshConfig) -> HalfEdgeMesh {
    let mut mesh = HalfEdgeMesh::new(config).expect("valid config");
    assert_ne!(mesh.insert_face(p(0, 0), p(size, 0), p(size, size), ()), INVALID);
    assert_ne!(mesh.insert_face(p(0, 0), p(size, size), p(0, size), ()), INVALID);
    mesh
}

/// Square with every interior lattice point inserted.
pub fn grid_mesh(size: i32) -> HalfEdgeMesh {
    let mut mesh = square_mesh(size);
    for x in 0..=size {
        for y in 0..=size {
            assert_ne!(mesh.cdt_insert_point(p(x, y), true), INVALID, "({}, {})", x, y);
        }
    }
    mesh
}

/// Deterministic pseudo-random points strictly inside [lo, hi]².
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Lcg(seed.wrapping_mul(6364136223846793005).wrapping_add(1))
    }

    pub fn next_u32(&mut self) -> u32 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) as u32
    }

    /// Uniform in (lo, hi), on the 1/1024 lattice.
    pub fn coord(&mut self, lo: i32, hi: i32) -> Real {
        let span = ((hi - lo) * 1024 - 2) as u32;
        let steps = 1 + self.next_u32() % span;
        Real::from_int(lo) + Real::from_raw(steps as i64 * 64)
    }

    pub fn point(&mut self, lo: i32, hi: i32) -> Vec2 {
        Vec2::new(self.coord(lo, hi), self.coord(lo, hi))
    }
}

/// V - E + F, which is 1 for a triangulated disk.
pub fn euler(mesh: &HalfEdgeMesh) -> i64 {
    mesh.vertex_count() as i64 - mesh.edge_count() as i64 + mesh.face_count() as i64
}

/// Total length of locked edges lying on the segment (a, b).
pub fn locked_length_along(mesh: &HalfEdgeMesh, a: Vec2, b: Vec2) -> f64 {
    let tol = Real::from_raw(8);
    let mut total = 0.0;
    for e in (0..mesh.half_edge_count() as u32).step_by(2) {
        if !mesh.is_locked(e) {
            continue;
        }
        let s = mesh.pos(mesh.org(e));
        let t = mesh.pos(mesh.dst(e));
        if distance_to_segment(s, a, b) <= tol && distance_to_segment(t, a, b) <= tol {
            total += mesh.edge_length(e).to_f64();
        }
    }
    total
}

/// True when both halves of the edge between the vertices at `a` and `b`
/// are locked.
pub fn locked_between(mesh: &HalfEdgeMesh, a: Vec2, b: Vec2) -> bool {
    let e = mesh.find_half_edge_at(a, b);
    e != INVALID && mesh.is_locked(e) && mesh.is_locked(twin(e))
}

/// True when no segment of `path` properly crosses a locked edge.
pub fn path_avoids_walls(mesh: &HalfEdgeMesh, path: &[Vec2]) -> bool {
    for w in path.windows(2) {
        for e in (0..mesh.half_edge_count() as u32).step_by(2) {
            if !mesh.is_locked(e) {
                continue;
            }
            let s = mesh.pos(mesh.org(e));
            let t = mesh.pos(mesh.dst(e));
            if segments_cross(w[0], w[1], s, t) {
                return false;
            }
        }
    }
    true
}

pub fn path_length(path: &[Vec2]) -> f64 {
    path.windows(2).map(|w| w[0].distance(w[1]).to_f64()).sum()
}
