// Copyright 2025 Lars Brubaker
// Tests for constrained Delaunay insertion.

mod helpers;

use cdt_nav::mesh::twin;
use cdt_nav::{HalfEdgeMesh, Line, MeshConfig, Real, INVALID};
use helpers::{
    euler, grid_mesh, locked_between, locked_length_along, p, pf, square_mesh, square_mesh_with, Lcg,
};

#[test]
fn centre_of_square_gives_four_faces() {
    let mut mesh = square_mesh(1);
    let v = mesh.cdt_insert_point(pf(0.5, 0.5), true);
    assert_ne!(v, INVALID);
    assert_eq!(mesh.face_count(), 4);
    assert_eq!(mesh.vertex_count(), 5);
    let spokes = mesh.vertex_edges(v);
    assert_eq!(spokes.len(), 4);
    for e in spokes {
        assert!(mesh.is_interior(e), "spoke {} should have faces on both sides", e);
        assert!(mesh.is_edge_locally_delaunay(e));
    }
    assert!(mesh.validate_delaunay().is_ok());
    assert_eq!(euler(&mesh), 1);
}

#[test]
fn off_centre_point_flips_diagonal_once() {
    let mut mesh = square_mesh(4);
    let v = mesh.cdt_insert_point(p(3, 1), false);
    assert_ne!(v, INVALID);
    assert!(mesh.validate_delaunay().is_err());
    assert_eq!(mesh.fix_delaunay_conditions(v), 1);
    assert_ne!(mesh.find_edge(v, 3), INVALID, "diagonal should now reach the far corner");
    assert_eq!(mesh.fix_delaunay_conditions(v), 0);
    assert!(mesh.validate_delaunay().is_ok());
}

#[test]
fn random_points_keep_delaunay_and_euler() {
    let mut mesh = square_mesh(64);
    let mut rng = Lcg::new(7);
    for _ in 0..250 {
        let q = rng.point(0, 64);
        assert_ne!(mesh.cdt_insert_point(q, true), INVALID);
    }
    assert!(mesh.validate_delaunay().is_ok());
    assert_eq!(euler(&mesh), 1);
}

#[test]
fn weld_is_idempotent() {
    let mut mesh = square_mesh(8);
    let a = mesh.cdt_insert_point(pf(3.25, 2.5), true);
    let counts = (mesh.vertex_count(), mesh.edge_count(), mesh.face_count());
    let b = mesh.cdt_insert_point(pf(3.25, 2.5), true);
    let nudged = pf(3.25, 2.5) + cdt_nav::Vec2::new(Real::from_raw(20), Real::from_raw(-20));
    let c = mesh.cdt_insert_point(nudged, true);
    assert_eq!(a, b);
    assert_eq!(a, c);
    assert_eq!(counts, (mesh.vertex_count(), mesh.edge_count(), mesh.face_count()));
}

#[test]
fn no_two_vertices_within_weld_threshold() {
    let mut mesh = square_mesh(16);
    let mut rng = Lcg::new(99);
    for _ in 0..120 {
        let q = rng.point(0, 16);
        mesh.cdt_insert_point(q, true);
        // and a near-duplicate of it
        mesh.cdt_insert_point(q + cdt_nav::Vec2::new(Real::from_raw(10), Real::ZERO), true);
    }
    let weld = mesh.config().weld_threshold;
    let n = mesh.vertex_count() as u32;
    for a in 0..n {
        for b in (a + 1)..n {
            assert!(!mesh.pos(a).within(mesh.pos(b), weld), "vertices {} and {} overlap", a, b);
        }
    }
}

#[test]
fn constraints_survive_later_insertions() {
    let mut mesh = square_mesh(32);
    let (a, b) = (pf(2.0, 3.0), pf(29.0, 21.5));
    assert!(mesh.cdt_insert_edge(Line::new(a, b), true));
    let (c, d) = (pf(5.0, 28.0), pf(25.0, 4.0));
    assert!(mesh.cdt_insert_edge(Line::new(c, d), true));

    let mut rng = Lcg::new(3);
    for _ in 0..150 {
        mesh.cdt_insert_point(rng.point(0, 32), true);
    }

    let tol = 0.01;
    assert!((locked_length_along(&mesh, a, b) - a.distance(b).to_f64()).abs() < tol);
    assert!((locked_length_along(&mesh, c, d) - c.distance(d).to_f64()).abs() < tol);
    assert!(mesh.validate_delaunay().is_ok());
    assert_eq!(euler(&mesh), 1);
}

#[test]
fn every_locked_edge_is_locked_on_both_halves() {
    let mut mesh = square_mesh(16);
    for (x0, y0, x1, y1) in [(1, 1, 15, 15), (1, 15, 15, 1), (8, 1, 8, 15), (2, 8, 14, 8)] {
        assert!(mesh.cdt_insert_edge(Line::new(p(x0, y0), p(x1, y1)), true));
    }
    for e in 0..mesh.half_edge_count() as u32 {
        assert_eq!(mesh.is_locked(e), mesh.is_locked(twin(e)));
    }
    assert!((locked_length_along(&mesh, p(8, 1), p(8, 15)) - 14.0).abs() < 0.01);
    assert!((locked_length_along(&mesh, p(2, 8), p(14, 8)) - 12.0).abs() < 0.01);
    assert!(mesh.validate_delaunay().is_ok());
}

#[test]
fn boundary_constraint_locks_hull_edge() {
    let mut mesh = square_mesh(4);
    assert!(mesh.cdt_insert_edge(Line::new(p(0, 0), p(4, 0)), true));
    assert!(locked_between(&mesh, p(0, 0), p(4, 0)));
    assert!(mesh.cdt_insert_edge(Line::new(p(0, 2), p(4, 2)), true));
    assert!((locked_length_along(&mesh, p(0, 2), p(4, 2)) - 4.0).abs() < 0.01);
}

#[test]
fn constraint_cut_by_a_hole_keeps_its_first_half() {
    let mut mesh = grid_mesh(16);
    // (8, 8) is the only lattice point strictly between the endpoints
    let (a, mid, b) = (p(1, 6), p(8, 8), p(15, 10));
    let y_at = |x: f64| 6.0 + (x - 1.0) * 2.0 / 7.0;
    for i in 0..=40 {
        let x = 10.0 + 0.05 * i as f64;
        for dy in [-0.05, 0.0, 0.05] {
            let f = mesh.find_face_containing_point(pf(x, y_at(x) + dy));
            if f != INVALID {
                mesh.remove_face(f);
            }
        }
    }
    assert!(mesh.validate_delaunay().is_ok());

    assert!(!mesh.cdt_insert_edge(Line::new(a, b), true));
    assert!(locked_between(&mesh, a, mid));
    assert!(locked_length_along(&mesh, mid, b) < 0.01);
    assert!(mesh.validate().is_ok());
    assert!(mesh.validate_delaunay().is_ok());
}

#[test]
fn vertex_capacity_exhaustion_is_clean() {
    let config = MeshConfig {
        max_vertices: 5,
        ..MeshConfig::default()
    };
    let mut mesh = square_mesh_with(4, config);
    assert_ne!(mesh.cdt_insert_point(p(1, 3), true), INVALID);
    let before = (mesh.vertex_count(), mesh.half_edge_count(), mesh.face_count());
    assert_eq!(mesh.cdt_insert_point(p(3, 1), true), INVALID);
    assert_eq!(before, (mesh.vertex_count(), mesh.half_edge_count(), mesh.face_count()));
    assert!(mesh.validate_delaunay().is_ok());
}

#[test]
fn face_capacity_exhaustion_is_clean() {
    let config = MeshConfig {
        max_faces: 3,
        ..MeshConfig::default()
    };
    let mut mesh = square_mesh_with(4, config);
    assert_eq!(mesh.cdt_insert_point(p(3, 1), true), INVALID);
    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.face_count(), 2);
    assert!(mesh.validate().is_ok());
}

#[test]
fn zero_length_constraint_is_noop() {
    let mut mesh = square_mesh(4);
    assert!(!mesh.cdt_insert_edge(Line::new(p(0, 0), p(0, 0)), true));
    assert_eq!(mesh.face_count(), 2);
    assert!(!mesh.is_locked(mesh.find_half_edge(0, 1)));
}

#[test]
fn reset_then_rebuild_matches() {
    fn build(mesh: &mut HalfEdgeMesh) {
        let q = |x, y| p(x, y);
        mesh.insert_face(q(0, 0), q(8, 0), q(8, 8), ());
        mesh.insert_face(q(0, 0), q(8, 8), q(0, 8), ());
        let mut rng = Lcg::new(11);
        for _ in 0..40 {
            mesh.cdt_insert_point(rng.point(0, 8), true);
        }
        mesh.cdt_insert_edge(Line::new(q(1, 1), q(7, 6)), true);
    }
    let mut mesh = HalfEdgeMesh::new(MeshConfig::default()).unwrap();
    build(&mut mesh);
    let first: Vec<_> = mesh.faces().map(|f| mesh.face_vertices(f)).collect();
    mesh.reset();
    assert_eq!(mesh.face_count(), 0);
    build(&mut mesh);
    let second: Vec<_> = mesh.faces().map(|f| mesh.face_vertices(f)).collect();
    assert_eq!(first, second, "insertion must be deterministic");
}
