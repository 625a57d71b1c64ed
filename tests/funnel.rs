// Copyright 2025 Lars Brubaker
// Tests for the radius-aware funnel on real corridors.

mod helpers;

use cdt_nav::funnel::Side;
use cdt_nav::{Line, NavPathfinder, PathFunnel, PathfinderConfig, Real, Vec2};
use helpers::{grid_mesh, p, pf};

/// Walls forming an S-bend: go east along the bottom, north past a gap at the
/// east end, then west along the top.
fn s_bend() -> cdt_nav::HalfEdgeMesh {
    let mut mesh = grid_mesh(12);
    assert!(mesh.cdt_insert_edge(Line::new(p(0, 4), p(9, 4)), true));
    assert!(mesh.cdt_insert_edge(Line::new(p(3, 8), p(12, 8)), true));
    mesh
}

#[test]
fn corners_sit_one_radius_off_their_wall_vertex() {
    let mesh = s_bend();
    let mut finder = NavPathfinder::for_mesh(PathfinderConfig::default(), &mesh).unwrap();
    let radius = Real::from_f64(0.5);
    assert!(finder.find_path(&mesh, pf(1.5, 1.5), pf(10.5, 10.5), radius, false));

    let corners = finder.funnel().corners().to_vec();
    let path = finder.path();
    assert_eq!(path.len(), corners.len() + 2);
    assert!(corners.iter().any(|c| c.pos == p(9, 4)));
    assert!(corners.iter().any(|c| c.pos == p(3, 8)));

    let tol = Real::from_raw(32);
    for (k, c) in corners.iter().enumerate() {
        let d = path[k + 1].distance(c.pos);
        assert!((d - radius).abs() <= tol, "corner {:?} offset by {:?}", c, d);
    }
}

#[test]
fn corner_sides_follow_turn_direction() {
    let mesh = s_bend();
    let mut finder = NavPathfinder::for_mesh(PathfinderConfig::default(), &mesh).unwrap();
    assert!(finder.find_path(&mesh, pf(1.5, 1.5), pf(1.5, 10.5), Real::ZERO, false));
    let corners = finder.funnel().corners();
    // left turn around the east end of the lower wall, then a right turn
    // around the west end of the upper wall
    let lower = corners.iter().find(|c| c.pos == p(9, 4)).expect("bends at (9, 4)");
    let upper = corners.iter().find(|c| c.pos == p(3, 8)).expect("bends at (3, 8)");
    assert_eq!(lower.side, Side::Left);
    assert_eq!(upper.side, Side::Right);
}

#[test]
fn portals_follow_corridor_edges() {
    let mesh = s_bend();
    let mut finder = NavPathfinder::for_mesh(PathfinderConfig::default(), &mesh).unwrap();
    let (start, goal) = (pf(1.5, 1.5), pf(10.5, 10.5));
    assert!(finder.find_path(&mesh, start, goal, Real::ZERO, false));
    let edges = finder.path_edges().to_vec();

    let mut funnel = PathFunnel::new();
    funnel.trace_portal_edge_verts(&mesh, &edges, start, goal);
    let (left, right) = funnel.portals();
    assert_eq!(left.len(), edges.len() + 2);
    assert_eq!((left[0], right[0]), (start, start));
    assert_eq!((*left.last().unwrap(), *right.last().unwrap()), (goal, goal));
    for (i, &e) in edges.iter().enumerate() {
        assert_eq!(left[i + 1], mesh.pos(mesh.dst(e)));
        assert_eq!(right[i + 1], mesh.pos(mesh.org(e)));
    }
    funnel.set_agent_radius(Real::ZERO);
    assert_eq!(funnel.run(), finder.path());
}

#[test]
fn zero_radius_path_touches_wall_ends() {
    let mesh = s_bend();
    let mut finder = NavPathfinder::for_mesh(PathfinderConfig::default(), &mesh).unwrap();
    assert!(finder.find_path(&mesh, pf(1.5, 1.5), pf(10.5, 10.5), Real::ZERO, false));
    let path: Vec<Vec2> = finder.path().to_vec();
    assert!(path.contains(&p(9, 4)));
    assert!(path.contains(&p(3, 8)));
}
