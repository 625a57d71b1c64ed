// Copyright 2025 Lars Brubaker
// Tests for dump files and building meshes from them.

mod helpers;

use cdt_nav::{Dump, DumpError, HalfEdgeMesh, Line, MeshConfig, Real, Vec2, INVALID};
use helpers::{locked_between, p, pf};

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("cdt-nav-{}-{}.bin", name, std::process::id()))
}

fn room() -> Dump {
    Dump {
        points: vec![p(0, 0), p(20, 0), p(20, 20), p(0, 20), pf(7.5, 3.25)],
        lines: vec![Line::new(p(2, 10), p(8, 10)), Line::new(p(12, 10), p(18, 10))],
    }
}

#[test]
fn file_round_trip() {
    let path = temp_path("room");
    let dump = room();
    dump.write_to(&path).unwrap();
    let back = Dump::read_from(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(back, dump);
}

#[test]
fn missing_file_is_io_error() {
    let err = Dump::read_from(temp_path("does-not-exist")).unwrap_err();
    assert!(matches!(err, DumpError::Io(_)));
}

#[test]
fn header_promising_more_than_present_is_truncated() {
    let mut bytes = room().encode().unwrap().to_vec();
    // claim one extra line
    bytes[4] += 1;
    let err = Dump::decode(&bytes[..]).unwrap_err();
    assert!(matches!(err, DumpError::Truncated { needed: 32 }));
}

#[test]
fn dump_builds_constrained_mesh() {
    let dump = room();
    let (lo, hi) = dump.bounds().unwrap();
    let mut mesh: HalfEdgeMesh = HalfEdgeMesh::new(MeshConfig::with_vertex_capacity(256)).unwrap();
    assert_ne!(mesh.insert_face(lo, Vec2::new(hi.x, lo.y), hi, ()), INVALID);
    assert_ne!(mesh.insert_face(lo, hi, Vec2::new(lo.x, hi.y), ()), INVALID);
    for &q in &dump.points {
        assert_ne!(mesh.cdt_insert_point(q, true), INVALID);
    }
    for &line in &dump.lines {
        assert!(mesh.cdt_insert_edge(line, true));
    }
    for line in &dump.lines {
        assert!(locked_between(&mesh, line.a, line.b));
    }
    assert!(mesh.validate_delaunay().is_ok());
}

#[test]
fn build_mesh_locks_every_line() {
    let dump = room();
    let built = dump.build_mesh(Real::ONE).unwrap();
    assert_eq!(built.rejected, 0);
    for line in &dump.lines {
        assert!(locked_between(&built.mesh, line.a, line.b));
    }
    for &q in &dump.points {
        assert_ne!(built.mesh.find_face_containing_point(q), INVALID);
    }
}

#[test]
fn build_mesh_counts_rejected_lines() {
    let mut dump = room();
    // collapses to a single welded vertex
    dump.lines.push(Line::new(p(5, 5), p(5, 5)));
    let built = dump.build_mesh(Real::ONE).unwrap();
    assert_eq!(built.rejected, 1);
    assert!(built.mesh.validate_delaunay().is_ok());
}
