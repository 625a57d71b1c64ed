// Copyright 2025 Lars Brubaker
// License: MIT
//
// Binary point/line dumps, the input format of the harness.
//
// Layout, all little-endian:
//   u32 point_count, u32 line_count
//   point_count x (i64 x_raw, i64 y_raw)
//   line_count  x (i64 x0, i64 y0, i64 x1, i64 y1)

use std::path::Path;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use tracing::{debug, warn};

use crate::config::MeshConfig;
use crate::error::{DumpError, NavError};
use crate::geom::{Line, Real, Vec2};
use crate::mesh::{HalfEdgeMesh, INVALID};

const HEADER_LEN: usize = 8;
const POINT_LEN: u64 = 16;
const LINE_LEN: u64 = 32;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dump {
    pub points: Vec<Vec2>,
    pub lines: Vec<Line>,
}

/// A constrained mesh triangulated from a dump.
#[derive(Debug)]
pub struct DumpMesh {
    pub mesh: HalfEdgeMesh,
    /// Points and lines that could not be inserted.
    pub rejected: usize,
}

fn record_count(what: &'static str, count: usize) -> Result<u32, DumpError> {
    u32::try_from(count).map_err(|_| DumpError::TooManyRecords { what, count })
}

fn get_vec2(buf: &mut impl Buf) -> Vec2 {
    let x = Real::from_raw(buf.get_i64_le());
    let y = Real::from_raw(buf.get_i64_le());
    Vec2::new(x, y)
}

fn put_vec2(buf: &mut impl BufMut, v: Vec2) {
    buf.put_i64_le(v.x.raw());
    buf.put_i64_le(v.y.raw());
}

impl Dump {
    pub fn encoded_len(&self) -> usize {
        HEADER_LEN + self.points.len() * POINT_LEN as usize + self.lines.len() * LINE_LEN as usize
    }

    pub fn encode(&self) -> Result<Bytes, DumpError> {
        let point_count = record_count("points", self.points.len())?;
        let line_count = record_count("lines", self.lines.len())?;
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        buf.put_u32_le(point_count);
        buf.put_u32_le(line_count);
        for &p in &self.points {
            put_vec2(&mut buf, p);
        }
        for line in &self.lines {
            put_vec2(&mut buf, line.a);
            put_vec2(&mut buf, line.b);
        }
        Ok(buf.freeze())
    }

    /// Decode a whole dump; the buffer must hold exactly one.
    pub fn decode(mut buf: impl Buf) -> Result<Self, DumpError> {
        if buf.remaining() < HEADER_LEN {
            return Err(DumpError::Truncated {
                needed: HEADER_LEN - buf.remaining(),
            });
        }
        let point_count = buf.get_u32_le();
        let line_count = buf.get_u32_le();

        let body = point_count as u64 * POINT_LEN + line_count as u64 * LINE_LEN;
        let have = buf.remaining() as u64;
        if have < body {
            return Err(DumpError::Truncated {
                needed: usize::try_from(body - have).unwrap_or(usize::MAX),
            });
        }
        if have > body {
            return Err(DumpError::TrailingBytes((have - body) as usize));
        }

        let points = (0..point_count).map(|_| get_vec2(&mut buf)).collect();
        let lines = (0..line_count)
            .map(|_| {
                let a = get_vec2(&mut buf);
                let b = get_vec2(&mut buf);
                Line::new(a, b)
            })
            .collect();
        Ok(Self { points, lines })
    }

    pub fn read_from(path: impl AsRef<Path>) -> Result<Self, DumpError> {
        let data = std::fs::read(path)?;
        Self::decode(Bytes::from(data))
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), DumpError> {
        std::fs::write(path, self.encode()?)?;
        Ok(())
    }

    /// Triangulate the dump inside its bounds grown by `margin`. Points are
    /// inserted first, then every line as a constraint; inputs the mesh
    /// rejects are counted rather than treated as errors.
    pub fn build_mesh(&self, margin: Real) -> Result<DumpMesh, NavError> {
        let (lo, hi) = self.bounds().ok_or(DumpError::Empty)?;
        let pad = Vec2::new(margin, margin);
        let (lo, hi) = (lo - pad, hi + pad);
        if !lo.in_range() || !hi.in_range() {
            return Err(DumpError::OutOfRange { lo, hi }.into());
        }

        // Crossing constraints add Steiner vertices, so leave headroom.
        let expected = self.points.len() + 2 * self.lines.len() + 4;
        let capacity = record_count("points and line endpoints", expected.saturating_mul(8).max(256))?;
        let mut mesh: HalfEdgeMesh = HalfEdgeMesh::new(MeshConfig::with_vertex_capacity(capacity))?;

        let f0 = mesh.insert_face(lo, Vec2::new(hi.x, lo.y), hi, ());
        let f1 = mesh.insert_face(lo, hi, Vec2::new(lo.x, hi.y), ());
        if f0 == INVALID || f1 == INVALID {
            return Err(DumpError::Degenerate { lo, hi }.into());
        }

        let mut rejected = 0usize;
        for &p in &self.points {
            if mesh.cdt_insert_point(p, true) == INVALID {
                rejected += 1;
            }
        }
        for &line in &self.lines {
            if !mesh.cdt_insert_edge(line, true) {
                rejected += 1;
            }
        }
        if rejected > 0 {
            warn!(rejected, "some dump inputs were not inserted");
        }
        mesh.validate_delaunay()?;
        debug!(
            vertices = mesh.vertex_count(),
            faces = mesh.face_count(),
            "dump triangulated"
        );
        Ok(DumpMesh { mesh, rejected })
    }

    /// Axis-aligned bounds of every point and line endpoint.
    pub fn bounds(&self) -> Option<(Vec2, Vec2)> {
        let mut all = self
            .points
            .iter()
            .copied()
            .chain(self.lines.iter().flat_map(|l| [l.a, l.b]));
        let first = all.next()?;
        Some(all.fold((first, first), |(lo, hi), p| {
            (
                Vec2::new(lo.x.min(p.x), lo.y.min(p.y)),
                Vec2::new(hi.x.max(p.x), hi.y.max(p.y)),
            )
        }))
    }
}
