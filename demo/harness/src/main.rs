// Copyright 2025 Lars Brubaker
// License: MIT
//
// Load a point/line dump, triangulate it and optionally find a path.

use std::path::PathBuf;

use anyhow::{Context, Result};
use cdt_nav::{Dump, Line, NavPathfinder, PathfinderConfig, Real, Vec2};
use clap::{Args, Parser, Subcommand};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "cdt-nav-harness", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Triangulate a dump and print mesh statistics
    Run(RunArgs),
    /// Write a small demonstration dump
    Sample {
        /// Output file
        out: PathBuf,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Input dump file
    dump: PathBuf,

    /// Path start as `x,y`
    #[arg(long, value_parser = parse_point, requires = "to")]
    from: Option<Vec2>,

    /// Path goal as `x,y`
    #[arg(long, value_parser = parse_point, requires = "from")]
    to: Option<Vec2>,

    /// Agent radius
    #[arg(long, default_value_t = 0.0)]
    radius: f64,
}

fn parse_point(s: &str) -> Result<Vec2, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got `{s}`"))?;
    let x: f64 = x.trim().parse().map_err(|e| format!("bad x: {e}"))?;
    let y: f64 = y.trim().parse().map_err(|e| format!("bad y: {e}"))?;
    Ok(Vec2::from_f64(x, y))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cdt_nav=info".parse().context("bad log directive")?),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Sample { out } => {
            sample_dump()
                .write_to(&out)
                .with_context(|| format!("writing {}", out.display()))?;
            info!(path = %out.display(), "sample dump written");
            Ok(())
        }
    }
}

fn run(args: RunArgs) -> Result<()> {
    let dump = Dump::read_from(&args.dump).with_context(|| format!("reading {}", args.dump.display()))?;
    let built = dump
        .build_mesh(Real::ONE)
        .with_context(|| format!("triangulating {}", args.dump.display()))?;
    let mesh = built.mesh;

    println!(
        "vertices {}  edges {}  faces {}  rejected {}",
        mesh.vertex_count(),
        mesh.edge_count(),
        mesh.face_count(),
        built.rejected
    );

    let (Some(from), Some(to)) = (args.from, args.to) else {
        return Ok(());
    };
    let mut finder = NavPathfinder::for_mesh(PathfinderConfig::default(), &mesh)?;
    if !finder.find_path(&mesh, from, to, Real::from_f64(args.radius), false) {
        println!("no path");
        return Ok(());
    }
    println!("path ({} corridor edges):", finder.path_edges().len());
    for p in finder.path() {
        println!("  {:.4}, {:.4}", p.x.to_f64(), p.y.to_f64());
    }
    Ok(())
}

/// A room split by a wall with a doorway, plus a pillar.
fn sample_dump() -> Dump {
    let p = |x, y| Vec2::from_ints(x, y);
    Dump {
        points: vec![p(0, 0), p(20, 0), p(20, 20), p(0, 20)],
        lines: vec![
            Line::new(p(0, 10), p(8, 10)),
            Line::new(p(11, 10), p(20, 10)),
            Line::new(p(14, 14), p(16, 14)),
            Line::new(p(16, 14), p(16, 16)),
            Line::new(p(16, 16), p(14, 16)),
            Line::new(p(14, 16), p(14, 14)),
        ],
    }
}
