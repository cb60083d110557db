//! cortex CLI - surface projection and border tools over JSON files.
//!
//! Meshes, point sets, regions, and borders are read and written as the
//! JSON forms of the library types, so results survive round trips
//! between commands.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use cortex::{
    Border, BorderLengthMeasurer, BorderSet, BorderTracer, Point3, SurfaceMesh, SurfaceProjection,
    SurfaceProjector, SurfaceShape, TopologyHelper,
};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "cortex")]
#[command(about = "Cortical surface projection and border tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ShapeArg {
    Flat,
    Sphere,
    Anatomical,
}

impl From<ShapeArg> for SurfaceShape {
    fn from(s: ShapeArg) -> Self {
        match s {
            ShapeArg::Flat => SurfaceShape::Flat,
            ShapeArg::Sphere => SurfaceShape::Sphere,
            ShapeArg::Anatomical => SurfaceShape::Anatomical,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Project 3D points onto a surface mesh
    Project {
        /// Mesh JSON file
        mesh: PathBuf,
        /// Points JSON file: an array of [x, y, z] triples
        points: PathBuf,
        /// Output JSON file of surface projections
        #[arg(short, long)]
        output: PathBuf,
        /// Overall surface shape hint
        #[arg(long, value_enum, default_value = "anatomical")]
        shape: ShapeArg,
        /// Degenerate-projection tolerance
        #[arg(long, allow_hyphen_values = true)]
        tolerance: Option<f64>,
        /// Produce edge-unfolded projections near triangle edges
        #[arg(long)]
        allow_edge_projection: bool,
    },
    /// Trace borders along the boundary of a vertex region
    Trace {
        /// Mesh JSON file
        mesh: PathBuf,
        /// Region JSON file: an array of vertex ids inside the region
        region: PathBuf,
        /// Output JSON file holding the traced border set
        #[arg(short, long)]
        output: PathBuf,
        /// Base name for the traced borders
        #[arg(long, default_value = "border")]
        name: String,
        /// Fractional placement of points along crossing edges (0..1)
        #[arg(long)]
        placement: Option<f64>,
    },
    /// Measure border lengths along the surface
    Length {
        /// Mesh JSON file
        mesh: PathBuf,
        /// Border set JSON file (output of `trace`)
        borders: PathBuf,
        /// Per-vertex area-correction JSON file: an array of ratios
        #[arg(long)]
        area_correction: Option<PathBuf>,
        /// Treat every border as closed regardless of its stored flag
        #[arg(long)]
        closed: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Project {
            mesh,
            points,
            output,
            shape,
            tolerance,
            allow_edge_projection,
        } => project_points(
            &mesh,
            &points,
            &output,
            shape.into(),
            tolerance,
            allow_edge_projection,
        ),
        Commands::Trace {
            mesh,
            region,
            output,
            name,
            placement,
        } => trace_region(&mesh, &region, &output, &name, placement),
        Commands::Length {
            mesh,
            borders,
            area_correction,
            closed,
        } => measure_lengths(&mesh, &borders, area_correction.as_deref(), closed),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    fs::write(path, text).with_context(|| format!("writing {}", path.display()))
}

fn read_mesh(path: &Path) -> Result<SurfaceMesh> {
    let mesh: SurfaceMesh = read_json(path)?;
    if mesh.triangle_count() == 0 {
        bail!("{}: mesh has no triangles", path.display());
    }
    Ok(mesh)
}

fn project_points(
    mesh_path: &Path,
    points_path: &Path,
    output: &Path,
    shape: SurfaceShape,
    tolerance: Option<f64>,
    allow_edge_projection: bool,
) -> Result<()> {
    let mesh = read_mesh(mesh_path)?;
    let coords: Vec<[f64; 3]> = read_json(points_path)?;
    let points: Vec<Point3> = coords
        .iter()
        .map(|c| Point3::new(c[0], c[1], c[2]))
        .collect();

    let topology = TopologyHelper::new(&mesh);
    let mut projector = SurfaceProjector::new(&mesh, &topology)
        .surface_shape(shape)
        .allow_edge_projection(allow_edge_projection);
    if let Some(t) = tolerance {
        projector = projector.tolerance(t);
    }

    let mut projections = Vec::with_capacity(points.len());
    let mut failures = 0usize;
    for result in projector.project_points(&points) {
        match result {
            Ok(p) => projections.push(p),
            Err(e) => {
                log::warn!("{}", e);
                failures += 1;
                projections.push(SurfaceProjection::Empty);
            }
        }
    }
    write_json(output, &projections)?;

    println!(
        "Projected {} points onto {} ({} nodes, {} triangles), {} failed",
        points.len(),
        mesh_path.display(),
        mesh.node_count(),
        mesh.triangle_count(),
        failures
    );
    Ok(())
}

fn trace_region(
    mesh_path: &Path,
    region_path: &Path,
    output: &Path,
    name: &str,
    placement: Option<f64>,
) -> Result<()> {
    let mesh = read_mesh(mesh_path)?;
    let ids: Vec<usize> = read_json(region_path)?;
    if let Some(&bad) = ids.iter().find(|&&v| v >= mesh.node_count()) {
        bail!(
            "{}: vertex id {} out of range (mesh has {} nodes)",
            region_path.display(),
            bad,
            mesh.node_count()
        );
    }
    let region: HashSet<usize> = ids.into_iter().collect();

    let topology = TopologyHelper::new(&mesh);
    let mut tracer = BorderTracer::new(&mesh, &topology);
    if let Some(p) = placement {
        tracer = tracer.placement(p);
    }
    let borders = tracer.trace(name, |v| region.contains(&v))?;

    let mut set = BorderSet::new();
    let mut closed = 0usize;
    for border in borders {
        if border.closed {
            closed += 1;
        }
        set.add_border(border);
    }
    write_json(output, &set)?;

    println!(
        "Traced {} border(s) ({} closed) around {} region vertices",
        set.len(),
        closed,
        region.len()
    );
    Ok(())
}

fn measure_lengths(
    mesh_path: &Path,
    borders_path: &Path,
    area_correction: Option<&Path>,
    force_closed: bool,
) -> Result<()> {
    let mesh = read_mesh(mesh_path)?;
    let set: BorderSet = read_json(borders_path)?;
    let correction: Option<Vec<f64>> = match area_correction {
        Some(path) => Some(read_json(path)?),
        None => None,
    };

    let topology = TopologyHelper::new(&mesh);
    let mut measurer = BorderLengthMeasurer::new(&mesh, &topology);
    if let Some(c) = correction.as_deref() {
        measurer = measurer.area_correction(c);
    }

    let mut total = 0.0;
    for border in set.borders() {
        let len = if force_closed && !border.closed {
            let mut b: Border = border.clone();
            b.closed = true;
            measurer.length(&b)?
        } else {
            measurer.length(border)?
        };
        total += len;
        println!("{:>12.4}  {}", len, border.name);
    }
    println!("{:>12.4}  total ({} borders)", total, set.len());
    Ok(())
}
