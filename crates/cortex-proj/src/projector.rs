//! Point locator: maps arbitrary 3D points to surface projections.

use crate::{
    BarycentricProjection, ProjectionError, Result, SurfaceProjection, VanEssenProjection,
};
use cortex_math::{barycentric_weights, Point3};
use cortex_surface::{NodeLocator, SurfaceMesh, SurfaceShape, TopologyHelper};
use log::{debug, trace};
use rayon::prelude::*;

/// Default barycentric-weight slack for degenerate classification.
///
/// Preserved from the calibration the legacy border data was generated
/// with, so existing borders regenerate identically.
pub const DEFAULT_TOLERANCE: f64 = -0.01;

/// A candidate enclosing triangle found during the search.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    tile: usize,
    weights: [f64; 3],
    min_weight: f64,
}

/// Maps 3D points onto a mesh as barycentric (preferred) or Van Essen
/// (edge/vertex fallback) projections.
///
/// Holds only read-only references plus a vertex index; one projector
/// may serve many threads, and [`project_points`](Self::project_points)
/// does so internally.
pub struct SurfaceProjector<'a> {
    mesh: &'a SurfaceMesh,
    topology: &'a TopologyHelper,
    locator: NodeLocator,
    shape: SurfaceShape,
    tolerance: f64,
    allow_edge_projection: bool,
    /// Mean vertex radius, for the spherical query adjustment.
    sphere_radius: f64,
    /// Mean vertex z, for the flat query adjustment.
    flat_z: f64,
}

impl<'a> SurfaceProjector<'a> {
    /// Create a projector for `mesh` with default options: anatomical
    /// shape, tolerance [`DEFAULT_TOLERANCE`], barycentric-only output.
    pub fn new(mesh: &'a SurfaceMesh, topology: &'a TopologyHelper) -> Self {
        let n = mesh.node_count();
        let mut sphere_radius = 0.0;
        let mut flat_z = 0.0;
        if n > 0 {
            for i in 0..n {
                let c = mesh.coord(i);
                sphere_radius += c.coords.norm();
                flat_z += c.z;
            }
            sphere_radius /= n as f64;
            flat_z /= n as f64;
        }
        Self {
            mesh,
            topology,
            locator: NodeLocator::new(mesh),
            shape: SurfaceShape::Anatomical,
            tolerance: DEFAULT_TOLERANCE,
            allow_edge_projection: false,
            sphere_radius,
            flat_z,
        }
    }

    /// Set the surface-shape hint used to condition query points.
    pub fn surface_shape(mut self, shape: SurfaceShape) -> Self {
        self.shape = shape;
        self
    }

    /// Set the degenerate-classification tolerance (a negative
    /// barycentric-weight slack; see [`DEFAULT_TOLERANCE`]).
    ///
    /// One shared value drives both boundary slack and edge/vertex
    /// classification, so a point exactly on an edge is claimed by
    /// exactly one representation.
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Allow Van Essen output for points that resolve to an edge or
    /// vertex instead of forcing a clamped barycentric projection.
    pub fn allow_edge_projection(mut self, allow: bool) -> Self {
        self.allow_edge_projection = allow;
        self
    }

    /// Condition a query point according to the shape hint.
    fn adjust_query(&self, point: &Point3) -> Point3 {
        match self.shape {
            SurfaceShape::Anatomical => *point,
            SurfaceShape::Flat => Point3::new(point.x, point.y, self.flat_z),
            SurfaceShape::Sphere => {
                let r = point.coords.norm();
                if r > 1e-12 && self.sphere_radius > 0.0 {
                    Point3::from(point.coords * (self.sphere_radius / r))
                } else {
                    *point
                }
            }
        }
    }

    /// Barycentric weights of `point` against tile `tile`, if the tile
    /// is non-degenerate.
    fn tile_weights(&self, point: &Point3, tile: usize) -> Option<[f64; 3]> {
        let [a, b, c] = self.mesh.triangle(tile);
        barycentric_weights(
            point,
            &self.mesh.coord(a),
            &self.mesh.coord(b),
            &self.mesh.coord(c),
        )
    }

    fn candidate(&self, point: &Point3, tile: usize) -> Option<Candidate> {
        let weights = self.tile_weights(point, tile)?;
        let min_weight = weights[0].min(weights[1]).min(weights[2]);
        if min_weight >= self.tolerance {
            Some(Candidate {
                tile,
                weights,
                min_weight,
            })
        } else {
            None
        }
    }

    /// Project `point` onto the surface.
    ///
    /// Searches outward from the nearest vertex one topological ring at
    /// a time. Fails with [`ProjectionError::ProjectionFailed`] when no
    /// triangle anywhere on the mesh encloses the point's in-plane
    /// position — a garbage projection is never returned.
    pub fn project(&self, point: &Point3) -> Result<SurfaceProjection> {
        if self.mesh.triangle_count() == 0 {
            return Err(ProjectionError::EmptyMesh);
        }

        let query = self.adjust_query(point);
        let nearest = self
            .locator
            .nearest_node(self.mesh, &query)
            .ok_or(ProjectionError::EmptyMesh)?;
        trace!("projecting {:?}: nearest node {}", point, nearest);

        let mut node_seen = vec![false; self.mesh.node_count()];
        let mut tile_seen = vec![false; self.mesh.triangle_count()];
        let mut frontier = vec![nearest];
        node_seen[nearest] = true;

        while !frontier.is_empty() {
            let mut candidates: Vec<Candidate> = Vec::new();
            for &node in &frontier {
                for tile in self.topology.node_tiles(node) {
                    if tile_seen[tile] {
                        continue;
                    }
                    tile_seen[tile] = true;
                    if let Some(c) = self.candidate(&query, tile) {
                        candidates.push(c);
                    }
                }
            }

            if !candidates.is_empty() {
                return self.resolve(point, &query, candidates);
            }

            // Expand one topological ring
            let mut next = Vec::new();
            for &node in &frontier {
                for neighbor in self.topology.node_neighbors(node) {
                    if !node_seen[neighbor] {
                        node_seen[neighbor] = true;
                        next.push(neighbor);
                    }
                }
            }
            next.sort_unstable();
            frontier = next;
        }

        debug!("projection failed for {:?}", point);
        Err(ProjectionError::ProjectionFailed {
            point: [point.x, point.y, point.z],
        })
    }

    /// Pick the output representation from the candidate set.
    fn resolve(
        &self,
        point: &Point3,
        query: &Point3,
        mut candidates: Vec<Candidate>,
    ) -> Result<SurfaceProjection> {
        // Deterministic: best weight first, lowest tile id on ties
        candidates.sort_by(|a, b| {
            b.min_weight
                .partial_cmp(&a.min_weight)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.tile.cmp(&b.tile))
        });
        let best = candidates[0];

        // On-boundary band: within -tolerance of zero on some weight and
        // claimed by more than one triangle
        let degenerate = candidates.len() >= 2 && best.min_weight <= -self.tolerance;

        if degenerate && self.allow_edge_projection {
            if let Some(proj) = self.edge_projection(query, &best) {
                return Ok(SurfaceProjection::VanEssen(proj));
            }
        }

        Ok(SurfaceProjection::Barycentric(
            self.barycentric(point, &best),
        ))
    }

    /// Build the Van Essen representation for a point on the boundary of
    /// `best`. The crossed feature is read off the near-zero weights: one
    /// near-zero weight names an edge, two name a vertex (lowest incident
    /// edge of the vertex is used, keeping the choice deterministic).
    fn edge_projection(&self, query: &Point3, best: &Candidate) -> Option<VanEssenProjection> {
        let nodes = self.mesh.triangle(best.tile);
        let band = -self.tolerance;
        let mut zeroed: Vec<usize> = (0..3).filter(|&i| best.weights[i] <= band).collect();

        let edge_id = match zeroed.len() {
            1 => {
                let a = nodes[(zeroed[0] + 1) % 3];
                let b = nodes[(zeroed[0] + 2) % 3];
                self.topology.edge_between(a, b)?
            }
            2 => {
                // Vertex case: the one well-supported corner
                zeroed.sort_unstable();
                let corner = (0..3).find(|i| !zeroed.contains(i))?;
                let vertex = nodes[corner];
                *self.topology.node_edges(vertex).first()?
            }
            _ => return None,
        };

        VanEssenProjection::from_edge(self.mesh, self.topology, edge_id, query)
    }

    /// Build the barycentric representation from a candidate, clamping
    /// boundary-band negatives to zero and recording the signed height
    /// of the original query point above the triangle plane.
    fn barycentric(&self, point: &Point3, best: &Candidate) -> BarycentricProjection {
        let mut weights = best.weights;
        for w in &mut weights {
            if *w < 0.0 {
                *w = 0.0;
            }
        }
        let sum: f64 = weights.iter().sum();
        if sum > 1e-12 {
            for w in &mut weights {
                *w /= sum;
            }
        }

        let mut proj = BarycentricProjection::new(self.mesh.triangle(best.tile), weights);
        proj.set_surface_node_count(self.mesh.node_count());

        // Signed height along the interpolated normal
        if let Some(on_surface) = proj.unproject(self.mesh, 0.0, false) {
            let n = proj.interpolated_normal(self.mesh);
            let len = n.norm();
            if len > 1e-12 {
                proj.set_signed_distance_above_surface((point - on_surface).dot(&n) / len);
            }
        }
        proj
    }

    /// Project many points in parallel over the shared read-only mesh.
    pub fn project_points(&self, points: &[Point3]) -> Vec<Result<SurfaceProjection>> {
        points.par_iter().map(|p| self.project(p)).collect()
    }
}
