//! Barycentric projection onto a mesh triangle.

use cortex_math::{Point3, Vec3};
use cortex_surface::SurfaceMesh;
use serde::{Deserialize, Serialize};

/// A point anchored to a mesh triangle by barycentric weights, plus a
/// signed offset along the interpolated normal.
///
/// The weights are named "areas" in the legacy border format because in
/// the common case `weight[i]` is proportional to the area of the
/// sub-triangle opposite vertex `i`; negative weights are allowed for
/// extrapolated or degenerate points. Plain value semantics: copying
/// duplicates the three node ids, three weights, and flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarycentricProjection {
    /// The triangle's three vertex ids.
    pub nodes: [usize; 3],
    /// Barycentric weights over `nodes`, normally summing to ~1.
    pub weights: [f64; 3],
    /// Signed offset along the weight-blended vertex normal.
    pub signed_distance_above_surface: f64,
    /// Whether this projection holds usable data.
    pub valid: bool,
    /// Node count of the surface this projection was made on, checked at
    /// unprojection time when present.
    pub surface_node_count: Option<usize>,
}

impl BarycentricProjection {
    /// Create a valid projection onto the triangle `nodes` with the given
    /// weights and zero offset.
    pub fn new(nodes: [usize; 3], weights: [f64; 3]) -> Self {
        Self {
            nodes,
            weights,
            signed_distance_above_surface: 0.0,
            valid: true,
            surface_node_count: None,
        }
    }

    /// An invalid placeholder projection.
    pub fn invalid() -> Self {
        Self {
            nodes: [0; 3],
            weights: [0.0; 3],
            signed_distance_above_surface: 0.0,
            valid: false,
            surface_node_count: None,
        }
    }

    /// Set the triangle vertex ids.
    pub fn set_triangle_nodes(&mut self, nodes: [usize; 3]) {
        self.nodes = nodes;
    }

    /// Set the barycentric weights ("areas" in the legacy naming).
    pub fn set_triangle_areas(&mut self, weights: [f64; 3]) {
        self.weights = weights;
    }

    /// Set the signed offset above the surface.
    pub fn set_signed_distance_above_surface(&mut self, d: f64) {
        self.signed_distance_above_surface = d;
    }

    /// Mark the projection valid or invalid.
    pub fn set_valid(&mut self, valid: bool) {
        self.valid = valid;
    }

    /// Record the node count of the surface the projection was made on.
    pub fn set_surface_node_count(&mut self, count: usize) {
        self.surface_node_count = Some(count);
    }

    /// The weight-blended vertex normal (not normalized).
    pub fn interpolated_normal(&self, mesh: &SurfaceMesh) -> Vec3 {
        let mut n = Vec3::zeros();
        for i in 0..3 {
            n += self.weights[i] * mesh.vertex_normal(self.nodes[i]);
        }
        n
    }

    /// Reconstruct the 3D position on `mesh`.
    ///
    /// Returns `None` when the projection is invalid or was made on a
    /// surface with a different node count. The position is the convex
    /// combination of the triangle's vertex coordinates, offset along the
    /// interpolated normal by the stored signed distance when
    /// `use_stored_offset` is set, otherwise by `offset_above`.
    pub fn unproject(
        &self,
        mesh: &SurfaceMesh,
        offset_above: f64,
        use_stored_offset: bool,
    ) -> Option<Point3> {
        if !self.valid {
            return None;
        }
        if let Some(count) = self.surface_node_count {
            if count != mesh.node_count() {
                return None;
            }
        }
        if self.nodes.iter().any(|&n| n >= mesh.node_count()) {
            return None;
        }

        let mut xyz = Vec3::zeros();
        for i in 0..3 {
            xyz += self.weights[i] * mesh.coord(self.nodes[i]).coords;
        }

        let offset = if use_stored_offset {
            self.signed_distance_above_surface
        } else {
            offset_above
        };
        if offset != 0.0 {
            let n = self.interpolated_normal(mesh);
            let len = n.norm();
            if len > 1e-12 {
                xyz += n * (offset / len);
            }
        }

        Some(Point3::from(xyz))
    }
}
