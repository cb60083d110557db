//! Edge-unfold ("Van Essen") projection.

use cortex_math::{dihedral_angle, segment_fraction, Point3, Vec3};
use cortex_surface::{SurfaceMesh, TopologyHelper};
use serde::{Deserialize, Serialize};

/// Fallback projection for points that resolve to a mesh edge or vertex
/// rather than a single triangle interior.
///
/// Stores, for each of the two triangles adjacent to the crossed edge,
/// the vertex ids and anatomical coordinates in the order
/// `[edge start, edge end, third vertex]`, plus the polar parameters of
/// the point relative to the edge: distance `d_r` from the edge anchor,
/// angle `theta_r` around the edge measured from the first triangle's
/// plane, the angle `phi_r` between the two triangles' frame normals on
/// the anatomical surface, and the fractional anchor positions
/// `frac_ri`/`frac_rj` measured from either end of the edge.
///
/// Unprojection rebuilds the edge from the current surface coordinates,
/// rescales `theta_r` by the current-to-anatomical dihedral ratio, and
/// offsets the anchor by `d_r` — so the point unfolds consistently as
/// the surface deforms, and reproduces the original position exactly on
/// the undeformed surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VanEssenProjection {
    /// Vertex ids of the two adjacent triangles, `[tri][corner]`.
    pub triangle_nodes: [[usize; 3]; 2],
    /// Anatomical coordinates matching `triangle_nodes`.
    pub triangle_coords: [[[f64; 3]; 3]; 2],
    /// Distance of the point from its anchor on the edge.
    pub d_r: f64,
    /// Polar angle of the point around the edge, from triangle 0's plane.
    pub theta_r: f64,
    /// Angle between the two triangles' frame normals on the anatomical
    /// surface. Both frames share the edge direction, so a coplanar
    /// interior pair stores `pi`; a boundary edge (single tile stored
    /// twice) stores 0.
    pub phi_r: f64,
    /// Anchor fraction along the edge, measured from the edge start.
    pub frac_ri: f64,
    /// Anchor fraction along the edge, measured from the edge end.
    pub frac_rj: f64,
    /// Whether this projection holds usable data.
    pub valid: bool,
    /// Node count of the surface this projection was made on.
    pub surface_node_count: Option<usize>,
}

/// Frame of the shared edge in one triangle: unit edge direction, the
/// in-plane unit perpendicular pointing away from the third vertex, and
/// the triangle normal.
fn edge_frame(ci: &Point3, cj: &Point3, third: &Point3) -> Option<(Vec3, Vec3, Vec3)> {
    let e = cj - ci;
    let e_len = e.norm();
    if e_len < 1e-12 {
        return None;
    }
    let e = e / e_len;

    let n = e.cross(&(third - ci));
    let n_len = n.norm();
    if n_len < 1e-12 {
        return None;
    }
    let n = n / n_len;

    // In-plane perpendicular, oriented away from the third vertex
    let w = third - ci;
    let mut u = w - e * w.dot(&e);
    let u_len = u.norm();
    if u_len < 1e-12 {
        return None;
    }
    u = -u / u_len;

    Some((e, u, n))
}

impl VanEssenProjection {
    /// An invalid placeholder projection.
    pub fn invalid() -> Self {
        Self {
            triangle_nodes: [[0; 3]; 2],
            triangle_coords: [[[0.0; 3]; 3]; 2],
            d_r: 0.0,
            theta_r: 0.0,
            phi_r: 0.0,
            frac_ri: 0.0,
            frac_rj: 0.0,
            valid: false,
            surface_node_count: None,
        }
    }

    /// Project `point` onto edge `edge_id` of `mesh`.
    ///
    /// For a boundary edge the single adjacent triangle is stored twice
    /// and the dihedral angle is zero. Returns `None` when the edge's
    /// geometry is degenerate.
    pub fn from_edge(
        mesh: &SurfaceMesh,
        topology: &TopologyHelper,
        edge_id: usize,
        point: &Point3,
    ) -> Option<Self> {
        let edge = topology.edge(edge_id);
        let i = edge.node1;
        let j = edge.node2;
        let third0 = edge.tile(0)?.third_node;
        let third1 = edge.tile(1).map_or(third0, |t| t.third_node);

        let ci = mesh.coord(i);
        let cj = mesh.coord(j);
        let c_third0 = mesh.coord(third0);
        let c_third1 = mesh.coord(third1);

        let (_, u, n0) = edge_frame(&ci, &cj, &c_third0)?;
        let n1 = edge_frame(&ci, &cj, &c_third1).map_or(n0, |(_, _, n)| n);

        let frac = segment_fraction(point, &ci, &cj);
        let anchor = ci + (cj - ci) * frac;
        let offset = point - anchor;
        let d_r = offset.norm();
        let theta_r = if d_r > 1e-12 {
            offset.dot(&n0).atan2(offset.dot(&u))
        } else {
            0.0
        };

        let coords_of = |id: usize| {
            let c = mesh.coord(id);
            [c.x, c.y, c.z]
        };

        Some(Self {
            triangle_nodes: [[i, j, third0], [i, j, third1]],
            triangle_coords: [
                [coords_of(i), coords_of(j), coords_of(third0)],
                [coords_of(i), coords_of(j), coords_of(third1)],
            ],
            d_r,
            theta_r,
            phi_r: dihedral_angle(&n0, &n1),
            frac_ri: frac,
            frac_rj: 1.0 - frac,
            valid: true,
            surface_node_count: Some(mesh.node_count()),
        })
    }

    /// Mark the projection valid or invalid.
    pub fn set_valid(&mut self, valid: bool) {
        self.valid = valid;
    }

    fn stored_coord(&self, tri: usize, corner: usize) -> Point3 {
        let c = self.triangle_coords[tri][corner];
        Point3::new(c[0], c[1], c[2])
    }

    /// Reconstruct the 3D position on `mesh`.
    ///
    /// Uses the current surface coordinates of the stored vertex ids when
    /// they are applicable, so the point follows a deformed surface;
    /// falls back to the stored anatomical coordinates when the mesh does
    /// not match the projection (different node count or out-of-range
    /// ids). Returns `None` for an invalid projection.
    pub fn unproject(&self, mesh: &SurfaceMesh) -> Option<Point3> {
        if !self.valid {
            return None;
        }

        let ids_ok = self
            .triangle_nodes
            .iter()
            .flatten()
            .all(|&n| n < mesh.node_count());
        let count_ok = self
            .surface_node_count
            .map_or(true, |c| c == mesh.node_count());
        let use_surface = ids_ok && count_ok;

        let corner = |tri: usize, k: usize| {
            if use_surface {
                mesh.coord(self.triangle_nodes[tri][k])
            } else {
                self.stored_coord(tri, k)
            }
        };

        let ci = corner(0, 0);
        let cj = corner(0, 1);
        let third0 = corner(0, 2);
        let third1 = corner(1, 2);

        let (_, u, n0) = edge_frame(&ci, &cj, &third0)?;
        let n1 = edge_frame(&ci, &cj, &third1).map_or(n0, |(_, _, n)| n);

        // Anchor from both ends; identical when the fractions are
        // complementary, averaged for robustness against stale data
        let from_i = ci + (cj - ci) * self.frac_ri;
        let from_j = cj + (ci - cj) * self.frac_rj;
        let anchor = Point3::from((from_i.coords + from_j.coords) * 0.5);

        // Rescale the polar angle by how much the fold has opened or
        // closed relative to the anatomical surface
        let phi_s = dihedral_angle(&n0, &n1);
        let theta_s = if self.phi_r.abs() > 1e-9 {
            self.theta_r * (phi_s / self.phi_r)
        } else {
            self.theta_r
        };

        Some(anchor + (u * theta_s.cos() + n0 * theta_s.sin()) * self.d_r)
    }
}
