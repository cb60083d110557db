//! The triangulated surface mesh.

use cortex_math::{triangle_normal, Point3, Vec3};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

/// Errors raised while constructing a surface mesh.
#[derive(Error, Debug)]
pub enum SurfaceError {
    /// A triangle references a vertex index outside the coordinate array.
    #[error("triangle {triangle} references vertex {vertex} but mesh has {node_count} nodes")]
    VertexOutOfRange {
        /// Offending triangle index.
        triangle: usize,
        /// Offending vertex id.
        vertex: usize,
        /// Number of nodes in the mesh.
        node_count: usize,
    },

    /// A triangle repeats a vertex index.
    #[error("triangle {triangle} has repeated vertex {vertex}")]
    DegenerateTriangle {
        /// Offending triangle index.
        triangle: usize,
        /// The repeated vertex id.
        vertex: usize,
    },
}

/// Hint describing the overall shape of a surface, used by the point
/// locator to pick an appropriate enclosure test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SurfaceShape {
    /// Planar surface (flat map); enclosure is tested in the XY plane.
    Flat,
    /// Spherical surface; query points are radially scaled onto the
    /// sphere before testing.
    Sphere,
    /// General 3D anatomical surface.
    #[default]
    Anatomical,
}

/// An immutable triangulated surface: vertex coordinates indexed by node
/// id and triangles as vertex-index triples.
///
/// Per-vertex normals are derived data, computed on first use and cached;
/// a shared `&SurfaceMesh` is safe to use from many threads at once.
#[derive(Debug, Serialize, Deserialize)]
#[serde(try_from = "RawMesh")]
pub struct SurfaceMesh {
    coords: Vec<[f64; 3]>,
    triangles: Vec<[usize; 3]>,
    #[serde(skip)]
    normals: OnceLock<Vec<Vec3>>,
}

/// Deserialization stage for [`SurfaceMesh`], so untrusted input passes
/// through the same validation as [`SurfaceMesh::new`].
#[derive(Deserialize)]
struct RawMesh {
    coords: Vec<[f64; 3]>,
    triangles: Vec<[usize; 3]>,
}

impl TryFrom<RawMesh> for SurfaceMesh {
    type Error = SurfaceError;

    fn try_from(raw: RawMesh) -> Result<Self, SurfaceError> {
        let coords = raw
            .coords
            .iter()
            .map(|c| Point3::new(c[0], c[1], c[2]))
            .collect();
        SurfaceMesh::new(coords, raw.triangles)
    }
}

impl SurfaceMesh {
    /// Create a mesh from vertex coordinates and triangle index triples.
    ///
    /// Every triangle must reference three distinct, in-range vertices.
    pub fn new(
        coords: Vec<Point3>,
        triangles: Vec<[usize; 3]>,
    ) -> Result<Self, SurfaceError> {
        let node_count = coords.len();
        for (t, tri) in triangles.iter().enumerate() {
            for &v in tri {
                if v >= node_count {
                    return Err(SurfaceError::VertexOutOfRange {
                        triangle: t,
                        vertex: v,
                        node_count,
                    });
                }
            }
            if tri[0] == tri[1] || tri[1] == tri[2] || tri[0] == tri[2] {
                let vertex = if tri[0] == tri[1] { tri[0] } else { tri[2] };
                return Err(SurfaceError::DegenerateTriangle {
                    triangle: t,
                    vertex,
                });
            }
        }
        Ok(Self {
            coords: coords.iter().map(|p| [p.x, p.y, p.z]).collect(),
            triangles,
            normals: OnceLock::new(),
        })
    }

    /// Number of vertices (nodes).
    pub fn node_count(&self) -> usize {
        self.coords.len()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Coordinate of node `i`.
    pub fn coord(&self, i: usize) -> Point3 {
        let c = self.coords[i];
        Point3::new(c[0], c[1], c[2])
    }

    /// Vertex indices of triangle `t`, in stored winding order.
    pub fn triangle(&self, t: usize) -> [usize; 3] {
        self.triangles[t]
    }

    /// All triangles.
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    /// Unit normal of triangle `t`, or `None` for a zero-area triangle.
    pub fn triangle_normal(&self, t: usize) -> Option<Vec3> {
        let [a, b, c] = self.triangles[t];
        triangle_normal(&self.coord(a), &self.coord(b), &self.coord(c))
    }

    /// Per-vertex normals: the normalized sum of incident triangle
    /// normals. Computed on first call, then cached.
    pub fn normals(&self) -> &[Vec3] {
        self.normals.get_or_init(|| {
            let mut acc = vec![Vec3::zeros(); self.coords.len()];
            for t in 0..self.triangles.len() {
                if let Some(n) = self.triangle_normal(t) {
                    for &v in &self.triangles[t] {
                        acc[v] += n;
                    }
                }
            }
            for n in &mut acc {
                let len = n.norm();
                if len > 1e-12 {
                    *n /= len;
                } else {
                    *n = Vec3::z();
                }
            }
            acc
        })
    }

    /// Normal of node `i`.
    pub fn vertex_normal(&self, i: usize) -> Vec3 {
        self.normals()[i]
    }

    /// Axis-aligned bounding box `(min, max)` of all vertices.
    ///
    /// Returns a degenerate box at the origin for an empty mesh.
    pub fn bounding_box(&self) -> (Point3, Point3) {
        let mut min = Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
        let mut max = Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
        if self.coords.is_empty() {
            return (Point3::origin(), Point3::origin());
        }
        for c in &self.coords {
            for k in 0..3 {
                min[k] = min[k].min(c[k]);
                max[k] = max[k].max(c[k]);
            }
        }
        (min, max)
    }

    /// Mean length of all triangle edges (each shared edge counted once
    /// per triangle). Zero for a mesh without triangles.
    pub fn average_edge_length(&self) -> f64 {
        if self.triangles.is_empty() {
            return 0.0;
        }
        let mut total = 0.0;
        for tri in &self.triangles {
            let [a, b, c] = *tri;
            total += (self.coord(a) - self.coord(b)).norm();
            total += (self.coord(b) - self.coord(c)).norm();
            total += (self.coord(c) - self.coord(a)).norm();
        }
        total / (self.triangles.len() * 3) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_meshes;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_rejects_out_of_range_vertex() {
        let err = SurfaceMesh::new(
            vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)],
            vec![[0, 1, 2]],
        );
        assert!(matches!(err, Err(SurfaceError::VertexOutOfRange { .. })));
    }

    #[test]
    fn test_rejects_repeated_vertex() {
        let err = SurfaceMesh::new(
            vec![
                Point3::origin(),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 1]],
        );
        assert!(matches!(err, Err(SurfaceError::DegenerateTriangle { .. })));
    }

    #[test]
    fn test_flat_mesh_normals_point_up() {
        let mesh = test_meshes::flat_square();
        for i in 0..mesh.node_count() {
            let n = mesh.vertex_normal(i);
            assert_abs_diff_eq!(n.z, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_octahedron_normals_are_radial() {
        let mesh = test_meshes::octahedron();
        for i in 0..mesh.node_count() {
            let n = mesh.vertex_normal(i);
            let radial = mesh.coord(i).coords.normalize();
            // Normal and radial direction agree for a convex solid
            assert!(n.dot(&radial) > 0.9);
        }
    }

    #[test]
    fn test_bounding_box_and_edge_length() {
        let mesh = test_meshes::flat_square();
        let (min, max) = mesh.bounding_box();
        assert_abs_diff_eq!(min.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(max.y, 1.0, epsilon = 1e-12);
        // 4 unit edges and 2 diagonals of sqrt(2), each diagonal counted twice
        let expected = (4.0 + 2.0 * 2.0_f64.sqrt()) / 6.0;
        assert_abs_diff_eq!(mesh.average_edge_length(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_serde_round_trip_skips_normals() {
        let mesh = test_meshes::flat_square();
        let _ = mesh.normals();
        let json = serde_json::to_string(&mesh).unwrap();
        let back: SurfaceMesh = serde_json::from_str(&json).unwrap();
        assert_eq!(back.node_count(), 4);
        assert_eq!(back.triangle_count(), 2);
        assert_abs_diff_eq!(back.vertex_normal(0).z, 1.0, epsilon = 1e-12);
    }
}
