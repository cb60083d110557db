#![warn(missing_docs)]

//! Triangulated cortical surface meshes and their derived structures.
//!
//! Provides:
//! - [`SurfaceMesh`]: an immutable vertex/triangle mesh with cached
//!   per-vertex normals
//! - [`TopologyHelper`]: per-edge tile adjacency and per-vertex incident
//!   edge lists, built once per mesh
//! - [`NodeLocator`]: a uniform hash-grid index for nearest-vertex queries
//! - [`GeodesicHelper`]: shortest-path-along-edges distances between
//!   vertices
//!
//! All of these are read-only once built, so independent projection and
//! tracing operations may share them across threads.

mod geodesic;
mod locator;
mod mesh;
mod topology;

pub use geodesic::GeodesicHelper;
pub use locator::NodeLocator;
pub use mesh::{SurfaceError, SurfaceMesh, SurfaceShape};
pub use topology::{EdgeInfo, TileRef, TopologyHelper};

#[cfg(test)]
pub(crate) mod test_meshes {
    use super::SurfaceMesh;
    use cortex_math::Point3;

    /// Unit square in the XY plane, split along the 0-2 diagonal.
    ///
    /// Vertices: (0,0,0), (1,0,0), (1,1,0), (0,1,0).
    /// Triangles: (0,1,2), (0,2,3).
    pub fn flat_square() -> SurfaceMesh {
        SurfaceMesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
        .unwrap()
    }

    /// Regular octahedron centered at the origin, radius 1.
    ///
    /// A small closed sphere-like mesh: every edge is interior, every
    /// vertex has four incident triangles.
    pub fn octahedron() -> SurfaceMesh {
        SurfaceMesh::new(
            vec![
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(-1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.0, -1.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
                Point3::new(0.0, 0.0, -1.0),
            ],
            vec![
                [0, 2, 4],
                [2, 1, 4],
                [1, 3, 4],
                [3, 0, 4],
                [2, 0, 5],
                [1, 2, 5],
                [3, 1, 5],
                [0, 3, 5],
            ],
        )
        .unwrap()
    }

    /// A strip of four triangles in the XY plane over a 3x2 grid of
    /// vertices. Useful for open-boundary tracing tests.
    ///
    /// ```text
    /// 3 --- 4 --- 5
    /// | \   | \   |
    /// |   \ |   \ |
    /// 0 --- 1 --- 2
    /// ```
    pub fn flat_strip() -> SurfaceMesh {
        SurfaceMesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(2.0, 1.0, 0.0),
            ],
            vec![[0, 1, 3], [1, 4, 3], [1, 2, 4], [2, 5, 4]],
        )
        .unwrap()
    }
}
