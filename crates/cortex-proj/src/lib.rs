#![warn(missing_docs)]

//! Surface projections for cortical meshes.
//!
//! A projected point is anchored to the mesh rather than stored as a raw
//! coordinate, so it stays attached under resampling and deformation.
//! Two representations exist:
//!
//! - [`BarycentricProjection`]: the preferred form, for points enclosed
//!   by a single triangle
//! - [`VanEssenProjection`]: the edge-unfold fallback, for points that
//!   resolve to an edge or vertex rather than a triangle interior
//!
//! [`SurfaceProjection`] is the tagged union over the two; consumers
//! attempt the barycentric form first and fall back to Van Essen.
//! [`SurfaceProjector`] maps arbitrary 3D points to projections.

mod barycentric;
mod error;
mod projection;
mod projector;
mod vanessen;

pub use barycentric::BarycentricProjection;
pub use error::{ProjectionError, Result};
pub use projection::SurfaceProjection;
pub use projector::SurfaceProjector;
pub use vanessen::VanEssenProjection;

#[cfg(test)]
pub(crate) mod test_meshes {
    use cortex_math::Point3;
    use cortex_surface::SurfaceMesh;

    /// Unit square in the XY plane, split along the 0-2 diagonal.
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

    /// A roof: two triangles folded 90 degrees along the shared edge 1-2.
    ///
    /// Triangle (0,1,2) lies in the XY plane; triangle (1,3,2) rises in Z.
    pub fn folded_pair() -> SurfaceMesh {
        SurfaceMesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(1.0, 0.0, 1.0),
            ],
            vec![[0, 1, 2], [1, 3, 2]],
        )
        .unwrap()
    }
}
