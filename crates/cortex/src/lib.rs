#![warn(missing_docs)]

//! cortex — cortical surface mesh processing
//!
//! Projects free 3D points onto triangulated brain surfaces, keeps the
//! resulting projections valid across deformed versions of the same
//! surface (inflated, flattened, spherical), traces borders along the
//! boundaries of per-vertex regions, and measures border lengths along
//! the mesh rather than through space.
//!
//! # Example
//!
//! ```rust
//! use cortex::{Point3, SurfaceMesh, SurfaceProjector, TopologyHelper};
//!
//! let mesh = SurfaceMesh::new(
//!     vec![
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(1.0, 1.0, 0.0),
//!         Point3::new(0.0, 1.0, 0.0),
//!     ],
//!     vec![[0, 1, 2], [0, 2, 3]],
//! )
//! .unwrap();
//! let topology = TopologyHelper::new(&mesh);
//! let projector = SurfaceProjector::new(&mesh, &topology);
//!
//! let projection = projector.project(&Point3::new(0.6, 0.3, 0.25)).unwrap();
//! let on_surface = projection.unproject(&mesh).unwrap();
//! assert!((on_surface - Point3::new(0.6, 0.3, 0.0)).norm() < 1e-9);
//! ```

pub use cortex_math::{Point3, Tolerance, Vec3};

pub use cortex_surface::{
    EdgeInfo, GeodesicHelper, NodeLocator, SurfaceError, SurfaceMesh, SurfaceShape, TileRef,
    TopologyHelper,
};

pub use cortex_proj::{
    BarycentricProjection, ProjectionError, SurfaceProjection, SurfaceProjector,
    VanEssenProjection,
};

pub use cortex_border::{
    Border, BorderError, BorderLengthMeasurer, BorderSet, BorderTracer,
};

/// Math primitives shared by the surface and projection layers.
pub mod math {
    pub use cortex_math::*;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_facade_end_to_end() {
        let mesh = SurfaceMesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
        .unwrap();
        let topology = TopologyHelper::new(&mesh);

        let projector = SurfaceProjector::new(&mesh, &topology);
        let p1 = projector.project(&Point3::new(0.8, 0.1, 0.0)).unwrap();
        let p2 = projector.project(&Point3::new(0.2, 0.9, 0.0)).unwrap();
        assert!(p1.is_valid() && p2.is_valid());

        let mut border = Border::new("diag");
        border.push_point(p1);
        border.push_point(p2);

        let len = BorderLengthMeasurer::new(&mesh, &topology)
            .length(&border)
            .unwrap();
        // Both triangles are coplanar, so the on-mesh length equals the
        // straight distance
        let expected = (Point3::new(0.2, 0.9, 0.0) - Point3::new(0.8, 0.1, 0.0)).norm();
        assert_abs_diff_eq!(len, expected, epsilon = 1e-9);
    }
}
