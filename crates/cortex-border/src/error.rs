//! Error types for border operations.

use cortex_proj::ProjectionError;
use thiserror::Error;

/// Errors that can occur during border tracing and measurement.
#[derive(Error, Debug)]
pub enum BorderError {
    /// A border point could not be projected or unprojected.
    #[error(transparent)]
    Projection(#[from] ProjectionError),

    /// The area-correction array does not cover every mesh node.
    #[error("area correction has {actual} entries but mesh has {expected} nodes")]
    AreaCorrectionLength {
        /// Node count of the mesh.
        expected: usize,
        /// Length of the supplied array.
        actual: usize,
    },

    /// No geodesic path exists between two vertices (disconnected mesh).
    #[error("no geodesic path between nodes {from} and {to}")]
    NoPath {
        /// Source vertex.
        from: usize,
        /// Target vertex.
        to: usize,
    },

    /// The mesh has no triangles to trace over.
    #[error("mesh has no triangles")]
    EmptyMesh,
}

/// Result type for border operations.
pub type Result<T> = std::result::Result<T, BorderError>;
