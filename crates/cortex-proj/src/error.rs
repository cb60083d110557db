//! Error types for surface projection.

use thiserror::Error;

/// Errors that can occur while projecting points to a surface.
#[derive(Error, Debug)]
pub enum ProjectionError {
    /// No enclosing triangle and no valid edge/vertex fallback exists for
    /// the query point.
    #[error("no projection found for point ({0}, {1}, {2})", point[0], point[1], point[2])]
    ProjectionFailed {
        /// The offending query coordinate.
        point: [f64; 3],
    },

    /// A projection was unprojected against a surface with a different
    /// node count than the one it was created on.
    #[error("projection was made on a surface with {expected} nodes, not {actual}")]
    NodeCountMismatch {
        /// Node count recorded at projection time.
        expected: usize,
        /// Node count of the surface given to unproject.
        actual: usize,
    },

    /// Unprojection was attempted on an invalid or empty projection.
    #[error("projection is not valid")]
    InvalidProjection,

    /// The target mesh has no triangles.
    #[error("mesh has no triangles")]
    EmptyMesh,
}

/// Result type for projection operations.
pub type Result<T> = std::result::Result<T, ProjectionError>;
