//! The tagged union over the two projection representations.

use crate::{BarycentricProjection, ProjectionError, Result, VanEssenProjection};
use cortex_math::Point3;
use cortex_surface::SurfaceMesh;
use serde::{Deserialize, Serialize};

/// A surface-anchored point: barycentric when a single enclosing
/// triangle exists, Van Essen for edge/vertex degeneracies, or empty.
///
/// The two representations are mutually exclusive by construction;
/// consumers match exhaustively instead of juggling two independent
/// validity flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SurfaceProjection {
    /// Point enclosed by a single triangle.
    Barycentric(BarycentricProjection),
    /// Point on an edge or vertex, represented by unfolding the two
    /// adjacent triangles.
    VanEssen(VanEssenProjection),
    /// No projection data.
    Empty,
}

impl SurfaceProjection {
    /// True when this projection holds usable data.
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Barycentric(b) => b.valid,
            Self::VanEssen(v) => v.valid,
            Self::Empty => false,
        }
    }

    /// The barycentric form, if that is what this projection is.
    pub fn as_barycentric(&self) -> Option<&BarycentricProjection> {
        match self {
            Self::Barycentric(b) => Some(b),
            _ => None,
        }
    }

    /// The Van Essen form, if that is what this projection is.
    pub fn as_van_essen(&self) -> Option<&VanEssenProjection> {
        match self {
            Self::VanEssen(v) => Some(v),
            _ => None,
        }
    }

    /// Recorded node count vs. the mesh at hand; a mismatch means the
    /// barycentric vertex ids are meaningless on this surface.
    fn check_node_count(recorded: Option<usize>, mesh: &SurfaceMesh) -> Result<()> {
        match recorded {
            Some(expected) if expected != mesh.node_count() => {
                Err(ProjectionError::NodeCountMismatch {
                    expected,
                    actual: mesh.node_count(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Reconstruct the 3D position on `mesh`.
    ///
    /// The barycentric form is tried first (with its stored offset
    /// ignored: points land on the surface); the Van Essen form is the
    /// fallback. A barycentric projection made on a surface with a
    /// different node count fails with
    /// [`ProjectionError::NodeCountMismatch`]; an empty or invalid
    /// projection with [`ProjectionError::InvalidProjection`].
    pub fn unproject(&self, mesh: &SurfaceMesh) -> Result<Point3> {
        match self {
            Self::Barycentric(b) => {
                Self::check_node_count(b.surface_node_count, mesh)?;
                b.unproject(mesh, 0.0, false)
                    .ok_or(ProjectionError::InvalidProjection)
            }
            Self::VanEssen(v) => v
                .unproject(mesh)
                .ok_or(ProjectionError::InvalidProjection),
            Self::Empty => Err(ProjectionError::InvalidProjection),
        }
    }

    /// Like [`unproject`](Self::unproject), but applies the barycentric
    /// form's stored signed distance above the surface.
    pub fn unproject_with_offset(&self, mesh: &SurfaceMesh) -> Result<Point3> {
        match self {
            Self::Barycentric(b) => {
                Self::check_node_count(b.surface_node_count, mesh)?;
                b.unproject(mesh, 0.0, true)
                    .ok_or(ProjectionError::InvalidProjection)
            }
            _ => self.unproject(mesh),
        }
    }
}
