#![warn(missing_docs)]

//! Borders: named polylines anchored to a cortical surface mesh.
//!
//! A border delineates a region (an anatomical boundary, a cut, a
//! labeled patch outline). Its points are surface projections rather
//! than raw coordinates, so the polyline stays attached to the mesh
//! under resampling and deformation.
//!
//! - [`Border`] / [`BorderSet`]: the polyline model
//! - [`BorderTracer`]: walks mesh edges to produce polylines following
//!   the boundary of a per-vertex predicate
//! - [`BorderLengthMeasurer`]: geodesic-corrected polyline lengths

mod border;
mod error;
mod length;
mod tracer;

pub use border::{Border, BorderSet};
pub use error::{BorderError, Result};
pub use length::BorderLengthMeasurer;
pub use tracer::BorderTracer;
