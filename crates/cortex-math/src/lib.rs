#![warn(missing_docs)]

//! Math types for the cortex surface toolkit.
//!
//! Thin wrappers around nalgebra providing the types the projection and
//! border-tracing algorithms share: 3D points and vectors, triangle
//! geometry helpers (normals, signed areas, dihedral angles), and
//! tolerance constants.

use nalgebra::Vector3;

/// A point in 3D space (conventionally millimeters).
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// Unit normal of the triangle `(a, b, c)`.
///
/// Returns `None` when the triangle is degenerate (zero or near-zero area).
pub fn triangle_normal(a: &Point3, b: &Point3, c: &Point3) -> Option<Vec3> {
    let n = (b - a).cross(&(c - a));
    let len = n.norm();
    if len < 1e-12 {
        None
    } else {
        Some(n / len)
    }
}

/// Area of the triangle `(a, b, c)`.
pub fn triangle_area(a: &Point3, b: &Point3, c: &Point3) -> f64 {
    (b - a).cross(&(c - a)).norm() * 0.5
}

/// Signed area of the triangle `(a, b, c)` with respect to a reference
/// normal: positive when the triangle winds counter-clockwise as seen
/// from the side `normal` points toward.
pub fn signed_triangle_area(a: &Point3, b: &Point3, c: &Point3, normal: &Vec3) -> f64 {
    (b - a).cross(&(c - a)).dot(normal) * 0.5
}

/// Barycentric weights of `p` with respect to the triangle `(a, b, c)`.
///
/// Solves in the triangle's own plane so the result is exact for points on
/// the plane and a best-fit for points off it. Returns `None` for a
/// degenerate triangle. Weights sum to 1 but may be negative for points
/// outside the triangle.
pub fn barycentric_weights(p: &Point3, a: &Point3, b: &Point3, c: &Point3) -> Option<[f64; 3]> {
    let v0 = b - a;
    let v1 = c - a;
    let v2 = p - a;

    let d00 = v0.dot(&v0);
    let d01 = v0.dot(&v1);
    let d11 = v1.dot(&v1);
    let d20 = v2.dot(&v0);
    let d21 = v2.dot(&v1);

    let denom = d00 * d11 - d01 * d01;
    if denom.abs() < 1e-20 {
        return None;
    }

    let wb = (d11 * d20 - d01 * d21) / denom;
    let wc = (d00 * d21 - d01 * d20) / denom;
    Some([1.0 - wb - wc, wb, wc])
}

/// Angle in radians between two unit normals, in `[0, pi]`; 0 for
/// identical normals.
///
/// The caller's orientation convention decides what a flat pair reads:
/// normals taken from consistent triangle windings give 0 for a coplanar
/// pair, while normals built from a shared edge frame (the same edge
/// direction in both triangles) give pi.
pub fn dihedral_angle(n0: &Vec3, n1: &Vec3) -> f64 {
    n0.dot(n1).clamp(-1.0, 1.0).acos()
}

/// Signed distance of `p` from the plane through `origin` with unit
/// normal `normal`.
pub fn distance_above_plane(p: &Point3, origin: &Point3, normal: &Vec3) -> f64 {
    (p - origin).dot(normal)
}

/// Closest point to `p` on the segment `(a, b)`, returned as the fraction
/// along the segment (clamped to `[0, 1]`).
pub fn segment_fraction(p: &Point3, a: &Point3, b: &Point3) -> f64 {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 < 1e-20 {
        return 0.0;
    }
    ((p - a).dot(&ab) / len2).clamp(0.0, 1.0)
}

/// Tolerance constants for surface-geometry comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance in mm.
    pub linear: f64,
    /// Barycentric-weight slack for "on boundary" classification.
    ///
    /// A point counts as inside a triangle when every weight is at least
    /// this value; the default matches the calibration the legacy border
    /// data was generated with.
    pub degenerate: f64,
}

impl Tolerance {
    /// Default tolerances (1e-6 mm linear, -0.01 degenerate slack).
    pub const DEFAULT: Self = Self {
        linear: 1e-6,
        degenerate: -0.01,
    };

    /// Check if two points are coincident within tolerance.
    pub fn points_equal(&self, a: &Point3, b: &Point3) -> bool {
        (a - b).norm() < self.linear
    }

    /// Check if a scalar distance is effectively zero.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() < self.linear
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}
