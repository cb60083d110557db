//! Geodesic-corrected border length measurement.

use crate::{Border, BorderError, Result};
use cortex_math::{triangle_area, Point3};
use cortex_proj::{ProjectionError, SurfaceProjection};
use cortex_surface::{GeodesicHelper, SurfaceMesh, TopologyHelper};

/// Computes total on-mesh lengths of border polylines.
///
/// Consecutive point pairs are classified by how many triangle vertices
/// their projections share:
///
/// - 3 shared (same triangle): straight 3D distance
/// - 2 shared (adjacent triangles): the two triangles are unfolded flat
///   across the shared edge and the straight unfolded distance is taken
/// - 0-1 shared (disjoint): vertex-to-vertex geodesic distance plus
///   each point's offset from its triangle vertex, minimized over the
///   3x3 vertex combinations
///
/// An optional per-vertex area-correction map rescales distances for
/// surfaces warped by inflation or registration.
pub struct BorderLengthMeasurer<'a> {
    mesh: &'a SurfaceMesh,
    geodesic: GeodesicHelper,
    area_correction: Option<&'a [f64]>,
    /// Per-vertex area (one third of incident triangle area), the
    /// weights for averaging correction ratios.
    vertex_areas: Vec<f64>,
}

impl<'a> BorderLengthMeasurer<'a> {
    /// Create a measurer for `mesh`.
    pub fn new(mesh: &'a SurfaceMesh, topology: &'a TopologyHelper) -> Self {
        let mut vertex_areas = vec![0.0; mesh.node_count()];
        for t in 0..mesh.triangle_count() {
            let [a, b, c] = mesh.triangle(t);
            let area = triangle_area(&mesh.coord(a), &mesh.coord(b), &mesh.coord(c)) / 3.0;
            vertex_areas[a] += area;
            vertex_areas[b] += area;
            vertex_areas[c] += area;
        }
        Self {
            mesh,
            geodesic: GeodesicHelper::new(mesh, topology),
            area_correction: None,
            vertex_areas,
        }
    }

    /// Supply a per-vertex area-correction map (ratios of corrected to
    /// current vertex area; `1.0` everywhere is a no-op). Its length is
    /// validated against the mesh when a length is computed.
    pub fn area_correction(mut self, correction: &'a [f64]) -> Self {
        self.area_correction = Some(correction);
        self
    }

    /// Correction factor over a set of vertices: the square root of the
    /// area-weighted mean ratio. Unity when correction is disabled.
    fn correction_factor(&self, vertices: &[usize]) -> f64 {
        let Some(correction) = self.area_correction else {
            return 1.0;
        };
        let mut corrected = 0.0;
        let mut current = 0.0;
        for &v in vertices {
            let a = self.vertex_areas[v];
            corrected += correction[v] * a;
            current += a;
        }
        if current > 1e-20 {
            (corrected / current).sqrt()
        } else {
            1.0
        }
    }

    /// Total length of `border` in mesh units.
    ///
    /// Sums consecutive-pair segment lengths, plus the wrap-around
    /// segment when the border is closed. Fewer than two points is not
    /// an error: the length is zero.
    pub fn length(&self, border: &Border) -> Result<f64> {
        if let Some(correction) = self.area_correction {
            if correction.len() != self.mesh.node_count() {
                return Err(BorderError::AreaCorrectionLength {
                    expected: self.mesh.node_count(),
                    actual: correction.len(),
                });
            }
        }
        if border.len() < 2 {
            return Ok(0.0);
        }

        let mut total = 0.0;
        for i in 0..border.len() - 1 {
            total += self.segment_length(&border.points[i], &border.points[i + 1])?;
        }
        if border.closed {
            total += self.segment_length(
                &border.points[border.len() - 1],
                &border.points[0],
            )?;
        }
        Ok(total)
    }

    /// The triangle vertex ids a projection is anchored to.
    fn anchor_nodes(point: &SurfaceProjection) -> Result<[usize; 3]> {
        match point {
            SurfaceProjection::Barycentric(b) => Ok(b.nodes),
            SurfaceProjection::VanEssen(v) => Ok(v.triangle_nodes[0]),
            SurfaceProjection::Empty => {
                Err(BorderError::Projection(ProjectionError::InvalidProjection))
            }
        }
    }

    /// Length of one segment between consecutive border points.
    fn segment_length(&self, p1: &SurfaceProjection, p2: &SurfaceProjection) -> Result<f64> {
        let x1 = p1.unproject(self.mesh)?;
        let x2 = p2.unproject(self.mesh)?;
        let n1 = Self::anchor_nodes(p1)?;
        let n2 = Self::anchor_nodes(p2)?;

        let shared: Vec<usize> = n1.iter().copied().filter(|v| n2.contains(v)).collect();
        match shared.len() {
            3 => Ok((x2 - x1).norm() * self.correction_factor(&n1)),
            2 => Ok(self.unfolded_length(&x1, &x2, shared[0], shared[1])),
            _ => self.geodesic_length(&x1, &x2, &n1, &n2),
        }
    }

    /// Adjacent-triangle case: unfold the two triangles flat across the
    /// shared edge. Each point keeps its along-edge coordinate; the
    /// perpendicular offsets land on opposite sides of the edge, and the
    /// straight distance in the unfolded plane is the segment length.
    fn unfolded_length(&self, x1: &Point3, x2: &Point3, s0: usize, s1: usize) -> f64 {
        let e0 = self.mesh.coord(s0);
        let e1 = self.mesh.coord(s1);
        let edge = e1 - e0;
        let len2 = edge.norm_squared();
        if len2 < 1e-20 {
            return (x2 - x1).norm() * self.correction_factor(&[s0, s1]);
        }

        let along = |x: &Point3| (x - e0).dot(&edge) / len2.sqrt();
        let perp = |x: &Point3| {
            let t = (x - e0).dot(&edge) / len2;
            let foot = e0 + edge * t;
            (x - foot).norm()
        };

        let (t1, h1) = (along(x1), perp(x1));
        let (t2, h2) = (along(x2), perp(x2));
        let unfolded = ((t1 - t2).powi(2) + (h1 + h2).powi(2)).sqrt();
        unfolded * self.correction_factor(&[s0, s1])
    }

    /// Disjoint case: route through the vertex pair minimizing offset
    /// distance plus geodesic distance over the 3x3 combinations.
    fn geodesic_length(
        &self,
        x1: &Point3,
        x2: &Point3,
        n1: &[usize; 3],
        n2: &[usize; 3],
    ) -> Result<f64> {
        let mut best: Option<f64> = None;
        for &a in n1 {
            let d1 = (x1 - self.mesh.coord(a)).norm() * self.correction_factor(&[a]);
            let geo = self.geodesic.distances_to_targets(a, n2);
            for (k, &b) in n2.iter().enumerate() {
                let Some(g) = geo[k] else { continue };
                let d2 = (x2 - self.mesh.coord(b)).norm() * self.correction_factor(&[b]);
                let total = d1 + g + d2;
                if best.map_or(true, |bd| total < bd) {
                    best = Some(total);
                }
            }
        }
        best.ok_or(BorderError::NoPath {
            from: n1[0],
            to: n2[0],
        })
    }
}
