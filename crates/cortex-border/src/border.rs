//! The border polyline model.

use cortex_math::Point3;
use cortex_proj::SurfaceProjection;
use cortex_surface::SurfaceMesh;
use serde::{Deserialize, Serialize};

/// A named, directed polyline anchored to a mesh via per-point surface
/// projections.
///
/// Points are appended during tracing or editing and never reordered
/// except through the explicit [`reverse`](Self::reverse) and
/// [`split_at`](Self::split_at) operations. `closed` means the last
/// point conceptually connects back to the first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Border {
    /// Display name. Borders sharing a name form one logical border
    /// drawn as disconnected pieces.
    pub name: String,
    /// Grouping label (e.g. an atlas or study name).
    pub class_name: String,
    /// Display color, RGBA in `[0, 1]`.
    pub color: [f32; 4],
    /// Whether the last point connects back to the first.
    pub closed: bool,
    /// The polyline's points, in order.
    pub points: Vec<SurfaceProjection>,
}

impl Border {
    /// Create an empty open border.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class_name: String::new(),
            color: [0.0, 0.0, 0.0, 1.0],
            closed: false,
            points: Vec::new(),
        }
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the border has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Append a point.
    pub fn push_point(&mut self, point: SurfaceProjection) {
        self.points.push(point);
    }

    /// Reverse the point order in place.
    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    /// Split an open border at an existing point index, which becomes
    /// the last point of the first half and the first point of the
    /// second half. Returns `None` when `index` is not an interior
    /// point.
    pub fn split_at(&self, index: usize) -> Option<(Border, Border)> {
        if self.closed || index == 0 || index + 1 >= self.points.len() {
            return None;
        }
        let mut first = self.clone();
        let mut second = self.clone();
        first.points.truncate(index + 1);
        second.points.drain(..index);
        Some((first, second))
    }

    /// Index and distance of the point nearest to `xyz` on `mesh`,
    /// skipping points that fail to unproject. `None` for an empty or
    /// fully invalid border.
    pub fn nearest_point_to(&self, mesh: &SurfaceMesh, xyz: &Point3) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (i, p) in self.points.iter().enumerate() {
            if let Ok(pos) = p.unproject(mesh) {
                let d = (pos - xyz).norm();
                if best.map_or(true, |(_, bd)| d < bd) {
                    best = Some((i, d));
                }
            }
        }
        best
    }
}

/// An owning collection of borders, the in-memory form of a border file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BorderSet {
    borders: Vec<Border>,
}

impl BorderSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a border, appending it to the set.
    pub fn add_border(&mut self, border: Border) {
        self.borders.push(border);
    }

    /// Remove and return the border at `index`, or `None` if out of
    /// range.
    pub fn remove_border(&mut self, index: usize) -> Option<Border> {
        if index < self.borders.len() {
            Some(self.borders.remove(index))
        } else {
            None
        }
    }

    /// Number of borders.
    pub fn len(&self) -> usize {
        self.borders.len()
    }

    /// True when the set holds no borders.
    pub fn is_empty(&self) -> bool {
        self.borders.is_empty()
    }

    /// The borders, in insertion order.
    pub fn borders(&self) -> &[Border] {
        &self.borders
    }

    /// Mutable access to the border at `index`.
    pub fn border_mut(&mut self, index: usize) -> Option<&mut Border> {
        self.borders.get_mut(index)
    }

    /// Group borders by name: pieces sharing a name are one logical
    /// border drawn as disconnected parts. Groups appear in order of
    /// each name's first occurrence; indices within a group keep
    /// insertion order. The grouping is derived, never stored.
    pub fn grouped_by_name(&self) -> Vec<(String, Vec<usize>)> {
        let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
        for (i, border) in self.borders.iter().enumerate() {
            match groups.iter_mut().find(|(name, _)| *name == border.name) {
                Some((_, indices)) => indices.push(i),
                None => groups.push((border.name.clone(), vec![i])),
            }
        }
        groups
    }
}
