//! Uniform hash-grid index for nearest-vertex queries.

use crate::SurfaceMesh;
use cortex_math::Point3;
use std::collections::HashMap;

/// Spatial index over mesh vertices.
///
/// Vertices are bucketed into a uniform grid keyed by integer cell
/// coordinates; nearest-vertex queries expand outward shell by shell
/// until no closer vertex can exist. Ties on distance are broken by the
/// lowest vertex id, which keeps projection deterministic.
#[derive(Debug)]
pub struct NodeLocator {
    cells: HashMap<(i64, i64, i64), Vec<usize>>,
    cell_size: f64,
    node_count: usize,
}

impl NodeLocator {
    /// Build an index over all vertices of `mesh`.
    ///
    /// Cell size is taken from the mesh's average edge length, so a cell
    /// holds a handful of vertices on a typical surface.
    pub fn new(mesh: &SurfaceMesh) -> Self {
        let mut cell_size = mesh.average_edge_length() * 2.0;
        if cell_size <= 0.0 {
            // Point cloud without triangles: size cells from the bounding box
            let (min, max) = mesh.bounding_box();
            let span = (max - min).norm();
            cell_size = if span > 0.0 { span / 16.0 } else { 1.0 };
        }

        let mut cells: HashMap<(i64, i64, i64), Vec<usize>> = HashMap::new();
        for i in 0..mesh.node_count() {
            let key = Self::cell_key(&mesh.coord(i), cell_size);
            cells.entry(key).or_default().push(i);
        }

        Self {
            cells,
            cell_size,
            node_count: mesh.node_count(),
        }
    }

    fn cell_key(p: &Point3, cell_size: f64) -> (i64, i64, i64) {
        (
            (p.x / cell_size).floor() as i64,
            (p.y / cell_size).floor() as i64,
            (p.z / cell_size).floor() as i64,
        )
    }

    /// Vertex nearest to `point`, or `None` for an empty mesh.
    ///
    /// Exact: keeps expanding grid shells until the best candidate is
    /// provably closer than anything in the unvisited cells.
    pub fn nearest_node(&self, mesh: &SurfaceMesh, point: &Point3) -> Option<usize> {
        if self.node_count == 0 {
            return None;
        }

        let center = Self::cell_key(point, self.cell_size);
        let mut best: Option<(f64, usize)> = None;

        let mut radius: i64 = 0;
        loop {
            // A cell at Chebyshev radius r is at least (r-1) cells away
            if let Some((best_d2, _)) = best {
                let reachable = (radius - 1).max(0) as f64 * self.cell_size;
                if reachable * reachable > best_d2 {
                    break;
                }
            }

            let mut visited_any = false;
            self.for_each_shell_cell(center, radius, |key| {
                if let Some(nodes) = self.cells.get(&key) {
                    visited_any = true;
                    for &i in nodes {
                        let d2 = (mesh.coord(i) - point).norm_squared();
                        let better = match best {
                            None => true,
                            Some((bd2, bi)) => d2 < bd2 || (d2 == bd2 && i < bi),
                        };
                        if better {
                            best = Some((d2, i));
                        }
                    }
                }
            });

            // All cells are behind us and nothing was found in range:
            // widen until any occupied cell is hit (sparse far-away query)
            if !visited_any && best.is_none() && radius as f64 * self.cell_size > self.max_span() {
                // Exhaustive fallback, the grid is sparser than the query is far
                for (_, nodes) in self.cells.iter() {
                    for &i in nodes {
                        let d2 = (mesh.coord(i) - point).norm_squared();
                        let better = match best {
                            None => true,
                            Some((bd2, bi)) => d2 < bd2 || (d2 == bd2 && i < bi),
                        };
                        if better {
                            best = Some((d2, i));
                        }
                    }
                }
                break;
            }

            radius += 1;
        }

        best.map(|(_, i)| i)
    }

    fn max_span(&self) -> f64 {
        // Conservative bound on grid extent from stored keys
        let mut max_abs: i64 = 1;
        for key in self.cells.keys() {
            max_abs = max_abs
                .max(key.0.abs())
                .max(key.1.abs())
                .max(key.2.abs());
        }
        (2 * max_abs + 2) as f64 * self.cell_size
    }

    fn for_each_shell_cell(
        &self,
        center: (i64, i64, i64),
        radius: i64,
        mut f: impl FnMut((i64, i64, i64)),
    ) {
        if radius == 0 {
            f(center);
            return;
        }
        for dx in -radius..=radius {
            for dy in -radius..=radius {
                for dz in -radius..=radius {
                    // Shell only: skip the interior already visited
                    if dx.abs() != radius && dy.abs() != radius && dz.abs() != radius {
                        continue;
                    }
                    f((center.0 + dx, center.1 + dy, center.2 + dz));
                }
            }
        }
    }
}
