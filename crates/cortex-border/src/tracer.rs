//! Predicate-boundary tracing along mesh edges.

use crate::{Border, BorderError, Result};
use cortex_proj::{BarycentricProjection, SurfaceProjection};
use cortex_surface::{SurfaceMesh, TopologyHelper};
use log::debug;

/// Default parametric position of a traced point along its crossing
/// edge, measured from the "in" vertex.
pub const DEFAULT_PLACEMENT: f64 = 0.33;

/// Walks mesh edges to produce the maximal polylines separating the
/// vertices where a predicate holds from those where it does not.
///
/// An edge "crosses" when its endpoints disagree under the predicate.
/// Each traced polyline emits one point per interior crossing edge it
/// passes through; boundary crossing edges (one adjacent tile) are the
/// ends of open polylines, not through-points. Every crossing edge is
/// consumed by at most one polyline, and re-running the tracer on the
/// same mesh and predicate reproduces the same polylines.
pub struct BorderTracer<'a> {
    mesh: &'a SurfaceMesh,
    topology: &'a TopologyHelper,
    placement: f64,
}

/// One step of the walk: a crossing edge approached through a tile.
#[derive(Debug, Clone, Copy)]
struct Crossing {
    edge: usize,
    in_node: usize,
    out_node: usize,
    tile: usize,
}

impl<'a> BorderTracer<'a> {
    /// Create a tracer with the default placement fraction.
    pub fn new(mesh: &'a SurfaceMesh, topology: &'a TopologyHelper) -> Self {
        Self {
            mesh,
            topology,
            placement: DEFAULT_PLACEMENT,
        }
    }

    /// Set the placement fraction (0-1) along each crossing edge.
    pub fn placement(mut self, placement: f64) -> Self {
        self.placement = placement.clamp(0.0, 1.0);
        self
    }

    /// Trace all boundary polylines of `predicate`.
    ///
    /// Seeks start edges scanning vertices in increasing id; a vertex's
    /// incident edges are taken in ascending edge id, preferring a
    /// boundary crossing edge so open polylines start at one of their
    /// true ends. Traced borders are named `"{base_name}.{index}"` with
    /// `base_name` as their class name; the caller takes ownership.
    pub fn trace<F>(&self, base_name: &str, predicate: F) -> Result<Vec<Border>>
    where
        F: Fn(usize) -> bool,
    {
        if self.mesh.triangle_count() == 0 {
            return Err(BorderError::EmptyMesh);
        }

        let mut used = vec![false; self.topology.edge_count()];
        let mut borders = Vec::new();

        for node in 0..self.mesh.node_count() {
            if !predicate(node) {
                continue;
            }
            while let Some(start) = self.seek_start(node, &predicate, &used) {
                debug!(
                    "tracing from edge {} ({} -> {})",
                    start.edge, start.in_node, start.out_node
                );
                let (points, closed) = self.run(start, &predicate, &mut used);
                if points.is_empty() {
                    continue;
                }
                let mut border = Border::new(format!("{}.{}", base_name, borders.len()));
                border.class_name = base_name.to_string();
                border.closed = closed;
                border.points = points;
                debug!(
                    "traced {} ({} points, closed={})",
                    border.name,
                    border.len(),
                    closed
                );
                borders.push(border);
            }
        }

        Ok(borders)
    }

    /// Find an unconsumed crossing edge at `node`, boundary edges first.
    fn seek_start<F>(&self, node: usize, predicate: &F, used: &[bool]) -> Option<Crossing>
    where
        F: Fn(usize) -> bool,
    {
        let mut fallback: Option<Crossing> = None;
        for &e in self.topology.node_edges(node) {
            if used[e] {
                continue;
            }
            let edge = self.topology.edge(e);
            let other = edge.other_node(node);
            if predicate(other) {
                continue;
            }
            // Walk via the lowest adjacent tile for determinism
            let tile = edge.tiles().map(|t| t.tile).min()?;
            let crossing = Crossing {
                edge: e,
                in_node: node,
                out_node: other,
                tile,
            };
            if edge.num_tiles() == 1 {
                return Some(crossing);
            }
            if fallback.is_none() {
                fallback = Some(crossing);
            }
        }
        fallback
    }

    /// Walk from `start`, and for an interior start edge that turned out
    /// to be an open polyline, continue backward through the other tile
    /// so the polyline is maximal.
    fn run<F>(&self, start: Crossing, predicate: &F, used: &mut [bool]) -> (Vec<SurfaceProjection>, bool)
    where
        F: Fn(usize) -> bool,
    {
        let start_interior = self.topology.edge(start.edge).num_tiles() == 2;
        let (mut points, closed) = self.walk(start, predicate, used, true);

        if !closed && start_interior {
            if let Some(other) = self.topology.edge(start.edge).other_tile(start.tile) {
                let back_start = Crossing {
                    tile: other.tile,
                    ..start
                };
                let (mut back, _) = self.walk(back_start, predicate, used, false);
                back.reverse();
                back.append(&mut points);
                points = back;
            }
        }

        (points, closed)
    }

    /// Walk forward from `start` until the trace closes on its start
    /// edge or runs off a boundary edge. Emits one point per interior
    /// crossing edge; `emit_start` covers the direction already walked.
    fn walk<F>(
        &self,
        start: Crossing,
        predicate: &F,
        used: &mut [bool],
        emit_start: bool,
    ) -> (Vec<SurfaceProjection>, bool)
    where
        F: Fn(usize) -> bool,
    {
        let mut points = Vec::new();
        let mut current = start;
        used[current.edge] = true;
        if emit_start && !self.topology.is_boundary_edge(current.edge) {
            points.push(self.place_point(&current));
        }

        loop {
            // Pivot around the current tile's third vertex to the next
            // crossing edge of the same triangle
            let Some(tile_ref) = self.topology.edge(current.edge).tile_for(current.tile) else {
                break;
            };
            let third = tile_ref.third_node;
            let (next_in, next_out) = if predicate(third) {
                (third, current.out_node)
            } else {
                (current.in_node, third)
            };
            let Some(next_edge) = self.topology.edge_between(next_in, next_out) else {
                // Corrupt adjacency; stop rather than loop
                debug_assert!(false, "tile edge missing from topology");
                break;
            };

            if next_edge == start.edge {
                return (points, true);
            }
            if used[next_edge] {
                break;
            }
            used[next_edge] = true;

            current = Crossing {
                edge: next_edge,
                in_node: next_in,
                out_node: next_out,
                tile: current.tile,
            };

            match self.topology.edge(next_edge).other_tile(current.tile) {
                Some(other) => {
                    // Interior through-edge: place a point and continue
                    // into the neighboring tile
                    points.push(self.place_point(&current));
                    current.tile = other.tile;
                }
                None => break, // reached an open end
            }
        }

        (points, false)
    }

    /// Border point on a crossing edge: barycentric weights
    /// `{1-placement, placement, 0}` over `{in, out, third}`.
    fn place_point(&self, crossing: &Crossing) -> SurfaceProjection {
        let third = self
            .topology
            .edge(crossing.edge)
            .tile_for(crossing.tile)
            .map_or(crossing.in_node, |t| t.third_node);
        let mut proj = BarycentricProjection::new(
            [crossing.in_node, crossing.out_node, third],
            [1.0 - self.placement, self.placement, 0.0],
        );
        proj.set_surface_node_count(self.mesh.node_count());
        SurfaceProjection::Barycentric(proj)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_meshes;
    use approx::assert_abs_diff_eq;

    fn crossing_edges<F: Fn(usize) -> bool>(topo: &TopologyHelper, predicate: F) -> Vec<usize> {
        (0..topo.edge_count())
            .filter(|&e| {
                let edge = topo.edge(e);
                predicate(edge.node1) != predicate(edge.node2)
            })
            .collect()
    }

    #[test]
    fn test_flat_square_single_point() {
        let mesh = test_meshes::flat_square();
        let topo = TopologyHelper::new(&mesh);
        let tracer = BorderTracer::new(&mesh, &topo);

        let borders = tracer.trace("split", |n| n == 0 || n == 1).unwrap();
        assert_eq!(borders.len(), 1);
        let border = &borders[0];
        assert!(!border.closed);
        assert_eq!(border.len(), 1);

        // The single interior crossing edge is the 0-2 diagonal; the
        // point sits at the placement fraction from the in vertex
        let bary = border.points[0].as_barycentric().unwrap();
        assert_eq!(bary.nodes[0], 0);
        assert_eq!(bary.nodes[1], 2);
        assert_abs_diff_eq!(bary.weights[0], 1.0 - DEFAULT_PLACEMENT, epsilon = 1e-12);
        assert_abs_diff_eq!(bary.weights[1], DEFAULT_PLACEMENT, epsilon = 1e-12);
        assert_abs_diff_eq!(bary.weights[2], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(bary.signed_distance_above_surface, 0.0, epsilon = 1e-12);

        let p = border.points[0].unproject(&mesh).unwrap();
        assert_abs_diff_eq!(p.x, DEFAULT_PLACEMENT, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y, DEFAULT_PLACEMENT, epsilon = 1e-12);
    }

    #[test]
    fn test_octahedron_apex_ring_is_closed() {
        let mesh = test_meshes::octahedron();
        let topo = TopologyHelper::new(&mesh);
        let tracer = BorderTracer::new(&mesh, &topo);

        // Only the north pole is "in": the boundary rings around it,
        // crossing the four edges from vertex 4 down to the equator
        let borders = tracer.trace("apex", |n| n == 4).unwrap();
        assert_eq!(borders.len(), 1);
        let border = &borders[0];
        assert!(border.closed);
        assert_eq!(border.len(), 4);
        for point in &border.points {
            let bary = point.as_barycentric().unwrap();
            assert_eq!(bary.nodes[0], 4);
        }
    }

    #[test]
    fn test_no_crossing_yields_no_borders() {
        let mesh = test_meshes::octahedron();
        let topo = TopologyHelper::new(&mesh);
        let tracer = BorderTracer::new(&mesh, &topo);
        assert!(tracer.trace("all", |_| true).unwrap().is_empty());
        assert!(tracer.trace("none", |_| false).unwrap().is_empty());
    }

    #[test]
    fn test_every_crossing_edge_used_once() {
        let mesh = test_meshes::flat_grid();
        let topo = TopologyHelper::new(&mesh);
        let tracer = BorderTracer::new(&mesh, &topo);

        // Left two columns in, rest out
        let pred = |n: usize| n % 5 < 2;
        let borders = tracer.trace("cols", pred).unwrap();

        // Each interior crossing edge appears as exactly one point
        let mut seen: Vec<(usize, usize)> = Vec::new();
        for border in &borders {
            for point in &border.points {
                let bary = point.as_barycentric().unwrap();
                let key = (
                    bary.nodes[0].min(bary.nodes[1]),
                    bary.nodes[0].max(bary.nodes[1]),
                );
                assert!(!seen.contains(&key), "edge {:?} emitted twice", key);
                seen.push(key);
            }
        }

        let interior_crossings = crossing_edges(&topo, pred)
            .into_iter()
            .filter(|&e| !topo.is_boundary_edge(e))
            .count();
        assert_eq!(seen.len(), interior_crossings);
    }

    #[test]
    fn test_open_polyline_is_maximal() {
        let mesh = test_meshes::flat_grid();
        let topo = TopologyHelper::new(&mesh);
        let tracer = BorderTracer::new(&mesh, &topo);

        // One straight cut down the middle of the grid
        let borders = tracer.trace("cut", |n| n % 5 < 2).unwrap();
        assert_eq!(borders.len(), 1);
        assert!(!borders[0].closed);
    }

    #[test]
    fn test_retrace_is_idempotent() {
        let mesh = test_meshes::flat_grid();
        let topo = TopologyHelper::new(&mesh);
        let tracer = BorderTracer::new(&mesh, &topo);

        let pred = |n: usize| (n / 5 + n % 5) % 2 == 0;
        let a = tracer.trace("checker", pred).unwrap();
        let b = tracer.trace("checker", pred).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_interior_island_is_closed() {
        let mesh = test_meshes::flat_grid();
        let topo = TopologyHelper::new(&mesh);
        let tracer = BorderTracer::new(&mesh, &topo);

        // The center vertex (2,2) of the 5x5 grid, id 12
        let borders = tracer.trace("island", |n| n == 12).unwrap();
        assert_eq!(borders.len(), 1);
        let border = &borders[0];
        assert!(border.closed);
        // Vertex 12 has six incident edges in the split-diagonal grid,
        // all interior, all crossing
        assert_eq!(border.len(), 6);
    }

    #[test]
    fn test_custom_placement() {
        let mesh = test_meshes::flat_square();
        let topo = TopologyHelper::new(&mesh);
        let tracer = BorderTracer::new(&mesh, &topo).placement(0.5);
        let borders = tracer.trace("mid", |n| n == 0 || n == 1).unwrap();
        let p = borders[0].points[0].unproject(&mesh).unwrap();
        assert_abs_diff_eq!(p.x, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_mesh_errors() {
        let mesh = SurfaceMesh::new(vec![], vec![]).unwrap();
        let topo = TopologyHelper::new(&mesh);
        let tracer = BorderTracer::new(&mesh, &topo);
        assert!(matches!(
            tracer.trace("x", |_| true),
            Err(BorderError::EmptyMesh)
        ));
    }
}
