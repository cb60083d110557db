//! Shortest-path-along-edges distances between mesh vertices.

use crate::{SurfaceMesh, TopologyHelper};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Min-heap entry; reversed comparison over the f64 distance.
#[derive(Debug, Clone, Copy, PartialEq)]
struct HeapEntry {
    dist: f64,
    node: usize,
}

impl Eq for HeapEntry {}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the std max-heap pops the smallest distance first
        other
            .dist
            .partial_cmp(&self.dist)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Dijkstra-based geodesic distance queries over the mesh edge graph.
///
/// Edge weights are the 3D edge lengths; the result is the standard
/// graph approximation of geodesic distance, which the length measurer
/// uses for point pairs whose triangles share no vertices.
#[derive(Debug)]
pub struct GeodesicHelper {
    /// Per-vertex `(neighbor, edge length)` adjacency.
    adjacency: Vec<Vec<(usize, f64)>>,
}

impl GeodesicHelper {
    /// Precompute the weighted adjacency for `mesh`.
    pub fn new(mesh: &SurfaceMesh, topology: &TopologyHelper) -> Self {
        let mut adjacency = vec![Vec::new(); mesh.node_count()];
        for edge in topology.edges() {
            let len = (mesh.coord(edge.node1) - mesh.coord(edge.node2)).norm();
            adjacency[edge.node1].push((edge.node2, len));
            adjacency[edge.node2].push((edge.node1, len));
        }
        Self { adjacency }
    }

    /// Geodesic distance from `from` to `to`, or `None` when the two
    /// vertices lie in disconnected components.
    pub fn distance(&self, from: usize, to: usize) -> Option<f64> {
        self.distances_to_targets(from, &[to])[0]
    }

    /// Geodesic distances from `from` to each of `targets`, stopping as
    /// soon as every target has been settled.
    pub fn distances_to_targets(&self, from: usize, targets: &[usize]) -> Vec<Option<f64>> {
        let n = self.adjacency.len();
        let mut dist = vec![f64::INFINITY; n];
        let mut settled = vec![false; n];
        let mut heap = BinaryHeap::new();
        let mut remaining = targets.len();

        dist[from] = 0.0;
        heap.push(HeapEntry {
            dist: 0.0,
            node: from,
        });

        while let Some(HeapEntry { dist: d, node }) = heap.pop() {
            if settled[node] {
                continue;
            }
            settled[node] = true;
            if targets.contains(&node) {
                remaining = remaining.saturating_sub(
                    targets.iter().filter(|&&t| t == node).count(),
                );
                if remaining == 0 {
                    break;
                }
            }
            for &(next, len) in &self.adjacency[node] {
                let nd = d + len;
                if nd < dist[next] {
                    dist[next] = nd;
                    heap.push(HeapEntry {
                        dist: nd,
                        node: next,
                    });
                }
            }
        }

        targets
            .iter()
            .map(|&t| {
                if dist[t].is_finite() {
                    Some(dist[t])
                } else {
                    None
                }
            })
            .collect()
    }
}
