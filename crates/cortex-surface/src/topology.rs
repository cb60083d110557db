//! Topology adjacency derived from a surface mesh.
//!
//! Edges and tiles (triangles) are referenced by integer index throughout;
//! the tracing and projection algorithms depend on cheap, stable integer
//! identity, so no pointer-based adjacency objects are used.

use crate::SurfaceMesh;
use log::warn;
use std::collections::HashMap;

/// One triangle's attachment to an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRef {
    /// Triangle index.
    pub tile: usize,
    /// The triangle vertex not on this edge.
    pub third_node: usize,
    /// Which local edge slot (0, 1, or 2) of the triangle this edge
    /// occupies.
    pub edge_slot: usize,
    /// Whether the edge's `(node1, node2)` order is reversed relative to
    /// the triangle's stored winding.
    pub reversed: bool,
}

/// An undirected mesh edge and its adjacent tiles.
///
/// One adjacent tile means a mesh-boundary edge; two means an interior
/// edge. More than two (a non-manifold mesh) is not supported: extra
/// tiles are dropped at build time.
#[derive(Debug, Clone)]
pub struct EdgeInfo {
    /// First endpoint, in first-encounter order.
    pub node1: usize,
    /// Second endpoint.
    pub node2: usize,
    tiles: [Option<TileRef>; 2],
}

impl EdgeInfo {
    /// Number of adjacent tiles (1 or 2).
    pub fn num_tiles(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_some()).count()
    }

    /// Adjacent tile in slot `i` (0 or 1).
    pub fn tile(&self, i: usize) -> Option<&TileRef> {
        self.tiles[i].as_ref()
    }

    /// Iterate over the adjacent tiles.
    pub fn tiles(&self) -> impl Iterator<Item = &TileRef> {
        self.tiles.iter().flatten()
    }

    /// The adjacent tile that is not triangle `tile`, if any.
    pub fn other_tile(&self, tile: usize) -> Option<&TileRef> {
        self.tiles().find(|t| t.tile != tile)
    }

    /// The adjacent tile that is triangle `tile`, if any.
    pub fn tile_for(&self, tile: usize) -> Option<&TileRef> {
        self.tiles().find(|t| t.tile == tile)
    }

    /// The endpoint that is not `node`.
    pub fn other_node(&self, node: usize) -> usize {
        if self.node1 == node {
            self.node2
        } else {
            self.node1
        }
    }

    /// True if this edge joins `a` and `b` (in either order).
    pub fn joins(&self, a: usize, b: usize) -> bool {
        (self.node1 == a && self.node2 == b) || (self.node1 == b && self.node2 == a)
    }
}

/// Edge table and per-vertex incident-edge lists for a mesh.
///
/// Built once per mesh and cached by the caller; only a topology change
/// (not a coordinate change) requires a rebuild.
#[derive(Debug)]
pub struct TopologyHelper {
    edges: Vec<EdgeInfo>,
    node_edges: Vec<Vec<usize>>,
    tile_edges: Vec<[usize; 3]>,
}

impl TopologyHelper {
    /// Build the adjacency tables for `mesh`.
    ///
    /// Edge ids are assigned in first-encounter order scanning triangles
    /// in ascending index, so per-vertex incident lists come out in
    /// ascending edge id.
    pub fn new(mesh: &SurfaceMesh) -> Self {
        let mut edges: Vec<EdgeInfo> = Vec::new();
        let mut node_edges: Vec<Vec<usize>> = vec![Vec::new(); mesh.node_count()];
        let mut tile_edges: Vec<[usize; 3]> = Vec::with_capacity(mesh.triangle_count());
        let mut edge_ids: HashMap<(usize, usize), usize> = HashMap::new();

        for t in 0..mesh.triangle_count() {
            let tri = mesh.triangle(t);
            let mut slots = [0usize; 3];
            for s in 0..3 {
                let a = tri[s];
                let b = tri[(s + 1) % 3];
                let third = tri[(s + 2) % 3];
                let key = (a.min(b), a.max(b));

                let id = *edge_ids.entry(key).or_insert_with(|| {
                    let id = edges.len();
                    edges.push(EdgeInfo {
                        node1: a,
                        node2: b,
                        tiles: [None, None],
                    });
                    node_edges[a].push(id);
                    node_edges[b].push(id);
                    id
                });

                let edge = &mut edges[id];
                let reversed = !(edge.node1 == a && edge.node2 == b);
                let tile_ref = TileRef {
                    tile: t,
                    third_node: third,
                    edge_slot: s,
                    reversed,
                };
                if edge.tiles[0].is_none() {
                    edge.tiles[0] = Some(tile_ref);
                } else if edge.tiles[1].is_none() {
                    edge.tiles[1] = Some(tile_ref);
                } else {
                    // Non-manifold input: keep the first two tiles
                    warn!(
                        "edge ({}, {}) has more than two adjacent triangles; ignoring triangle {}",
                        edge.node1, edge.node2, t
                    );
                    debug_assert!(false, "non-manifold edge in input mesh");
                }
                slots[s] = id;
            }
            tile_edges.push(slots);
        }

        Self {
            edges,
            node_edges,
            tile_edges,
        }
    }

    /// All edges, indexed by edge id.
    pub fn edges(&self) -> &[EdgeInfo] {
        &self.edges
    }

    /// Edge `id`.
    pub fn edge(&self, id: usize) -> &EdgeInfo {
        &self.edges[id]
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edge ids incident to `node`, in ascending edge id.
    pub fn node_edges(&self, node: usize) -> &[usize] {
        &self.node_edges[node]
    }

    /// The three edge ids of triangle `tile`, in winding order.
    pub fn tile_edges(&self, tile: usize) -> [usize; 3] {
        self.tile_edges[tile]
    }

    /// Edge joining `a` and `b`, if one exists.
    pub fn edge_between(&self, a: usize, b: usize) -> Option<usize> {
        self.node_edges[a]
            .iter()
            .copied()
            .find(|&e| self.edges[e].joins(a, b))
    }

    /// True if edge `id` lies on the mesh boundary (single adjacent tile).
    pub fn is_boundary_edge(&self, id: usize) -> bool {
        self.edges[id].num_tiles() == 1
    }

    /// Triangle indices incident to `node`, ascending and deduplicated.
    pub fn node_tiles(&self, node: usize) -> Vec<usize> {
        let mut tiles: Vec<usize> = self.node_edges[node]
            .iter()
            .flat_map(|&e| self.edges[e].tiles().map(|t| t.tile))
            .collect();
        tiles.sort_unstable();
        tiles.dedup();
        tiles
    }

    /// Node ids one topological ring out from `node` (its direct
    /// neighbors), ascending.
    pub fn node_neighbors(&self, node: usize) -> Vec<usize> {
        let mut out: Vec<usize> = self.node_edges[node]
            .iter()
            .map(|&e| self.edges[e].other_node(node))
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }
}
