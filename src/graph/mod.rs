// ===========================================================================
// Arena Line Graph
// ===========================================================================
//
// Nodes and edges live in flat vectors and refer to each other by index.
// Every edge is allocated together with its exact reverse (main edge at an
// even id, reverse at the following odd id). A node's adjacency list only
// holds edges leaving it, so a non-loop pair shows up once at each end and a
// loop shows up once, at its only node.
//
// Edges are never reused: fusing or pruning marks the pair `removed` and the
// tombstone stays behind for stale priority-queue entries to trip over.

pub mod builder;
pub mod reduce;
pub mod validation;

use crate::geometry::{self, CoordKey};
use ahash::{AHashMap, AHashSet};
use geo::Coord;

pub type NodeId = usize;
pub type EdgeId = usize;
pub type GroupId = u32;
pub type SourceId = i64;

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeAttrs {
    pub group: GroupId,
    /// Traffic weight ("visits").
    pub weight: f64,
    pub min_zoom: i32,
    pub active: bool,
    /// Source lines this edge was built from.
    pub sources: AHashSet<SourceId>,
}

impl EdgeAttrs {
    /// Attributes of an edge fused from `self` (length `len_a`) and `other` (length `len_b`).
    fn fused_with(&self, len_a: f64, other: &EdgeAttrs, len_b: f64) -> EdgeAttrs {
        let total = len_a + len_b;
        let weight = if total > 0.0 {
            (self.weight * len_a + other.weight * len_b) / total
        } else {
            (self.weight + other.weight) / 2.0
        };
        let mut sources = self.sources.clone();
        sources.extend(other.sources.iter().copied());
        EdgeAttrs {
            group: self.group,
            weight,
            min_zoom: self.min_zoom,
            active: self.active,
            sources,
        }
    }
}

#[derive(Debug)]
pub struct Node {
    pub id: NodeId,
    pub coord: Coord,
    /// Outgoing edges, sorted by initial bearing.
    pub edges: Vec<EdgeId>,
}

#[derive(Debug)]
pub struct Edge {
    pub id: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
    pub coords: Vec<Coord>,
    pub length: f64,
    /// Bearing of the first segment.
    pub angle: f64,
    pub attrs: EdgeAttrs,
    pub main: bool,
    pub reverse: EdgeId,
    pub removed: bool,
}

impl Edge {
    pub fn is_loop(&self) -> bool {
        self.from == self.to
    }

    /// Fewer than two points, or two identical points.
    pub fn is_collapsed(&self) -> bool {
        self.coords.len() < 2 || (self.coords.len() == 2 && self.coords[0] == self.coords[1])
    }
}

#[derive(Debug, Default)]
pub struct LineGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    /// Live nodes in creation order.
    order: Vec<NodeId>,
    node_index: AHashMap<CoordKey, NodeId>,
}

impl LineGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.order.clear();
        self.node_index.clear();
    }

    /// Node at `coord`, created on first reference.
    pub fn node_at(&mut self, coord: Coord) -> NodeId {
        let key = geometry::coord_key(coord);
        if let Some(&id) = self.node_index.get(&key) {
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(Node {
            id,
            coord,
            edges: Vec::new(),
        });
        self.order.push(id);
        self.node_index.insert(key, id);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id]
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> &mut Edge {
        &mut self.edges[id]
    }

    pub fn degree(&self, node: NodeId) -> usize {
        self.nodes[node].edges.len()
    }

    /// Live nodes in creation order. Nodes emptied since the last
    /// [`LineGraph::collect_garbage`] are still listed.
    pub fn live_nodes(&self) -> &[NodeId] {
        &self.order
    }

    pub fn node_distance(&self, a: NodeId, b: NodeId) -> f64 {
        geometry::distance(self.nodes[a].coord, self.nodes[b].coord)
    }

    /// Angle between two edges leaving the same node, in `[0, PI]`.
    pub fn angle_between(&self, a: EdgeId, b: EdgeId) -> f64 {
        geometry::angle_between(self.edges[a].angle, self.edges[b].angle)
    }

    /// Main edges still attached to the graph, in node order.
    pub fn main_edges(&self) -> Vec<EdgeId> {
        self.order
            .iter()
            .flat_map(|&n| self.nodes[n].edges.iter().copied())
            .filter(|&e| self.edges[e].main)
            .collect()
    }

    pub fn live_edge_count(&self) -> usize {
        self.main_edges().len()
    }

    /// Allocate a main/reverse pair and attach it between `from` and `to`.
    ///
    /// Returns `None` when `from` already holds an edge with the same group
    /// and coordinates; the new pair is tombstoned and its sources are folded
    /// into the existing pair.
    pub fn insert_pair(
        &mut self,
        from: NodeId,
        to: NodeId,
        coords: Vec<Coord>,
        length: f64,
        attrs: EdgeAttrs,
    ) -> Option<EdgeId> {
        let main_id = self.edges.len();
        let reverse_id = main_id + 1;
        let reversed: Vec<Coord> = coords.iter().rev().copied().collect();

        self.edges.push(Edge {
            id: main_id,
            from,
            to,
            angle: geometry::initial_bearing(&coords),
            coords,
            length,
            attrs: attrs.clone(),
            main: true,
            reverse: reverse_id,
            removed: false,
        });
        self.edges.push(Edge {
            id: reverse_id,
            from: to,
            to: from,
            angle: geometry::initial_bearing(&reversed),
            coords: reversed,
            length,
            attrs,
            main: false,
            reverse: main_id,
            removed: false,
        });

        if let Some(existing) = self.find_duplicate(from, main_id) {
            self.absorb_sources(existing, main_id);
            self.edges[main_id].removed = true;
            self.edges[reverse_id].removed = true;
            return None;
        }

        self.attach(from, main_id);
        if from != to {
            self.attach(to, reverse_id);
        }
        Some(main_id)
    }

    fn find_duplicate(&self, node: NodeId, candidate: EdgeId) -> Option<EdgeId> {
        let edge = &self.edges[candidate];
        self.nodes[node].edges.iter().copied().find(|&other| {
            let other = &self.edges[other];
            other.attrs.group == edge.attrs.group && other.coords == edge.coords
        })
    }

    fn attach(&mut self, node: NodeId, edge: EdgeId) {
        let edges = &self.edges;
        let angle = edges[edge].angle;
        let list = &mut self.nodes[node].edges;
        let pos = list.partition_point(|&e| edges[e].angle <= angle);
        list.insert(pos, edge);
    }

    /// Detach an edge pair from both endpoints. Returns `false` if it was already gone.
    pub fn remove_edge(&mut self, id: EdgeId) -> bool {
        if self.edges[id].removed {
            return false;
        }
        let (from, to, reverse) = {
            let edge = &self.edges[id];
            (edge.from, edge.to, edge.reverse)
        };
        self.nodes[from].edges.retain(|&e| e != id);
        self.nodes[to].edges.retain(|&e| e != reverse);
        self.edges[id].removed = true;
        self.edges[reverse].removed = true;
        true
    }

    /// Replace two edges leaving `node` by one edge running through it.
    ///
    /// Direction is taken from the original lines: when `edge1` is a main
    /// edge the result runs `edge2.to -> node -> edge1.to`, otherwise
    /// `edge1.to -> node -> edge2.to`.
    pub fn fuse(&mut self, node: NodeId, edge1: EdgeId, edge2: EdgeId) -> Option<EdgeId> {
        let (a, b) = if self.edges[edge1].main {
            (edge2, edge1)
        } else {
            (edge1, edge2)
        };

        let mut coords: Vec<Coord> = self.edges[a].coords.iter().rev().copied().collect();
        coords.extend(self.edges[b].coords.iter().skip(1).copied());
        let length = self.edges[a].length + self.edges[b].length;
        let attrs = self.edges[a].attrs.fused_with(
            self.edges[a].length,
            &self.edges[b].attrs,
            self.edges[b].length,
        );
        let a_to = self.edges[a].to;
        let b_to = self.edges[b].to;
        let a_reverse = self.edges[a].reverse;
        let b_reverse = self.edges[b].reverse;

        self.nodes[node].edges.retain(|&e| e != a && e != b);
        self.nodes[a_to].edges.retain(|&e| e != a_reverse);
        self.nodes[b_to].edges.retain(|&e| e != b_reverse);
        for id in [a, b, a_reverse, b_reverse] {
            self.edges[id].removed = true;
        }

        self.insert_pair(a_to, b_to, coords, length, attrs)
    }

    /// Fold the source ids of `from` into both directions of `into`.
    pub fn absorb_sources(&mut self, into: EdgeId, from: EdgeId) {
        let sources: Vec<SourceId> = self.edges[from].attrs.sources.iter().copied().collect();
        let into_reverse = self.edges[into].reverse;
        self.edges[into].attrs.sources.extend(sources.iter().copied());
        self.edges[into_reverse].attrs.sources.extend(sources);
    }

    /// Mark an edge pair active.
    pub fn activate(&mut self, id: EdgeId) {
        let reverse = self.edges[id].reverse;
        self.edges[id].attrs.active = true;
        self.edges[reverse].attrs.active = true;
    }

    /// Replace an edge pair's coordinates, keeping both directions in sync.
    pub fn set_coords(&mut self, id: EdgeId, coords: Vec<Coord>) {
        let reverse = self.edges[id].reverse;
        let reversed: Vec<Coord> = coords.iter().rev().copied().collect();
        let length = geometry::polyline_length(&coords);
        {
            let edge = &mut self.edges[id];
            edge.angle = geometry::initial_bearing(&coords);
            edge.length = length;
            edge.coords = coords;
        }
        let edge = &mut self.edges[reverse];
        edge.angle = geometry::initial_bearing(&reversed);
        edge.length = length;
        edge.coords = reversed;
    }

    /// Re-sort a node's incident list after edge bearings changed.
    pub fn resort(&mut self, node: NodeId) {
        let edges = &self.edges;
        self.nodes[node]
            .edges
            .sort_by(|&a, &b| edges[a].angle.total_cmp(&edges[b].angle));
    }

    /// Drop nodes without edges from the live order.
    pub fn collect_garbage(&mut self) {
        let nodes = &self.nodes;
        self.order.retain(|&n| !nodes[n].edges.is_empty());
    }
}
