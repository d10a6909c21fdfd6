// ============================================================================
// Loop Breaking
// ============================================================================
//
// Two nodes connected by several short alternative paths keep only one of
// them. Path lengths come from a bounded A* search over the live graph.

use crate::config::LoopTieBreak;
use crate::graph::{EdgeId, LineGraph, NodeId};
use ahash::AHashMap;
use log::debug;
use ordered_float::OrderedFloat;
use std::collections::BinaryHeap;

/// State for the A* frontier
#[derive(Clone, Copy, PartialEq, Eq)]
struct AStarState {
    /// Length so far plus straight-line distance to the target.
    estimate: OrderedFloat<f64>,
    length: OrderedFloat<f64>,
    node: NodeId,
}

impl Ord for AStarState {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Reverse for min-heap
        other.estimate.cmp(&self.estimate)
    }
}

impl PartialOrd for AStarState {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Shortest path length from `start` to `end` that never passes through
/// `exclude`. Partial paths whose optimistic total exceeds `max_length` are
/// dropped; `f64::INFINITY` means no such path exists.
pub fn shortest_distance_astar(
    graph: &LineGraph,
    start: NodeId,
    end: NodeId,
    exclude: NodeId,
    max_length: f64,
) -> f64 {
    if start == exclude {
        return f64::INFINITY;
    }

    let mut best: AHashMap<NodeId, f64> = AHashMap::new();
    let mut heap = BinaryHeap::new();
    heap.push(AStarState {
        estimate: OrderedFloat(graph.node_distance(start, end)),
        length: OrderedFloat(0.0),
        node: start,
    });

    while let Some(AStarState { length, node, .. }) = heap.pop() {
        if node == end {
            return length.0;
        }

        for &edge_id in &graph.node(node).edges {
            let edge = graph.edge(edge_id);
            let neighbor = edge.to;
            if neighbor == exclude {
                continue;
            }
            let next = length.0 + edge.length;
            if best.get(&neighbor).is_some_and(|&prev| next >= prev) {
                continue;
            }
            best.insert(neighbor, next);
            let estimate = next + graph.node_distance(neighbor, end);
            if estimate <= max_length {
                heap.push(AStarState {
                    estimate: OrderedFloat(estimate),
                    length: OrderedFloat(next),
                    node: neighbor,
                });
            }
        }
    }

    f64::INFINITY
}

/// An edge closing a loop no longer than the configured minimum.
#[derive(Debug, Clone, Copy)]
struct LoopCandidate {
    edge: EdgeId,
    distance: f64,
}

/// Index into `candidates` of the one that survives.
fn survivor(graph: &LineGraph, candidates: &[LoopCandidate], tie_break: LoopTieBreak) -> usize {
    let mut keep = 0;
    for (i, candidate) in candidates.iter().enumerate().skip(1) {
        let kept = &candidates[keep];
        let (attrs, kept_attrs) = (&graph.edge(candidate.edge).attrs, &graph.edge(kept.edge).attrs);
        let better = match tie_break {
            LoopTieBreak::HighestWeight => attrs.weight > kept_attrs.weight,
            LoopTieBreak::LowestGroupLongestPath => {
                attrs.group < kept_attrs.group
                    || (attrs.group == kept_attrs.group && candidate.distance > kept.distance)
            }
        };
        if better {
            keep = i;
        }
    }
    keep
}

/// Remove alternative paths no longer than `loop_min_length` so that each
/// pair of nearby endpoints stays connected by exactly one of them.
/// Returns the number of edges removed. Does not reduce afterwards.
pub fn break_loops(graph: &mut LineGraph, loop_min_length: f64, tie_break: LoopTieBreak) -> usize {
    let mut removed = 0;
    let nodes = graph.live_nodes().to_vec();

    for node in nodes {
        if graph.degree(node) <= 1 {
            continue;
        }
        let incident = graph.node(node).edges.clone();
        for current in incident {
            // removed by an earlier round at this node
            if !graph.node(node).edges.contains(&current) {
                continue;
            }
            let (current_from, current_to) = {
                let edge = graph.edge(current);
                (edge.from, edge.to)
            };

            let candidates: Vec<LoopCandidate> = graph
                .node(node)
                .edges
                .iter()
                .filter_map(|&other| {
                    let edge = graph.edge(other);
                    let distance = edge.length
                        + shortest_distance_astar(
                            graph,
                            edge.to,
                            current_to,
                            current_from,
                            loop_min_length - edge.length,
                        );
                    (distance <= loop_min_length).then_some(LoopCandidate { edge: other, distance })
                })
                .collect();

            if candidates.len() > 1 {
                let keep = survivor(graph, &candidates, tie_break);
                for (i, candidate) in candidates.iter().enumerate() {
                    if i != keep && graph.remove_edge(candidate.edge) {
                        removed += 1;
                    }
                }
            }
        }
    }

    if removed > 0 {
        debug!("Broke short loops, removed {} edges", removed);
    }
    removed
}
