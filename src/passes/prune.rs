// ============================================================================
// Cascading Pruning
// ============================================================================
//
// A min-heap of qualifying edges is drained until empty. Removing an edge
// can turn a neighbour into a new dead end or make an endpoint reducible, so
// both endpoints are re-examined after every removal and whatever newly
// qualifies goes back on the heap. Removed edges stay in the heap as
// tombstones and are skipped on pop.

use crate::graph::reduce::Reduction;
use crate::graph::{EdgeId, LineGraph};
use log::debug;
use ordered_float::OrderedFloat;
use std::collections::BinaryHeap;

/// Decides which edges a cascade removes and in which order.
pub trait PruneCriterion {
    /// Name used in log lines.
    fn name(&self) -> &'static str;

    fn qualifies(&self, graph: &LineGraph, edge: EdgeId) -> bool;

    /// Lower values are removed first.
    fn priority(&self, graph: &LineGraph, edge: EdgeId) -> f64;
}

/// Short dead ends ("hair") and short self-loops.
#[derive(Debug, Clone, Copy)]
pub struct StubCriterion {
    pub min_length: f64,
}

impl PruneCriterion for StubCriterion {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn qualifies(&self, graph: &LineGraph, edge: EdgeId) -> bool {
        let edge = graph.edge(edge);
        !edge.removed
            && edge.length < self.min_length
            && (graph.degree(edge.from) == 1 || graph.degree(edge.to) == 1 || edge.is_loop())
    }

    fn priority(&self, graph: &LineGraph, edge: EdgeId) -> f64 {
        graph.edge(edge).length
    }
}

/// Edges carrying less traffic than `min_visits`.
#[derive(Debug, Clone, Copy)]
pub struct TrafficCriterion {
    pub min_visits: f64,
    /// Only consider self-loops.
    pub loops_only: bool,
}

impl PruneCriterion for TrafficCriterion {
    fn name(&self) -> &'static str {
        if self.loops_only { "loop traffic" } else { "traffic" }
    }

    fn qualifies(&self, graph: &LineGraph, edge: EdgeId) -> bool {
        let edge = graph.edge(edge);
        !edge.removed && edge.attrs.weight < self.min_visits && (!self.loops_only || edge.is_loop())
    }

    fn priority(&self, graph: &LineGraph, edge: EdgeId) -> f64 {
        graph.edge(edge).attrs.weight
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
struct PruneState {
    priority: OrderedFloat<f64>,
    edge: EdgeId,
}

impl Ord for PruneState {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Reverse for min-heap, lower edge id first on ties
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.edge.cmp(&self.edge))
    }
}

impl PartialOrd for PruneState {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Remove every edge `criterion` selects, cascading through the graph.
/// Endpoints are reduced under `reduction` as edges disappear.
/// Returns the number of edge pairs removed.
pub fn cascade(graph: &mut LineGraph, criterion: &impl PruneCriterion, reduction: Reduction) -> usize {
    let mut heap = BinaryHeap::new();
    let push = |heap: &mut BinaryHeap<PruneState>, graph: &LineGraph, edge: EdgeId| {
        if criterion.qualifies(graph, edge) {
            heap.push(PruneState {
                priority: OrderedFloat(criterion.priority(graph, edge)),
                edge,
            });
        }
    };

    for edge in graph.main_edges() {
        push(&mut heap, &*graph, edge);
    }

    let mut removed = 0;
    while let Some(PruneState { edge, .. }) = heap.pop() {
        if graph.edge(edge).removed || !criterion.qualifies(graph, edge) {
            continue;
        }
        let (from, to) = (graph.edge(edge).from, graph.edge(edge).to);
        graph.remove_edge(edge);
        removed += 1;

        let endpoints = if from == to { vec![from] } else { vec![from, to] };
        for node in endpoints {
            if let Some(merged) = graph.reduce_node(node, reduction) {
                push(&mut heap, &*graph, merged);
            }
            if graph.degree(node) == 1 {
                let last = graph.node(node).edges[0];
                push(&mut heap, &*graph, last);
            }
        }
    }

    graph.collect_garbage();
    if removed > 0 {
        debug!("Pruned {} edges by {} criterion", removed, criterion.name());
    }
    removed
}

/// Remove dead ends and self-loops shorter than `min_length`.
pub fn prune_stubs(graph: &mut LineGraph, min_length: f64, reduction: Reduction) -> usize {
    cascade(graph, &StubCriterion { min_length }, reduction)
}

/// Two-phase traffic pruning: self-loops under `loop_min_visits` first, then
/// everything under `min_visits`.
pub fn prune_traffic(
    graph: &mut LineGraph,
    min_visits: f64,
    loop_min_visits: f64,
    reduction: Reduction,
) -> usize {
    let loops = TrafficCriterion {
        min_visits: loop_min_visits,
        loops_only: true,
    };
    let main = TrafficCriterion {
        min_visits,
        loops_only: false,
    };
    cascade(graph, &loops, reduction) + cascade(graph, &main, reduction)
}

/// Drop every edge shorter than `min_length`, without cascading.
pub fn remove_short_edges(graph: &mut LineGraph, min_length: f64) -> usize {
    let short: Vec<EdgeId> = graph
        .main_edges()
        .into_iter()
        .filter(|&e| graph.edge(e).length < min_length)
        .collect();
    let removed = short.into_iter().filter(|&e| graph.remove_edge(e)).count();
    graph.collect_garbage();
    if removed > 0 {
        debug!("Removed {} edges shorter than {}", removed, min_length);
    }
    removed
}
