use crate::graph::{EdgeId, LineGraph, NodeId};
use log::debug;

/// A node where the active subgraph dead-ends: a single active edge, or two
/// active edges meeting at `min_angle` or sharper.
pub fn is_broken(graph: &LineGraph, node: NodeId, min_angle: f64) -> bool {
    let active: Vec<EdgeId> = graph
        .node(node)
        .edges
        .iter()
        .copied()
        .filter(|&e| graph.edge(e).attrs.active)
        .collect();
    match active.as_slice() {
        [_] => true,
        [a, b] => graph.angle_between(*a, *b) <= min_angle,
        _ => false,
    }
}

/// Highest-weight inactive edge at `node`, first in incident order on ties.
fn best_inactive(graph: &LineGraph, node: NodeId) -> Option<EdgeId> {
    let mut best: Option<EdgeId> = None;
    for &e in &graph.node(node).edges {
        let edge = graph.edge(e);
        if edge.attrs.active {
            continue;
        }
        if best.is_none_or(|b| edge.attrs.weight > graph.edge(b).attrs.weight) {
            best = Some(e);
        }
    }
    best
}

/// Extend the active skeleton from every broken node along the busiest
/// inactive edges until it is continuous or runs out of candidates.
/// Returns the number of edges activated.
pub fn reconnect(graph: &mut LineGraph, min_angle: f64) -> usize {
    let broken: Vec<NodeId> = graph
        .live_nodes()
        .iter()
        .copied()
        .filter(|&n| is_broken(graph, n, min_angle))
        .collect();

    let mut activated = 0;
    for start in &broken {
        let mut node = *start;
        while is_broken(graph, node, min_angle) {
            let Some(edge) = best_inactive(graph, node) else {
                break;
            };
            graph.activate(edge);
            activated += 1;
            node = graph.edge(edge).to;
        }
    }

    debug!(
        "Reconnected {} broken nodes by activating {} edges",
        broken.len(),
        activated
    );
    activated
}
