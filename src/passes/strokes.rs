use crate::config::MergeRule;
use crate::graph::{EdgeId, LineGraph};
use ahash::AHashSet;
use itertools::Itertools;
use log::debug;

/// At every junction, fuse pairs of edges that `rule` accepts and that
/// continue straightest through it. Each edge is matched at most once per
/// node. Returns the number of fusions.
pub fn merge_strokes(graph: &mut LineGraph, rule: MergeRule) -> usize {
    let mut fused = 0;

    for node in graph.live_nodes().to_vec() {
        if graph.degree(node) < 2 {
            continue;
        }

        let mut pairs: Vec<(f64, EdgeId, EdgeId)> = graph
            .node(node)
            .edges
            .iter()
            .copied()
            .tuple_combinations()
            .filter(|&(a, b)| graph.edge(a).reverse != b)
            .map(|(a, b)| (graph.angle_between(a, b), a, b))
            .collect();
        // straightest (closest to PI) first
        pairs.sort_by(|x, y| y.0.total_cmp(&x.0));

        let mut matched: AHashSet<EdgeId> = AHashSet::new();
        for (_, a, b) in pairs {
            if matched.contains(&a) || matched.contains(&b) {
                continue;
            }
            if graph.edge(a).removed || graph.edge(b).removed {
                continue;
            }
            if !rule.compatible(&graph.edge(a).attrs, &graph.edge(b).attrs) {
                continue;
            }
            matched.insert(a);
            matched.insert(b);
            graph.fuse(node, a, b);
            fused += 1;
        }
    }

    graph.collect_garbage();
    if fused > 0 {
        debug!("Merged {} strokes", fused);
    }
    fused
}
