// ===========================================================================
// Degree-Two Reduction
// ===========================================================================
//
// Collapses pass-through nodes: a node with exactly two non-loop edges whose
// attributes agree becomes part of a single longer edge. Runs to a fixed
// point, since fusing at one node can make its neighbours eligible.

use super::{EdgeId, LineGraph, NodeId};
use crate::config::MergeRule;
use std::collections::VecDeque;

/// What the reducer is allowed to fuse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reduction {
    pub rule: MergeRule,
    /// Minimum angle between the two edges, radians. 0 fuses any turn.
    pub min_angle: f64,
}

impl Reduction {
    pub fn new(rule: MergeRule, min_angle: f64) -> Self {
        Self { rule, min_angle }
    }
}

impl Default for Reduction {
    fn default() -> Self {
        Self::new(MergeRule::GroupZoomActive, 0.0)
    }
}

impl LineGraph {
    /// The two edges at `node` if it can be collapsed under `reduction`.
    pub fn reducible_pair(&self, node: NodeId, reduction: Reduction) -> Option<(EdgeId, EdgeId)> {
        let edges = &self.node(node).edges;
        if edges.len() != 2 {
            return None;
        }
        let (a, b) = (edges[0], edges[1]);
        let (edge_a, edge_b) = (self.edge(a), self.edge(b));
        // a loop keeps the node at degree > 2 in practice
        if edge_a.is_loop() || edge_b.is_loop() {
            return None;
        }
        if !reduction.rule.compatible(&edge_a.attrs, &edge_b.attrs) {
            return None;
        }
        if self.angle_between(a, b) < reduction.min_angle {
            return None;
        }
        Some((a, b))
    }

    /// Collapse `node` if possible, returning the fused edge.
    pub fn reduce_node(&mut self, node: NodeId, reduction: Reduction) -> Option<EdgeId> {
        let (a, b) = self.reducible_pair(node, reduction)?;
        self.fuse(node, a, b)
    }

    /// Collapse every reducible node until none is left. Returns the number of fusions.
    pub fn reduce(&mut self, reduction: Reduction) -> usize {
        let mut queue: VecDeque<NodeId> = self.live_nodes().iter().copied().collect();
        let mut fused = 0;

        while let Some(node) = queue.pop_front() {
            let Some((a, b)) = self.reducible_pair(node, reduction) else {
                continue;
            };
            let a_to = self.edge(a).to;
            let b_to = self.edge(b).to;
            self.fuse(node, a, b);
            fused += 1;
            queue.push_back(a_to);
            if b_to != a_to {
                queue.push_back(b_to);
            }
        }

        self.collect_garbage();
        debug_assert!(self.validate(reduction).is_ok(), "{:?}", self.validate(reduction));
        fused
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PrecisionModel;
    use crate::graph::builder::{LineAttrs, TaggedLine, build_graph};
    use geo::Coord;
    use std::f64::consts::FRAC_PI_3;

    fn line(points: &[(f64, f64)], group: u32) -> TaggedLine {
        TaggedLine::new(
            points.iter().map(|&(x, y)| Coord { x, y }).collect(),
            LineAttrs::group(group),
        )
    }

    fn graph_of(input: &[TaggedLine]) -> LineGraph {
        let mut graph = LineGraph::new();
        build_graph(&mut graph, input, PrecisionModel::Floating, 0);
        graph
    }

    fn snapshot(graph: &LineGraph) -> Vec<Vec<Coord>> {
        let mut lines: Vec<Vec<Coord>> = graph
            .main_edges()
            .iter()
            .map(|&e| graph.edge(e).coords.clone())
            .collect();
        lines.sort_by(|a, b| {
            (a[0].x, a[0].y, a.len())
                .partial_cmp(&(b[0].x, b[0].y, b.len()))
                .unwrap()
        });
        lines
    }

    #[test]
    fn test_collinear_chain_collapses() {
        let mut graph = graph_of(&[
            line(&[(0.0, 0.0), (1.0, 0.0)], 0),
            line(&[(1.0, 0.0), (2.0, 0.0)], 0),
            line(&[(2.0, 0.0), (3.0, 0.0)], 0),
        ]);
        assert_eq!(graph.reduce(Reduction::default()), 2);

        let edges = graph.main_edges();
        assert_eq!(edges.len(), 1);
        let edge = graph.edge(edges[0]);
        assert!((edge.length - 3.0).abs() < 1e-12);
        assert_eq!(edge.coords.len(), 4);
        assert_eq!(graph.live_nodes().len(), 2);
    }

    #[test]
    fn test_preserves_original_direction() {
        let mut graph = graph_of(&[
            line(&[(0.0, 0.0), (1.0, 0.0)], 0),
            line(&[(1.0, 0.0), (2.0, 1.0)], 0),
        ]);
        graph.reduce(Reduction::default());
        let edges = graph.main_edges();
        assert_eq!(edges.len(), 1);
        assert_eq!(
            graph.edge(edges[0]).coords,
            vec![
                Coord { x: 0.0, y: 0.0 },
                Coord { x: 1.0, y: 0.0 },
                Coord { x: 2.0, y: 1.0 }
            ]
        );
    }

    #[test]
    fn test_refuses_incompatible_groups() {
        let mut graph = graph_of(&[
            line(&[(0.0, 0.0), (1.0, 0.0)], 0),
            line(&[(1.0, 0.0), (2.0, 0.0)], 1),
        ]);
        assert_eq!(graph.reduce(Reduction::default()), 0);
        assert_eq!(graph.live_edge_count(), 2);
    }

    #[test]
    fn test_min_angle_keeps_sharp_corner() {
        let input = [
            line(&[(0.0, 0.0), (10.0, 0.0)], 0),
            line(&[(10.0, 0.0), (0.0, 1.0)], 0),
        ];
        let mut graph = graph_of(&input);
        assert_eq!(graph.reduce(Reduction::new(MergeRule::Group, FRAC_PI_3)), 0);

        let mut graph = graph_of(&input);
        assert_eq!(graph.reduce(Reduction::default()), 1);
    }

    #[test]
    fn test_two_edge_cycle_becomes_loop() {
        let mut graph = graph_of(&[
            line(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)], 0),
            line(&[(1.0, 1.0), (0.0, 0.0)], 0),
        ]);
        assert_eq!(graph.reduce(Reduction::default()), 1);
        let edges = graph.main_edges();
        assert_eq!(edges.len(), 1);
        let edge = graph.edge(edges[0]);
        assert!(edge.is_loop());
        assert!((edge.length - (2.0 + 2f64.sqrt())).abs() < 1e-9);
        assert!(graph.validate(Reduction::default()).is_ok());
    }

    #[test]
    fn test_reduce_is_idempotent() {
        let mut graph = graph_of(&[
            line(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)], 0),
            line(&[(2.0, 0.0), (3.0, 0.0)], 0),
            line(&[(2.0, 0.0), (2.0, 1.0), (2.0, 2.0)], 0),
            line(&[(2.0, 2.0), (3.0, 3.0)], 0),
            line(&[(3.0, 0.0), (4.0, 0.0)], 1),
        ]);
        graph.reduce(Reduction::default());
        let once = snapshot(&graph);
        assert_eq!(graph.reduce(Reduction::default()), 0);
        assert_eq!(snapshot(&graph), once);
    }
}
