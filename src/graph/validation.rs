use super::reduce::Reduction;
use super::LineGraph;
use crate::error::InvariantViolation;

impl LineGraph {
    /// Check the structural invariants every pass must leave behind.
    ///
    /// Only degree-two nodes that `reduction` could still collapse are
    /// reported; incompatible pass-through nodes are legal.
    pub fn validate(&self, reduction: Reduction) -> Result<(), InvariantViolation> {
        for &node in self.live_nodes() {
            let incident = &self.node(node).edges;

            for &id in incident {
                let edge = self.edge(id);
                if edge.removed || edge.from != node {
                    return Err(InvariantViolation::DanglingEdge { node, edge: id });
                }
                if edge.is_loop() {
                    if incident.contains(&edge.reverse) {
                        return Err(InvariantViolation::EdgeWithOwnReverse { node, edge: id });
                    }
                } else if !self.node(edge.to).edges.contains(&edge.reverse) {
                    return Err(InvariantViolation::MissingReverse { node, edge: id });
                }
            }

            for (i, &a) in incident.iter().enumerate() {
                for &b in &incident[i + 1..] {
                    let (edge_a, edge_b) = (self.edge(a), self.edge(b));
                    if edge_a.to == edge_b.to
                        && edge_a.attrs.group == edge_b.attrs.group
                        && edge_a.coords == edge_b.coords
                    {
                        return Err(InvariantViolation::DuplicateEdges { node, a, b });
                    }
                }
            }

            if self.reducible_pair(node, reduction).is_some() {
                return Err(InvariantViolation::ReducibleNode { node });
            }
        }
        Ok(())
    }
}
