use crate::graph::{EdgeId, NodeId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("invalid merger config field '{field}': {reason}")]
    InvalidConfig { field: &'static str, reason: String },
    #[error("failed to parse merger config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Broken graph invariants. These are logic errors inside the engine, only
/// surfaced by [`crate::graph::LineGraph::validate`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvariantViolation {
    #[error("edge {edge} at node {node} has no reverse at its far node")]
    MissingReverse { node: NodeId, edge: EdgeId },
    #[error("node {node} holds edge {edge} and its own reverse")]
    EdgeWithOwnReverse { node: NodeId, edge: EdgeId },
    #[error("node {node} holds duplicate edges {a} and {b}")]
    DuplicateEdges { node: NodeId, a: EdgeId, b: EdgeId },
    #[error("node {node} still has two mergeable edges")]
    ReducibleNode { node: NodeId },
    #[error("edge {edge} is attached to node {node} but is removed or starts elsewhere")]
    DanglingEdge { node: NodeId, edge: EdgeId },
}
