//! Graph rewriting passes run by [`crate::merger::LineMerger`] between
//! topology reductions. Each pass leaves the graph consistent but not
//! necessarily reduced.

pub mod faces;
pub mod loops;
pub mod prune;
pub mod reconnect;
pub mod simplify;
pub mod strokes;
