// Copyright: Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Removal of the attribution is not allowed, as covered under the AGPL license

#![deny(
    clippy::mutable_key_type,
    clippy::map_entry,
    clippy::boxed_local,
    clippy::let_unit_value,
    clippy::redundant_allocation,
    clippy::bool_comparison,
    clippy::bind_instead_of_map,
    clippy::vec_box,
    clippy::while_let_loop,
    clippy::useless_asref,
    clippy::repeat_once,
    clippy::deref_addrof,
    clippy::suspicious_map,
    clippy::single_char_pattern,
    clippy::let_and_return,
    clippy::iter_nth,
    clippy::iter_cloned_collect,
    clippy::match_result_ok,
    clippy::cmp_owned,
    clippy::op_ref
)]

//! Planar line-network merging: snaps tagged polylines into a graph,
//! collapses pass-through nodes, breaks short loops, prunes stubs and quiet
//! edges, simplifies, and hands back the smallest set of lines that keeps
//! the network's topology.

pub mod batch;
pub mod config;
pub mod error;
pub mod export;
pub mod geometry;
pub mod graph;
pub mod merger;
pub mod output;
pub mod passes;


pub use batch::merge_batches;
pub use config::{LoopTieBreak, MergeRule, MergerConfig, TileClip};
pub use error::{InvariantViolation, MergeError};
pub use geometry::PrecisionModel;
pub use graph::builder::{LineAttrs, TaggedLine};
pub use graph::{GroupId, LineGraph, SourceId};
pub use merger::LineMerger;
pub use output::{MergedLine, OutputView};
