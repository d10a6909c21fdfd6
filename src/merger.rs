// ===========================================================================
// Line Merger
// ===========================================================================
//
// Accumulates tagged input lines and runs the full pipeline over them on
// demand. Every call rebuilds the graph from scratch, so the merger can be
// called repeatedly while more input is added, but a single instance must
// not be shared between threads mid-call.

use crate::config::{MergeRule, MergerConfig};
use crate::error::MergeError;
use crate::graph::builder::{LineAttrs, TaggedLine, build_graph};
use crate::graph::reduce::Reduction;
use crate::graph::{LineGraph, SourceId};
use crate::output::{self, MergedLine, OutputView};
use crate::passes::{faces, loops, prune, reconnect, simplify, strokes};
use ahash::AHashSet;
use geo_types::LineString;
use log::{debug, info};

#[derive(Debug, Default)]
pub struct LineMerger {
    config: MergerConfig,
    input: Vec<TaggedLine>,
    graph: LineGraph,
}

impl LineMerger {
    pub fn new(config: MergerConfig) -> Self {
        Self {
            config,
            input: Vec::new(),
            graph: LineGraph::new(),
        }
    }

    /// Like [`LineMerger::new`], rejecting configs that fail validation.
    pub fn try_new(config: MergerConfig) -> Result<Self, MergeError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &MergerConfig {
        &self.config
    }

    pub fn add(&mut self, line: TaggedLine) {
        self.input.push(line);
    }

    pub fn add_line(&mut self, line: impl Into<LineString>, attrs: LineAttrs) {
        self.input.push(TaggedLine::new(line.into(), attrs));
    }

    pub fn input_len(&self) -> usize {
        self.input.len()
    }

    /// The graph left behind by the last pipeline run.
    pub fn graph(&self) -> &LineGraph {
        &self.graph
    }

    fn reduction(&self) -> Reduction {
        Reduction::new(self.config.merge_rule, self.config.min_merge_angle)
    }

    fn build(&mut self) {
        build_graph(
            &mut self.graph,
            &self.input,
            self.config.precision,
            self.config.default_active_min_zoom,
        );
        debug!(
            "Built graph from {} lines: {} nodes, {} edges",
            self.input.len(),
            self.graph.live_nodes().len(),
            self.graph.live_edge_count()
        );
    }

    fn reduce(&mut self, reduction: Reduction) {
        let fused = self.graph.reduce(reduction);
        debug!(
            "Reduced {} pass-through nodes, {} edges left",
            fused,
            self.graph.live_edge_count()
        );
    }

    /// Run the full merge pipeline over everything added so far.
    pub fn merged_lines(&mut self) -> Vec<MergedLine> {
        info!("Merging {} input lines", self.input.len());
        let reduction = self.reduction();
        let config = self.config.clone();

        self.build();

        if config.loop_min_length > 0.0 {
            // once on the split graph, once more after the first reduction
            // exposes loops that were hidden behind pass-through nodes
            loops::break_loops(&mut self.graph, config.loop_min_length, config.loop_tie_break);
            self.reduce(reduction);
            loops::break_loops(&mut self.graph, config.loop_min_length, config.loop_tie_break);
        }
        self.reduce(reduction);

        if config.min_visits > 0.0 {
            prune::prune_traffic(
                &mut self.graph,
                config.min_visits,
                config.loop_min_visits,
                reduction,
            );
            self.reduce(reduction);
        }

        if config.stub_min_length > 0.0 {
            prune::prune_stubs(&mut self.graph, config.stub_min_length, reduction);
            self.reduce(reduction);
        }

        if config.tolerance >= 0.0 {
            simplify::simplify(&mut self.graph, config.tolerance);
            simplify::remove_duplicates(&mut self.graph);
            self.reduce(reduction);
        }

        if config.merge_strokes {
            strokes::merge_strokes(&mut self.graph, config.merge_rule);
            self.reduce(reduction);
        }

        if config.break_faces && config.loop_min_length > 0.0 {
            faces::break_short_faces(&mut self.graph, config.loop_min_length);
            self.reduce(reduction);
            if config.stub_min_length > 0.0 {
                prune::prune_stubs(&mut self.graph, config.stub_min_length, reduction);
                self.reduce(reduction);
            }
        }

        if config.min_length > 0.0 {
            prune::remove_short_edges(&mut self.graph, config.min_length);
            self.reduce(reduction);
        }

        let lines = self.finish(OutputView::All);
        info!(
            "Merged {} input lines into {} output lines",
            self.input.len(),
            lines.len()
        );
        lines
    }

    /// Routing variant: merge only edges that agree on group, zoom and
    /// active state, then extend the active skeleton across gaps. Returns
    /// the active lines.
    pub fn routing_skeleton(&mut self) -> Vec<MergedLine> {
        info!("Building routing skeleton from {} input lines", self.input.len());
        let min_angle = self.config.skeleton_min_angle;

        self.build();
        self.reduce(Reduction::new(MergeRule::GroupZoomActive, min_angle));
        reconnect::reconnect(&mut self.graph, min_angle);

        let lines = self.finish(OutputView::ActiveOnly);
        info!("Routing skeleton has {} active lines", lines.len());
        lines
    }

    fn finish(&self, view: OutputView) -> Vec<MergedLine> {
        let lines = output::collect_lines(&self.graph, view);
        match &self.config.clip {
            Some(clip) => output::clip_lines(&lines, clip),
            None => lines,
        }
    }

    /// Lines of the current graph, without clipping.
    pub fn lines(&self, view: OutputView) -> Vec<MergedLine> {
        output::collect_lines(&self.graph, view)
    }

    fn source_ids(&self, active_only: bool) -> Vec<SourceId> {
        let mut ids: AHashSet<SourceId> = AHashSet::new();
        for edge in self.graph.main_edges() {
            let attrs = &self.graph.edge(edge).attrs;
            if !active_only || attrs.active {
                ids.extend(attrs.sources.iter().copied());
            }
        }
        let mut ids: Vec<SourceId> = ids.into_iter().collect();
        ids.sort_unstable();
        ids
    }

    /// Sorted ids of input lines that survive in the current graph.
    pub fn merged_source_ids(&self) -> Vec<SourceId> {
        self.source_ids(false)
    }

    /// Sorted ids of input lines that survive on an active edge.
    pub fn active_source_ids(&self) -> Vec<SourceId> {
        self.source_ids(true)
    }
}
