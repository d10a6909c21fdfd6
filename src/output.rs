use crate::config::TileClip;
use crate::graph::{GroupId, LineGraph, SourceId};
use geo::{Intersects, Rect};
use geo_types::{Coord, LineString};

/// One output polyline with the attributes needed to re-tag it downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedLine {
    pub line: LineString,
    pub group: GroupId,
    pub weight: f64,
    pub min_zoom: i32,
    pub active: bool,
    pub length: f64,
    /// Sorted ids of every input line folded into this one.
    pub source_ids: Vec<SourceId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputView {
    #[default]
    All,
    ActiveOnly,
}

/// Every live main edge as a [`MergedLine`], in node order.
pub fn collect_lines(graph: &LineGraph, view: OutputView) -> Vec<MergedLine> {
    graph
        .main_edges()
        .into_iter()
        .map(|id| graph.edge(id))
        .filter(|edge| view == OutputView::All || edge.attrs.active)
        .map(|edge| {
            let mut source_ids: Vec<SourceId> = edge.attrs.sources.iter().copied().collect();
            source_ids.sort_unstable();
            MergedLine {
                line: LineString::new(edge.coords.clone()),
                group: edge.attrs.group,
                weight: edge.attrs.weight,
                min_zoom: edge.attrs.min_zoom,
                active: edge.attrs.active,
                length: edge.length,
                source_ids,
            }
        })
        .collect()
}

impl TileClip {
    fn bounds(&self) -> Rect {
        let min = -self.buffer;
        let max = self.extent + self.buffer;
        Rect::new(Coord { x: min, y: min }, Coord { x: max, y: max })
    }

    /// Drop detail outside the buffered tile. A line is only cut where two
    /// consecutive segments both miss the tile, so a segment crossing the
    /// border keeps its outside endpoint.
    pub fn clip(&self, line: &MergedLine) -> Vec<MergedLine> {
        let bounds = self.bounds();
        let coords = &line.line.0;
        let mut pieces: Vec<Vec<Coord>> = Vec::new();
        let mut current: Vec<Coord> = Vec::new();
        let mut was_in = false;

        for segment in coords.windows(2) {
            let now_in = Rect::new(segment[0], segment[1]).intersects(&bounds);
            if now_in || was_in {
                current.push(segment[0]);
            } else if !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
            }
            was_in = now_in;
        }
        if let Some(&last) = coords.last() {
            if was_in || bounds.intersects(&last) {
                current.push(last);
            }
        }
        pieces.push(current);

        pieces
            .into_iter()
            .filter(|piece| piece.len() >= 2)
            .map(|piece| MergedLine {
                length: crate::geometry::polyline_length(&piece),
                line: LineString::new(piece),
                ..line.clone()
            })
            .collect()
    }
}

pub fn clip_lines(lines: &[MergedLine], clip: &TileClip) -> Vec<MergedLine> {
    lines.iter().flat_map(|line| clip.clip(line)).collect()
}
