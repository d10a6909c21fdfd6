use super::{EdgeAttrs, GroupId, LineGraph, SourceId};
use crate::geometry::{self, CoordKey, PrecisionModel};
use ahash::AHashMap;
use geo::{Coord, LineString};
use log::trace;
use serde::{Deserialize, Serialize};

/// Per-line attributes supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineAttrs {
    pub group: GroupId,
    pub weight: f64,
    pub min_zoom: i32,
    pub source_id: SourceId,
}

impl Default for LineAttrs {
    fn default() -> Self {
        Self {
            group: 0,
            weight: 1.0,
            min_zoom: 0,
            source_id: 0,
        }
    }
}

impl LineAttrs {
    pub fn group(group: GroupId) -> Self {
        Self {
            group,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaggedLine {
    pub line: LineString,
    pub attrs: LineAttrs,
}

impl TaggedLine {
    pub fn new(line: LineString, attrs: LineAttrs) -> Self {
        Self { line, attrs }
    }
}

/// A snapped, junction-free piece of an input line.
struct AtomicLine {
    coords: Vec<Coord>,
    attrs: LineAttrs,
}

/// Split every input line at shared vertices and load the pieces into `graph`.
///
/// The graph is cleared first. Lines with fewer than two distinct points
/// after snapping are dropped.
pub fn build_graph(
    graph: &mut LineGraph,
    input: &[TaggedLine],
    precision: PrecisionModel,
    default_active_min_zoom: i32,
) {
    graph.clear();

    for atomic in split_at_junctions(input, precision) {
        let first = atomic.coords[0];
        let last = atomic.coords[atomic.coords.len() - 1];
        let from = graph.node_at(first);
        let to = graph.node_at(last);
        let length = geometry::polyline_length(&atomic.coords);
        let attrs = EdgeAttrs {
            group: atomic.attrs.group,
            weight: atomic.attrs.weight,
            min_zoom: atomic.attrs.min_zoom,
            active: atomic.attrs.min_zoom <= default_active_min_zoom,
            sources: [atomic.attrs.source_id].into_iter().collect(),
        };
        graph.insert_pair(from, to, atomic.coords, length, attrs);
    }
}

fn split_at_junctions(input: &[TaggedLine], precision: PrecisionModel) -> Vec<AtomicLine> {
    // How often each snapped point is visited. A point seen twice is a
    // junction, whether two lines meet there or one line comes back to it.
    let mut visits: AHashMap<CoordKey, usize> = AHashMap::new();
    let mut snapped_lines: Vec<AtomicLine> = Vec::with_capacity(input.len());

    for tagged in input {
        let mut snapped: Vec<Coord> = Vec::with_capacity(tagged.line.0.len());
        for coord in &tagged.line.0 {
            let current = precision.make_precise(*coord);
            if snapped.last() != Some(&current) {
                snapped.push(current);
            }
        }
        if snapped.len() >= 2 {
            for coord in &snapped {
                *visits.entry(geometry::coord_key(*coord)).or_insert(0) += 1;
            }
            snapped_lines.push(AtomicLine {
                coords: snapped,
                attrs: tagged.attrs,
            });
        } else {
            trace!(
                "Dropping degenerate line from source {} ({} distinct points)",
                tagged.attrs.source_id,
                snapped.len()
            );
        }
    }

    let mut result = Vec::with_capacity(snapped_lines.len());
    for line in snapped_lines {
        let coords = line.coords;
        let mut start = 0;
        for i in 1..coords.len() - 1 {
            let seen = visits.get(&geometry::coord_key(coords[i])).copied().unwrap_or(0);
            if seen > 1 {
                result.push(AtomicLine {
                    coords: coords[start..=i].to_vec(),
                    attrs: line.attrs,
                });
                start = i;
            }
        }
        result.push(AtomicLine {
            coords: coords[start..].to_vec(),
            attrs: line.attrs,
        });
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(points: &[(f64, f64)], group: GroupId, source_id: SourceId) -> TaggedLine {
        TaggedLine::new(
            points.iter().map(|&(x, y)| Coord { x, y }).collect(),
            LineAttrs {
                source_id,
                ..LineAttrs::group(group)
            },
        )
    }

    #[test]
    fn test_splits_at_shared_interior_vertex() {
        let input = vec![
            line(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)], 0, 1),
            line(&[(1.0, -1.0), (1.0, 0.0), (1.0, 1.0)], 0, 2),
        ];
        let mut graph = LineGraph::new();
        build_graph(&mut graph, &input, PrecisionModel::Floating, 0);

        assert_eq!(graph.live_edge_count(), 4);
        let center = graph.node_at(Coord { x: 1.0, y: 0.0 });
        assert_eq!(graph.degree(center), 4);
        for e in graph.main_edges() {
            let edge = graph.edge(e);
            assert_eq!(edge.coords.len(), 2);
            assert_eq!(edge.coords[0], graph.node(edge.from).coord);
            assert_eq!(*edge.coords.last().unwrap(), graph.node(edge.to).coord);
        }
    }

    #[test]
    fn test_snaps_and_drops_degenerate_lines() {
        let input = vec![
            // collapses to a single point on a unit grid
            line(&[(0.1, 0.1), (0.2, 0.2)], 0, 1),
            line(&[(0.0, 0.0), (0.9, 0.1), (1.1, 0.0), (2.0, 0.0)], 0, 2),
        ];
        let mut graph = LineGraph::new();
        build_graph(&mut graph, &input, PrecisionModel::Fixed { scale: 1.0 }, 0);

        let edges = graph.main_edges();
        assert_eq!(edges.len(), 1);
        assert_eq!(
            graph.edge(edges[0]).coords,
            vec![
                Coord { x: 0.0, y: 0.0 },
                Coord { x: 1.0, y: 0.0 },
                Coord { x: 2.0, y: 0.0 }
            ]
        );
    }

    #[test]
    fn test_dropped_line_does_not_split_others() {
        let input = vec![
            line(&[(1.0, 0.0), (1.0, 0.0)], 0, 1),
            line(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)], 0, 2),
        ];
        let mut graph = LineGraph::new();
        build_graph(&mut graph, &input, PrecisionModel::Floating, 0);

        assert_eq!(graph.main_edges().len(), 1);
    }

    #[test]
    fn test_parallel_duplicates_coalesce_sources() {
        let input = vec![
            line(&[(0.0, 0.0), (1.0, 0.0)], 3, 10),
            line(&[(0.0, 0.0), (1.0, 0.0)], 3, 11),
        ];
        let mut graph = LineGraph::new();
        build_graph(&mut graph, &input, PrecisionModel::Floating, 0);

        let edges = graph.main_edges();
        assert_eq!(edges.len(), 1);
        let sources = &graph.edge(edges[0]).attrs.sources;
        assert!(sources.contains(&10) && sources.contains(&11));
    }

    #[test]
    fn test_active_flag_from_min_zoom() {
        let mut input = vec![
            line(&[(0.0, 0.0), (1.0, 0.0)], 0, 1),
            line(&[(5.0, 0.0), (6.0, 0.0)], 0, 2),
        ];
        input[0].attrs.min_zoom = 4;
        input[1].attrs.min_zoom = 9;
        let mut graph = LineGraph::new();
        build_graph(&mut graph, &input, PrecisionModel::Floating, 6);

        let active: Vec<bool> = graph
            .main_edges()
            .iter()
            .map(|&e| graph.edge(e).attrs.active)
            .collect();
        assert_eq!(active, vec![true, false]);
    }
}
