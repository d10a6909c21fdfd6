use crate::geometry;
use crate::graph::{EdgeId, LineGraph};
use log::debug;

/// Douglas-Peucker every edge with its endpoints pinned.
///
/// Edges that collapse to a single point are removed. Lengths and bearings
/// are recomputed from the simplified coordinates and every node's incident
/// list is re-sorted. Returns the number of collapsed edges.
pub fn simplify(graph: &mut LineGraph, tolerance: f64) -> usize {
    let mut collapsed = 0;
    let mut dropped_points = 0;

    for edge in graph.main_edges() {
        let before = graph.edge(edge).coords.len();
        let simplified = geometry::simplify_preserving_ends(&graph.edge(edge).coords, tolerance);
        dropped_points += before - simplified.len();
        graph.set_coords(edge, simplified);
        if graph.edge(edge).is_collapsed() {
            graph.remove_edge(edge);
            collapsed += 1;
        }
    }

    for node in graph.live_nodes().to_vec() {
        graph.resort(node);
    }
    graph.collect_garbage();

    debug!(
        "Simplified with tolerance {}: dropped {} points, {} edges collapsed",
        tolerance, dropped_points, collapsed
    );
    collapsed
}

fn same_path(graph: &LineGraph, a: EdgeId, b: EdgeId) -> bool {
    let (a, b) = (graph.edge(a), graph.edge(b));
    a.to == b.to && a.attrs.group == b.attrs.group && a.coords == b.coords
}

/// Remove edges that became identical to a sibling at the same node.
/// The survivor inherits the duplicate's source ids.
pub fn remove_duplicates(graph: &mut LineGraph) -> usize {
    let mut removed = 0;

    for node in graph.live_nodes().to_vec() {
        let incident = graph.node(node).edges.clone();
        for (i, &a) in incident.iter().enumerate() {
            if graph.edge(a).removed {
                continue;
            }
            for &b in &incident[i + 1..] {
                if !graph.edge(b).removed && same_path(graph, a, b) {
                    graph.absorb_sources(a, b);
                    graph.remove_edge(b);
                    removed += 1;
                }
            }
        }
    }

    graph.collect_garbage();
    if removed > 0 {
        debug!("Removed {} duplicated edges", removed);
    }
    removed
}
