// ============================================================================
// Face Breaking
// ============================================================================
//
// Finds small enclosed faces by always taking the next edge clockwise from
// the one just arrived on (incident lists are sorted by bearing), and cuts
// each face shorter than the loop threshold open by removing one edge.

use crate::graph::{EdgeId, LineGraph};
use ahash::AHashSet;
use log::debug;

const MAX_FACE_DEPTH: usize = 100;

/// Edge following `arriving` around the face on its right-hand side.
fn next_edge(graph: &LineGraph, arriving: EdgeId) -> Option<EdgeId> {
    let edge = graph.edge(arriving);
    let incident = &graph.node(edge.to).edges;
    // a loop's reverse is never attached, so it re-enters at its own slot
    let index = incident
        .iter()
        .position(|&e| e == edge.reverse)
        .or_else(|| incident.iter().position(|&e| e == arriving))?;
    Some(incident[(index + 1) % incident.len()])
}

/// The face walked from `start`, or `None` when the walk does not close
/// within the depth cap, encloses nothing, or is longer than `max_length`.
fn walk_face(graph: &LineGraph, start: EdgeId, max_length: f64) -> Option<Vec<EdgeId>> {
    let edge = graph.edge(start);
    if graph.degree(edge.from) == 1 && graph.degree(edge.to) == 1 {
        return None;
    }

    let mut face = vec![start];
    let mut length = edge.length;
    let mut current = start;
    loop {
        current = next_edge(graph, current)?;
        if current == start {
            break;
        }
        if face.len() > MAX_FACE_DEPTH {
            return None;
        }
        length += graph.edge(current).length;
        face.push(current);
    }

    // both sides of every edge: the walk went round a tree
    if face.iter().all(|&e| face.contains(&graph.edge(e).reverse)) {
        return None;
    }

    (length <= max_length).then_some(face)
}

fn face_length(graph: &LineGraph, face: &[EdgeId]) -> f64 {
    face.iter().map(|&e| graph.edge(e).length).sum()
}

/// Every distinct face no longer than `max_length`, shortest first.
pub fn short_faces(graph: &LineGraph, max_length: f64) -> Vec<Vec<EdgeId>> {
    let mut visited: AHashSet<EdgeId> = AHashSet::new();
    let mut faces = Vec::new();

    for &node in graph.live_nodes() {
        for &edge in &graph.node(node).edges {
            if visited.contains(&edge) {
                continue;
            }
            if let Some(face) = walk_face(graph, edge, max_length) {
                visited.extend(face.iter().copied());
                faces.push(face);
            }
        }
    }

    faces.sort_by(|a, b| face_length(graph, a).total_cmp(&face_length(graph, b)));
    faces
}

/// Cut open every face no longer than `loop_min_length`, shortest first.
/// A face that already lost an edge to a shorter neighbour is left alone.
/// Returns the number of edges removed. Does not reduce afterwards.
pub fn break_short_faces(graph: &mut LineGraph, loop_min_length: f64) -> usize {
    let faces = short_faces(graph, loop_min_length);
    let mut removed = 0;

    for face in &faces {
        if face.iter().any(|&e| graph.edge(e).removed) {
            continue;
        }
        if graph.remove_edge(face[0]) {
            removed += 1;
        }
    }

    graph.collect_garbage();
    if removed > 0 {
        debug!("Broke {} of {} short faces", removed, faces.len());
    }
    removed
}
