// ===========================================================================
// Geometry adapter over `geo`
// ===========================================================================
//
// Everything the merge engine needs from a 2D geometry library: snapping to a
// precision grid, lengths, initial bearings and an endpoint-preserving
// Douglas-Peucker pass. Coordinates are planar (tile pixels or projected
// metres), never lon/lat degrees.

#![allow(deprecated)]

use geo::{Coord, EuclideanDistance, Line, Point};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Snap grid applied to every input vertex (matches a JTS precision model).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PrecisionModel {
    /// No snapping at all.
    Floating,
    /// Round to a grid of `1 / scale` units.
    Fixed { scale: f64 },
}

impl Default for PrecisionModel {
    fn default() -> Self {
        // 4096 tile extent rendered at 256px
        PrecisionModel::Fixed { scale: 16.0 }
    }
}

impl PrecisionModel {
    pub fn make_precise(&self, coord: Coord) -> Coord {
        match *self {
            PrecisionModel::Floating => coord,
            PrecisionModel::Fixed { scale } => Coord {
                x: round_half_up(coord.x * scale) / scale,
                y: round_half_up(coord.y * scale) / scale,
            },
        }
    }
}

fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Hashable identity of a snapped coordinate. `-0.0` and `0.0` share a key.
pub type CoordKey = (u64, u64);

pub fn coord_key(coord: Coord) -> CoordKey {
    ((coord.x + 0.0).to_bits(), (coord.y + 0.0).to_bits())
}

pub fn distance(a: Coord, b: Coord) -> f64 {
    Point::from(a).euclidean_distance(&Point::from(b))
}

/// Sum of consecutive point distances.
pub fn polyline_length(coords: &[Coord]) -> f64 {
    coords.windows(2).map(|w| distance(w[0], w[1])).sum()
}

/// Bearing of the segment `a -> b` in radians, in `(-PI, PI]`.
pub fn bearing(a: Coord, b: Coord) -> f64 {
    (b.y - a.y).atan2(b.x - a.x)
}

/// Bearing of the first segment of a polyline, 0 for degenerate input.
pub fn initial_bearing(coords: &[Coord]) -> f64 {
    match coords {
        [a, b, ..] => bearing(*a, *b),
        _ => 0.0,
    }
}

/// Normalise an angle into `(-PI, PI]`.
pub fn normalize_angle(mut angle: f64) -> f64 {
    while angle > PI {
        angle -= 2.0 * PI;
    }
    while angle <= -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Absolute angular difference between two bearings, in `[0, PI]`.
/// `PI` means the two segments leave in opposite directions (straight through).
pub fn angle_between(bearing_a: f64, bearing_b: f64) -> f64 {
    normalize_angle(bearing_a - bearing_b).abs()
}

/// Douglas-Peucker simplification that always keeps the first and last point.
///
/// Interior points whose distance to the current chord is `<= tolerance` are
/// dropped, so a tolerance of 0 still removes exactly collinear points.
pub fn simplify_preserving_ends(coords: &[Coord], tolerance: f64) -> Vec<Coord> {
    if coords.len() < 3 {
        return coords.to_vec();
    }

    let last = coords.len() - 1;
    let mut kept = vec![false; coords.len()];
    kept[0] = true;
    kept[last] = true;

    let mut stack = vec![(0usize, last)];
    while let Some((start, end)) = stack.pop() {
        if end <= start + 1 {
            continue;
        }
        let chord = Line::new(coords[start], coords[end]);
        let mut max_dist = -1.0;
        let mut max_idx = start;
        for (offset, coord) in coords[start + 1..end].iter().enumerate() {
            let dist = Point::from(*coord).euclidean_distance(&chord);
            if dist > max_dist {
                max_dist = dist;
                max_idx = start + 1 + offset;
            }
        }
        if max_dist > tolerance {
            kept[max_idx] = true;
            stack.push((start, max_idx));
            stack.push((max_idx, end));
        }
    }

    coords
        .iter()
        .zip(&kept)
        .filter(|&(_, k)| *k)
        .map(|(&c, _)| c)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: f64, y: f64) -> Coord {
        Coord { x, y }
    }

    #[test]
    fn test_fixed_precision_rounds_half_up() {
        let model = PrecisionModel::Fixed { scale: 4.0 };
        assert_eq!(model.make_precise(c(0.125, 0.1)), c(0.25, 0.0));
        assert_eq!(model.make_precise(c(-0.125, 1.3)), c(0.0, 1.25));
        assert_eq!(PrecisionModel::Floating.make_precise(c(0.123, 4.56)), c(0.123, 4.56));
    }

    #[test]
    fn test_coord_key_ignores_signed_zero() {
        assert_eq!(coord_key(c(-0.0, 1.0)), coord_key(c(0.0, 1.0)));
        assert_ne!(coord_key(c(0.0, 1.0)), coord_key(c(1.0, 0.0)));
    }

    #[test]
    fn test_angle_between_straight_and_sharp() {
        let east = bearing(c(0.0, 0.0), c(1.0, 0.0));
        let west = bearing(c(0.0, 0.0), c(-1.0, 0.0));
        let north = bearing(c(0.0, 0.0), c(0.0, 1.0));
        assert!((angle_between(east, west) - PI).abs() < 1e-12);
        assert!((angle_between(east, north) - PI / 2.0).abs() < 1e-12);
        assert!(angle_between(north, north).abs() < 1e-12);
        // wraps across the +-PI seam
        let a = 3.0;
        let b = -3.0;
        assert!((angle_between(a, b) - (2.0 * PI - 6.0)).abs() < 1e-12);
    }

    #[test]
    fn test_polyline_length() {
        let coords = vec![c(0.0, 0.0), c(3.0, 0.0), c(3.0, 4.0)];
        assert!((polyline_length(&coords) - 7.0).abs() < 1e-12);
        assert_eq!(polyline_length(&coords[..1]), 0.0);
    }

    #[test]
    fn test_zero_tolerance_drops_collinear_points_only() {
        let coords = vec![c(0.0, 0.0), c(1.0, 0.0), c(2.0, 0.0), c(2.0, 1.0)];
        let simplified = simplify_preserving_ends(&coords, 0.0);
        assert_eq!(simplified, vec![c(0.0, 0.0), c(2.0, 0.0), c(2.0, 1.0)]);
    }

    #[test]
    fn test_simplify_keeps_endpoints() {
        let coords = vec![c(0.0, 0.0), c(1.0, 0.2), c(2.0, -0.1), c(3.0, 0.0)];
        let simplified = simplify_preserving_ends(&coords, 0.5);
        assert_eq!(simplified, vec![c(0.0, 0.0), c(3.0, 0.0)]);

        let kept = simplify_preserving_ends(&coords, 0.15);
        assert_eq!(kept.first(), Some(&c(0.0, 0.0)));
        assert_eq!(kept.last(), Some(&c(3.0, 0.0)));
        assert!(kept.contains(&c(1.0, 0.2)));
    }

    #[test]
    fn test_simplify_closed_ring_keeps_far_points() {
        let ring = vec![c(0.0, 0.0), c(4.0, 0.0), c(4.0, 4.0), c(0.0, 0.0)];
        let simplified = simplify_preserving_ends(&ring, 0.1);
        assert_eq!(simplified.len(), 4);
    }
}
