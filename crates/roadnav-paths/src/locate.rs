//! Nearest-node lookup.

use roadnav_core::{Point, Position};

use crate::graph::RoadGraph;

/// Return the road cell closest to `p` by Manhattan distance on the X/Z
/// plane.
///
/// Ties go to the first cell in the graph's iteration order; callers should
/// not rely on which of several equidistant cells is returned. Returns
/// `None` for an empty graph or a non-finite position.
pub fn nearest_node(graph: &RoadGraph, p: Position) -> Option<Point> {
    let mut best: Option<(Point, f64)> = None;
    for &n in graph.nodes() {
        let d = p.manhattan_to(n);
        if !d.is_finite() {
            continue;
        }
        match best {
            Some((_, bd)) if d >= bd => {}
            _ => best = Some((n, d)),
        }
    }
    best.map(|(n, _)| n)
}
