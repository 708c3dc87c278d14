use roadnav_core::Point;

/// Minimal pathfinding interface — provides neighbor enumeration.
pub trait Pather {
    /// Append neighbors of `p` into `buf`. The caller clears `buf` before calling.
    fn neighbors(&self, p: Point, buf: &mut Vec<Point>);
}

/// Pather with an admissible heuristic. Every step costs 1.
pub trait AstarPather: Pather {
    /// Heuristic estimate of the number of steps from `from` to `to`.
    /// Must never overestimate the true step count (admissible).
    fn estimate(&self, from: Point, to: Point) -> i32;
}
