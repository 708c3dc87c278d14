use std::cmp::Reverse;
use std::collections::hash_map::Entry;
use std::collections::{BinaryHeap, HashMap};

use roadnav_core::Point;

use crate::traits::AstarPather;

/// Result of a single A* search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Full path from start to goal, both endpoints included.
    Found(Vec<Point>),
    /// The open set ran dry before the goal was reached.
    Unreachable,
    /// The expansion cap was hit before the search finished.
    Aborted,
}

impl SearchOutcome {
    /// The path, if one was found.
    pub fn path(&self) -> Option<&[Point]> {
        match self {
            Self::Found(p) => Some(p),
            _ => None,
        }
    }
}

/// Per-node search bookkeeping.
struct Node {
    g: i32,
    f: i32,
    parent: Option<Point>,
    open: bool,
}

/// Open-set entry, ordered by `(f, seq)`.
///
/// `seq` increases with every push, so among equal `f` the entry pushed
/// first is expanded first. A node whose score improves while open gets a
/// fresh entry; the superseded one is skipped when popped.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct OpenEntry {
    f: i32,
    seq: u64,
    pos: Point,
}

/// Compute the shortest 4-connected path from `from` to `to` using A*.
///
/// Every step costs 1 and `pather.estimate` must be admissible, so the
/// returned path has the minimum number of steps. When several shortest
/// paths exist, which one is returned depends on insertion order into the
/// open set and should not be relied upon.
///
/// `max_expansions` bounds the number of nodes closed before giving up with
/// [`SearchOutcome::Aborted`]; `None` searches until the open set is empty.
pub fn astar_path<P: AstarPather>(
    pather: &P,
    from: Point,
    to: Point,
    max_expansions: Option<usize>,
) -> SearchOutcome {
    if from == to {
        return SearchOutcome::Found(vec![from]);
    }

    let mut nodes: HashMap<Point, Node> = HashMap::new();
    let mut open: BinaryHeap<Reverse<OpenEntry>> = BinaryHeap::new();
    let mut seq: u64 = 0;

    let start_f = pather.estimate(from, to);
    nodes.insert(
        from,
        Node {
            g: 0,
            f: start_f,
            parent: None,
            open: true,
        },
    );
    open.push(Reverse(OpenEntry {
        f: start_f,
        seq,
        pos: from,
    }));

    let mut nbuf: Vec<Point> = Vec::with_capacity(4);
    let mut expansions = 0usize;

    while let Some(Reverse(entry)) = open.pop() {
        let current = entry.pos;
        let current_g = match nodes.get_mut(&current) {
            // Skip superseded entries.
            Some(n) if n.open && n.f == entry.f => {
                n.open = false;
                n.g
            }
            _ => continue,
        };

        if current == to {
            return SearchOutcome::Found(reconstruct(&nodes, to));
        }

        expansions += 1;
        if max_expansions.is_some_and(|cap| expansions > cap) {
            log::debug!("A* from {from} to {to} aborted after {} expansions", expansions - 1);
            return SearchOutcome::Aborted;
        }

        nbuf.clear();
        pather.neighbors(current, &mut nbuf);

        let tentative_g = current_g + 1;
        for &np in nbuf.iter() {
            let f = tentative_g + pather.estimate(np, to);
            match nodes.entry(np) {
                Entry::Occupied(mut o) => {
                    let n = o.get_mut();
                    if tentative_g >= n.g {
                        continue;
                    }
                    n.g = tentative_g;
                    n.f = f;
                    n.parent = Some(current);
                    n.open = true;
                }
                Entry::Vacant(v) => {
                    v.insert(Node {
                        g: tentative_g,
                        f,
                        parent: Some(current),
                        open: true,
                    });
                }
            }
            seq += 1;
            open.push(Reverse(OpenEntry { f, seq, pos: np }));
        }
    }

    SearchOutcome::Unreachable
}

/// Follow predecessor links back from `goal` and reverse.
fn reconstruct(nodes: &HashMap<Point, Node>, goal: Point) -> Vec<Point> {
    let mut path = vec![goal];
    let mut cur = goal;
    while let Some(parent) = nodes.get(&cur).and_then(|n| n.parent) {
        path.push(parent);
        cur = parent;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::manhattan;
    use crate::graph::RoadGraph;
    use roadnav_core::Region;

    fn assert_connected(path: &[Point], from: Point, to: Point) {
        assert_eq!(path.first(), Some(&from));
        assert_eq!(path.last(), Some(&to));
        for w in path.windows(2) {
            assert!(w[0].is_adjacent(w[1]), "{} -> {} is not a step", w[0], w[1]);
        }
    }

    #[test]
    fn open_field_path_is_manhattan_length() {
        let g = RoadGraph::rasterize(&[Region::rect("square", 0.0, 0.0, 9.0, 9.0)]);
        let from = Point::new(0, 0);
        let to = Point::new(3, 4);
        let out = astar_path(&g, from, to, None);
        let path = out.path().unwrap();
        assert_eq!(path.len() - 1, 7);
        assert_eq!((path.len() - 1) as i32, manhattan(from, to));
        assert_connected(path, from, to);
        for p in path {
            assert!(g.contains(*p));
        }
    }

    #[test]
    fn same_start_and_goal() {
        let g = RoadGraph::rasterize(&[Region::rect("r", 0.0, 0.0, 2.0, 2.0)]);
        let p = Point::new(1, 1);
        assert_eq!(astar_path(&g, p, p, None), SearchOutcome::Found(vec![p]));
    }

    #[test]
    fn gap_between_regions_is_unreachable() {
        let g = RoadGraph::rasterize(&[
            Region::rect("west", 0.0, 0.0, 3.0, 3.0),
            Region::rect("east", 5.0, 0.0, 8.0, 3.0),
        ]);
        assert_eq!(
            astar_path(&g, Point::new(0, 0), Point::new(8, 3), None),
            SearchOutcome::Unreachable
        );
    }

    #[test]
    fn touching_regions_connect() {
        let g = RoadGraph::rasterize(&[
            Region::rect("west", 0.0, 0.0, 3.0, 3.0),
            Region::rect("east", 4.0, 0.0, 8.0, 3.0),
        ]);
        let out = astar_path(&g, Point::new(0, 0), Point::new(8, 3), None);
        assert_eq!(out.path().unwrap().len() - 1, 11);
    }

    #[test]
    fn detours_around_missing_cells() {
        // U-shaped road: two vertical arms joined at the bottom.
        let g = RoadGraph::rasterize(&[
            Region::rect("left", 0.0, 0.0, 0.0, 5.0),
            Region::rect("bottom", 0.0, 5.0, 4.0, 5.0),
            Region::rect("right", 4.0, 0.0, 4.0, 5.0),
        ]);
        let from = Point::new(0, 0);
        let to = Point::new(4, 0);
        let out = astar_path(&g, from, to, None);
        let path = out.path().unwrap();
        assert_eq!(path.len() - 1, 5 + 4 + 5);
        assert_connected(path, from, to);
    }

    #[test]
    fn goal_outside_graph_is_unreachable() {
        let g = RoadGraph::rasterize(&[Region::rect("r", 0.0, 0.0, 2.0, 2.0)]);
        assert_eq!(
            astar_path(&g, Point::new(0, 0), Point::new(10, 10), None),
            SearchOutcome::Unreachable
        );
    }

    #[test]
    fn expansion_cap_aborts() {
        let g = RoadGraph::rasterize(&[Region::rect("long", 0.0, 0.0, 200.0, 0.0)]);
        let from = Point::new(0, 0);
        let to = Point::new(200, 0);
        assert_eq!(astar_path(&g, from, to, Some(10)), SearchOutcome::Aborted);
        // A straight corridor closes exactly one node per step.
        assert!(astar_path(&g, from, to, Some(200)).path().is_some());
    }

    #[test]
    fn repeated_searches_agree() {
        let g = RoadGraph::rasterize(&[Region::rect("square", -5.0, -5.0, 5.0, 5.0)]);
        let a = astar_path(&g, Point::new(-5, -5), Point::new(4, 2), None);
        let b = astar_path(&g, Point::new(-5, -5), Point::new(4, 2), None);
        assert_eq!(a, b);
    }
}
