//! Road-region rasterization into the [`RoadGraph`].

use std::collections::HashSet;

use roadnav_core::{Point, Region};

use crate::distance::manhattan;
use crate::traits::{AstarPather, Pather};

/// Most cells a single road region may cover before it is skipped.
pub const MAX_REGION_CELLS: usize = 1 << 24;

/// The set of integer cells covered by road regions, with 4-connectivity.
///
/// Cells are kept in first-rasterized order so that iteration, and every
/// tie-break that depends on it, is deterministic for a given snapshot.
#[derive(Clone, Debug, Default)]
pub struct RoadGraph {
    nodes: Vec<Point>,
    index: HashSet<Point>,
}

impl RoadGraph {
    /// Rasterize `roads` into a graph. Overlapping regions share their
    /// cells. Malformed regions are skipped, as are regions reaching past
    /// the grid limit or covering more than [`MAX_REGION_CELLS`].
    pub fn rasterize(roads: &[Region]) -> Self {
        let mut graph = Self::default();
        let mut skipped = 0usize;
        for region in roads {
            let Some(bounds) = region.bounds() else {
                log::trace!("skipping malformed road region {:?}", region.name);
                skipped += 1;
                continue;
            };
            let Some(cells) = bounds.cells().filter(|c| c.len() <= MAX_REGION_CELLS) else {
                log::warn!("skipping oversized road region {:?}", region.name);
                skipped += 1;
                continue;
            };
            graph.index.reserve(cells.len());
            for p in cells {
                if graph.index.insert(p) {
                    graph.nodes.push(p);
                }
            }
        }
        log::debug!(
            "rasterized {} road regions into {} nodes ({} skipped)",
            roads.len(),
            graph.nodes.len(),
            skipped
        );
        graph
    }

    /// Number of distinct cells.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        self.index.contains(&p)
    }

    /// Cells in first-rasterized order.
    #[inline]
    pub fn nodes(&self) -> &[Point] {
        &self.nodes
    }
}

impl Pather for RoadGraph {
    fn neighbors(&self, p: Point, buf: &mut Vec<Point>) {
        buf.extend(p.neighbors_4().into_iter().filter(|n| self.contains(*n)));
    }
}

impl AstarPather for RoadGraph {
    fn estimate(&self, from: Point, to: Point) -> i32 {
        manhattan(from, to)
    }
}
