//! The [`Engine`]: region snapshot, path state and the operations that tie
//! the rasterizer, locator and search together.

use roadnav_core::region::digest;
use roadnav_core::{Position, Region, RegionStore};
use thiserror::Error;

use crate::astar::{SearchOutcome, astar_path};
use crate::config::EngineConfig;
use crate::graph::RoadGraph;
use crate::locate::nearest_node;
use crate::result::{NotFoundReason, PathResult};
use crate::state::{PathState, should_recompute};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Unknown destination: {name}")]
    UnknownDestination { name: String },

    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// A single navigation session.
///
/// The engine exclusively owns its region snapshot and path state; every
/// call runs to completion synchronously.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    regions: RegionStore,
    road_digest: u64,
    graph_cache: Option<RoadGraph>,
    state: PathState,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let graph_cache = config.cache_graph.then(RoadGraph::default);
        Self {
            config,
            regions: RegionStore::default(),
            road_digest: digest(&[]),
            graph_cache,
            state: PathState::new(),
        }
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn regions(&self) -> &RegionStore {
        &self.regions
    }

    #[inline]
    pub fn path_state(&self) -> &PathState {
        &self.state
    }

    /// Replace the region snapshot wholesale.
    ///
    /// Returns whether the road content changed. A changed road set only
    /// marks the current path stale when `invalidate_on_region_update` is
    /// enabled; otherwise the path stays until the next staleness trigger.
    pub fn set_regions(&mut self, roads: Vec<Region>, buildings: Vec<Region>) -> bool {
        let new_digest = digest(&roads);
        let changed = new_digest != self.road_digest;
        self.regions.replace(roads, buildings);
        self.road_digest = new_digest;

        if changed {
            log::debug!(
                "road snapshot changed: {} roads, {} buildings",
                self.regions.roads().len(),
                self.regions.buildings().len()
            );
            if self.config.cache_graph {
                self.graph_cache = Some(RoadGraph::rasterize(self.regions.roads()));
            }
            if self.config.invalidate_on_region_update && self.state.is_current() {
                log::info!("roads changed, current path marked stale");
                self.state.invalidate();
            }
        }
        changed
    }

    /// Look up a building by name and make it the destination.
    pub fn select_destination(&mut self, name: &str) -> EngineResult<()> {
        let region = self
            .regions
            .building(name)
            .cloned()
            .ok_or_else(|| EngineError::UnknownDestination {
                name: name.to_string(),
            })?;
        self.set_destination(region);
        Ok(())
    }

    /// Make `region` the destination, discarding any current path.
    pub fn set_destination(&mut self, region: Region) {
        log::info!("destination set to {:?}", region.name);
        self.state.reset(Some(region));
    }

    /// Drop the destination and any current path.
    pub fn clear_destination(&mut self) {
        if let Some(d) = self.state.destination() {
            log::info!("destination {:?} cleared", d.name);
        }
        self.state.reset(None);
    }

    /// Whether the path must be recomputed with the agent at `position`.
    #[inline]
    pub fn should_recompute(&self, position: Position) -> bool {
        should_recompute(position, &self.state, self.config.recompute_threshold)
    }

    /// Compute a path from `position` to the centroid of `destination`
    /// against the current road snapshot. Does not touch the path state.
    pub fn compute_path(&self, position: Position, destination: &Region) -> PathResult {
        let Some(target) = destination.centroid() else {
            return PathResult::NotFound(NotFoundReason::InvalidDestination);
        };

        let rasterized;
        let graph = match &self.graph_cache {
            Some(g) => g,
            None => {
                rasterized = RoadGraph::rasterize(self.regions.roads());
                &rasterized
            }
        };
        if graph.is_empty() {
            return PathResult::NotFound(NotFoundReason::EmptyRoadGraph);
        }

        let Some(start) = nearest_node(graph, position) else {
            return PathResult::NotFound(NotFoundReason::NoStartNode);
        };
        let Some(goal) = nearest_node(graph, target) else {
            return PathResult::NotFound(NotFoundReason::NoGoalNode);
        };

        let result = match astar_path(graph, start, goal, self.config.max_expansions) {
            SearchOutcome::Found(path) => PathResult::Found(path),
            SearchOutcome::Unreachable => PathResult::NotFound(NotFoundReason::Unreachable),
            SearchOutcome::Aborted => PathResult::NotFound(NotFoundReason::SearchAborted),
        };
        match &result {
            PathResult::Found(path) => log::debug!(
                "path to {:?}: {} -> {} in {} steps",
                destination.name,
                start,
                goal,
                path.len() - 1
            ),
            PathResult::NotFound(reason) => log::debug!(
                "no path to {:?} from {}: {}",
                destination.name,
                start,
                reason
            ),
        }
        result
    }

    /// Per-tick entry point for the movement-polling loop.
    ///
    /// Recomputes the path for the current destination when the staleness
    /// policy asks for it, stores the outcome and returns it. Returns `None`
    /// when the existing state is still good.
    pub fn update(&mut self, position: Position) -> Option<PathResult> {
        if !self.should_recompute(position) {
            return None;
        }
        let result = self.compute_path(position, self.state.destination()?);
        self.state.record(&result, position);
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadnav_core::{Corner, Point};

    fn town() -> Engine {
        let mut e = Engine::default();
        e.set_regions(
            vec![
                Region::rect("main", 0.0, 0.0, 30.0, 2.0),
                Region::rect("north", 28.0, 2.0, 30.0, 20.0),
                Region::rect("island", 50.0, 50.0, 60.0, 60.0),
            ],
            vec![
                Region::rect("tower", 31.0, 18.0, 35.0, 22.0),
                Region::rect("castle", 52.0, 52.0, 58.0, 58.0),
                Region::new("ruin", vec![Corner::new(1.0, 1.0)]),
            ],
        );
        e
    }

    fn step_count(r: &PathResult) -> usize {
        r.path().map(|p| p.len() - 1).unwrap()
    }

    #[test]
    fn finds_path_to_building() {
        let e = town();
        let dest = e.regions().building("tower").unwrap().clone();
        let r = e.compute_path(Position::new(0.0, 64.0, 0.0), &dest);
        let path = r.path().unwrap();
        assert_eq!(path.first(), Some(&Point::new(0, 0)));
        // Centroid (33, 20) snaps to (30, 20).
        assert_eq!(path.last(), Some(&Point::new(30, 20)));
        assert_eq!(step_count(&r), 30 + 20);
    }

    #[test]
    fn disconnected_destination_is_unreachable() {
        let e = town();
        let dest = e.regions().building("castle").unwrap().clone();
        assert_eq!(
            e.compute_path(Position::planar(1.0, 1.0), &dest),
            PathResult::NotFound(NotFoundReason::Unreachable)
        );
    }

    #[test]
    fn malformed_destination_is_invalid() {
        let e = town();
        let dest = e.regions().building("ruin").unwrap().clone();
        assert_eq!(
            e.compute_path(Position::default(), &dest),
            PathResult::NotFound(NotFoundReason::InvalidDestination)
        );
    }

    #[test]
    fn no_roads_is_empty_graph() {
        let mut e = Engine::default();
        e.set_regions(vec![Region::new("bad", vec![])], vec![]);
        let dest = Region::rect("x", 0.0, 0.0, 1.0, 1.0);
        assert_eq!(
            e.compute_path(Position::default(), &dest),
            PathResult::NotFound(NotFoundReason::EmptyRoadGraph)
        );
    }

    #[test]
    fn roads_past_the_grid_are_skipped() {
        let max = f64::from(i32::MAX);
        let dest = Region::rect("gate", 9.0, 1.0, 11.0, 3.0);
        let mut e = Engine::default();
        e.set_regions(vec![Region::rect("edge", max - 2.0, 0.0, max, 0.0)], vec![]);
        assert_eq!(
            e.compute_path(Position::planar(max, 0.0), &dest),
            PathResult::NotFound(NotFoundReason::EmptyRoadGraph)
        );

        e.set_regions(
            vec![
                Region::rect("edge", max - 2.0, 0.0, max, 0.0),
                Region::rect("wide", -2e9, 0.0, 2e9, -1.0),
                Region::rect("lane", 0.0, 0.0, 10.0, 0.0),
            ],
            vec![],
        );
        let r = e.compute_path(Position::planar(-2e9, 0.0), &dest);
        assert_eq!(r.path().unwrap().first(), Some(&Point::new(0, 0)));
        assert_eq!(step_count(&r), 10);
    }

    #[test]
    fn unusable_agent_position_has_no_start() {
        let e = town();
        let dest = e.regions().building("tower").unwrap().clone();
        assert_eq!(
            e.compute_path(Position::planar(f64::NAN, 0.0), &dest),
            PathResult::NotFound(NotFoundReason::NoStartNode)
        );
    }

    #[test]
    fn huge_destination_has_no_goal() {
        let e = town();
        let dest = Region::rect("beyond", f64::MAX, 0.0, f64::MAX, 1.0);
        // The centroid overflows to infinity.
        assert_eq!(
            e.compute_path(Position::default(), &dest),
            PathResult::NotFound(NotFoundReason::NoGoalNode)
        );
    }

    #[test]
    fn compute_path_is_idempotent() {
        let e = town();
        let dest = e.regions().building("tower").unwrap().clone();
        let p = Position::planar(3.2, 1.7);
        assert_eq!(e.compute_path(p, &dest), e.compute_path(p, &dest));
    }

    #[test]
    fn unknown_destination_is_an_error() {
        let mut e = town();
        assert_eq!(
            e.select_destination("moon"),
            Err(EngineError::UnknownDestination {
                name: "moon".to_string()
            })
        );
        assert!(e.path_state().destination().is_none());
    }

    #[test]
    fn update_follows_staleness_policy() {
        let mut e = town();
        assert!(e.update(Position::default()).is_none());

        e.select_destination("tower").unwrap();
        let first = e.update(Position::planar(0.0, 0.0)).unwrap();
        assert!(first.is_found());
        assert!(e.path_state().is_current());
        assert_eq!(e.path_state().path(), first.path().unwrap());

        assert!(e.update(Position::planar(4.0, 1.0)).is_none());
        let again = e.update(Position::planar(6.0, 1.0)).unwrap();
        assert_eq!(again.path().unwrap().first(), Some(&Point::new(6, 1)));
        assert_eq!(e.path_state().computed_at(), Some(Position::planar(6.0, 1.0)));
    }

    #[test]
    fn destination_change_resets_state() {
        let mut e = town();
        e.select_destination("tower").unwrap();
        e.update(Position::default());
        assert!(!e.path_state().path().is_empty());

        e.select_destination("castle").unwrap();
        assert!(e.path_state().path().is_empty());
        assert!(!e.path_state().is_current());
        assert!(e.should_recompute(Position::default()));

        e.clear_destination();
        assert!(e.path_state().destination().is_none());
        assert!(!e.should_recompute(Position::default()));
    }

    #[test]
    fn failed_update_records_reason() {
        let mut e = town();
        e.select_destination("castle").unwrap();
        let r = e.update(Position::default()).unwrap();
        assert_eq!(r.reason(), Some(NotFoundReason::Unreachable));
        assert_eq!(e.path_state().last_failure(), Some(NotFoundReason::Unreachable));
        assert!(e.path_state().path().is_empty());
        assert!(e.update(Position::default()).is_some());
    }

    #[test]
    fn region_update_keeps_path_by_default() {
        let mut e = town();
        e.select_destination("tower").unwrap();
        e.update(Position::default());
        let changed = e.set_regions(vec![Region::rect("main", 0.0, 0.0, 40.0, 2.0)], vec![]);
        assert!(changed);
        assert!(e.path_state().is_current());
        assert!(!e.should_recompute(Position::default()));
    }

    #[test]
    fn region_update_can_invalidate() {
        let mut e = Engine::new(EngineConfig {
            invalidate_on_region_update: true,
            ..Default::default()
        });
        let roads = vec![Region::rect("main", 0.0, 0.0, 30.0, 2.0)];
        let buildings = vec![Region::rect("shop", 20.0, 3.0, 24.0, 6.0)];
        e.set_regions(roads.clone(), buildings.clone());
        e.select_destination("shop").unwrap();
        e.update(Position::default());
        assert!(e.path_state().is_current());

        // Re-sending the same snapshot is not a change.
        assert!(!e.set_regions(roads, buildings.clone()));
        assert!(e.path_state().is_current());

        assert!(e.set_regions(vec![Region::rect("main", 0.0, 0.0, 10.0, 2.0)], buildings));
        assert!(!e.path_state().is_current());
        assert!(e.should_recompute(Position::default()));
    }

    #[test]
    fn cached_graph_tracks_snapshot() {
        let mut e = Engine::new(EngineConfig {
            cache_graph: true,
            ..Default::default()
        });
        let dest = Region::rect("end", 9.0, 0.0, 9.0, 0.0);
        assert_eq!(
            e.compute_path(Position::default(), &dest),
            PathResult::NotFound(NotFoundReason::EmptyRoadGraph)
        );

        e.set_regions(vec![Region::rect("r", 0.0, 0.0, 9.0, 0.0)], vec![]);
        assert_eq!(step_count(&e.compute_path(Position::default(), &dest)), 9);

        e.set_regions(
            vec![
                Region::rect("a", 0.0, 0.0, 3.0, 0.0),
                Region::rect("b", 6.0, 0.0, 9.0, 0.0),
            ],
            vec![],
        );
        assert_eq!(
            e.compute_path(Position::default(), &dest),
            PathResult::NotFound(NotFoundReason::Unreachable)
        );
    }

    #[test]
    fn expansion_cap_reports_aborted() {
        let mut e = Engine::new(EngineConfig {
            max_expansions: Some(3),
            ..Default::default()
        });
        e.set_regions(vec![Region::rect("r", 0.0, 0.0, 50.0, 0.0)], vec![]);
        let dest = Region::rect("far", 50.0, 0.0, 50.0, 0.0);
        assert_eq!(
            e.compute_path(Position::default(), &dest),
            PathResult::NotFound(NotFoundReason::SearchAborted)
        );
    }
}
