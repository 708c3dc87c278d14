//! Path bookkeeping and the staleness policy that decides when to replan.

use roadnav_core::{Point, Position, Region};

use crate::result::{NotFoundReason, PathResult};

/// The active destination and the path most recently computed for it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathState {
    destination: Option<Region>,
    path: Vec<Point>,
    is_current: bool,
    computed_at: Option<Position>,
    last_failure: Option<NotFoundReason>,
}

impl PathState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently selected destination.
    #[inline]
    pub fn destination(&self) -> Option<&Region> {
        self.destination.as_ref()
    }

    /// Cells from start to goal; empty when nothing has been found.
    #[inline]
    pub fn path(&self) -> &[Point] {
        &self.path
    }

    /// Whether `path` was computed for the current destination and has not
    /// been invalidated since.
    #[inline]
    pub fn is_current(&self) -> bool {
        self.is_current
    }

    /// Agent position at the last successful computation.
    #[inline]
    pub fn computed_at(&self) -> Option<Position> {
        self.computed_at
    }

    /// Why the most recent computation produced no path.
    #[inline]
    pub fn last_failure(&self) -> Option<NotFoundReason> {
        self.last_failure
    }

    /// Final cell of the current path.
    #[inline]
    pub fn goal(&self) -> Option<Point> {
        self.path.last().copied()
    }

    /// Switch to `destination` (or none), discarding the path and the
    /// position reference.
    pub fn reset(&mut self, destination: Option<Region>) {
        *self = Self {
            destination,
            ..Self::default()
        };
    }

    /// Mark the path stale without discarding it; the next staleness check
    /// asks for a recompute.
    pub fn invalidate(&mut self) {
        self.is_current = false;
    }

    /// Store the outcome of a computation made with the agent at `at`.
    pub fn record(&mut self, result: &PathResult, at: Position) {
        match result {
            PathResult::Found(path) => {
                self.path.clone_from(path);
                self.is_current = true;
                self.computed_at = Some(at);
                self.last_failure = None;
            }
            PathResult::NotFound(reason) => {
                self.path.clear();
                self.is_current = false;
                self.computed_at = None;
                self.last_failure = Some(*reason);
            }
        }
    }
}

/// Whether the path held in `state` must be (re)computed now that the agent
/// is at `position`.
///
/// - no destination: never;
/// - destination without a current path: always;
/// - current path: once the agent has moved strictly more than `threshold`
///   along X or along Z (checked independently) since the computation.
pub fn should_recompute(position: Position, state: &PathState, threshold: f64) -> bool {
    if state.destination.is_none() {
        return false;
    }
    match (state.is_current, state.computed_at) {
        (true, Some(at)) => {
            let (dx, dz) = position.planar_offset(at);
            dx > threshold || dz > threshold
        }
        _ => true,
    }
}
