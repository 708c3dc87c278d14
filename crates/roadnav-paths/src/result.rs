use std::fmt;

use roadnav_core::Point;

/// Why no path could be produced.
///
/// These are ordinary outcomes rather than errors: the caller retries on the
/// next cycle or asks for a different destination.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum NotFoundReason {
    /// The destination region is malformed.
    InvalidDestination,
    /// No well-formed road region covers any cell.
    EmptyRoadGraph,
    /// No road cell could be matched to the agent position.
    NoStartNode,
    /// No road cell could be matched to the destination centroid.
    NoGoalNode,
    /// Start and goal lie in disconnected parts of the road graph.
    Unreachable,
    /// The search hit its expansion cap.
    SearchAborted,
}

impl NotFoundReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidDestination => "invalid-destination",
            Self::EmptyRoadGraph => "empty-road-graph",
            Self::NoStartNode => "no-start-node",
            Self::NoGoalNode => "no-goal-node",
            Self::Unreachable => "unreachable",
            Self::SearchAborted => "search-aborted",
        }
    }
}

impl fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a path computation.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathResult {
    /// Cells from the agent's nearest road cell to the destination's,
    /// inclusive.
    Found(Vec<Point>),
    NotFound(NotFoundReason),
}

impl PathResult {
    #[inline]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn path(&self) -> Option<&[Point]> {
        match self {
            Self::Found(p) => Some(p),
            Self::NotFound(_) => None,
        }
    }

    pub fn reason(&self) -> Option<NotFoundReason> {
        match self {
            Self::Found(_) => None,
            Self::NotFound(r) => Some(*r),
        }
    }
}
