//! Road-grid pathfinding.
//!
//! Turns rectangular road regions into a 4-connected grid graph and keeps a
//! shortest route to a destination region fresh as an agent moves:
//!
//! - **Rasterization** of road regions into a [`RoadGraph`]
//! - **Nearest-node lookup** for arbitrary positions ([`nearest_node`])
//! - **A\*** shortest-path search with a Manhattan heuristic ([`astar_path`])
//! - **Staleness policy** deciding when to replan ([`should_recompute`])
//!
//! [`Engine`] owns a region snapshot and the [`PathState`] and is the entry
//! point for an application's polling loop.
//!
//! # Trait hierarchy
//!
//! | Trait | Required for |
//! |---|---|
//! | [`Pather`] | neighbor enumeration |
//! | [`AstarPather`] : [`Pather`] | A* |

mod astar;
mod config;
mod distance;
mod engine;
mod graph;
mod locate;
mod result;
mod state;
mod traits;

pub use astar::{SearchOutcome, astar_path};
pub use config::{DEFAULT_MAX_EXPANSIONS, DEFAULT_RECOMPUTE_THRESHOLD, EngineConfig};
pub use distance::manhattan;
pub use engine::{Engine, EngineError, EngineResult};
pub use graph::{MAX_REGION_CELLS, RoadGraph};
pub use locate::nearest_node;
pub use result::{NotFoundReason, PathResult};
pub use state::{PathState, should_recompute};
pub use traits::{AstarPather, Pather};
