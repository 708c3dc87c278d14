//! Headless driver shared by the `roadnav-demo` binary and its tests.
//!
//! Stands in for the parts of a navigation app that live outside the engine:
//! region data arriving in bulk, a destination picked from a menu and a
//! polling loop feeding agent positions. Everything is read from a TOML
//! [`Scenario`] and replayed by a [`Simulation`].

use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use roadnav_core::{Point, Position, Region};
use roadnav_paths::{Engine, EngineConfig, EngineError, PathResult};
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::{debug, info, trace, warn};

/// Scenario bundled with the binary, used when no file is given.
pub const BUILTIN_SCENARIO: &str = include_str!("../scenarios/town.toml");

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("Failed to read scenario {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed scenario: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Agent mode {mode:?} needs {field}")]
    MissingAgentField { mode: Motion, field: &'static str },
}

// ---------------------------------------------------------------------------
// Scenario
// ---------------------------------------------------------------------------

/// How the simulated agent moves between ticks.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Motion {
    /// Walk the current path, `speed` cells per tick.
    #[default]
    Follow,
    /// Replay a fixed list of positions.
    Track,
    /// Random cardinal steps of `stride` units.
    Wander,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub start: Position,
    pub mode: Motion,
    pub speed: usize,
    pub max_ticks: usize,
    pub track: Vec<Position>,
    pub seed: u64,
    pub stride: f64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            start: Position::default(),
            mode: Motion::Follow,
            speed: 1,
            max_ticks: 500,
            track: Vec::new(),
            seed: 0,
            stride: 1.0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default, deserialize_with = "lenient_regions")]
    pub roads: Vec<Region>,
    #[serde(default, deserialize_with = "lenient_regions")]
    pub buildings: Vec<Region>,
    pub destination: Option<String>,
    #[serde(default)]
    pub agent: AgentConfig,
}

impl Scenario {
    pub fn from_toml_str(s: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = toml::from_str(s)?;
        scenario.engine.validate()?;
        if scenario.agent.mode == Motion::Track && scenario.agent.track.is_empty() {
            return Err(ScenarioError::MissingAgentField {
                mode: Motion::Track,
                field: "a non-empty `track`",
            });
        }
        if scenario.agent.mode == Motion::Follow && scenario.agent.speed == 0 {
            return Err(ScenarioError::MissingAgentField {
                mode: Motion::Follow,
                field: "a positive `speed`",
            });
        }
        Ok(scenario)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn builtin() -> Result<Self, ScenarioError> {
        Self::from_toml_str(BUILTIN_SCENARIO)
    }
}

/// Read a region list entry by entry, dropping entries that are not regions
/// at all. Regions with bad corners are kept; the engine treats them as
/// malformed.
fn lenient_regions<'de, D>(deserializer: D) -> Result<Vec<Region>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Vec::<toml::Value>::deserialize(deserializer)?;
    Ok(entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match Region::deserialize(entry) {
            Ok(region) => Some(region),
            Err(error) => {
                trace!(index, %error, "skipping region entry");
                None
            }
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// What a finished run looked like.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub ticks: usize,
    pub recomputes: usize,
    pub failures: usize,
    pub arrived: bool,
}

/// Replays an agent through a scenario, calling [`Engine::update`] once per
/// tick the way an app's timer would.
pub struct Simulation {
    engine: Engine,
    agent: Position,
    config: AgentConfig,
    track_index: usize,
    path_cursor: usize,
    rng: StdRng,
}

impl Simulation {
    pub fn new(scenario: Scenario) -> Result<Self, ScenarioError> {
        let mut engine = Engine::new(scenario.engine);
        engine.set_regions(scenario.roads, scenario.buildings);
        let names: Vec<&str> = engine.regions().building_names().collect();
        debug!(?names, "buildings available");
        if let Some(name) = &scenario.destination {
            engine.select_destination(name)?;
        }
        let agent = match scenario.agent.mode {
            Motion::Track => scenario
                .agent
                .track
                .first()
                .copied()
                .unwrap_or(scenario.agent.start),
            _ => scenario.agent.start,
        };
        Ok(Self {
            engine,
            agent,
            rng: StdRng::seed_from_u64(scenario.agent.seed),
            config: scenario.agent,
            track_index: 0,
            path_cursor: 0,
        })
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn agent(&self) -> Position {
        self.agent
    }

    /// Run until the agent reaches the goal cell, the track runs out or
    /// `max_ticks` is hit.
    pub fn run(&mut self) -> Summary {
        let mut summary = Summary::default();
        while summary.ticks < self.config.max_ticks {
            summary.ticks += 1;
            match self.engine.update(self.agent) {
                Some(PathResult::Found(path)) => {
                    summary.recomputes += 1;
                    self.path_cursor = 0;
                    info!(
                        tick = summary.ticks,
                        agent = %self.agent,
                        steps = path.len() - 1,
                        "path recomputed"
                    );
                }
                Some(PathResult::NotFound(reason)) => {
                    summary.recomputes += 1;
                    summary.failures += 1;
                    warn!(tick = summary.ticks, agent = %self.agent, %reason, "no path");
                }
                None => {}
            }
            self.log_whereabouts(summary.ticks);

            if self.arrived() {
                summary.arrived = true;
                info!(tick = summary.ticks, agent = %self.agent, "arrived");
                break;
            }
            if !self.advance() {
                break;
            }
        }
        summary
    }

    fn arrived(&self) -> bool {
        let state = self.engine.path_state();
        state.is_current() && state.goal() == Some(self.agent.cell())
    }

    fn log_whereabouts(&self, tick: usize) {
        let regions = self.engine.regions();
        let road = regions.road_at(self.agent).map(|r| r.name.as_str());
        let building = regions.building_at(self.agent).map(|r| r.name.as_str());
        debug!(tick, agent = %self.agent, ?road, ?building, "status");
    }

    /// Move the agent one tick. Returns `false` when there is nothing left
    /// to replay.
    fn advance(&mut self) -> bool {
        match self.config.mode {
            Motion::Follow => {
                let path = self.engine.path_state().path();
                if let Some(last) = path.len().checked_sub(1) {
                    self.path_cursor = (self.path_cursor + self.config.speed).min(last);
                    self.agent = place(path[self.path_cursor], self.agent.y);
                }
                true
            }
            Motion::Track => {
                self.track_index += 1;
                match self.config.track.get(self.track_index) {
                    Some(p) => {
                        self.agent = *p;
                        true
                    }
                    None => false,
                }
            }
            Motion::Wander => {
                let s = self.config.stride;
                let (dx, dz) = match self.rng.random_range(0..4u32) {
                    0 => (0.0, -s),
                    1 => (s, 0.0),
                    2 => (0.0, s),
                    _ => (-s, 0.0),
                };
                self.agent.x += dx;
                self.agent.z += dz;
                true
            }
        }
    }
}

/// Agent position standing on cell `p` at height `y`.
fn place(p: Point, y: f64) -> Position {
    Position::new(p.x as f64, y, p.z as f64)
}
