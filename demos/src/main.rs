//! Replays an agent through a road scenario and logs every replan.
//!
//! Run: cargo run --bin roadnav-demo -- [SCENARIO.toml]
//! Set `RUST_LOG=debug` to see per-tick status and engine diagnostics.

use anyhow::{Context, Result};
use roadnav_demo::{Scenario, Simulation};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let scenario = match std::env::args().nth(1) {
        Some(path) => Scenario::load(&path).with_context(|| format!("loading scenario {path}"))?,
        None => Scenario::builtin().context("loading built-in scenario")?,
    };
    let destination = scenario.destination.clone();

    let mut sim = Simulation::new(scenario).context("setting up simulation")?;
    let summary = sim.run();
    info!(
        ?destination,
        ticks = summary.ticks,
        recomputes = summary.recomputes,
        failures = summary.failures,
        arrived = summary.arrived,
        "simulation finished"
    );
    Ok(())
}
