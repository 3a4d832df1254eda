//! Terraclaim - Entry Point
//!
//! Runs the decision agent against the in-process scripted engine:
//! generate a deterministic skirmish map, play it to the tick limit,
//! and print the run totals.

use std::path::PathBuf;

use clap::Parser;

use terraclaim::core::config::AgentConfig;
use terraclaim::core::error::{AgentError, Result};
use terraclaim::core::types::Team;
use terraclaim::transport::scripted::ScriptedEngine;
use terraclaim::turn::TurnLoop;

#[derive(Parser, Debug)]
#[command(name = "terraclaim", about = "Territory-claim agent, offline skirmish runner")]
struct Args {
    /// RNG seed for map generation; same seed, same skirmish
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Ticks to play before the game ends
    #[arg(long, default_value_t = 60)]
    ticks: u64,

    /// Side length of the square map in tiles
    #[arg(long, default_value_t = 24)]
    map_size: i32,

    /// Number of agent units to place
    #[arg(long, default_value_t = 6)]
    units: usize,

    /// Optional TOML config file; missing fields fall back to defaults
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter("terraclaim=debug")
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AgentConfig::load(path)?,
        None => AgentConfig::default(),
    };
    config.validate().map_err(AgentError::InvalidConfig)?;

    tracing::info!(seed = args.seed, map_size = args.map_size, "generating skirmish");
    let engine = ScriptedEngine::generate(
        args.seed,
        args.map_size,
        args.map_size,
        args.units,
        args.ticks,
        &config,
    );

    let mut turn_loop = TurnLoop::new(engine, config);
    let report = turn_loop.run()?;

    let engine = turn_loop.transport();
    println!("=== TERRACLAIM SKIRMISH ===");
    println!(
        "Played {} ticks: {} builds, {} moves, {} rejected turns.",
        report.ticks, report.builds, report.moves, report.rejected
    );
    println!(
        "Final board: {} markers for us, {} for the rival.",
        engine.marker_count(Team(0)),
        engine.marker_count(Team(1))
    );
    Ok(())
}
