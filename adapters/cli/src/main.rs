#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a Wave Defence level without a window.

mod level;
mod simulation;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wave_defence_core::seconds;
use wave_defence_world::query;

use crate::{level::Level, simulation::Simulation};

/// Runs a Wave Defence level headlessly and prints how it ended.
#[derive(Debug, Parser)]
#[command(name = "wave-defence", version)]
struct Args {
    /// Level definition in TOML. The built-in level runs when omitted.
    #[arg(long)]
    level: Option<PathBuf>,
    /// Overrides the seed that drives enemy abilities.
    #[arg(long)]
    seed: Option<u64>,
    /// Frame length in seconds.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,
    /// Frames to run before giving up.
    #[arg(long, default_value_t = 60 * 60 * 10)]
    max_frames: u64,
    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Entry point for the Wave Defence command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let mut level = match &args.level {
        Some(path) => load_level(path)?,
        None => Level::default(),
    };
    if let Some(seed) = args.seed {
        level.seed = seed;
    }
    let dt = seconds(args.dt);
    ensure!(!dt.is_zero(), "frame length must be positive, got {}", args.dt);

    info!(waves = level.waves.len(), towers = level.towers.len(), "level loaded");
    let mut simulation = Simulation::new(&level);
    simulation.start(&level.towers);
    let phase = simulation.run(dt, args.max_frames);

    let summary = simulation.summary();
    let world = simulation.world();
    println!("outcome: {phase:?}");
    println!("waves: {}", simulation.wave_count());
    println!("frames: {}", summary.frames);
    println!("towers placed: {}", summary.towers);
    for line in simulation.roster() {
        println!("  {line}");
    }
    println!("enemies spawned: {}", summary.spawned);
    println!("enemies killed: {}", summary.killed);
    println!("shots fired: {}", summary.shots);
    println!("base health: {}", query::base_health(world));
    println!("gold: {}", query::gold(world));
    Ok(())
}

fn init_tracing(fallback: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(fallback)
            .with_context(|| format!("invalid log filter `{fallback}`"))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
    Ok(())
}

fn load_level(path: &Path) -> Result<Level> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read level at {}", path.display()))?;
    Level::from_toml_str(&contents)
        .with_context(|| format!("failed to load level at {}", path.display()))
}
