//! Headless demo binary: runs the fleet for a while, then persists it.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bevy::prelude::Vec2;
use clap::Parser;
use flotilla::{
    init_logging, ActorSimulation, FileStore, FixedViewport, SheetSpec, SimConfig,
    SimulationParams,
};
use log::info;

/// A depth-sorted fleet of autonomous sprite actors
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// RNG seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Number of actors in the fleet (the first is the hero)
    #[arg(long, default_value_t = 4)]
    actors: usize,

    /// Render ticks to simulate before persisting and exiting
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Viewport width in pixels
    #[arg(long, default_value_t = 1280.0)]
    width: f32,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 800.0)]
    height: f32,

    /// Snapshot file path
    #[arg(long, default_value = "flotilla_state.json")]
    state: PathBuf,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = SimConfig {
        seed: args.seed,
        ..SimConfig::default()
    };

    let params = SimulationParams {
        config,
        sheets: vec![SheetSpec { tile_px: 840.0 }; args.actors.max(1)],
        viewport: Arc::new(FixedViewport(Vec2::new(args.width, args.height))),
        store: Arc::new(FileStore::new(args.state)),
        heat: None,
    };

    let mut simulation = ActorSimulation::new(params);
    for _ in 0..args.ticks {
        simulation.tick();
        std::thread::sleep(Duration::from_millis(16));
    }

    for state in simulation.draw_states() {
        info!(
            "actor {} layer {} at ({:.0}, {:.0}) scale {:.3} cell ({}, {}){}",
            state.id,
            state.layer,
            state.screen.x,
            state.screen.y,
            state.scale,
            state.cell.row,
            state.cell.column,
            if state.cell.mirrored { " mirrored" } else { "" },
        );
    }

    simulation.shutdown();
}
