#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a headless Cross-Domain Survival session.

mod config;
mod save;
mod session;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use survival_world::{query, World};
use tracing::{info, warn};

use crate::{config::SessionFile, session::Session};

/// Plays a scripted session and optionally persists the player between runs.
#[derive(Debug, Parser)]
#[command(name = "survival", version)]
struct Args {
    /// Session configuration file (TOML).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Replacement weapon, archetype and spawn tables (TOML).
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Seed for enemy placement, overriding the configuration file.
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum number of frames to simulate.
    #[arg(long, default_value_t = 20_000)]
    frames: u32,

    /// Frame length in milliseconds.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// Player save file (JSON).
    #[arg(long)]
    save: Option<PathBuf>,

    /// Restore the player from the save file before playing.
    #[arg(long, requires = "save")]
    load: bool,
}

/// Entry point for the Cross-Domain Survival command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let session_file = SessionFile::load(args.config.as_deref())?;
    let catalog = config::load_catalog(args.catalog.as_deref())?;
    let seed = args.seed.unwrap_or(session_file.seed);

    let mut world = World::with_config(session_file.world, catalog);
    println!("{}", query::welcome_banner(&world));

    if args.load {
        if let Some(path) = args.save.as_deref() {
            let max_health = query::player(&world).max_health();
            match save::load(path, max_health) {
                Some(snapshot) => {
                    if let Err(error) = world.restore_player(&snapshot) {
                        warn!(%error, "saved player rejected");
                    }
                }
                None => info!("starting with a fresh player"),
            }
        }
    }

    let mut session = Session::new(world, seed);
    let phase = session.run(args.frames, Duration::from_millis(args.frame_ms));
    let tally = session.tally();
    info!(
        ?phase,
        kills = tally.kills,
        maps_cleared = tally.maps_cleared,
        damage_taken = tally.damage_taken,
        purchases = tally.purchases,
        elapsed_ms = query::elapsed(session.world()).as_millis() as u64,
        "session finished"
    );

    if let Some(path) = args.save.as_deref() {
        save::save(path, &query::player_snapshot(session.world()))
            .with_context(|| format!("failed to save player to {}", path.display()))?;
    }

    let loadout = query::loadout(session.world());
    println!(
        "{phase:?}: {} kills, {} maps cleared, {} money",
        tally.kills, tally.maps_cleared, loadout.money
    );
    Ok(())
}
