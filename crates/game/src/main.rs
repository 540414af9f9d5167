//! Convoy - top-down driving game where every pickup joins your trailing chain.
//!
//! This binary runs a headless session: the track and players come from
//! `config.ron`, each leader is steered by an autopilot through its normal
//! key bindings, and progress is logged once per simulated second.

mod autopilot;
mod config;
mod session;

use anyhow::{Context, Result};
use std::time::Duration;

use config::GameConfig;
use session::Session;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = config::config_path();
    let config = GameConfig::load();
    if !path.exists() {
        config.save();
        log::info!("Wrote default settings to {:?}", path);
    }

    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║                             CONVOY                               ║");
    println!("╠══════════════════════════════════════════════════════════════════╣");
    for (index, player) in config.session.players.iter().enumerate() {
        println!("║  Player {:<2} {:<55}║", index + 1, format!("{:?} keys, livery {}", player.scheme, player.livery));
    }
    println!("╚══════════════════════════════════════════════════════════════════╝");

    log::info!(
        "Starting Convoy - {:.0}s session at {:.0} Hz",
        config.session.duration_secs,
        config.session.frame_rate
    );

    let mut session = Session::new(&config).context("failed to start session")?;
    let duration = Duration::try_from_secs_f32(config.session.duration_secs.max(0.0))
        .context("session duration is out of range")?;
    session.run(duration);

    let totals = session.totals();
    log::info!(
        "Finished after {} frames: {} pickups, {} still free, {} hard / {} soft spacing corrections",
        totals.frames,
        totals.attachments,
        session.simulation().free_pool().len(),
        totals.hard_corrections,
        totals.soft_corrections
    );
    for player in session.summary() {
        log::info!(
            "  player {}: chain {} ({} picked up), {:.0} units driven",
            player.player + 1,
            player.chain_length,
            player.pickups,
            player.distance
        );
    }

    Ok(())
}
