//! Hill Rider entry point
//!
//! Headless runner: plays sessions with the autopilot and keeps the player
//! records up to date.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use hill_rider::sim::{GameEvent, GameSession, SessionOutcome, TickInput, tick};
use hill_rider::{PlayerRecords, PlayerStats, Settings, Tuning, VehiclePreset};

#[derive(Parser, Debug)]
#[command(name = "hill-rider")]
#[command(about = "Endless hill driving simulation, played headless")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play one session and merge the result into the player records
    Run {
        #[arg(long, default_value_t = 12345)]
        seed: u64,
        /// Quit after this many ticks (60 per second)
        #[arg(long, default_value_t = 36_000)]
        ticks: u64,
        /// Settings file supplying the player name and vehicle
        #[arg(long)]
        settings: Option<PathBuf>,
        #[arg(long)]
        player: Option<String>,
        /// jeep, truck or buggy
        #[arg(long)]
        vehicle: Option<VehiclePreset>,
        /// JSON file overriding the default balance
        #[arg(long)]
        tuning: Option<PathBuf>,
        #[arg(long, default_value = "players.json")]
        records: PathBuf,
        /// Log progress every N ticks (0 disables)
        #[arg(long, default_value_t = 600)]
        report_every: u64,
        /// Leave the controls alone instead of letting the autopilot drive
        #[arg(long, default_value_t = false)]
        idle: bool,
    },
    /// Print the leaderboard
    Records {
        #[arg(long, default_value = "players.json")]
        records: PathBuf,
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
}

#[derive(Serialize)]
struct RunReport<'a> {
    player: &'a str,
    vehicle: &'static str,
    seed: u64,
    outcome: SessionOutcome,
    record: PlayerStats,
    rank: usize,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            seed,
            ticks,
            settings,
            player,
            vehicle,
            tuning,
            records,
            report_every,
            idle,
        } => {
            let settings = settings
                .as_deref()
                .map(Settings::load)
                .unwrap_or_default();
            let player = player.unwrap_or(settings.player_name);
            let vehicle = vehicle.unwrap_or(settings.vehicle);
            let tuning = match tuning {
                Some(path) => Tuning::load(&path)
                    .with_context(|| format!("loading tuning from {}", path.display()))?,
                None => Tuning::default(),
            };

            let outcome = play(seed, tuning, vehicle, ticks, report_every, !idle)?;

            let mut store = PlayerRecords::load(&records);
            let rank = store.rank_for(&player, outcome.stats.distance_m);
            let record = store.merge(&player, &outcome.stats);
            store
                .save(&records)
                .with_context(|| format!("saving records to {}", records.display()))?;

            let report = RunReport {
                player: &player,
                vehicle: vehicle.as_str(),
                seed,
                outcome,
                record,
                rank,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Records { records, top } => print_leaderboard(&records, top),
    }
    Ok(())
}

/// Run one session to its end, quitting at the tick limit
fn play(
    seed: u64,
    tuning: Tuning,
    vehicle: VehiclePreset,
    max_ticks: u64,
    report_every: u64,
    autopilot: bool,
) -> Result<SessionOutcome> {
    let mut session = GameSession::new(seed, tuning, vehicle).context("invalid tuning")?;
    let input = TickInput {
        autopilot,
        ..Default::default()
    };

    loop {
        let input = if session.state().ticks >= max_ticks {
            TickInput {
                quit: true,
                ..Default::default()
            }
        } else {
            input.clone()
        };

        for event in tick(&mut session, &input) {
            match event {
                GameEvent::SessionEnded(outcome) => return Ok(outcome),
                GameEvent::FlipCompleted { total } => log::info!("Flip! ({} total)", total),
                GameEvent::FuelEmpty => log::info!("Tank empty"),
                GameEvent::UpsideDown => log::info!("Stuck upside down"),
                _ => {}
            }
        }

        let ticks = session.state().ticks;
        if report_every > 0 && ticks % report_every == 0 {
            let snap = session.snapshot();
            log::info!(
                "t={:.0}s distance={:.0}m fuel={:.0} coins={} flips={}",
                snap.stats.elapsed,
                snap.stats.distance_m,
                snap.stats.fuel,
                snap.stats.coins,
                snap.stats.flips
            );
        }
    }
}

fn print_leaderboard(path: &Path, top: usize) {
    let store = PlayerRecords::load(path);
    if store.is_empty() {
        println!("No records yet");
        return;
    }
    println!(
        "{:>4}  {:<16} {:>10} {:>8} {:>6} {:>5}",
        "#", "player", "best (m)", "coins", "flips", "runs"
    );
    for (i, (name, stats)) in store.leaderboard(top).into_iter().enumerate() {
        println!(
            "{:>4}  {:<16} {:>10.1} {:>8} {:>6} {:>5}",
            i + 1,
            name,
            stats.max_distance,
            stats.coins,
            stats.flips,
            stats.runs
        );
    }
}
