//! Family Turns - Unified CLI
//!
//! Runs and checks turn-engine sessions described by TOML config files.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result, bail};
use clap::Parser;
use cli::{Cli, Command};
use family_turns::{
    MoveInput, PlayerId, PlayerRegistry, SessionConfig, TokioTimer, TurnEngine, TurnSettings,
};
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::EnvFilter;

/// What the engine callbacks report back to the session loop.
#[derive(Debug)]
enum SessionEvent {
    TurnStarted(PlayerId),
    GameOver(Option<PlayerId>),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Simulate {
            config,
            max_turns,
            turn_time_limit_secs,
            json,
        } => run_simulation(&config, max_turns, turn_time_limit_secs, json).await,
        Command::CheckConfig { config } => check_config(&config),
    }
}

/// Load a config file and apply command-line overrides.
#[instrument(skip_all, fields(config_path = %path.display()))]
fn load_session(
    path: &Path,
    max_turns: Option<u32>,
    turn_time_limit_secs: Option<u64>,
) -> Result<(TurnSettings, PlayerRegistry)> {
    let config = SessionConfig::from_file(path)?;
    let registry = config
        .to_registry()
        .context("Session config lists a player twice")?;
    let (mut settings, _) = config.into_parts();

    if let Some(max_turns) = max_turns {
        settings.max_turns = Some(max_turns);
    }
    if let Some(secs) = turn_time_limit_secs {
        settings.turn_time_limit = Some(Duration::from_secs(secs));
    }
    Ok((settings, registry))
}

/// Validate a config file and print it back.
fn check_config(path: &Path) -> Result<()> {
    let (settings, registry) = load_session(path, None, None)?;
    if registry.count() == 0 {
        bail!("Config lists no players");
    }
    println!("{}", serde_json::to_string_pretty(&settings)?);
    for player in registry.all() {
        println!("{}", serde_json::to_string(&player)?);
    }
    Ok(())
}

/// Run one session to completion on the tokio runtime.
#[instrument(skip_all, fields(config_path = %path.display()))]
async fn run_simulation(
    path: &Path,
    max_turns: Option<u32>,
    turn_time_limit_secs: Option<u64>,
    json: bool,
) -> Result<()> {
    let (settings, mut registry) = load_session(path, max_turns, turn_time_limit_secs)?;
    if settings.max_turns.is_none() {
        bail!("Simulation needs max_turns so that it terminates");
    }
    if settings.timeout().is_none() && registry.all().iter().any(|p| p.is_human == Some(true)) {
        warn!("Human players without a turn time limit will stall the simulation");
    }

    let (timer, mut timeouts) = TokioTimer::new();
    let (events_tx, mut events) = mpsc::unbounded_channel();
    let turn_tx = events_tx.clone();

    let mut engine: TurnEngine = TurnEngine::builder(registry.all())
        .settings(settings)
        .timer(timer)
        .on_turn_change(move |player| {
            let _ = turn_tx.send(SessionEvent::TurnStarted(player.id.clone()));
        })
        .on_game_over(move |winner| {
            let _ = events_tx.send(SessionEvent::GameOver(winner.map(|p| p.id.clone())));
        })
        .build()?;

    engine.start_game()?;

    loop {
        tokio::select! {
            Some(event) = events.recv() => match event {
                SessionEvent::TurnStarted(player_id) => {
                    let is_human = registry
                        .get(&player_id)
                        .and_then(|p| p.is_human)
                        .unwrap_or(false);
                    if !engine.is_player_turn(&player_id) {
                        debug!(%player_id, "Turn already over");
                    } else if is_human {
                        info!(%player_id, "Waiting for human player");
                    } else {
                        engine.make_move(MoveInput::new())?;
                        engine.next_turn();
                    }
                }
                SessionEvent::GameOver(winner) => {
                    info!(?winner, "Session finished");
                    break;
                }
            },
            Some(token) = timeouts.recv() => {
                let advanced = engine.handle_timeout(token);
                debug!(%token, advanced, "Timer delivered");
            }
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted");
                engine.destroy();
                break;
            }
        }
    }

    for player in engine.players() {
        let made = engine.moves_by_player(&player.id).len();
        registry.set_score(&player.id, i64::try_from(made).unwrap_or(i64::MAX));
    }

    println!(
        "Played {} turns with {} moves in {}s",
        engine.turn_count(),
        engine.moves().len(),
        engine.game_duration_seconds()
    );
    for (rank, player) in registry.by_score_descending().iter().enumerate() {
        println!("{}. {} ({} moves)", rank + 1, player.name, player.score_or_zero());
    }
    if let Some(leader) = registry.winner_by_score() {
        println!("Most active: {}", leader.name);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
    }

    Ok(())
}
