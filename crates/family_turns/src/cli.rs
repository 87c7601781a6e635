//! Command-line interface for family_turns.

use clap::{Parser, Subcommand};

/// Family Turns - turn management for family activities and games
#[derive(Parser, Debug)]
#[command(name = "family_turns")]
#[command(about = "Turn-order engine for family games", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a session from a config file. Computer players move at once,
    /// human players idle until their turn times out.
    Simulate {
        /// Path to session configuration file
        #[arg(short, long, default_value = "session.toml")]
        config: std::path::PathBuf,

        /// Override the turn limit
        #[arg(long)]
        max_turns: Option<u32>,

        /// Override the per-turn time limit, in seconds
        #[arg(long)]
        turn_time_limit_secs: Option<u64>,

        /// Print the final session snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a config file and print the resulting players and limits
    CheckConfig {
        /// Path to session configuration file
        #[arg(short, long, default_value = "session.toml")]
        config: std::path::PathBuf,
    },
}
