//! Family Turns - generic turn management for family activities and games
//!
//! Tracks who is playing, whose turn it is, how long they may idle, and
//! what moves were made, then reports when the game is over.
//!
//! # Architecture
//!
//! - **Registry**: id-keyed player store with score ranking
//! - **Engine**: round-robin turn state machine with per-turn timeouts
//! - **Clock**: injectable time sources (system, manual, tokio)
//! - **Config**: TOML session files
//!
//! # Example
//!
//! ```
//! use family_turns::{MoveInput, Player, TurnEngine, TurnState};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let players = vec![Player::new("mom", "Mom"), Player::new("kid", "Kid")];
//! let mut engine: TurnEngine = TurnEngine::builder(players)
//!     .max_turns(10)
//!     .on_turn_change(|player| println!("{}'s turn", player.name))
//!     .on_game_over(|winner| println!("winner: {:?}", winner.map(|p| &p.name)))
//!     .build()?;
//!
//! engine.start_game()?;
//! engine.make_move(MoveInput::new().to("c3".to_string()))?;
//! engine.next_turn();
//! assert_eq!(engine.current_player().id, "kid");
//! assert_eq!(engine.state(), TurnState::Playing);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod clock;
mod config;
mod engine;
mod error;
mod player;
mod registry;
mod tokio_timer;

// Crate-level exports - Players
pub use player::{Player, PlayerId, PlayerUpdate};
pub use registry::PlayerRegistry;

// Crate-level exports - Turn engine
pub use engine::{
    AcceptAll, CurrentIndexInRange, GameOverCallback, Invariant, InvariantSet,
    InvariantViolation, Move, MoveInput, MoveLogConsistent, MoveValidation, MoveValidator,
    SessionInvariants, SessionSnapshot, TurnChangeCallback, TurnEngine, TurnEngineBuilder,
    TurnSettings, TurnState, WinnerOnlyWhenFinished,
};

// Crate-level exports - Time sources
pub use clock::{Clock, ManualClock, SystemClock, TimerToken, TurnTimer};
pub use tokio_timer::TokioTimer;

// Crate-level exports - Configuration
pub use config::SessionConfig;

// Crate-level exports - Errors
pub use error::{ConfigError, ConfigurationError, RegistryError, TurnError};
