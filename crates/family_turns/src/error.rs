//! Error types for the turn engine, the player registry and config loading.

use crate::engine::TurnState;
use derive_more::{Display, Error};
use tracing::instrument;

/// Invalid input when building a [`TurnEngine`](crate::TurnEngine).
///
/// Fatal: no engine is produced and the caller must fix the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum ConfigurationError {
    /// The player list was empty.
    #[display("A turn engine needs at least one player")]
    NoPlayers,

    /// Two players in the list share an id.
    #[display("Duplicate player id {:?}", _0)]
    DuplicatePlayerId(#[error(not(source))] String),

    /// No `on_turn_change` callback was supplied.
    #[display("Missing on_turn_change callback")]
    MissingTurnChangeCallback,

    /// No `on_game_over` callback was supplied.
    #[display("Missing on_game_over callback")]
    MissingGameOverCallback,

    /// A turn time limit with auto-skip was configured but no timer was injected.
    #[display("Turn time limit configured without a timer")]
    MissingTimer,
}

/// An operation was rejected by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum TurnError {
    /// The operation is not allowed in the current state.
    #[display("Cannot {} while the game is {}", operation, state)]
    InvalidState {
        /// Name of the rejected operation.
        operation: &'static str,
        /// State the engine was in.
        state: TurnState,
    },

    /// The move validator rejected a move.
    #[display("Illegal move: {}", _0)]
    IllegalMove(#[error(not(source))] String),
}

/// Player registry error.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum RegistryError {
    /// A player with this id is already registered.
    #[display("Player {:?} is already registered", _0)]
    DuplicateId(#[error(not(source))] String),
}

/// Failure to read or parse a session config file.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_state_message_names_state() {
        let err = TurnError::InvalidState {
            operation: "start the game",
            state: TurnState::Playing,
        };
        assert_eq!(err.to_string(), "Cannot start the game while the game is playing");
    }

    #[test]
    fn test_config_error_tracks_location() {
        let err = ConfigError::new("boom");
        assert!(err.file.ends_with("error.rs"));
        assert!(err.to_string().starts_with("Config error: boom"));
    }

    #[test]
    fn test_errors_have_no_source() {
        use std::error::Error as _;

        let duplicate = RegistryError::DuplicateId("mom".to_string());
        assert!(duplicate.source().is_none());
        assert_eq!(duplicate.to_string(), r#"Player "mom" is already registered"#);

        let illegal = TurnError::IllegalMove("out of range".to_string());
        assert!(illegal.source().is_none());
        assert!(ConfigurationError::DuplicatePlayerId("a".to_string()).source().is_none());
    }
}
