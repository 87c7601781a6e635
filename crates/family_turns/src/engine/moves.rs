//! Move log entries and move validation.
//!
//! The engine never interprets a move. It stamps who made it and when, and
//! leaves legality to a [`MoveValidator`] supplied by the game.

use crate::player::{Player, PlayerId};
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use derive_new::new;
use derive_setters::Setters;
use serde::{Deserialize, Serialize};

/// A recorded move. Immutable once it is in the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, new)]
pub struct Move<M = ()> {
    /// Player whose turn it was.
    player_id: PlayerId,
    /// When the move was recorded.
    timestamp: DateTime<Utc>,
    /// Turn count at the time of the move.
    turn_number: u32,
    /// Where the move started, for board-style games.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    from: Option<String>,
    /// Where the move ended, for board-style games.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    to: Option<String>,
    /// Game-specific payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<M>,
}

/// What the caller knows about a move; the engine fills in the rest.
#[derive(Debug, Clone, PartialEq, Setters)]
#[setters(strip_option)]
pub struct MoveInput<M = ()> {
    /// Origin square, card pile, etc.
    pub from: Option<String>,
    /// Destination.
    pub to: Option<String>,
    /// Game-specific payload.
    pub data: Option<M>,
}

impl<M> MoveInput<M> {
    /// An empty move.
    pub fn new() -> Self {
        Self {
            from: None,
            to: None,
            data: None,
        }
    }
}

impl<M> Default for MoveInput<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of validating a move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveValidation {
    /// Whether the move is allowed.
    pub is_valid: bool,
    /// Why it was rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl MoveValidation {
    /// An accepted move.
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            reason: None,
        }
    }

    /// A rejected move.
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            reason: Some(reason.into()),
        }
    }
}

/// Game-specific move legality.
pub trait MoveValidator<T, M>: Send {
    /// Checks `input` as a move by `current`, given the log so far.
    fn validate(
        &self,
        current: &Player<T>,
        history: &[Move<M>],
        input: &MoveInput<M>,
    ) -> MoveValidation;
}

impl<T, M, F> MoveValidator<T, M> for F
where
    F: Fn(&Player<T>, &[Move<M>], &MoveInput<M>) -> MoveValidation + Send,
{
    fn validate(
        &self,
        current: &Player<T>,
        history: &[Move<M>],
        input: &MoveInput<M>,
    ) -> MoveValidation {
        self(current, history, input)
    }
}

/// Validator that accepts every move.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl<T, M> MoveValidator<T, M> for AcceptAll {
    fn validate(&self, _: &Player<T>, _: &[Move<M>], _: &MoveInput<M>) -> MoveValidation {
        MoveValidation::valid()
    }
}
