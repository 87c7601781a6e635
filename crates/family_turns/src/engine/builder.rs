//! Construction of a [`TurnEngine`].

use super::moves::{AcceptAll, MoveValidator};
use super::settings::TurnSettings;
use super::TurnEngine;
use crate::clock::{Clock, SystemClock, TurnTimer};
use crate::error::ConfigurationError;
use crate::player::Player;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{instrument, warn};

/// Called with the player whose turn just started.
pub type TurnChangeCallback<T> = Box<dyn FnMut(&Player<T>) + Send>;

/// Called once with the winner (or `None` for a no-contest finish).
pub type GameOverCallback<T> = Box<dyn FnMut(Option<&Player<T>>) + Send>;

/// Collects the players, callbacks, limits and time sources for an engine.
///
/// Both callbacks are mandatory. A timer is mandatory only when a turn time
/// limit is set and auto-skip is on.
pub struct TurnEngineBuilder<T = (), M = ()> {
    players: Vec<Player<T>>,
    settings: TurnSettings,
    on_turn_change: Option<TurnChangeCallback<T>>,
    on_game_over: Option<GameOverCallback<T>>,
    clock: Option<Box<dyn Clock>>,
    timer: Option<Box<dyn TurnTimer>>,
    validator: Option<Box<dyn MoveValidator<T, M>>>,
}

impl<T, M> TurnEngineBuilder<T, M> {
    pub(super) fn new(players: Vec<Player<T>>) -> Self {
        Self {
            players,
            settings: TurnSettings::default(),
            on_turn_change: None,
            on_game_over: None,
            clock: None,
            timer: None,
            validator: None,
        }
    }

    /// Replaces all limits at once.
    pub fn settings(mut self, settings: TurnSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Ends the session with no winner after this many turn advances.
    pub fn max_turns(mut self, max_turns: u32) -> Self {
        self.settings.max_turns = Some(max_turns);
        self
    }

    /// Time a player may idle before the turn is skipped.
    pub fn turn_time_limit(mut self, limit: Duration) -> Self {
        self.settings.turn_time_limit = Some(limit);
        self
    }

    /// Whether an elapsed turn timer skips the idle player. Defaults to `true`.
    pub fn auto_skip(mut self, auto_skip: bool) -> Self {
        self.settings.auto_skip = auto_skip;
        self
    }

    /// Sets the turn-change callback.
    pub fn on_turn_change(mut self, callback: impl FnMut(&Player<T>) + Send + 'static) -> Self {
        self.on_turn_change = Some(Box::new(callback));
        self
    }

    /// Sets the game-over callback.
    pub fn on_game_over(
        mut self,
        callback: impl FnMut(Option<&Player<T>>) + Send + 'static,
    ) -> Self {
        self.on_game_over = Some(Box::new(callback));
        self
    }

    /// Clock used for timestamps. Defaults to [`SystemClock`].
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    /// Timer used for per-turn timeouts.
    pub fn timer(mut self, timer: impl TurnTimer + 'static) -> Self {
        self.timer = Some(Box::new(timer));
        self
    }

    /// Move validator used by `validate_move` and `try_move`. Defaults to [`AcceptAll`].
    pub fn validator(mut self, validator: impl MoveValidator<T, M> + 'static) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    /// Checks the configuration and builds a waiting engine.
    ///
    /// No callback is invoked and no timer is armed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] if the player list is empty, contains a
    /// duplicate id, a callback is missing, or a timed auto-skip session has
    /// no timer.
    #[instrument(skip(self), fields(players = self.players.len()))]
    pub fn build(self) -> Result<TurnEngine<T, M>, ConfigurationError> {
        if self.players.is_empty() {
            warn!("Rejecting engine without players");
            return Err(ConfigurationError::NoPlayers);
        }

        let mut seen = HashSet::new();
        for player in &self.players {
            if !seen.insert(player.id.as_str()) {
                warn!(player_id = %player.id, "Rejecting duplicate player id");
                return Err(ConfigurationError::DuplicatePlayerId(player.id.clone()));
            }
        }

        let on_turn_change = self
            .on_turn_change
            .ok_or(ConfigurationError::MissingTurnChangeCallback)?;
        let on_game_over = self
            .on_game_over
            .ok_or(ConfigurationError::MissingGameOverCallback)?;

        if self.settings.timeout().is_some() && self.timer.is_none() {
            warn!("Rejecting timed session without a timer");
            return Err(ConfigurationError::MissingTimer);
        }

        let clock: Box<dyn Clock> = match self.clock {
            Some(clock) => clock,
            None => Box::new(SystemClock),
        };
        let validator: Box<dyn MoveValidator<T, M>> = match self.validator {
            Some(validator) => validator,
            None => Box::new(AcceptAll),
        };

        Ok(TurnEngine::from_parts(
            self.players,
            self.settings,
            on_turn_change,
            on_game_over,
            clock,
            self.timer,
            validator,
        ))
    }
}

impl<T: std::fmt::Debug, M> std::fmt::Debug for TurnEngineBuilder<T, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnEngineBuilder")
            .field("players", &self.players)
            .field("settings", &self.settings)
            .field("on_turn_change", &self.on_turn_change.is_some())
            .field("on_game_over", &self.on_game_over.is_some())
            .field("timer", &self.timer.is_some())
            .finish_non_exhaustive()
    }
}
