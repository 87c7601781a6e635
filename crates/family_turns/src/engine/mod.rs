//! Turn engine: drives one game session through turn order, per-turn
//! timeouts and completion.
//!
//! The engine is single-threaded and not reentrant. Callbacks receive a
//! borrowed player and must not call back into the engine.
//!
//! Operations that do not apply in the current state are split in two
//! groups. `start_game` and `make_move` return [`TurnError::InvalidState`].
//! `next_turn`, `skip_turn`, `pause` and `resume` silently do nothing, so UI
//! handlers can call them without checking the state first.
//!
//! Pausing drops the pending turn timer. Resuming arms a fresh, full
//! interval; remaining time is not carried over.

mod builder;
mod invariants;
mod moves;
mod settings;
mod state;

pub use builder::{GameOverCallback, TurnChangeCallback, TurnEngineBuilder};
pub use invariants::{
    CurrentIndexInRange, Invariant, InvariantSet, InvariantViolation, MoveLogConsistent,
    SessionInvariants, WinnerOnlyWhenFinished,
};
pub use moves::{AcceptAll, Move, MoveInput, MoveValidation, MoveValidator};
pub use settings::TurnSettings;
pub use state::{SessionSnapshot, TurnState};

use crate::clock::{Clock, TimerToken, TurnTimer};
use crate::error::TurnError;
use crate::player::Player;
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

/// Mutable state of one session. Reset wholesale by `restart`.
struct Session<T, M> {
    current_player_index: usize,
    turn_count: u32,
    status: TurnState,
    moves: Vec<Move<M>>,
    winner: Option<Player<T>>,
    start_time: Option<DateTime<Utc>>,
    last_move_time: Option<DateTime<Utc>>,
}

impl<T, M> Session<T, M> {
    fn new() -> Self {
        Self {
            current_player_index: 0,
            turn_count: 0,
            status: TurnState::Waiting,
            moves: Vec::new(),
            winner: None,
            start_time: None,
            last_move_time: None,
        }
    }
}

/// Round-robin turn engine over a fixed player list.
///
/// `T` is the per-player payload and `M` the per-move payload; the engine
/// never inspects either. The player list is copied in at construction and
/// cannot change afterwards.
pub struct TurnEngine<T = (), M = ()> {
    players: Vec<Player<T>>,
    settings: TurnSettings,
    on_turn_change: TurnChangeCallback<T>,
    on_game_over: GameOverCallback<T>,
    clock: Box<dyn Clock>,
    timer: Option<Box<dyn TurnTimer>>,
    validator: Box<dyn MoveValidator<T, M>>,
    session: Session<T, M>,
    pending_timer: Option<TimerToken>,
    next_token: TimerToken,
    destroyed: bool,
}

impl<T, M> TurnEngine<T, M> {
    /// Starts building an engine over `players`, in turn order.
    pub fn builder(players: Vec<Player<T>>) -> TurnEngineBuilder<T, M> {
        TurnEngineBuilder::new(players)
    }

    fn from_parts(
        players: Vec<Player<T>>,
        settings: TurnSettings,
        on_turn_change: TurnChangeCallback<T>,
        on_game_over: GameOverCallback<T>,
        clock: Box<dyn Clock>,
        timer: Option<Box<dyn TurnTimer>>,
        validator: Box<dyn MoveValidator<T, M>>,
    ) -> Self {
        info!(
            players = players.len(),
            max_turns = ?settings.max_turns,
            turn_time_limit = ?settings.turn_time_limit,
            auto_skip = settings.auto_skip,
            "Created turn engine"
        );
        Self {
            players,
            settings,
            on_turn_change,
            on_game_over,
            clock,
            timer,
            validator,
            session: Session::new(),
            pending_timer: None,
            next_token: TimerToken::first(),
            destroyed: false,
        }
    }

    // ─────────────────────────────────────────────────────────────
    //  Transitions
    // ─────────────────────────────────────────────────────────────

    /// Starts the session and announces the first player.
    ///
    /// # Errors
    ///
    /// Returns [`TurnError::InvalidState`] unless the engine is waiting.
    #[instrument(skip(self), fields(state = %self.session.status))]
    pub fn start_game(&mut self) -> Result<(), TurnError> {
        self.require(TurnState::Waiting, "start the game")?;

        self.session.status = TurnState::Playing;
        self.session.start_time = Some(self.clock.now());
        info!(first_player = %self.current_player().id, "Game started");

        self.notify_turn_change();
        self.arm_timer();
        self.check_invariants();
        Ok(())
    }

    /// Hands the turn to the next player. Does nothing unless playing.
    ///
    /// Reaching the turn limit finishes the session with no winner, without
    /// announcing the player the turn would have passed to.
    #[instrument(skip(self), fields(turn = self.session.turn_count))]
    pub fn next_turn(&mut self) {
        if self.session.status != TurnState::Playing {
            debug!(state = %self.session.status, "Ignoring next_turn");
            return;
        }
        self.advance();
    }

    /// Skips the current player's turn. Does nothing unless playing.
    #[instrument(skip(self), fields(turn = self.session.turn_count))]
    pub fn skip_turn(&mut self) {
        if self.session.status != TurnState::Playing {
            debug!(state = %self.session.status, "Ignoring skip_turn");
            return;
        }
        info!(player_id = %self.current_player().id, "Skipping turn");
        self.advance();
    }

    fn advance(&mut self) {
        self.session.current_player_index =
            (self.session.current_player_index + 1) % self.players.len();
        self.session.turn_count = self.session.turn_count.saturating_add(1);
        self.session.last_move_time = Some(self.clock.now());

        if let Some(max_turns) = self.settings.max_turns {
            if self.session.turn_count >= max_turns {
                info!(turn = self.session.turn_count, max_turns, "Turn limit reached");
                self.finish(None);
                return;
            }
        }

        debug!(
            turn = self.session.turn_count,
            player_id = %self.current_player().id,
            "Turn advanced"
        );
        self.notify_turn_change();
        self.arm_timer();
        self.check_invariants();
    }

    /// Records a move by the current player. The turn does not advance.
    ///
    /// The move is not validated; see [`TurnEngine::try_move`].
    ///
    /// # Errors
    ///
    /// Returns [`TurnError::InvalidState`] unless playing.
    #[instrument(skip(self, input), fields(turn = self.session.turn_count))]
    pub fn make_move(&mut self, input: MoveInput<M>) -> Result<&Move<M>, TurnError> {
        self.require(TurnState::Playing, "make a move")?;

        let now = self.clock.now();
        let MoveInput { from, to, data } = input;
        let player_id = self.current_player().id.clone();
        debug!(%player_id, ?from, ?to, "Recording move");

        self.session.moves.push(Move::new(
            player_id,
            now,
            self.session.turn_count,
            from,
            to,
            data,
        ));
        self.session.last_move_time = Some(now);
        self.check_invariants();

        let index = self.session.moves.len() - 1;
        Ok(&self.session.moves[index])
    }

    /// Validates a move with the configured validator, then records it.
    ///
    /// # Errors
    ///
    /// Returns [`TurnError::InvalidState`] unless playing, or
    /// [`TurnError::IllegalMove`] if the validator rejects the move. A
    /// rejected move is not recorded.
    #[instrument(skip(self, input), fields(turn = self.session.turn_count))]
    pub fn try_move(&mut self, input: MoveInput<M>) -> Result<&Move<M>, TurnError> {
        self.require(TurnState::Playing, "make a move")?;

        let validation = self.validate_move(&input);
        if !validation.is_valid {
            let reason = validation
                .reason
                .unwrap_or_else(|| "rejected by validator".to_string());
            warn!(%reason, "Move rejected");
            return Err(TurnError::IllegalMove(reason));
        }
        self.make_move(input)
    }

    /// Suspends play. Does nothing unless playing.
    #[instrument(skip(self))]
    pub fn pause(&mut self) {
        if self.session.status != TurnState::Playing {
            debug!(state = %self.session.status, "Ignoring pause");
            return;
        }
        self.cancel_timer();
        self.session.status = TurnState::Paused;
        info!("Game paused");
    }

    /// Resumes play with a fresh turn timer. Does nothing unless paused.
    #[instrument(skip(self))]
    pub fn resume(&mut self) {
        if self.session.status != TurnState::Paused {
            debug!(state = %self.session.status, "Ignoring resume");
            return;
        }
        self.session.status = TurnState::Playing;
        info!("Game resumed");
        self.arm_timer();
    }

    /// Finishes the session with `winner` (or `None` for no winner).
    ///
    /// Fires `on_game_over` once. Calling it on a finished session does nothing.
    #[instrument(skip(self, winner), fields(winner = ?winner.as_ref().map(|p| &p.id)))]
    pub fn end_game(&mut self, winner: Option<Player<T>>) {
        if self.session.status == TurnState::Finished {
            debug!("Game already finished");
            return;
        }
        self.finish(winner);
    }

    fn finish(&mut self, winner: Option<Player<T>>) {
        self.cancel_timer();
        self.session.status = TurnState::Finished;
        self.session.winner = winner;
        info!(
            winner = ?self.session.winner.as_ref().map(|p| &p.id),
            turns = self.session.turn_count,
            moves = self.session.moves.len(),
            "Game over"
        );
        self.check_invariants();

        if !self.destroyed {
            (self.on_game_over)(self.session.winner.as_ref());
        }
    }

    /// Returns to `Waiting` with an empty session. Players, callbacks and
    /// limits are kept.
    #[instrument(skip(self), fields(state = %self.session.status))]
    pub fn restart(&mut self) {
        self.cancel_timer();
        self.session = Session::new();
        info!("Game restarted");
    }

    /// Handles an elapsed turn timer.
    ///
    /// Skips the idle player if `token` is the pending timer, the game is
    /// playing and auto-skip is on. A token that was cancelled or replaced is
    /// ignored. Returns whether the turn advanced.
    #[instrument(skip(self))]
    pub fn handle_timeout(&mut self, token: TimerToken) -> bool {
        if self.destroyed || self.pending_timer != Some(token) {
            debug!(pending = ?self.pending_timer, "Ignoring stale timer");
            return false;
        }
        self.pending_timer = None;

        if self.session.status != TurnState::Playing || !self.settings.auto_skip {
            debug!(state = %self.session.status, "Timer elapsed outside play");
            return false;
        }

        info!(player_id = %self.current_player().id, "Turn timed out");
        self.advance();
        true
    }

    /// Cancels any pending timer. No callback fires after this.
    #[instrument(skip(self))]
    pub fn destroy(&mut self) {
        self.cancel_timer();
        self.destroyed = true;
        info!("Turn engine destroyed");
    }

    // ─────────────────────────────────────────────────────────────
    //  Accessors
    // ─────────────────────────────────────────────────────────────

    /// Player whose turn it is.
    pub fn current_player(&self) -> &Player<T> {
        &self.players[self.session.current_player_index]
    }

    /// Index of the current player in turn order.
    pub fn current_player_index(&self) -> usize {
        self.session.current_player_index
    }

    /// Players in turn order.
    pub fn players(&self) -> &[Player<T>] {
        &self.players
    }

    /// Looks up a player by id.
    pub fn player_by_id(&self, id: &str) -> Option<&Player<T>> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TurnState {
        self.session.status
    }

    /// Number of completed turn advances. Saturates at `u32::MAX`.
    pub fn turn_count(&self) -> u32 {
        self.session.turn_count
    }

    /// Move log, oldest first.
    pub fn moves(&self) -> &[Move<M>] {
        &self.session.moves
    }

    /// Moves made by one player, oldest first.
    pub fn moves_by_player(&self, id: &str) -> Vec<&Move<M>> {
        self.session
            .moves
            .iter()
            .filter(|m| m.player_id() == id)
            .collect()
    }

    /// Winner of a finished session, if there was one.
    pub fn winner(&self) -> Option<&Player<T>> {
        self.session.winner.as_ref()
    }

    /// Whether the session has finished.
    pub fn is_game_over(&self) -> bool {
        self.session.status == TurnState::Finished
    }

    /// Whether the game is playing and it is this player's turn.
    pub fn is_player_turn(&self, id: &str) -> bool {
        self.session.status == TurnState::Playing && self.current_player().id == id
    }

    /// When the session started.
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.session.start_time
    }

    /// Time of the most recent move or turn change.
    pub fn last_move_time(&self) -> Option<DateTime<Utc>> {
        self.session.last_move_time
    }

    /// Limits this engine was built with.
    pub fn settings(&self) -> &TurnSettings {
        &self.settings
    }

    /// Whole seconds since the session started.
    ///
    /// A finished session measures up to its last move (zero if none was
    /// made). A session that never started measures zero.
    pub fn game_duration_seconds(&self) -> i64 {
        let Some(start) = self.session.start_time else {
            return 0;
        };
        let end = if self.is_game_over() {
            self.session.last_move_time.unwrap_or(start)
        } else {
            self.clock.now()
        };
        (end - start).num_seconds().max(0)
    }

    /// Checks a move against the configured validator without recording it.
    pub fn validate_move(&self, input: &MoveInput<M>) -> MoveValidation {
        self.validator
            .validate(self.current_player(), &self.session.moves, input)
    }

    // ─────────────────────────────────────────────────────────────
    //  Internals
    // ─────────────────────────────────────────────────────────────

    fn require(&self, expected: TurnState, operation: &'static str) -> Result<(), TurnError> {
        if self.session.status == expected {
            Ok(())
        } else {
            warn!(operation, state = %self.session.status, "Operation rejected");
            Err(TurnError::InvalidState {
                operation,
                state: self.session.status,
            })
        }
    }

    fn notify_turn_change(&mut self) {
        if self.destroyed {
            return;
        }
        let player = &self.players[self.session.current_player_index];
        (self.on_turn_change)(player);
    }

    fn arm_timer(&mut self) {
        self.cancel_timer();
        if self.destroyed {
            return;
        }
        let (Some(limit), Some(timer)) = (self.settings.timeout(), self.timer.as_mut()) else {
            return;
        };

        let token = self.next_token;
        self.next_token = token.next();
        self.pending_timer = Some(token);
        debug!(%token, ?limit, "Arming turn timer");
        timer.arm(token, limit);
    }

    fn cancel_timer(&mut self) {
        if let Some(token) = self.pending_timer.take() {
            debug!(%token, "Cancelling turn timer");
            if let Some(timer) = self.timer.as_mut() {
                timer.cancel(token);
            }
        }
    }

    fn check_invariants(&self) {
        #[cfg(debug_assertions)]
        if let Err(violations) = <SessionInvariants as InvariantSet<Self>>::check_all(self) {
            tracing::error!(?violations, "Session invariants violated");
            panic!("Session invariants violated: {violations:?}");
        }
    }
}

impl<T, M: Clone> TurnEngine<T, M> {
    /// Serialisable copy of the session.
    pub fn snapshot(&self) -> SessionSnapshot<M> {
        SessionSnapshot {
            state: self.session.status,
            current_player_id: self.current_player().id.clone(),
            turn_count: self.session.turn_count,
            moves: self.session.moves.clone(),
            winner_id: self.session.winner.as_ref().map(|p| p.id.clone()),
            start_time: self.session.start_time,
            last_move_time: self.session.last_move_time,
        }
    }
}

impl<T, M> Drop for TurnEngine<T, M> {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

impl<T: std::fmt::Debug, M: std::fmt::Debug> std::fmt::Debug for TurnEngine<T, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnEngine")
            .field("players", &self.players)
            .field("settings", &self.settings)
            .field("state", &self.session.status)
            .field("current_player_index", &self.session.current_player_index)
            .field("turn_count", &self.session.turn_count)
            .field("moves", &self.session.moves)
            .field("pending_timer", &self.pending_timer)
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}
