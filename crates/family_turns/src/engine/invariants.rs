//! Session invariants.
//!
//! Invariants are logical properties that must hold after every transition.
//! The engine checks them in debug builds; they can also be checked
//! independently against any engine.

use super::{TurnEngine, TurnState};

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
///
/// Implementations are provided for tuples.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set.
    ///
    /// Returns Ok(()) if all invariants hold, or Err with a list of
    /// violations if any invariant fails.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

fn check<S, I: Invariant<S>>(state: &S, violations: &mut Vec<InvariantViolation>) {
    if !I::holds(state) {
        violations.push(InvariantViolation::new(I::description()));
    }
}

fn into_result(violations: Vec<InvariantViolation>) -> Result<(), Vec<InvariantViolation>> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

impl<S, I1, I2, I3> InvariantSet<S> for (I1, I2, I3)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();
        check::<S, I1>(state, &mut violations);
        check::<S, I2>(state, &mut violations);
        check::<S, I3>(state, &mut violations);
        into_result(violations)
    }
}

impl<S, I1, I2> InvariantSet<S> for (I1, I2)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();
        check::<S, I1>(state, &mut violations);
        check::<S, I2>(state, &mut violations);
        into_result(violations)
    }
}

/// Invariant: the current player index points into the player list.
pub struct CurrentIndexInRange;

impl<T, M> Invariant<TurnEngine<T, M>> for CurrentIndexInRange {
    fn holds(engine: &TurnEngine<T, M>) -> bool {
        engine.current_player_index() < engine.players().len()
    }

    fn description() -> &'static str {
        "Current player index is within the player list"
    }
}

/// Invariant: a winner is only recorded once the session is finished.
pub struct WinnerOnlyWhenFinished;

impl<T, M> Invariant<TurnEngine<T, M>> for WinnerOnlyWhenFinished {
    fn holds(engine: &TurnEngine<T, M>) -> bool {
        engine.winner().is_none() || engine.state() == TurnState::Finished
    }

    fn description() -> &'static str {
        "Winner is set only when the game is finished"
    }
}

/// Invariant: move turn numbers never decrease and never run ahead of the turn count.
pub struct MoveLogConsistent;

impl<T, M> Invariant<TurnEngine<T, M>> for MoveLogConsistent {
    fn holds(engine: &TurnEngine<T, M>) -> bool {
        let moves = engine.moves();
        let ordered = moves
            .windows(2)
            .all(|pair| pair[0].turn_number() <= pair[1].turn_number());
        let bounded = moves
            .iter()
            .all(|m| *m.turn_number() <= engine.turn_count());
        ordered && bounded
    }

    fn description() -> &'static str {
        "Move log turn numbers are ordered and bounded by the turn count"
    }
}

/// All session invariants as a composable set.
pub type SessionInvariants = (CurrentIndexInRange, WinnerOnlyWhenFinished, MoveLogConsistent);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MoveInput;
    use crate::player::Player;

    fn engine() -> TurnEngine {
        TurnEngine::builder(vec![Player::new("a", "A"), Player::new("b", "B")])
            .on_turn_change(|_| {})
            .on_game_over(|_| {})
            .build()
            .expect("valid config")
    }

    #[test]
    fn test_invariant_set_holds_through_a_session() {
        let mut engine = engine();
        assert!(SessionInvariants::check_all(&engine).is_ok());

        engine.start_game().unwrap();
        engine.make_move(MoveInput::new()).unwrap();
        engine.next_turn();
        engine.make_move(MoveInput::new()).unwrap();
        assert!(SessionInvariants::check_all(&engine).is_ok());

        let winner = engine.player_by_id("b").cloned();
        engine.end_game(winner);
        assert!(SessionInvariants::check_all(&engine).is_ok());
    }

    #[test]
    fn test_invariant_set_detects_violations() {
        let mut engine = engine();
        engine.session.current_player_index = 5;
        engine.session.winner = Some(Player::new("a", "A"));

        let violations = SessionInvariants::check_all(&engine).unwrap_err();
        assert_eq!(violations.len(), 2);
    }

    #[test]
    fn test_two_invariants_as_set() {
        let engine = engine();
        type TwoInvariants = (CurrentIndexInRange, MoveLogConsistent);
        assert!(TwoInvariants::check_all(&engine).is_ok());
    }
}
