//! Session lifecycle states and the serialisable session snapshot.

use super::moves::Move;
use crate::player::PlayerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a game session.
///
/// ```text
///   Waiting ──start_game──→ Playing ──pause──→ Paused
///      ↑                     │  ↑                │
///      │                     │  └────resume──────┘
///      │            end_game / turn limit
///      │                     ↓
///      └──────restart─── Finished
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TurnState {
    /// Constructed or restarted, not yet started.
    #[default]
    Waiting,
    /// A player is taking their turn.
    Playing,
    /// Play is suspended; no timeouts fire.
    Paused,
    /// The session is over.
    Finished,
}

/// Point-in-time copy of a session, for callers that persist sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot<M = ()> {
    /// Lifecycle state.
    pub state: TurnState,
    /// Id of the current player.
    pub current_player_id: PlayerId,
    /// Completed turns.
    pub turn_count: u32,
    /// Move log.
    pub moves: Vec<Move<M>>,
    /// Winner id, once finished with a winner.
    pub winner_id: Option<PlayerId>,
    /// When the session started.
    pub start_time: Option<DateTime<Utc>>,
    /// Time of the most recent move or turn change.
    pub last_move_time: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Roll {
        pips: u8,
    }

    #[test]
    fn test_state_names_are_lowercase() {
        assert_eq!(TurnState::Paused.to_string(), "paused");
        assert_eq!(TurnState::from_str("finished"), Ok(TurnState::Finished));
        assert_eq!(
            serde_json::to_string(&TurnState::Waiting).expect("serialize"),
            r#""waiting""#
        );
    }

    #[test]
    fn test_snapshot_with_payload_survives_json() {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let snapshot = SessionSnapshot {
            state: TurnState::Playing,
            current_player_id: "kid".to_string(),
            turn_count: 2,
            moves: vec![
                Move::new("mom".to_string(), at, 0, None, None, Some(Roll { pips: 6 })),
                Move::new("dad".to_string(), at, 1, None, Some("c3".to_string()), None),
            ],
            winner_id: None,
            start_time: Some(at),
            last_move_time: Some(at),
        };

        let json = serde_json::to_string(&snapshot).expect("serialize");
        assert!(!json.contains(r#""data":null"#));
        let restored: SessionSnapshot<Roll> = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored, snapshot);
    }
}
