//! Player model shared by the registry and the turn engine.

use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Unique identifier for a player.
pub type PlayerId = String;

/// A participant in a family activity or game.
///
/// Identity is `id`; every other field may change over a session. The
/// `data` payload is game-specific and never inspected by this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Setters)]
#[setters(strip_option)]
pub struct Player<T = ()> {
    /// Player's unique ID.
    #[setters(skip)]
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Avatar image reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Display colour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Current score; a missing score ranks as zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    /// Whether a person (rather than the computer) controls this player.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_human: Option<bool>,
    /// Game-specific payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Player<T> {
    /// Creates a player with only an id and a name.
    #[instrument(skip_all)]
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            avatar: None,
            color: None,
            score: None,
            is_human: None,
            data: None,
        }
    }

    /// Score used for ranking.
    pub fn score_or_zero(&self) -> i64 {
        self.score.unwrap_or(0)
    }

    /// Merges the fields present in `update` into this player. The id never changes.
    pub fn apply(&mut self, update: PlayerUpdate<T>) {
        let PlayerUpdate {
            name,
            avatar,
            color,
            score,
            is_human,
            data,
        } = update;

        if let Some(name) = name {
            self.name = name;
        }
        if avatar.is_some() {
            self.avatar = avatar;
        }
        if color.is_some() {
            self.color = color;
        }
        if score.is_some() {
            self.score = score;
        }
        if is_human.is_some() {
            self.is_human = is_human;
        }
        if data.is_some() {
            self.data = data;
        }
    }
}

/// Partial player fields for [`PlayerRegistry::update`](crate::PlayerRegistry::update).
///
/// There is deliberately no `id` field.
#[derive(Debug, Clone, PartialEq, Setters)]
#[setters(strip_option)]
pub struct PlayerUpdate<T = ()> {
    /// New display name.
    pub name: Option<String>,
    /// New avatar.
    pub avatar: Option<String>,
    /// New colour.
    pub color: Option<String>,
    /// New score.
    pub score: Option<i64>,
    /// New human/computer flag.
    pub is_human: Option<bool>,
    /// New payload.
    pub data: Option<T>,
}

impl<T> Default for PlayerUpdate<T> {
    fn default() -> Self {
        Self {
            name: None,
            avatar: None,
            color: None,
            score: None,
            is_human: None,
            data: None,
        }
    }
}
