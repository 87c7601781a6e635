//! Turn limits and timeout policy.

use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Limits applied to a session.
///
/// In config files the time limit is written in whole seconds as
/// `turn_time_limit_secs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Setters)]
#[setters(strip_option)]
pub struct TurnSettings {
    /// Number of turn advances after which the session ends with no winner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_turns: Option<u32>,

    /// How long a player may idle before the turn is forfeited.
    #[serde(
        default,
        rename = "turn_time_limit_secs",
        with = "optional_secs",
        skip_serializing_if = "Option::is_none"
    )]
    pub turn_time_limit: Option<Duration>,

    /// Whether an elapsed turn timer skips the idle player.
    #[serde(default = "default_auto_skip")]
    pub auto_skip: bool,
}

fn default_auto_skip() -> bool {
    true
}

impl TurnSettings {
    /// Time limit to arm on each turn, if turns are timed and auto-skip is on.
    pub fn timeout(&self) -> Option<Duration> {
        self.turn_time_limit.filter(|_| self.auto_skip)
    }
}

impl Default for TurnSettings {
    fn default() -> Self {
        Self {
            max_turns: None,
            turn_time_limit: None,
            auto_skip: default_auto_skip(),
        }
    }
}

mod optional_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        value.map(|d| d.as_secs()).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(d)?.map(Duration::from_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_requires_auto_skip() {
        let settings = TurnSettings::default().turn_time_limit(Duration::from_secs(30));
        assert_eq!(settings.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(settings.auto_skip(false).timeout(), None);
    }

    #[test]
    fn test_parses_seconds_from_toml() {
        let settings: TurnSettings = toml::from_str("turn_time_limit_secs = 45").expect("parse");
        assert_eq!(settings.turn_time_limit, Some(Duration::from_secs(45)));
        assert!(settings.auto_skip);
        assert_eq!(settings.max_turns, None);
    }
}
