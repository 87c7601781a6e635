//! Session configuration files.

use crate::engine::TurnSettings;
use crate::error::{ConfigError, RegistryError};
use crate::player::Player;
use crate::registry::PlayerRegistry;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Players and limits for a session, as written in a TOML file.
///
/// ```toml
/// [settings]
/// max_turns = 12
/// turn_time_limit_secs = 30
///
/// [[players]]
/// id = "mom"
/// name = "Mom"
/// is_human = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Getters, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Turn limits.
    #[serde(default)]
    settings: TurnSettings,

    /// Players in turn order.
    #[serde(default)]
    players: Vec<Player>,
}

impl SessionConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        info!(players = config.players.len(), "Config loaded successfully");
        Ok(config)
    }

    /// Loads the players into a registry, rejecting duplicate ids.
    #[instrument(skip(self))]
    pub fn to_registry(&self) -> Result<PlayerRegistry, RegistryError> {
        let mut registry = PlayerRegistry::new();
        registry.load_from(&self.players)?;
        Ok(registry)
    }

    /// Splits the configuration into its parts.
    pub fn into_parts(self) -> (TurnSettings, Vec<Player>) {
        (self.settings, self.players)
    }
}
