//! Player registry: an id-keyed store of players with score ranking.
//!
//! Players are kept in insertion order. That order is what [`PlayerRegistry::all`]
//! returns and what breaks ties in [`PlayerRegistry::winner_by_score`] (the
//! earliest inserted player wins). Updating a player keeps its position.
//!
//! The registry is not synchronised; callers that mutate it from several
//! threads must serialise access themselves.

use crate::error::RegistryError;
use crate::player::{Player, PlayerUpdate};
use tracing::{debug, info, instrument, warn};

/// Ordered store of players keyed by their unique id.
#[derive(Debug, Clone)]
pub struct PlayerRegistry<T = ()> {
    players: Vec<Player<T>>,
}

impl<T> PlayerRegistry<T> {
    /// Creates an empty registry.
    #[instrument]
    pub fn new() -> Self {
        Self {
            players: Vec::new(),
        }
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }

    /// Adds a player.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateId`] if the id is already present;
    /// the registry is left unchanged.
    #[instrument(skip(self, player), fields(player_id = %player.id))]
    pub fn add(&mut self, player: Player<T>) -> Result<(), RegistryError> {
        if self.has(&player.id) {
            warn!("Player already registered");
            return Err(RegistryError::DuplicateId(player.id));
        }
        info!(name = %player.name, "Registering player");
        self.players.push(player);
        Ok(())
    }

    /// Removes a player, returning whether one was present.
    #[instrument(skip(self))]
    pub fn remove(&mut self, id: &str) -> bool {
        match self.position(id) {
            Some(index) => {
                self.players.remove(index);
                info!("Removed player");
                true
            }
            None => {
                debug!("Player not found");
                false
            }
        }
    }

    /// Looks up a player by id.
    pub fn get(&self, id: &str) -> Option<&Player<T>> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Checks whether a player with this id is registered.
    pub fn has(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Number of registered players.
    pub fn count(&self) -> usize {
        self.players.len()
    }

    /// Removes every player.
    #[instrument(skip(self), fields(count = self.players.len()))]
    pub fn clear(&mut self) {
        debug!("Clearing registry");
        self.players.clear();
    }

    /// Merges `update` into the player with this id; the id itself never changes.
    ///
    /// Returns `false` if no such player exists.
    #[instrument(skip(self, update))]
    pub fn update(&mut self, id: &str, update: PlayerUpdate<T>) -> bool {
        match self.players.iter_mut().find(|p| p.id == id) {
            Some(player) => {
                player.apply(update);
                debug!("Updated player");
                true
            }
            None => {
                debug!("Player not found");
                false
            }
        }
    }

    /// Sets a player's score.
    #[instrument(skip(self))]
    pub fn set_score(&mut self, id: &str, score: i64) -> bool {
        self.update(id, PlayerUpdate::default().score(score))
    }

    /// Adds `delta` to a player's score (a missing score counts as zero).
    #[instrument(skip(self))]
    pub fn increment_score(&mut self, id: &str, delta: i64) -> bool {
        let Some(current) = self.get(id).map(Player::score_or_zero) else {
            debug!("Player not found");
            return false;
        };
        self.set_score(id, current.saturating_add(delta))
    }

    /// Adds one point to a player's score.
    pub fn increment_score_by_one(&mut self, id: &str) -> bool {
        self.increment_score(id, 1)
    }
}

impl<T: Clone> PlayerRegistry<T> {
    /// Snapshot of every player in insertion order.
    pub fn all(&self) -> Vec<Player<T>> {
        self.players.clone()
    }

    /// Alias of [`PlayerRegistry::all`].
    pub fn to_vec(&self) -> Vec<Player<T>> {
        self.all()
    }

    /// Player with the highest score; ties go to the earliest inserted player.
    #[instrument(skip(self))]
    pub fn winner_by_score(&self) -> Option<Player<T>> {
        let mut best: Option<&Player<T>> = None;
        for player in &self.players {
            match best {
                Some(current) if player.score_or_zero() <= current.score_or_zero() => {}
                _ => best = Some(player),
            }
        }
        best.cloned()
    }

    /// Every player ranked by score, highest first. Ties keep insertion order.
    pub fn by_score_descending(&self) -> Vec<Player<T>> {
        let mut ranked = self.players.clone();
        // sort_by is stable
        ranked.sort_by(|a, b| b.score_or_zero().cmp(&a.score_or_zero()));
        ranked
    }

    /// Replaces the contents with `players`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateId`] on the first repeated id. Players
    /// before it remain loaded.
    #[instrument(skip(self, players), fields(count = players.len()))]
    pub fn load_from(&mut self, players: &[Player<T>]) -> Result<(), RegistryError> {
        self.clear();
        for player in players {
            self.add(player.clone())?;
        }
        info!(count = self.players.len(), "Loaded players");
        Ok(())
    }
}

impl<T> Default for PlayerRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
