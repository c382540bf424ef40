use std::collections::HashMap;

use crate::error::SyncError;
use crate::net::PlayerId;

use super::state::Player;

#[derive(Debug, Default)]
pub struct PlayerRegistry {
    players: HashMap<PlayerId, Player>,
    local: Option<PlayerId>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the player previously registered under the same id.
    pub fn add(&mut self, player: Player) -> Option<Player> {
        self.players.insert(player.id.clone(), player)
    }

    pub fn remove(&mut self, id: &PlayerId) -> Option<Player> {
        if self.local.as_ref() == Some(id) {
            self.local = None;
        }
        self.players.remove(id)
    }

    pub fn get(&self, id: &PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn get_mut(&mut self, id: &PlayerId) -> Option<&mut Player> {
        self.players.get_mut(id)
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.players.contains_key(id)
    }

    pub fn set_local(&mut self, id: &PlayerId) -> Result<(), SyncError> {
        if !self.players.contains_key(id) {
            return Err(SyncError::UnknownPlayer(id.clone()));
        }
        self.local = Some(id.clone());
        Ok(())
    }

    pub fn local_id(&self) -> Option<&PlayerId> {
        self.local.as_ref()
    }

    pub fn is_local(&self, id: &PlayerId) -> bool {
        self.local.as_ref() == Some(id)
    }

    pub fn local(&self) -> Option<&Player> {
        self.local.as_ref().and_then(|id| self.players.get(id))
    }

    pub fn local_mut(&mut self) -> Option<&mut Player> {
        let id = self.local.as_ref()?;
        self.players.get_mut(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;

    #[test]
    fn local_requires_known_player() {
        let mut registry = PlayerRegistry::new();
        let me = PlayerId::from("me");

        assert!(matches!(
            registry.set_local(&me),
            Err(SyncError::UnknownPlayer(_))
        ));

        registry.add(Player::new(me.clone(), Vec2::ZERO));
        registry.set_local(&me).unwrap();
        assert!(registry.is_local(&me));
        assert_eq!(registry.local().unwrap().id, me);
    }

    #[test]
    fn removing_local_clears_it() {
        let mut registry = PlayerRegistry::new();
        let me = PlayerId::from("me");
        registry.add(Player::new(me.clone(), Vec2::ZERO));
        registry.set_local(&me).unwrap();

        assert!(registry.remove(&me).is_some());
        assert!(registry.local_id().is_none());
        assert!(registry.local_mut().is_none());
    }
}
