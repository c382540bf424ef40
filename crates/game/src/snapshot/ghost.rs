use std::collections::HashMap;

use glam::Vec2;

use crate::net::PlayerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GhostHandle(pub u32);

impl GhostHandle {
    pub fn id(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GhostKind {
    /// Freshest authoritative position.
    Server,
    /// Interpolated target before smoothing.
    Local,
}

/// Position-only marker. Never part of gameplay state.
#[derive(Debug, Clone)]
pub struct Ghost {
    pub id: u32,
    pub kind: GhostKind,
    pub owner: PlayerId,
    pub position: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GhostPair {
    pub server: GhostHandle,
    pub local: GhostHandle,
}

/// Ghosts keyed by a stable integer id, with a side table from player to ghost pair.
/// Ids are never reused, so removing one player leaves every other handle valid.
#[derive(Debug)]
pub struct GhostArena {
    ghosts: HashMap<u32, Ghost>,
    by_player: HashMap<PlayerId, GhostPair>,
    next_ghost_id: u32,
}

impl Default for GhostArena {
    fn default() -> Self {
        Self::new()
    }
}

impl GhostArena {
    pub fn new() -> Self {
        Self {
            ghosts: HashMap::new(),
            by_player: HashMap::new(),
            next_ghost_id: 1,
        }
    }

    /// Spawns both ghosts for `player`. An existing pair is moved to `position` instead.
    pub fn spawn_pair(&mut self, player: &PlayerId, position: Vec2) -> GhostPair {
        if let Some(pair) = self.by_player.get(player).copied() {
            self.set_position(pair.server, position);
            self.set_position(pair.local, position);
            return pair;
        }

        let pair = GhostPair {
            server: self.spawn(player, GhostKind::Server, position),
            local: self.spawn(player, GhostKind::Local, position),
        };
        self.by_player.insert(player.clone(), pair);
        pair
    }

    pub fn despawn_pair(&mut self, player: &PlayerId) -> bool {
        let Some(pair) = self.by_player.remove(player) else {
            return false;
        };
        self.ghosts.remove(&pair.server.0);
        self.ghosts.remove(&pair.local.0);
        true
    }

    pub fn pair(&self, player: &PlayerId) -> Option<GhostPair> {
        self.by_player.get(player).copied()
    }

    pub fn get(&self, handle: GhostHandle) -> Option<&Ghost> {
        self.ghosts.get(&handle.0)
    }

    pub fn get_mut(&mut self, handle: GhostHandle) -> Option<&mut Ghost> {
        self.ghosts.get_mut(&handle.0)
    }

    pub fn set_server(&mut self, player: &PlayerId, position: Vec2) -> bool {
        match self.pair(player) {
            Some(pair) => self.set_position(pair.server, position),
            None => false,
        }
    }

    pub fn set_local(&mut self, player: &PlayerId, position: Vec2) -> bool {
        match self.pair(player) {
            Some(pair) => self.set_position(pair.local, position),
            None => false,
        }
    }

    pub fn server_position(&self, player: &PlayerId) -> Option<Vec2> {
        self.pair(player)
            .and_then(|pair| self.get(pair.server))
            .map(|ghost| ghost.position)
    }

    pub fn local_position(&self, player: &PlayerId) -> Option<Vec2> {
        self.pair(player)
            .and_then(|pair| self.get(pair.local))
            .map(|ghost| ghost.position)
    }

    pub fn ghosts(&self) -> impl Iterator<Item = &Ghost> {
        self.ghosts.values()
    }

    pub fn len(&self) -> usize {
        self.ghosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ghosts.is_empty()
    }

    fn spawn(&mut self, owner: &PlayerId, kind: GhostKind, position: Vec2) -> GhostHandle {
        let id = self.next_ghost_id;
        self.next_ghost_id += 1;
        self.ghosts.insert(
            id,
            Ghost {
                id,
                kind,
                owner: owner.clone(),
                position,
            },
        );
        GhostHandle(id)
    }

    fn set_position(&mut self, handle: GhostHandle, position: Vec2) -> bool {
        match self.ghosts.get_mut(&handle.0) {
            Some(ghost) => {
                ghost.position = position;
                true
            }
            None => false,
        }
    }
}
