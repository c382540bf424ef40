use glam::Vec2;

use crate::net::{BulletEvent, GameEvent, Snapshot};
use crate::player::PlayerRegistry;

/// A server-reported bullet or event to be spawned locally.
#[derive(Debug, Clone, PartialEq)]
pub enum Spawn {
    Bullet { bullet: BulletEvent, origin: Vec2 },
    Event { event: GameEvent, origin: Vec2 },
}

impl Spawn {
    pub fn origin(&self) -> Vec2 {
        match self {
            Self::Bullet { origin, .. } | Self::Event { origin, .. } => *origin,
        }
    }
}

/// Bullets and events of `snapshot`, originating at the firing player's current position
/// rather than where it stood when it fired. Firers that are not tracked are skipped.
pub fn collect_spawns(snapshot: &Snapshot, players: &PlayerRegistry) -> Vec<Spawn> {
    let mut spawns = Vec::with_capacity(snapshot.bullets.len() + snapshot.events.len());

    for bullet in &snapshot.bullets {
        match players.get(&bullet.fired_by) {
            Some(firer) => spawns.push(Spawn::Bullet {
                bullet: bullet.clone(),
                origin: firer.position,
            }),
            None => log::trace!("Skipping bullet {} from unknown {}", bullet.id, bullet.fired_by),
        }
    }

    for event in &snapshot.events {
        match players.get(&event.fired_by) {
            Some(firer) => spawns.push(Spawn::Event {
                event: event.clone(),
                origin: firer.position,
            }),
            None => log::trace!("Skipping event {} from unknown {}", event.name, event.fired_by),
        }
    }

    spawns
}
