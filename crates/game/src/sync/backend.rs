use glam::Vec2;

use crate::net::{BulletEvent, GameEvent, PlayerId};
use crate::snapshot::GhostKind;

use super::replay::Spawn;

/// Outbound half of the transport: takes finished wire lines.
pub trait NetworkSender {
    fn send(&mut self, message: String);
}

impl<F: FnMut(String)> NetworkSender for F {
    fn send(&mut self, message: String) {
        self(message)
    }
}

/// Final positions for one drawn frame.
#[derive(Debug, Clone, Default)]
pub struct RenderFrame {
    pub time: f64,
    pub players: Vec<(PlayerId, Vec2)>,
    pub ghosts: Vec<(PlayerId, GhostKind, Vec2)>,
}

impl RenderFrame {
    pub fn player(&self, id: &PlayerId) -> Option<Vec2> {
        self.players
            .iter()
            .find(|(player, _)| player == id)
            .map(|(_, position)| *position)
    }
}

pub trait Renderer {
    fn spawn_bullet(&mut self, _bullet: &BulletEvent, _origin: Vec2) {}

    fn spawn_event(&mut self, _event: &GameEvent, _origin: Vec2) {}

    fn draw_frame(&mut self, frame: &RenderFrame);
}

pub(crate) fn dispatch_spawns(renderer: &mut dyn Renderer, spawns: &[Spawn]) {
    for spawn in spawns {
        match spawn {
            Spawn::Bullet { bullet, origin } => renderer.spawn_bullet(bullet, *origin),
            Spawn::Event { event, origin } => renderer.spawn_event(event, *origin),
        }
    }
}
