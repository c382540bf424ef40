use glam::Vec2;

use crate::net::InputCodes;

pub const DEFAULT_MOVE_SPEED: f32 = 120.0;

/// Advances a position by one simulation step of input. Used for local prediction; the
/// server runs its own copy.
pub trait Movement {
    fn step(&self, position: Vec2, codes: InputCodes, dt: f64) -> Vec2;
}

/// Constant speed along the pressed directions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearMovement {
    pub speed: f32,
}

impl Default for LinearMovement {
    fn default() -> Self {
        Self {
            speed: DEFAULT_MOVE_SPEED,
        }
    }
}

impl Movement for LinearMovement {
    fn step(&self, position: Vec2, codes: InputCodes, dt: f64) -> Vec2 {
        position + codes.direction() * self.speed * dt as f32
    }
}
