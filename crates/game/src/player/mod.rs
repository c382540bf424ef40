mod controller;
mod registry;
mod state;

pub use controller::{DEFAULT_MOVE_SPEED, LinearMovement, Movement};
pub use registry::PlayerRegistry;
pub use state::{InputFrame, Player};
