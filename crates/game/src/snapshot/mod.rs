mod buffer;
mod ghost;

pub use buffer::SnapshotBuffer;
pub use ghost::{Ghost, GhostArena, GhostHandle, GhostKind, GhostPair};
