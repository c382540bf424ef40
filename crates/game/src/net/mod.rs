mod protocol;
mod simulator;
mod stats;

pub use protocol::{
    ArchivedSnapshot, BulletEvent, CODE_SEPARATOR, FIELD_SEPARATOR, GameEvent, INPUT_TAG,
    InputCodes, InputMessage, OwnPlayerState, PlayerId, PlayerState, Snapshot, SnapshotError,
    WireError,
};
pub use simulator::LinkSimulator;
pub use stats::{LinkConditions, LinkRng, NetStats};
