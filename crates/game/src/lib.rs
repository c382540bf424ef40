pub mod error;
pub mod net;
pub mod player;
pub mod simulation;
pub mod snapshot;
pub mod sync;

pub use error::SyncError;
pub use net::{
    BulletEvent, GameEvent, InputCodes, InputMessage, LinkConditions, LinkSimulator, NetStats,
    OwnPlayerState, PlayerId, PlayerState, Snapshot, SnapshotError, WireError,
};
pub use player::{InputFrame, LinearMovement, Movement, Player, PlayerRegistry};
pub use simulation::{Clock, FixedTimestep};
pub use snapshot::{Ghost, GhostArena, GhostHandle, GhostKind, GhostPair, SnapshotBuffer};
pub use sync::{
    HookContext, HookFn, HookToken, NetworkSender, Reconciliation, RenderFrame, Renderer,
    Spawn, SyncClient, SyncConfig, SyncMode, SyncStats,
};
