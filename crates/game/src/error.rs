use crate::net::{PlayerId, SnapshotError};

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("snapshot buffer is empty")]
    EmptyBuffer,
    #[error("no local player has been set")]
    NoLocalPlayer,
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(#[from] SnapshotError),
}
