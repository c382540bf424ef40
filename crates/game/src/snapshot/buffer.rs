use std::collections::VecDeque;

use crate::error::SyncError;
use crate::net::Snapshot;

/// Bounded timeline of server snapshots in arrival order.
///
/// Arrival order is assumed to match server-time order; it is not checked.
#[derive(Debug)]
pub struct SnapshotBuffer {
    snapshots: VecDeque<Snapshot>,
    capacity: usize,
}

impl SnapshotBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            snapshots: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends to the tail, evicting the oldest snapshot first when full.
    pub fn push(&mut self, snapshot: Snapshot) -> Option<Snapshot> {
        let evicted = if self.snapshots.len() >= self.capacity {
            self.snapshots.pop_front()
        } else {
            None
        };
        if let Some(old) = &evicted {
            log::trace!("Evicted snapshot at server time {}", old.server_time);
        }
        self.snapshots.push_back(snapshot);
        evicted
    }

    pub fn latest(&self) -> Result<&Snapshot, SyncError> {
        self.snapshots.back().ok_or(SyncError::EmptyBuffer)
    }

    pub fn oldest(&self) -> Option<&Snapshot> {
        self.snapshots.front()
    }

    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.snapshots.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.snapshots.iter()
    }

    /// Adjacent `(older, newer)` pairs, oldest first.
    pub fn pairs(&self) -> impl Iterator<Item = (&Snapshot, &Snapshot)> {
        self.snapshots.iter().zip(self.snapshots.iter().skip(1))
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
