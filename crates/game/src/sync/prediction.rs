use crate::net::{InputCodes, Snapshot};
use crate::player::{Movement, Player};
use crate::snapshot::{GhostArena, SnapshotBuffer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// The server has not processed any of our input yet.
    NoAck,
    /// The acknowledged sequence is not pending; the prediction is left alone.
    Unmatched { acked: u32 },
    /// Confirmed frames were discarded and the player snapped to the server position.
    Corrected { acked: u32, discarded: usize },
}

/// Reconciles the local player against one snapshot.
///
/// The acknowledged frame and everything older is discarded: the server has already applied
/// them, so their effect is contained in the reported position. Frames after it stay pending
/// and keep being applied by the ordinary simulation step. The server ghost always moves to
/// the reported position.
pub fn reconcile(player: &mut Player, ghosts: &mut GhostArena, snapshot: &Snapshot) -> Reconciliation {
    let server_position = snapshot.own_position();
    ghosts.set_server(&player.id, server_position);

    let Some(acked) = snapshot.acknowledged_sequence() else {
        return Reconciliation::NoAck;
    };
    let Some(index) = player.find_pending(acked) else {
        return Reconciliation::Unmatched { acked };
    };

    let discarded = index + 1;
    player.acknowledge(acked, discarded);
    player.position = server_position;
    // No blending across a correction.
    player.save_previous();

    Reconciliation::Corrected { acked, discarded }
}

pub struct ClientPrediction {
    movement: Box<dyn Movement>,
    unreconciled: bool,
    last_outcome: Option<Reconciliation>,
    corrections: u64,
}

impl ClientPrediction {
    pub fn new(movement: Box<dyn Movement>) -> Self {
        Self {
            movement,
            unreconciled: false,
            last_outcome: None,
            corrections: 0,
        }
    }

    pub fn apply_input(&self, player: &mut Player, codes: InputCodes, dt: f64) {
        player.save_previous();
        player.position = self.movement.step(player.position, codes, dt);
    }

    /// Flags that a new snapshot arrived and must be reconciled on the next frame.
    pub fn mark_snapshot(&mut self) {
        self.unreconciled = true;
    }

    pub fn has_unreconciled(&self) -> bool {
        self.unreconciled
    }

    /// Reconciles against the newest buffered snapshot, once per arrival.
    pub fn reconcile_latest(
        &mut self,
        player: &mut Player,
        ghosts: &mut GhostArena,
        buffer: &SnapshotBuffer,
    ) -> Option<Reconciliation> {
        if !self.unreconciled {
            return None;
        }
        let Ok(latest) = buffer.latest() else {
            return None;
        };
        self.unreconciled = false;

        let outcome = reconcile(player, ghosts, latest);
        match outcome {
            Reconciliation::Corrected { acked, discarded } => {
                self.corrections += 1;
                log::debug!(
                    "Reconciled to input {}: discarded {}, {} still pending",
                    acked,
                    discarded,
                    player.pending_inputs().len()
                );
            }
            Reconciliation::Unmatched { acked } => {
                log::debug!("Acknowledged input {} is not pending", acked);
            }
            Reconciliation::NoAck => {
                log::trace!("Snapshot carries no input acknowledgement");
            }
        }
        self.last_outcome = Some(outcome);
        Some(outcome)
    }

    pub fn last_outcome(&self) -> Option<Reconciliation> {
        self.last_outcome
    }

    pub fn corrections(&self) -> u64 {
        self.corrections
    }

    pub fn reset(&mut self) {
        self.unreconciled = false;
        self.last_outcome = None;
        self.corrections = 0;
    }
}
