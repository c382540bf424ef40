use crate::net::InputCodes;
use crate::player::{InputFrame, Player};

/// Assigns sequence numbers to captured input and keeps each sent frame on the player
/// until reconciliation confirms it.
#[derive(Debug, Default)]
pub struct InputSequencer {
    sequence: u32,
}

impl InputSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the wire line to send, or `None` when nothing is pressed. Empty input does not
    /// consume a sequence number.
    pub fn capture_frame(
        &mut self,
        codes: InputCodes,
        local_time: f64,
        player: &mut Player,
    ) -> Option<String> {
        if codes.is_empty() {
            return None;
        }

        // Zero reads as "no acknowledgement", so the counter wraps from u32::MAX to 1.
        self.sequence = self.sequence.checked_add(1).unwrap_or(1);
        let frame = InputFrame {
            codes,
            capture_time: local_time,
            sequence: self.sequence,
        };
        let line = frame.to_message().encode();
        player.push_input(frame);
        Some(line)
    }

    pub fn last_sequence(&self) -> u32 {
        self.sequence
    }

    pub fn reset(&mut self) {
        self.sequence = 0;
    }
}
