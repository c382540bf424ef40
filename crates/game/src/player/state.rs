use std::collections::VecDeque;

use glam::Vec2;

use crate::net::{InputCodes, InputMessage, PlayerId};

/// One captured, sequenced set of input codes.
#[derive(Debug, Clone, PartialEq)]
pub struct InputFrame {
    pub codes: InputCodes,
    pub capture_time: f64,
    pub sequence: u32,
}

impl InputFrame {
    pub fn to_message(&self) -> InputMessage {
        InputMessage {
            codes: self.codes,
            local_time: self.capture_time,
            sequence: self.sequence,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub position: Vec2,
    /// Position at the start of the current simulation step, for render blending.
    pub previous_position: Vec2,
    pending_inputs: VecDeque<InputFrame>,
    last_acked_sequence: Option<u32>,
}

impl Player {
    pub fn new(id: PlayerId, position: Vec2) -> Self {
        Self {
            id,
            position,
            previous_position: position,
            pending_inputs: VecDeque::new(),
            last_acked_sequence: None,
        }
    }

    pub fn save_previous(&mut self) {
        self.previous_position = self.position;
    }

    pub fn render_position(&self, alpha: f32) -> Vec2 {
        self.previous_position
            .lerp(self.position, alpha.clamp(0.0, 1.0))
    }

    pub fn push_input(&mut self, frame: InputFrame) {
        self.pending_inputs.push_back(frame);
    }

    pub fn pending_inputs(&self) -> &VecDeque<InputFrame> {
        &self.pending_inputs
    }

    pub fn pending_sequences(&self) -> Vec<u32> {
        self.pending_inputs.iter().map(|f| f.sequence).collect()
    }

    /// Oldest-first position of the pending frame carrying `sequence`.
    pub fn find_pending(&self, sequence: u32) -> Option<usize> {
        self.pending_inputs
            .iter()
            .position(|f| f.sequence == sequence)
    }

    /// Drops the `count` oldest pending frames and records `sequence` as acknowledged.
    pub(crate) fn acknowledge(&mut self, sequence: u32, count: usize) {
        let count = count.min(self.pending_inputs.len());
        self.pending_inputs.drain(..count);
        self.last_acked_sequence = Some(sequence);
    }

    pub fn last_acked_sequence(&self) -> Option<u32> {
        self.last_acked_sequence
    }
}
