use serde::{Deserialize, Serialize};

use crate::player::DEFAULT_MOVE_SPEED;

use super::mode::SyncMode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncConfig {
    /// Rendering delay behind server time, in milliseconds.
    pub network_offset_ms: f64,
    /// Seconds of snapshots kept for interpolation.
    pub network_buffer_size: f64,
    pub simulation_timestep: f64,
    /// Server snapshot rate the buffer capacity is sized for.
    pub assumed_frame_rate: u32,
    pub naive_approach: bool,
    pub client_prediction: bool,
    pub client_smoothing: bool,
    pub move_speed: f32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            network_offset_ms: 100.0,
            network_buffer_size: 2.0,
            simulation_timestep: 1.0 / 60.0,
            assumed_frame_rate: 60,
            naive_approach: false,
            client_prediction: true,
            client_smoothing: true,
            move_speed: DEFAULT_MOVE_SPEED,
        }
    }
}

impl SyncConfig {
    pub fn network_offset(&self) -> f64 {
        self.network_offset_ms / 1000.0
    }

    pub fn buffer_capacity(&self) -> usize {
        let capacity = (self.assumed_frame_rate as f64 * self.network_buffer_size).ceil();
        if capacity.is_finite() && capacity >= 1.0 {
            capacity as usize
        } else {
            1
        }
    }

    pub fn mode(&self) -> SyncMode {
        SyncMode::select(self.naive_approach, self.client_prediction)
    }
}
