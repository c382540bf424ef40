use std::fmt;

use netsync::{SyncMode, SyncStats};

/// End-of-run summary of one session.
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub mode: SyncMode,
    pub frames: u64,
    pub bullets: u64,
    pub events: u64,
    pub sync: SyncStats,
    pub ping: f64,
    pub uplink_dropped: u64,
    pub downlink_dropped: u64,
    pub in_flight: usize,
    pub rejected_inputs: u64,
    pub server_acked: Option<u32>,
    pub server_time: f64,
    error_sum: f64,
    error_max: f32,
    error_samples: u64,
}

impl SessionReport {
    pub fn new(mode: SyncMode) -> Self {
        Self {
            mode,
            frames: 0,
            bullets: 0,
            events: 0,
            sync: SyncStats::default(),
            ping: 0.0,
            uplink_dropped: 0,
            downlink_dropped: 0,
            in_flight: 0,
            rejected_inputs: 0,
            server_acked: None,
            server_time: 0.0,
            error_sum: 0.0,
            error_max: 0.0,
            error_samples: 0,
        }
    }

    /// Distance between the drawn local player and the server's position for it.
    pub fn record_error(&mut self, distance: f32) {
        if !distance.is_finite() {
            return;
        }
        self.error_sum += distance as f64;
        self.error_max = self.error_max.max(distance);
        self.error_samples += 1;
    }

    pub fn mean_error(&self) -> f64 {
        if self.error_samples == 0 {
            return 0.0;
        }
        self.error_sum / self.error_samples as f64
    }

    pub fn max_error(&self) -> f32 {
        self.error_max
    }
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "mode              {:?}", self.mode)?;
        writeln!(f, "server time       {:.2}s", self.server_time)?;
        writeln!(f, "frames drawn      {}", self.frames)?;
        writeln!(
            f,
            "snapshots         {} received, {} rejected, {} buffered",
            self.sync.snapshots_received, self.sync.snapshots_rejected, self.sync.buffered_snapshots
        )?;
        writeln!(
            f,
            "local error       mean {:.2}, max {:.2}",
            self.mean_error(),
            self.max_error()
        )?;
        writeln!(
            f,
            "reconciliation    {} corrections, {} inputs pending",
            self.sync.corrections, self.sync.pending_inputs
        )?;
        writeln!(f, "ping              {:.0}ms", self.ping * 1000.0)?;
        writeln!(
            f,
            "link              {} up / {} down dropped, {} in flight",
            self.uplink_dropped, self.downlink_dropped, self.in_flight
        )?;
        writeln!(
            f,
            "server inputs     last processed {:?}, {} rejected",
            self.server_acked, self.rejected_inputs
        )?;
        write!(f, "replayed          {} bullets, {} events", self.bullets, self.events)
    }
}
