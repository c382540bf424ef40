const MAX_FRAME_DELTA: f64 = 0.25;

/// Turns variable frame deltas into fixed simulation steps.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    dt: f64,
    accumulator: f64,
}

impl FixedTimestep {
    pub fn new(dt: f64) -> Self {
        Self {
            dt: if dt > 0.0 { dt } else { 1.0 / 60.0 },
            accumulator: 0.0,
        }
    }

    pub fn from_rate(tick_rate: u32) -> Self {
        Self::new(1.0 / tick_rate.max(1) as f64)
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn accumulate(&mut self, delta: f64) {
        self.accumulator += delta.clamp(0.0, MAX_FRAME_DELTA);
    }

    pub fn should_tick(&self) -> bool {
        self.accumulator >= self.dt
    }

    pub fn consume_tick(&mut self) -> bool {
        if self.accumulator >= self.dt {
            self.accumulator -= self.dt;
            true
        } else {
            false
        }
    }

    /// Fraction of the next step already accumulated, clamped to `[0, 1]`.
    pub fn alpha(&self) -> f32 {
        (self.accumulator / self.dt).clamp(0.0, 1.0) as f32
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
