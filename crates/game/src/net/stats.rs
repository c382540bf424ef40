/// Conditions applied by [`super::LinkSimulator`] to every payload it carries.
#[derive(Debug, Clone, Default)]
pub struct LinkConditions {
    pub loss_percent: f32,
    pub min_latency_ms: u32,
    pub max_latency_ms: u32,
    pub jitter_ms: u32,
}

impl LinkConditions {
    pub fn perfect() -> Self {
        Self::default()
    }

    pub fn should_drop(&self, rng: &mut LinkRng) -> bool {
        if self.loss_percent <= 0.0 {
            return false;
        }
        rng.next_percent() < self.loss_percent
    }

    pub fn delay_ms(&self, rng: &mut LinkRng) -> u32 {
        if self.min_latency_ms == 0 && self.max_latency_ms == 0 && self.jitter_ms == 0 {
            return 0;
        }
        let base = self.min_latency_ms;
        let range = self.max_latency_ms.saturating_sub(self.min_latency_ms);
        let jitter = if self.jitter_ms > 0 {
            (rng.next_unit() * self.jitter_ms as f32) as u32
        } else {
            0
        };
        base + (rng.next_unit() * range as f32) as u32 + jitter
    }
}

/// Seeded xorshift64 so simulated runs are reproducible.
#[derive(Debug, Clone)]
pub struct LinkRng {
    state: u64,
}

impl LinkRng {
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed.max(1),
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform in `[0, 1)`.
    pub fn next_unit(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    pub fn next_percent(&mut self) -> f32 {
        self.next_unit() * 100.0
    }
}

const PING_SMOOTHING: f64 = 0.1;

/// Round-trip measurements reported by the transport, in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NetStats {
    pub ping: f64,
    pub latency: f64,
    pub samples: u32,
}

impl NetStats {
    pub fn record_ping(&mut self, rtt: f64) {
        if !rtt.is_finite() || rtt < 0.0 {
            return;
        }
        if self.samples == 0 {
            self.ping = rtt;
        } else {
            self.ping += (rtt - self.ping) * PING_SMOOTHING;
        }
        self.latency = self.ping / 2.0;
        self.samples = self.samples.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rng_is_reproducible() {
        let mut a = LinkRng::new(7);
        let mut b = LinkRng::new(7);
        for _ in 0..16 {
            assert_eq!(a.next_u64(), b.next_u64());
        }

        let mut rng = LinkRng::new(99);
        for _ in 0..1000 {
            let unit = rng.next_unit();
            assert!((0.0..1.0).contains(&unit));
        }
    }

    #[test]
    fn delay_within_bounds() {
        let conditions = LinkConditions {
            loss_percent: 0.0,
            min_latency_ms: 40,
            max_latency_ms: 60,
            jitter_ms: 10,
        };
        let mut rng = LinkRng::new(3);
        for _ in 0..500 {
            let delay = conditions.delay_ms(&mut rng);
            assert!((40..=70).contains(&delay));
        }
        assert_eq!(LinkConditions::perfect().delay_ms(&mut rng), 0);
    }

    #[test]
    fn ping_smoothing() {
        let mut stats = NetStats::default();
        stats.record_ping(0.1);
        assert!((stats.ping - 0.1).abs() < 1e-9);
        assert!((stats.latency - 0.05).abs() < 1e-9);

        stats.record_ping(0.2);
        assert!((stats.ping - 0.11).abs() < 1e-9);

        stats.record_ping(f64::NAN);
        assert_eq!(stats.samples, 2);
    }
}
