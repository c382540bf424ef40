use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::stats::{LinkConditions, LinkRng};

#[derive(Debug)]
struct DelayedPayload<T> {
    release_time: f64,
    order: u64,
    payload: T,
}

impl<T> PartialEq for DelayedPayload<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for DelayedPayload<T> {}

impl<T> PartialOrd for DelayedPayload<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for DelayedPayload<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap
        other
            .release_time
            .total_cmp(&self.release_time)
            .then_with(|| other.order.cmp(&self.order))
    }
}

/// One direction of a lossy link on a simulated clock (seconds). Jitter lets payloads
/// overtake each other.
#[derive(Debug)]
pub struct LinkSimulator<T> {
    conditions: LinkConditions,
    rng: LinkRng,
    queue: BinaryHeap<DelayedPayload<T>>,
    next_order: u64,
    dropped: u64,
    delivered: u64,
}

impl<T> LinkSimulator<T> {
    pub fn new(conditions: LinkConditions, seed: u64) -> Self {
        Self {
            conditions,
            rng: LinkRng::new(seed),
            queue: BinaryHeap::new(),
            next_order: 0,
            dropped: 0,
            delivered: 0,
        }
    }

    pub fn conditions(&self) -> &LinkConditions {
        &self.conditions
    }

    /// Returns false when the payload was lost.
    pub fn send(&mut self, now: f64, payload: T) -> bool {
        if self.conditions.should_drop(&mut self.rng) {
            self.dropped += 1;
            return false;
        }

        let delay = self.conditions.delay_ms(&mut self.rng) as f64 / 1000.0;
        self.queue.push(DelayedPayload {
            release_time: now + delay,
            order: self.next_order,
            payload,
        });
        self.next_order += 1;
        true
    }

    pub fn take_ready(&mut self, now: f64) -> Vec<T> {
        let mut ready = Vec::new();
        while self.queue.peek().is_some_and(|d| d.release_time <= now) {
            if let Some(delayed) = self.queue.pop() {
                ready.push(delayed.payload);
            }
        }
        self.delivered += ready.len() as u64;
        ready
    }

    pub fn in_flight(&self) -> usize {
        self.queue.len()
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn delivered(&self) -> u64 {
        self.delivered
    }
}
