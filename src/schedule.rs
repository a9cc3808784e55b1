use std::time::{Duration, Instant};

/// Fixed-period trigger polled from a single-threaded loop.
///
/// `poll` fires at most once per call, so the work it gates never overlaps
/// with itself. Dropping the ticker is all it takes to stop it.
#[derive(Clone, Copy, Debug)]
pub struct Ticker {
    period: Duration,
    last: Instant,
}

impl Ticker {
    pub fn new(period: Duration, now: Instant) -> Self {
        Ticker { period, last: now }
    }

    pub fn poll(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last) >= self.period {
            self.last = now;
            true
        } else {
            false
        }
    }

    /// Time left until the next tick is due.
    pub fn remaining(&self, now: Instant) -> Duration {
        (self.last + self.period).saturating_duration_since(now)
    }
}
