//! Fibonacci requeue backoff.
//!
//! The engine itself never retries beyond the single inline conflict cycle;
//! spacing out repeated failures is the requeue policy's job. Fibonacci
//! growth ramps more gently than exponential backoff, which suits reconcile
//! loops where most failures clear within a few attempts.
//! Sequence with a 5s base and 300s cap: 5, 5, 10, 15, 25, 40, 65, ... 300.

use std::time::Duration;

/// Fibonacci backoff over seconds, capped at a maximum.
#[derive(Debug, Clone)]
pub struct RequeueBackoff {
    base_secs: u64,
    prev_secs: u64,
    current_secs: u64,
    max_secs: u64,
}

impl RequeueBackoff {
    /// Create a backoff starting at `base_secs` and capped at `max_secs`
    #[must_use]
    pub fn new(base_secs: u64, max_secs: u64) -> Self {
        Self {
            base_secs,
            prev_secs: 0,
            current_secs: base_secs,
            max_secs,
        }
    }

    /// The next delay, advancing the sequence
    pub fn next_delay(&mut self) -> Duration {
        let result = Duration::from_secs(self.current_secs);
        let next = self.prev_secs + self.current_secs;
        self.prev_secs = self.current_secs;
        self.current_secs = next.min(self.max_secs);
        result
    }

    /// Restart the sequence from the base, after a success
    pub fn reset(&mut self) {
        self.prev_secs = 0;
        self.current_secs = self.base_secs;
    }
}
