//! # Fibonacci Backoff
//!
//! Progressive retry delays: min, min, 2·min, 3·min, 5·min, ... capped at max.

/// Fibonacci backoff measured in seconds
#[derive(Debug, Clone)]
pub struct FibonacciBackoff {
    max_secs: u64,
    prev: u64,
    current: u64,
}

impl FibonacciBackoff {
    pub fn new(min_secs: u64, max_secs: u64) -> Self {
        Self {
            max_secs,
            prev: 0,
            current: min_secs,
        }
    }

    /// Delay before the next retry, advancing the sequence
    pub fn next_backoff_seconds(&mut self) -> u64 {
        let delay = self.current.min(self.max_secs);
        let next = self.prev.saturating_add(self.current);
        self.prev = self.current;
        self.current = next;
        delay
    }
}
