//! Adaptive rate governor: rolling per-minute token budget.
//!
//! Owns a sliding 60-second window of (timestamp, estimated token cost)
//! pairs, instantiated per orchestrator run -- no global state. Before a
//! call, if the running window sum plus the new estimate would cross 90%
//! of the model's per-minute capacity, the caller sleeps until the oldest
//! window entry ages out (plus a small buffer) instead of a fixed
//! duration. Under threshold, only a small floor delay separates
//! consecutive calls.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Length of the sliding window.
const WINDOW: Duration = Duration::from_secs(60);

/// Fraction of the per-minute capacity the governor will fill.
const CAPACITY_FRACTION: f64 = 0.9;

/// Approximate token cost of a prompt or response from its length.
pub fn estimate_tokens(chars: usize) -> u64 {
    (chars as u64).div_ceil(4)
}

/// Sliding-window token budget for one summarization run.
#[derive(Debug)]
pub struct RateGovernor {
    window: VecDeque<(Instant, u64)>,
    tokens_per_minute: u64,
    /// Minimum spacing between consecutive calls when under threshold.
    floor_delay: Duration,
    /// Margin added when waiting for the oldest entry to age out.
    buffer: Duration,
}

impl RateGovernor {
    pub fn new(tokens_per_minute: u64) -> Self {
        Self {
            window: VecDeque::new(),
            tokens_per_minute,
            floor_delay: Duration::from_millis(500),
            buffer: Duration::from_millis(250),
        }
    }

    /// Switch the active capacity when the selector picks a different model.
    pub fn set_capacity(&mut self, tokens_per_minute: u64) {
        self.tokens_per_minute = tokens_per_minute;
    }

    /// How long to wait before issuing a request of `estimated` tokens at
    /// time `now`. Zero for the first request of a run.
    pub fn required_delay(&mut self, now: Instant, estimated: u64) -> Duration {
        self.evict(now);

        if self.window.is_empty() {
            return Duration::ZERO;
        }

        let in_window: u64 = self.window.iter().map(|(_, cost)| cost).sum();
        let threshold = (self.tokens_per_minute as f64 * CAPACITY_FRACTION) as u64;

        if in_window + estimated > threshold {
            // Wait for the oldest entry to leave the window rather than
            // sleeping a fixed duration; never negative.
            let (oldest, _) = self.window[0];
            let age_out = (oldest + WINDOW).saturating_duration_since(now);
            let delay = age_out + self.buffer;
            tracing::debug!(
                in_window,
                estimated,
                threshold,
                ?delay,
                "token window near capacity, waiting for oldest entry to age out"
            );
            delay
        } else {
            self.floor_delay
        }
    }

    /// Record a completed request's cost at time `now`.
    pub fn record(&mut self, now: Instant, cost: u64) {
        self.window.push_back((now, cost));
        self.evict(now);
    }

    fn evict(&mut self, now: Instant) {
        while let Some(&(at, _)) = self.window.front() {
            if now.duration_since(at) >= WINDOW {
                self.window.pop_front();
            } else {
                break;
            }
        }
    }
}
