//! Randomized pacing delays
//!
//! Workers decorrelate their start times (stagger) and space out successive
//! iterations (downtime) with uniform-random delays drawn from configured
//! `[min, max]` second windows. Each controller owns its RNG, so draws never
//! contend across workers.

use crate::config::DelayWindow;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::time::Duration;

/// Per-worker source of pacing delays.
pub struct PacingController {
    rng: Xoshiro256PlusPlus,
}

impl PacingController {
    pub fn new() -> Self {
        Self {
            rng: Xoshiro256PlusPlus::from_entropy(),
        }
    }

    /// Deterministic controller for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }

    /// Draw a delay uniformly from `[window.min, window.max)` at millisecond
    /// granularity. A degenerate window (`min == max`) yields exactly `min`.
    ///
    /// Window bounds are validated at startup (`0 <= min <= max`); this only
    /// debug-asserts them.
    pub fn delay(&mut self, window: DelayWindow) -> Duration {
        debug_assert!(window.min_secs <= window.max_secs);

        let min_ms = window.min_secs * 1000;
        let max_ms = window.max_secs * 1000;
        let millis = if min_ms == max_ms {
            min_ms
        } else {
            self.rng.gen_range(min_ms..max_ms)
        };
        Duration::from_millis(millis)
    }
}

impl Default for PacingController {
    fn default() -> Self {
        Self::new()
    }
}
