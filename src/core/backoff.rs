// src/core/backoff.rs
//
// One retry policy for every remote call (discovery, content, pageviews).

use std::thread;
use std::time::Duration;

use rand::Rng;

use crate::config::consts::{BACKOFF_BASE_MS, BACKOFF_MAX_MS, JITTER_PERCENT, MAX_ATTEMPTS};
use crate::error::FetchError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total tries, first call included.
    pub max_attempts: u32,
    pub base_ms: u64,
    pub max_ms: u64,
    pub jitter_percent: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(MAX_ATTEMPTS, BACKOFF_BASE_MS, BACKOFF_MAX_MS).with_jitter(JITTER_PERCENT)
    }
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, base_ms: u64, max_ms: u64) -> Self {
        Self { max_attempts, base_ms, max_ms, jitter_percent: 0 }
    }

    /// No waiting between attempts.
    pub const fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, 0, 0)
    }

    pub fn with_jitter(mut self, jitter_percent: u64) -> Self {
        self.jitter_percent = jitter_percent;
        self
    }

    /// Wait before retry number `attempt + 1` (attempt is 0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponential = self.base_ms.saturating_mul(2u64.saturating_pow(attempt.min(20)));
        let capped = exponential.min(self.max_ms);
        let jitter = if self.jitter_percent > 0 && capped > 0 {
            let span = capped.saturating_mul(self.jitter_percent) / 100;
            rand::thread_rng().gen_range(0..=span)
        } else {
            0
        };
        Duration::from_millis(capped + jitter)
    }

    /// Run `op` until it succeeds, fails permanently, or attempts run out.
    /// `op` receives the 0-based attempt number.
    pub fn run<T, F>(&self, what: &str, mut op: F) -> Result<T, FetchError>
    where
        F: FnMut(u32) -> Result<T, FetchError>,
    {
        let max = self.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            match op(attempt) {
                Ok(v) => return Ok(v),
                Err(e) if e.is_transient() && attempt + 1 < max => {
                    let wait = self.delay(attempt);
                    log::debug!("{what}: {e}; retry {}/{} in {:?}", attempt + 1, max - 1, wait);
                    if !wait.is_zero() {
                        thread::sleep(wait);
                    }
                    attempt += 1;
                }
                Err(e) => {
                    if e.is_transient() {
                        log::warn!("{what}: giving up after {max} attempts: {e}");
                    }
                    return Err(e);
                }
            }
        }
    }
}
