//! Bounded retry with exponential backoff and jitter.

use crate::error::{CompletionError, CompletionResult};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry policy applied around blocking capability calls.
///
/// Only transient failures (rate-limit, timeout, and transient-looking
/// API errors) are retried; everything else fails immediately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempt cap, including the first call.
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    /// Jitter fraction in `[0, 1]`; each delay is scaled by a random
    /// factor in `[1 - jitter, 1 + jitter]`.
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 200,
            max_delay_ms: 5_000,
            jitter: 0.25,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Backoff delay before retrying after `attempt` failures.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = self
            .base_delay_ms
            .saturating_mul(1u64 << (attempt.saturating_sub(1)).min(20))
            .min(self.max_delay_ms);
        let jitter = self.jitter.clamp(0.0, 1.0);
        let factor = if jitter > 0.0 {
            rand::thread_rng().gen_range(1.0 - jitter..=1.0 + jitter)
        } else {
            1.0
        };
        Duration::from_millis((exp as f64 * factor) as u64)
    }

    /// Run `op`, retrying transient failures up to the attempt cap.
    pub fn run<T>(
        &self,
        mut op: impl FnMut() -> CompletionResult<T>,
    ) -> CompletionResult<T> {
        let attempts = self.max_attempts.max(1);
        let mut last_err: Option<CompletionError> = None;
        for attempt in 1..=attempts {
            match op() {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < attempts => {
                    let delay = self.delay_for(attempt);
                    tracing::warn!(
                        attempt,
                        max_attempts = attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient completion failure, retrying"
                    );
                    std::thread::sleep(delay);
                    last_err = Some(err);
                }
                Err(err) => return Err(err),
            }
        }
        // Unreachable: the loop always returns on the final attempt.
        Err(last_err.unwrap_or_else(|| CompletionError::Api("retry loop exhausted".into())))
    }
}
