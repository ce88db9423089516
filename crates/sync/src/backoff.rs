// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Retry with exponential backoff.
//!
//! An operation is attempted up to `max_attempts` times. After the failure of
//! attempt `i` (zero-based) the executor waits `base_delay * 2^i` before the
//! next attempt. Errors classified as non-retryable propagate immediately
//! without consuming the remaining budget.
//!
//! No jitter is applied, so clients failing together retry together.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Retry budget and delay schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,
    /// Delay after the first failure.
    pub base_delay: Duration,
    /// Optional ceiling for a single delay.
    pub max_delay: Option<Duration>,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        BackoffPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: None,
        }
    }
}

impl BackoffPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        BackoffPolicy {
            max_attempts,
            base_delay,
            max_delay: None,
        }
    }

    /// A policy that makes exactly one attempt.
    pub fn no_retry() -> Self {
        BackoffPolicy::new(1, Duration::ZERO)
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = Some(max_delay);
        self
    }

    /// Delay to wait after the failure of the given zero-based attempt.
    pub fn delay_for(&self, attempt_index: u32) -> Duration {
        let delay = 2u32
            .checked_pow(attempt_index)
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .unwrap_or(Duration::MAX);
        match self.max_delay {
            Some(max) => delay.min(max),
            None => delay,
        }
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Errors that know whether another attempt could succeed.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// Run `op` under `policy`, classifying errors with [`Retryable`].
///
/// `op` receives the zero-based attempt index.
pub async fn retry<T, E, F, Fut>(policy: &BackoffPolicy, op: F) -> Result<T, E>
where
    E: Retryable + Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    retry_if(policy, op, |e: &E| e.is_retryable()).await
}

/// Run `op` under `policy`, classifying errors with `is_retryable`.
///
/// Returns the first success, the first non-retryable error, or the error of
/// the last attempt once the budget is exhausted.
pub async fn retry_if<T, E, F, Fut, P>(
    policy: &BackoffPolicy,
    mut op: F,
    is_retryable: P,
) -> Result<T, E>
where
    E: Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
{
    let attempts = policy.attempts();
    let mut attempt = 0;

    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if !is_retryable(&e) => {
                tracing::debug!(attempt, "non-retryable error: {}", e);
                return Err(e);
            }
            Err(e) if attempt + 1 >= attempts => {
                tracing::debug!(attempt, "retry budget exhausted: {}", e);
                return Err(e);
            }
            Err(e) => {
                let delay = policy.delay_for(attempt);
                tracing::debug!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "attempt failed, retrying: {}",
                    e
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;
