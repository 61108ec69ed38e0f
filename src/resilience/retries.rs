//! Retry logic.
//!
//! # Responsibilities
//! - Hold the retry policy (attempt budget, backoff bounds)
//! - Re-run a failing operation with capped exponential backoff
//! - Report exhaustion with the last underlying error
//!
//! # Design Decisions
//! - The executor owns no shared state; concurrent callers never contend
//! - The final failure returns immediately, no trailing sleep
//! - Errors the caller marks non-retryable end the loop early

use std::fmt;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use crate::config::RetryConfig;
use crate::endpoints::ConfigurationError;
use crate::resilience::backoff::{apply_jitter, calculate_backoff};

/// Attempt budget and backoff bounds. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay_ms: u64,
    max_delay_ms: u64,
    jitter: bool,
}

impl RetryPolicy {
    pub fn new(
        max_attempts: u32,
        base_delay_ms: u64,
        max_delay_ms: u64,
    ) -> Result<Self, ConfigurationError> {
        if max_attempts == 0 {
            return Err(ConfigurationError::InvalidRetryPolicy(
                "max_attempts must be at least 1".into(),
            ));
        }
        if base_delay_ms == 0 {
            return Err(ConfigurationError::InvalidRetryPolicy(
                "base_delay_ms must be greater than 0".into(),
            ));
        }
        if max_delay_ms < base_delay_ms {
            return Err(ConfigurationError::InvalidRetryPolicy(format!(
                "max_delay_ms ({}) must be >= base_delay_ms ({})",
                max_delay_ms, base_delay_ms
            )));
        }

        Ok(Self {
            max_attempts,
            base_delay_ms,
            max_delay_ms,
            jitter: false,
        })
    }

    pub fn from_config(config: &RetryConfig) -> Result<Self, ConfigurationError> {
        Ok(Self::new(config.max_attempts, config.base_delay_ms, config.max_delay_ms)?
            .with_jitter(config.jitter))
    }

    /// Enable or disable 0 to 10% jitter on every delay.
    ///
    /// Jitter is added after the `max_delay_ms` cap, so a capped delay may exceed it by up to 10%.
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_delay_ms(&self) -> u64 {
        self.base_delay_ms
    }

    pub fn max_delay_ms(&self) -> u64 {
        self.max_delay_ms
    }

    /// Delay before the attempt following the `retry`-th failure.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let delay = calculate_backoff(retry, self.base_delay_ms, self.max_delay_ms);
        if self.jitter {
            apply_jitter(delay)
        } else {
            delay
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
            jitter: false,
        }
    }
}

/// One endpoint's retry budget ran out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("retries exhausted after {attempts} attempt(s): {last_error}")]
pub struct ExhaustedRetriesError<E: fmt::Display> {
    /// Attempts actually made.
    pub attempts: u32,
    /// Error from the final attempt.
    pub last_error: E,
}

/// Runs an operation under a [`RetryPolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Retry `operation` on every error until it succeeds or the budget is spent.
    ///
    /// The closure receives the 1-based attempt number.
    pub async fn execute<T, E, F, Fut>(&self, operation: F) -> Result<T, ExhaustedRetriesError<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        self.execute_when(operation, |_| true).await
    }

    /// Like [`execute`](Self::execute), but stops early when `should_retry` rejects an error.
    pub async fn execute_when<T, E, F, Fut, P>(
        &self,
        mut operation: F,
        should_retry: P,
    ) -> Result<T, ExhaustedRetriesError<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
        P: Fn(&E) -> bool,
    {
        let mut attempt = 0;

        loop {
            attempt += 1;

            let error = match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            if attempt >= self.policy.max_attempts || !should_retry(&error) {
                tracing::debug!(attempt, error = %error, "Giving up");
                return Err(ExhaustedRetriesError {
                    attempts: attempt,
                    last_error: error,
                });
            }

            let delay = self.policy.delay_for(attempt);
            tracing::debug!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Attempt failed, backing off"
            );
            tokio::time::sleep(delay).await;
        }
    }
}
