//! Exponential backoff with jitter around a single asynchronous call.
//!
//! Each call is independent: there is no circuit breaker and nothing is
//! remembered between executions. Terminal errors (see
//! [`Error::is_retryable`](crate::Error::is_retryable)) abort immediately.

use crate::{Error, Result};
use rand::Rng;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_retry::RetryIf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included.
    pub max_attempts: usize,
    pub base_delay: Duration,
    /// Upper bound of the uniformly random delay added to each backoff.
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(1000),
            max_jitter: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            ..Self::default()
        }
    }

    pub fn with_max_jitter(mut self, max_jitter: Duration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    /// Deterministic part of the wait after the failed attempt `attempt` (0-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(1u32 << attempt.min(20))
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        let jitter_ms = self.max_jitter.as_millis() as u64;
        let jitter = if jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=jitter_ms)
        };
        self.backoff(attempt) + Duration::from_millis(jitter)
    }

    fn schedule(self) -> impl Iterator<Item = Duration> {
        let retries = self.max_attempts.max(1) - 1;
        (0..retries as u32).map(move |attempt| {
            let delay = self.delay_for(attempt);
            tracing::warn!("Retrying in {:?} (retry {}/{})", delay, attempt + 1, retries);
            delay
        })
    }
}

#[derive(Debug, Clone, Default)]
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

    /// Run `operation` until it succeeds, fails terminally, or the attempt
    /// budget is spent; the last error is returned in the latter cases.
    pub async fn execute<T, F, Fut>(&self, label: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let attempt = AtomicUsize::new(0);
        let max_attempts = self.policy.max_attempts.max(1);

        RetryIf::spawn(
            self.policy.schedule(),
            || {
                let current = attempt.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::debug!("[{}] attempt {}/{}", label, current, max_attempts);
                operation()
            },
            |error: &Error| {
                if error.is_retryable() {
                    tracing::warn!(
                        "[{}] attempt {}/{} failed: {}",
                        label,
                        attempt.load(Ordering::Relaxed),
                        max_attempts,
                        error
                    );
                    true
                } else {
                    tracing::error!("[{}] terminal failure: {}", label, error);
                    false
                }
            },
        )
        .await
    }
}
