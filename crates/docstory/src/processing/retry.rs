//! Uniform retry policy for backend invocations

use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout};

use crate::config::{BackoffStrategy, RetryConfig};
use crate::error::{Error, Result};

/// Attempts, delays and timeout applied to every backend call
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, first one included
    pub max_attempts: u32,
    /// Fixed or exponential spacing between attempts
    pub backoff: BackoffStrategy,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound on any single delay
    pub max_delay: Duration,
    /// Bound on a single attempt
    pub attempt_timeout: Option<Duration>,
    /// Decides whether a failed attempt is worth repeating
    pub retryable: fn(&Error) -> bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    /// Build a policy retrying transient failures
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            backoff: config.backoff,
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            attempt_timeout: (config.attempt_timeout_secs > 0)
                .then(|| Duration::from_secs(config.attempt_timeout_secs)),
            retryable: Error::is_transient,
        }
    }

    /// Replace the retry predicate
    pub fn with_predicate(mut self, retryable: fn(&Error) -> bool) -> Self {
        self.retryable = retryable;
        self
    }

    /// Delay before retry number `attempt` (1 = first retry)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let delay = match self.backoff {
            BackoffStrategy::Fixed => self.initial_delay,
            BackoffStrategy::Exponential => {
                let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
                self.initial_delay.saturating_mul(factor)
            }
        };
        delay.min(self.max_delay.max(self.initial_delay))
    }

    /// Run `operation` until it succeeds, fails permanently, or attempts run out
    pub async fn run<T, F, Fut>(&self, label: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;

        loop {
            let outcome = match self.attempt_timeout {
                Some(limit) => match timeout(limit, operation()).await {
                    Ok(result) => result,
                    Err(_) => Err(Error::timeout(format!("{} exceeded {:?}", label, limit))),
                },
                None => operation().await,
            };

            let err = match outcome {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            if !(self.retryable)(&err) {
                return Err(err);
            }

            if attempt >= self.max_attempts {
                return Err(Error::RetriesExhausted {
                    operation: label.to_string(),
                    attempts: attempt,
                    last: Box::new(err),
                });
            }

            let delay = self.delay_for(attempt);
            tracing::warn!(
                "{} failed (attempt {}/{}): {}, retrying in {:?}",
                label,
                attempt,
                self.max_attempts,
                err,
                delay
            );
            sleep(delay).await;
            attempt += 1;
        }
    }
}
