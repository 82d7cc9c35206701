//! Retrying operation executor with per-attempt timing capture

use crate::{
    error::{CacheError, CacheResult},
    models::{Config, OpCategory, OperationOutcome},
};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Bounded retry policy for cache operations
///
/// `max_attempts` counts the first try, so a policy of 3 performs at most
/// two retries. `retry_on` decides which errors are worth another attempt;
/// everything else fails the operation immediately.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts per operation, first try included
    pub max_attempts: u32,
    /// Fixed delay between attempts
    pub backoff: Duration,
    /// Predicate selecting retryable errors
    pub retry_on: fn(&CacheError) -> bool,
}

impl RetryPolicy {
    /// Create a policy retrying the declared transient error set
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
            retry_on: CacheError::is_transient,
        }
    }

    /// Build the policy from run configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.retry_count, config.retry_wait())
    }

    /// Replace the retryable-error predicate
    pub fn with_predicate(mut self, retry_on: fn(&CacheError) -> bool) -> Self {
        self.retry_on = retry_on;
        self
    }
}

/// Executes a single cache operation under a retry policy, timing every
/// attempt and emitting exactly one terminal [`OperationOutcome`].
#[derive(Debug, Clone, Copy)]
pub struct OperationExecutor {
    policy: RetryPolicy,
}

impl OperationExecutor {
    /// Create an executor with the given policy
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Execute `op`, retrying transient failures up to the policy bound
    ///
    /// Returns the operation's value (when the final attempt succeeded)
    /// together with the terminal outcome. Every attempt's timing is
    /// logged, but only the final attempt feeds the outcome; a retried
    /// operation that eventually succeeds reports a single success.
    pub async fn execute<T, F, Fut>(&self, category: OpCategory, op: F) -> (Option<T>, OperationOutcome)
    where
        F: Fn() -> Fut,
        Fut: Future<Output = CacheResult<T>>,
    {
        let mut attempt = 1u32;

        loop {
            let start = Instant::now();
            let result = op().await;
            let latency = start.elapsed();

            match result {
                Ok(value) => {
                    debug!(
                        category = %category,
                        attempt,
                        latency_ms = latency.as_secs_f64() * 1000.0,
                        "operation succeeded"
                    );
                    return (Some(value), OperationOutcome::success(category, latency));
                }
                Err(error) => {
                    let retryable = (self.policy.retry_on)(&error);

                    if retryable && attempt < self.policy.max_attempts {
                        debug!(
                            category = %category,
                            attempt,
                            latency_ms = latency.as_secs_f64() * 1000.0,
                            error = %error,
                            "transient failure, retrying"
                        );
                        attempt += 1;
                        tokio::time::sleep(self.policy.backoff).await;
                        continue;
                    }

                    warn!(
                        category = %category,
                        attempt,
                        latency_ms = latency.as_secs_f64() * 1000.0,
                        error = %error,
                        retryable,
                        "operation failed"
                    );
                    return (
                        None,
                        OperationOutcome::failure(category, latency, error.kind().to_string()),
                    );
                }
            }
        }
    }
}
