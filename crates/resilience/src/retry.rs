//! Fixed-delay retry policy.

use std::future::Future;
use std::time::Duration;

use crate::error::CallError;

/// Retries transient failures a bounded number of times with a fixed pause
/// between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
    /// Pause between consecutive attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    /// Creates a retry policy. `max_attempts` is clamped to at least one.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// A policy that makes exactly one attempt.
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Runs `operation` until it succeeds, fails permanently, or runs out of
    /// attempts. The last transient failure is returned unchanged.
    pub async fn run<F, Fut, T, E>(
        &self,
        dependency: &str,
        mut operation: F,
    ) -> Result<T, CallError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CallError<E>>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match operation().await {
                Err(CallError::Transient(err)) if attempt < max_attempts => {
                    tracing::warn!(
                        dependency,
                        attempt,
                        max_attempts,
                        error = %err,
                        "transient failure, retrying"
                    );
                    metrics::counter!("resilience_retries_total", "dependency" => dependency.to_string())
                        .increment(1);
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                outcome => return outcome,
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}
