//! Breaker-wrapped retry executor.

use std::future::Future;
use std::sync::Arc;

use crate::breaker::CircuitBreaker;
use crate::config::ResilienceConfig;
use crate::error::{CallError, ResilienceError};
use crate::retry::RetryPolicy;

/// Guards every call to one dependency with its shared circuit breaker and a
/// retry policy.
///
/// Cloning is cheap and every clone shares the same breaker.
#[derive(Debug, Clone)]
pub struct Resilience {
    breaker: Arc<CircuitBreaker>,
    retry: RetryPolicy,
}

impl Resilience {
    /// Creates an executor around an existing breaker.
    pub fn new(breaker: Arc<CircuitBreaker>, retry: RetryPolicy) -> Self {
        Self { breaker, retry }
    }

    /// Creates an executor with a fresh breaker for the named dependency.
    pub fn for_dependency(name: impl Into<String>, config: ResilienceConfig) -> Self {
        Self::new(
            Arc::new(CircuitBreaker::new(name, config.breaker)),
            config.retry,
        )
    }

    /// Returns the shared breaker.
    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    /// Returns the retry policy.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Runs `operation` through the breaker and the retry policy.
    ///
    /// - Open circuit: fails with [`ResilienceError::CircuitOpen`] without
    ///   calling `operation`.
    /// - Connectivity failures are retried; if every attempt fails the breaker
    ///   records one failure and [`ResilienceError::Exhausted`] is returned.
    /// - Business failures return [`ResilienceError::Rejected`] immediately and
    ///   count as a healthy answer.
    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> Result<T, ResilienceError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CallError<E>>>,
    {
        let dependency = self.breaker.name();
        let Some(permit) = self.breaker.acquire() else {
            tracing::warn!(dependency, "call rejected, circuit open");
            metrics::counter!(
                "circuit_breaker_rejections_total",
                "dependency" => dependency.to_string()
            )
            .increment(1);
            return Err(ResilienceError::CircuitOpen {
                dependency: dependency.to_string(),
            });
        };

        match self.retry.run(dependency, operation).await {
            Ok(value) => {
                permit.record_success();
                Ok(value)
            }
            Err(CallError::Permanent(rejection)) => {
                permit.record_success();
                Err(ResilienceError::Rejected(rejection))
            }
            Err(CallError::Transient(source)) => {
                permit.record_failure();
                tracing::error!(
                    dependency,
                    attempts = self.retry.max_attempts,
                    error = %source,
                    "dependency unreachable, retries exhausted"
                );
                Err(ResilienceError::Exhausted {
                    dependency: dependency.to_string(),
                    attempts: self.retry.max_attempts,
                    source,
                })
            }
        }
    }
}
