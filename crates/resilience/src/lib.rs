//! Resilience layer for calls that cross a service boundary.
//!
//! Every outbound call is wrapped twice:
//! 1. A fixed-delay retry policy re-attempts transient connectivity failures.
//! 2. A per-dependency circuit breaker wraps the retry policy and rejects
//!    calls outright while the dependency is considered unhealthy.
//!
//! Permanent (business) failures are never retried and never count against
//! the breaker, so a legitimate "not found" does not degrade service health.

pub mod breaker;
pub mod config;
pub mod error;
pub mod executor;
pub mod retry;

pub use breaker::{BreakerConfig, BreakerState, CallPermit, CircuitBreaker};
pub use config::ResilienceConfig;
pub use error::{CallError, ResilienceError, TransientError};
pub use executor::Resilience;
pub use retry::RetryPolicy;
