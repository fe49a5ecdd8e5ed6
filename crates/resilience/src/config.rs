//! Combined resilience settings for one dependency.

use crate::breaker::BreakerConfig;
use crate::retry::RetryPolicy;

/// Retry and breaker settings applied to every call to a dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResilienceConfig {
    pub retry: RetryPolicy,
    pub breaker: BreakerConfig,
}

impl ResilienceConfig {
    pub fn new(retry: RetryPolicy, breaker: BreakerConfig) -> Self {
        Self { retry, breaker }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn defaults_are_three_attempts_five_failures_sixty_seconds() {
        let config = ResilienceConfig::default();
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.delay, Duration::from_secs(2));
        assert_eq!(config.breaker.failure_threshold, 5);
        assert_eq!(config.breaker.open_duration, Duration::from_secs(60));
    }
}
