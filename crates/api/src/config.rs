//! Application configuration loaded from environment variables.

use std::time::Duration;

use resilience::{BreakerConfig, ResilienceConfig, RetryPolicy};

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `SECRET_KEY`: shared secret for service tokens (required, no default)
/// - `SERVICE_SUBJECT`: subject of the token this service presents
///   (default: `"sistema-pedidos"`)
/// - `CATALOG_URL`: catalog base URL (default: `"http://127.0.0.1:8001"`)
/// - `INVENTORY_URL`: remote inventory base URL; unset means the stock
///   ledger runs in this process
/// - `DATABASE_URL`: PostgreSQL URL; unset means in-memory storage
/// - `RETRY_MAX_ATTEMPTS`, `RETRY_DELAY_MS`, `BREAKER_FAILURE_THRESHOLD`,
///   `BREAKER_OPEN_SECS`: resilience tuning (defaults 3, 2000, 5, 60)
/// - `HTTP_TIMEOUT_MS`: connect and request timeout for collaborator calls
///   (default: `5000`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub secret_key: Option<String>,
    pub service_subject: String,
    pub catalog_url: String,
    pub inventory_url: Option<String>,
    pub database_url: Option<String>,
    pub retry_max_attempts: u32,
    pub retry_delay: Duration,
    pub breaker_failure_threshold: u32,
    pub breaker_open_duration: Duration,
    pub http_timeout: Duration,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: env_or("PORT", defaults.port),
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
            secret_key: std::env::var("SECRET_KEY").ok(),
            service_subject: std::env::var("SERVICE_SUBJECT")
                .unwrap_or(defaults.service_subject),
            catalog_url: std::env::var("CATALOG_URL").unwrap_or(defaults.catalog_url),
            inventory_url: std::env::var("INVENTORY_URL").ok(),
            database_url: std::env::var("DATABASE_URL").ok(),
            retry_max_attempts: env_or("RETRY_MAX_ATTEMPTS", defaults.retry_max_attempts),
            retry_delay: Duration::from_millis(env_or("RETRY_DELAY_MS", 2000)),
            breaker_failure_threshold: env_or(
                "BREAKER_FAILURE_THRESHOLD",
                defaults.breaker_failure_threshold,
            ),
            breaker_open_duration: Duration::from_secs(env_or("BREAKER_OPEN_SECS", 60)),
            http_timeout: Duration::from_millis(env_or("HTTP_TIMEOUT_MS", 5000)),
        }
    }

    /// Secret used by [`Config::for_development`].
    pub const DEVELOPMENT_SECRET: &'static str = "dev-secret-key";

    /// Defaults plus a fixed, publicly known secret. For local runs and tests
    /// only; never reached from [`Config::from_env`].
    pub fn for_development() -> Self {
        Self {
            secret_key: Some(Self::DEVELOPMENT_SECRET.to_string()),
            ..Self::default()
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the retry and breaker settings applied to every dependency.
    pub fn resilience(&self) -> ResilienceConfig {
        ResilienceConfig::new(
            RetryPolicy::new(self.retry_max_attempts, self.retry_delay),
            BreakerConfig::new(self.breaker_failure_threshold, self.breaker_open_duration),
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        let resilience = ResilienceConfig::default();
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            secret_key: None,
            service_subject: "sistema-pedidos".to_string(),
            catalog_url: "http://127.0.0.1:8001".to_string(),
            inventory_url: None,
            database_url: None,
            retry_max_attempts: resilience.retry.max_attempts,
            retry_delay: resilience.retry.delay,
            breaker_failure_threshold: resilience.breaker.failure_threshold,
            breaker_open_duration: resilience.breaker.open_duration,
            http_timeout: clients::DEFAULT_TIMEOUT,
        }
    }
}
