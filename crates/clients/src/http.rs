//! Shared HTTP client construction.

use std::time::Duration;

use crate::error::ClientError;

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Builds the HTTP client used for collaborator calls.
///
/// `timeout` bounds both connecting and the whole request, so a collaborator
/// that accepts the connection but never answers surfaces as a transient
/// failure instead of hanging the caller.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, ClientError> {
    let client = reqwest::Client::builder()
        .connect_timeout(timeout)
        .timeout(timeout)
        .build()?;
    Ok(client)
}
