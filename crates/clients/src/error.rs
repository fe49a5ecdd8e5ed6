//! Client construction errors.

use thiserror::Error;

/// Errors raised while building clients or their credentials.
///
/// Call failures are not errors at this level; they are folded into
/// [`CatalogOutcome`](crate::CatalogOutcome) and
/// [`StockOutcome`](crate::StockOutcome).
#[derive(Debug, Error)]
pub enum ClientError {
    /// The service credential could not be encoded or decoded.
    #[error("Credential error: {0}")]
    Credential(#[from] jsonwebtoken::errors::Error),

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}
