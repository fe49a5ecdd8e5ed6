//! Repository error types.

use common::OrderId;
use thiserror::Error;

/// Errors raised by an order repository.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No order with the given id.
    #[error("Order not found: {0}")]
    NotFound(OrderId),

    /// The storage refused or could not complete the write.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
