//! Inventory error types.

use common::ProductId;
use thiserror::Error;

/// Errors raised by a stock ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// No stock record exists for the product.
    #[error("No inventory for product {0}")]
    NotFound(ProductId),

    /// Outbound adjustment larger than the available stock.
    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },

    /// A stock record already exists for the product.
    #[error("Inventory already exists for product {0}")]
    AlreadyRegistered(ProductId),

    /// Adjustment or initial quantity out of range.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl LedgerError {
    /// Returns true for storage failures worth retrying (lost connection,
    /// exhausted pool).
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LedgerError::Database(
                sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed
            )
        )
    }
}

/// Errors raised by the inventory service.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// The catalog does not know the product.
    #[error("Product {0} does not exist, cannot create inventory")]
    ProductNotFound(ProductId),

    /// The catalog could not be consulted.
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// The ledger rejected the operation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
