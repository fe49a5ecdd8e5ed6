//! Closed outcome sets returned by the collaborator clients.

use common::StockRecord;

/// Answer of the catalog when asked about a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogOutcome {
    /// The product exists.
    Exists,
    /// The catalog answered that the product does not exist.
    NotFound,
    /// The catalog could not be consulted (open circuit, exhausted retries,
    /// or an unexpected answer).
    Unavailable(String),
}

/// Answer of the inventory when asked to adjust stock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockOutcome {
    /// The adjustment was applied; carries the updated record.
    Adjusted(StockRecord),
    /// Outbound adjustment larger than the available stock. Nothing changed.
    InsufficientStock(String),
    /// No stock record exists for the product.
    NotFound(String),
    /// The inventory could not be consulted.
    Unavailable(String),
}

impl StockOutcome {
    /// Returns a short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            StockOutcome::Adjusted(_) => "adjusted",
            StockOutcome::InsufficientStock(_) => "insufficient_stock",
            StockOutcome::NotFound(_) => "not_found",
            StockOutcome::Unavailable(_) => "unavailable",
        }
    }
}
