//! Saga error types.

use common::{OrderId, ProductId};
use domain::{OrderError, RepositoryError};
use thiserror::Error;

/// Error categories callers act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Product, order or stock record absent.
    NotFound,
    /// Insufficient stock, illegal transition or bad input.
    BusinessRuleViolation,
    /// Circuit open or retries exhausted; the caller may retry later.
    DependencyUnavailable,
    /// Local persistence failed.
    InternalError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::BusinessRuleViolation => "business_rule_violation",
            ErrorKind::DependencyUnavailable => "dependency_unavailable",
            ErrorKind::InternalError => "internal_error",
        }
    }
}

/// Errors that can occur while running an order saga.
#[derive(Debug, Error)]
pub enum SagaError {
    /// The catalog does not know the product.
    #[error("Product {0} not found")]
    ProductNotFound(ProductId),

    /// The catalog could not be consulted.
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// The inventory refused an outbound adjustment.
    #[error("{0}")]
    InsufficientStock(String),

    /// The product has no stock record.
    #[error("No inventory for product {product_id}: {detail}")]
    StockNotFound { product_id: ProductId, detail: String },

    /// The inventory could not be reached.
    #[error("Inventory unavailable: {0}")]
    InventoryUnavailable(String),

    /// No order with the given id.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// The request breaks an order rule.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Stock was taken but the order could not be stored; the stock
    /// adjustment has been reversed.
    #[error("Internal error, order reverted")]
    OrderReverted {
        #[source]
        source: RepositoryError,
    },

    /// Order storage failed.
    #[error("Order storage error: {0}")]
    Repository(#[from] RepositoryError),
}

impl SagaError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SagaError::ProductNotFound(_)
            | SagaError::StockNotFound { .. }
            | SagaError::OrderNotFound(_)
            | SagaError::Repository(RepositoryError::NotFound(_)) => ErrorKind::NotFound,
            SagaError::InsufficientStock(_) | SagaError::Order(_) => {
                ErrorKind::BusinessRuleViolation
            }
            SagaError::CatalogUnavailable(_) | SagaError::InventoryUnavailable(_) => {
                ErrorKind::DependencyUnavailable
            }
            SagaError::OrderReverted { .. } | SagaError::Repository(_) => ErrorKind::InternalError,
        }
    }
}

#[cfg(test)]
mod tests {
    use domain::OrderState;

    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(
            SagaError::ProductNotFound(ProductId::new(1)).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            SagaError::InsufficientStock("short".into()).kind(),
            ErrorKind::BusinessRuleViolation
        );
        assert_eq!(
            SagaError::Order(OrderError::IllegalTransition {
                from: OrderState::Completed,
                to: OrderState::Cancelled,
                reason: "cannot cancel a completed order",
            })
            .kind(),
            ErrorKind::BusinessRuleViolation
        );
        assert_eq!(
            SagaError::InventoryUnavailable("circuit open".into()).kind(),
            ErrorKind::DependencyUnavailable
        );
        assert_eq!(
            SagaError::Repository(RepositoryError::NotFound(OrderId::new(1))).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            SagaError::OrderReverted {
                source: RepositoryError::Storage("disk full".into())
            }
            .kind(),
            ErrorKind::InternalError
        );
    }

    #[test]
    fn test_reverted_message_hides_storage_detail() {
        let err = SagaError::OrderReverted {
            source: RepositoryError::Storage("disk full".into()),
        };
        assert_eq!(err.to_string(), "Internal error, order reverted");
    }
}
