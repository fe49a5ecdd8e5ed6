//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use inventory::{InventoryError, LedgerError};
use saga::{ErrorKind, SagaError};

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or invalid service credential.
    Unauthorized,
    /// Bad request from the client.
    BadRequest(String),
    /// Order saga error.
    Saga(SagaError),
    /// Inventory error.
    Inventory(InventoryError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Not authenticated".to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Saga(err) => saga_error_to_response(err),
            ApiError::Inventory(err) => inventory_error_to_response(err),
        };

        if status.is_server_error() {
            tracing::error!(%status, error = %detail, "request failed");
        }

        let body = serde_json::json!({ "detail": detail });
        (status, axum::Json(body)).into_response()
    }
}

fn saga_error_to_response(err: SagaError) -> (StatusCode, String) {
    let status = match err.kind() {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::BusinessRuleViolation => StatusCode::BAD_REQUEST,
        ErrorKind::DependencyUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string())
}

fn inventory_error_to_response(err: InventoryError) -> (StatusCode, String) {
    let status = match &err {
        InventoryError::ProductNotFound(_) | InventoryError::Ledger(LedgerError::NotFound(_)) => {
            StatusCode::NOT_FOUND
        }
        InventoryError::CatalogUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        InventoryError::Ledger(LedgerError::AlreadyRegistered(_)) => StatusCode::CONFLICT,
        InventoryError::Ledger(
            LedgerError::InsufficientStock { .. } | LedgerError::InvalidQuantity(_),
        ) => StatusCode::BAD_REQUEST,
        InventoryError::Ledger(e) if e.is_transient() => StatusCode::SERVICE_UNAVAILABLE,
        InventoryError::Ledger(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string())
}

impl From<SagaError> for ApiError {
    fn from(err: SagaError) -> Self {
        ApiError::Saga(err)
    }
}

impl From<InventoryError> for ApiError {
    fn from(err: InventoryError) -> Self {
        ApiError::Inventory(err)
    }
}

#[cfg(test)]
mod tests {
    use common::{OrderId, ProductId};
    use domain::RepositoryError;

    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_saga_errors_map_by_kind() {
        assert_eq!(
            status_of(SagaError::OrderNotFound(OrderId::new(1)).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(SagaError::InsufficientStock("short".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(SagaError::CatalogUnavailable("circuit open".into()).into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(
                SagaError::OrderReverted {
                    source: RepositoryError::Storage("down".into())
                }
                .into()
            ),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_inventory_errors() {
        assert_eq!(
            status_of(InventoryError::ProductNotFound(ProductId::new(1)).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(InventoryError::Ledger(LedgerError::AlreadyRegistered(ProductId::new(1))).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(
                InventoryError::Ledger(LedgerError::Database(sqlx::Error::PoolTimedOut)).into()
            ),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(
                InventoryError::Ledger(LedgerError::Database(sqlx::Error::RowNotFound)).into()
            ),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(status_of(ApiError::Unauthorized), StatusCode::UNAUTHORIZED);
    }
}
