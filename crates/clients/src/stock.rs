//! Stock client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::{Direction, ProductId, StockRecord};
use resilience::{CallError, Resilience, ResilienceError};

use crate::credentials::ServiceToken;
use crate::error::ClientError;
use crate::http::build_http_client;
use crate::outcome::StockOutcome;
use crate::wire::{AdjustStockRequest, ErrorBody};

/// Applies stock adjustments through the inventory collaborator.
#[async_trait]
pub trait StockClient: Send + Sync {
    /// Applies a signed adjustment of `quantity` units to a product's stock.
    async fn adjust_stock(
        &self,
        product_id: ProductId,
        quantity: u32,
        direction: Direction,
    ) -> StockOutcome;
}

#[async_trait]
impl<T: StockClient + ?Sized> StockClient for Arc<T> {
    async fn adjust_stock(
        &self,
        product_id: ProductId,
        quantity: u32,
        direction: Direction,
    ) -> StockOutcome {
        (**self).adjust_stock(product_id, quantity, direction).await
    }
}

/// Business answers from the inventory that are not retried.
#[derive(Debug, Clone, PartialEq, Eq)]
enum StockRejection {
    Insufficient(String),
    NotFound(String),
    Unexpected(String),
    /// 2xx answer whose record could not be read: the adjustment was applied.
    UnreadableRecord(String),
}

impl std::fmt::Display for StockRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StockRejection::Insufficient(detail)
            | StockRejection::NotFound(detail)
            | StockRejection::Unexpected(detail) => write!(f, "{detail}"),
            StockRejection::UnreadableRecord(detail) => {
                write!(f, "adjustment applied but answer unreadable: {detail}")
            }
        }
    }
}

/// Stock client speaking `PATCH {base_url}/inventory/{product_id}`.
///
/// Only connectivity failures are retried. Any status other than 200, 400 or
/// 404 is reported as unavailable straight away: an adjustment is not
/// idempotent, so a server-side failure is never replayed.
#[derive(Debug, Clone)]
pub struct HttpStockClient {
    http: reqwest::Client,
    base_url: String,
    token: ServiceToken,
    resilience: Resilience,
}

impl HttpStockClient {
    /// Creates a stock client. `resilience` should hold the breaker shared by
    /// every caller of the inventory.
    pub fn new(
        base_url: impl Into<String>,
        token: ServiceToken,
        resilience: Resilience,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        Ok(Self::with_http_client(
            build_http_client(timeout)?,
            base_url,
            token,
            resilience,
        ))
    }

    /// Creates a stock client on top of an existing HTTP client.
    pub fn with_http_client(
        http: reqwest::Client,
        base_url: impl Into<String>,
        token: ServiceToken,
        resilience: Resilience,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            token,
            resilience,
        }
    }

    /// Returns the resilience executor guarding this client.
    pub fn resilience(&self) -> &Resilience {
        &self.resilience
    }
}

async fn error_detail(response: reqwest::Response) -> String {
    let status = response.status();
    match response.json::<ErrorBody>().await {
        Ok(body) => body.detail,
        Err(_) => format!("inventory answered {status}"),
    }
}

#[async_trait]
impl StockClient for HttpStockClient {
    #[tracing::instrument(skip(self))]
    async fn adjust_stock(
        &self,
        product_id: ProductId,
        quantity: u32,
        direction: Direction,
    ) -> StockOutcome {
        let url = format!("{}/inventory/{}", self.base_url, product_id);
        let body = AdjustStockRequest {
            quantity,
            direction,
        };
        tracing::info!(%url, %direction, quantity, "adjusting stock in inventory");

        let result = self
            .resilience
            .execute(|| {
                let request = self
                    .http
                    .patch(&url)
                    .bearer_auth(self.token.as_str())
                    .json(&body);
                async move {
                    let response = request
                        .send()
                        .await
                        .map_err(|e| CallError::transient(e.to_string()))?;
                    match response.status().as_u16() {
                        200..=299 => response.json::<StockRecord>().await.map_err(|e| {
                            CallError::Permanent(StockRejection::UnreadableRecord(e.to_string()))
                        }),
                        400 => Err(CallError::Permanent(StockRejection::Insufficient(
                            error_detail(response).await,
                        ))),
                        404 => Err(CallError::Permanent(StockRejection::NotFound(
                            error_detail(response).await,
                        ))),
                        _ => Err(CallError::Permanent(StockRejection::Unexpected(
                            error_detail(response).await,
                        ))),
                    }
                }
            })
            .await;

        let outcome = match result {
            Ok(record) => StockOutcome::Adjusted(record),
            Err(ResilienceError::Rejected(StockRejection::Insufficient(detail))) => {
                StockOutcome::InsufficientStock(detail)
            }
            Err(ResilienceError::Rejected(StockRejection::NotFound(detail))) => {
                StockOutcome::NotFound(detail)
            }
            Err(ResilienceError::Rejected(rejection @ StockRejection::UnreadableRecord(_))) => {
                tracing::error!(
                    alert = "stock_inconsistent",
                    %product_id,
                    %direction,
                    quantity,
                    error = %rejection,
                    "inventory applied the adjustment but its answer could not be read, manual correction required"
                );
                StockOutcome::Unavailable(rejection.to_string())
            }
            Err(err) => StockOutcome::Unavailable(err.to_string()),
        };

        metrics::counter!(
            "stock_adjustments_total",
            "direction" => direction.as_str(),
            "outcome" => outcome.label()
        )
        .increment(1);
        outcome
    }
}
