//! Catalog client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::ProductId;
use resilience::{CallError, Resilience, ResilienceError};

use crate::credentials::ServiceToken;
use crate::error::ClientError;
use crate::http::build_http_client;
use crate::outcome::CatalogOutcome;

/// Looks products up in the catalog collaborator.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Checks whether a product exists.
    async fn check_product(&self, product_id: ProductId) -> CatalogOutcome;
}

#[async_trait]
impl<T: CatalogClient + ?Sized> CatalogClient for Arc<T> {
    async fn check_product(&self, product_id: ProductId) -> CatalogOutcome {
        (**self).check_product(product_id).await
    }
}

/// Business answers from the catalog that are not retried.
#[derive(Debug, Clone, PartialEq, Eq)]
enum CatalogRejection {
    NotFound,
    Unexpected(u16),
}

impl std::fmt::Display for CatalogRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogRejection::NotFound => write!(f, "product not found"),
            CatalogRejection::Unexpected(status) => {
                write!(f, "unexpected catalog status {status}")
            }
        }
    }
}

/// Catalog client speaking `GET {base_url}/products/{id}`.
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    http: reqwest::Client,
    base_url: String,
    token: ServiceToken,
    resilience: Resilience,
}

impl HttpCatalogClient {
    /// Creates a catalog client. `resilience` should hold the breaker shared
    /// by every caller of the catalog.
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

    /// Creates a catalog client on top of an existing HTTP client.
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

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    #[tracing::instrument(skip(self))]
    async fn check_product(&self, product_id: ProductId) -> CatalogOutcome {
        let url = format!("{}/products/{}", self.base_url, product_id);
        tracing::info!(%url, "checking product in catalog");

        let result = self
            .resilience
            .execute(|| {
                let request = self.http.get(&url).bearer_auth(self.token.as_str());
                async move {
                    let response = request
                        .send()
                        .await
                        .map_err(|e| CallError::transient(e.to_string()))?;
                    match response.status().as_u16() {
                        200..=299 => Ok(()),
                        404 => Err(CallError::Permanent(CatalogRejection::NotFound)),
                        status => Err(CallError::Permanent(CatalogRejection::Unexpected(status))),
                    }
                }
            })
            .await;

        match result {
            Ok(()) => CatalogOutcome::Exists,
            Err(ResilienceError::Rejected(CatalogRejection::NotFound)) => CatalogOutcome::NotFound,
            Err(err) => {
                tracing::warn!(%product_id, error = %err, "catalog unavailable");
                CatalogOutcome::Unavailable(err.to_string())
            }
        }
    }
}
