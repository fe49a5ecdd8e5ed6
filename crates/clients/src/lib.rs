//! Clients for the catalog and inventory collaborators.
//!
//! Each client wraps one outbound call in the resilience layer and
//! translates the collaborator's answer into a small closed set of outcomes:
//! - catalog: [`CatalogOutcome`] (`Exists`, `NotFound`, `Unavailable`)
//! - inventory: [`StockOutcome`] (`Adjusted`, `InsufficientStock`, `NotFound`, `Unavailable`)
//!
//! Retry and breaker logic is never duplicated here; it is delegated to
//! [`resilience::Resilience`].

pub mod catalog;
pub mod credentials;
pub mod error;
pub mod http;
pub mod memory;
pub mod outcome;
pub mod stock;
pub mod wire;

pub use catalog::{CatalogClient, HttpCatalogClient};
pub use credentials::{ServiceClaims, ServiceToken};
pub use error::ClientError;
pub use http::{DEFAULT_TIMEOUT, build_http_client};
pub use memory::InMemoryCatalogClient;
pub use outcome::{CatalogOutcome, StockOutcome};
pub use stock::{HttpStockClient, StockClient};
pub use wire::{AdjustStockRequest, ErrorBody};
