//! Shared types for the order fulfillment services.
//!
//! Identifiers cross service boundaries as plain integers, so each one is
//! wrapped in a newtype to keep product, order and stock record ids apart.

pub mod stock;
pub mod types;

pub use stock::{Direction, ParseDirectionError, StockRecord};
pub use types::{OrderId, ProductId, StockRecordId};
