//! Inventory ledger for the order fulfillment services.
//!
//! The ledger keeps one stock record per product and applies signed
//! adjustments to it:
//! - outbound (`SALIDA`) subtracts and fails with insufficient stock rather
//!   than going negative
//! - inbound (`ENTRADA`) adds without an upper bound
//!
//! Each adjustment reads and writes its row under a per-row lock, so
//! concurrent outbound adjustments cannot both pass the availability check.

pub mod error;
pub mod ledger;
pub mod local;
pub mod memory;
pub mod postgres;
pub mod service;

pub use error::{InventoryError, LedgerError};
pub use ledger::{StockLedger, apply_adjustment};
pub use local::LocalStockClient;
pub use memory::InMemoryStockLedger;
pub use postgres::PostgresStockLedger;
pub use service::InventoryService;
