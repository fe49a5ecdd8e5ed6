//! Inventory service: catalog-checked registration and stock adjustment.

use std::time::Instant;

use clients::{CatalogClient, CatalogOutcome};
use common::{Direction, ProductId, StockRecord};

use crate::error::{InventoryError, LedgerError};
use crate::ledger::StockLedger;

/// Service fronting a stock ledger.
///
/// Registration consults the catalog first; adjustments go straight to the
/// ledger.
pub struct InventoryService<L: StockLedger, C: CatalogClient> {
    ledger: L,
    catalog: C,
}

impl<L: StockLedger, C: CatalogClient> InventoryService<L, C> {
    /// Creates a new inventory service.
    pub fn new(ledger: L, catalog: C) -> Self {
        Self { ledger, catalog }
    }

    /// Returns a reference to the ledger.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Creates the stock record for a product known to the catalog.
    #[tracing::instrument(skip(self))]
    pub async fn register_stock(
        &self,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<StockRecord, InventoryError> {
        if quantity < 0 {
            return Err(LedgerError::InvalidQuantity(quantity).into());
        }

        match self.catalog.check_product(product_id).await {
            CatalogOutcome::Exists => {}
            CatalogOutcome::NotFound => return Err(InventoryError::ProductNotFound(product_id)),
            CatalogOutcome::Unavailable(reason) => {
                return Err(InventoryError::CatalogUnavailable(reason));
            }
        }

        let record = self.ledger.register(product_id, quantity).await?;
        tracing::info!(%product_id, quantity, "stock registered");
        Ok(record)
    }

    /// Applies an adjustment of `quantity` units in `direction`.
    #[tracing::instrument(skip(self))]
    pub async fn adjust_stock(
        &self,
        product_id: ProductId,
        quantity: u32,
        direction: Direction,
    ) -> Result<StockRecord, InventoryError> {
        let start = Instant::now();
        let result = self.ledger.adjust(product_id, quantity, direction).await;

        let outcome = match &result {
            Ok(_) => "adjusted",
            Err(LedgerError::InsufficientStock { .. }) => "insufficient_stock",
            Err(LedgerError::NotFound(_)) => "not_found",
            Err(_) => "error",
        };
        metrics::counter!(
            "ledger_adjustments_total",
            "direction" => direction.as_str(),
            "outcome" => outcome
        )
        .increment(1);
        metrics::histogram!("ledger_adjustment_duration_seconds")
            .record(start.elapsed().as_secs_f64());

        match &result {
            Ok(record) => {
                tracing::info!(%product_id, remaining = record.quantity, "stock adjusted")
            }
            Err(e) => tracing::warn!(%product_id, error = %e, "stock adjustment rejected"),
        }
        Ok(result?)
    }

    /// Returns the current stock record for a product.
    pub async fn stock_level(&self, product_id: ProductId) -> Result<StockRecord, InventoryError> {
        self.ledger
            .get(product_id)
            .await?
            .ok_or(InventoryError::Ledger(LedgerError::NotFound(product_id)))
    }
}
