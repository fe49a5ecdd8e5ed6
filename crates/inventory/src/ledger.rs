//! Stock ledger trait and the adjustment rule shared by every implementation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{Direction, ProductId, StockRecord};

use crate::error::LedgerError;

/// Per-product stock storage.
///
/// Implementations must serialize [`adjust`](Self::adjust) per product row;
/// adjustments to different products may proceed in parallel.
#[async_trait]
pub trait StockLedger: Send + Sync {
    /// Creates the stock record for a product.
    ///
    /// Fails with [`LedgerError::AlreadyRegistered`] if one exists.
    async fn register(&self, product_id: ProductId, quantity: i64)
    -> Result<StockRecord, LedgerError>;

    /// Loads the stock record for a product.
    async fn get(&self, product_id: ProductId) -> Result<Option<StockRecord>, LedgerError>;

    /// Applies an adjustment atomically and returns the updated record.
    async fn adjust(
        &self,
        product_id: ProductId,
        quantity: u32,
        direction: Direction,
    ) -> Result<StockRecord, LedgerError>;
}

#[async_trait]
impl<T: StockLedger + ?Sized> StockLedger for Arc<T> {
    async fn register(
        &self,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<StockRecord, LedgerError> {
        (**self).register(product_id, quantity).await
    }

    async fn get(&self, product_id: ProductId) -> Result<Option<StockRecord>, LedgerError> {
        (**self).get(product_id).await
    }

    async fn adjust(
        &self,
        product_id: ProductId,
        quantity: u32,
        direction: Direction,
    ) -> Result<StockRecord, LedgerError> {
        (**self).adjust(product_id, quantity, direction).await
    }
}

/// Applies one adjustment to a record in place.
///
/// The record is untouched when the adjustment is rejected.
pub fn apply_adjustment(
    record: &mut StockRecord,
    quantity: u32,
    direction: Direction,
) -> Result<(), LedgerError> {
    if quantity == 0 {
        return Err(LedgerError::InvalidQuantity(0));
    }
    let delta = i64::from(quantity);

    let new_quantity = match direction {
        Direction::Outbound => {
            if record.quantity < delta {
                return Err(LedgerError::InsufficientStock {
                    product_id: record.product_id,
                    requested: delta,
                    available: record.quantity,
                });
            }
            record.quantity - delta
        }
        Direction::Inbound => record
            .quantity
            .checked_add(delta)
            .ok_or(LedgerError::InvalidQuantity(delta))?,
    };

    record.quantity = new_quantity;
    record.updated_at = Utc::now();
    Ok(())
}

/// Validates an initial stock quantity.
pub(crate) fn validate_initial_quantity(quantity: i64) -> Result<(), LedgerError> {
    if quantity < 0 {
        return Err(LedgerError::InvalidQuantity(quantity));
    }
    Ok(())
}
