use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use common::{Direction, ProductId, StockRecord, StockRecordId};
use tokio::sync::{Mutex, RwLock};

use crate::error::LedgerError;
use crate::ledger::{StockLedger, apply_adjustment, validate_initial_quantity};

type Row = Arc<Mutex<StockRecord>>;

/// In-memory stock ledger.
///
/// Each product row sits behind its own mutex, so adjustments to one product
/// are serialized while other products stay unaffected. The outer map lock is
/// only held long enough to look a row up.
#[derive(Clone, Default)]
pub struct InMemoryStockLedger {
    rows: Arc<RwLock<HashMap<ProductId, Row>>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryStockLedger {
    /// Creates a new empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of products with a stock record.
    pub async fn product_count(&self) -> usize {
        self.rows.read().await.len()
    }

    async fn row(&self, product_id: ProductId) -> Option<Row> {
        self.rows.read().await.get(&product_id).cloned()
    }
}

#[async_trait]
impl StockLedger for InMemoryStockLedger {
    async fn register(
        &self,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<StockRecord, LedgerError> {
        validate_initial_quantity(quantity)?;

        let mut rows = self.rows.write().await;
        if rows.contains_key(&product_id) {
            return Err(LedgerError::AlreadyRegistered(product_id));
        }

        let record = StockRecord {
            id: StockRecordId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
            product_id,
            quantity,
            updated_at: Utc::now(),
        };
        rows.insert(product_id, Arc::new(Mutex::new(record.clone())));
        Ok(record)
    }

    async fn get(&self, product_id: ProductId) -> Result<Option<StockRecord>, LedgerError> {
        match self.row(product_id).await {
            Some(row) => Ok(Some(row.lock().await.clone())),
            None => Ok(None),
        }
    }

    async fn adjust(
        &self,
        product_id: ProductId,
        quantity: u32,
        direction: Direction,
    ) -> Result<StockRecord, LedgerError> {
        let row = self
            .row(product_id)
            .await
            .ok_or(LedgerError::NotFound(product_id))?;

        let mut record = row.lock().await;
        apply_adjustment(&mut record, quantity, direction)?;
        Ok(record.clone())
    }
}
