//! Stock client backed directly by a ledger in the same process.

use async_trait::async_trait;
use clients::{StockClient, StockOutcome};
use common::{Direction, ProductId};
use resilience::{CallError, Resilience, ResilienceError};

use crate::error::LedgerError;
use crate::ledger::StockLedger;

/// [`StockClient`] that adjusts a ledger in-process.
///
/// Storage outages are retried and counted by the breaker like lost
/// connections on the HTTP client; ledger rejections come back as business
/// outcomes.
pub struct LocalStockClient<L: StockLedger> {
    ledger: L,
    resilience: Resilience,
}

impl<L: StockLedger> LocalStockClient<L> {
    /// Creates a client over `ledger`.
    pub fn new(ledger: L, resilience: Resilience) -> Self {
        Self { ledger, resilience }
    }

    /// Returns the ledger.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Returns the resilience executor guarding the ledger.
    pub fn resilience(&self) -> &Resilience {
        &self.resilience
    }
}

#[async_trait]
impl<L: StockLedger> StockClient for LocalStockClient<L> {
    #[tracing::instrument(skip(self))]
    async fn adjust_stock(
        &self,
        product_id: ProductId,
        quantity: u32,
        direction: Direction,
    ) -> StockOutcome {
        let ledger = &self.ledger;
        let result = self
            .resilience
            .execute(|| async move {
                ledger
                    .adjust(product_id, quantity, direction)
                    .await
                    .map_err(|e| {
                        if e.is_transient() {
                            CallError::transient(e.to_string())
                        } else {
                            CallError::Permanent(e)
                        }
                    })
            })
            .await;

        match result {
            Ok(record) => StockOutcome::Adjusted(record),
            Err(ResilienceError::Rejected(e @ LedgerError::InsufficientStock { .. })) => {
                StockOutcome::InsufficientStock(e.to_string())
            }
            Err(ResilienceError::Rejected(e @ LedgerError::NotFound(_))) => {
                StockOutcome::NotFound(e.to_string())
            }
            Err(err) => StockOutcome::Unavailable(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use common::StockRecord;
    use resilience::{BreakerConfig, BreakerState, ResilienceConfig, RetryPolicy};

    use super::*;
    use crate::memory::InMemoryStockLedger;

    fn resilience(threshold: u32) -> Resilience {
        Resilience::for_dependency(
            "inventory",
            ResilienceConfig::new(
                RetryPolicy::new(3, Duration::from_secs(2)),
                BreakerConfig::new(threshold, Duration::from_secs(60)),
            ),
        )
    }

    /// Ledger whose storage is unreachable.
    #[derive(Default)]
    struct DownLedger {
        calls: AtomicU32,
    }

    #[async_trait]
    impl StockLedger for DownLedger {
        async fn register(&self, _: ProductId, _: i64) -> Result<StockRecord, LedgerError> {
            Err(LedgerError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn get(&self, _: ProductId) -> Result<Option<StockRecord>, LedgerError> {
            Err(LedgerError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn adjust(
            &self,
            _: ProductId,
            _: u32,
            _: Direction,
        ) -> Result<StockRecord, LedgerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(LedgerError::Database(sqlx::Error::PoolTimedOut))
        }
    }

    #[tokio::test]
    async fn maps_ledger_answers_to_outcomes() {
        let ledger = InMemoryStockLedger::new();
        ledger.register(ProductId::new(7), 10).await.unwrap();
        let client = LocalStockClient::new(ledger, resilience(5));

        match client
            .adjust_stock(ProductId::new(7), 4, Direction::Outbound)
            .await
        {
            StockOutcome::Adjusted(record) => assert_eq!(record.quantity, 6),
            other => panic!("expected adjusted, got {other:?}"),
        }
        assert!(matches!(
            client
                .adjust_stock(ProductId::new(7), 7, Direction::Outbound)
                .await,
            StockOutcome::InsufficientStock(_)
        ));
        assert!(matches!(
            client
                .adjust_stock(ProductId::new(8), 1, Direction::Inbound)
                .await,
            StockOutcome::NotFound(_)
        ));
        assert_eq!(client.resilience().breaker().consecutive_failures(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn storage_outage_is_retried_and_trips_breaker() {
        let client = LocalStockClient::new(DownLedger::default(), resilience(2));

        for _ in 0..2 {
            assert!(matches!(
                client
                    .adjust_stock(ProductId::new(7), 1, Direction::Outbound)
                    .await,
                StockOutcome::Unavailable(_)
            ));
        }
        assert_eq!(client.ledger().calls.load(Ordering::SeqCst), 6);
        assert_eq!(client.resilience().breaker().state(), BreakerState::Open);

        assert!(matches!(
            client
                .adjust_stock(ProductId::new(7), 1, Direction::Outbound)
                .await,
            StockOutcome::Unavailable(_)
        ));
        assert_eq!(client.ledger().calls.load(Ordering::SeqCst), 6);
    }
}
