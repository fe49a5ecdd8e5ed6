//! Saga coordinator for order creation and order state changes.

use std::time::Instant;

use clients::{CatalogClient, CatalogOutcome, StockClient, StockOutcome};
use common::{Direction, OrderId, ProductId};
use domain::{NewOrder, Order, OrderRepository, OrderState};

use crate::error::SagaError;
use crate::order_fulfillment;
use crate::order_locks::OrderLocks;
use crate::state::SagaState;

/// Bookkeeping for one saga execution: current state, current step and
/// the metrics emitted when it ends.
struct SagaRun {
    flow: &'static str,
    state: SagaState,
    step: &'static str,
    started: Instant,
}

impl SagaRun {
    fn start(flow: &'static str) -> Self {
        metrics::counter!("saga_executions_total", "flow" => flow).increment(1);
        Self {
            flow,
            state: SagaState::Running,
            step: "",
            started: Instant::now(),
        }
    }

    fn step(&mut self, step: &'static str) {
        self.step = step;
        tracing::info!(flow = self.flow, step, "saga step started");
    }

    fn begin_compensation(&mut self) {
        if self.state.can_compensate() {
            self.state = SagaState::Compensating;
            tracing::warn!(
                flow = self.flow,
                failed_step = self.step,
                "saga compensation started"
            );
        }
    }

    fn finish<T>(mut self, result: &Result<T, SagaError>) {
        let duration = self.started.elapsed().as_secs_f64();
        metrics::histogram!("saga_duration_seconds", "flow" => self.flow).record(duration);

        match result {
            Ok(_) => {
                self.state = SagaState::Completed;
                metrics::counter!("saga_completed_total", "flow" => self.flow).increment(1);
                tracing::info!(flow = self.flow, duration, "saga completed successfully");
            }
            Err(e) => {
                self.state = if self.state == SagaState::Compensating {
                    SagaState::Failed
                } else {
                    SagaState::Aborted
                };
                let kind = e.kind().as_str();
                metrics::counter!("saga_failed_total", "flow" => self.flow, "kind" => kind)
                    .increment(1);
                tracing::warn!(
                    flow = self.flow,
                    step = self.step,
                    state = %self.state,
                    kind,
                    error = %e,
                    "saga failed"
                );
            }
        }
    }
}

/// Orchestrates order creation and order state changes across the catalog,
/// the stock collaborator and the order repository.
///
/// Steps run strictly in sequence. Only an outbound adjustment known to have
/// succeeded is ever compensated.
pub struct OrderSaga<C, S, R>
where
    C: CatalogClient,
    S: StockClient,
    R: OrderRepository,
{
    catalog: C,
    stock: S,
    orders: R,
    order_locks: OrderLocks,
}

impl<C, S, R> OrderSaga<C, S, R>
where
    C: CatalogClient,
    S: StockClient,
    R: OrderRepository,
{
    /// Creates a new saga coordinator.
    pub fn new(catalog: C, stock: S, orders: R) -> Self {
        Self {
            catalog,
            stock,
            orders,
            order_locks: OrderLocks::new(),
        }
    }

    /// Returns the catalog client.
    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Returns the stock client.
    pub fn stock(&self) -> &S {
        &self.stock
    }

    /// Returns the order repository.
    pub fn orders(&self) -> &R {
        &self.orders
    }

    /// Creates an order: validate product, reserve stock, persist.
    ///
    /// If persisting fails the reservation is returned on a best-effort
    /// basis and the caller receives [`SagaError::OrderReverted`] whether
    /// or not the return succeeded.
    #[tracing::instrument(skip(self), fields(flow = order_fulfillment::FLOW_CREATE_ORDER))]
    pub async fn create_order(
        &self,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<Order, SagaError> {
        let mut run = SagaRun::start(order_fulfillment::FLOW_CREATE_ORDER);
        let result = self.run_create(&mut run, product_id, quantity).await;
        run.finish(&result);
        result
    }

    async fn run_create(
        &self,
        run: &mut SagaRun,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<Order, SagaError> {
        let new_order = NewOrder::new(product_id, quantity)?;

        // 1. Validate product
        run.step(order_fulfillment::STEP_VALIDATE_PRODUCT);
        match self.catalog.check_product(product_id).await {
            CatalogOutcome::Exists => {}
            CatalogOutcome::NotFound => return Err(SagaError::ProductNotFound(product_id)),
            CatalogOutcome::Unavailable(reason) => {
                return Err(SagaError::CatalogUnavailable(reason));
            }
        }

        // 2. Reserve stock
        run.step(order_fulfillment::STEP_RESERVE_STOCK);
        let reserved = new_order.quantity();
        match self
            .stock
            .adjust_stock(product_id, reserved, Direction::Outbound)
            .await
        {
            StockOutcome::Adjusted(record) => {
                tracing::info!(%product_id, reserved, remaining = record.quantity, "stock reserved");
            }
            StockOutcome::InsufficientStock(detail) => {
                return Err(SagaError::InsufficientStock(detail));
            }
            StockOutcome::NotFound(detail) => {
                return Err(SagaError::StockNotFound { product_id, detail });
            }
            StockOutcome::Unavailable(reason) => {
                return Err(SagaError::InventoryUnavailable(reason));
            }
        }

        // 3. Persist order
        run.step(order_fulfillment::STEP_PERSIST_ORDER);
        match self.orders.insert(new_order).await {
            Ok(order) => {
                tracing::info!(order_id = %order.id, %product_id, "order created");
                Ok(order)
            }
            Err(source) => {
                tracing::error!(%product_id, error = %source, "order could not be stored");
                run.begin_compensation();
                self.return_reservation(product_id, reserved).await;
                Err(SagaError::OrderReverted { source })
            }
        }
    }

    /// Best-effort inbound adjustment undoing a reservation. A failure is
    /// only logged as a stock inconsistency alert.
    async fn return_reservation(&self, product_id: ProductId, quantity: u32) {
        tracing::info!(
            step = order_fulfillment::STEP_RESTORE_STOCK,
            %product_id,
            quantity,
            "returning reserved stock"
        );
        match self
            .stock
            .adjust_stock(product_id, quantity, Direction::Inbound)
            .await
        {
            StockOutcome::Adjusted(record) => {
                metrics::counter!("saga_compensations_total", "outcome" => "restored")
                    .increment(1);
                tracing::info!(%product_id, quantity, restored = record.quantity, "reserved stock returned");
            }
            outcome => {
                metrics::counter!("saga_compensations_total", "outcome" => "failed").increment(1);
                tracing::error!(
                    alert = "stock_inconsistent",
                    %product_id,
                    quantity,
                    outcome = outcome.label(),
                    ?outcome,
                    "could not return reserved stock, manual correction required"
                );
            }
        }
    }

    /// Changes an order's state.
    ///
    /// Cancelling returns the order's quantity to stock first; if that
    /// fails the order keeps its current state. If the state cannot be
    /// saved after stock was returned, the stock is not taken back.
    ///
    /// Changes of the same order run one at a time, so a cancellation
    /// returns its stock exactly once.
    #[tracing::instrument(skip(self), fields(flow = order_fulfillment::FLOW_MODIFY_ORDER))]
    pub async fn modify_order(
        &self,
        order_id: OrderId,
        new_state: OrderState,
    ) -> Result<Order, SagaError> {
        let _order_guard = self.order_locks.lock(order_id).await;
        let mut run = SagaRun::start(order_fulfillment::FLOW_MODIFY_ORDER);
        let result = self.run_modify(&mut run, order_id, new_state).await;
        run.finish(&result);
        result
    }

    async fn run_modify(
        &self,
        run: &mut SagaRun,
        order_id: OrderId,
        new_state: OrderState,
    ) -> Result<Order, SagaError> {
        // 1. Load and validate
        run.step(order_fulfillment::STEP_VALIDATE_TRANSITION);
        let order = self
            .orders
            .get(order_id)
            .await?
            .ok_or(SagaError::OrderNotFound(order_id))?;
        let transition = order.state.transition_to(new_state)?;

        // 2. Return stock on cancellation
        if transition.is_cancellation() {
            run.step(order_fulfillment::STEP_RESTORE_STOCK);
            let product_id = order.product_id;
            match self
                .stock
                .adjust_stock(product_id, order.quantity, Direction::Inbound)
                .await
            {
                StockOutcome::Adjusted(record) => {
                    metrics::counter!("saga_compensations_total", "outcome" => "restored")
                        .increment(1);
                    tracing::info!(
                        %order_id,
                        %product_id,
                        quantity = order.quantity,
                        restored = record.quantity,
                        "stock returned for cancelled order"
                    );
                }
                StockOutcome::InsufficientStock(detail) => {
                    return Err(SagaError::InsufficientStock(detail));
                }
                StockOutcome::NotFound(detail) => {
                    return Err(SagaError::StockNotFound { product_id, detail });
                }
                StockOutcome::Unavailable(reason) => {
                    return Err(SagaError::InventoryUnavailable(reason));
                }
            }
        }

        // 3. Persist new state
        run.step(order_fulfillment::STEP_UPDATE_STATE);
        let updated = self
            .orders
            .update_state(order_id, new_state)
            .await
            .inspect_err(|e| {
                if transition.is_cancellation() {
                    tracing::error!(
                        alert = "stock_inconsistent",
                        %order_id,
                        error = %e,
                        "stock returned but order state not saved"
                    );
                }
            })?;

        tracing::info!(
            %order_id,
            from = %transition.from,
            to = %transition.to,
            "order state changed"
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use clients::InMemoryCatalogClient;
    use domain::{InMemoryOrderRepository, OrderError};
    use inventory::{InMemoryStockLedger, LocalStockClient, StockLedger};
    use resilience::{Resilience, ResilienceConfig};

    use super::*;
    use crate::error::ErrorKind;

    type TestSaga =
        OrderSaga<InMemoryCatalogClient, LocalStockClient<InMemoryStockLedger>, InMemoryOrderRepository>;

    async fn saga_with_stock(product: i64, quantity: i64) -> TestSaga {
        let ledger = InMemoryStockLedger::new();
        ledger
            .register(ProductId::new(product), quantity)
            .await
            .unwrap();
        OrderSaga::new(
            InMemoryCatalogClient::with_products([ProductId::new(product)]),
            LocalStockClient::new(
                ledger,
                Resilience::for_dependency("inventory", ResilienceConfig::default()),
            ),
            InMemoryOrderRepository::new(),
        )
    }

    async fn stock_of(saga: &TestSaga, product: i64) -> i64 {
        saga.stock()
            .ledger()
            .get(ProductId::new(product))
            .await
            .unwrap()
            .unwrap()
            .quantity
    }

    #[tokio::test]
    async fn test_invalid_quantity_touches_nothing() {
        let saga = saga_with_stock(7, 10).await;

        let err = saga.create_order(ProductId::new(7), 0).await.unwrap_err();

        assert!(matches!(
            err,
            SagaError::Order(OrderError::InvalidQuantity { quantity: 0 })
        ));
        assert_eq!(saga.catalog().lookup_count(), 0);
        assert_eq!(stock_of(&saga, 7).await, 10);
    }

    #[tokio::test]
    async fn test_unknown_product_skips_reservation() {
        let saga = saga_with_stock(7, 10).await;

        let err = saga.create_order(ProductId::new(8), 1).await.unwrap_err();

        assert!(matches!(err, SagaError::ProductNotFound(_)));
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(stock_of(&saga, 7).await, 10);
        assert_eq!(saga.orders().order_count(), 0);
    }

    #[tokio::test]
    async fn test_product_without_stock_record() {
        let saga = saga_with_stock(7, 10).await;
        saga.catalog().add_product(ProductId::new(8));

        let err = saga.create_order(ProductId::new(8), 1).await.unwrap_err();

        assert!(matches!(err, SagaError::StockNotFound { .. }));
        assert_eq!(saga.orders().order_count(), 0);
    }

    #[tokio::test]
    async fn test_same_state_is_a_no_op_transition() {
        let saga = saga_with_stock(7, 10).await;
        let order = saga.create_order(ProductId::new(7), 3).await.unwrap();

        let same = saga
            .modify_order(order.id, OrderState::Pending)
            .await
            .unwrap();

        assert_eq!(same.state, OrderState::Pending);
        assert_eq!(stock_of(&saga, 7).await, 7);
    }

    #[tokio::test]
    async fn test_cancelling_twice_returns_stock_once() {
        let saga = saga_with_stock(7, 10).await;
        let order = saga.create_order(ProductId::new(7), 3).await.unwrap();

        saga.modify_order(order.id, OrderState::Cancelled)
            .await
            .unwrap();
        saga.modify_order(order.id, OrderState::Cancelled)
            .await
            .unwrap();

        assert_eq!(stock_of(&saga, 7).await, 10);
    }

    #[tokio::test]
    async fn test_completing_leaves_stock_alone() {
        let saga = saga_with_stock(7, 10).await;
        let order = saga.create_order(ProductId::new(7), 3).await.unwrap();

        let completed = saga
            .modify_order(order.id, OrderState::Completed)
            .await
            .unwrap();

        assert_eq!(completed.state, OrderState::Completed);
        assert_eq!(stock_of(&saga, 7).await, 7);
    }
}
