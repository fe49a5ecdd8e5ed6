use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::OrderId;
use parking_lot::RwLock;

use super::OrderRepository;
use crate::error::RepositoryError;
use crate::order::{NewOrder, Order, OrderState};

#[derive(Debug, Default)]
struct InMemoryOrderState {
    orders: HashMap<OrderId, Order>,
    next_id: i64,
    fail_on_insert: bool,
    fail_on_update: bool,
}

/// In-memory order repository for tests and single-process runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderRepository {
    state: Arc<RwLock<InMemoryOrderState>>,
}

impl InMemoryOrderRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every insert fail until switched back.
    pub fn set_fail_on_insert(&self, fail: bool) {
        self.state.write().fail_on_insert = fail;
    }

    /// Makes every state update fail until switched back.
    pub fn set_fail_on_update(&self, fail: bool) {
        self.state.write().fail_on_update = fail;
    }

    /// Returns the number of stored orders.
    pub fn order_count(&self) -> usize {
        self.state.read().orders.len()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn insert(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let mut state = self.state.write();
        if state.fail_on_insert {
            return Err(RepositoryError::Storage("insert rejected".to_string()));
        }

        state.next_id += 1;
        let order = order.into_order(OrderId::new(state.next_id), Utc::now());
        state.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.state.read().orders.get(&id).cloned())
    }

    async fn update_state(
        &self,
        id: OrderId,
        new_state: OrderState,
    ) -> Result<Order, RepositoryError> {
        let mut state = self.state.write();
        if state.fail_on_update {
            return Err(RepositoryError::Storage("update rejected".to_string()));
        }

        let order = state
            .orders
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound(id))?;
        order.state = new_state;
        order.updated_at = Utc::now();
        Ok(order.clone())
    }
}

#[cfg(test)]
mod tests {
    use common::ProductId;

    use super::*;

    fn new_order(quantity: i64) -> NewOrder {
        NewOrder::new(ProductId::new(7), quantity).unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let repo = InMemoryOrderRepository::new();

        let first = repo.insert(new_order(1)).await.unwrap();
        let second = repo.insert(new_order(2)).await.unwrap();

        assert_eq!(first.id, OrderId::new(1));
        assert_eq!(second.id, OrderId::new(2));
        assert_eq!(second.state, OrderState::Pending);
        assert_eq!(repo.order_count(), 2);
    }

    #[tokio::test]
    async fn test_get_and_update_state() {
        let repo = InMemoryOrderRepository::new();
        let order = repo.insert(new_order(4)).await.unwrap();

        let updated = repo
            .update_state(order.id, OrderState::Cancelled)
            .await
            .unwrap();
        assert_eq!(updated.state, OrderState::Cancelled);
        assert_eq!(updated.quantity, 4);

        let loaded = repo.get(order.id).await.unwrap().unwrap();
        assert_eq!(loaded, updated);
    }

    #[tokio::test]
    async fn test_missing_order() {
        let repo = InMemoryOrderRepository::new();

        assert!(repo.get(OrderId::new(9)).await.unwrap().is_none());
        assert!(matches!(
            repo.update_state(OrderId::new(9), OrderState::Completed).await,
            Err(RepositoryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_fault_injection() {
        let repo = InMemoryOrderRepository::new();
        let order = repo.insert(new_order(1)).await.unwrap();

        repo.set_fail_on_insert(true);
        assert!(repo.insert(new_order(1)).await.is_err());
        assert_eq!(repo.order_count(), 1);

        repo.set_fail_on_update(true);
        assert!(
            repo.update_state(order.id, OrderState::Completed)
                .await
                .is_err()
        );
        assert_eq!(
            repo.get(order.id).await.unwrap().unwrap().state,
            OrderState::Pending
        );
    }
}
