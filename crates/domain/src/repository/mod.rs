//! Order persistence.

mod memory;
mod postgres;

pub use memory::InMemoryOrderRepository;
pub use postgres::PostgresOrderRepository;

use std::sync::Arc;

use async_trait::async_trait;
use common::OrderId;

use crate::error::RepositoryError;
use crate::order::{NewOrder, Order, OrderState};

/// Storage for order records.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persists a new order in `Pending` state and assigns its id.
    async fn insert(&self, order: NewOrder) -> Result<Order, RepositoryError>;

    /// Loads an order by id.
    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// Overwrites an order's state and returns the updated record.
    async fn update_state(&self, id: OrderId, state: OrderState)
    -> Result<Order, RepositoryError>;
}

#[async_trait]
impl<T: OrderRepository + ?Sized> OrderRepository for Arc<T> {
    async fn insert(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        (**self).insert(order).await
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        (**self).get(id).await
    }

    async fn update_state(
        &self,
        id: OrderId,
        state: OrderState,
    ) -> Result<Order, RepositoryError> {
        (**self).update_state(id, state).await
    }
}
