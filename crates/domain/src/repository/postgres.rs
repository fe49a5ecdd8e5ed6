use async_trait::async_trait;
use common::{OrderId, ProductId};
use sqlx::{PgPool, Row, postgres::PgRow};

use super::OrderRepository;
use crate::error::RepositoryError;
use crate::order::{NewOrder, Order, OrderState};

/// PostgreSQL-backed order repository.
///
/// The `orders` table is created by the shared migration set that
/// `PostgresStockLedger::run_migrations` applies.
#[derive(Clone)]
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    /// Creates a new PostgreSQL order repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_order(row: PgRow) -> Result<Order, RepositoryError> {
        let quantity: i64 = row.try_get("quantity")?;
        let state: String = row.try_get("state")?;

        Ok(Order {
            id: OrderId::new(row.try_get("id")?),
            product_id: ProductId::new(row.try_get("product_id")?),
            quantity: u32::try_from(quantity)
                .map_err(|_| RepositoryError::Storage(format!("stored quantity {quantity}")))?,
            state: state
                .parse::<OrderState>()
                .map_err(|e| RepositoryError::Storage(e.to_string()))?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn insert(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let row = sqlx::query(
            r#"
            INSERT INTO orders (product_id, quantity, state, created_at, updated_at)
            VALUES ($1, $2, $3, NOW(), NOW())
            RETURNING id, product_id, quantity, state, created_at, updated_at
            "#,
        )
        .bind(order.product_id().as_i64())
        .bind(i64::from(order.quantity()))
        .bind(OrderState::Pending.as_str())
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_order(row)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, product_id, quantity, state, created_at, updated_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn update_state(
        &self,
        id: OrderId,
        state: OrderState,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query(
            r#"
            UPDATE orders
            SET state = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, product_id, quantity, state, created_at, updated_at
            "#,
        )
        .bind(id.as_i64())
        .bind(state.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound(id))?;

        Self::row_to_order(row)
    }
}
