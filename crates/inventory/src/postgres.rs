use async_trait::async_trait;
use common::{Direction, ProductId, StockRecord, StockRecordId};
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::error::LedgerError;
use crate::ledger::{StockLedger, apply_adjustment, validate_initial_quantity};

/// PostgreSQL-backed stock ledger.
///
/// Adjustments run in a transaction that locks the product row with
/// `SELECT ... FOR UPDATE` before checking availability.
#[derive(Clone)]
pub struct PostgresStockLedger {
    pool: PgPool,
}

impl PostgresStockLedger {
    /// Creates a new PostgreSQL stock ledger.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<(), LedgerError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_record(row: PgRow) -> Result<StockRecord, LedgerError> {
        Ok(StockRecord {
            id: StockRecordId::new(row.try_get("id")?),
            product_id: ProductId::new(row.try_get("product_id")?),
            quantity: row.try_get("quantity")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl StockLedger for PostgresStockLedger {
    async fn register(
        &self,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<StockRecord, LedgerError> {
        validate_initial_quantity(quantity)?;

        let row = sqlx::query(
            r#"
            INSERT INTO stock (product_id, quantity, updated_at)
            VALUES ($1, $2, NOW())
            RETURNING id, product_id, quantity, updated_at
            "#,
        )
        .bind(product_id.as_i64())
        .bind(quantity)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("unique_stock_product")
            {
                return LedgerError::AlreadyRegistered(product_id);
            }
            LedgerError::Database(e)
        })?;

        Self::row_to_record(row)
    }

    async fn get(&self, product_id: ProductId) -> Result<Option<StockRecord>, LedgerError> {
        let row = sqlx::query(
            "SELECT id, product_id, quantity, updated_at FROM stock WHERE product_id = $1",
        )
        .bind(product_id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_record).transpose()
    }

    async fn adjust(
        &self,
        product_id: ProductId,
        quantity: u32,
        direction: Direction,
    ) -> Result<StockRecord, LedgerError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            SELECT id, product_id, quantity, updated_at
            FROM stock
            WHERE product_id = $1
            FOR UPDATE
            "#,
        )
        .bind(product_id.as_i64())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(LedgerError::NotFound(product_id))?;

        let mut record = Self::row_to_record(row)?;
        // Dropping the transaction on rejection rolls back and releases the lock.
        apply_adjustment(&mut record, quantity, direction)?;

        sqlx::query("UPDATE stock SET quantity = $2, updated_at = $3 WHERE id = $1")
            .bind(record.id.as_i64())
            .bind(record.quantity)
            .bind(record.updated_at)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(record)
    }
}
