//! PostgreSQL ledger tests.
//!
//! These tests start a PostgreSQL container and need a Docker daemon.
//! Run with:
//!
//! ```bash
//! cargo test -p inventory --test postgres_ledger -- --ignored
//! ```

use std::sync::Arc;

use common::{Direction, ProductId};
use futures_util::future::join_all;
use inventory::{LedgerError, PostgresStockLedger, StockLedger};
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();
            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();
            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            sqlx::raw_sql(include_str!(
                "../../../migrations/001_create_stock_and_orders.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Each test works on its own product ids, so tables are not cleared.
async fn get_test_ledger() -> PostgresStockLedger {
    let info = get_container_info().await;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(8)
        .connect(&info.connection_string)
        .await
        .unwrap();
    PostgresStockLedger::new(pool)
}

#[tokio::test]
#[ignore = "requires docker"]
async fn register_adjust_and_read_back() {
    let ledger = get_test_ledger().await;
    let product = ProductId::new(1_001);

    ledger.register(product, 10).await.unwrap();
    let record = ledger
        .adjust(product, 4, Direction::Outbound)
        .await
        .unwrap();
    assert_eq!(record.quantity, 6);

    let stored = ledger.get(product).await.unwrap().unwrap();
    assert_eq!(stored.quantity, 6);
    assert_eq!(stored.id, record.id);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn duplicate_registration_is_rejected() {
    let ledger = get_test_ledger().await;
    let product = ProductId::new(1_002);

    ledger.register(product, 1).await.unwrap();
    assert!(matches!(
        ledger.register(product, 1).await,
        Err(LedgerError::AlreadyRegistered(_))
    ));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn insufficient_stock_rolls_back() {
    let ledger = get_test_ledger().await;
    let product = ProductId::new(1_003);

    ledger.register(product, 2).await.unwrap();
    assert!(matches!(
        ledger.adjust(product, 5, Direction::Outbound).await,
        Err(LedgerError::InsufficientStock { .. })
    ));
    assert_eq!(ledger.get(product).await.unwrap().unwrap().quantity, 2);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn unknown_product_is_not_found() {
    let ledger = get_test_ledger().await;
    assert!(matches!(
        ledger
            .adjust(ProductId::new(1_004), 1, Direction::Inbound)
            .await,
        Err(LedgerError::NotFound(_))
    ));
    assert!(ledger.get(ProductId::new(1_004)).await.unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires docker"]
async fn row_lock_prevents_overselling() {
    let ledger = get_test_ledger().await;
    let product = ProductId::new(1_005);
    ledger.register(product, 5).await.unwrap();

    let tasks = (0..20).map(|_| {
        let ledger = ledger.clone();
        tokio::spawn(async move { ledger.adjust(product, 1, Direction::Outbound).await })
    });
    let adjusted = join_all(tasks)
        .await
        .into_iter()
        .filter(|joined| matches!(joined, Ok(Ok(_))))
        .count();

    assert_eq!(adjusted, 5);
    assert_eq!(ledger.get(product).await.unwrap().unwrap().quantity, 0);
}
