//! Shared application state and its construction from configuration.

use std::sync::Arc;

use clients::{
    CatalogClient, ClientError, HttpCatalogClient, HttpStockClient, ServiceToken, StockClient,
};
use domain::{InMemoryOrderRepository, OrderRepository, PostgresOrderRepository};
use inventory::{
    InMemoryStockLedger, InventoryService, LedgerError, LocalStockClient, PostgresStockLedger,
    StockLedger,
};
use resilience::Resilience;
use saga::OrderSaga;
use thiserror::Error;

use crate::config::Config;

pub type SharedCatalog = Arc<dyn CatalogClient>;
pub type SharedStock = Arc<dyn StockClient>;
pub type SharedOrders = Arc<dyn OrderRepository>;
pub type SharedLedger = Arc<dyn StockLedger>;

/// The order saga as wired by the server.
pub type AppSaga = OrderSaga<SharedCatalog, SharedStock, SharedOrders>;

/// The inventory service as wired by the server.
pub type AppInventory = InventoryService<SharedLedger, SharedCatalog>;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub saga: AppSaga,
    /// Present when the stock ledger lives in this process.
    pub inventory: Option<AppInventory>,
    /// Secret used to verify incoming service tokens.
    pub secret: Vec<u8>,
}

/// Errors raised while wiring the application at start-up.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("SECRET_KEY must be set")]
    MissingSecret,

    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl AppState {
    /// Creates application state from already built components.
    pub fn new(saga: AppSaga, inventory: Option<AppInventory>, secret: impl Into<Vec<u8>>) -> Self {
        Self {
            saga,
            inventory,
            secret: secret.into(),
        }
    }

    /// Wires clients, storage and services from configuration.
    ///
    /// Each dependency gets its own circuit breaker, shared by every request.
    pub async fn from_config(config: &Config) -> Result<Self, StartupError> {
        let secret = config
            .secret_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(StartupError::MissingSecret)?
            .as_bytes();
        let token = ServiceToken::issue(&config.service_subject, secret)?;
        let resilience = config.resilience();

        let catalog: SharedCatalog = Arc::new(HttpCatalogClient::new(
            &config.catalog_url,
            token.clone(),
            Resilience::for_dependency("catalog", resilience),
            config.http_timeout,
        )?);

        let (ledger, orders): (SharedLedger, SharedOrders) = match &config.database_url {
            Some(url) => {
                let pool = sqlx::postgres::PgPoolOptions::new()
                    .max_connections(10)
                    .connect(url)
                    .await?;
                let ledger = PostgresStockLedger::new(pool.clone());
                ledger.run_migrations().await?;
                tracing::info!("using PostgreSQL storage");
                (
                    Arc::new(ledger),
                    Arc::new(PostgresOrderRepository::new(pool)),
                )
            }
            None => {
                tracing::warn!("DATABASE_URL not set, using in-memory storage");
                (
                    Arc::new(InMemoryStockLedger::new()),
                    Arc::new(InMemoryOrderRepository::new()),
                )
            }
        };

        let inventory_resilience = Resilience::for_dependency("inventory", resilience);
        let (stock, inventory): (SharedStock, Option<AppInventory>) = match &config.inventory_url {
            Some(url) => {
                tracing::info!(%url, "using remote inventory");
                (
                    Arc::new(HttpStockClient::new(
                        url,
                        token,
                        inventory_resilience,
                        config.http_timeout,
                    )?),
                    None,
                )
            }
            None => (
                Arc::new(LocalStockClient::new(ledger.clone(), inventory_resilience)),
                Some(InventoryService::new(ledger, catalog.clone())),
            ),
        };

        Ok(Self::new(
            OrderSaga::new(catalog, stock, orders),
            inventory,
            secret,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_secret_is_refused() {
        let config = Config::default();
        assert!(matches!(
            AppState::from_config(&config).await,
            Err(StartupError::MissingSecret)
        ));

        let empty = Config {
            secret_key: Some(String::new()),
            ..Config::default()
        };
        assert!(matches!(
            AppState::from_config(&empty).await,
            Err(StartupError::MissingSecret)
        ));
    }

    #[tokio::test]
    async fn test_in_process_wiring_mounts_inventory() {
        let state = AppState::from_config(&Config::for_development())
            .await
            .unwrap();
        assert!(state.inventory.is_some());
        assert_eq!(state.secret, Config::DEVELOPMENT_SECRET.as_bytes());
    }
}
