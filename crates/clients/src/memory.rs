//! In-memory catalog for tests and single-process runs.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use common::ProductId;
use parking_lot::RwLock;

use crate::catalog::CatalogClient;
use crate::outcome::CatalogOutcome;

#[derive(Debug, Default)]
struct InMemoryCatalogState {
    products: HashSet<ProductId>,
    unavailable: bool,
    lookups: usize,
}

/// In-memory catalog client.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalogClient {
    state: Arc<RwLock<InMemoryCatalogState>>,
}

impl InMemoryCatalogClient {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog containing the given products.
    pub fn with_products(products: impl IntoIterator<Item = ProductId>) -> Self {
        let catalog = Self::new();
        catalog.state.write().products.extend(products);
        catalog
    }

    /// Adds a product to the catalog.
    pub fn add_product(&self, product_id: ProductId) {
        self.state.write().products.insert(product_id);
    }

    /// Makes every lookup answer `Unavailable` until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.write().unavailable = unavailable;
    }

    /// Returns how many lookups have been made.
    pub fn lookup_count(&self) -> usize {
        self.state.read().lookups
    }
}

#[async_trait]
impl CatalogClient for InMemoryCatalogClient {
    async fn check_product(&self, product_id: ProductId) -> CatalogOutcome {
        let mut state = self.state.write();
        state.lookups += 1;

        if state.unavailable {
            return CatalogOutcome::Unavailable("catalog unreachable".to_string());
        }
        if state.products.contains(&product_id) {
            CatalogOutcome::Exists
        } else {
            CatalogOutcome::NotFound
        }
    }
}
