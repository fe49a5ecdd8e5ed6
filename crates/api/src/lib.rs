//! HTTP API server with observability for the order fulfillment services.
//!
//! Exposes order creation and cancellation through the order saga and,
//! when the stock ledger runs in-process, the inventory endpoints the saga's
//! remote stock client speaks to. Structured logging comes from tracing and
//! metrics are exported for Prometheus.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{get, patch, post};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use state::AppState;

/// Creates the Axum application router with all routes and shared state.
///
/// Every route except `/health` and `/metrics` requires a service token.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    let mut protected = Router::new()
        .route("/orders", post(routes::orders::create))
        .route("/orders/{id}", patch(routes::orders::update));

    if state.inventory.is_some() {
        protected = protected
            .route("/inventory", post(routes::inventory::register))
            .route("/inventory/{product_id}", patch(routes::inventory::adjust));
    }

    let protected = protected
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_service_token,
        ))
        .with_state(state);

    Router::new()
        .route("/health", get(routes::health::check))
        .merge(protected)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
