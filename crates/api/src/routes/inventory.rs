//! Stock registration and adjustment endpoints.
//!
//! Mounted only when the stock ledger runs in this process.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use clients::AdjustStockRequest;
use common::{ProductId, StockRecord};
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::{AppInventory, AppState};

#[derive(Debug, Deserialize)]
pub struct RegisterStockRequest {
    pub product_id: i64,
    pub quantity: i64,
}

fn service(state: &AppState) -> Result<&AppInventory, ApiError> {
    state
        .inventory
        .as_ref()
        .ok_or_else(|| ApiError::BadRequest("inventory is not managed by this service".into()))
}

/// POST /inventory: create the stock record for a catalog product.
#[tracing::instrument(skip(state))]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterStockRequest>,
) -> Result<(StatusCode, Json<StockRecord>), ApiError> {
    let record = service(&state)?
        .register_stock(ProductId::new(req.product_id), req.quantity)
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// PATCH /inventory/{product_id}: apply an inbound or outbound adjustment.
#[tracing::instrument(skip(state))]
pub async fn adjust(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<i64>,
    Json(req): Json<AdjustStockRequest>,
) -> Result<Json<StockRecord>, ApiError> {
    let record = service(&state)?
        .adjust_stock(ProductId::new(product_id), req.quantity, req.direction)
        .await?;
    Ok(Json(record))
}
