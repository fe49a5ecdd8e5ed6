//! Order creation and state change endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{OrderId, ProductId};
use domain::{Order, OrderRepository, OrderState};
use saga::SagaError;
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub product_id: i64,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderRequest {
    pub state: String,
}

/// POST /orders: validate the product, reserve stock, store the order.
#[tracing::instrument(skip(state))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let order = state
        .saga
        .create_order(ProductId::new(req.product_id), req.quantity)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// PATCH /orders/{id}: change an order's state, returning stock on
/// cancellation.
#[tracing::instrument(skip(state))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateOrderRequest>,
) -> Result<Json<Order>, ApiError> {
    let order_id = OrderId::new(id);
    let target = match req.state.parse::<OrderState>() {
        Ok(target) => target,
        Err(invalid) => {
            // A missing order is reported before an unknown state.
            state
                .saga
                .orders()
                .get(order_id)
                .await
                .map_err(SagaError::from)?
                .ok_or(SagaError::OrderNotFound(order_id))?;
            return Err(SagaError::from(invalid).into());
        }
    };
    let order = state.saga.modify_order(order_id, target).await?;
    Ok(Json(order))
}
