//! Order route handlers.
//!
//! Orders are immutable snapshots; the only mutation exposed is the
//! administrative status transition, validated against the order state
//! machine (invalid transitions come back as 409).

use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use creamline_core::{OrderId, OrderStatus, UserId};

use crate::error::AppError;
use crate::state::AppState;

/// GET /users/{user_id}/orders
pub async fn for_user(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Response, AppError> {
    let orders = state.data().orders_for_user(user_id).await?;
    Ok(Json(orders).into_response())
}

/// GET /orders/{id}
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Response, AppError> {
    let order = state.data().get_order(id).await?;
    Ok(Json(order).into_response())
}

/// Body for the status transition endpoint.
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: OrderStatus,
}

/// PUT /orders/{id}/status
pub async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(body): Json<SetStatusRequest>,
) -> Result<Response, AppError> {
    let order = state.data().set_order_status(id, body.status).await?;
    tracing::info!(order_id = %id, status = %order.status, "order status updated");
    Ok(Json(order).into_response())
}
