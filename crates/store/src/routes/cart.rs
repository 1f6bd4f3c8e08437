//! Cart route handlers.
//!
//! Every mutation responds with the full cart state so clients never need a
//! follow-up read. Stock-limit rejections are business outcomes, not server
//! faults: they come back as 422 with a message and the number of units still
//! addable, and the cart body reflects the unchanged state.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use creamline_core::{CartEntry, CartTotals, ProductId, UserId};

use crate::cart::{CartError, CartSession, CartUpdate};
use crate::error::AppError;
use crate::state::AppState;

/// Cart state returned by every cart endpoint.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_to_add: Option<u32>,
    pub items: Vec<CartEntry>,
    pub totals: CartTotals,
}

impl CartResponse {
    fn ok(session: &CartSession, message: Option<String>, available_to_add: Option<u32>) -> Self {
        Self {
            success: true,
            message,
            available_to_add,
            items: session.entries().to_vec(),
            totals: session.totals(),
        }
    }

    fn rejected(session: &CartSession, error: &CartError) -> Self {
        Self {
            success: false,
            message: Some(error.to_string()),
            available_to_add: error.available_to_add(),
            items: session.entries().to_vec(),
            totals: session.totals(),
        }
    }
}

/// Body for adding a product to the cart.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Body for setting an entry's quantity.
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: u32,
}

/// GET /cart/{user_id}
pub async fn show(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Response, AppError> {
    let session = state.carts().session(user_id).await?;
    let session = session.lock().await;
    Ok(Json(CartResponse::ok(&session, None, None)).into_response())
}

/// POST /cart/{user_id}/items
pub async fn add(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(body): Json<AddItemRequest>,
) -> Result<Response, AppError> {
    // Fetch the product uncached: the stock snapshot written into the cart
    // must be as fresh as we can get it.
    let product = state.data().get_product(body.product_id).await?;

    let session = state.carts().session(user_id).await?;
    let mut session = session.lock().await;

    match session.add(&product, body.quantity) {
        Ok(outcome) => {
            let available = outcome.available_to_add();
            let response = CartResponse::ok(&session, outcome.message(), available);
            Ok(Json(response).into_response())
        }
        Err(error) => Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(CartResponse::rejected(&session, &error)),
        )
            .into_response()),
    }
}

/// PUT /cart/{user_id}/items/{product_id}
pub async fn update(
    State(state): State<AppState>,
    Path((user_id, product_id)): Path<(UserId, ProductId)>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<Response, AppError> {
    let session = state.carts().session(user_id).await?;
    let mut session = session.lock().await;

    match session.update_quantity(product_id, body.quantity) {
        Ok(CartUpdate::Updated { .. } | CartUpdate::Removed) => {
            Ok(Json(CartResponse::ok(&session, None, None)).into_response())
        }
        Err(CartError::NotInCart) => {
            drop(session);
            Err(AppError::NotFound("cart item".to_string()))
        }
        Err(error) => Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(CartResponse::rejected(&session, &error)),
        )
            .into_response()),
    }
}

/// DELETE /cart/{user_id}/items/{product_id}
pub async fn remove(
    State(state): State<AppState>,
    Path((user_id, product_id)): Path<(UserId, ProductId)>,
) -> Result<Response, AppError> {
    let session = state.carts().session(user_id).await?;
    let mut session = session.lock().await;

    // Removing an absent entry is a no-op, not an error.
    session.remove(product_id);
    Ok(Json(CartResponse::ok(&session, None, None)).into_response())
}

/// DELETE /cart/{user_id}
pub async fn clear(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Response, AppError> {
    let session = state.carts().session(user_id).await?;
    let mut session = session.lock().await;

    session.clear();
    Ok(Json(CartResponse::ok(&session, None, None)).into_response())
}

/// Body returned by the restore endpoint.
#[derive(Debug, Serialize)]
pub struct RestoreResponse {
    pub restored: bool,
    pub items: Vec<CartEntry>,
    pub totals: CartTotals,
}

/// POST /cart/{user_id}/restore
///
/// Seeds the local cart from the remote snapshot; a no-op unless the local
/// cart is empty and a non-empty snapshot exists.
pub async fn restore(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Response, AppError> {
    let session = state.carts().session(user_id).await?;
    let mut session = session.lock().await;

    let restored = session.restore_remote().await;
    let response = RestoreResponse {
        restored,
        items: session.entries().to_vec(),
        totals: session.totals(),
    };
    Ok(Json(response).into_response())
}
