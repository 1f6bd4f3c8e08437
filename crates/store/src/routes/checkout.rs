//! Checkout route handler.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use creamline_core::UserId;

use crate::checkout::{CheckoutError, CheckoutForm};
use crate::error::AppError;
use crate::state::AppState;

/// POST /cart/{user_id}/checkout
///
/// Validation failures come back as 422 with a per-field error map; a
/// concurrent checkout for the same user as 409. On success the cart is
/// cleared and the stock decrements run detached from this request.
pub async fn place_order(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(form): Json<CheckoutForm>,
) -> Result<Response, AppError> {
    let session = state.carts().session(user_id).await?;
    let mut session = session.lock().await;

    match state.checkout().place_order(&mut session, &form).await {
        Ok(placed) => {
            // Fire-and-forget: the handler never waits on stock decrements.
            drop(placed.stock_sync);
            Ok((
                StatusCode::CREATED,
                Json(json!({ "order_id": placed.order_id })),
            )
                .into_response())
        }
        Err(CheckoutError::Validation(errors)) => Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "errors": errors })),
        )
            .into_response()),
        Err(error @ CheckoutError::EmptyCart) => Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": error.to_string() })),
        )
            .into_response()),
        Err(error @ CheckoutError::InFlight) => Ok((
            StatusCode::CONFLICT,
            Json(json!({ "error": error.to_string() })),
        )
            .into_response()),
        Err(CheckoutError::Create(error)) => Err(AppError::Data(error)),
    }
}
