//! Product route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use creamline_core::{NewProduct, ProductId};

use crate::error::AppError;
use crate::state::AppState;

/// GET /products
pub async fn index(State(state): State<AppState>) -> Result<Response, AppError> {
    let products = state.catalog().listing().await?;
    Ok(Json(products).into_response())
}

/// GET /products/{id}
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Response, AppError> {
    let product = state.catalog().product(id).await?;
    Ok(Json(product).into_response())
}

/// GET /products/{id}/reviews
pub async fn reviews(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Response, AppError> {
    // 404 for unknown products rather than an empty list.
    state.catalog().product(id).await?;
    let reviews = state.catalog().reviews(id).await?;
    Ok(Json(reviews).into_response())
}

/// POST /products
pub async fn create(
    State(state): State<AppState>,
    Json(new): Json<NewProduct>,
) -> Result<Response, AppError> {
    if new.name.trim().is_empty() {
        return Err(AppError::BadRequest("product name is required".to_string()));
    }
    if new.price.is_sign_negative() {
        return Err(AppError::BadRequest(
            "product price cannot be negative".to_string(),
        ));
    }

    let product = state.catalog().create_product(new).await?;
    tracing::info!(product_id = %product.id, name = %product.name, "product created");
    Ok((StatusCode::CREATED, Json(product)).into_response())
}
