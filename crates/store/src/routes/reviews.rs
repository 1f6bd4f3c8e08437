//! Review route handlers.
//!
//! Reviews enter unapproved and only show on product pages after moderation.
//! Approval folds the rating into the product aggregate, so it also
//! invalidates the product's cached entry.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use creamline_core::{NewReview, ReviewId};

use crate::error::AppError;
use crate::state::AppState;

/// POST /reviews
pub async fn create(
    State(state): State<AppState>,
    Json(new): Json<NewReview>,
) -> Result<Response, AppError> {
    if new.comment.trim().is_empty() {
        return Err(AppError::BadRequest(
            "review comment is required".to_string(),
        ));
    }

    let review = state.data().create_review(new).await?;
    tracing::info!(review_id = %review.id, product_id = %review.product_id, "review submitted");
    Ok((StatusCode::CREATED, Json(review)).into_response())
}

/// GET /reviews/pending
pub async fn pending(State(state): State<AppState>) -> Result<Response, AppError> {
    let reviews = state.data().pending_reviews().await?;
    Ok(Json(reviews).into_response())
}

/// POST /reviews/{id}/approve
pub async fn approve(
    State(state): State<AppState>,
    Path(id): Path<ReviewId>,
) -> Result<Response, AppError> {
    // Fetch the review first so we know which product's cache to drop;
    // approval is idempotent, so invalidating for a retry is harmless.
    let review = state.data().get_review(id).await?;
    state.data().approve_review(id).await?;
    state.catalog().invalidate(review.product_id).await;
    tracing::info!(review_id = %id, product_id = %review.product_id, "review approved");

    Ok(Json(json!({ "approved": true })).into_response())
}

/// Body for editing a review's comment.
#[derive(Debug, Deserialize)]
pub struct UpdateReviewRequest {
    pub comment: String,
}

/// PATCH /reviews/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<ReviewId>,
    Json(body): Json<UpdateReviewRequest>,
) -> Result<Response, AppError> {
    if body.comment.trim().is_empty() {
        return Err(AppError::BadRequest(
            "review comment is required".to_string(),
        ));
    }

    state.data().update_review_comment(id, &body.comment).await?;
    Ok(Json(json!({ "updated": true })).into_response())
}

/// DELETE /reviews/{id}
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<ReviewId>,
) -> Result<Response, AppError> {
    state.data().delete_review(id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
