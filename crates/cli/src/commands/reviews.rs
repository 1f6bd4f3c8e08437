//! Review moderation commands.

use creamline_core::ReviewId;
use creamline_store::datastore::DataService;

use super::{CommandError, connect};

/// Print the moderation queue, oldest first.
pub async fn list_pending() -> Result<(), CommandError> {
    let data = connect().await?;
    let reviews = data.pending_reviews().await?;

    if reviews.is_empty() {
        tracing::info!("No reviews awaiting moderation");
        return Ok(());
    }

    #[allow(clippy::print_stdout)]
    for review in reviews {
        println!(
            "{}  product={}  rating={}  by {}: {}",
            review.id,
            review.product_id,
            review.rating.value(),
            review.user_name,
            review.comment
        );
    }

    Ok(())
}

/// Approve a pending review, folding its rating into the product aggregate.
pub async fn approve(id: &str) -> Result<(), CommandError> {
    let id: ReviewId = id
        .parse()
        .map_err(|_| CommandError::InvalidArgument(format!("not a review id: {id}")))?;

    let data = connect().await?;
    data.approve_review(id).await?;
    tracing::info!(review_id = %id, "review approved");

    Ok(())
}
