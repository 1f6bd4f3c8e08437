//! Product model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;
use crate::types::rating::RatingAggregate;

/// A product in the catalog.
///
/// `quantity` is the stock available for purchase and is shared across all
/// clients; it is decremented (best-effort) after order placement. The rating
/// fields form the incrementally maintained aggregate of approved reviews and
/// are only ever written inside the review-approval transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Unit price; non-negative.
    pub price: Decimal,
    /// Available stock.
    pub quantity: u32,
    pub category: String,
    pub image_url: Option<String>,
    /// Mean rating of approved reviews; zero when `rating_count` is zero.
    pub rating_avg: Decimal,
    /// Number of approved reviews folded into `rating_avg`.
    pub rating_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// The rating aggregate as a value type.
    #[must_use]
    pub const fn rating(&self) -> RatingAggregate {
        RatingAggregate {
            average: self.rating_avg,
            count: self.rating_count,
        }
    }

    /// Whether any stock remains.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.quantity > 0
    }
}

/// Input for creating a product (seeding / back office).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    pub category: String,
    pub image_url: Option<String>,
}
