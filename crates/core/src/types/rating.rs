//! Review ratings and the per-product rating aggregate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Rating`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum RatingError {
    /// The value is outside the 1-5 range.
    #[error("rating must be between 1 and 5 (got {got})")]
    OutOfRange {
        /// Rejected value.
        got: u8,
    },
}

/// A single review rating, an integer from 1 to 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Construct a rating, rejecting values outside 1-5.
    ///
    /// # Errors
    ///
    /// Returns [`RatingError::OutOfRange`] for 0 or anything above 5.
    pub const fn new(value: u8) -> Result<Self, RatingError> {
        if value >= 1 && value <= 5 {
            Ok(Self(value))
        } else {
            Err(RatingError::OutOfRange { got: value })
        }
    }

    /// The rating value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = RatingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The `(average, count)` pair maintained on every product.
///
/// The average is the arithmetic mean of exactly `count` approved review
/// ratings. It is maintained incrementally via [`fold`](Self::fold) and is
/// never recomputed by re-averaging stored reviews. The average is kept at
/// full `Decimal` precision so repeated folds stay equal to the true mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RatingAggregate {
    /// Mean of the folded ratings; zero when `count` is zero.
    pub average: Decimal,
    /// Number of approved ratings folded into `average`.
    pub count: u32,
}

impl RatingAggregate {
    /// An aggregate with no ratings.
    pub const EMPTY: Self = Self {
        average: Decimal::ZERO,
        count: 0,
    };

    /// Fold one more rating into the aggregate.
    ///
    /// `new_avg = (avg * count + rating) / (count + 1)`
    #[must_use]
    pub fn fold(self, rating: Rating) -> Self {
        let count = Decimal::from(self.count);
        let new_count = self.count + 1;
        let average = (self.average * count + Decimal::from(rating.value()))
            / Decimal::from(new_count);
        Self {
            average,
            count: new_count,
        }
    }
}
