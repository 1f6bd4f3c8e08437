//! Monetary helpers shared by the cart and checkout paths.
//!
//! All monetary amounts are [`rust_decimal::Decimal`] values in the store
//! currency. Amounts that reach a customer or an order record are rounded to
//! 2 decimal places with [`RoundingStrategy::MidpointAwayFromZero`]
//! (round-half-away-from-zero); intermediate arithmetic keeps full precision.

use rust_decimal::{Decimal, RoundingStrategy};

/// Sales tax rate applied at checkout (10%).
pub const TAX_RATE: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

/// Number of decimal places kept on customer-facing amounts.
pub const MONEY_SCALE: u32 = 2;

/// Round a monetary amount to 2 decimal places, half away from zero.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Unrounded line total for `quantity` units at `price`.
#[must_use]
pub fn line_total(price: Decimal, quantity: u32) -> Decimal {
    price * Decimal::from(quantity)
}
