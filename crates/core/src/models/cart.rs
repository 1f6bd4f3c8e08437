//! Cart entry and totals models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;
use crate::types::money::line_total;

use super::product::Product;

/// One product line inside a shopping cart.
///
/// `stock` is a snapshot of the product's available quantity taken when the
/// entry was created or last re-added; it is the ceiling for `quantity` until
/// the entry is next mutated. Invariant: `0 < quantity <= stock`. `quantity`
/// is only ever mutated by the cart store's own operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartEntry {
    /// The product id.
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub quantity: u32,
    /// Available stock at the time the entry was created/updated.
    pub stock: u32,
}

impl CartEntry {
    /// Create an entry for `quantity` units of `product`, snapshotting its
    /// current stock.
    #[must_use]
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            image_url: product.image_url.clone(),
            quantity,
            stock: product.quantity,
        }
    }

    /// Unrounded `price * quantity` for this line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        line_total(self.price, self.quantity)
    }
}

/// Monetary totals computed over a cart, each rounded to 2 decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}
