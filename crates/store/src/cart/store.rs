//! Stock-aware cart store.
//!
//! Maintains the entry list and guarantees that no entry's quantity ever
//! exceeds the stock known at the time of the mutating call. Stock limits and
//! missing entries are expected conditions returned as values, never panics.

use creamline_core::{CartEntry, CartTotals, Product, ProductId, line_total, round_money};
use rust_decimal::Decimal;

use creamline_core::TAX_RATE;

/// Successful outcome of [`CartStore::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartAdd {
    /// The full requested amount was applied; the entry now holds `quantity`.
    Added {
        /// New entry quantity.
        quantity: u32,
    },
    /// Stock did not cover the request; the entry was clamped to its stock
    /// ceiling and only `added` units were actually added.
    Clamped {
        /// Units actually added (also the amount that was available to add).
        added: u32,
    },
}

impl CartAdd {
    /// How many units could still be added when the operation ran.
    /// `None` for a full apply, where no clamping was involved.
    #[must_use]
    pub const fn available_to_add(&self) -> Option<u32> {
        match self {
            Self::Added { .. } => None,
            Self::Clamped { added } => Some(*added),
        }
    }

    /// Informational message for clamped results, shown to the customer as a
    /// non-error notice.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Added { .. } => None,
            Self::Clamped { added } => Some(format!(
                "only {added} more in stock; added {added} to your cart"
            )),
        }
    }
}

/// Successful outcome of [`CartStore::update_quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartUpdate {
    /// Quantity set to the requested value.
    Updated {
        /// New entry quantity.
        quantity: u32,
    },
    /// A zero quantity removed the entry.
    Removed,
}

/// Expected failures of cart mutations.
///
/// These carry the information the caller needs to render the condition
/// inline; none of them leave the cart partially mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    /// The entry already holds every unit the product has in stock.
    #[error("already at maximum available quantity")]
    AtStockCeiling,
    /// No entry exists for the product.
    #[error("item not found in cart")]
    NotInCart,
    /// The requested quantity exceeds the entry's stock snapshot.
    #[error("only {max} available in stock")]
    ExceedsStock {
        /// Maximum allowed quantity for this entry.
        max: u32,
    },
}

impl CartError {
    /// How many units could still be added, for results that report it.
    #[must_use]
    pub const fn available_to_add(&self) -> Option<u32> {
        match self {
            Self::AtStockCeiling => Some(0),
            Self::NotInCart | Self::ExceedsStock { .. } => None,
        }
    }
}

/// An ordered, unique-by-product list of cart entries.
///
/// Purely local and synchronous; persistence and remote mirroring are wired
/// around it by [`CartSession`](super::CartSession). After every operation the
/// invariant `0 < quantity <= stock` holds for every entry.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CartStore {
    entries: Vec<CartEntry>,
}

impl CartStore {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Rebuild a cart from previously persisted entries.
    #[must_use]
    pub fn from_entries(entries: Vec<CartEntry>) -> Self {
        Self { entries }
    }

    /// The entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    /// Whether the cart holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of units across all entries.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.entries.iter().map(|e| e.quantity).sum()
    }

    /// Current quantity for a product, 0 if absent.
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.entry(product_id).map_or(0, |e| e.quantity)
    }

    fn entry(&self, product_id: ProductId) -> Option<&CartEntry> {
        self.entries.iter().find(|e| e.id == product_id)
    }

    fn entry_mut(&mut self, product_id: ProductId) -> Option<&mut CartEntry> {
        self.entries.iter_mut().find(|e| e.id == product_id)
    }

    /// Add `requested` units of `product`, clamping against its live stock.
    ///
    /// The entry's stock snapshot is refreshed from `product.quantity`, since
    /// the caller is holding a freshly fetched product record.
    ///
    /// # Errors
    ///
    /// [`CartError::AtStockCeiling`] when not a single unit can be added; the
    /// cart is left untouched.
    pub fn add(&mut self, product: &Product, requested: u32) -> Result<CartAdd, CartError> {
        let existing = self.quantity_of(product.id);
        let available = product.quantity;

        if requested == 0 {
            // Nothing to do; never create a zero-quantity entry.
            return Ok(CartAdd::Added { quantity: existing });
        }

        let desired = existing.saturating_add(requested);
        if desired > available {
            let room = available.saturating_sub(existing);
            if room == 0 {
                return Err(CartError::AtStockCeiling);
            }
            self.set_quantity(product, available);
            return Ok(CartAdd::Clamped { added: room });
        }

        self.set_quantity(product, desired);
        Ok(CartAdd::Added { quantity: desired })
    }

    /// Set the quantity of an existing entry, validated against the stock
    /// snapshot stored on the entry (not a live product read).
    ///
    /// A quantity of zero removes the entry and always succeeds.
    ///
    /// # Errors
    ///
    /// [`CartError::NotInCart`] if no entry exists, or
    /// [`CartError::ExceedsStock`] if the quantity is over the snapshot; the
    /// cart is unchanged in both cases.
    pub fn update_quantity(
        &mut self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartUpdate, CartError> {
        if quantity == 0 {
            self.remove(product_id);
            return Ok(CartUpdate::Removed);
        }

        let entry = self.entry_mut(product_id).ok_or(CartError::NotInCart)?;
        if quantity > entry.stock {
            return Err(CartError::ExceedsStock { max: entry.stock });
        }

        entry.quantity = quantity;
        Ok(CartUpdate::Updated { quantity })
    }

    /// Remove the entry for a product. Returns whether one was present;
    /// removing an absent entry is a successful no-op.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != product_id);
        self.entries.len() != before
    }

    /// Empty the cart unconditionally.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Compute subtotal, tax (10%), and total, each rounded to 2 decimal
    /// places (half away from zero). Purely a function of current entries.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        let subtotal: Decimal = self
            .entries
            .iter()
            .map(|e| line_total(e.price, e.quantity))
            .sum();
        let subtotal = round_money(subtotal);
        let tax = round_money(subtotal * TAX_RATE);
        let total = round_money(subtotal + tax);

        CartTotals {
            subtotal,
            tax,
            total,
        }
    }

    /// Write the quantity for `product`, creating the entry if absent, and
    /// refresh the stock snapshot either way.
    fn set_quantity(&mut self, product: &Product, quantity: u32) {
        if let Some(entry) = self.entry_mut(product.id) {
            entry.quantity = quantity;
            entry.stock = product.quantity;
        } else {
            self.entries.push(CartEntry::from_product(product, quantity));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use creamline_core::ProductId;

    fn product(price_cents: i64, stock: u32) -> Product {
        Product {
            id: ProductId::generate(),
            name: "Whole Milk 1L".to_string(),
            price: Decimal::new(price_cents, 2),
            quantity: stock,
            category: "milk".to_string(),
            image_url: None,
            rating_avg: Decimal::ZERO,
            rating_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn assert_invariant(cart: &CartStore) {
        for entry in cart.entries() {
            assert!(entry.quantity > 0, "entry {} has zero quantity", entry.id);
            assert!(
                entry.quantity <= entry.stock,
                "entry {} exceeds its stock snapshot",
                entry.id
            );
        }
    }

    #[test]
    fn test_add_within_stock() {
        // Empty cart, add 3 of a product with stock 5.
        let mut cart = CartStore::new();
        let milk = product(200, 5);

        let outcome = cart.add(&milk, 3).unwrap();
        assert_eq!(outcome, CartAdd::Added { quantity: 3 });

        let entry = cart.entries().first().unwrap();
        assert_eq!(entry.quantity, 3);
        assert_eq!(entry.stock, 5);
        assert_invariant(&cart);

        let totals = cart.totals();
        assert_eq!(totals.subtotal, Decimal::new(600, 2));
        assert_eq!(totals.tax, Decimal::new(60, 2));
        assert_eq!(totals.total, Decimal::new(660, 2));
    }

    #[test]
    fn test_add_clamps_to_stock() {
        // Qty 4 of stock 5, add 3 more -> clamped to 5.
        let mut cart = CartStore::new();
        let milk = product(200, 5);
        cart.add(&milk, 4).unwrap();

        let outcome = cart.add(&milk, 3).unwrap();
        assert_eq!(outcome, CartAdd::Clamped { added: 2 });
        assert_eq!(outcome.available_to_add(), Some(2));
        assert!(outcome.message().unwrap().contains("2"));
        assert_eq!(cart.quantity_of(milk.id), 5);
        assert_invariant(&cart);
    }

    #[test]
    fn test_add_at_ceiling_fails_without_mutation() {
        // Qty 5 = stock, add 1 -> failure, cart unchanged.
        let mut cart = CartStore::new();
        let milk = product(200, 5);
        cart.add(&milk, 5).unwrap();
        let before = cart.clone();

        let err = cart.add(&milk, 1).unwrap_err();
        assert_eq!(err, CartError::AtStockCeiling);
        assert_eq!(err.available_to_add(), Some(0));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_add_out_of_stock_product() {
        let mut cart = CartStore::new();
        let gone = product(450, 0);

        assert_eq!(cart.add(&gone, 1).unwrap_err(), CartError::AtStockCeiling);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_zero_is_a_noop() {
        let mut cart = CartStore::new();
        let milk = product(200, 5);

        assert_eq!(cart.add(&milk, 0).unwrap(), CartAdd::Added { quantity: 0 });
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_refreshes_stock_snapshot() {
        let mut cart = CartStore::new();
        let mut milk = product(200, 5);
        cart.add(&milk, 2).unwrap();

        // Restock observed on the next add raises the entry's ceiling.
        milk.quantity = 8;
        cart.add(&milk, 1).unwrap();
        let entry = cart.entries().first().unwrap();
        assert_eq!(entry.quantity, 3);
        assert_eq!(entry.stock, 8);
        assert_invariant(&cart);
    }

    #[test]
    fn test_update_quantity_within_snapshot() {
        let mut cart = CartStore::new();
        let milk = product(200, 5);
        cart.add(&milk, 2).unwrap();

        let outcome = cart.update_quantity(milk.id, 4).unwrap();
        assert_eq!(outcome, CartUpdate::Updated { quantity: 4 });
        assert_eq!(cart.quantity_of(milk.id), 4);
        assert_invariant(&cart);
    }

    #[test]
    fn test_update_quantity_zero_removes() {
        let mut cart = CartStore::new();
        let butter = product(350, 10);
        cart.add(&butter, 2).unwrap();

        assert_eq!(
            cart.update_quantity(butter.id, 0).unwrap(),
            CartUpdate::Removed
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_missing_entry() {
        let mut cart = CartStore::new();
        assert_eq!(
            cart.update_quantity(ProductId::generate(), 2).unwrap_err(),
            CartError::NotInCart
        );
    }

    #[test]
    fn test_update_quantity_over_stock_leaves_cart_unchanged() {
        let mut cart = CartStore::new();
        let milk = product(200, 5);
        cart.add(&milk, 2).unwrap();
        let before = cart.clone();

        let err = cart.update_quantity(milk.id, 6).unwrap_err();
        assert_eq!(err, CartError::ExceedsStock { max: 5 });
        assert_eq!(cart, before);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut cart = CartStore::new();
        let milk = product(200, 5);
        cart.add(&milk, 1).unwrap();

        assert!(cart.remove(milk.id));
        assert!(!cart.remove(milk.id));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut cart = CartStore::new();
        cart.add(&product(200, 5), 1).unwrap();
        cart.add(&product(999, 2), 2).unwrap();

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.totals(), CartTotals::default());
    }

    #[test]
    fn test_totals_round_half_away_from_zero() {
        let mut cart = CartStore::new();
        // 3 x 1.99 = 5.97; tax 0.597 -> 0.60; total 6.57
        cart.add(&product(199, 10), 3).unwrap();

        let totals = cart.totals();
        assert_eq!(totals.subtotal, Decimal::new(597, 2));
        assert_eq!(totals.tax, Decimal::new(60, 2));
        assert_eq!(totals.total, Decimal::new(657, 2));
    }

    #[test]
    fn test_totals_is_pure_function_of_entries() {
        let mut cart = CartStore::new();
        cart.add(&product(125, 10), 4).unwrap();
        assert_eq!(cart.totals(), cart.totals());

        let rebuilt = CartStore::from_entries(cart.entries().to_vec());
        assert_eq!(rebuilt.totals(), cart.totals());
    }

    #[test]
    fn test_entries_keep_insertion_order() {
        let mut cart = CartStore::new();
        let a = product(100, 5);
        let b = product(200, 5);
        let c = product(300, 5);
        cart.add(&a, 1).unwrap();
        cart.add(&b, 1).unwrap();
        cart.add(&c, 1).unwrap();
        cart.add(&b, 1).unwrap(); // re-add must not reorder

        let ids: Vec<_> = cart.entries().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![a.id, b.id, c.id]);
    }
}
