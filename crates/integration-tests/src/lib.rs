//! Integration tests for Creamline.
//!
//! The tests exercise the cart, checkout, and review-moderation flows
//! end-to-end against the in-memory data service, so they run without a
//! database or a live server.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p creamline-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use rust_decimal::Decimal;

use creamline_core::{NewProduct, Product, UserId};
use creamline_store::cart::{CartMirror, CartSession, MemoryStorage, StorageError};
use creamline_store::checkout::{Checkout, CheckoutForm};
use creamline_store::datastore::{DataService, MemoryDataService};

/// Shared fixture wiring the services the way the server does, minus HTTP.
pub struct TestContext {
    pub data: Arc<MemoryDataService>,
    pub checkout: Checkout,
}

impl TestContext {
    /// Fresh context with an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        let data = Arc::new(MemoryDataService::new());
        let checkout = Checkout::new(data.clone() as Arc<dyn DataService>);
        Self { data, checkout }
    }

    /// Seed one product and return it.
    ///
    /// # Panics
    ///
    /// Panics if the in-memory store rejects the insert (it never does).
    pub async fn seed_product(&self, name: &str, price_cents: i64, stock: u32) -> Product {
        self.data
            .create_product(NewProduct {
                name: name.to_string(),
                price: Decimal::new(price_cents, 2),
                quantity: stock,
                category: "fresh".to_string(),
                image_url: None,
            })
            .await
            .expect("in-memory product insert cannot fail")
    }

    /// Open a cart session for `user_id` with throwaway local storage and a
    /// live remote mirror.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backing storage cannot be read.
    pub fn session(&self, user_id: UserId) -> Result<CartSession, StorageError> {
        let mirror = CartMirror::new(self.data.clone() as Arc<dyn DataService>, user_id);
        CartSession::open(user_id, Box::new(MemoryStorage::new()), Some(mirror))
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// A checkout form that passes validation.
#[must_use]
pub fn valid_checkout_form() -> CheckoutForm {
    CheckoutForm {
        full_name: "Mira Holst".to_string(),
        email: "mira@example.com".to_string(),
        phone: "0171 2345678".to_string(),
        street: "Dairy Lane 4".to_string(),
        city: "Hamburg".to_string(),
        postal_code: "20095".to_string(),
        payment_method: creamline_core::PaymentMethod::CashOnDelivery,
    }
}
