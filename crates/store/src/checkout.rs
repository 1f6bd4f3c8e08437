//! Order placement.
//!
//! Checkout validates the submitted customer details, snapshots the live cart
//! into an immutable order, and only then kicks off the best-effort stock
//! decrements and cart teardown. The order write is the point of no return:
//! anything after it may fail without failing the checkout.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

use serde::Deserialize;
use tokio::task::JoinHandle;

use creamline_core::{
    CustomerInfo, Email, NewOrder, OrderId, PaymentMethod, Phone, UserId,
};

use crate::cart::CartSession;
use crate::datastore::{DataError, DataService};

/// Raw checkout submission, validated before any order exists.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub payment_method: PaymentMethod,
}

impl CheckoutForm {
    /// Validate every field, collecting all failures rather than stopping at
    /// the first. Keys are stable field names for the client to key on.
    ///
    /// # Errors
    ///
    /// Returns the per-field error map if any field is invalid.
    pub fn validate(&self) -> Result<CustomerInfo, BTreeMap<&'static str, String>> {
        let mut errors = BTreeMap::new();

        let full_name = self.full_name.trim();
        if full_name.is_empty() {
            errors.insert("full_name", "full name is required".to_string());
        }

        let email = match Email::parse(self.email.trim()) {
            Ok(email) => Some(email),
            Err(e) => {
                errors.insert("email", e.to_string());
                None
            }
        };

        let phone = match Phone::parse(self.phone.trim()) {
            Ok(phone) => Some(phone),
            Err(e) => {
                errors.insert("phone", e.to_string());
                None
            }
        };

        let street = self.street.trim();
        if street.is_empty() {
            errors.insert("street", "street address is required".to_string());
        }
        let city = self.city.trim();
        if city.is_empty() {
            errors.insert("city", "city is required".to_string());
        }
        let postal_code = self.postal_code.trim();
        if postal_code.is_empty() {
            errors.insert("postal_code", "postal code is required".to_string());
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        // Both are Some here: a None inserted an error above.
        match (email, phone) {
            (Some(email), Some(phone)) => Ok(CustomerInfo {
                full_name: full_name.to_string(),
                email,
                phone,
                street: street.to_string(),
                city: city.to_string(),
                postal_code: postal_code.to_string(),
            }),
            _ => Err(errors),
        }
    }
}

/// Why an order could not be placed.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    /// One or more form fields failed validation.
    #[error("checkout form validation failed")]
    Validation(BTreeMap<&'static str, String>),

    /// Nothing in the cart to order.
    #[error("cannot place an order with an empty cart")]
    EmptyCart,

    /// A checkout for this user is already running.
    #[error("a checkout is already in progress for this user")]
    InFlight,

    /// The order write itself failed; no order exists.
    #[error("failed to create order")]
    Create(#[source] DataError),
}

/// A successfully placed order.
///
/// `stock_sync` drives the stock decrements and remote cart deletion; request
/// handlers drop it (fire-and-forget), tests await it.
#[derive(Debug)]
pub struct PlacedOrder {
    pub order_id: OrderId,
    pub stock_sync: JoinHandle<()>,
}

/// Places orders, allowing at most one in-flight checkout per user.
pub struct Checkout {
    data: Arc<dyn DataService>,
    in_flight: Arc<Mutex<HashSet<UserId>>>,
}

/// Releases the per-user checkout slot on drop, so an early return or panic
/// in the placement path never wedges the user.
struct InFlightGuard {
    in_flight: Arc<Mutex<HashSet<UserId>>>,
    user_id: UserId,
}

impl InFlightGuard {
    fn acquire(in_flight: &Arc<Mutex<HashSet<UserId>>>, user_id: UserId) -> Option<Self> {
        let mut set = in_flight
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if !set.insert(user_id) {
            return None;
        }
        Some(Self {
            in_flight: Arc::clone(in_flight),
            user_id,
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(&self.user_id);
    }
}

impl Checkout {
    /// Checkout service over the shared data service.
    #[must_use]
    pub fn new(data: Arc<dyn DataService>) -> Self {
        Self {
            data,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Place an order from the user's current cart.
    ///
    /// Totals are computed from the live cart at this moment, never from
    /// client-supplied figures. After the order is persisted the cart is
    /// cleared and stock decrements run asynchronously; a decrement failure
    /// is logged for manual reconciliation and never surfaces to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError`] if validation fails, the cart is empty,
    /// another checkout is in flight for the user, or the order write fails.
    pub async fn place_order(
        &self,
        session: &mut CartSession,
        form: &CheckoutForm,
    ) -> Result<PlacedOrder, CheckoutError> {
        let user_id = session.user_id();
        let _guard =
            InFlightGuard::acquire(&self.in_flight, user_id).ok_or(CheckoutError::InFlight)?;

        let customer = form.validate().map_err(CheckoutError::Validation)?;
        if session.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let items = session.entries().to_vec();
        let totals = session.totals();
        let new_order = NewOrder {
            user_id,
            items: items.clone(),
            customer,
            subtotal: totals.subtotal,
            tax: totals.tax,
            total: totals.total,
            payment_method: form.payment_method,
        };

        let order_id = self
            .data
            .create_order(new_order)
            .await
            .map_err(CheckoutError::Create)?;

        tracing::info!(%order_id, %user_id, total = %totals.total, "order placed");

        // Point of no return: the order exists. Clear the cart now and let
        // the decrements run detached.
        session.clear();

        let data = Arc::clone(&self.data);
        let stock_sync = tokio::spawn(async move {
            for item in items {
                if let Err(e) = data.decrement_stock(item.id, item.quantity).await {
                    tracing::error!(
                        %order_id,
                        product_id = %item.id,
                        quantity = item.quantity,
                        error = %e,
                        "stock decrement failed; needs manual reconciliation"
                    );
                }
            }
        });

        Ok(PlacedOrder {
            order_id,
            stock_sync,
        })
    }
}
