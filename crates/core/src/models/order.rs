//! Order model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::{OrderId, UserId};
use crate::types::status::{OrderStatus, PaymentMethod};

use super::cart::CartEntry;
use super::customer::CustomerInfo;

/// An order, immutable once created.
///
/// Line items and totals are a snapshot of the cart at placement time and are
/// never edited afterwards; only `status` (and `updated_at`) change, through
/// administrative state transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<CartEntry>,
    pub customer: CustomerInfo,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an order. The store assigns id, status (`Pending`) and
/// timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub user_id: UserId,
    pub items: Vec<CartEntry>,
    pub customer: CustomerInfo,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub payment_method: PaymentMethod,
}
