//! Customer information captured at checkout.

use serde::{Deserialize, Serialize};

use crate::types::email::Email;
use crate::types::phone::Phone;

/// Validated customer details attached to an order.
///
/// Constructed only by checkout validation; the typed email and phone fields
/// guarantee the order record never carries malformed contact details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub full_name: String,
    pub email: Email,
    pub phone: Phone,
    pub street: String,
    pub city: String,
    pub postal_code: String,
}
