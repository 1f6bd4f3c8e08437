//! Domain models shared across the workspace.

pub mod cart;
pub mod customer;
pub mod order;
pub mod product;
pub mod review;

pub use cart::{CartEntry, CartTotals};
pub use customer::CustomerInfo;
pub use order::{NewOrder, Order};
pub use product::{NewProduct, Product};
pub use review::{NewReview, Review};
