//! Core types for Creamline.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod money;
pub mod phone;
pub mod rating;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::{TAX_RATE, line_total, round_money};
pub use phone::{Phone, PhoneError};
pub use rating::{Rating, RatingAggregate, RatingError};
pub use status::*;
