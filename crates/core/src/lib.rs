//! Creamline Core - Shared types library.
//!
//! This crate provides common types used across all Creamline components:
//! - `store` - Storefront service and back-office operations
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and domain models - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money, emails, phone
//!   numbers, statuses, and the rating aggregate
//! - [`models`] - Domain models shared across the workspace

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod models;
pub mod types;

pub use models::*;
pub use types::*;
