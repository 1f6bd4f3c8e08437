//! Creamline Store library.
//!
//! This crate provides the storefront and back-office functionality as a
//! library, allowing it to be tested and reused.
//!
//! The consistency-critical pieces live in three places:
//!
//! - [`cart`] - the stock-aware cart store, its local persistence, and the
//!   best-effort remote mirror
//! - [`checkout`] - checkout validation and the order placement sequence
//! - [`datastore`] - the remote data service, including the atomic
//!   review-approval transaction

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod datastore;
pub mod error;
pub mod routes;
pub mod state;
