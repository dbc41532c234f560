//! Drip Supply Core - Shared types library.
//!
//! This crate provides common types used across all Drip Supply components:
//! - `storefront` - The storefront widget host (catalog, detail, cart)
//! - `cli` - Command-line tools for inspecting the catalog and the saved cart
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no storage access,
//! no HTTP. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, variants and cart keys

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
