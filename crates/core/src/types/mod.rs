//! Core types for Drip Supply.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart_key;
pub mod id;
pub mod price;
pub mod variant;

pub use cart_key::{CartKey, ParseCartKeyError};
pub use id::*;
pub use price::{CurrencyCode, Price, PriceError};
pub use variant::{VariantLabel, VariantLabelError};
