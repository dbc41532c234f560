//! Composite cart line identity.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::id::ProductId;
use super::variant::{VariantLabel, VariantLabelError};

/// Errors that can occur when parsing a [`CartKey`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseCartKeyError {
    /// No `_` separator between product id and variant.
    #[error("cart key must look like <product_id>_<variant>")]
    MissingSeparator,
    /// The product id part is not an integer.
    #[error("invalid product id in cart key: {0}")]
    InvalidProductId(String),
    /// The variant part is not a valid label.
    #[error("invalid variant in cart key: {0}")]
    InvalidVariant(#[from] VariantLabelError),
}

/// Identity of a cart line: one product in one variant.
///
/// The textual form is `"{product_id}_{variant}"` (e.g. `1_42`, `3_2XL`).
/// Parsing splits at the first underscore, so variants may themselves
/// contain underscores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CartKey {
    pub product_id: ProductId,
    pub variant: VariantLabel,
}

impl CartKey {
    #[must_use]
    pub const fn new(product_id: ProductId, variant: VariantLabel) -> Self {
        Self {
            product_id,
            variant,
        }
    }
}

impl fmt::Display for CartKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.product_id, self.variant)
    }
}

impl FromStr for CartKey {
    type Err = ParseCartKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, variant) = s
            .split_once('_')
            .ok_or(ParseCartKeyError::MissingSeparator)?;
        let product_id = id
            .parse::<ProductId>()
            .map_err(|_| ParseCartKeyError::InvalidProductId(id.to_owned()))?;
        let variant = VariantLabel::parse(variant)?;
        Ok(Self::new(product_id, variant))
    }
}

impl Serialize for CartKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CartKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
