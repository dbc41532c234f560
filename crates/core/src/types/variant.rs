//! Variant label type.

use core::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Errors that can occur when parsing a [`VariantLabel`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum VariantLabelError {
    /// The input string is empty (or only whitespace).
    #[error("variant label cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("variant label must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// A selectable product option, usually a size (`"42"`, `"M"`, `"2XL"`).
///
/// Catalog data may declare sizes as numbers or strings; both deserialize
/// into the same textual label so that `42` and `"42"` address the same cart
/// line. Labels always serialize as strings.
///
/// ## Examples
///
/// ```
/// use drip_core::VariantLabel;
///
/// assert_eq!(VariantLabel::parse(" M ").unwrap().as_str(), "M");
/// assert!(VariantLabel::parse("").is_err());
/// ```
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct VariantLabel(String);

impl VariantLabel {
    /// Maximum length of a variant label.
    pub const MAX_LENGTH: usize = 64;

    /// Parse a `VariantLabel` from a string, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty or longer than
    /// [`Self::MAX_LENGTH`].
    pub fn parse(s: &str) -> Result<Self, VariantLabelError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(VariantLabelError::Empty);
        }
        if trimmed.chars().count() > Self::MAX_LENGTH {
            return Err(VariantLabelError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the label as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VariantLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for VariantLabel {
    type Err = VariantLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for VariantLabel {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for VariantLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(VariantLabelVisitor)
    }
}

struct VariantLabelVisitor;

impl Visitor<'_> for VariantLabelVisitor {
    type Value = VariantLabel;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a variant label as a string or number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        VariantLabel::parse(v).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        self.visit_str(&v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        self.visit_str(&v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        self.visit_str(&v.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims() {
        assert_eq!(VariantLabel::parse("  2XL ").unwrap().as_str(), "2XL");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(VariantLabel::parse("   "), Err(VariantLabelError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        let long = "x".repeat(VariantLabel::MAX_LENGTH + 1);
        assert!(matches!(
            VariantLabel::parse(&long),
            Err(VariantLabelError::TooLong { .. })
        ));
    }

    #[test]
    fn test_numeric_and_textual_sizes_are_the_same_label() {
        let numeric: VariantLabel = serde_json::from_str("42").unwrap();
        let textual: VariantLabel = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(numeric, textual);
        assert_eq!(serde_json::to_string(&numeric).unwrap(), "\"42\"");
    }

    #[test]
    fn test_rejects_non_scalar() {
        assert!(serde_json::from_str::<VariantLabel>("[1]").is_err());
        assert!(serde_json::from_str::<VariantLabel>("\"\"").is_err());
    }
}
