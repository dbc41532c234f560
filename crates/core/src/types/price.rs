//! Type-safe price representation using decimal arithmetic.
//!
//! The storefront sells in a single currency (Brazilian real) and formats
//! amounts the way the pt-BR locale does: `R$ 1.250,00`.

use std::iter::Sum;
use std::ops::Add;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Separator between the currency symbol and the amount (no-break space, as
/// emitted by the pt-BR locale).
const SYMBOL_SEPARATOR: char = '\u{a0}';

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
}

/// A price with currency information.
///
/// Serialized as the bare decimal amount: the currency is fixed for the whole
/// store, and persisted carts written before this type existed carry plain
/// numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Decimal", into = "Decimal")]
pub struct Price {
    /// Amount in the currency's standard unit (reais, not centavos).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// A zero amount in the store currency.
    pub const ZERO: Self = Self::brl(Decimal::ZERO);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price in Brazilian reais.
    #[must_use]
    pub const fn brl(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::BRL)
    }

    /// Create a price from an amount in centavos.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self::brl(Decimal::new(cents, 2))
    }

    /// Create a price, rejecting negative amounts.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount` is below zero.
    pub fn try_brl(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self::brl(amount))
    }

    /// Price of `quantity` units at this unit price.
    ///
    /// Saturates at [`Decimal::MAX`] instead of overflowing.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self::new(
            self.amount.saturating_mul(Decimal::from(quantity)),
            self.currency_code,
        )
    }

    /// Format for display using the currency's locale rules (e.g., `R$ 1.250,00`).
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();
        let digits = format!("{:.2}", rounded.abs());
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, c) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(self.currency_code.group_separator());
            }
            grouped.push(c);
        }

        format!(
            "{sign}{symbol}{SYMBOL_SEPARATOR}{grouped}{decimal}{fraction}",
            sign = if negative { "-" } else { "" },
            symbol = self.currency_code.symbol(),
            decimal = self.currency_code.decimal_separator(),
        )
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self::brl(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.amount
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.amount.saturating_add(rhs.amount), self.currency_code)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes.
///
/// The store operates in a single currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    BRL,
}

impl CurrencyCode {
    /// Currency symbol shown before the amount.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::BRL => "R$",
        }
    }

    const fn group_separator(self) -> char {
        match self {
            Self::BRL => '.',
        }
    }

    const fn decimal_separator(self) -> char {
        match self {
            Self::BRL => ',',
        }
    }
}
