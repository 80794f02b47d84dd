//! Value Objects for the storefront

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_CURRENCY: &str = "IDR";

/// SKU (Stock Keeping Unit) value object
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Sku(String);

impl Sku {
    pub fn new(value: impl Into<String>) -> Result<Self, SkuError> {
        let value = value.into().trim().to_uppercase();
        if value.is_empty() { return Err(SkuError::Empty); }
        if value.len() > 50 { return Err(SkuError::TooLong); }
        Ok(Self(value))
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl TryFrom<String> for Sku {
    type Error = SkuError;
    fn try_from(value: String) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<Sku> for String {
    fn from(sku: Sku) -> Self { sku.0 }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkuError {
    #[error("SKU empty")]
    Empty,
    #[error("SKU too long")]
    TooLong,
}

/// Money value object. Amounts are whole units of the currency (Rupiah has no
/// minor unit in practice), but `Decimal` keeps arithmetic exact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
    currency: String,
}

impl Money {
    pub fn new(amount: Decimal, currency: &str) -> Self { Self { amount, currency: currency.to_string() } }
    pub fn idr(amount: Decimal) -> Self { Self::new(amount, DEFAULT_CURRENCY) }
    pub fn zero(currency: &str) -> Self { Self::new(Decimal::ZERO, currency) }
    pub fn amount(&self) -> Decimal { self.amount }
    pub fn currency(&self) -> &str { &self.currency }
    pub fn add(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency { return Err(MoneyError::CurrencyMismatch); }
        Ok(Money::new(self.amount + other.amount, &self.currency))
    }
    pub fn multiply(&self, qty: u32) -> Money { Money::new(self.amount * Decimal::from(qty), &self.currency) }
}

impl Default for Money { fn default() -> Self { Self::zero(DEFAULT_CURRENCY) } }

/// Renders Rupiah the way the storefront shows prices: `Rp 199.000`.
/// Other currencies fall back to `<CODE> <amount>` with the same grouping.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self
            .amount
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .abs()
            .to_string();
        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 { grouped.push('.'); }
            grouped.push(ch);
        }
        let sign = if self.amount.is_sign_negative() && !self.amount.is_zero() { "-" } else { "" };
        match self.currency.as_str() {
            "IDR" => write!(f, "{sign}Rp {grouped}"),
            other => write!(f, "{sign}{other} {grouped}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    #[error("Currency mismatch")]
    CurrencyMismatch,
}

/// Upper bound on how many units of a product/variant can be sold.
///
/// `Unbounded` means no stock figure exists anywhere for the item; it compares
/// greater than any finite quantity and is never displayed as a number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "units", rename_all = "snake_case")]
pub enum StockLimit {
    Finite(u32),
    Unbounded,
}

impl StockLimit {
    pub fn from_option(units: Option<u32>) -> Self {
        units.map_or(Self::Unbounded, Self::Finite)
    }

    pub fn finite(&self) -> Option<u32> {
        match self {
            Self::Finite(units) => Some(*units),
            Self::Unbounded => None,
        }
    }

    pub fn is_exhausted(&self) -> bool { matches!(self, Self::Finite(0)) }

    pub fn exceeded_by(&self, qty: u32) -> bool {
        match self {
            Self::Finite(units) => qty > *units,
            Self::Unbounded => false,
        }
    }

    /// Units left after `taken` are already reserved (e.g. sitting in the cart).
    pub fn remaining_after(&self, taken: u32) -> Self {
        match self {
            Self::Finite(units) => Self::Finite(units.saturating_sub(taken)),
            Self::Unbounded => Self::Unbounded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_sku() { let sku = Sku::new("tee-core-blk-s").unwrap(); assert_eq!(sku.as_str(), "TEE-CORE-BLK-S"); }
    #[test]
    fn test_money_add() {
        let a = Money::idr(Decimal::new(199_000, 0));
        let b = Money::idr(Decimal::new(1_000, 0));
        assert_eq!(a.add(&b).unwrap().amount(), Decimal::new(200_000, 0));
        assert!(a.add(&Money::new(Decimal::ONE, "USD")).is_err());
    }
    #[test]
    fn test_money_display_rupiah() {
        assert_eq!(Money::idr(Decimal::new(199_000, 0)).to_string(), "Rp 199.000");
        assert_eq!(Money::idr(Decimal::new(1_234_567, 0)).to_string(), "Rp 1.234.567");
        assert_eq!(Money::idr(Decimal::new(950, 0)).to_string(), "Rp 950");
        assert_eq!(Money::idr(Decimal::ZERO).to_string(), "Rp 0");
    }
    #[test]
    fn test_stock_limit() {
        assert!(StockLimit::Finite(0).is_exhausted());
        assert!(StockLimit::Finite(10).exceeded_by(15));
        assert!(!StockLimit::Unbounded.exceeded_by(u32::MAX));
        assert_eq!(StockLimit::Finite(10).remaining_after(12), StockLimit::Finite(0));
        assert_eq!(StockLimit::from_option(None), StockLimit::Unbounded);
    }
}
