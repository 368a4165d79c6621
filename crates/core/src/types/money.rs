//! Monetary amounts using decimal arithmetic.
//!
//! The Storefront API returns amounts as decimal strings (`"19.99"`) next to
//! an ISO 4217 currency code. Amounts are kept as [`Decimal`] so price
//! comparisons in the sort and filter stages never suffer float rounding.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from strict money parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}

/// ISO 4217 currency code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Create a currency code, normalizing to upper case.
    #[must_use]
    pub fn new(code: &str) -> Self {
        Self(code.trim().to_ascii_uppercase())
    }

    /// The three-letter code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display symbol for common currencies.
    #[must_use]
    pub fn symbol(&self) -> Option<&'static str> {
        match self.0.as_str() {
            "USD" | "CAD" | "AUD" | "NZD" | "MXN" => Some("$"),
            "EUR" => Some("€"),
            "GBP" => Some("£"),
            "JPY" => Some("¥"),
            _ => None,
        }
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self("USD".to_string())
    }
}

/// A price with currency information.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Money {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Money {
    /// Create a new amount.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Parse an API amount string.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::InvalidAmount` if the amount is not a decimal.
    pub fn try_parse(amount: &str, currency_code: &str) -> Result<Self, MoneyError> {
        let amount = Decimal::from_str(amount.trim())
            .map_err(|_| MoneyError::InvalidAmount(amount.to_string()))?;
        Ok(Self::new(amount, CurrencyCode::new(currency_code)))
    }

    /// Parse an API amount string, treating malformed amounts as zero.
    #[must_use]
    pub fn parse_lossy(amount: &str, currency_code: &str) -> Self {
        Self::try_parse(amount, currency_code).unwrap_or_else(|_| Self {
            amount: Decimal::ZERO,
            currency_code: CurrencyCode::new(currency_code),
        })
    }

    /// Compare amounts only, ignoring currency.
    ///
    /// A single storefront page is always priced in one presentment currency.
    #[must_use]
    pub fn cmp_amount(&self, other: &Self) -> Ordering {
        self.amount.cmp(&other.amount)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let amount = self.amount.round_dp(2);
        match self.currency_code.symbol() {
            Some(symbol) => write!(f, "{symbol}{amount:.2}"),
            None => write!(f, "{amount:.2} {}", self.currency_code.as_str()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display_usd() {
        let money = Money::try_parse("19.9", "usd").unwrap();
        assert_eq!(money.to_string(), "$19.90");
        assert_eq!(money.currency_code.as_str(), "USD");
    }

    #[test]
    fn test_display_without_symbol() {
        let money = Money::try_parse("250.0", "SEK").unwrap();
        assert_eq!(money.to_string(), "250.00 SEK");
    }

    #[test]
    fn test_try_parse_rejects_garbage() {
        let err = Money::try_parse("abc", "USD").unwrap_err();
        assert_eq!(err, MoneyError::InvalidAmount("abc".to_string()));
    }

    #[test]
    fn test_parse_lossy_degrades_to_zero() {
        let money = Money::parse_lossy("", "EUR");
        assert_eq!(money.amount, Decimal::ZERO);
        assert_eq!(money.to_string(), "€0.00");
    }

    #[test]
    fn test_cmp_amount() {
        let a = Money::parse_lossy("10.00", "USD");
        let b = Money::parse_lossy("9.99", "USD");
        assert_eq!(a.cmp_amount(&b), Ordering::Greater);
    }
}
