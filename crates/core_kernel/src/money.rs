//! Money types with precise decimal arithmetic
//!
//! Premiums, flat extras and face amounts are all carried as `Decimal` so that
//! rate-table values survive lookups and per-thousand arithmetic without
//! floating-point drift.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul};
use thiserror::Error;

/// Currency codes following ISO 4217
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    USD,
    CAD,
    EUR,
    GBP,
}

impl Currency {
    /// Returns the number of decimal places for this currency
    pub fn decimal_places(&self) -> u32 {
        2
    }

    /// Returns the currency symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::USD => "$",
            Currency::CAD => "C$",
            Currency::EUR => "€",
            Currency::GBP => "£",
        }
    }

    /// Returns the ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::CAD => "CAD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors that can occur during money operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Currency mismatch: cannot operate on {0} and {1}")]
    CurrencyMismatch(String, String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Division by zero")]
    DivisionByZero,
}

/// A monetary amount with associated currency
///
/// Amounts are kept at 4 decimal places internally; rate tables quote
/// premiums to the cent but flat-extra proration produces sub-cent values
/// that should only be rounded once, at presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    /// Creates a new Money value
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self {
            amount: amount.round_dp(4),
            currency,
        }
    }

    /// Creates a USD amount
    pub fn usd(amount: Decimal) -> Self {
        Self::new(amount, Currency::USD)
    }

    /// Creates a zero amount in the specified currency
    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: dec!(0),
            currency,
        }
    }

    /// Returns the amount
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns the currency
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns true if the amount is strictly positive
    pub fn is_positive(&self) -> bool {
        self.amount.is_sign_positive() && !self.amount.is_zero()
    }

    /// Rounds to the currency's standard decimal places (half away from zero)
    pub fn round_to_currency(&self) -> Self {
        Self {
            amount: self.amount.round_dp_with_strategy(
                self.currency.decimal_places(),
                rust_decimal::RoundingStrategy::MidpointAwayFromZero,
            ),
            currency: self.currency,
        }
    }

    /// Checked addition that returns an error on currency mismatch
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch(
                self.currency.to_string(),
                other.currency.to_string(),
            ));
        }
        Ok(Self::new(self.amount + other.amount, self.currency))
    }

    /// Multiplies by a scalar
    pub fn multiply(&self, factor: Decimal) -> Self {
        Self::new(self.amount * factor, self.currency)
    }

    /// Divides by a scalar
    pub fn divide(&self, divisor: Decimal) -> Result<Self, MoneyError> {
        if divisor.is_zero() {
            return Err(MoneyError::DivisionByZero);
        }
        Ok(Self::new(self.amount / divisor, self.currency))
    }

    /// Charge for `rate` per thousand of `face_amount`
    ///
    /// Used for flat extras, which carriers quote as an annual dollar amount
    /// per $1,000 of coverage.
    pub fn per_thousand(rate: Decimal, face_amount: Decimal, currency: Currency) -> Self {
        Self::new(rate * face_amount / dec!(1000), currency)
    }

    /// Annual cost of this amount per $1,000 of `face_amount`
    pub fn cost_per_thousand(&self, face_amount: Decimal) -> Result<Decimal, MoneyError> {
        if face_amount <= Decimal::ZERO {
            return Err(MoneyError::InvalidAmount(format!(
                "face amount must be positive, got {}",
                face_amount
            )));
        }
        Ok(self.amount / (face_amount / dec!(1000)))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.round_to_currency();
        write!(f, "{}{}", self.currency.symbol(), rounded.amount)
    }
}

impl Add for Money {
    type Output = Money;

    /// Panics on currency mismatch; use `checked_add` when currencies may differ
    fn add(self, other: Money) -> Money {
        assert_eq!(
            self.currency, other.currency,
            "Cannot add money with different currencies"
        );
        Money::new(self.amount + other.amount, self.currency)
    }
}

impl Mul<Decimal> for Money {
    type Output = Money;

    fn mul(self, factor: Decimal) -> Money {
        self.multiply(factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_thousand() {
        let extra = Money::per_thousand(dec!(2.50), dec!(250000), Currency::USD);
        assert_eq!(extra.amount(), dec!(625));
    }

    #[test]
    fn test_cost_per_thousand() {
        let annual = Money::usd(dec!(300));
        assert_eq!(annual.cost_per_thousand(dec!(100000)).unwrap(), dec!(3));
        assert!(annual.cost_per_thousand(dec!(0)).is_err());
    }

    #[test]
    fn test_currency_mismatch() {
        let usd = Money::usd(dec!(10));
        let cad = Money::new(dec!(10), Currency::CAD);
        assert!(usd.checked_add(&cad).is_err());
    }

    #[test]
    fn test_display_rounds() {
        let m = Money::usd(dec!(41.6667));
        assert_eq!(m.to_string(), "$41.67");
    }
}
