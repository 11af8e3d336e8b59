use crate::error::{EconomyError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A non-negative running balance of a currency or an inventory entry.
///
/// Wraps `rust_decimal::Decimal`; the only way to reduce a balance is
/// [`Balance::debit`], which refuses to go below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Balance(pub Decimal);

/// A strictly positive quantity moved by an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(EconomyError::ValidationError(format!(
                "Amount must be positive, got {value}"
            )))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = EconomyError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl From<Amount> for Balance {
    fn from(amount: Amount) -> Self {
        Self(amount.0)
    }
}

impl FromStr for Amount {
    type Err = EconomyError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(parse_decimal(s)?)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        Self(value.max(Decimal::ZERO))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn covers(&self, amount: Amount) -> bool {
        self.0 >= amount.0
    }

    /// The balance after crediting `amount`, or a `ValidationError` if it
    /// would not fit in a `Decimal`.
    pub fn checked_credit(&self, amount: Amount) -> Result<Self> {
        self.0
            .checked_add(amount.0)
            .map(Self)
            .ok_or_else(|| EconomyError::overflow(format!("crediting {amount} to {self}")))
    }

    pub fn credit(&mut self, amount: Amount) -> Result<()> {
        *self = self.checked_credit(amount)?;
        Ok(())
    }

    /// Adds a raw increment such as accrued interest; negative deltas are ignored.
    /// On overflow the balance is left unchanged.
    pub fn accrue(&mut self, delta: Decimal) -> Result<()> {
        if delta > Decimal::ZERO {
            self.0 = self
                .0
                .checked_add(delta)
                .ok_or_else(|| EconomyError::overflow(format!("accruing {delta} to {self}")))?;
        }
        Ok(())
    }

    pub fn debit(&mut self, amount: Amount) -> Result<()> {
        if self.covers(amount) {
            self.0 -= amount.0;
            Ok(())
        } else {
            Err(EconomyError::insufficient(amount.0, self.0))
        }
    }

    /// Removes up to `delta`, never going below zero. Returns what was removed.
    pub fn skim(&mut self, delta: Decimal) -> Decimal {
        let taken = delta.max(Decimal::ZERO).min(self.0);
        self.0 -= taken;
        taken
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.normalize().fmt(f)
    }
}

/// Parses a decimal from user input, mapping failures to `ValidationError`.
pub fn parse_decimal(s: &str) -> Result<Decimal> {
    Decimal::from_str(s.trim())
        .map_err(|e| EconomyError::ValidationError(format!("Invalid number '{s}': {e}")))
}

/// Parses a rate that must be zero or positive.
pub fn parse_rate(s: &str) -> Result<Decimal> {
    let rate = parse_decimal(s)?;
    if rate < Decimal::ZERO {
        return Err(EconomyError::ValidationError(format!(
            "Rate must not be negative, got {rate}"
        )));
    }
    Ok(rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_validation() {
        assert!(Amount::new(dec!(1.0)).is_ok());
        assert!(matches!(
            Amount::new(dec!(0.0)),
            Err(EconomyError::ValidationError(_))
        ));
        assert!(matches!(
            Amount::new(dec!(-1.0)),
            Err(EconomyError::ValidationError(_))
        ));
        assert!("abc".parse::<Amount>().is_err());
        assert_eq!("2.5".parse::<Amount>().unwrap().value(), dec!(2.5));
    }

    #[test]
    fn test_balance_debit_insufficient() {
        let mut balance = Balance::new(dec!(10));
        let result = balance.debit(Amount::new(dec!(20)).unwrap());
        assert!(matches!(
            result,
            Err(EconomyError::InsufficientFunds { .. })
        ));
        assert_eq!(balance, Balance::new(dec!(10)));

        balance.debit(Amount::new(dec!(4)).unwrap()).unwrap();
        assert_eq!(balance, Balance::new(dec!(6)));
    }

    #[test]
    fn test_balance_skim_floors_at_zero() {
        let mut balance = Balance::new(dec!(3));
        assert_eq!(balance.skim(dec!(5)), dec!(3));
        assert!(balance.is_zero());
        assert_eq!(Balance::new(dec!(-4)), Balance::ZERO);
    }

    #[test]
    fn test_credit_overflow_leaves_balance_unchanged() {
        let mut balance = Balance::new(Decimal::MAX);
        let result = balance.credit(Amount::new(dec!(1)).unwrap());
        assert!(matches!(result, Err(EconomyError::ValidationError(_))));
        assert_eq!(balance, Balance::new(Decimal::MAX));

        assert!(balance.accrue(dec!(1)).is_err());
        assert_eq!(balance, Balance::new(Decimal::MAX));
        assert!(balance.accrue(dec!(-1)).is_ok());

        let mut small = Balance::new(dec!(1));
        small.credit(Amount::new(dec!(2)).unwrap()).unwrap();
        small.accrue(dec!(0.5)).unwrap();
        assert_eq!(small, Balance::new(dec!(3.5)));
    }

    #[test]
    fn test_amount_deserialize_rejects_zero() {
        assert!(serde_json::from_str::<Amount>("\"0\"").is_err());
        assert!(serde_json::from_str::<Amount>("\"1.5\"").is_ok());
    }
}
