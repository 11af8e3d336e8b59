use super::economy::TenantEconomy;
use super::money::parse_rate;
use crate::error::{EconomyError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Per-tenant economic parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Fraction of every wallet balance removed by each tax collection.
    pub tax_rate: Decimal,
    /// Interest recorded on loans approved without an explicit rate.
    pub loan_interest_rate: Decimal,
    /// Fraction of a sale price withheld from the seller.
    pub market_fee: Decimal,
}

pub const CONFIG_PARAMETERS: [&str; 3] = ["tax_rate", "loan_interest_rate", "market_fee"];

impl EconomyConfig {
    pub fn set(&mut self, parameter: &str, value: Decimal) -> Result<()> {
        if value < Decimal::ZERO {
            return Err(EconomyError::ValidationError(format!(
                "{parameter} must not be negative"
            )));
        }
        match parameter {
            "tax_rate" | "market_fee" if value >= Decimal::ONE => Err(
                EconomyError::ValidationError(format!("{parameter} must be below 1")),
            ),
            "tax_rate" => {
                self.tax_rate = value;
                Ok(())
            }
            "market_fee" => {
                self.market_fee = value;
                Ok(())
            }
            "loan_interest_rate" => {
                self.loan_interest_rate = value;
                Ok(())
            }
            other => Err(EconomyError::ValidationError(format!(
                "Unknown parameter: {other}"
            ))),
        }
    }

    pub fn entries(&self) -> Vec<(&'static str, Decimal)> {
        vec![
            ("tax_rate", self.tax_rate),
            ("loan_interest_rate", self.loan_interest_rate),
            ("market_fee", self.market_fee),
        ]
    }
}

impl TenantEconomy {
    pub fn set_config(&mut self, parameter: &str, raw: &str) -> Result<()> {
        let value = parse_rate(raw)?;
        self.config.set(parameter, value)?;
        info!(parameter, %value, "economy config updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_set_known_parameters() {
        let mut economy = TenantEconomy::new();
        economy.set_config("market_fee", "0.05").unwrap();
        economy.set_config("loan_interest_rate", "5").unwrap();
        assert_eq!(economy.config.market_fee, dec!(0.05));
        assert_eq!(economy.config.loan_interest_rate, dec!(5));
    }

    #[test]
    fn test_rejects_unknown_and_invalid_values() {
        let mut economy = TenantEconomy::new();
        assert!(matches!(
            economy.set_config("exchange_fee", "0.1"),
            Err(EconomyError::ValidationError(_))
        ));
        assert!(economy.set_config("tax_rate", "abc").is_err());
        assert!(economy.set_config("tax_rate", "-0.1").is_err());
        assert!(economy.set_config("tax_rate", "1").is_err());
        assert_eq!(economy.config, EconomyConfig::default());
    }
}
