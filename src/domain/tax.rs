use super::economy::TenantEconomy;
use crate::error::Result;
use rust_decimal::Decimal;
use tracing::info;

impl TenantEconomy {
    pub fn set_tax_rate(&mut self, rate: Decimal) -> Result<()> {
        self.config.set("tax_rate", rate)
    }

    pub fn tax_rate(&self) -> Decimal {
        self.config.tax_rate
    }

    /// Removes `balance * tax_rate` from every wallet balance and takes the
    /// same amount out of the currency's circulation figure, which is floored
    /// at zero. Returns the number of balances taxed.
    pub fn collect_taxes(&mut self) -> usize {
        let rate = self.config.tax_rate;
        if rate <= Decimal::ZERO {
            return 0;
        }
        let mut taxed = 0;
        let mut collected = Decimal::ZERO;
        for wallet in self.ledger.wallets.values_mut() {
            for (currency, balance) in wallet.balances_mut() {
                // A due amount too large to represent takes the whole balance.
                let due = balance.value().checked_mul(rate).unwrap_or(Decimal::MAX);
                let tax = balance.skim(due);
                if tax.is_zero() {
                    continue;
                }
                taxed += 1;
                collected = collected.saturating_add(tax);
                if let Some(c) = self.ledger.currencies.get_mut(currency) {
                    c.in_circulation = c.in_circulation.saturating_sub(tax).max(Decimal::ZERO);
                }
            }
        }
        if taxed > 0 {
            info!(%rate, balances = taxed, %collected, "taxes collected");
        }
        taxed
    }
}
