use super::economy::TenantEconomy;
use super::ids::UserId;
use super::ledger::Wallet;
use super::money::{Amount, Balance};
use crate::error::{EconomyError, EntityKind, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Number of scheduler ticks the configured interest rate is spread over.
pub const INTEREST_TICKS_PER_PERIOD: u32 = 24;

/// A named, interest-bearing institution holding per-user accounts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bank {
    pub interest_rate: Decimal,
    pub accounts: BTreeMap<UserId, Wallet>,
}

impl Bank {
    pub fn new(interest_rate: Decimal) -> Self {
        Self {
            interest_rate,
            accounts: BTreeMap::new(),
        }
    }
}

impl TenantEconomy {
    pub fn create_bank(&mut self, name: &str, interest_rate: Decimal) -> Result<()> {
        if self.banks.contains_key(name) {
            return Err(EconomyError::already_exists(EntityKind::Bank, name));
        }
        if interest_rate < Decimal::ZERO {
            return Err(EconomyError::ValidationError(
                "Interest rate must not be negative".to_string(),
            ));
        }
        self.banks.insert(name.to_string(), Bank::new(interest_rate));
        Ok(())
    }

    fn bank_mut(&mut self, name: &str) -> Result<&mut Bank> {
        self.banks
            .get_mut(name)
            .ok_or_else(|| EconomyError::not_found(EntityKind::Bank, name))
    }

    /// Moves funds from the user's wallet into their account at `bank`.
    pub fn bank_deposit(
        &mut self,
        bank: &str,
        user: &UserId,
        currency: &str,
        amount: Amount,
    ) -> Result<Balance> {
        let target = self
            .banks
            .get(bank)
            .ok_or_else(|| EconomyError::not_found(EntityKind::Bank, bank))?;
        if let Some(account) = target.accounts.get(user) {
            account.check_credit(currency, amount)?;
        }
        self.ledger.debit(user, currency, amount)?;
        let account = self.bank_mut(bank)?.accounts.entry(user.clone()).or_default();
        account.credit(currency, amount)?;
        debug!(bank, %user, currency, %amount, "bank deposit");
        Ok(account.balance(currency))
    }

    /// Moves funds from the user's account at `bank` back into their wallet.
    pub fn bank_withdraw(
        &mut self,
        bank: &str,
        user: &UserId,
        currency: &str,
        amount: Amount,
    ) -> Result<Balance> {
        self.ledger.require_currency(currency)?;
        self.ledger.check_credit(user, currency, amount)?;
        let account = self
            .bank_mut(bank)?
            .accounts
            .get_mut(user)
            .ok_or_else(|| EconomyError::not_found(EntityKind::BankAccount, user.as_str()))?;
        account.debit(currency, amount)?;
        let remaining = account.balance(currency);
        self.ledger.wallet_mut(user).credit(currency, amount)?;
        debug!(bank, %user, currency, %amount, "bank withdrawal");
        Ok(remaining)
    }

    pub fn bank_balance(&self, bank: &str, user: &UserId) -> Result<&Wallet> {
        self.banks
            .get(bank)
            .ok_or_else(|| EconomyError::not_found(EntityKind::Bank, bank))?
            .accounts
            .get(user)
            .ok_or_else(|| EconomyError::not_found(EntityKind::BankAccount, user.as_str()))
    }

    /// Credits one tick of interest to every account balance. Returns the
    /// number of balances that grew. A balance whose interest would overflow
    /// is left as it is.
    pub fn accrue_interest(&mut self) -> usize {
        let ticks = Decimal::from(INTEREST_TICKS_PER_PERIOD);
        let mut credited = 0;
        for (name, bank) in self.banks.iter_mut() {
            let rate = bank.interest_rate;
            for (user, account) in bank.accounts.iter_mut() {
                for (currency, balance) in account.balances_mut() {
                    let Some(interest) = balance.value().checked_mul(rate).map(|i| i / ticks) else {
                        warn!(bank = %name, %user, currency = %currency, %balance, "interest overflows, skipped");
                        continue;
                    };
                    if interest <= Decimal::ZERO {
                        continue;
                    }
                    match balance.accrue(interest) {
                        Ok(()) => credited += 1,
                        Err(e) => {
                            warn!(bank = %name, %user, currency = %currency, error = %e, "interest skipped");
                        }
                    }
                }
            }
        }
        credited
    }
}
