//! Currency registry and per-user multi-currency wallets.
//!
//! Every balance-affecting operation in the other subsystems goes through
//! [`Ledger::wallet_mut`], which enforces the lazy wallet creation and
//! backfill rules.

use super::ids::UserId;
use super::money::{Amount, Balance};
use crate::error::{EconomyError, EntityKind, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    pub symbol: String,
    /// Informational only; no conversion is performed.
    pub exchange_rate: Decimal,
    /// Running adjustment, may go negative.
    pub total_supply: Decimal,
    pub in_circulation: Decimal,
}

impl Currency {
    pub fn new(symbol: impl Into<String>, exchange_rate: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            exchange_rate,
            total_supply: Decimal::ZERO,
            in_circulation: Decimal::ZERO,
        }
    }
}

/// A mapping currency name to balance.
///
/// Also used as the per-currency holdings of a bank account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wallet {
    balances: BTreeMap<String, Balance>,
}

impl Wallet {
    pub fn balance(&self, currency: &str) -> Balance {
        self.balances.get(currency).copied().unwrap_or_default()
    }

    pub fn balances(&self) -> &BTreeMap<String, Balance> {
        &self.balances
    }

    pub fn credit(&mut self, currency: &str, amount: Amount) -> Result<()> {
        self.balances
            .entry(currency.to_string())
            .or_default()
            .credit(amount)
    }

    /// Fails if crediting `amount` would overflow, without changing anything.
    pub fn check_credit(&self, currency: &str, amount: Amount) -> Result<()> {
        self.balance(currency).checked_credit(amount).map(|_| ())
    }

    pub fn debit(&mut self, currency: &str, amount: Amount) -> Result<()> {
        match self.balances.get_mut(currency) {
            Some(balance) => balance.debit(amount),
            None => Err(EconomyError::insufficient(amount.value(), Decimal::ZERO)),
        }
    }

    pub fn ensure(&mut self, currency: &str) {
        self.balances.entry(currency.to_string()).or_default();
    }

    pub(crate) fn balances_mut(&mut self) -> impl Iterator<Item = (&String, &mut Balance)> {
        self.balances.iter_mut()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ledger {
    pub currencies: BTreeMap<String, Currency>,
    pub wallets: BTreeMap<UserId, Wallet>,
}

impl Ledger {
    pub fn create_currency(
        &mut self,
        name: &str,
        symbol: &str,
        exchange_rate: Decimal,
    ) -> Result<&Currency> {
        if self.currencies.contains_key(name) {
            return Err(EconomyError::already_exists(EntityKind::Currency, name));
        }
        if exchange_rate < Decimal::ZERO {
            return Err(EconomyError::ValidationError(
                "Exchange rate must not be negative".to_string(),
            ));
        }
        debug!(currency = name, symbol, %exchange_rate, "currency created");
        Ok(self
            .currencies
            .entry(name.to_string())
            .or_insert_with(|| Currency::new(symbol, exchange_rate)))
    }

    pub fn currency(&self, name: &str) -> Result<&Currency> {
        self.currencies
            .get(name)
            .ok_or_else(|| EconomyError::not_found(EntityKind::Currency, name))
    }

    pub fn require_currency(&self, name: &str) -> Result<()> {
        self.currency(name).map(|_| ())
    }

    pub fn adjust_supply(&mut self, name: &str, delta: Decimal) -> Result<Decimal> {
        let currency = self
            .currencies
            .get_mut(name)
            .ok_or_else(|| EconomyError::not_found(EntityKind::Currency, name))?;
        currency.total_supply = currency
            .total_supply
            .checked_add(delta)
            .ok_or_else(|| EconomyError::overflow(format!("adjusting the supply of {name}")))?;
        Ok(currency.total_supply)
    }

    /// Returns the user's wallet, creating it with a zero balance for every
    /// registered currency and backfilling currencies registered since.
    pub fn wallet_mut(&mut self, user: &UserId) -> &mut Wallet {
        let wallet = self.wallets.entry(user.clone()).or_default();
        for name in self.currencies.keys() {
            wallet.ensure(name);
        }
        wallet
    }

    pub fn wallet(&mut self, user: &UserId) -> &Wallet {
        self.wallet_mut(user)
    }

    pub fn balance(&self, user: &UserId, currency: &str) -> Result<Balance> {
        self.require_currency(currency)?;
        Ok(self
            .wallets
            .get(user)
            .map(|w| w.balance(currency))
            .unwrap_or_default())
    }

    pub fn credit(&mut self, user: &UserId, currency: &str, amount: Amount) -> Result<()> {
        self.require_currency(currency)?;
        self.wallet_mut(user).credit(currency, amount)
    }

    /// Fails if crediting the user would overflow. Never creates a wallet.
    pub fn check_credit(&self, user: &UserId, currency: &str, amount: Amount) -> Result<()> {
        match self.wallets.get(user) {
            Some(wallet) => wallet.check_credit(currency, amount),
            None => Ok(()),
        }
    }

    pub fn debit(&mut self, user: &UserId, currency: &str, amount: Amount) -> Result<()> {
        self.require_currency(currency)?;
        self.wallet_mut(user).debit(currency, amount)
    }

    /// Moves `amount` between two wallets. Nothing changes unless the debit succeeds.
    pub fn transfer(
        &mut self,
        from: &UserId,
        to: &UserId,
        currency: &str,
        amount: Amount,
    ) -> Result<()> {
        self.require_currency(currency)?;
        if from != to {
            self.check_credit(to, currency, amount)?;
        }
        self.wallet_mut(from).debit(currency, amount)?;
        self.wallet_mut(to).credit(currency, amount)?;
        debug!(%from, %to, currency, %amount, "transfer");
        Ok(())
    }

    /// Mints funds into a wallet and counts them as circulating.
    pub fn grant(&mut self, user: &UserId, currency: &str, amount: Amount) -> Result<Balance> {
        let circulating = self
            .currency(currency)?
            .in_circulation
            .checked_add(amount.value())
            .ok_or_else(|| EconomyError::overflow(format!("granting {amount} {currency}")))?;
        let wallet = self.wallet_mut(user);
        wallet.credit(currency, amount)?;
        let balance = wallet.balance(currency);
        if let Some(c) = self.currencies.get_mut(currency) {
            c.in_circulation = circulating;
        }
        Ok(balance)
    }

    /// Sum of a currency across all wallets, saturating at `Decimal::MAX`.
    pub fn wallet_total(&self, currency: &str) -> Decimal {
        self.wallets
            .values()
            .map(|w| w.balance(currency).value())
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn amount(v: Decimal) -> Amount {
        Amount::new(v).unwrap()
    }

    fn ledger_with_gold() -> Ledger {
        let mut ledger = Ledger::default();
        ledger.create_currency("gold", "G", dec!(1)).unwrap();
        ledger
    }

    #[test]
    fn test_create_currency_duplicate() {
        let mut ledger = ledger_with_gold();
        let result = ledger.create_currency("gold", "g", dec!(2));
        assert!(matches!(result, Err(EconomyError::AlreadyExists { .. })));
        assert_eq!(ledger.currency("gold").unwrap().symbol, "G");
    }

    #[test]
    fn test_adjust_supply() {
        let mut ledger = ledger_with_gold();
        assert_eq!(ledger.adjust_supply("gold", dec!(-5)).unwrap(), dec!(-5));
        assert_eq!(ledger.adjust_supply("gold", dec!(12)).unwrap(), dec!(7));
        assert!(matches!(
            ledger.adjust_supply("silver", dec!(1)),
            Err(EconomyError::NotFound { .. })
        ));
    }

    #[test]
    fn test_wallet_backfills_new_currency() {
        let mut ledger = ledger_with_gold();
        let alice = UserId::from("alice");
        assert_eq!(ledger.wallet(&alice).balances().len(), 1);

        ledger.create_currency("silver", "S", dec!(0.1)).unwrap();
        let wallet = ledger.wallet(&alice);
        assert_eq!(wallet.balances().len(), 2);
        assert_eq!(wallet.balance("silver"), Balance::ZERO);
    }

    #[test]
    fn test_wallet_access_is_idempotent() {
        let mut ledger = ledger_with_gold();
        let alice = UserId::from("alice");
        ledger.grant(&alice, "gold", amount(dec!(30))).unwrap();
        ledger.wallet_mut(&alice);
        ledger.wallet_mut(&alice);
        assert_eq!(ledger.balance(&alice, "gold").unwrap(), Balance::new(dec!(30)));
        assert_eq!(ledger.wallets.len(), 1);
    }

    #[test]
    fn test_transfer_conserves_total() {
        let mut ledger = ledger_with_gold();
        let alice = UserId::from("alice");
        let bob = UserId::from("bob");
        ledger.grant(&alice, "gold", amount(dec!(100))).unwrap();
        ledger.grant(&bob, "gold", amount(dec!(5))).unwrap();

        ledger.transfer(&alice, &bob, "gold", amount(dec!(40))).unwrap();

        assert_eq!(ledger.balance(&alice, "gold").unwrap(), Balance::new(dec!(60)));
        assert_eq!(ledger.balance(&bob, "gold").unwrap(), Balance::new(dec!(45)));
        assert_eq!(ledger.wallet_total("gold"), dec!(105));
    }

    #[test]
    fn test_transfer_insufficient_leaves_both_wallets() {
        let mut ledger = ledger_with_gold();
        let alice = UserId::from("alice");
        let bob = UserId::from("bob");
        ledger.grant(&alice, "gold", amount(dec!(10))).unwrap();

        let result = ledger.transfer(&alice, &bob, "gold", amount(dec!(11)));
        assert!(matches!(
            result,
            Err(EconomyError::InsufficientFunds { .. })
        ));
        assert_eq!(ledger.balance(&alice, "gold").unwrap(), Balance::new(dec!(10)));
        assert_eq!(ledger.balance(&bob, "gold").unwrap(), Balance::ZERO);
    }

    #[test]
    fn test_transfer_unknown_currency() {
        let mut ledger = ledger_with_gold();
        let result = ledger.transfer(
            &UserId::from("a"),
            &UserId::from("b"),
            "copper",
            amount(dec!(1)),
        );
        assert!(matches!(result, Err(EconomyError::NotFound { .. })));
    }

    #[test]
    fn test_grant_tracks_circulation() {
        let mut ledger = ledger_with_gold();
        ledger
            .grant(&UserId::from("alice"), "gold", amount(dec!(25)))
            .unwrap();
        assert_eq!(ledger.currency("gold").unwrap().in_circulation, dec!(25));
    }

    #[test]
    fn test_grant_overflow_is_rejected() {
        let mut ledger = ledger_with_gold();
        let alice = UserId::from("alice");
        ledger.grant(&alice, "gold", amount(Decimal::MAX)).unwrap();

        let result = ledger.grant(&alice, "gold", amount(dec!(1)));
        assert!(matches!(result, Err(EconomyError::ValidationError(_))));
        assert_eq!(ledger.balance(&alice, "gold").unwrap(), Balance::new(Decimal::MAX));
        assert_eq!(ledger.currency("gold").unwrap().in_circulation, Decimal::MAX);
    }

    #[test]
    fn test_transfer_overflow_leaves_sender_untouched() {
        let mut ledger = ledger_with_gold();
        let alice = UserId::from("alice");
        let bob = UserId::from("bob");
        ledger.grant(&alice, "gold", amount(dec!(10))).unwrap();
        ledger.wallet_mut(&bob).credit("gold", amount(Decimal::MAX)).unwrap();

        let result = ledger.transfer(&alice, &bob, "gold", amount(dec!(1)));
        assert!(matches!(result, Err(EconomyError::ValidationError(_))));
        assert_eq!(ledger.balance(&alice, "gold").unwrap(), Balance::new(dec!(10)));
        assert_eq!(ledger.balance(&bob, "gold").unwrap(), Balance::new(Decimal::MAX));
    }

    #[test]
    fn test_adjust_supply_overflow() {
        let mut ledger = ledger_with_gold();
        ledger.adjust_supply("gold", Decimal::MAX).unwrap();
        assert!(matches!(
            ledger.adjust_supply("gold", dec!(1)),
            Err(EconomyError::ValidationError(_))
        ));
        assert_eq!(ledger.currency("gold").unwrap().total_supply, Decimal::MAX);
    }
}
