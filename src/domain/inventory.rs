use super::economy::TenantEconomy;
use super::ids::UserId;
use super::money::{Amount, Balance};
use crate::error::{EconomyError, EntityKind, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A registered item type with free-form properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Item {
    pub properties: BTreeMap<String, String>,
}

impl Item {
    /// Builds an item from `key=value` pairs.
    pub fn from_pairs<S: AsRef<str>>(pairs: &[S]) -> Result<Self> {
        let mut properties = BTreeMap::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                EconomyError::ValidationError(format!("Property '{pair}' is not key=value"))
            })?;
            if key.is_empty() {
                return Err(EconomyError::ValidationError(format!(
                    "Property '{pair}' has an empty key"
                )));
            }
            properties.insert(key.to_string(), value.to_string());
        }
        Ok(Self { properties })
    }
}

/// Counts of items, gathered resources and crafted goods held by one user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    entries: BTreeMap<String, Balance>,
}

impl Inventory {
    pub fn quantity(&self, name: &str) -> Decimal {
        self.entries.get(name).map(Balance::value).unwrap_or_default()
    }

    pub fn has(&self, name: &str, amount: Amount) -> bool {
        self.entries
            .get(name)
            .is_some_and(|balance| balance.covers(amount))
    }

    pub fn add(&mut self, name: &str, amount: Amount) -> Result<()> {
        self.entries.entry(name.to_string()).or_default().credit(amount)
    }

    /// Fails if adding `amount` would overflow, without changing anything.
    pub fn check_add(&self, name: &str, amount: Amount) -> Result<()> {
        self.entries
            .get(name)
            .copied()
            .unwrap_or_default()
            .checked_credit(amount)
            .map(|_| ())
    }

    pub fn remove(&mut self, name: &str, amount: Amount) -> Result<()> {
        match self.entries.get_mut(name) {
            Some(balance) => balance.debit(amount),
            None => Err(EconomyError::insufficient(amount.value(), Decimal::ZERO)),
        }
    }

    pub fn entries(&self) -> &BTreeMap<String, Balance> {
        &self.entries
    }
}

impl TenantEconomy {
    pub fn create_item<S: AsRef<str>>(&mut self, name: &str, properties: &[S]) -> Result<()> {
        if self.items.contains_key(name) {
            return Err(EconomyError::already_exists(EntityKind::Item, name));
        }
        let item = Item::from_pairs(properties)?;
        self.items.insert(name.to_string(), item);
        Ok(())
    }

    pub fn item(&self, name: &str) -> Result<&Item> {
        self.items
            .get(name)
            .ok_or_else(|| EconomyError::not_found(EntityKind::Item, name))
    }

    /// Grants units of a registered item.
    pub fn give_item(&mut self, user: &UserId, item: &str, amount: Amount) -> Result<Decimal> {
        self.item(item)?;
        let inventory = self.inventory_mut(user);
        inventory.add(item, amount)?;
        Ok(inventory.quantity(item))
    }
}
