use super::economy::TenantEconomy;
use super::ids::UserId;
use super::money::Amount;
use crate::error::{EconomyError, EntityKind, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

const MILLIS_PER_MINUTE: i64 = 60_000;

/// A pool that refills at `regen_rate` units per minute up to `max_amount`.
///
/// `amount` is only accurate as of `last_update`; call [`Resource::reconcile`]
/// before reading or mutating it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub amount: Decimal,
    pub regen_rate: Decimal,
    pub max_amount: Decimal,
    pub last_update: DateTime<Utc>,
}

impl Resource {
    pub fn new(regen_rate: Decimal, max_amount: Decimal, now: DateTime<Utc>) -> Self {
        Self {
            amount: max_amount,
            regen_rate,
            max_amount,
            last_update: now,
        }
    }

    /// Applies regeneration for the time elapsed since the last observation.
    /// A clock that moved backwards regenerates nothing.
    pub fn reconcile(&mut self, now: DateTime<Utc>) {
        let elapsed_ms = (now - self.last_update).num_milliseconds().max(0);
        let minutes = Decimal::from(elapsed_ms) / Decimal::from(MILLIS_PER_MINUTE);
        // Anything that overflows is past the cap anyway.
        let regenerated = self
            .regen_rate
            .checked_mul(minutes)
            .and_then(|r| self.amount.checked_add(r))
            .unwrap_or(self.max_amount);
        self.amount = regenerated.min(self.max_amount).max(self.amount);
        if now > self.last_update {
            self.last_update = now;
        }
    }
}

impl TenantEconomy {
    pub fn create_resource(
        &mut self,
        name: &str,
        regen_rate: Decimal,
        max_amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if self.resources.contains_key(name) {
            return Err(EconomyError::already_exists(EntityKind::Resource, name));
        }
        if regen_rate < Decimal::ZERO || max_amount < Decimal::ZERO {
            return Err(EconomyError::ValidationError(
                "Regeneration rate and maximum must not be negative".to_string(),
            ));
        }
        self.resources
            .insert(name.to_string(), Resource::new(regen_rate, max_amount, now));
        Ok(())
    }

    /// Returns the resource after reconciling it against `now`.
    pub fn resource_info(&mut self, name: &str, now: DateTime<Utc>) -> Result<&Resource> {
        let resource = self
            .resources
            .get_mut(name)
            .ok_or_else(|| EconomyError::not_found(EntityKind::Resource, name))?;
        resource.reconcile(now);
        Ok(resource)
    }

    /// Takes `amount` out of the pool into the user's inventory.
    pub fn gather(
        &mut self,
        name: &str,
        user: &UserId,
        amount: Amount,
        now: DateTime<Utc>,
    ) -> Result<Decimal> {
        let resource = self
            .resources
            .get_mut(name)
            .ok_or_else(|| EconomyError::not_found(EntityKind::Resource, name))?;
        resource.reconcile(now);
        if resource.amount < amount.value() {
            return Err(EconomyError::insufficient(amount.value(), resource.amount));
        }
        if let Some(inventory) = self.inventories.get(user) {
            inventory.check_add(name, amount)?;
        }
        let Some(resource) = self.resources.get_mut(name) else {
            return Err(EconomyError::not_found(EntityKind::Resource, name));
        };
        resource.amount -= amount.value();
        let left = resource.amount;
        self.inventory_mut(user).add(name, amount)?;
        debug!(resource = name, %user, %amount, %left, "gathered");
        Ok(left)
    }
}
