//! The per-tenant aggregate.
//!
//! `TenantEconomy` owns every entity of one economy. Subsystems are `impl`
//! blocks spread over the sibling modules and all operate on this single
//! value, so a `&mut TenantEconomy` is the whole critical section of an
//! operation. Its serde layout is the persisted snapshot document.

use super::bank::Bank;
use super::config::EconomyConfig;
use super::crafting::Recipe;
use super::ids::UserId;
use super::inventory::{Inventory, Item};
use super::ledger::Ledger;
use super::loan::Loan;
use super::market::Market;
use super::payroll::Job;
use super::resource::Resource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TenantEconomy {
    #[serde(flatten)]
    pub ledger: Ledger,
    pub items: BTreeMap<String, Item>,
    pub markets: BTreeMap<String, Market>,
    pub jobs: BTreeMap<String, Job>,
    pub banks: BTreeMap<String, Bank>,
    pub resources: BTreeMap<String, Resource>,
    pub recipes: BTreeMap<String, Recipe>,
    pub loans: BTreeMap<UserId, Loan>,
    pub config: EconomyConfig,
    pub inventories: BTreeMap<UserId, Inventory>,
    pub eco_roles: BTreeMap<UserId, String>,
    pub eco_hooks: BTreeMap<String, String>,
}

/// What one scheduler tick did to a tenant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaintenanceReport {
    pub accounts_credited: usize,
    pub salaries_paid: usize,
    pub loans_penalized: usize,
    pub balances_taxed: usize,
}

impl TenantEconomy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inventory_mut(&mut self, user: &UserId) -> &mut Inventory {
        self.inventories.entry(user.clone()).or_default()
    }

    pub fn inventory(&self, user: &UserId) -> Inventory {
        self.inventories.get(user).cloned().unwrap_or_default()
    }

    /// Runs every recurring job once, in a fixed order.
    pub fn run_maintenance(&mut self, now: DateTime<Utc>) -> MaintenanceReport {
        let report = MaintenanceReport {
            accounts_credited: self.accrue_interest(),
            salaries_paid: self.pay_salaries(),
            loans_penalized: self.review_overdue(now),
            balances_taxed: self.collect_taxes(),
        };
        if report != MaintenanceReport::default() {
            info!(?report, "maintenance applied");
        }
        report
    }

    pub fn assign_role(&mut self, user: &UserId, role: &str) {
        self.eco_roles.insert(user.clone(), role.to_string());
    }

    pub fn has_role(&self, user: &UserId, role: &str) -> bool {
        self.eco_roles.get(user).is_some_and(|r| r == role)
    }

    pub fn set_hook(&mut self, trigger: &str, action: &str) {
        self.eco_hooks.insert(trigger.to_string(), action.to_string());
    }
}
