//! Domain layer: the synchronous economy core.
//!
//! Nothing here performs I/O or locking. Every subsystem is an `impl` block
//! on [`economy::TenantEconomy`], so callers that hold `&mut TenantEconomy`
//! hold the tenant's entire state for the duration of the operation.

pub mod analytics;
pub mod bank;
pub mod config;
pub mod crafting;
pub mod economy;
pub mod ids;
pub mod inventory;
pub mod ledger;
pub mod loan;
pub mod market;
pub mod money;
pub mod payroll;
pub mod ports;
pub mod resource;
pub mod tax;
