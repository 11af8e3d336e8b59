//! Application layer orchestrating tenant economies.
//!
//! `TenantStore` owns the tenant map and each tenant's lock, `EconomyEngine`
//! applies commands through it, and `Scheduler` drives the periodic
//! maintenance of every loaded tenant.

pub mod command;
pub mod engine;
pub mod scheduler;
pub mod tenant_store;
