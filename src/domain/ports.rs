use super::economy::TenantEconomy;
use super::ids::TenantId;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Persistence of whole-tenant snapshot documents.
///
/// `save` is a full overwrite of the tenant's document; `load` returns `None`
/// for a tenant that has never been saved.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn load(&self, tenant: &TenantId) -> Result<Option<TenantEconomy>>;
    async fn save(&self, tenant: &TenantId, economy: &TenantEconomy) -> Result<()>;
    async fn delete(&self, tenant: &TenantId) -> Result<()>;
    async fn tenants(&self) -> Result<Vec<TenantId>>;
}

pub type SnapshotStoreBox = Box<dyn SnapshotStore>;

/// Source of wall-clock time for regeneration, due dates and ticks.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Clocks are shared between the engine and the scheduler.
pub type SharedClock = Arc<dyn Clock>;
