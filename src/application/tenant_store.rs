use crate::domain::economy::TenantEconomy;
use crate::domain::ids::TenantId;
use crate::domain::ports::SnapshotStoreBox;
use crate::error::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::{debug, error, info};

/// One tenant's state and the gate ordering its snapshot writes.
#[derive(Debug)]
pub struct Tenant {
    /// The tenant's critical section.
    economy: Mutex<TenantEconomy>,
    /// Held from taking a copy until its write finishes, and across a purge,
    /// so an older copy never lands after a newer write or a delete.
    writes: Mutex<()>,
}

impl Tenant {
    fn new(economy: TenantEconomy) -> Self {
        Self {
            economy: Mutex::new(economy),
            writes: Mutex::new(()),
        }
    }

    pub async fn lock(&self) -> MutexGuard<'_, TenantEconomy> {
        self.economy.lock().await
    }
}

pub type TenantHandle = Arc<Tenant>;

/// Maps tenant ids to their isolated economies.
///
/// Tenants are loaded lazily from the snapshot store on first access; a tenant
/// that was never saved starts empty. Every operation on a tenant runs while
/// holding that tenant's lock, and snapshot I/O always happens on a clone after
/// the lock is released. Writes and deletes of one tenant's snapshot are
/// serialized in the order their copies were taken.
pub struct TenantStore {
    tenants: RwLock<HashMap<TenantId, TenantHandle>>,
    snapshots: SnapshotStoreBox,
}

impl TenantStore {
    pub fn new(snapshots: SnapshotStoreBox) -> Self {
        Self {
            tenants: RwLock::new(HashMap::new()),
            snapshots,
        }
    }

    /// Returns the tenant's handle, loading or creating its state if needed.
    ///
    /// Repeated calls for the same tenant return the same handle, so existing
    /// state is never replaced by a fresh default.
    pub async fn handle(&self, tenant: &TenantId) -> Result<TenantHandle> {
        if let Some(handle) = self.tenants.read().await.get(tenant) {
            return Ok(handle.clone());
        }

        let loaded = self.snapshots.load(tenant).await?;
        let mut tenants = self.tenants.write().await;
        // Another task may have loaded the tenant while we awaited the store.
        let handle = tenants.entry(tenant.clone()).or_insert_with(|| {
            match &loaded {
                Some(_) => debug!(%tenant, "tenant loaded from snapshot"),
                None => debug!(%tenant, "tenant created"),
            }
            Arc::new(Tenant::new(loaded.unwrap_or_default()))
        });
        Ok(handle.clone())
    }

    /// Runs `op` inside the tenant's critical section.
    pub async fn with_tenant<R, F>(&self, tenant: &TenantId, op: F) -> Result<R>
    where
        F: FnOnce(&mut TenantEconomy) -> Result<R>,
    {
        let handle = self.handle(tenant).await?;
        let mut economy = handle.lock().await;
        op(&mut economy)
    }

    /// A consistent copy of the tenant's state.
    pub async fn snapshot(&self, tenant: &TenantId) -> Result<TenantEconomy> {
        let handle = self.handle(tenant).await?;
        let economy = handle.lock().await;
        Ok(economy.clone())
    }

    /// Persists one tenant as a full overwrite of its snapshot document.
    pub async fn save(&self, tenant: &TenantId) -> Result<()> {
        let handle = self.handle(tenant).await?;
        let _writes = handle.writes.lock().await;
        let snapshot = handle.lock().await.clone();
        self.snapshots.save(tenant, &snapshot).await.inspect_err(|e| {
            error!(%tenant, error = %e, "failed to save snapshot");
        })
    }

    /// Persists every loaded tenant. Returns how many were written.
    pub async fn save_all(&self) -> Result<usize> {
        let tenants = self.tenant_ids().await;
        for tenant in &tenants {
            self.save(tenant).await?;
        }
        info!(tenants = tenants.len(), "snapshots persisted");
        Ok(tenants.len())
    }

    /// Loads every tenant the snapshot store knows about.
    pub async fn load_all(&self) -> Result<usize> {
        let tenants = self.snapshots.tenants().await?;
        for tenant in &tenants {
            self.handle(tenant).await?;
        }
        info!(tenants = tenants.len(), "snapshots loaded");
        Ok(tenants.len())
    }

    /// Clears the tenant's state and deletes its snapshot document. Waits for
    /// any save already in progress, so the deleted document stays deleted.
    pub async fn purge(&self, tenant: &TenantId) -> Result<()> {
        let handle = self.handle(tenant).await?;
        let _writes = handle.writes.lock().await;
        let mut economy = handle.lock().await;
        *economy = TenantEconomy::default();
        self.snapshots.delete(tenant).await?;
        info!(%tenant, "tenant purged");
        Ok(())
    }

    /// Ids of the tenants currently held in memory, sorted.
    pub async fn tenant_ids(&self) -> Vec<TenantId> {
        let mut ids: Vec<TenantId> = self.tenants.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }
}
