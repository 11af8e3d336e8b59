use crate::domain::economy::TenantEconomy;
use crate::domain::ids::TenantId;
use crate::domain::ports::SnapshotStore;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory snapshot store.
///
/// Uses `Arc<RwLock<HashMap<TenantId, TenantEconomy>>>`; clones share the
/// same documents. Ideal for tests and runs without persistence.
#[derive(Default, Clone)]
pub struct InMemorySnapshotStore {
    documents: Arc<RwLock<HashMap<TenantId, TenantEconomy>>>,
}

impl InMemorySnapshotStore {
    /// Creates a new, empty in-memory snapshot store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn load(&self, tenant: &TenantId) -> Result<Option<TenantEconomy>> {
        let documents = self.documents.read().await;
        Ok(documents.get(tenant).cloned())
    }

    async fn save(&self, tenant: &TenantId, economy: &TenantEconomy) -> Result<()> {
        let mut documents = self.documents.write().await;
        documents.insert(tenant.clone(), economy.clone());
        Ok(())
    }

    async fn delete(&self, tenant: &TenantId) -> Result<()> {
        let mut documents = self.documents.write().await;
        documents.remove(tenant);
        Ok(())
    }

    async fn tenants(&self) -> Result<Vec<TenantId>> {
        let documents = self.documents.read().await;
        let mut tenants: Vec<TenantId> = documents.keys().cloned().collect();
        tenants.sort();
        Ok(tenants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_in_memory_snapshot_store() {
        let store = InMemorySnapshotStore::new();
        let tenant = TenantId::from("guild-1");
        let mut economy = TenantEconomy::new();
        economy.ledger.create_currency("gold", "G", dec!(1)).unwrap();

        store.save(&tenant, &economy).await.unwrap();
        let retrieved = store.load(&tenant).await.unwrap().unwrap();
        assert_eq!(retrieved, economy);

        assert!(store.load(&TenantId::from("guild-2")).await.unwrap().is_none());
        assert_eq!(store.tenants().await.unwrap(), vec![tenant.clone()]);

        store.delete(&tenant).await.unwrap();
        assert!(store.load(&tenant).await.unwrap().is_none());
    }
}
