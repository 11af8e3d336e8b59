use crate::domain::economy::TenantEconomy;
use crate::domain::ids::TenantId;
use crate::domain::ports::SnapshotStore;
use crate::error::{EconomyError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, IteratorMode, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family holding one snapshot document per tenant.
pub const CF_TENANTS: &str = "tenants";

/// A persistent snapshot store using RocksDB.
///
/// Keys are the tenant id bytes and values the JSON snapshot document, so a
/// document is byte-for-byte what the JSON file store would write.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBSnapshotStore {
    db: Arc<DB>,
}

impl RocksDBSnapshotStore {
    /// Opens or creates a RocksDB instance at the specified path, ensuring the
    /// "tenants" column family exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_tenants = ColumnFamilyDescriptor::new(CF_TENANTS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_tenants])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn tenants_cf(&self) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(CF_TENANTS).ok_or_else(|| {
            EconomyError::InternalError(Box::new(std::io::Error::other(
                "Tenants column family not found",
            )))
        })
    }
}

#[async_trait]
impl SnapshotStore for RocksDBSnapshotStore {
    async fn load(&self, tenant: &TenantId) -> Result<Option<TenantEconomy>> {
        let cf = self.tenants_cf()?;
        match self.db.get_cf(cf, tenant.as_str().as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, tenant: &TenantId, economy: &TenantEconomy) -> Result<()> {
        let cf = self.tenants_cf()?;
        let value = serde_json::to_vec(economy)?;
        self.db.put_cf(cf, tenant.as_str().as_bytes(), value)?;
        Ok(())
    }

    async fn delete(&self, tenant: &TenantId) -> Result<()> {
        let cf = self.tenants_cf()?;
        self.db.delete_cf(cf, tenant.as_str().as_bytes())?;
        Ok(())
    }

    async fn tenants(&self) -> Result<Vec<TenantId>> {
        let cf = self.tenants_cf()?;
        let mut tenants = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (key, _value) = item?;
            let id = String::from_utf8(key.to_vec())
                .map_err(|e| EconomyError::InternalError(Box::new(e)))?;
            tenants.push(TenantId::new(id));
        }
        Ok(tenants)
    }
}
