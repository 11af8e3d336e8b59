use crate::domain::economy::TenantEconomy;
use crate::domain::ids::TenantId;
use crate::domain::ports::SnapshotStore;
use crate::error::{EconomyError, Result};
use async_trait::async_trait;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

const FILE_PREFIX: &str = "economy_";
const FILE_SUFFIX: &str = ".json";

/// Stores each tenant as `economy_<tenant>.json` inside a directory.
///
/// Writes go to a temporary file in the same directory which is then renamed
/// over the document, so a crash never leaves a half-written snapshot.
#[derive(Debug, Clone)]
pub struct JsonFileSnapshotStore {
    dir: PathBuf,
}

impl JsonFileSnapshotStore {
    /// Opens the store, creating the directory if needed.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, tenant: &TenantId) -> Result<PathBuf> {
        let id = tenant.as_str();
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(EconomyError::ValidationError(format!(
                "Tenant id '{id}' is not usable as a file name"
            )));
        }
        Ok(self.dir.join(format!("{FILE_PREFIX}{id}{FILE_SUFFIX}")))
    }
}

#[async_trait]
impl SnapshotStore for JsonFileSnapshotStore {
    async fn load(&self, tenant: &TenantId) -> Result<Option<TenantEconomy>> {
        let path = self.path_for(tenant)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, tenant: &TenantId, economy: &TenantEconomy) -> Result<()> {
        let path = self.path_for(tenant)?;
        let bytes = serde_json::to_vec_pretty(economy)?;
        let dir = self.dir.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut file = NamedTempFile::new_in(&dir)?;
            file.write_all(&bytes)?;
            file.as_file().sync_all()?;
            file.persist(&path).map_err(|e| EconomyError::IoError(e.error))?;
            debug!(path = %path.display(), "snapshot written");
            Ok(())
        })
        .await
        .map_err(|e| EconomyError::InternalError(Box::new(e)))?
    }

    async fn delete(&self, tenant: &TenantId) -> Result<()> {
        let path = self.path_for(tenant)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn tenants(&self) -> Result<Vec<TenantId>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut tenants = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if let Some(id) = name
                .strip_prefix(FILE_PREFIX)
                .and_then(|rest| rest.strip_suffix(FILE_SUFFIX))
            {
                tenants.push(TenantId::new(id));
            }
        }
        tenants.sort();
        Ok(tenants)
    }
}
