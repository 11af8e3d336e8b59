//! Process settings loaded from a TOML file.
//!
//! ```toml
//! tick_interval_secs = 3600
//! data_dir = "data"
//! log_filter = "info"
//! save_after_tick = true
//! ```

use crate::error::{EconomyError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Seconds between scheduler ticks.
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,
    /// Directory of per-tenant JSON snapshots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    /// RocksDB directory; used only with the `storage-rocksdb` feature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
    /// `tracing` filter directive, overridden by `RUST_LOG`.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Persist each tenant after the scheduler has maintained it.
    #[serde(default = "default_save_after_tick")]
    pub save_after_tick: bool,
}

fn default_tick_interval_secs() -> u64 {
    3600
}

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_save_after_tick() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval_secs(),
            data_dir: None,
            db_path: None,
            log_filter: default_log_filter(),
            save_after_tick: default_save_after_tick(),
        }
    }
}

impl Settings {
    /// Reads settings from `path`. A missing file yields the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        match std::fs::read_to_string(path.as_ref()) {
            Ok(text) => Self::from_toml(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.tick_interval_secs == 0 {
            return Err(EconomyError::ValidationError(
                "tick_interval_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }
}
