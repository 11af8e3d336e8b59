use clap::Parser;
use guild_economy::application::engine::EconomyEngine;
use guild_economy::application::scheduler::Scheduler;
use guild_economy::application::tenant_store::TenantStore;
use guild_economy::domain::ports::{SharedClock, SnapshotStoreBox};
use guild_economy::infrastructure::clock::SystemClock;
use guild_economy::infrastructure::in_memory::InMemorySnapshotStore;
use guild_economy::infrastructure::json_file::JsonFileSnapshotStore;
#[cfg(feature = "storage-rocksdb")]
use guild_economy::infrastructure::rocksdb::RocksDBSnapshotStore;
use guild_economy::interfaces::csv::command_reader::CommandReader;
use guild_economy::interfaces::csv::wallet_writer::WalletWriter;
use guild_economy::settings::Settings;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// CSV command script, one `tenant,operation,args...` row per command
    script: Option<PathBuf>,

    /// TOML settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory of per-tenant JSON snapshots
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Maintenance ticks to run after the script
    #[arg(long, default_value_t = 0)]
    ticks: u32,

    /// Keep running the scheduler until Ctrl-C
    #[arg(long)]
    serve: bool,
}

fn open_snapshot_store(settings: &Settings) -> Result<SnapshotStoreBox> {
    if let Some(db_path) = &settings.db_path {
        #[cfg(feature = "storage-rocksdb")]
        {
            let store = RocksDBSnapshotStore::open(db_path).into_diagnostic()?;
            info!(path = %db_path.display(), "using RocksDB snapshots");
            return Ok(Box::new(store));
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        {
            warn!(
                path = %db_path.display(),
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            return Ok(Box::new(InMemorySnapshotStore::new()));
        }
    }
    if let Some(dir) = &settings.data_dir {
        let store = JsonFileSnapshotStore::open(dir).into_diagnostic()?;
        info!(dir = %dir.display(), "using JSON snapshots");
        return Ok(Box::new(store));
    }
    Ok(Box::new(InMemorySnapshotStore::new()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => Settings::load(path).into_diagnostic()?,
        None => Settings::default(),
    };
    if cli.data_dir.is_some() {
        settings.data_dir = cli.data_dir.clone();
    }
    if cli.db_path.is_some() {
        settings.db_path = cli.db_path.clone();
    }

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter)),
        )
        .init();

    let store = Arc::new(TenantStore::new(open_snapshot_store(&settings)?));
    store.load_all().await.into_diagnostic()?;

    let clock: SharedClock = Arc::new(SystemClock);
    let engine = EconomyEngine::new(store.clone(), clock.clone());

    // Apply the command script
    if let Some(script) = &cli.script {
        let file = File::open(script).into_diagnostic()?;
        let reader = CommandReader::new(file);
        for parsed in reader.commands() {
            match parsed {
                Ok((tenant, command)) => {
                    if let Err(e) = engine.process(&tenant, command).await {
                        warn!(%tenant, kind = ?e.kind(), "Error processing command: {}", e);
                    }
                }
                Err(e) => {
                    warn!("Error reading command: {}", e);
                }
            }
        }
    }

    let scheduler = Scheduler::new(store.clone(), clock, settings.tick_interval())
        .with_persistence(settings.save_after_tick);
    for _ in 0..cli.ticks {
        if let Some(tick) = scheduler.tick().await
            && !tick.failed.is_empty()
        {
            warn!(failed = tick.failed.len(), "some tenants failed maintenance");
        }
    }
    if cli.serve {
        scheduler
            .run(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!(error = %e, "failed to listen for Ctrl-C");
                }
            })
            .await;
    }

    store.save_all().await.into_diagnostic()?;

    // Output final state
    let rows = engine.wallet_table().await.into_diagnostic()?;
    let stdout = io::stdout();
    let mut writer = WalletWriter::new(stdout.lock());
    writer.write_wallets(&rows).into_diagnostic()?;

    Ok(())
}
