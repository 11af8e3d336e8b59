use super::tenant_store::TenantStore;
use crate::domain::economy::MaintenanceReport;
use crate::domain::ids::TenantId;
use crate::domain::ports::SharedClock;
use crate::error::EconomyError;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Drives the recurring jobs of every loaded tenant.
///
/// Each tick runs bank interest, payroll, loan review and tax collection for
/// one tenant at a time under that tenant's lock. Missed ticks are dropped,
/// never replayed, and a tick that starts while another is still running is
/// skipped.
pub struct Scheduler {
    store: Arc<TenantStore>,
    clock: SharedClock,
    period: Duration,
    persist: bool,
    in_flight: AtomicBool,
}

/// Outcome of one tick across all tenants.
#[derive(Debug, Default)]
pub struct TickReport {
    pub maintained: Vec<(TenantId, MaintenanceReport)>,
    /// Tenants whose maintenance or snapshot save failed. A tenant that was
    /// maintained but not saved appears in both lists.
    pub failed: Vec<(TenantId, EconomyError)>,
}

struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Scheduler {
    pub fn new(store: Arc<TenantStore>, clock: SharedClock, period: Duration) -> Self {
        Self {
            store,
            clock,
            period,
            persist: false,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Save every tenant's snapshot after it has been maintained.
    pub fn with_persistence(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    /// Runs one tick across all tenants. Returns `None` when a previous tick
    /// is still in progress. A failing tenant is logged and reported without
    /// stopping the others.
    pub async fn tick(&self) -> Option<TickReport> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            warn!("previous tick still running, skipping");
            return None;
        }
        let _guard = InFlight(&self.in_flight);

        let now = self.clock.now();
        let mut tick = TickReport::default();
        for tenant in self.store.tenant_ids().await {
            let report = match self
                .store
                .with_tenant(&tenant, |economy| Ok(economy.run_maintenance(now)))
                .await
            {
                Ok(report) => report,
                Err(e) => {
                    error!(%tenant, error = %e, "tenant maintenance failed");
                    tick.failed.push((tenant, e));
                    continue;
                }
            };
            debug!(%tenant, ?report, "tenant maintained");
            if self.persist
                && let Err(e) = self.store.save(&tenant).await
            {
                tick.failed.push((tenant.clone(), e));
            }
            tick.maintained.push((tenant, report));
        }
        info!(
            tenants = tick.maintained.len(),
            failed = tick.failed.len(),
            "tick complete"
        );
        Some(tick)
    }

    /// Ticks every `period` until `shutdown` resolves. The first tick fires
    /// one full period after start.
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let start = tokio::time::Instant::now() + self.period;
        let mut interval = tokio::time::interval_at(start, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        info!(period_secs = self.period.as_secs(), "scheduler started");
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.tick().await;
                }
                _ = &mut shutdown => {
                    info!("scheduler stopping");
                    break;
                }
            }
        }
    }
}
