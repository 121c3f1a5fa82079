//! # Reconcile Scheduler
//!
//! Background task that periodically runs the notification reconciliation
//! engine for every tenant. The interval between ticks is jittered so
//! multiple instances do not reconcile in lockstep; the engine itself is
//! idempotent, so overlapping passes converge on the same state.

use std::sync::Arc;

use metrics::{counter, histogram};
use rand::Rng;
use sea_orm::DatabaseConnection;
use tokio::time::{Duration, Instant, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

use crate::config::{AppConfig, ReconcileConfig};
use crate::deficiencies::default_registry;
use crate::error::RepositoryError;
use crate::reconcile::ReconcileEngine;
use crate::repositories::TenantRepository;

/// Background reconciliation service.
pub struct ReconcileScheduler {
    config: Arc<AppConfig>,
    db: DatabaseConnection,
}

#[derive(Debug, Default)]
struct TickStats {
    tenants_processed: u64,
    created: u64,
    updated: u64,
    deleted: u64,
    skipped_duplicate: u64,
    categories_failed: u64,
}

impl ReconcileScheduler {
    pub fn new(config: Arc<AppConfig>, db: DatabaseConnection) -> Self {
        Self { config, db }
    }

    /// Ticks until the shutdown token fires. Consumes the scheduler, so
    /// the loop runs at most once.
    #[instrument(skip_all)]
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            tick_interval_seconds = self.config.reconcile.tick_interval_seconds,
            jitter_pct_max = self.config.reconcile.jitter_pct_max,
            "Starting reconcile scheduler"
        );

        let engine = ReconcileEngine::new(
            self.db.clone(),
            default_registry(&self.config.reconcile.portal_base_url),
        );

        loop {
            let tick_delay = Duration::from_secs(
                self.config.reconcile.tick_interval_seconds
                    + sample_jitter_seconds(&self.config.reconcile),
            );

            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Reconcile scheduler shutdown requested");
                    break;
                }
                _ = sleep(tick_delay) => {
                    let tick_started = Instant::now();
                    if let Err(err) = self.tick(&engine).await {
                        error!(error = ?err, "Reconcile scheduler tick failed");
                    }
                    let elapsed = tick_started.elapsed();
                    histogram!("reconcile_scheduler_tick_duration_ms")
                        .record(elapsed.as_secs_f64() * 1_000.0);
                }
            }
        }

        info!("Reconcile scheduler stopped");
    }

    /// Sweep every tenant once.
    ///
    /// Only tenant listing can fail here; per-tenant reconciliation reports
    /// its failures inside the returned summary and never aborts the sweep.
    async fn tick(&self, engine: &ReconcileEngine) -> Result<(), RepositoryError> {
        let mut stats = TickStats::default();

        let tenants = TenantRepository::new(&self.db).list_tenants().await?;

        for tenant in tenants {
            let summary = engine.reconcile(tenant.id).await;
            stats.tenants_processed += 1;
            stats.created += summary.created;
            stats.updated += summary.updated;
            stats.deleted += summary.deleted;
            stats.skipped_duplicate += summary.skipped_duplicate;
            stats.categories_failed += summary.per_category_errors.len() as u64;
        }

        counter!("reconcile_scheduler_ticks_total").increment(1);

        debug!(
            tenants = stats.tenants_processed,
            created = stats.created,
            updated = stats.updated,
            deleted = stats.deleted,
            skipped_duplicate = stats.skipped_duplicate,
            categories_failed = stats.categories_failed,
            "Reconcile scheduler tick completed"
        );

        Ok(())
    }
}

fn sample_jitter_seconds(config: &ReconcileConfig) -> u64 {
    let mut rng = rand::thread_rng();
    compute_jitter_seconds(config, &mut rng)
}

fn compute_jitter_seconds<R: Rng + ?Sized>(config: &ReconcileConfig, rng: &mut R) -> u64 {
    let max = config.jitter_pct_max.max(0.0);
    if max == 0.0 {
        return 0;
    }

    let jitter_pct = rng.gen_range(0.0..=max);
    (config.tick_interval_seconds as f64 * jitter_pct).round() as u64
}
