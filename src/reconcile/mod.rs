//! Reconciliation engine
//!
//! Runs every registered deficiency generator for a tenant and converges
//! persisted notifications toward the freshly computed desired state.
//! Missing records are created and drifted ones rewritten; duplicates,
//! resolved records, and legacy generations are removed. Each category
//! commits as one transaction; a failed category never blocks the others,
//! and [`ReconcileEngine::reconcile`] itself never fails. Partial failures
//! are reported in the summary.

pub mod plan;

use std::collections::BTreeMap;

use metrics::{counter, histogram};
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::deficiencies::{
    CURRENT_ORIGIN, Deficiency, DeficiencyGenerator, GeneratorError, GeneratorRegistry, OriginTag,
};
use crate::error::RepositoryError;
use crate::models::notification::NotificationStatus;
use crate::repositories::{NewNotification, NotificationRepository};
use plan::build_plan;

/// Aggregate outcome of one reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RunSummary {
    /// Unread records created this run
    pub created: u64,
    /// Records rewritten in place
    pub updated: u64,
    /// Records removed (resolved, obsolete, weeded duplicates, legacy)
    pub deleted: u64,
    /// Deficiencies suppressed because an acknowledged record already
    /// carries identical content
    pub skipped_duplicate: u64,
    /// Category identifier to error string, for passes that failed
    pub per_category_errors: BTreeMap<String, String>,
}

impl RunSummary {
    pub fn has_errors(&self) -> bool {
        !self.per_category_errors.is_empty()
    }

    /// True when the run changed nothing in storage.
    pub fn is_noop(&self) -> bool {
        self.created == 0 && self.updated == 0 && self.deleted == 0
    }
}

/// Counts for a single category pass
#[derive(Debug, Clone, Copy, Default)]
struct PassCounts {
    created: u64,
    updated: u64,
    deleted: u64,
    skipped_duplicate: u64,
}

/// Why a category pass failed. The distinction only matters for logs and
/// the summary's error strings; both outcomes skip the category.
#[derive(Debug, thiserror::Error)]
enum PassError {
    #[error("generator failed: {0}")]
    Generator(#[from] GeneratorError),
    #[error("storage failed: {0}")]
    Storage(#[from] RepositoryError),
}

pub struct ReconcileEngine {
    db: DatabaseConnection,
    registry: GeneratorRegistry,
}

impl ReconcileEngine {
    pub fn new(db: DatabaseConnection, registry: GeneratorRegistry) -> Self {
        Self { db, registry }
    }

    /// Run one full reconciliation for a tenant.
    ///
    /// Never returns an error: generator and storage failures are recorded
    /// per category in the summary and the remaining categories still run.
    #[instrument(skip(self), fields(tenant_id = %tenant_id))]
    pub async fn reconcile(&self, tenant_id: Uuid) -> RunSummary {
        let run_started = std::time::Instant::now();
        let mut summary = RunSummary::default();

        for generator in self.registry.list() {
            let category = generator.category();
            let metric_labels = vec![("category", category.as_str().to_string())];

            match self.reconcile_category(tenant_id, generator.as_ref()).await {
                Ok(counts) => {
                    debug!(
                        category = category.as_str(),
                        created = counts.created,
                        updated = counts.updated,
                        deleted = counts.deleted,
                        skipped_duplicate = counts.skipped_duplicate,
                        "Category pass completed"
                    );
                    summary.created += counts.created;
                    summary.updated += counts.updated;
                    summary.deleted += counts.deleted;
                    summary.skipped_duplicate += counts.skipped_duplicate;

                    counter!("notifications_created_total", &metric_labels)
                        .increment(counts.created);
                    counter!("notifications_updated_total", &metric_labels)
                        .increment(counts.updated);
                    counter!("notifications_deleted_total", &metric_labels)
                        .increment(counts.deleted);
                    counter!("notifications_skipped_duplicate_total", &metric_labels)
                        .increment(counts.skipped_duplicate);
                }
                Err(err) => {
                    warn!(
                        category = category.as_str(),
                        error = %err,
                        "Category pass failed; continuing with remaining generators"
                    );
                    counter!("reconcile_category_failures_total", &metric_labels).increment(1);
                    summary
                        .per_category_errors
                        .insert(category.as_str().to_string(), err.to_string());
                }
            }
        }

        counter!("reconcile_runs_total").increment(1);
        histogram!("reconcile_run_duration_seconds").record(run_started.elapsed().as_secs_f64());

        info!(
            created = summary.created,
            updated = summary.updated,
            deleted = summary.deleted,
            skipped_duplicate = summary.skipped_duplicate,
            failed_categories = summary.per_category_errors.len(),
            "Reconciliation run completed"
        );

        summary
    }

    /// One generator's pass: collect desired state, diff against persisted
    /// records, apply the plan inside a single transaction.
    async fn reconcile_category(
        &self,
        tenant_id: Uuid,
        generator: &dyn DeficiencyGenerator,
    ) -> Result<PassCounts, PassError> {
        let desired = generator.generate(&self.db, tenant_id).await?;
        let obsolete = generator.find_obsolete(&self.db, tenant_id).await?;

        debug!(
            category = generator.identifier(),
            desired = desired.len(),
            obsolete = obsolete.len(),
            "Generator output collected"
        );

        let txn = self
            .db
            .begin()
            .await
            .map_err(RepositoryError::database_error)?;

        let persisted =
            NotificationRepository::find_by_category(&txn, tenant_id, generator.category()).await?;
        let plan = build_plan(desired, persisted, &obsolete);

        let mut counts = PassCounts {
            skipped_duplicate: plan.skipped_duplicate,
            ..Default::default()
        };

        // Creates run first: the partial unique index keys on origin, so a
        // fresh current-format row never collides with a legacy row that
        // this same plan deletes below.
        for deficiency in plan.creates {
            if self.insert_guarded(&txn, tenant_id, deficiency).await? {
                counts.created += 1;
            }
        }

        for update in plan.updates {
            NotificationRepository::update_content(
                &txn,
                update.id,
                update.title,
                update.body,
                update.fingerprint,
            )
            .await?;
            counts.updated += 1;
        }

        let delete_ids: Vec<Uuid> = plan.deletes.into_iter().collect();
        counts.deleted = NotificationRepository::delete_many(&txn, &delete_ids).await?;

        txn.commit()
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(counts)
    }

    /// Insert one record under a savepoint with an optimistic re-check.
    ///
    /// Returns false when a concurrent writer got there first: either the
    /// re-check sees a live Unread row, or the insert trips the partial
    /// unique index. Both outcomes roll back the savepoint only and the
    /// category's transaction continues. Any other storage error propagates
    /// and aborts the category.
    async fn insert_guarded(
        &self,
        txn: &DatabaseTransaction,
        tenant_id: Uuid,
        deficiency: Deficiency,
    ) -> Result<bool, PassError> {
        let savepoint = txn
            .begin()
            .await
            .map_err(RepositoryError::database_error)?;

        let existing = NotificationRepository::find(
            &savepoint,
            tenant_id,
            deficiency.category,
            Some((deficiency.subject_kind, deficiency.subject_id)),
        )
        .await?;
        let already_live = existing.iter().any(|record| {
            record.status == NotificationStatus::Unread
                && OriginTag::parse(&record.origin).is_current()
        });
        if already_live {
            savepoint
                .rollback()
                .await
                .map_err(RepositoryError::database_error)?;
            debug!(
                subject_id = %deficiency.subject_id,
                "Concurrent Unread record exists; skipping create"
            );
            return Ok(false);
        }

        let fingerprint = deficiency.fingerprint();
        let insert = NotificationRepository::insert(
            &savepoint,
            NewNotification {
                tenant_id,
                category: deficiency.category,
                subject_kind: deficiency.subject_kind,
                subject_id: deficiency.subject_id,
                origin: CURRENT_ORIGIN.to_string(),
                title: deficiency.title,
                body: deficiency.body,
                fingerprint: Some(fingerprint),
                link: deficiency.link,
            },
        )
        .await;

        match insert {
            Ok(_) => {
                savepoint
                    .commit()
                    .await
                    .map_err(RepositoryError::database_error)?;
                Ok(true)
            }
            Err(err) if err.is_conflict() => {
                savepoint
                    .rollback()
                    .await
                    .map_err(RepositoryError::database_error)?;
                debug!(
                    subject_id = %deficiency.subject_id,
                    "Duplicate insert lost the race; treated as a no-op"
                );
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }
}
