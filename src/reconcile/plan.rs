//! Decision logic for one category pass.
//!
//! Everything here is pure: persisted records plus freshly generated
//! deficiencies go in, a [`MutationPlan`] comes out. The engine applies the
//! plan transactionally; keeping the decisions side-effect free makes the
//! per-subject rules directly testable.

use std::collections::{BTreeSet, HashMap};

use uuid::Uuid;

use crate::deficiencies::{Deficiency, OriginTag};
use crate::models::notification::{Model as NotificationModel, NotificationStatus, SubjectKind};

/// Persisted records of one subject, partitioned the way the algorithm
/// reads them.
#[derive(Debug, Default)]
pub struct SubjectRecords {
    /// Current-format Unread rows. At most one should exist; extras are
    /// weeded.
    pub unread_current: Vec<NotificationModel>,
    /// Current-format Read/Archived rows.
    pub acked_current: Vec<NotificationModel>,
    /// Legacy-format rows, any status.
    pub legacy: Vec<NotificationModel>,
}

/// In-place content rewrite of an existing Unread record.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentUpdate {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub fingerprint: String,
}

/// The minimal mutation set for one category pass.
#[derive(Debug, Default)]
pub struct MutationPlan {
    pub creates: Vec<Deficiency>,
    pub updates: Vec<ContentUpdate>,
    pub deletes: BTreeSet<Uuid>,
    /// Deficiencies whose acknowledged record already carries identical
    /// content; nothing is created for them.
    pub skipped_duplicate: u64,
}

/// Group one category's records by subject and split them by origin format
/// and lifecycle status.
pub fn partition(
    records: Vec<NotificationModel>,
) -> HashMap<(SubjectKind, Uuid), SubjectRecords> {
    let mut by_subject: HashMap<(SubjectKind, Uuid), SubjectRecords> = HashMap::new();

    for record in records {
        let bucket = by_subject
            .entry((record.subject_kind, record.subject_id))
            .or_default();

        match OriginTag::parse(&record.origin) {
            OriginTag::Current => match record.status {
                NotificationStatus::Unread => bucket.unread_current.push(record),
                NotificationStatus::Read | NotificationStatus::Archived => {
                    bucket.acked_current.push(record)
                }
            },
            OriginTag::Legacy(_) => bucket.legacy.push(record),
        }
    }

    by_subject
}

/// Diff desired deficiencies against the persisted records of one category
/// and produce the mutation plan.
///
/// `obsolete_ids` come from the generator's own obsolete query; only ids
/// that belong to the Unread working set loaded this pass are honored, so a
/// generator can never delete records the pass did not see.
pub fn build_plan(
    desired: Vec<Deficiency>,
    persisted: Vec<NotificationModel>,
    obsolete_ids: &[Uuid],
) -> MutationPlan {
    let mut by_subject = partition(persisted);
    let mut plan = MutationPlan::default();

    let unread_working_set: BTreeSet<Uuid> = by_subject
        .values()
        .flat_map(|records| records.unread_current.iter().map(|record| record.id))
        .collect();

    for deficiency in desired {
        let key = (deficiency.subject_kind, deficiency.subject_id);
        let records = by_subject.remove(&key).unwrap_or_default();
        decide_subject(deficiency, records, &mut plan);
    }

    // Subjects with no current deficiency: their Unread rows are resolved
    // and deleted; legacy rows are swept category-wide; acknowledged rows
    // stay as read history.
    for records in by_subject.into_values() {
        for record in records.unread_current {
            plan.deletes.insert(record.id);
        }
        for record in records.legacy {
            plan.deletes.insert(record.id);
        }
    }

    for id in obsolete_ids {
        if unread_working_set.contains(id) {
            plan.deletes.insert(*id);
        }
    }

    plan
}

fn decide_subject(
    deficiency: Deficiency,
    records: SubjectRecords,
    plan: &mut MutationPlan,
) {
    let fingerprint = deficiency.fingerprint();
    let SubjectRecords {
        mut unread_current,
        mut acked_current,
        legacy,
    } = records;

    // Legacy rows of a processed subject are removed unconditionally
    for record in legacy {
        plan.deletes.insert(record.id);
    }

    // Keep the single most recently updated row in each partition and weed
    // the rest; ties break on id so repeated runs agree.
    unread_current.sort_by_key(|record| (record.updated_at, record.id));
    let live = unread_current.pop();
    plan.deletes.extend(unread_current.iter().map(|record| record.id));

    acked_current.sort_by_key(|record| (record.updated_at, record.id));
    let retained_acked = acked_current.pop();
    plan.deletes.extend(acked_current.iter().map(|record| record.id));

    if let Some(existing) = live {
        // The record's identity survives; only content may change
        if existing.fingerprint.as_deref() != Some(fingerprint.as_str()) {
            plan.updates.push(ContentUpdate {
                id: existing.id,
                title: deficiency.title,
                body: deficiency.body,
                fingerprint,
            });
        }
        return;
    }

    if retained_acked
        .is_some_and(|acked| acked.fingerprint.as_deref() == Some(fingerprint.as_str()))
    {
        // Already acknowledged with identical content; creating a new
        // Unread row would resurface what the user dismissed
        plan.skipped_duplicate += 1;
        return;
    }

    plan.creates.push(deficiency);
}
