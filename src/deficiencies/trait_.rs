//! Deficiency generator trait definition
//!
//! Defines the capability interface every deficiency generator implements.
//! The reconciliation engine only ever talks to generators through this
//! trait, so adding a category means adding an implementation and
//! registering it.

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::deficiencies::fingerprint;
use crate::error::RepositoryError;
use crate::models::notification::{NotificationCategory, SubjectKind};

/// Generator-specific error types for structured error handling
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// The generator's data source failed (query error, pool exhausted).
    #[error("data source error: {0}")]
    DataSource(#[from] RepositoryError),
    /// Internal invariant broken while computing deficiencies.
    #[error("{0}")]
    Internal(String),
}

/// One unresolved deficiency for one subject, computed fresh each run.
///
/// Not persisted; the engine diffs these against stored notification
/// records and derives mutations from the comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Deficiency {
    pub category: NotificationCategory,
    pub subject_kind: SubjectKind,
    pub subject_id: Uuid,
    pub title: String,
    pub body: String,
    pub link: Option<String>,
    /// Stable slugs for what is missing; input to the fingerprint.
    pub facts: Vec<String>,
}

impl Deficiency {
    /// Canonical content fingerprint, derived from the structured facts.
    pub fn fingerprint(&self) -> String {
        fingerprint::compute(self.category, &self.facts)
    }
}

#[async_trait]
pub trait DeficiencyGenerator: Send + Sync {
    /// Stable string key for registry lookup and cleanup scoping.
    fn identifier(&self) -> &'static str {
        self.category().as_str()
    }

    /// The notification category this generator owns. Categories are
    /// disjoint; no two registered generators share one.
    fn category(&self) -> NotificationCategory;

    /// Human-readable description for diagnostics.
    fn describe(&self) -> &'static str;

    /// Compute the full desired set of deficiencies for a tenant.
    ///
    /// Reads subject data only. Returns at most one deficiency per
    /// subject; a subject that cannot be evaluated is skipped with a
    /// warning rather than failing the whole pass.
    async fn generate(
        &self,
        db: &DatabaseConnection,
        tenant_id: Uuid,
    ) -> Result<Vec<Deficiency>, GeneratorError>;

    /// Ids of currently-Unread notifications in this generator's category
    /// that no longer correspond to a real deficiency (subject fixed,
    /// archived, or deleted). Separate from [`generate`](Self::generate)
    /// so cleanup works for subjects with zero current deficiencies.
    async fn find_obsolete(
        &self,
        db: &DatabaseConnection,
        tenant_id: Uuid,
    ) -> Result<Vec<Uuid>, GeneratorError>;
}
