//! # Notification Repository
//!
//! Persistence operations for notification records, split into two halves:
//! connection-scoped facade operations (list, count, acknowledge, delete)
//! and the narrow store interface the reconciliation engine drives inside a
//! transaction (find, insert, update content, delete many). The store half
//! takes any [`ConnectionTrait`] so the engine can run it against its
//! per-category transaction.
//!
//! None of these operations alter a record's origin tag or category.

use chrono::Utc;
use sea_orm::prelude::*;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::notification::{
    self, Entity as Notification, Model as NotificationModel, NotificationCategory,
    NotificationStatus, SubjectKind,
};

/// Insert payload for a freshly generated notification record.
///
/// Status is always Unread and timestamps are stamped at insert time; the
/// caller controls everything content-related.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub tenant_id: Uuid,
    pub category: NotificationCategory,
    pub subject_kind: SubjectKind,
    pub subject_id: Uuid,
    pub origin: String,
    pub title: String,
    pub body: String,
    pub fingerprint: Option<String>,
    pub link: Option<String>,
}

/// Total and unread counts for a tenant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationCounts {
    pub total: u64,
    pub unread: u64,
}

/// Data access for notification records, always scoped to one tenant.
pub struct NotificationRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> NotificationRepository<'a> {
    /// Borrows the connection for the lifetime of the repository.
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// List notifications for a tenant, optionally filtered by status and
    /// category, newest first
    pub async fn list(
        &self,
        tenant_id: Uuid,
        status: Option<NotificationStatus>,
        category: Option<NotificationCategory>,
    ) -> Result<Vec<NotificationModel>, RepositoryError> {
        let mut query = Notification::find().filter(notification::Column::TenantId.eq(tenant_id));

        if let Some(status) = status {
            query = query.filter(notification::Column::Status.eq(status));
        }
        if let Some(category) = category {
            query = query.filter(notification::Column::Category.eq(category));
        }

        query
            .order_by_desc(notification::Column::CreatedAt)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Total and unread notification counts for a tenant
    pub async fn count(&self, tenant_id: Uuid) -> Result<NotificationCounts, RepositoryError> {
        let total = Notification::find()
            .filter(notification::Column::TenantId.eq(tenant_id))
            .count(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        let unread = Notification::find()
            .filter(notification::Column::TenantId.eq(tenant_id))
            .filter(notification::Column::Status.eq(NotificationStatus::Unread))
            .count(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(NotificationCounts { total, unread })
    }

    /// Get a notification by id, scoped to the tenant
    pub async fn get_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<NotificationModel, RepositoryError> {
        Notification::find_by_id(id)
            .filter(notification::Column::TenantId.eq(tenant_id))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| RepositoryError::NotFound("Notification not found".to_string()))
    }

    /// Unread notifications of one category for a tenant. Used by the
    /// generators' obsolete-record queries.
    pub async fn find_unread_by_category(
        &self,
        tenant_id: Uuid,
        category: NotificationCategory,
    ) -> Result<Vec<NotificationModel>, RepositoryError> {
        Notification::find()
            .filter(notification::Column::TenantId.eq(tenant_id))
            .filter(notification::Column::Category.eq(category))
            .filter(notification::Column::Status.eq(NotificationStatus::Unread))
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Mark a notification as read, stamping reader identity and time.
    ///
    /// Transitions Unread to Read. A record that is already Read (or
    /// Archived) is left untouched and returned as-is; acknowledging twice
    /// is not an error.
    pub async fn mark_as_read(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        actor_id: Uuid,
    ) -> Result<NotificationModel, RepositoryError> {
        let record = self.get_by_id(tenant_id, id).await?;

        if record.status != NotificationStatus::Unread {
            return Ok(record);
        }

        let now = Utc::now();
        let mut active = record.into_active_model();
        active.status = Set(NotificationStatus::Read);
        active.read_at = Set(Some(now.into()));
        active.read_by = Set(Some(actor_id));
        active.updated_at = Set(now.into());

        active
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Mark every unread notification of a tenant as read. Returns the
    /// number of records transitioned.
    pub async fn mark_all_as_read(
        &self,
        tenant_id: Uuid,
        actor_id: Uuid,
    ) -> Result<u64, RepositoryError> {
        let now = Utc::now();
        let result = Notification::update_many()
            .col_expr(
                notification::Column::Status,
                Expr::value(NotificationStatus::Read),
            )
            .col_expr(notification::Column::ReadAt, Expr::value(now))
            .col_expr(notification::Column::ReadBy, Expr::value(actor_id))
            .col_expr(notification::Column::UpdatedAt, Expr::value(now))
            .filter(notification::Column::TenantId.eq(tenant_id))
            .filter(notification::Column::Status.eq(NotificationStatus::Unread))
            .exec(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(result.rows_affected)
    }

    /// Delete a notification by id, scoped to the tenant
    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<(), RepositoryError> {
        let record = self.get_by_id(tenant_id, id).await?;

        record
            .delete(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(())
    }

    /// Delete every notification attached to one subject, across all
    /// categories and statuses. Returns the number of records removed.
    pub async fn delete_for_subject(
        &self,
        tenant_id: Uuid,
        subject_kind: SubjectKind,
        subject_id: Uuid,
    ) -> Result<u64, RepositoryError> {
        let result = Notification::delete_many()
            .filter(notification::Column::TenantId.eq(tenant_id))
            .filter(notification::Column::SubjectKind.eq(subject_kind))
            .filter(notification::Column::SubjectId.eq(subject_id))
            .exec(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(result.rows_affected)
    }

    // --- store interface driven by the reconciliation engine ---

    /// Notifications of one category for a tenant, all statuses, optionally
    /// narrowed to a single subject
    pub async fn find<C: ConnectionTrait>(
        conn: &C,
        tenant_id: Uuid,
        category: NotificationCategory,
        subject: Option<(SubjectKind, Uuid)>,
    ) -> Result<Vec<NotificationModel>, RepositoryError> {
        let mut query = Notification::find()
            .filter(notification::Column::TenantId.eq(tenant_id))
            .filter(notification::Column::Category.eq(category));

        if let Some((subject_kind, subject_id)) = subject {
            query = query
                .filter(notification::Column::SubjectKind.eq(subject_kind))
                .filter(notification::Column::SubjectId.eq(subject_id));
        }

        query
            .all(conn)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Notifications of one category for a tenant, all statuses
    pub async fn find_by_category<C: ConnectionTrait>(
        conn: &C,
        tenant_id: Uuid,
        category: NotificationCategory,
    ) -> Result<Vec<NotificationModel>, RepositoryError> {
        Self::find(conn, tenant_id, category, None).await
    }

    /// Insert a new Unread notification record.
    ///
    /// A concurrent duplicate trips the partial unique index and surfaces
    /// as [`RepositoryError::Conflict`]; callers on the reconcile path
    /// treat that as a benign no-op.
    pub async fn insert<C: ConnectionTrait>(
        conn: &C,
        record: NewNotification,
    ) -> Result<Uuid, RepositoryError> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        notification::ActiveModel {
            id: Set(id),
            tenant_id: Set(record.tenant_id),
            category: Set(record.category),
            status: Set(NotificationStatus::Unread),
            subject_kind: Set(record.subject_kind),
            subject_id: Set(record.subject_id),
            origin: Set(record.origin),
            title: Set(record.title),
            body: Set(record.body),
            fingerprint: Set(record.fingerprint),
            link: Set(record.link),
            read_at: Set(None),
            read_by: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(conn)
        .await
        .map_err(RepositoryError::database_error)?;

        Ok(id)
    }

    /// Update the content of an existing record in place, preserving its
    /// identity, status, and read bookkeeping
    pub async fn update_content<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
        title: String,
        body: String,
        fingerprint: String,
    ) -> Result<(), RepositoryError> {
        let now = Utc::now();
        Notification::update_many()
            .col_expr(notification::Column::Title, Expr::value(title))
            .col_expr(notification::Column::Body, Expr::value(body))
            .col_expr(notification::Column::Fingerprint, Expr::value(fingerprint))
            .col_expr(notification::Column::UpdatedAt, Expr::value(now))
            .filter(notification::Column::Id.eq(id))
            .exec(conn)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(())
    }

    /// Delete records by id. Returns the number of rows removed.
    pub async fn delete_many<C: ConnectionTrait>(
        conn: &C,
        ids: &[Uuid],
    ) -> Result<u64, RepositoryError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = Notification::delete_many()
            .filter(notification::Column::Id.is_in(ids.iter().copied()))
            .exec(conn)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(result.rows_affected)
    }
}
