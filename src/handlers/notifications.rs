//! # Notifications API Handlers
//!
//! HTTP handlers for the notification facade: tenant-scoped listing,
//! counting, acknowledgement and deletion. All endpoints require operator
//! auth and an `X-Tenant-Id` header; a record belonging to another tenant
//! is indistinguishable from a missing one.

use crate::auth::{AuthenticatedOperator, TenantIdHeader, TenantScope};
use crate::error::{ApiError, validation_error};
use crate::models::notification::{
    NotificationCategory, NotificationResponse, NotificationStatus, SubjectKind,
};
use crate::repositories::{NotificationCounts, NotificationRepository};
use crate::server::AppState;
use axum::{
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Query parameters for listing notifications
#[derive(Debug, Deserialize)]
pub struct ListNotificationsQuery {
    /// Filter by status (one of: unread, read, archived)
    pub status: Option<String>,
    /// Filter by category (one of: missing_document, incomplete_information, general_alert)
    pub category: Option<String>,
}

/// Path parameters for single-notification operations
#[derive(Debug, Deserialize, IntoParams)]
pub struct NotificationPath {
    /// Notification ID
    pub id: Uuid,
}

/// Path parameters for subject-scoped cleanup
#[derive(Debug, Deserialize, IntoParams)]
pub struct SubjectPath {
    /// Subject kind (one of: trainee)
    pub kind: String,
    /// Subject entity ID
    pub subject_id: Uuid,
}

/// Request body for acknowledgement endpoints
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MarkReadRequest {
    /// User performing the acknowledgement
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub actor_id: Uuid,
}

/// Response payload for the listing endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NotificationsResponse {
    /// Notifications matching the query, newest first
    pub notifications: Vec<NotificationResponse>,
}

/// Response payload for the count endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CountResponse {
    /// Total number of notifications for the tenant
    #[schema(example = 12)]
    pub total: u64,
    /// Number of notifications still unread
    #[schema(example = 3)]
    pub unread: u64,
}

impl From<NotificationCounts> for CountResponse {
    fn from(counts: NotificationCounts) -> Self {
        Self {
            total: counts.total,
            unread: counts.unread,
        }
    }
}

/// Response payload for bulk acknowledgement
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MarkAllReadResponse {
    /// Number of notifications flipped to read
    #[schema(example = 3)]
    pub marked_read: u64,
}

/// Response payload for subject-scoped deletion
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubjectCleanupResponse {
    /// Number of notifications removed
    #[schema(example = 2)]
    pub deleted: u64,
}

fn parse_status(raw: &str) -> Result<NotificationStatus, ApiError> {
    match raw {
        "unread" => Ok(NotificationStatus::Unread),
        "read" => Ok(NotificationStatus::Read),
        "archived" => Ok(NotificationStatus::Archived),
        _ => Err(validation_error(
            "Invalid status",
            serde_json::json!({
                "status": "Must be one of: unread, read, archived"
            }),
        )),
    }
}

fn parse_category(raw: &str) -> Result<NotificationCategory, ApiError> {
    match raw {
        "missing_document" => Ok(NotificationCategory::MissingDocument),
        "incomplete_information" => Ok(NotificationCategory::IncompleteInformation),
        "general_alert" => Ok(NotificationCategory::GeneralAlert),
        _ => Err(validation_error(
            "Invalid category",
            serde_json::json!({
                "category": "Must be one of: missing_document, incomplete_information, general_alert"
            }),
        )),
    }
}

fn parse_subject_kind(raw: &str) -> Result<SubjectKind, ApiError> {
    match raw {
        "trainee" => Ok(SubjectKind::Trainee),
        _ => Err(validation_error(
            "Invalid subject kind",
            serde_json::json!({
                "kind": "Must be one of: trainee"
            }),
        )),
    }
}

/// List notifications for the tenant, newest first
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    security(("bearer_auth" = [])),
    params(
        TenantIdHeader,
        ("status" = Option<NotificationStatus>, Query, description = "Filter by status"),
        ("category" = Option<NotificationCategory>, Query, description = "Filter by category")
    ),
    responses(
        (status = 200, description = "Notifications for the tenant", body = NotificationsResponse),
        (status = 400, description = "Query parameters failed validation", body = ApiError),
        (status = 401, description = "Bearer token missing or not recognized", body = ApiError),
        (status = 500, description = "Unhandled internal error", body = ApiError)
    ),
    tag = "notifications"
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    _operator_auth: AuthenticatedOperator,
    TenantScope(tenant): TenantScope,
    Query(params): Query<ListNotificationsQuery>,
) -> Result<Json<NotificationsResponse>, ApiError> {
    let status = params.status.as_deref().map(parse_status).transpose()?;
    let category = params.category.as_deref().map(parse_category).transpose()?;

    debug!(tenant_id = %tenant.0, ?status, ?category, "Listing notifications");

    let repository = NotificationRepository::new(&state.db);
    let records = repository.list(tenant.0, status, category).await?;

    Ok(Json(NotificationsResponse {
        notifications: records.into_iter().map(NotificationResponse::from).collect(),
    }))
}

/// Count notifications for the tenant
#[utoipa::path(
    get,
    path = "/api/v1/notifications/count",
    security(("bearer_auth" = [])),
    params(TenantIdHeader),
    responses(
        (status = 200, description = "Total and unread counts", body = CountResponse),
        (status = 401, description = "Bearer token missing or not recognized", body = ApiError),
        (status = 500, description = "Unhandled internal error", body = ApiError)
    ),
    tag = "notifications"
)]
pub async fn count_notifications(
    State(state): State<AppState>,
    _operator_auth: AuthenticatedOperator,
    TenantScope(tenant): TenantScope,
) -> Result<Json<CountResponse>, ApiError> {
    let repository = NotificationRepository::new(&state.db);
    let counts = repository.count(tenant.0).await?;

    Ok(Json(counts.into()))
}

/// Get a single notification by ID
#[utoipa::path(
    get,
    path = "/api/v1/notifications/{id}",
    security(("bearer_auth" = [])),
    params(NotificationPath, TenantIdHeader),
    responses(
        (status = 200, description = "Notification details", body = NotificationResponse),
        (status = 401, description = "Bearer token missing or not recognized", body = ApiError),
        (status = 404, description = "Notification not found", body = ApiError),
        (status = 500, description = "Unhandled internal error", body = ApiError)
    ),
    tag = "notifications"
)]
pub async fn get_notification(
    State(state): State<AppState>,
    _operator_auth: AuthenticatedOperator,
    TenantScope(tenant): TenantScope,
    Path(path): Path<NotificationPath>,
) -> Result<Json<NotificationResponse>, ApiError> {
    let repository = NotificationRepository::new(&state.db);
    let record = repository.get_by_id(tenant.0, path.id).await?;

    Ok(Json(record.into()))
}

/// Mark a notification as read
#[utoipa::path(
    post,
    path = "/api/v1/notifications/{id}/read",
    security(("bearer_auth" = [])),
    params(NotificationPath, TenantIdHeader),
    request_body = MarkReadRequest,
    responses(
        (status = 200, description = "Notification after acknowledgement", body = NotificationResponse),
        (status = 401, description = "Bearer token missing or not recognized", body = ApiError),
        (status = 404, description = "Notification not found", body = ApiError),
        (status = 500, description = "Unhandled internal error", body = ApiError)
    ),
    tag = "notifications"
)]
pub async fn mark_notification_read(
    State(state): State<AppState>,
    _operator_auth: AuthenticatedOperator,
    TenantScope(tenant): TenantScope,
    Path(path): Path<NotificationPath>,
    payload: Result<Json<MarkReadRequest>, JsonRejection>,
) -> Result<Json<NotificationResponse>, ApiError> {
    let Json(request) = payload?;
    debug!(tenant_id = %tenant.0, notification_id = %path.id, actor_id = %request.actor_id, "Marking notification read");

    let repository = NotificationRepository::new(&state.db);
    let record = repository
        .mark_as_read(tenant.0, path.id, request.actor_id)
        .await?;

    Ok(Json(record.into()))
}

/// Mark all unread notifications for the tenant as read
#[utoipa::path(
    post,
    path = "/api/v1/notifications/read-all",
    security(("bearer_auth" = [])),
    params(TenantIdHeader),
    request_body = MarkReadRequest,
    responses(
        (status = 200, description = "Number of notifications acknowledged", body = MarkAllReadResponse),
        (status = 401, description = "Bearer token missing or not recognized", body = ApiError),
        (status = 500, description = "Unhandled internal error", body = ApiError)
    ),
    tag = "notifications"
)]
pub async fn mark_all_notifications_read(
    State(state): State<AppState>,
    _operator_auth: AuthenticatedOperator,
    TenantScope(tenant): TenantScope,
    payload: Result<Json<MarkReadRequest>, JsonRejection>,
) -> Result<Json<MarkAllReadResponse>, ApiError> {
    let Json(request) = payload?;
    debug!(tenant_id = %tenant.0, actor_id = %request.actor_id, "Marking all notifications read");

    let repository = NotificationRepository::new(&state.db);
    let marked_read = repository
        .mark_all_as_read(tenant.0, request.actor_id)
        .await?;

    Ok(Json(MarkAllReadResponse { marked_read }))
}

/// Delete a notification
#[utoipa::path(
    delete,
    path = "/api/v1/notifications/{id}",
    security(("bearer_auth" = [])),
    params(NotificationPath, TenantIdHeader),
    responses(
        (status = 204, description = "Notification deleted"),
        (status = 401, description = "Bearer token missing or not recognized", body = ApiError),
        (status = 404, description = "Notification not found", body = ApiError),
        (status = 500, description = "Unhandled internal error", body = ApiError)
    ),
    tag = "notifications"
)]
pub async fn delete_notification(
    State(state): State<AppState>,
    _operator_auth: AuthenticatedOperator,
    TenantScope(tenant): TenantScope,
    Path(path): Path<NotificationPath>,
) -> Result<StatusCode, ApiError> {
    debug!(tenant_id = %tenant.0, notification_id = %path.id, "Deleting notification");

    let repository = NotificationRepository::new(&state.db);
    repository.delete(tenant.0, path.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Delete every notification attached to a subject
///
/// Used when the subject itself is removed (e.g. a trainee is deleted) so
/// no notifications point at a record that no longer exists.
#[utoipa::path(
    delete,
    path = "/api/v1/notifications/subject/{kind}/{subject_id}",
    security(("bearer_auth" = [])),
    params(SubjectPath, TenantIdHeader),
    responses(
        (status = 200, description = "Number of notifications removed", body = SubjectCleanupResponse),
        (status = 400, description = "Unknown subject kind", body = ApiError),
        (status = 401, description = "Bearer token missing or not recognized", body = ApiError),
        (status = 500, description = "Unhandled internal error", body = ApiError)
    ),
    tag = "notifications"
)]
pub async fn delete_subject_notifications(
    State(state): State<AppState>,
    _operator_auth: AuthenticatedOperator,
    TenantScope(tenant): TenantScope,
    Path(path): Path<SubjectPath>,
) -> Result<Json<SubjectCleanupResponse>, ApiError> {
    let kind = parse_subject_kind(&path.kind)?;

    debug!(tenant_id = %tenant.0, kind = %path.kind, subject_id = %path.subject_id, "Deleting subject notifications");

    let repository = NotificationRepository::new(&state.db);
    let deleted = repository
        .delete_for_subject(tenant.0, kind, path.subject_id)
        .await?;

    Ok(Json(SubjectCleanupResponse { deleted }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TenantId;
    use crate::config::AppConfig;
    use crate::repositories::NewNotification;
    use migration::MigratorTrait;
    use sea_orm::{ConnectionTrait, Database, Statement};

    async fn setup_state() -> AppState {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        db.execute(Statement::from_string(
            db.get_database_backend(),
            "PRAGMA foreign_keys = OFF".to_string(),
        ))
        .await
        .unwrap();

        let config = AppConfig {
            profile: "test".to_string(),
            operator_tokens: vec!["test-token".to_string()],
            ..Default::default()
        };

        crate::server::create_test_app_state(config, db)
    }

    async fn seed_notification(state: &AppState, tenant_id: Uuid) -> Uuid {
        NotificationRepository::insert(
            &state.db,
            NewNotification {
                tenant_id,
                category: NotificationCategory::MissingDocument,
                subject_kind: SubjectKind::Trainee,
                subject_id: Uuid::new_v4(),
                origin: "reconciler/v2".to_string(),
                title: "Missing documents: Ana Silva".to_string(),
                body: "- Identification Document".to_string(),
                fingerprint: Some("abc123".to_string()),
                link: None,
            },
        )
        .await
        .unwrap()
    }

    #[test]
    fn parse_status_accepts_known_values() {
        assert_eq!(parse_status("unread").unwrap(), NotificationStatus::Unread);
        assert_eq!(parse_status("read").unwrap(), NotificationStatus::Read);
        assert_eq!(
            parse_status("archived").unwrap(),
            NotificationStatus::Archived
        );
    }

    #[test]
    fn parse_status_rejects_unknown_values() {
        let err = parse_status("seen").unwrap_err();
        assert_eq!(err.code, "VALIDATION_FAILED");
    }

    #[test]
    fn parse_category_accepts_known_values() {
        assert_eq!(
            parse_category("missing_document").unwrap(),
            NotificationCategory::MissingDocument
        );
        assert_eq!(
            parse_category("incomplete_information").unwrap(),
            NotificationCategory::IncompleteInformation
        );
        assert_eq!(
            parse_category("general_alert").unwrap(),
            NotificationCategory::GeneralAlert
        );
        assert!(parse_category("MISSING_DOCUMENT").is_err());
    }

    #[test]
    fn parse_subject_kind_rejects_unknown_values() {
        assert_eq!(parse_subject_kind("trainee").unwrap(), SubjectKind::Trainee);
        let err = parse_subject_kind("instructor").unwrap_err();
        assert_eq!(err.code, "VALIDATION_FAILED");
    }

    #[tokio::test]
    async fn list_returns_empty_for_fresh_tenant() {
        let state = setup_state().await;
        let tenant_id = Uuid::new_v4();

        let result = list_notifications(
            State(state),
            AuthenticatedOperator,
            TenantScope(TenantId(tenant_id)),
            Query(ListNotificationsQuery {
                status: None,
                category: None,
            }),
        )
        .await
        .unwrap();

        assert!(result.0.notifications.is_empty());
    }

    #[tokio::test]
    async fn list_rejects_invalid_status_filter() {
        let state = setup_state().await;

        let result = list_notifications(
            State(state),
            AuthenticatedOperator,
            TenantScope(TenantId(Uuid::new_v4())),
            Query(ListNotificationsQuery {
                status: Some("seen".to_string()),
                category: None,
            }),
        )
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.code, "VALIDATION_FAILED");
    }

    #[tokio::test]
    async fn mark_read_then_count_reflects_acknowledgement() {
        let state = setup_state().await;
        let tenant_id = Uuid::new_v4();
        let id = seed_notification(&state, tenant_id).await;

        let response = mark_notification_read(
            State(state.clone()),
            AuthenticatedOperator,
            TenantScope(TenantId(tenant_id)),
            Path(NotificationPath { id }),
            Ok(Json(MarkReadRequest {
                actor_id: Uuid::new_v4(),
            })),
        )
        .await
        .unwrap();
        assert_eq!(response.0.status, NotificationStatus::Read);

        let counts = count_notifications(
            State(state),
            AuthenticatedOperator,
            TenantScope(TenantId(tenant_id)),
        )
        .await
        .unwrap();
        assert_eq!(counts.0.total, 1);
        assert_eq!(counts.0.unread, 0);
    }

    #[tokio::test]
    async fn get_is_scoped_to_the_caller_tenant() {
        let state = setup_state().await;
        let tenant_id = Uuid::new_v4();
        let id = seed_notification(&state, tenant_id).await;

        let err = get_notification(
            State(state),
            AuthenticatedOperator,
            TenantScope(TenantId(Uuid::new_v4())),
            Path(NotificationPath { id }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.code, "NOT_FOUND");
    }

    #[tokio::test]
    async fn delete_subject_removes_every_record_for_the_subject() {
        let state = setup_state().await;
        let tenant_id = Uuid::new_v4();
        let subject_id = Uuid::new_v4();

        for origin in ["reconciler/v2", "reconciler/v1"] {
            NotificationRepository::insert(
                &state.db,
                NewNotification {
                    tenant_id,
                    category: if origin.ends_with("v2") {
                        NotificationCategory::MissingDocument
                    } else {
                        NotificationCategory::IncompleteInformation
                    },
                    subject_kind: SubjectKind::Trainee,
                    subject_id,
                    origin: origin.to_string(),
                    title: "Missing documents: Ana Silva".to_string(),
                    body: "- Identification Document".to_string(),
                    fingerprint: None,
                    link: None,
                },
            )
            .await
            .unwrap();
        }

        let response = delete_subject_notifications(
            State(state.clone()),
            AuthenticatedOperator,
            TenantScope(TenantId(tenant_id)),
            Path(SubjectPath {
                kind: "trainee".to_string(),
                subject_id,
            }),
        )
        .await
        .unwrap();
        assert_eq!(response.0.deleted, 2);

        let counts = count_notifications(
            State(state),
            AuthenticatedOperator,
            TenantScope(TenantId(tenant_id)),
        )
        .await
        .unwrap();
        assert_eq!(counts.0.total, 0);
    }
}
