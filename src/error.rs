//! Problem+json error envelope for the HTTP surface, plus the shared
//! repository error type underneath it.
//!
//! Every failing route resolves to an [`ApiError`] so clients always see
//! the same shape: a stable `code` to branch on and a readable `message`,
//! with the request's trace id attached for support tickets.

use axum::{
    extract::rejection::JsonRejection,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::telemetry;

/// Wire format of every error response the service emits.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiError {
    /// Status used for the HTTP response, not part of the body.
    #[serde(skip)]
    pub status: StatusCode,
    /// Stable machine-readable code, e.g. `NOT_FOUND`.
    pub code: String,
    /// What went wrong, phrased for a human.
    pub message: String,
    /// Structured context such as per-field validation messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Seconds the client should wait before retrying, when known.
    pub retry_after: Option<u64>,
    /// Trace id of the request, echoed so clients can quote it.
    pub trace_id: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            details: None,
            retry_after: None,
            trace_id: request_trace_id(),
        }
    }

    pub fn with_details(mut self, details: impl Into<serde_json::Value>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_retry_after(mut self, seconds: u64) -> Self {
        self.retry_after = Some(seconds);
        self
    }
}

/// Trace id of the request being served, or a short generated correlation
/// id when the error is built outside any request scope.
fn request_trace_id() -> String {
    telemetry::current_trace_id()
        .unwrap_or_else(|| format!("corr-{}", &uuid::Uuid::new_v4().simple().to_string()[..8]))
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, axum::Json(&self)).into_response();
        let headers = response.headers_mut();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );
        if let Some(seconds) = self.retry_after {
            headers.insert(header::RETRY_AFTER, HeaderValue::from(seconds));
        }
        response
    }
}

/// 401 in the standard envelope. `None` keeps the generic message.
pub fn unauthorized(message: Option<&str>) -> ApiError {
    ApiError::new(
        StatusCode::UNAUTHORIZED,
        "UNAUTHORIZED",
        message.unwrap_or("Authentication required"),
    )
}

/// 400 carrying per-field messages in `details`.
pub fn validation_error(message: &str, field_errors: serde_json::Value) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", message).with_details(field_errors)
}

/// Whether a database error is a unique-constraint violation.
///
/// The reconciler's create path depends on this classification: a
/// concurrent writer racing on the single-unread index surfaces here and
/// is handled as a benign conflict rather than a failure.
fn is_unique_violation(error: &sea_orm::DbErr) -> bool {
    use sea_orm::RuntimeErr;

    let sqlx_err = match error {
        sea_orm::DbErr::Query(RuntimeErr::SqlxError(source))
        | sea_orm::DbErr::Exec(RuntimeErr::SqlxError(source)) => source,
        _ => return false,
    };
    let Some(db_err) = sqlx_err.as_database_error() else {
        return false;
    };
    if db_err.is_unique_violation() {
        return true;
    }
    // Postgres raises 23505; the SQLite backend used in tests raises 1555
    // (primary key) or 2067 (unique index).
    matches!(db_err.code().as_deref(), Some("23505" | "1555" | "2067"))
}

/// Error type shared by the repository layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The requested record does not exist
    #[error("{0}")]
    NotFound(String),

    /// Input failed a repository-level validation rule
    #[error("validation failed: {0}")]
    Validation(String),

    /// A unique constraint rejected the write
    #[error("conflict: {0}")]
    Conflict(String),

    /// Any other database failure
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl RepositoryError {
    /// Map a SeaORM error, classifying unique violations as conflicts.
    pub fn database_error(error: sea_orm::DbErr) -> Self {
        if is_unique_violation(&error) {
            RepositoryError::Conflict(error.to_string())
        } else {
            RepositoryError::Database(error)
        }
    }

    pub fn validation_error<S: Into<String>>(message: S) -> Self {
        RepositoryError::Validation(message.into())
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        RepositoryError::NotFound(message.into())
    }

    /// Whether this error is a benign unique-constraint conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, RepositoryError::Conflict(_))
    }
}

impl From<RepositoryError> for ApiError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound(message) => {
                ApiError::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
            }
            RepositoryError::Validation(message) => {
                ApiError::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", message)
            }
            RepositoryError::Conflict(_) => {
                ApiError::new(StatusCode::CONFLICT, "CONFLICT", "Resource already exists")
            }
            RepositoryError::Database(source) => source.into(),
        }
    }
}

impl From<sea_orm::DbErr> for ApiError {
    fn from(error: sea_orm::DbErr) -> Self {
        if is_unique_violation(&error) {
            return ApiError::new(StatusCode::CONFLICT, "CONFLICT", "Resource already exists");
        }

        match error {
            sea_orm::DbErr::RecordNotFound(what) => ApiError::new(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("Record not found: {what}"),
            ),
            sea_orm::DbErr::Conn(source) => {
                tracing::error!(error = %source, "database connection lost while serving a request");
                ApiError::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_UNAVAILABLE",
                    "Database service unavailable",
                )
            }
            other => {
                tracing::error!(error = %other, "database operation failed");
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR",
                    "Database error occurred",
                )
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let message = match &rejection {
            JsonRejection::MissingJsonContentType(_) => {
                "Expected Content-Type: application/json".to_string()
            }
            JsonRejection::JsonSyntaxError(source) => {
                format!("Request body is not valid JSON: {source}")
            }
            JsonRejection::JsonDataError(source) => {
                format!("Request body has the wrong shape: {source}")
            }
            _ => "Could not read the request body".to_string(),
        };
        ApiError::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{TraceContext, with_trace_context};
    use serde_json::json;

    #[test]
    fn envelope_serializes_code_and_message_but_not_status() {
        let error = ApiError::new(StatusCode::NOT_FOUND, "NOT_FOUND", "No such record");
        let body = serde_json::to_value(&error).unwrap();

        assert_eq!(body["code"], "NOT_FOUND");
        assert_eq!(body["message"], "No such record");
        assert!(body.get("status").is_none());
        assert!(body.get("details").is_none());
        assert_eq!(body["retry_after"], serde_json::Value::Null);
    }

    #[test]
    fn responses_use_the_problem_json_content_type() {
        let response = ApiError::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", "bad input")
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/problem+json"
        );
    }

    #[test]
    fn retry_after_surfaces_as_a_header() {
        let response = ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "SERVICE_UNAVAILABLE",
            "down for maintenance",
        )
        .with_retry_after(30)
        .into_response();

        assert_eq!(response.headers()[header::RETRY_AFTER], "30");
    }

    #[tokio::test]
    async fn trace_id_prefers_the_request_scope() {
        let error = with_trace_context(TraceContext::new("req-42"), async {
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR", "boom")
        })
        .await;

        assert_eq!(error.trace_id, "req-42");
    }

    #[test]
    fn trace_id_falls_back_to_a_correlation_id() {
        let error = ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR", "boom");

        assert!(error.trace_id.starts_with("corr-"));
        assert_eq!(error.trace_id.len(), "corr-".len() + 8);
    }

    #[test]
    fn unauthorized_keeps_the_generic_message_by_default() {
        let error = unauthorized(None);
        assert_eq!(error.status, StatusCode::UNAUTHORIZED);
        assert_eq!(error.code, "UNAUTHORIZED");
        assert_eq!(error.message, "Authentication required");

        let custom = unauthorized(Some("Invalid bearer token"));
        assert_eq!(custom.message, "Invalid bearer token");
    }

    #[test]
    fn validation_error_carries_field_details() {
        let fields = json!({ "actor_id": "actor_id is required" });
        let error = validation_error("Validation failed", fields.clone());

        assert_eq!(error.status, StatusCode::BAD_REQUEST);
        assert_eq!(error.code, "VALIDATION_FAILED");
        assert_eq!(error.details, Some(fields));
    }

    #[test]
    fn repository_errors_map_onto_http_statuses() {
        let not_found: ApiError = RepositoryError::not_found("Notification not found").into();
        assert_eq!(not_found.status, StatusCode::NOT_FOUND);
        assert_eq!(not_found.code, "NOT_FOUND");

        let validation: ApiError = RepositoryError::validation_error("name is empty").into();
        assert_eq!(validation.status, StatusCode::BAD_REQUEST);
        assert_eq!(validation.code, "VALIDATION_FAILED");

        let conflict = RepositoryError::Conflict("duplicate unread row".to_string());
        assert!(conflict.is_conflict());
        let mapped: ApiError = conflict.into();
        assert_eq!(mapped.status, StatusCode::CONFLICT);
    }

    #[test]
    fn record_not_found_becomes_404() {
        let mapped: ApiError = sea_orm::DbErr::RecordNotFound("notifications".to_string()).into();

        assert_eq!(mapped.status, StatusCode::NOT_FOUND);
        assert!(mapped.message.contains("notifications"));
    }

    #[test]
    fn other_database_errors_stay_database_errors() {
        let classified = RepositoryError::database_error(sea_orm::DbErr::Custom("boom".to_string()));

        assert!(matches!(classified, RepositoryError::Database(_)));
        assert!(!classified.is_conflict());
    }
}
