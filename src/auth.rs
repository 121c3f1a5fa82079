//! Operator bearer-token authentication and tenant scoping.
//!
//! Protected routes require two things: an `Authorization: Bearer` token
//! drawn from the configured operator set, and an `X-Tenant-Id` header
//! naming the tenant the request operates on. [`auth_middleware`] checks
//! both and records the outcome in request extensions, where the
//! [`AuthenticatedOperator`] and [`TenantScope`] extractors pick it up.

use std::fmt;
use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::{ApiError, unauthorized, validation_error};

/// Strongly typed tenant identifier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TenantId(pub Uuid);

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Marker proving the request presented a valid operator token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedOperator;

/// Tenant scope attached to the request by the auth middleware.
#[derive(Debug, Clone)]
pub struct TenantScope(pub TenantId);

/// Validates operator credentials and tenant scope, then forwards the
/// request with both recorded in its extensions.
pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())?;
    if !token_is_recognized(&config, token) {
        return Err(unauthorized(Some("Invalid bearer token")));
    }

    let tenant = tenant_scope(request.headers())?;
    tracing::debug!(tenant_id = %tenant, "Operator request authenticated");

    request.extensions_mut().insert(TenantScope(tenant));
    request.extensions_mut().insert(AuthenticatedOperator);

    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let raw = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| unauthorized(Some("Missing Authorization header")))?
        .to_str()
        .map_err(|_| unauthorized(Some("Authorization header is not valid UTF-8")))?;

    raw.strip_prefix("Bearer ")
        .ok_or_else(|| unauthorized(Some("Authorization header must use the Bearer scheme")))
}

/// Checks the presented token against every configured one, comparing in
/// constant time so the match position leaks nothing.
fn token_is_recognized(config: &AppConfig, token: &str) -> bool {
    config
        .operator_tokens
        .iter()
        .any(|configured| bool::from(token.as_bytes().ct_eq(configured.as_bytes())))
}

fn tenant_scope(headers: &HeaderMap) -> Result<TenantId, ApiError> {
    let raw = headers
        .get("X-Tenant-Id")
        .ok_or_else(|| {
            validation_error(
                "Missing required header",
                serde_json::json!({ "X-Tenant-Id": "required header is missing" }),
            )
        })?
        .to_str()
        .map_err(|_| {
            validation_error(
                "Invalid tenant header",
                serde_json::json!({ "X-Tenant-Id": "header must be valid UTF-8" }),
            )
        })?;

    raw.parse::<Uuid>().map(TenantId).map_err(|_| {
        validation_error(
            "Invalid tenant ID",
            serde_json::json!({ "X-Tenant-Id": "must be a valid UUID" }),
        )
    })
}

/// OpenAPI parameter describing the `X-Tenant-Id` header.
#[derive(Debug, Serialize, Deserialize, IntoParams, utoipa::ToSchema)]
#[into_params(parameter_in = Header)]
pub struct TenantIdHeader {
    /// Tenant (UUID) the request is scoped to
    #[serde(rename = "X-Tenant-Id")]
    #[param(rename = "X-Tenant-Id", value_type = String)]
    pub tenant_id: String,
}

impl<S> FromRequestParts<S> for TenantScope
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TenantScope>()
            .cloned()
            .ok_or_else(|| {
                validation_error(
                    "Tenant context missing",
                    serde_json::json!({ "X-Tenant-Id": "tenant scope was not established" }),
                )
            })
    }
}

impl<S> FromRequestParts<S> for AuthenticatedOperator
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedOperator>()
            .copied()
            .ok_or_else(|| unauthorized(Some("Operator authentication required")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
    };
    use tower::ServiceExt;

    fn config_with_tokens(tokens: &[&str]) -> Arc<AppConfig> {
        Arc::new(AppConfig {
            operator_tokens: tokens.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        })
    }

    async fn call_guarded_route(config: Arc<AppConfig>, request: Request<Body>) -> Response {
        Router::new()
            .route("/probe", get(|| async { "ok" }))
            .layer(from_fn_with_state(config, auth_middleware))
            .oneshot(request)
            .await
            .unwrap()
    }

    fn request(auth: Option<&str>, tenant: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/probe");
        if let Some(value) = auth {
            builder = builder.header("Authorization", value);
        }
        if let Some(value) = tenant {
            builder = builder.header("X-Tenant-Id", value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn missing_authorization_header_is_rejected() {
        let tenant = Uuid::new_v4().to_string();
        let response =
            call_guarded_route(config_with_tokens(&["secret"]), request(None, Some(&tenant))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_rejected() {
        let tenant = Uuid::new_v4().to_string();
        let response = call_guarded_route(
            config_with_tokens(&["secret"]),
            request(Some("Basic dXNlcjpwYXNz"), Some(&tenant)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_token_is_rejected() {
        let tenant = Uuid::new_v4().to_string();
        let response = call_guarded_route(
            config_with_tokens(&["secret"]),
            request(Some("Bearer intruder"), Some(&tenant)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn missing_tenant_header_is_rejected() {
        let response =
            call_guarded_route(config_with_tokens(&["secret"]), request(Some("Bearer secret"), None))
                .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_tenant_id_is_rejected() {
        let response = call_guarded_route(
            config_with_tokens(&["secret"]),
            request(Some("Bearer secret"), Some("not-a-uuid")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn authorized_request_reaches_handler() {
        let tenant = Uuid::new_v4().to_string();
        let response = call_guarded_route(
            config_with_tokens(&["secret"]),
            request(Some("Bearer secret"), Some(&tenant)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn any_configured_token_is_accepted() {
        let config = config_with_tokens(&["first", "second", "third"]);

        for candidate in ["first", "second", "third"] {
            let tenant = Uuid::new_v4().to_string();
            let response = call_guarded_route(
                Arc::clone(&config),
                request(Some(&format!("Bearer {candidate}")), Some(&tenant)),
            )
            .await;
            assert_eq!(response.status(), StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn extractors_reject_requests_outside_the_middleware() {
        let (mut parts, _) = Request::builder()
            .uri("/probe")
            .body(Body::empty())
            .unwrap()
            .into_parts();

        let auth = AuthenticatedOperator::from_request_parts(&mut parts, &()).await;
        assert_eq!(auth.unwrap_err().status, StatusCode::UNAUTHORIZED);

        let tenant = TenantScope::from_request_parts(&mut parts, &()).await;
        assert_eq!(tenant.unwrap_err().status, StatusCode::BAD_REQUEST);
    }
}
