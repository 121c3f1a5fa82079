//! # Reconcile API Handler
//!
//! On-demand trigger for the notification reconciliation engine, scoped to
//! the calling tenant. The scheduler drives the same engine in the
//! background; this endpoint exists so operators and admin tooling can force
//! a pass without waiting for the next tick.

use crate::auth::{AuthenticatedOperator, TenantIdHeader, TenantScope};
use crate::deficiencies::default_registry;
use crate::error::ApiError;
use crate::reconcile::{ReconcileEngine, RunSummary};
use crate::server::AppState;
use axum::{extract::State, response::Json};
use tracing::info;

/// Run a reconciliation pass for the calling tenant
///
/// Always answers 200 with a [`RunSummary`]; category failures are carried
/// inside the summary instead of failing the request.
#[utoipa::path(
    post,
    path = "/api/v1/reconcile",
    security(("bearer_auth" = [])),
    params(TenantIdHeader),
    responses(
        (status = 200, description = "Summary of the reconciliation pass", body = RunSummary),
        (status = 400, description = "Missing or invalid tenant header", body = ApiError),
        (status = 401, description = "Bearer token missing or not recognized", body = ApiError)
    ),
    tag = "reconcile"
)]
pub async fn trigger_reconcile(
    State(state): State<AppState>,
    _operator_auth: AuthenticatedOperator,
    TenantScope(tenant): TenantScope,
) -> Json<RunSummary> {
    info!(tenant_id = %tenant.0, "Reconciliation pass requested via API");

    let registry = default_registry(&state.config.reconcile.portal_base_url);
    let engine = ReconcileEngine::new(state.db.clone(), registry);
    let summary = engine.reconcile(tenant.0).await;

    Json(summary)
}
