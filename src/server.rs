//! Router assembly, shared state, OpenAPI wiring, and the run loop that
//! owns the listener and the background reconciliation scheduler.

use std::sync::Arc;

use axum::{
    Router,
    extract::Request,
    http::HeaderValue,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post},
};
use sea_orm::DatabaseConnection;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use crate::auth::auth_middleware;
use crate::config::AppConfig;
use crate::handlers;
use crate::scheduler::ReconcileScheduler;
use crate::telemetry::{self, TraceContext};

/// Shared handles every handler can reach through `State`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
}

/// Builds an [`AppState`] for tests without starting any background work
pub fn create_test_app_state(config: AppConfig, db: DatabaseConnection) -> AppState {
    AppState {
        config: Arc::new(config),
        db,
    }
}

/// Middleware establishing a per-request trace context.
///
/// An incoming `X-Request-Id` header is honored so upstream proxies can
/// correlate; otherwise a fresh ID is generated. The ID is echoed back on
/// the response.
async fn trace_context_middleware(mut request: Request, next: Next) -> Response {
    let trace_id = request
        .headers()
        .get("X-Request-Id")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let context = TraceContext::new(trace_id.clone());
    request.extensions_mut().insert(context.clone());

    let mut response = telemetry::with_trace_context(context, next.run(request)).await;

    if let Ok(header_value) = HeaderValue::from_str(&trace_id) {
        response.headers_mut().insert("X-Request-Id", header_value);
    }

    response
}

/// Assembles the full router: open root and health routes, the guarded
/// API surface, Swagger UI, and the tracing and CORS layers.
pub fn create_app(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/api/v1/notifications",
            get(handlers::notifications::list_notifications),
        )
        .route(
            "/api/v1/notifications/count",
            get(handlers::notifications::count_notifications),
        )
        .route(
            "/api/v1/notifications/read-all",
            post(handlers::notifications::mark_all_notifications_read),
        )
        .route(
            "/api/v1/notifications/{id}",
            get(handlers::notifications::get_notification)
                .delete(handlers::notifications::delete_notification),
        )
        .route(
            "/api/v1/notifications/{id}/read",
            post(handlers::notifications::mark_notification_read),
        )
        .route(
            "/api/v1/notifications/subject/{kind}/{subject_id}",
            delete(handlers::notifications::delete_subject_notifications),
        )
        .route(
            "/api/v1/reconcile",
            post(handlers::reconcile::trigger_reconcile),
        )
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state.config),
            auth_middleware,
        ));

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .merge(protected)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(trace_context_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Starts the server with the given configuration.
///
/// Owns the background reconciliation scheduler: when enabled it runs next
/// to the listener and is joined after a graceful shutdown.
pub async fn run_server(
    config: AppConfig,
    db: DatabaseConnection,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState {
        config: Arc::new(config),
        db,
    };

    let addr = state
        .config
        .bind_addr()
        .map_err(|e| format!("Invalid server address: {}", e))?;

    let shutdown = CancellationToken::new();

    let scheduler_handle = if state.config.reconcile.enabled {
        let scheduler = ReconcileScheduler::new(Arc::clone(&state.config), state.db.clone());
        Some(tokio::spawn(scheduler.run(shutdown.clone())))
    } else {
        info!("Background reconciliation disabled by configuration");
        None
    };

    let app = create_app(state.clone());
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, profile = %state.config.profile, "Server listening");

    let serve_shutdown = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutdown signal received");
            serve_shutdown.cancel();
        })
        .await?;

    shutdown.cancel();
    if let Some(handle) = scheduler_handle
        && let Err(e) = handle.await
    {
        error!("Reconcile scheduler task panicked: {}", e);
    }

    Ok(())
}

/// OpenAPI description served at /openapi.json.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::health,
        crate::handlers::notifications::list_notifications,
        crate::handlers::notifications::count_notifications,
        crate::handlers::notifications::get_notification,
        crate::handlers::notifications::mark_notification_read,
        crate::handlers::notifications::mark_all_notifications_read,
        crate::handlers::notifications::delete_notification,
        crate::handlers::notifications::delete_subject_notifications,
        crate::handlers::reconcile::trigger_reconcile,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::handlers::HealthResponse,
            crate::models::notification::NotificationResponse,
            crate::models::notification::NotificationCategory,
            crate::models::notification::NotificationStatus,
            crate::models::notification::SubjectKind,
            crate::handlers::notifications::NotificationsResponse,
            crate::handlers::notifications::CountResponse,
            crate::handlers::notifications::MarkReadRequest,
            crate::handlers::notifications::MarkAllReadResponse,
            crate::handlers::notifications::SubjectCleanupResponse,
            crate::reconcile::RunSummary,
            crate::error::ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Traineo Notifications API",
        description = "Deficiency notification reconciliation service for training programs",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some("Operator bearer token"))
                    .build(),
            ),
        );
    }
}
