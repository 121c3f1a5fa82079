//! Unit tests for the root and health handlers.

use crate::config::AppConfig;
use crate::handlers::{health, root};
use crate::models::ServiceInfo;
use axum::extract::State;
use migration::MigratorTrait;
use sea_orm::Database;

#[tokio::test]
async fn root_reports_the_service_name_and_version() {
    let info = root().await.0;

    assert_eq!(info.service, "traineo-notifications");
    assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
}

#[test]
fn service_info_default_matches_the_crate() {
    let info = ServiceInfo::default();

    assert_eq!(info.service, "traineo-notifications");
    assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn health_is_ok_with_a_live_database() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();

    let state = crate::server::create_test_app_state(
        AppConfig {
            profile: "test".to_string(),
            ..Default::default()
        },
        db,
    );

    let response = health(State(state)).await.unwrap();
    assert_eq!(response.0.status, "ok");
}
