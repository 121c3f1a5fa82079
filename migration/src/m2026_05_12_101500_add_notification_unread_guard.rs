//! Adds a partial unique index preventing duplicate unread notifications.
//!
//! At most one unread row may exist per (tenant, category, subject, origin);
//! a concurrent reconciler racing on the create path hits this index and is
//! treated as a benign conflict.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{DatabaseBackend, Statement};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        match backend {
            DatabaseBackend::Postgres => {
                manager
                    .get_connection()
                    .execute(Statement::from_string(
                        backend,
                        "DO $$\nBEGIN\n    IF NOT EXISTS (\n        SELECT 1 FROM pg_indexes\n        WHERE schemaname = current_schema()\n          AND indexname = 'idx_notifications_single_unread'\n    ) THEN\n        CREATE UNIQUE INDEX idx_notifications_single_unread\n            ON notifications (tenant_id, category, subject_kind, subject_id, origin)\n            WHERE status = 'unread';\n    END IF;\nEND\n$$;"
                            .to_string(),
                    ))
                    .await
                    .map(|_| ())
            }
            _ => manager
                .get_connection()
                .execute(Statement::from_string(
                    backend,
                    "CREATE UNIQUE INDEX IF NOT EXISTS idx_notifications_single_unread \
                     ON notifications (tenant_id, category, subject_kind, subject_id, origin) \
                     WHERE status = 'unread'"
                        .to_string(),
                ))
                .await
                .map(|_| ()),
        }
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute(Statement::from_string(
                manager.get_database_backend(),
                "DROP INDEX IF EXISTS idx_notifications_single_unread",
            ))
            .await
            .map(|_| ())
    }
}
