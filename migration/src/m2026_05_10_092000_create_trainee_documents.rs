//! Trainee documents table.
//!
//! One row per uploaded document; kind is the stable slug the requirement
//! rules check against. Re-uploads of the same kind add new rows, so there
//! is no uniqueness on (trainee_id, kind).

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Statement;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TraineeDocuments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TraineeDocuments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TraineeDocuments::TenantId).uuid().not_null())
                    .col(
                        ColumnDef::new(TraineeDocuments::TraineeId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TraineeDocuments::Kind).text().not_null())
                    .col(ColumnDef::new(TraineeDocuments::FileName).text().not_null())
                    .col(
                        ColumnDef::new(TraineeDocuments::UploadedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trainee_documents_tenant_id")
                            .from(TraineeDocuments::Table, TraineeDocuments::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trainee_documents_trainee_id")
                            .from(TraineeDocuments::Table, TraineeDocuments::TraineeId)
                            .to(Trainees::Table, Trainees::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute(Statement::from_string(
                manager.get_database_backend(),
                "CREATE INDEX IF NOT EXISTS idx_trainee_documents_trainee_kind ON trainee_documents (trainee_id, kind)"
                    .to_string(),
            ))
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_trainee_documents_trainee_kind")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(TraineeDocuments::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TraineeDocuments {
    Table,
    Id,
    TenantId,
    TraineeId,
    Kind,
    FileName,
    UploadedAt,
}

#[derive(DeriveIden)]
enum Tenants {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Trainees {
    Table,
    Id,
}
