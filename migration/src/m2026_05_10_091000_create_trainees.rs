//! Trainees table.
//!
//! The subjects watched by the deficiency generators; the
//! columns here carry the attributes the requirement rules condition on
//! (iban, works_with_minors, contact fields).

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
                    .table(Trainees::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Trainees::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Trainees::TenantId).uuid().not_null())
                    .col(ColumnDef::new(Trainees::Name).text().not_null())
                    .col(ColumnDef::new(Trainees::Email).text().null())
                    .col(ColumnDef::new(Trainees::Phone).text().null())
                    .col(ColumnDef::new(Trainees::BirthDate).date().null())
                    .col(ColumnDef::new(Trainees::Address).text().null())
                    .col(ColumnDef::new(Trainees::Iban).text().null())
                    .col(
                        ColumnDef::new(Trainees::WorksWithMinors)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Trainees::Status)
                            .text()
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Trainees::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Trainees::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trainees_tenant_id")
                            .from(Trainees::Table, Trainees::TenantId)
                            .to(Tenants::Table, Tenants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Generators batch-load active trainees per tenant
        manager
            .get_connection()
            .execute(Statement::from_string(
                manager.get_database_backend(),
                "CREATE INDEX IF NOT EXISTS idx_trainees_tenant_status ON trainees (tenant_id, status)"
                    .to_string(),
            ))
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_trainees_tenant_status").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Trainees::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Trainees {
    Table,
    Id,
    TenantId,
    Name,
    Email,
    Phone,
    BirthDate,
    Address,
    Iban,
    WorksWithMinors,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Tenants {
    Table,
    Id,
}
