//! Trainee entity model
//!
//! SeaORM entity for the trainees table. Trainees are the subjects watched
//! by the deficiency generators; the rule-relevant attributes (iban,
//! works_with_minors, contact fields) live directly on this row so a single
//! batch query feeds a whole generator pass.

use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A person enrolled in a training program.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "trainees")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<Date>,
    pub address: Option<String>,

    /// Payment account for grant disbursement; when set, an IBAN
    /// comprovative document becomes required
    pub iban: Option<String>,

    /// Whether the placement involves working with minors, which requires
    /// a criminal record certificate
    pub works_with_minors: bool,

    /// Lifecycle status; only active trainees are eligible for checks
    pub status: TraineeStatus,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

/// Trainee lifecycle status
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema, Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum TraineeStatus {
    #[sea_orm(string_value = "active")]
    #[serde(rename = "active")]
    #[default]
    Active,

    #[sea_orm(string_value = "archived")]
    #[serde(rename = "archived")]
    Archived,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::trainee_document::Entity")]
    TraineeDocuments,

    #[sea_orm(
        belongs_to = "super::tenant::Entity",
        from = "Column::TenantId",
        to = "super::tenant::Column::Id"
    )]
    Tenant,
}

impl Related<super::trainee_document::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TraineeDocuments.def()
    }
}

impl Related<super::tenant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tenant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
