//! SeaORM entity for the tenants table. Every trainee, document, and
//! notification row is scoped to one of these; the reconcile scheduler
//! sweeps them in turn.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// One customer organization using the platform
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tenants")]
pub struct Model {
    /// Primary key
    #[sea_orm(primary_key)]
    pub id: Uuid,

    /// Display name, never empty
    pub name: String,

    /// Creation time of the row
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::trainee::Entity")]
    Trainees,
    #[sea_orm(has_many = "super::notification::Entity")]
    Notifications,
}

impl Related<super::trainee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trainees.def()
    }
}

impl Related<super::notification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notifications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
