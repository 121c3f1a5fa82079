//! Notification entity model
//!
//! SeaORM entity for the notifications table, the record shape the
//! reconciliation engine converges toward: at most one unread row per
//! (tenant, category, subject, current origin). The origin column stays a
//! raw string here; parsing it into a tagged value is the job of
//! [`crate::deficiencies::OriginTag`] so legacy formats are matched
//! exhaustively in exactly one place.

use sea_orm::{
    ActiveModelBehavior, DeriveActiveEnum, DeriveEntityModel, EntityTrait, EnumIter, RelationDef,
    entity::prelude::*,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,

    pub tenant_id: Uuid,

    /// Deficiency category; also the key scoping reconciliation passes
    pub category: NotificationCategory,

    pub status: NotificationStatus,

    /// Kind of the entity this notification concerns
    pub subject_kind: SubjectKind,

    /// Identifier of the entity this notification concerns
    pub subject_id: Uuid,

    /// Opaque tag naming the generation logic that produced the row;
    /// empty for rows that predate the engine
    pub origin: String,

    pub title: String,

    pub body: String,

    /// Content hash of the structured deficiency facts; null on rows
    /// written before hashing existed
    pub fingerprint: Option<String>,

    /// Deep link into the portal for resolving the deficiency
    pub link: Option<String>,

    pub read_at: Option<DateTimeWithTimeZone>,

    /// Identity of the user who marked the row read
    pub read_by: Option<Uuid>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

/// Closed set of notification categories.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum NotificationCategory {
    #[sea_orm(string_value = "missing_document")]
    #[serde(rename = "missing_document")]
    MissingDocument,

    #[sea_orm(string_value = "incomplete_information")]
    #[serde(rename = "incomplete_information")]
    IncompleteInformation,

    #[sea_orm(string_value = "general_alert")]
    #[serde(rename = "general_alert")]
    GeneralAlert,
}

impl NotificationCategory {
    /// Stable string key, used to scope cleanup and registry lookups.
    pub const fn as_str(&self) -> &'static str {
        match self {
            NotificationCategory::MissingDocument => "missing_document",
            NotificationCategory::IncompleteInformation => "incomplete_information",
            NotificationCategory::GeneralAlert => "general_alert",
        }
    }
}

/// Notification lifecycle status.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum NotificationStatus {
    #[sea_orm(string_value = "unread")]
    #[serde(rename = "unread")]
    #[default]
    Unread,

    #[sea_orm(string_value = "read")]
    #[serde(rename = "read")]
    Read,

    #[sea_orm(string_value = "archived")]
    #[serde(rename = "archived")]
    Archived,
}

/// Kind tag of a watched subject.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum SubjectKind {
    #[sea_orm(string_value = "trainee")]
    #[serde(rename = "trainee")]
    Trainee,
}

impl SubjectKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SubjectKind::Trainee => "trainee",
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tenant::Entity",
        from = "Column::TenantId",
        to = "super::tenant::Column::Id"
    )]
    Tenant,
}

impl Related<super::tenant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tenant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Public representation for API responses (internal bookkeeping columns
/// like origin and fingerprint are not exposed)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationResponse {
    pub id: Uuid,
    pub category: NotificationCategory,
    pub status: NotificationStatus,
    pub subject_kind: SubjectKind,
    pub subject_id: Uuid,
    pub title: String,
    pub body: String,
    pub link: Option<String>,
    #[schema(value_type = Option<String>, example = "2026-05-12T09:41:00Z")]
    pub read_at: Option<DateTimeWithTimeZone>,
    pub read_by: Option<Uuid>,
    #[schema(value_type = String, example = "2026-05-12T09:40:00Z")]
    pub created_at: DateTimeWithTimeZone,
    #[schema(value_type = String, example = "2026-05-12T09:40:00Z")]
    pub updated_at: DateTimeWithTimeZone,
}

impl From<Model> for NotificationResponse {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            category: model.category,
            status: model.status,
            subject_kind: model.subject_kind,
            subject_id: model.subject_id,
            title: model.title,
            body: model.body,
            link: model.link,
            read_at: model.read_at,
            read_by: model.read_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
