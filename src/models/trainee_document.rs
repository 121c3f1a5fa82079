//! Trainee document entity model
//!
//! SeaORM entity for the trainee_documents table plus the closed vocabulary
//! of document kinds the requirement rules know about. The kind column is
//! stored raw because the wider product attaches document types this
//! service does not check (CVs, contracts); unknown kinds are simply
//! ignored by the rules.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// An uploaded document attached to a trainee.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "trainee_documents")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub trainee_id: Uuid,

    /// Kind slug, see [`DocumentKind`] for the checked subset.
    pub kind: String,

    pub file_name: String,
    pub uploaded_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::trainee::Entity",
        from = "Column::TraineeId",
        to = "super::trainee::Column::Id"
    )]
    Trainee,
}

impl Related<super::trainee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trainee.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Document kinds the missing-documents rule checks, in canonical display
/// order. Listing order here is the order missing items appear in
/// notification bodies, independent of upload or insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DocumentKind {
    Identification,
    Qualifications,
    IbanComprovative,
    CriminalRecord,
}

impl DocumentKind {
    /// All checked kinds in canonical order.
    pub const ALL: [DocumentKind; 4] = [
        DocumentKind::Identification,
        DocumentKind::Qualifications,
        DocumentKind::IbanComprovative,
        DocumentKind::CriminalRecord,
    ];

    /// Stable slug stored in the kind column.
    pub const fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Identification => "identification_document",
            DocumentKind::Qualifications => "qualifications_certificate",
            DocumentKind::IbanComprovative => "iban_comprovative",
            DocumentKind::CriminalRecord => "criminal_record_certificate",
        }
    }

    /// Human-readable name used in notification bodies.
    pub const fn display_name(&self) -> &'static str {
        match self {
            DocumentKind::Identification => "Identification Document",
            DocumentKind::Qualifications => "Qualifications Certificate",
            DocumentKind::IbanComprovative => "IBAN Comprovative",
            DocumentKind::CriminalRecord => "Criminal Record Certificate",
        }
    }

    /// Parse a stored kind slug; unknown kinds return None and are ignored
    /// by the rules.
    pub fn parse(value: &str) -> Option<DocumentKind> {
        DocumentKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == value)
    }
}
