//! Origin tags on notification records.
//!
//! The origin column records which generation of the engine produced a
//! record. Rows tagged with the current origin are the ones the engine
//! updates in place; anything else is a legacy shape that gets migrated
//! away the next time its subject is processed.

/// Origin written on every record the current engine creates or updates.
pub const CURRENT_ORIGIN: &str = "reconciler/v2";

/// Origin written by the first-generation engine.
pub const LEGACY_V1_ORIGIN: &str = "reconciler/v1";

/// Parsed form of the origin column. String comparison happens only in
/// [`OriginTag::parse`]; everything downstream matches on the variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginTag {
    /// Produced by the current engine format.
    Current,
    /// Produced by an earlier format; scheduled for removal.
    Legacy(LegacyOrigin),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyOrigin {
    /// Tagged by the first-generation engine.
    V1,
    /// No recognized tag, including the empty-string column default on
    /// rows that predate the engine.
    Untagged,
}

impl OriginTag {
    pub fn parse(raw: &str) -> Self {
        match raw {
            CURRENT_ORIGIN => OriginTag::Current,
            LEGACY_V1_ORIGIN => OriginTag::Legacy(LegacyOrigin::V1),
            _ => OriginTag::Legacy(LegacyOrigin::Untagged),
        }
    }

    /// Canonical column value for tags the engine itself writes. Untagged
    /// rows have no canonical form; they keep whatever the column holds.
    pub fn as_str(self) -> Option<&'static str> {
        match self {
            OriginTag::Current => Some(CURRENT_ORIGIN),
            OriginTag::Legacy(LegacyOrigin::V1) => Some(LEGACY_V1_ORIGIN),
            OriginTag::Legacy(LegacyOrigin::Untagged) => None,
        }
    }

    pub fn is_current(self) -> bool {
        matches!(self, OriginTag::Current)
    }

    pub fn is_legacy(self) -> bool {
        matches!(self, OriginTag::Legacy(_))
    }
}
