//! Content fingerprints for deficiencies.
//!
//! The fingerprint is a SHA-256 digest over a canonical serialization of a
//! deficiency's structured facts, not its rendered text. Two deficiencies
//! describing the same missing items compare equal regardless of the order
//! the facts were collected in.

use sha2::{Digest, Sha256};

use crate::models::notification::NotificationCategory;

/// Compute the canonical fingerprint for a deficiency's facts.
///
/// Facts are sorted and deduplicated before hashing so the digest depends
/// only on the set of facts, and the category is mixed in so identical fact
/// slugs in different categories never collide.
pub fn compute(category: NotificationCategory, facts: &[String]) -> String {
    let mut canonical: Vec<&str> = facts.iter().map(String::as_str).collect();
    canonical.sort_unstable();
    canonical.dedup();

    let payload = serde_json::json!({
        "category": category.as_str(),
        "facts": canonical,
    })
    .to_string();

    hex::encode(Sha256::digest(payload.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fact_order_does_not_change_fingerprint() {
        let forward = compute(
            NotificationCategory::MissingDocument,
            &[
                "identification_document".to_string(),
                "iban_comprovative".to_string(),
            ],
        );
        let reversed = compute(
            NotificationCategory::MissingDocument,
            &[
                "iban_comprovative".to_string(),
                "identification_document".to_string(),
            ],
        );
        assert_eq!(forward, reversed);
    }

    #[test]
    fn duplicate_facts_collapse() {
        let single = compute(
            NotificationCategory::IncompleteInformation,
            &["phone".to_string()],
        );
        let repeated = compute(
            NotificationCategory::IncompleteInformation,
            &["phone".to_string(), "phone".to_string()],
        );
        assert_eq!(single, repeated);
    }

    #[test]
    fn different_facts_differ() {
        let a = compute(
            NotificationCategory::MissingDocument,
            &["identification_document".to_string()],
        );
        let b = compute(
            NotificationCategory::MissingDocument,
            &["qualifications_certificate".to_string()],
        );
        assert_ne!(a, b);
    }

    #[test]
    fn category_distinguishes_identical_facts() {
        let facts = vec!["phone".to_string()];
        let a = compute(NotificationCategory::MissingDocument, &facts);
        let b = compute(NotificationCategory::IncompleteInformation, &facts);
        assert_ne!(a, b);
    }

    #[test]
    fn fingerprint_is_lowercase_hex_sha256() {
        let digest = compute(NotificationCategory::MissingDocument, &[]);
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
