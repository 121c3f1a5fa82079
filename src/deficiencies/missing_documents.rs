//! Missing-documents deficiency generator
//!
//! One deficiency per active trainee missing at least one required
//! document. The required set depends on the trainee: identification and
//! qualifications are always required, the IBAN comprovative only when an
//! IBAN is on file, the criminal record certificate only for placements
//! involving minors. Bodies list the missing documents in canonical order
//! so unchanged input yields byte-identical bodies.

use std::collections::HashSet;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::deficiencies::trait_::{Deficiency, DeficiencyGenerator, GeneratorError};
use crate::models::notification::{NotificationCategory, SubjectKind};
use crate::models::trainee::Model as TraineeModel;
use crate::models::trainee_document::{DocumentKind, Model as TraineeDocumentModel};
use crate::repositories::{NotificationRepository, TraineeRepository};

pub struct MissingDocumentsGenerator {
    portal_base_url: String,
}

impl MissingDocumentsGenerator {
    pub fn new(portal_base_url: impl Into<String>) -> Self {
        Self {
            portal_base_url: portal_base_url.into(),
        }
    }

    /// Documents this trainee is required to have, in canonical order
    fn required_kinds(trainee: &TraineeModel) -> Vec<DocumentKind> {
        let mut required = vec![DocumentKind::Identification, DocumentKind::Qualifications];
        if trainee
            .iban
            .as_deref()
            .is_some_and(|iban| !iban.trim().is_empty())
        {
            required.push(DocumentKind::IbanComprovative);
        }
        if trainee.works_with_minors {
            required.push(DocumentKind::CriminalRecord);
        }
        required
    }

    /// Required kinds not covered by any uploaded document. Unknown kind
    /// slugs on documents are ignored.
    fn missing_kinds(
        trainee: &TraineeModel,
        documents: &[TraineeDocumentModel],
    ) -> Vec<DocumentKind> {
        let uploaded: HashSet<DocumentKind> = documents
            .iter()
            .filter_map(|document| DocumentKind::parse(&document.kind))
            .collect();

        Self::required_kinds(trainee)
            .into_iter()
            .filter(|kind| !uploaded.contains(kind))
            .collect()
    }

    fn build_deficiency(&self, trainee: &TraineeModel, missing: &[DocumentKind]) -> Deficiency {
        let bullets: Vec<String> = missing
            .iter()
            .map(|kind| format!("- {}", kind.display_name()))
            .collect();
        let facts: Vec<String> = missing.iter().map(|kind| kind.as_str().to_string()).collect();

        Deficiency {
            category: NotificationCategory::MissingDocument,
            subject_kind: SubjectKind::Trainee,
            subject_id: trainee.id,
            title: format!("Missing documents: {}", trainee.name),
            body: format!(
                "{} is missing required documents:\n{}",
                trainee.name,
                bullets.join("\n")
            ),
            link: Some(format!(
                "{}/trainees/{}/documents",
                self.portal_base_url.trim_end_matches('/'),
                trainee.id
            )),
            facts,
        }
    }
}

#[async_trait]
impl DeficiencyGenerator for MissingDocumentsGenerator {
    fn category(&self) -> NotificationCategory {
        NotificationCategory::MissingDocument
    }

    fn describe(&self) -> &'static str {
        "trainees missing required documents"
    }

    async fn generate(
        &self,
        db: &DatabaseConnection,
        tenant_id: Uuid,
    ) -> Result<Vec<Deficiency>, GeneratorError> {
        let trainees = TraineeRepository::new(db)
            .find_active_with_documents(tenant_id)
            .await?;

        let mut deficiencies = Vec::new();
        for (trainee, documents) in &trainees {
            let missing = Self::missing_kinds(trainee, documents);
            if missing.is_empty() {
                continue;
            }
            deficiencies.push(self.build_deficiency(trainee, &missing));
        }

        Ok(deficiencies)
    }

    async fn find_obsolete(
        &self,
        db: &DatabaseConnection,
        tenant_id: Uuid,
    ) -> Result<Vec<Uuid>, GeneratorError> {
        let active: HashSet<Uuid> = TraineeRepository::new(db)
            .find_active(tenant_id)
            .await?
            .into_iter()
            .map(|trainee| trainee.id)
            .collect();

        let unread = NotificationRepository::new(db)
            .find_unread_by_category(tenant_id, self.category())
            .await?;

        Ok(unread
            .into_iter()
            .filter(|record| {
                record.subject_kind == SubjectKind::Trainee && !active.contains(&record.subject_id)
            })
            .map(|record| record.id)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::trainee::TraineeStatus;
    use chrono::Utc;

    fn trainee(iban: Option<&str>, works_with_minors: bool) -> TraineeModel {
        let now = Utc::now();
        TraineeModel {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            name: "Maria Santos".to_string(),
            email: None,
            phone: None,
            birth_date: None,
            address: None,
            iban: iban.map(str::to_string),
            works_with_minors,
            status: TraineeStatus::Active,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn document(trainee: &TraineeModel, kind: &str) -> TraineeDocumentModel {
        TraineeDocumentModel {
            id: Uuid::new_v4(),
            tenant_id: trainee.tenant_id,
            trainee_id: trainee.id,
            kind: kind.to_string(),
            file_name: format!("{kind}.pdf"),
            uploaded_at: Utc::now().into(),
        }
    }

    #[test]
    fn base_requirements_without_conditionals() {
        let trainee = trainee(None, false);
        assert_eq!(
            MissingDocumentsGenerator::required_kinds(&trainee),
            vec![DocumentKind::Identification, DocumentKind::Qualifications]
        );
    }

    #[test]
    fn iban_requires_comprovative_but_blank_does_not() {
        let with_iban = trainee(Some("PT50000201231234567890154"), false);
        assert!(
            MissingDocumentsGenerator::required_kinds(&with_iban)
                .contains(&DocumentKind::IbanComprovative)
        );

        let blank_iban = trainee(Some("   "), false);
        assert!(
            !MissingDocumentsGenerator::required_kinds(&blank_iban)
                .contains(&DocumentKind::IbanComprovative)
        );
    }

    #[test]
    fn working_with_minors_requires_criminal_record() {
        let trainee = trainee(None, true);
        assert_eq!(
            MissingDocumentsGenerator::required_kinds(&trainee),
            vec![
                DocumentKind::Identification,
                DocumentKind::Qualifications,
                DocumentKind::CriminalRecord,
            ]
        );
    }

    #[test]
    fn uploaded_documents_satisfy_requirements() {
        let trainee = trainee(Some("PT50000201231234567890154"), false);
        let documents = vec![
            document(&trainee, "identification_document"),
            document(&trainee, "qualifications_certificate"),
        ];

        assert_eq!(
            MissingDocumentsGenerator::missing_kinds(&trainee, &documents),
            vec![DocumentKind::IbanComprovative]
        );
    }

    #[test]
    fn unknown_document_kinds_are_ignored() {
        let trainee = trainee(None, false);
        let documents = vec![document(&trainee, "cv"), document(&trainee, "contract")];

        assert_eq!(
            MissingDocumentsGenerator::missing_kinds(&trainee, &documents),
            vec![DocumentKind::Identification, DocumentKind::Qualifications]
        );
    }

    #[test]
    fn body_lists_missing_documents_in_canonical_order() {
        let generator = MissingDocumentsGenerator::new("https://portal.example.com/");
        let trainee = trainee(Some("PT50000201231234567890154"), false);
        let missing = vec![DocumentKind::Identification, DocumentKind::IbanComprovative];

        let deficiency = generator.build_deficiency(&trainee, &missing);
        assert!(deficiency.body.contains("- Identification Document\n- IBAN Comprovative"));
        assert!(!deficiency.body.contains("Qualifications"));
        assert_eq!(
            deficiency.link.as_deref(),
            Some(
                format!("https://portal.example.com/trainees/{}/documents", trainee.id).as_str()
            )
        );
        assert_eq!(
            deficiency.facts,
            vec!["identification_document".to_string(), "iban_comprovative".to_string()]
        );
    }

    #[test]
    fn identical_input_builds_identical_fingerprints() {
        let generator = MissingDocumentsGenerator::new("https://portal.example.com");
        let trainee = trainee(None, true);
        let missing = MissingDocumentsGenerator::missing_kinds(&trainee, &[]);

        let first = generator.build_deficiency(&trainee, &missing);
        let second = generator.build_deficiency(&trainee, &missing);
        assert_eq!(first.fingerprint(), second.fingerprint());
        assert_eq!(first.body, second.body);
    }
}
