//! Incomplete-profile deficiency generator
//!
//! One deficiency per active trainee whose contact profile is missing a
//! phone number, birth date, or address. Fields are listed in a fixed
//! canonical order, same contract as the missing-documents bodies.

use std::collections::HashSet;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::deficiencies::trait_::{Deficiency, DeficiencyGenerator, GeneratorError};
use crate::models::notification::{NotificationCategory, SubjectKind};
use crate::models::trainee::Model as TraineeModel;
use crate::repositories::{NotificationRepository, TraineeRepository};

/// Profile fields the rule checks, in canonical display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    Phone,
    BirthDate,
    Address,
}

impl ProfileField {
    pub const ALL: [ProfileField; 3] = [
        ProfileField::Phone,
        ProfileField::BirthDate,
        ProfileField::Address,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            ProfileField::Phone => "phone",
            ProfileField::BirthDate => "birth_date",
            ProfileField::Address => "address",
        }
    }

    pub const fn display_name(&self) -> &'static str {
        match self {
            ProfileField::Phone => "Phone number",
            ProfileField::BirthDate => "Birth date",
            ProfileField::Address => "Address",
        }
    }

    /// Whether the trainee row has this field filled in. Whitespace-only
    /// strings count as missing.
    fn is_present(&self, trainee: &TraineeModel) -> bool {
        match self {
            ProfileField::Phone => trainee
                .phone
                .as_deref()
                .is_some_and(|phone| !phone.trim().is_empty()),
            ProfileField::BirthDate => trainee.birth_date.is_some(),
            ProfileField::Address => trainee
                .address
                .as_deref()
                .is_some_and(|address| !address.trim().is_empty()),
        }
    }
}

pub struct IncompleteProfileGenerator {
    portal_base_url: String,
}

impl IncompleteProfileGenerator {
    pub fn new(portal_base_url: impl Into<String>) -> Self {
        Self {
            portal_base_url: portal_base_url.into(),
        }
    }

    fn missing_fields(trainee: &TraineeModel) -> Vec<ProfileField> {
        ProfileField::ALL
            .into_iter()
            .filter(|field| !field.is_present(trainee))
            .collect()
    }

    fn build_deficiency(&self, trainee: &TraineeModel, missing: &[ProfileField]) -> Deficiency {
        let bullets: Vec<String> = missing
            .iter()
            .map(|field| format!("- {}", field.display_name()))
            .collect();
        let facts: Vec<String> = missing.iter().map(|field| field.as_str().to_string()).collect();

        Deficiency {
            category: NotificationCategory::IncompleteInformation,
            subject_kind: SubjectKind::Trainee,
            subject_id: trainee.id,
            title: format!("Incomplete profile: {}", trainee.name),
            body: format!(
                "{} has incomplete profile information:\n{}",
                trainee.name,
                bullets.join("\n")
            ),
            link: Some(format!(
                "{}/trainees/{}/profile",
                self.portal_base_url.trim_end_matches('/'),
                trainee.id
            )),
            facts,
        }
    }
}

#[async_trait]
impl DeficiencyGenerator for IncompleteProfileGenerator {
    fn category(&self) -> NotificationCategory {
        NotificationCategory::IncompleteInformation
    }

    fn describe(&self) -> &'static str {
        "trainees with incomplete profile information"
    }

    async fn generate(
        &self,
        db: &DatabaseConnection,
        tenant_id: Uuid,
    ) -> Result<Vec<Deficiency>, GeneratorError> {
        let trainees = TraineeRepository::new(db).find_active(tenant_id).await?;

        let mut deficiencies = Vec::new();
        for trainee in &trainees {
            let missing = Self::missing_fields(trainee);
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
