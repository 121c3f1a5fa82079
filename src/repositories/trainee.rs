//! # Trainee Repository
//!
//! Read-side queries over trainees for the deficiency generators. Subject
//! inspection is batched: one query loads every active trainee of a tenant
//! together with its uploaded documents, never one query per trainee.

use crate::error::RepositoryError;
use crate::models::trainee::{Entity as Trainee, Model as TraineeModel, TraineeStatus};
use crate::models::trainee_document::{Entity as TraineeDocument, Model as TraineeDocumentModel};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

/// Read access to trainees and their uploaded documents.
pub struct TraineeRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> TraineeRepository<'a> {
    /// Borrows the connection for the lifetime of the repository.
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// All active trainees of a tenant, ordered by id for stable iteration
    pub async fn find_active(&self, tenant_id: Uuid) -> Result<Vec<TraineeModel>, RepositoryError> {
        Trainee::find()
            .filter(crate::models::trainee::Column::TenantId.eq(tenant_id))
            .filter(crate::models::trainee::Column::Status.eq(TraineeStatus::Active))
            .order_by_asc(crate::models::trainee::Column::Id)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// All active trainees of a tenant with their uploaded documents, in a
    /// single batched relation query
    pub async fn find_active_with_documents(
        &self,
        tenant_id: Uuid,
    ) -> Result<Vec<(TraineeModel, Vec<TraineeDocumentModel>)>, RepositoryError> {
        Trainee::find()
            .filter(crate::models::trainee::Column::TenantId.eq(tenant_id))
            .filter(crate::models::trainee::Column::Status.eq(TraineeStatus::Active))
            .find_with_related(TraineeDocument)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }
}
