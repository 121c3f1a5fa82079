//! Data access for tenant rows. The notifications service does not manage
//! tenants beyond reading them; creation exists for seeding and tests.

use crate::error::RepositoryError;
use crate::models::tenant::{
    ActiveModel as TenantActiveModel, Entity as Tenant, Model as TenantModel,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

/// Data access for tenant rows.
pub struct TenantRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> TenantRepository<'a> {
    /// Borrows the connection for the lifetime of the repository.
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts a tenant. Seeding and tests go through here.
    pub async fn create_tenant(&self, name: String) -> Result<TenantModel, RepositoryError> {
        if name.trim().is_empty() {
            return Err(RepositoryError::validation_error(
                "Tenant name cannot be empty",
            ));
        }

        let tenant = TenantActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            created_at: Set(Utc::now().into()),
        };

        tenant
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Looks up one tenant.
    pub async fn get_tenant_by_id(
        &self,
        tenant_id: Uuid,
    ) -> Result<Option<TenantModel>, RepositoryError> {
        Tenant::find_by_id(tenant_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Every tenant. The scheduler iterates this on each tick.
    pub async fn list_tenants(&self) -> Result<Vec<TenantModel>, RepositoryError> {
        Tenant::find()
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::MigratorTrait;
    use sea_orm::{ConnectionTrait, Database, Statement};

    async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        db.execute(Statement::from_string(
            db.get_database_backend(),
            "PRAGMA foreign_keys = OFF".to_string(),
        ))
        .await
        .unwrap();
        db
    }

    #[tokio::test]
    async fn create_and_fetch_tenant() {
        let db = setup_test_db().await;
        let repo = TenantRepository::new(&db);

        let created = repo.create_tenant("Formação Norte".to_string()).await.unwrap();
        assert_eq!(created.name, "Formação Norte");

        let fetched = repo.get_tenant_by_id(created.id).await.unwrap();
        assert_eq!(fetched.map(|t| t.id), Some(created.id));

        let missing = repo.get_tenant_by_id(Uuid::new_v4()).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn empty_name_is_rejected() {
        let db = setup_test_db().await;
        let repo = TenantRepository::new(&db);

        let result = repo.create_tenant("   ".to_string()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn list_returns_all_tenants() {
        let db = setup_test_db().await;
        let repo = TenantRepository::new(&db);

        assert!(repo.list_tenants().await.unwrap().is_empty());

        repo.create_tenant("One".to_string()).await.unwrap();
        repo.create_tenant("Two".to_string()).await.unwrap();

        assert_eq!(repo.list_tenants().await.unwrap().len(), 2);
    }
}
