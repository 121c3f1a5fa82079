//! Shared fixtures for the integration tests.
//!
//! Sets up in-memory SQLite databases with migrations applied and inserts
//! fixture rows (tenants, trainees, documents, raw notification records)
//! for the integration tests.

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use migration::{Migrator, MigratorTrait};
use notifications::models::notification::{
    self, NotificationCategory, NotificationStatus, SubjectKind,
};
use notifications::models::trainee::{self, TraineeStatus};
use notifications::models::trainee_document;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, Set, Statement};
use uuid::Uuid;

/// Fresh in-memory database with the full schema applied.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;

    Migrator::up(&db, None).await?;

    // SQLite does not enforce our Postgres foreign key semantics; disable FK
    // checks so fixtures can be inserted without the full relation graph.
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "PRAGMA foreign_keys = OFF".to_string(),
    ))
    .await?;

    Ok(db)
}

/// Creates a test tenant, generating an id when none is given.
#[allow(dead_code)]
pub async fn create_test_tenant(
    db: &DatabaseConnection,
    tenant_id: Option<Uuid>,
) -> Result<Uuid> {
    let id = tenant_id.unwrap_or_else(Uuid::new_v4);

    notifications::models::tenant::ActiveModel {
        id: Set(id),
        name: Set("Test Tenant".to_string()),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await?;

    Ok(id)
}

/// Field values for a seeded trainee. The default is an active trainee with
/// nothing filled in, so both deficiency rules fire for it.
#[allow(dead_code)]
pub struct TraineeSeed {
    pub name: &'static str,
    pub email: Option<&'static str>,
    pub phone: Option<&'static str>,
    pub birth_date: Option<NaiveDate>,
    pub address: Option<&'static str>,
    pub iban: Option<&'static str>,
    pub works_with_minors: bool,
    pub status: TraineeStatus,
}

impl Default for TraineeSeed {
    fn default() -> Self {
        Self {
            name: "Maria Santos",
            email: None,
            phone: None,
            birth_date: None,
            address: None,
            iban: None,
            works_with_minors: false,
            status: TraineeStatus::Active,
        }
    }
}

impl TraineeSeed {
    /// A trainee whose profile fields are all filled in, leaving only the
    /// document requirements unmet.
    #[allow(dead_code)]
    pub fn with_complete_profile(name: &'static str) -> Self {
        Self {
            name,
            email: Some("trainee@example.com"),
            phone: Some("+351 912 345 678"),
            birth_date: NaiveDate::from_ymd_opt(1998, 3, 14),
            address: Some("Rua das Flores 1, Porto"),
            ..Self::default()
        }
    }
}

/// Inserts a trainee row and returns its id.
#[allow(dead_code)]
pub async fn insert_trainee(
    db: &DatabaseConnection,
    tenant_id: Uuid,
    seed: TraineeSeed,
) -> Result<Uuid> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    trainee::ActiveModel {
        id: Set(id),
        tenant_id: Set(tenant_id),
        name: Set(seed.name.to_string()),
        email: Set(seed.email.map(str::to_string)),
        phone: Set(seed.phone.map(str::to_string)),
        birth_date: Set(seed.birth_date),
        address: Set(seed.address.map(str::to_string)),
        iban: Set(seed.iban.map(str::to_string)),
        works_with_minors: Set(seed.works_with_minors),
        status: Set(seed.status),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await?;

    Ok(id)
}

/// Inserts an uploaded document row for a trainee.
#[allow(dead_code)]
pub async fn insert_document(
    db: &DatabaseConnection,
    tenant_id: Uuid,
    trainee_id: Uuid,
    kind: &str,
) -> Result<()> {
    trainee_document::ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(tenant_id),
        trainee_id: Set(trainee_id),
        kind: Set(kind.to_string()),
        file_name: Set(format!("{kind}.pdf")),
        uploaded_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await?;

    Ok(())
}

/// Inserts a raw notification record with full control over status, origin,
/// and fingerprint, for seeding legacy and pre-acknowledged shapes.
#[allow(dead_code)]
#[allow(clippy::too_many_arguments)]
pub async fn insert_notification(
    db: &DatabaseConnection,
    tenant_id: Uuid,
    subject_id: Uuid,
    category: NotificationCategory,
    status: NotificationStatus,
    origin: &str,
    fingerprint: Option<&str>,
) -> Result<Uuid> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    notification::ActiveModel {
        id: Set(id),
        tenant_id: Set(tenant_id),
        category: Set(category),
        status: Set(status),
        subject_kind: Set(SubjectKind::Trainee),
        subject_id: Set(subject_id),
        origin: Set(origin.to_string()),
        title: Set("Seeded notification".to_string()),
        body: Set("Seeded body".to_string()),
        fingerprint: Set(fingerprint.map(str::to_string)),
        link: Set(None),
        read_at: Set(None),
        read_by: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await?;

    Ok(id)
}
