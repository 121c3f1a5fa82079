//! Schema migrations for the Traineo notifications service, applied in
//! timestamp order by [`Migrator`].

pub use sea_orm_migration::prelude::*;

mod m2026_05_10_090000_create_tenants;
mod m2026_05_10_091000_create_trainees;
mod m2026_05_10_092000_create_trainee_documents;
mod m2026_05_12_100000_create_notifications;
mod m2026_05_12_101500_add_notification_unread_guard;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2026_05_10_090000_create_tenants::Migration),
            Box::new(m2026_05_10_091000_create_trainees::Migration),
            Box::new(m2026_05_10_092000_create_trainee_documents::Migration),
            Box::new(m2026_05_12_100000_create_notifications::Migration),
            Box::new(m2026_05_12_101500_add_notification_unread_guard::Migration),
        ]
    }
}
