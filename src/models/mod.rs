//! SeaORM entities and shared response types.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod notification;
pub mod tenant;
pub mod trainee;
pub mod trainee_document;

pub use notification::Entity as Notification;
pub use tenant::Entity as Tenant;
pub use trainee::Entity as Trainee;
pub use trainee_document::Entity as TraineeDocument;

/// What the root endpoint reports about the running service.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    pub service: String,
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "traineo-notifications".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
