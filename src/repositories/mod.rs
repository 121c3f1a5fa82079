//! Data access layer. Each repository borrows a connection and keeps every
//! query scoped to one tenant.

pub mod notification;
pub mod tenant;
pub mod trainee;

pub use notification::{NewNotification, NotificationCounts, NotificationRepository};
pub use tenant::TenantRepository;
pub use trainee::TraineeRepository;
