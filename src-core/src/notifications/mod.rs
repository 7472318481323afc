// Module declarations
pub(crate) mod notifications_errors;
pub(crate) mod notifications_model;
pub(crate) mod notifications_repository;

// Re-export the public interface
pub use notifications_model::{
    NewNotificationSettingsDb, NotificationSettings, NotificationSettingsDb, ReminderFrequency,
};
pub use notifications_repository::NotificationRepository;

// Re-export error types for convenience
pub use notifications_errors::{NotificationError, Result};
