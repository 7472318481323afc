use diesel::result::Error as DieselError;
use thiserror::Error;

/// Custom error type for notification-settings operations
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<DieselError> for NotificationError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => NotificationError::NotFound("Record not found".to_string()),
            _ => NotificationError::DatabaseError(err.to_string()),
        }
    }
}

/// Result type for notification operations
pub type Result<T> = std::result::Result<T, NotificationError>;
