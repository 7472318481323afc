use diesel::result::Error as DieselError;
use thiserror::Error;

/// Custom error type for goal-related operations
#[derive(Debug, Error)]
pub enum GoalError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Failed to parse goal definition: {0}")]
    ParseError(String),
}

impl From<DieselError> for GoalError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => GoalError::NotFound("Record not found".to_string()),
            _ => GoalError::DatabaseError(err.to_string()),
        }
    }
}

/// Result type for goal operations
pub type Result<T> = std::result::Result<T, GoalError>;
