//! Error types for the coach library.

use std::path::PathBuf;

use thiserror::Error;

use crate::llm::ApiError;

/// Comprehensive error type for all coach operations.
#[derive(Error, Debug)]
pub enum CoachError {
    /// Plan, task or input shape validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    Validation { field: String, reason: String },
    /// The user's plan is already finished
    #[error("Plan is already complete")]
    AlreadyComplete,
    /// Operation rejected because its precondition does not hold
    #[error("Precondition failed: {reason}")]
    Precondition { reason: String },
    /// A reminder action arrived after the current task had already advanced
    #[error("Nothing is due right now")]
    NothingDue,
    /// User has no generated plan yet
    #[error("User {user_id} has no plan")]
    NoPlan { user_id: u64 },
    /// User not found for the given ID
    #[error("User with ID {id} not found")]
    UserNotFound { id: u64 },
    /// Database connection or query errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
    /// The LLM could not produce a usable plan
    #[error("Plan generation failed: {0}")]
    PlanGeneration(#[from] ApiError),
    /// An interview or question-mode request to the LLM failed
    #[error("Assistant request failed: {0}")]
    Assistant(#[source] ApiError),
}

/// Builder for creating database errors with optional context.
pub struct DatabaseErrorBuilder {
    message: String,
}

impl DatabaseErrorBuilder {
    /// Create a new database error builder with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build the error with the given source.
    pub fn with_source(self, source: rusqlite::Error) -> CoachError {
        CoachError::Database {
            message: self.message,
            source,
        }
    }
}

/// Builder for creating validation errors.
pub struct ValidationBuilder {
    field: String,
}

impl ValidationBuilder {
    /// Create a new validation error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> CoachError {
        CoachError::Validation {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl CoachError {
    /// Creates a builder for database errors.
    pub fn database(message: impl Into<String>) -> DatabaseErrorBuilder {
        DatabaseErrorBuilder::new(message)
    }

    /// Creates a builder for validation errors.
    pub fn validation(field: impl Into<String>) -> ValidationBuilder {
        ValidationBuilder::new(field)
    }

    /// Creates a precondition error.
    pub fn precondition(reason: impl Into<String>) -> Self {
        CoachError::Precondition {
            reason: reason.into(),
        }
    }

    /// Whether the error describes a user-facing state conflict rather than
    /// an infrastructure failure.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            CoachError::Validation { .. }
                | CoachError::AlreadyComplete
                | CoachError::Precondition { .. }
                | CoachError::NothingDue
                | CoachError::NoPlan { .. }
        )
    }
}

/// Specialized extension trait for database-related Results.
pub trait DatabaseResultExt<T> {
    /// Map database errors with a message.
    fn db_context(self, message: &str) -> Result<T>;
}

impl<T> DatabaseResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T> {
        self.map_err(|e| CoachError::database(message).with_source(e))
    }
}

/// Maps a failed blocking task join into a configuration error.
pub(crate) fn join_error(e: tokio::task::JoinError) -> CoachError {
    CoachError::Configuration {
        message: format!("Task join error: {e}"),
    }
}

/// Result type alias for coach operations
pub type Result<T> = std::result::Result<T, CoachError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_builder_message() {
        let err = CoachError::validation("reminder_hour").with_reason("must be between 0 and 23");
        assert_eq!(
            err.to_string(),
            "Invalid input for field 'reminder_hour': must be between 0 and 23"
        );
        assert!(err.is_user_facing());
    }

    #[test]
    fn test_database_error_is_not_user_facing() {
        let err = CoachError::database("Failed to open").with_source(rusqlite::Error::InvalidQuery);
        assert!(!err.is_user_facing());
        assert!(err.to_string().starts_with("Database error: Failed to open"));
    }
}
