//! Error types for fieldsync-core

use rusqlite::ErrorCode;
use thiserror::Error;

use crate::handler::EntityFailure;

/// Result type alias using fieldsync-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in fieldsync-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// A required field was missing; raised before any statement runs
    #[error("Validation error: `{field}` is required for {table}")]
    Validation {
        table: &'static str,
        field: &'static str,
    },

    /// Foreign-key or uniqueness violation reported by the storage engine
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// A single-use task was executed a second time
    #[error("Task already executed")]
    AlreadyExecuted,

    /// The requested operation is not supported
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(&'static str),

    /// Caller passed an argument the store cannot use
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// SQLite error other than a constraint violation
    #[error("SQLite error: {0}")]
    Sqlite(#[source] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP transport error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with an unexpected status
    #[error("Server error: {0}")]
    Transport(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A dispatched task panicked or was aborted before delivering its outcome
    #[error("Task failed: {0}")]
    TaskFailed(String),

    /// An atomic pass recorded entity failures and was rolled back
    #[error("Reconciliation rolled back after {} entity failure(s)", failures.len())]
    RolledBack { failures: Vec<EntityFailure> },
}

impl Error {
    /// Whether the error belongs to a single entity and must not halt its siblings.
    pub const fn is_entity_scoped(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::Constraint(_))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(error: rusqlite::Error) -> Self {
        match error {
            rusqlite::Error::SqliteFailure(failure, message)
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                Self::Constraint(message.unwrap_or_else(|| failure.to_string()))
            }
            other => Self::Sqlite(other),
        }
    }
}
