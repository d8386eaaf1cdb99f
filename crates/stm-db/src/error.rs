//! Database and service error types for stm-db.

use stm_core::errors::CoreError;
use thiserror::Error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Invalid state encountered (e.g., bad data in DB).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),
}

/// Coarse classification of a [`ServiceError`], used to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Authorization,
    Conflict,
    NotFound,
    Atomicity,
    Persistence,
}

/// Error returned by every domain service operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<libsql::Error> for ServiceError {
    fn from(error: libsql::Error) -> Self {
        Self::Database(DatabaseError::LibSql(error))
    }
}

impl ServiceError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Core(CoreError::Validation(_)) => ErrorKind::Validation,
            Self::Core(CoreError::Authorization(_)) => ErrorKind::Authorization,
            Self::Core(CoreError::Conflict(_)) => ErrorKind::Conflict,
            Self::Core(CoreError::NotFound { .. }) => ErrorKind::NotFound,
            Self::Core(CoreError::Atomicity(_)) => ErrorKind::Atomicity,
            Self::Database(_) => ErrorKind::Persistence,
        }
    }

    pub(crate) fn not_found(entity_type: &str, id: &str) -> Self {
        Self::Core(CoreError::not_found(entity_type, id))
    }

    pub(crate) fn unauthorized(message: impl Into<String>) -> Self {
        Self::Core(CoreError::Authorization(message.into()))
    }

    pub(crate) fn conflict(message: impl Into<String>) -> Self {
        Self::Core(CoreError::Conflict(message.into()))
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Core(CoreError::Validation(message.into()))
    }
}
