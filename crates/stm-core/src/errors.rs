//! Cross-cutting error types.
//!
//! Domain services report every rule violation through [`CoreError`]. Storage
//! failures live in `stm-db`; the two meet in `stm_db::error::ServiceError`.

use thiserror::Error;

/// Errors raised by domain rules, independent of the storage backend.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// Input failed validation (range, blank text, malformed value).
    #[error("Validation error: {0}")]
    Validation(String),

    /// The caller is not a member, owner or assignee where one is required.
    #[error("Not authorized: {0}")]
    Authorization(String),

    /// The requested state change collides with the current state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A multi-entity creation was aborted as a whole.
    #[error("Atomicity violation: {0}")]
    Atomicity(String),
}

impl CoreError {
    pub fn not_found(entity_type: &str, id: &str) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }
}
