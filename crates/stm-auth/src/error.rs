use thiserror::Error;

/// Reasons a token is rejected.
///
/// The detail is for server-side logs only; callers get a bare 401.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no token supplied")]
    MissingToken,

    #[error("token malformed: {0}")]
    Malformed(String),

    #[error("token signature does not match")]
    InvalidSignature,

    #[error("token expired at {valid_until}")]
    Expired { valid_until: i64 },

    #[error("token secret not configured")]
    SecretNotConfigured,

    #[error("token lifetime of {0}s is out of range")]
    LifetimeOutOfRange(i64),
}
