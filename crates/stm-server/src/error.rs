//! Request-level error type and its mapping onto HTTP status codes.

use stm_auth::AuthError;
use stm_db::error::{DatabaseError, ErrorKind, ServiceError};
use thiserror::Error;

/// Everything that can end a request without a success response.
///
/// The `Display` text is for the log only. Callers receive the status code
/// and a generic reason phrase.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, malformed, forged or expired token.
    #[error("authentication failed: {0}")]
    Authentication(#[from] AuthError),

    /// Missing or unparsable parameter, malformed body.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// A domain rule or storage operation failed.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The transaction could not be opened or committed.
    #[error("transaction failed: {0}")]
    Transaction(#[from] DatabaseError),

    /// The result could not be encoded.
    #[error("response encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),

    /// The operation panicked; the payload message is kept for the log.
    #[error("operation panicked: {0}")]
    Panic(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::Authentication(_) => 401,
            Self::BadRequest(_) => 400,
            Self::Service(error) => match error.kind() {
                ErrorKind::Validation | ErrorKind::Atomicity => 400,
                ErrorKind::Authorization => 403,
                ErrorKind::NotFound => 404,
                ErrorKind::Conflict => 409,
                ErrorKind::Persistence => 500,
            },
            Self::Transaction(_) | Self::Encoding(_) | Self::Panic(_) => 500,
        }
    }
}

impl From<libsql::Error> for ApiError {
    fn from(error: libsql::Error) -> Self {
        Self::Transaction(DatabaseError::LibSql(error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use stm_core::errors::CoreError;

    #[rstest]
    #[case(CoreError::Validation("x".into()), 400)]
    #[case(CoreError::Atomicity("x".into()), 400)]
    #[case(CoreError::Authorization("x".into()), 403)]
    #[case(CoreError::not_found("task", "1"), 404)]
    #[case(CoreError::Conflict("x".into()), 409)]
    fn service_errors_map_by_kind(#[case] error: CoreError, #[case] status: u16) {
        assert_eq!(ApiError::from(ServiceError::from(error)).status(), status);
    }

    #[test]
    fn pipeline_failures() {
        assert_eq!(ApiError::from(AuthError::MissingToken).status(), 401);
        assert_eq!(ApiError::bad_request("id").status(), 400);
        assert_eq!(ApiError::from(DatabaseError::NoResult).status(), 500);
        assert_eq!(ApiError::Panic("boom".into()).status(), 500);
    }
}
