//! Operation results and the transport-neutral response built from them.

use serde::Serialize;

use crate::error::ApiError;

/// What a successful operation hands back to the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Json(serde_json::Value),
    Empty,
}

impl Reply {
    /// Encode `value` as the response body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Encoding` if `value` cannot be represented as JSON.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, ApiError> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }
}

/// Status, headers and body ready to be written by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub headers: Vec<(&'static str, &'static str)>,
    pub body: Option<String>,
}

const CORS: (&str, &str) = ("Access-Control-Allow-Origin", "*");
const JSON: (&str, &str) = ("Content-Type", "application/json");

impl HttpReply {
    #[must_use]
    pub fn ok(reply: Reply) -> Self {
        match reply {
            Reply::Json(value) => Self {
                status: 200,
                headers: vec![CORS, JSON],
                body: Some(value.to_string()),
            },
            Reply::Empty => Self::status(200),
        }
    }

    /// Generic failure body. Detail stays in the log.
    #[must_use]
    pub fn error(error: &ApiError) -> Self {
        let status = error.status();
        Self {
            status,
            headers: vec![CORS, JSON],
            body: Some(serde_json::json!({ "error": reason(status) }).to_string()),
        }
    }

    #[must_use]
    pub fn status(status: u16) -> Self {
        Self {
            status,
            headers: vec![CORS],
            body: None,
        }
    }

    /// Answer to a CORS preflight request.
    #[must_use]
    pub fn preflight() -> Self {
        Self {
            status: 204,
            headers: vec![
                CORS,
                ("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS"),
                ("Access-Control-Allow-Headers", "Authorization, Content-Type"),
            ],
            body: None,
        }
    }
}

const fn reason(status: u16) -> &'static str {
    match status {
        400 => "Bad Request",
        401 => "No valid authentication token found",
        403 => "Forbidden",
        404 => "Not Found",
        409 => "Conflict",
        _ => "Internal Server Error",
    }
}
