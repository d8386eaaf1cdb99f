//! Routing: from method and URL to a [`Call`].
//!
//! Two route tables coexist. `/v1` passes identifiers as query parameters,
//! `/v2` as path segments. Both decode into the same [`Call`] values, so the
//! service contracts behind them are identical.

mod call;
pub mod params;
mod v1;
mod v2;

pub use call::Call;

use params::Query;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Options,
    Other,
}

impl Method {
    #[must_use]
    pub fn parse(method: &str) -> Self {
        match method.to_ascii_uppercase().as_str() {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "DELETE" => Self::Delete,
            "OPTIONS" => Self::Options,
            _ => Self::Other,
        }
    }
}

/// A request as the pipeline sees it, detached from the HTTP server.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    /// Raw query string without the leading `?`.
    pub query: String,
    /// Value of the `Authorization` header.
    pub authorization: Option<String>,
    pub body: String,
}

impl ApiRequest {
    /// Split `url` into path and query.
    #[must_use]
    pub fn new(method: Method, url: &str) -> Self {
        let (path, query) = url.split_once('?').unwrap_or((url, ""));
        Self {
            method,
            path: path.to_string(),
            query: query.to_string(),
            authorization: None,
            body: String::new(),
        }
    }

    #[must_use]
    pub fn with_authorization(mut self, token: impl Into<String>) -> Self {
        self.authorization = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// # Errors
    ///
    /// Returns `ApiError::BadRequest` for invalid percent-encoding.
    pub fn query(&self) -> Result<Query, ApiError> {
        Query::parse(&self.query)
    }

    /// The caller's token: the `Authorization` header, else the `token` query parameter.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        if let Some(header) = self.authorization.as_deref().filter(|h| !h.trim().is_empty()) {
            return Some(header.trim().to_string());
        }
        self.query()
            .ok()?
            .get("token")
            .filter(|t| !t.is_empty() && *t != "null")
            .map(String::from)
    }
}

/// Match `request` against both route tables.
///
/// `None` means no route exists. `Some(Err(_))` means the route exists but its
/// parameters or body could not be decoded.
#[must_use]
pub fn route(request: &ApiRequest) -> Option<Result<Call, ApiError>> {
    let segments: Vec<&str> = request
        .path
        .trim_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();

    match segments.split_first() {
        Some((&"v1", rest)) => v1::route(request, rest),
        Some((&"v2", rest)) => v2::route(request, rest),
        _ => None,
    }
}

/// Every registered route, for the startup log.
pub const ROUTES: &[(&str, &str)] = &[
    ("GET", "/v1/projects"),
    ("POST", "/v1/projects"),
    ("POST", "/v1/projects/users"),
    ("GET", "/v1/tasks"),
    ("POST", "/v1/tasks"),
    ("POST", "/v1/task/assignedUser"),
    ("DELETE", "/v1/task/assignedUser"),
    ("POST", "/v1/task/processPoints"),
    ("GET", "/v2/projects"),
    ("POST", "/v2/projects"),
    ("DELETE", "/v2/projects/{id}"),
    ("GET", "/v2/projects/{id}/tasks"),
    ("POST", "/v2/projects/{id}/users"),
    ("DELETE", "/v2/projects/{id}/users"),
    ("DELETE", "/v2/projects/{id}/users/{user}"),
    ("PUT", "/v2/projects/{id}/name"),
    ("PUT", "/v2/projects/{id}/description"),
    ("POST", "/v2/tasks"),
    ("POST", "/v2/tasks/{id}/assignedUser"),
    ("DELETE", "/v2/tasks/{id}/assignedUser"),
    ("POST", "/v2/tasks/{id}/processPoints"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn header_token_wins_over_query() {
        let request = ApiRequest::new(Method::Get, "/v1/projects?token=fromquery")
            .with_authorization("fromheader");
        assert_eq!(request.token().as_deref(), Some("fromheader"));

        let request = ApiRequest::new(Method::Get, "/v1/projects?token=fromquery");
        assert_eq!(request.token().as_deref(), Some("fromquery"));

        let request = ApiRequest::new(Method::Get, "/v1/projects?token=null");
        assert_eq!(request.token(), None);
    }

    #[test]
    fn unknown_paths_have_no_route() {
        for (method, url) in [
            (Method::Get, "/"),
            (Method::Get, "/projects"),
            (Method::Get, "/v3/projects"),
            (Method::Put, "/v1/projects"),
            (Method::Get, "/v2/projects/1/unknown"),
        ] {
            assert!(route(&ApiRequest::new(method, url)).is_none(), "{url}");
        }
    }

    #[test]
    fn both_revisions_decode_to_the_same_call() {
        let pairs = [
            (
                ApiRequest::new(Method::Post, "/v1/projects/users?user=Carl&project=1"),
                ApiRequest::new(Method::Post, "/v2/projects/1/users?user=Carl"),
            ),
            (
                ApiRequest::new(Method::Delete, "/v1/task/assignedUser?id=5"),
                ApiRequest::new(Method::Delete, "/v2/tasks/5/assignedUser"),
            ),
            (
                ApiRequest::new(Method::Post, "/v1/task/processPoints?id=5&process_points=3"),
                ApiRequest::new(Method::Post, "/v2/tasks/5/processPoints?process_points=3"),
            ),
        ];
        for (v1, v2) in pairs {
            let left = route(&v1).unwrap().unwrap();
            let right = route(&v2).unwrap().unwrap();
            assert_eq!(left, right);
        }
    }

    #[test]
    fn method_names_are_case_insensitive() {
        assert_eq!(Method::parse("get"), Method::Get);
        assert_eq!(Method::parse("DELETE"), Method::Delete);
        assert_eq!(Method::parse("PATCH"), Method::Other);
    }
}
