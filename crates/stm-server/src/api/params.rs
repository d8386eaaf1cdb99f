//! Query strings and request bodies.

use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Decoded `key=value` pairs of a query string, in order of appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query(Vec<(String, String)>);

impl Query {
    /// Parse the part of a URL after `?`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::BadRequest` for invalid percent-encoding.
    pub fn parse(raw: &str) -> Result<Self, ApiError> {
        let mut pairs = Vec::new();
        for pair in raw.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            pairs.push((decode(key)?, decode(value)?));
        }
        Ok(Self(pairs))
    }

    /// First value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Non-empty value for `key`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::BadRequest` if the parameter is missing or empty.
    pub fn require(&self, key: &str) -> Result<String, ApiError> {
        match self.get(key) {
            Some(value) if !value.trim().is_empty() => Ok(value.to_string()),
            _ => Err(ApiError::bad_request(format!(
                "url parameter '{key}' not set"
            ))),
        }
    }

    /// Integer value for `key`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::BadRequest` if the parameter is missing or not an integer.
    pub fn require_i64(&self, key: &str) -> Result<i64, ApiError> {
        let value = self.require(key)?;
        value.trim().parse().map_err(|e| {
            ApiError::bad_request(format!("url parameter '{key}' is not an integer: {e}"))
        })
    }

    /// Comma separated list for `key`, empty entries dropped.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::BadRequest` if the parameter is missing or lists nothing.
    pub fn require_list(&self, key: &str) -> Result<Vec<String>, ApiError> {
        let list: Vec<String> = self
            .require(key)?
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(String::from)
            .collect();
        if list.is_empty() {
            return Err(ApiError::bad_request(format!(
                "url parameter '{key}' lists no values"
            )));
        }
        Ok(list)
    }
}

fn decode(raw: &str) -> Result<String, ApiError> {
    let raw = raw.replace('+', " ");
    urlencoding::decode(&raw)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| ApiError::bad_request(format!("URL decode: {e}")))
}

/// Deserialize a JSON request body.
///
/// # Errors
///
/// Returns `ApiError::BadRequest` if `body` is not valid JSON for `T`.
pub fn json_body<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::bad_request(format!("invalid body: {e}")))
}

/// A plain text body that must not be blank.
///
/// # Errors
///
/// Returns `ApiError::BadRequest` for a blank body.
pub fn text_body(body: &str) -> Result<String, ApiError> {
    if body.trim().is_empty() {
        return Err(ApiError::bad_request("request body is empty"));
    }
    Ok(body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_and_decodes() {
        let query = Query::parse("user=Anna%20Lena&project=2&empty=&flag").unwrap();
        assert_eq!(query.get("user"), Some("Anna Lena"));
        assert_eq!(query.require("project").unwrap(), "2");
        assert_eq!(query.get("flag"), Some(""));
        assert!(query.require("empty").is_err());
        assert!(query.require("missing").is_err());
    }

    #[test]
    fn integer_and_list_parameters() {
        let query = Query::parse("process_points=42&bad=4x&task_ids=1,%202,,3").unwrap();
        assert_eq!(query.require_i64("process_points").unwrap(), 42);
        assert!(query.require_i64("bad").is_err());
        assert_eq!(query.require_list("task_ids").unwrap(), vec!["1", "2", "3"]);

        let only_commas = Query::parse("task_ids=,,").unwrap();
        assert!(only_commas.require_list("task_ids").is_err());
    }

    #[test]
    fn bodies() {
        let ids: Vec<String> = json_body(r#"["1","2"]"#).unwrap();
        assert_eq!(ids, vec!["1", "2"]);
        assert!(json_body::<Vec<String>>("{").is_err());
        assert!(text_body(" \n").is_err());
        assert_eq!(text_body("foo\nbar").unwrap(), "foo\nbar");
    }
}
