//! Wire format of the caller-supplied token.
//!
//! A token is `base64(json)` where the JSON object carries the identity, the
//! expiry as unix seconds, and a signature over both.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub valid_until: i64,
    pub user: String,
    pub uid: String,
    /// Base64 HMAC-SHA256 signature, see [`crate::signature`].
    pub secret: String,
}

impl Token {
    /// Decode `base64(json)` into a token. Does not check the signature.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Malformed` for invalid base64 or JSON, and
    /// `AuthError::MissingToken` for an empty string.
    pub fn decode(encoded: &str) -> Result<Self, AuthError> {
        let encoded = encoded.trim();
        if encoded.is_empty() {
            return Err(AuthError::MissingToken);
        }
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| AuthError::Malformed(format!("base64: {e}")))?;
        serde_json::from_slice(&bytes).map_err(|e| AuthError::Malformed(format!("json: {e}")))
    }

    /// Encode as `base64(json)`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Malformed` if serialisation fails.
    pub fn encode(&self) -> Result<String, AuthError> {
        let json =
            serde_json::to_vec(self).map_err(|e| AuthError::Malformed(format!("json: {e}")))?;
        Ok(STANDARD.encode(json))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            Token::decode("%%%not-base64%%%"),
            Err(AuthError::Malformed(_))
        ));
        let not_json = STANDARD.encode("hello");
        assert!(matches!(
            Token::decode(&not_json),
            Err(AuthError::Malformed(_))
        ));
    }

    #[test]
    fn decode_empty_is_missing() {
        assert!(matches!(Token::decode("  "), Err(AuthError::MissingToken)));
    }

    #[test]
    fn decode_reads_wire_field_names() {
        let json = r#"{"valid_until":1700000000,"user":"Peter","uid":"123","secret":"abc"}"#;
        let token = Token::decode(&STANDARD.encode(json)).unwrap();
        assert_eq!(token.user, "Peter");
        assert_eq!(token.uid, "123");
        assert_eq!(token.valid_until, 1_700_000_000);
        assert_eq!(token.secret, "abc");
    }
}
