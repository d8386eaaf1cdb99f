//! HMAC-SHA256 signature over a token's identity and expiry.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::AuthError;

type HmacSha256 = Hmac<Sha256>;

fn mac(user: &str, uid: &str, valid_until: i64, key: &str) -> Result<HmacSha256, AuthError> {
    if key.is_empty() {
        return Err(AuthError::SecretNotConfigured);
    }
    let mut mac = HmacSha256::new_from_slice(key.as_bytes())
        .map_err(|e| AuthError::Malformed(format!("hmac key: {e}")))?;
    // Newline separators keep ("ab", "c") and ("a", "bc") apart.
    mac.update(user.as_bytes());
    mac.update(b"\n");
    mac.update(uid.as_bytes());
    mac.update(b"\n");
    mac.update(valid_until.to_string().as_bytes());
    Ok(mac)
}

/// Compute the base64 signature for the given identity and expiry.
///
/// # Errors
///
/// Returns `AuthError::SecretNotConfigured` for an empty key.
pub fn sign(user: &str, uid: &str, valid_until: i64, key: &str) -> Result<String, AuthError> {
    let tag = mac(user, uid, valid_until, key)?.finalize().into_bytes();
    Ok(STANDARD.encode(tag))
}

/// Constant-time check of `signature` against the expected one.
///
/// # Errors
///
/// Returns `AuthError::InvalidSignature` on mismatch or undecodable input.
pub fn verify(
    user: &str,
    uid: &str,
    valid_until: i64,
    signature: &str,
    key: &str,
) -> Result<(), AuthError> {
    let provided = STANDARD
        .decode(signature)
        .map_err(|_| AuthError::InvalidSignature)?;
    mac(user, uid, valid_until, key)?
        .verify_slice(&provided)
        .map_err(|_| AuthError::InvalidSignature)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_is_deterministic() {
        let a = sign("Peter", "1", 100, "key").unwrap();
        let b = sign("Peter", "1", 100, "key").unwrap();
        assert_eq!(a, b);
        assert!(verify("Peter", "1", 100, &a, "key").is_ok());
    }

    #[test]
    fn field_boundaries_matter() {
        let a = sign("ab", "c", 1, "key").unwrap();
        assert!(verify("a", "bc", 1, &a, "key").is_err());
    }

    #[test]
    fn empty_key_is_refused() {
        assert!(matches!(
            sign("Peter", "1", 100, ""),
            Err(AuthError::SecretNotConfigured)
        ));
    }
}
