//! # stm-auth
//!
//! Stateless verification of caller-supplied tokens.
//!
//! A token carries a user identity, an expiry, and an HMAC-SHA256 signature
//! derived from a shared secret. Verification is a pure function of the token,
//! the secret and the current time: no token registry, no global state.
//! Issuing tokens belongs to the login flow; [`issue`] exists for tests and
//! the `stm token` development command.

pub mod error;
pub mod signature;
pub mod token;

use chrono::{DateTime, Utc};
use stm_core::identity::AuthIdentity;

pub use error::AuthError;
pub use token::Token;

/// Verify an encoded token against `secret` at time `now`.
///
/// # Errors
///
/// Returns `AuthError` if the token is missing, malformed, carries a wrong
/// signature, or has expired.
pub fn verify(encoded: &str, secret: &str, now: DateTime<Utc>) -> Result<AuthIdentity, AuthError> {
    let token = Token::decode(encoded)?;

    signature::verify(
        &token.user,
        &token.uid,
        token.valid_until,
        &token.secret,
        secret,
    )?;

    if token.valid_until < now.timestamp() {
        return Err(AuthError::Expired {
            valid_until: token.valid_until,
        });
    }

    tracing::debug!(user = %token.user, "token valid");

    Ok(AuthIdentity {
        user: token.user,
        uid: token.uid,
    })
}

/// Mint an encoded token for `user` valid for `lifetime_secs` after `now`.
///
/// # Errors
///
/// Returns `AuthError::SecretNotConfigured` for an empty secret and
/// `AuthError::LifetimeOutOfRange` when the expiry does not fit a timestamp.
pub fn issue(
    user: &str,
    uid: &str,
    lifetime_secs: i64,
    secret: &str,
    now: DateTime<Utc>,
) -> Result<String, AuthError> {
    let valid_until = now
        .timestamp()
        .checked_add(lifetime_secs)
        .ok_or(AuthError::LifetimeOutOfRange(lifetime_secs))?;
    let token = Token {
        valid_until,
        user: user.to_string(),
        uid: uid.to_string(),
        secret: signature::sign(user, uid, valid_until, secret)?,
    };
    token.encode()
}
