//! Token verification configuration.

use serde::{Deserialize, Serialize};

const fn default_token_lifetime_secs() -> i64 {
    24 * 60 * 60
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Shared secret the token signature is derived from.
    #[serde(default)]
    pub token_secret: String,

    /// Lifetime of tokens minted by `stm token`, in seconds.
    #[serde(default = "default_token_lifetime_secs")]
    pub token_lifetime_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: String::new(),
            token_lifetime_secs: default_token_lifetime_secs(),
        }
    }
}

impl AuthConfig {
    /// Check if a token secret is available.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.token_secret.is_empty()
    }
}
