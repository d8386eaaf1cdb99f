use serde::{Deserialize, Serialize};

/// Authenticated caller identity.
///
/// Produced by `stm-auth` after a token passed verification, consumed by the
/// request pipeline. Carries no auth logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthIdentity {
    /// Display name used for membership, ownership and assignment checks.
    pub user: String,
    /// Identifier of the account at the login provider.
    pub uid: String,
}
