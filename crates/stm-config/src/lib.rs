//! # stm-config
//!
//! Layered configuration loading using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`STM_*` prefix, `__` as separator)
//! 2. Project-level `./stm.toml`
//! 3. User-level `~/.config/stm/config.toml`
//! 4. Built-in defaults
//!
//! Figment maps `STM_AUTH__TOKEN_SECRET` -> `auth.token_secret`,
//! `STM_SERVER__PORT` -> `server.port`, etc.
//!
//! ```no_run
//! use stm_config::StmConfig;
//!
//! let config = StmConfig::load_with_dotenv().expect("config");
//! println!("listening on {}", config.server.bind_address());
//! ```

mod auth;
mod database;
mod error;
mod server;

pub use auth::AuthConfig;
pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use server::ServerConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const LOCAL_CONFIG_FILE: &str = "stm.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StmConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl StmConfig {
    /// Load configuration from TOML files and environment variables.
    ///
    /// Does NOT read `.env`; use [`Self::load_with_dotenv`] for that.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` if a source cannot be parsed or a value
    /// has the wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration after reading `.env` from the current directory.
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment or add providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("STM_").split("__"))
    }

    /// Fail unless everything needed to serve requests is present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotConfigured` without a token secret and
    /// `ConfigError::InvalidValue` for an unusable database path.
    pub fn validate_for_serving(&self) -> Result<(), ConfigError> {
        if !self.auth.is_configured() {
            return Err(ConfigError::NotConfigured {
                section: "auth".into(),
            });
        }
        if self.database.path.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "database.path".into(),
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("stm").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_loads() {
        let config = StmConfig::default();
        assert!(!config.auth.is_configured());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.path, "stm.db");
    }

    #[test]
    fn serving_requires_secret() {
        let config = StmConfig::default();
        assert!(matches!(
            config.validate_for_serving(),
            Err(ConfigError::NotConfigured { .. })
        ));
    }

    #[test]
    fn serving_rejects_blank_database_path() {
        let mut config = StmConfig::default();
        config.auth.token_secret = "s3cr3t".into();
        config.database.path = " ".into();
        assert!(matches!(
            config.validate_for_serving(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
