//! libSQL database configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_path() -> String {
    "stm.db".to_string()
}

const fn default_busy_timeout_ms() -> u64 {
    5000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Database file path, or `:memory:` for a throwaway database.
    #[serde(default = "default_path")]
    pub path: String,

    /// How long a write transaction waits for a concurrent writer, in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl DatabaseConfig {
    #[must_use]
    pub const fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Whether the database lives only as long as the process.
    ///
    /// An in-memory database has a single connection, so overlapping
    /// requests fail to open their transaction instead of waiting.
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.path == ":memory:"
    }
}
