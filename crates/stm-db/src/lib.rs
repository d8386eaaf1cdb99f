//! # stm-db
//!
//! libSQL storage and the transaction-bound domain services.
//!
//! Every request works inside exactly one [`libsql::Transaction`] obtained from
//! [`StmDb::begin`]. The three services are built fresh per request, each
//! borrowing that transaction:
//!
//! ```text
//! PermissionService ← TaskService ← ProjectService
//! ```
//!
//! Cross-entity side effects (unassigning a removed member, deleting a
//! project's tasks) are explicit calls from `ProjectService` into
//! `TaskService` within the same transaction.

pub mod error;
pub mod fixtures;
pub mod helpers;
mod migrations;
pub mod services;
pub mod store;

use std::time::Duration;

use error::DatabaseError;
use libsql::{Builder, TransactionBehavior};

const IN_MEMORY: &str = ":memory:";

/// Central database handle.
///
/// Holds the libSQL database plus one primary connection used for migrations
/// and, for in-memory databases, for every transaction.
pub struct StmDb {
    db: libsql::Database,
    conn: libsql::Connection,
    in_memory: bool,
    busy_timeout: Duration,
}

impl StmDb {
    /// Open a local database at the given path.
    ///
    /// Runs migrations automatically on open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str, busy_timeout: Duration) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;
        Self::configure(&conn, busy_timeout).await?;

        let stm_db = Self {
            db,
            conn,
            in_memory: path == IN_MEMORY,
            busy_timeout,
        };
        stm_db.run_migrations().await?;
        tracing::debug!(path, "database opened");
        Ok(stm_db)
    }

    /// Open a private in-memory database (tests, throwaway runs).
    ///
    /// # Errors
    ///
    /// See [`Self::open_local`].
    pub async fn open_in_memory() -> Result<Self, DatabaseError> {
        Self::open_local(IN_MEMORY, Duration::from_secs(5)).await
    }

    /// Access the primary connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Begin a request-scoped write transaction.
    ///
    /// File-backed databases get a fresh connection per transaction so that
    /// concurrent requests each own theirs. The transaction is `IMMEDIATE`:
    /// it takes the write lock up front, so a second request serialises
    /// behind it (up to the busy timeout) instead of interleaving its
    /// read-then-write checks with ours.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if no connection can be opened or the lock
    /// cannot be acquired within the busy timeout.
    pub async fn begin(&self) -> Result<libsql::Transaction, DatabaseError> {
        let conn = if self.in_memory {
            self.conn.clone()
        } else {
            let conn = self.db.connect()?;
            Self::configure(&conn, self.busy_timeout).await?;
            conn
        };
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .await?;
        Ok(tx)
    }

    async fn configure(conn: &libsql::Connection, busy_timeout: Duration) -> Result<(), DatabaseError> {
        // Foreign keys must be enabled per connection in SQLite.
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;
        conn.busy_timeout(busy_timeout)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use crate::helpers::generate_id;

    #[tokio::test]
    async fn open_creates_schema() {
        let db = StmDb::open_in_memory().await.unwrap();

        for table in ["projects", "project_users", "project_tasks", "tasks"] {
            let mut rows = db
                .conn()
                .query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                )
                .await
                .unwrap();
            assert!(
                rows.next().await.unwrap().is_some(),
                "table '{table}' should exist"
            );
        }
    }

    #[tokio::test]
    async fn idempotent_migrations() {
        let db = StmDb::open_in_memory().await.unwrap();
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn generate_id_format_and_uniqueness() {
        let db = StmDb::open_in_memory().await.unwrap();
        let mut ids = HashSet::new();
        for prefix in stm_core::ids::ALL_PREFIXES {
            for _ in 0..50 {
                let id = generate_id(db.conn(), prefix).await.unwrap();
                assert!(id.starts_with(&format!("{prefix}-")));
                assert_eq!(id.len(), 12, "3 prefix + 1 dash + 8 hex: {id}");
                assert!(ids.insert(id.clone()), "duplicate id {id}");
            }
        }
    }

    #[tokio::test]
    async fn check_constraints_guard_process_points() {
        let db = StmDb::open_in_memory().await.unwrap();
        let over = db
            .conn()
            .execute(
                "INSERT INTO tasks (id, process_points, max_process_points) VALUES ('x', 11, 10)",
                (),
            )
            .await;
        assert!(over.is_err());

        let zero_max = db
            .conn()
            .execute(
                "INSERT INTO tasks (id, process_points, max_process_points) VALUES ('y', 0, 0)",
                (),
            )
            .await;
        assert!(zero_max.is_err());
    }

    #[tokio::test]
    async fn rollback_discards_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rollback.db");
        let db = StmDb::open_local(path.to_str().unwrap(), Duration::from_secs(1))
            .await
            .unwrap();

        let tx = db.begin().await.unwrap();
        tx.execute(
            "INSERT INTO tasks (id, process_points, max_process_points) VALUES ('t', 0, 1)",
            (),
        )
        .await
        .unwrap();
        tx.rollback().await.unwrap();

        let mut rows = db
            .conn()
            .query("SELECT COUNT(*) FROM tasks", ())
            .await
            .unwrap();
        let count: i64 = rows.next().await.unwrap().unwrap().get(0).unwrap();
        assert_eq!(count, 0);
    }
}
