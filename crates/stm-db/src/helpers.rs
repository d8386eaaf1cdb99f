//! Row parsing and statement building helpers shared by the stores.

use crate::error::DatabaseError;

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and empty string.
///
/// `row.get::<String>(idx)` on a NULL column returns an error, not `""`.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// Read an INTEGER column holding a boolean flag.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_bool(row: &libsql::Row, idx: i32) -> Result<bool, DatabaseError> {
    Ok(row.get::<i64>(idx)? != 0)
}

/// `?1, ?2, ..., ?n` for an `IN (...)` clause.
#[must_use]
pub fn placeholders(count: usize) -> String {
    (1..=count)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Collect string IDs into positional parameters.
#[must_use]
pub fn id_params(ids: &[String]) -> Vec<libsql::Value> {
    ids.iter().map(|id| libsql::Value::from(id.clone())).collect()
}

/// Generate a prefixed ID via libSQL. Returns e.g. `"tsk-a3f8b2c1"`.
///
/// Uses `randomblob(4)` in SQL to produce 8-char hex, then prepends the prefix.
///
/// # Errors
///
/// Returns `DatabaseError` if the query fails or returns no rows.
pub async fn generate_id(conn: &libsql::Connection, prefix: &str) -> Result<String, DatabaseError> {
    let mut rows = conn
        .query("SELECT ?1 || '-' || lower(hex(randomblob(4)))", [prefix])
        .await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    Ok(row.get::<String>(0)?)
}
