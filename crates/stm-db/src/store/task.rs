//! Task storage: CRUD, compare-and-swap assignment, batch delete.

use stm_core::entities::{NewTask, Task};
use stm_core::ids::PREFIX_TASK;

use crate::error::{DatabaseError, ServiceError};
use crate::helpers::{generate_id, get_opt_string, id_params, placeholders};

const SELECT_COLS: &str = "id, process_points, max_process_points, geometry, assigned_user";

fn row_to_task(row: &libsql::Row) -> Result<Task, DatabaseError> {
    Ok(Task {
        id: row.get(0)?,
        process_points: row.get(1)?,
        max_process_points: row.get(2)?,
        geometry: row.get(3)?,
        assigned_user: get_opt_string(row, 4)?,
    })
}

pub struct TaskStore<'a> {
    conn: &'a libsql::Connection,
}

impl<'a> TaskStore<'a> {
    #[must_use]
    pub const fn new(conn: &'a libsql::Connection) -> Self {
        Self { conn }
    }

    pub async fn get_task(&self, id: &str) -> Result<Task, ServiceError> {
        let mut rows = self
            .conn
            .query(&format!("SELECT {SELECT_COLS} FROM tasks WHERE id = ?1"), [id])
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| ServiceError::not_found("task", id))?;
        Ok(row_to_task(&row)?)
    }

    /// Fetch tasks in the order of `ids`. Fails on the first unknown ID.
    pub async fn get_tasks(&self, ids: &[String]) -> Result<Vec<Task>, ServiceError> {
        let mut tasks = Vec::with_capacity(ids.len());
        for id in ids {
            tasks.push(self.get_task(id).await?);
        }
        Ok(tasks)
    }

    /// IDs out of `ids` that have no task row.
    pub async fn missing_ids(&self, ids: &[String]) -> Result<Vec<String>, ServiceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut rows = self
            .conn
            .query(
                &format!(
                    "SELECT id FROM tasks WHERE id IN ({})",
                    placeholders(ids.len())
                ),
                libsql::params_from_iter(id_params(ids)),
            )
            .await?;
        let mut existing = Vec::new();
        while let Some(row) = rows.next().await? {
            existing.push(row.get::<String>(0)?);
        }
        Ok(ids
            .iter()
            .filter(|id| !existing.contains(id))
            .cloned()
            .collect())
    }

    pub async fn add_task(&self, task: &NewTask) -> Result<Task, ServiceError> {
        let task = Task {
            id: generate_id(self.conn, PREFIX_TASK).await?,
            process_points: task.process_points,
            max_process_points: task.max_process_points,
            geometry: task.geometry.clone(),
            assigned_user: None,
        };
        self.insert_task(&task).await?;
        Ok(task)
    }

    /// Insert a fully formed task, ID and assignee included (fixtures and imports).
    pub async fn insert_task(&self, task: &Task) -> Result<(), ServiceError> {
        self.conn
            .execute(
                &format!("INSERT INTO tasks ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
                libsql::params![
                    task.id.as_str(),
                    task.process_points,
                    task.max_process_points,
                    task.geometry.as_str(),
                    task.assigned_user.as_deref()
                ],
            )
            .await?;
        Ok(())
    }

    /// Set the assignee only if the task is currently unassigned.
    ///
    /// Returns `false` when another user already holds the task, so a
    /// concurrent assignment can never overwrite an existing one.
    pub async fn assign_user(&self, id: &str, user: &str) -> Result<bool, ServiceError> {
        let changed = self
            .conn
            .execute(
                "UPDATE tasks SET assigned_user = ?1 WHERE id = ?2 AND assigned_user IS NULL",
                libsql::params![user, id],
            )
            .await?;
        Ok(changed == 1)
    }

    pub async fn unassign_user(&self, id: &str) -> Result<(), ServiceError> {
        self.conn
            .execute("UPDATE tasks SET assigned_user = NULL WHERE id = ?1", [id])
            .await?;
        Ok(())
    }

    pub async fn set_process_points(&self, id: &str, points: i64) -> Result<(), ServiceError> {
        self.conn
            .execute(
                "UPDATE tasks SET process_points = ?1 WHERE id = ?2",
                libsql::params![points, id],
            )
            .await?;
        Ok(())
    }

    /// IDs out of `ids` currently assigned to `user`.
    pub async fn assigned_to(
        &self,
        ids: &[String],
        user: &str,
    ) -> Result<Vec<String>, ServiceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut params = id_params(ids);
        params.push(user.into());
        let mut rows = self
            .conn
            .query(
                &format!(
                    "SELECT id FROM tasks WHERE id IN ({}) AND assigned_user = ?{}",
                    placeholders(ids.len()),
                    ids.len() + 1
                ),
                libsql::params_from_iter(params),
            )
            .await?;
        let mut assigned = Vec::new();
        while let Some(row) = rows.next().await? {
            assigned.push(row.get::<String>(0)?);
        }
        Ok(assigned)
    }

    pub async fn delete(&self, ids: &[String]) -> Result<(), ServiceError> {
        if ids.is_empty() {
            return Ok(());
        }
        self.conn
            .execute(
                &format!("DELETE FROM tasks WHERE id IN ({})", placeholders(ids.len())),
                libsql::params_from_iter(id_params(ids)),
            )
            .await?;
        Ok(())
    }
}
