//! Project storage: projects plus their ordered member and task lists.

use stm_core::entities::Project;
use stm_core::ids::PREFIX_PROJECT;

use crate::error::{DatabaseError, ServiceError};
use crate::helpers::{generate_id, get_bool, id_params, placeholders};

const SELECT_COLS: &str = "id, name, description, owner, needs_assignment";

/// Values for a project row about to be inserted.
pub struct NewProject<'d> {
    pub name: &'d str,
    pub description: &'d str,
    pub owner: &'d str,
    pub users: &'d [String],
    pub task_ids: &'d [String],
    pub needs_assignment: bool,
}

pub struct ProjectStore<'a> {
    conn: &'a libsql::Connection,
}

impl<'a> ProjectStore<'a> {
    #[must_use]
    pub const fn new(conn: &'a libsql::Connection) -> Self {
        Self { conn }
    }

    /// Load a project with members, task IDs and derived process point totals.
    pub async fn get_project(&self, id: &str) -> Result<Project, ServiceError> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT {SELECT_COLS} FROM projects WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| ServiceError::not_found("project", id))?;

        let id: String = row.get(0)?;
        let users = self.list_column("project_users", "user_id", &id).await?;
        let task_ids = self.list_column("project_tasks", "task_id", &id).await?;
        let (total_process_points, done_process_points) = self.process_points(&id).await?;

        Ok(Project {
            name: row.get(1)?,
            description: row.get(2)?,
            owner: row.get(3)?,
            needs_assignment: get_bool(&row, 4)?,
            id,
            users,
            task_ids,
            total_process_points,
            done_process_points,
        })
    }

    /// The project's owner. Fails with NotFound for unknown projects.
    pub async fn owner(&self, id: &str) -> Result<String, ServiceError> {
        let mut rows = self
            .conn
            .query("SELECT owner FROM projects WHERE id = ?1", [id])
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| ServiceError::not_found("project", id))?;
        Ok(row.get::<String>(0)?)
    }

    pub async fn needs_assignment(&self, id: &str) -> Result<bool, ServiceError> {
        let mut rows = self
            .conn
            .query("SELECT needs_assignment FROM projects WHERE id = ?1", [id])
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| ServiceError::not_found("project", id))?;
        Ok(get_bool(&row, 0)?)
    }

    pub async fn is_member(&self, project_id: &str, user: &str) -> Result<bool, ServiceError> {
        let mut rows = self
            .conn
            .query(
                "SELECT 1 FROM project_users WHERE project_id = ?1 AND user_id = ?2",
                libsql::params![project_id, user],
            )
            .await?;
        Ok(rows.next().await?.is_some())
    }

    /// IDs of all projects `user` is a member of, oldest first.
    pub async fn project_ids_for_user(&self, user: &str) -> Result<Vec<String>, ServiceError> {
        let mut rows = self
            .conn
            .query(
                "SELECT p.id FROM projects p
                 JOIN project_users pu ON pu.project_id = p.id
                 WHERE pu.user_id = ?1
                 ORDER BY p.rowid",
                [user],
            )
            .await?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next().await? {
            ids.push(row.get::<String>(0)?);
        }
        Ok(ids)
    }

    /// The project holding `task_id`, if any.
    pub async fn project_id_for_task(&self, task_id: &str) -> Result<Option<String>, ServiceError> {
        let mut rows = self
            .conn
            .query(
                "SELECT project_id FROM project_tasks WHERE task_id = ?1",
                [task_id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row.get::<String>(0)?)),
            None => Ok(None),
        }
    }

    /// IDs out of `task_ids` already held by some project.
    pub async fn task_ids_in_use(&self, task_ids: &[String]) -> Result<Vec<String>, ServiceError> {
        if task_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut rows = self
            .conn
            .query(
                &format!(
                    "SELECT task_id FROM project_tasks WHERE task_id IN ({}) ORDER BY task_id",
                    placeholders(task_ids.len())
                ),
                libsql::params_from_iter(id_params(task_ids)),
            )
            .await?;
        let mut used = Vec::new();
        while let Some(row) = rows.next().await? {
            used.push(row.get::<String>(0)?);
        }
        Ok(used)
    }

    /// Insert the project and its member and task links. Returns the new ID.
    pub async fn add_project(&self, project: &NewProject<'_>) -> Result<String, ServiceError> {
        let id = generate_id(self.conn, PREFIX_PROJECT).await?;
        self.insert_project(&id, project).await?;
        Ok(id)
    }

    /// Insert with a caller-chosen ID (fixtures and imports).
    pub async fn insert_project(
        &self,
        id: &str,
        project: &NewProject<'_>,
    ) -> Result<(), ServiceError> {
        self.conn
            .execute(
                "INSERT INTO projects (id, name, description, owner, needs_assignment)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                libsql::params![
                    id,
                    project.name,
                    project.description,
                    project.owner,
                    project.needs_assignment
                ],
            )
            .await?;

        for user in project.users {
            self.add_user(id, user).await?;
        }
        for (position, task_id) in project.task_ids.iter().enumerate() {
            self.conn
                .execute(
                    "INSERT INTO project_tasks (project_id, task_id, position) VALUES (?1, ?2, ?3)",
                    libsql::params![id, task_id.as_str(), position_value(position)?],
                )
                .await?;
        }
        Ok(())
    }

    /// Append `user` to the end of the member list.
    pub async fn add_user(&self, project_id: &str, user: &str) -> Result<(), ServiceError> {
        self.conn
            .execute(
                "INSERT INTO project_users (project_id, user_id, position)
                 VALUES (?1, ?2, (SELECT COALESCE(MAX(position), -1) + 1
                                  FROM project_users WHERE project_id = ?1))",
                libsql::params![project_id, user],
            )
            .await?;
        Ok(())
    }

    pub async fn remove_user(&self, project_id: &str, user: &str) -> Result<(), ServiceError> {
        self.conn
            .execute(
                "DELETE FROM project_users WHERE project_id = ?1 AND user_id = ?2",
                libsql::params![project_id, user],
            )
            .await?;
        Ok(())
    }

    /// Delete the project row; member and task links cascade.
    pub async fn delete_project(&self, id: &str) -> Result<(), ServiceError> {
        self.conn
            .execute("DELETE FROM projects WHERE id = ?1", [id])
            .await?;
        Ok(())
    }

    pub async fn update_name(&self, id: &str, name: &str) -> Result<(), ServiceError> {
        self.conn
            .execute(
                "UPDATE projects SET name = ?1 WHERE id = ?2",
                libsql::params![name, id],
            )
            .await?;
        Ok(())
    }

    pub async fn update_description(&self, id: &str, description: &str) -> Result<(), ServiceError> {
        self.conn
            .execute(
                "UPDATE projects SET description = ?1 WHERE id = ?2",
                libsql::params![description, id],
            )
            .await?;
        Ok(())
    }

    /// `(sum of max points, sum of current points)` over the project's existing tasks.
    async fn process_points(&self, id: &str) -> Result<(i64, i64), ServiceError> {
        let mut rows = self
            .conn
            .query(
                "SELECT COALESCE(SUM(t.max_process_points), 0), COALESCE(SUM(t.process_points), 0)
                 FROM project_tasks pt
                 JOIN tasks t ON t.id = pt.task_id
                 WHERE pt.project_id = ?1",
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok((row.get::<i64>(0)?, row.get::<i64>(1)?))
    }

    async fn list_column(
        &self,
        table: &str,
        column: &str,
        project_id: &str,
    ) -> Result<Vec<String>, ServiceError> {
        let mut rows = self
            .conn
            .query(
                &format!(
                    "SELECT {column} FROM {table} WHERE project_id = ?1 ORDER BY position"
                ),
                [project_id],
            )
            .await?;
        let mut values = Vec::new();
        while let Some(row) = rows.next().await? {
            values.push(row.get::<String>(0)?);
        }
        Ok(values)
    }
}

fn position_value(position: usize) -> Result<i64, DatabaseError> {
    i64::try_from(position).map_err(|e| DatabaseError::InvalidState(format!("position: {e}")))
}
