//! Task creation, assignment transitions and process point updates.

use libsql::Transaction;
use stm_core::entities::{NewTask, Task};

use crate::error::ServiceError;
use crate::services::PermissionService;
use crate::store::TaskStore;

pub struct TaskService<'tx> {
    tx: &'tx Transaction,
    permissions: &'tx PermissionService<'tx>,
}

impl<'tx> TaskService<'tx> {
    #[must_use]
    pub const fn new(tx: &'tx Transaction, permissions: &'tx PermissionService<'tx>) -> Self {
        Self { tx, permissions }
    }

    fn store(&self) -> TaskStore<'tx> {
        TaskStore::new(self.tx)
    }

    /// Tasks in the order of `task_ids`. `user` must be a member of every owning project.
    pub async fn get_tasks(&self, task_ids: &[String], user: &str) -> Result<Vec<Task>, ServiceError> {
        self.permissions.verify_membership_tasks(task_ids, user).await?;
        let tasks = self.store().get_tasks(task_ids).await?;
        tracing::debug!(user, count = tasks.len(), "tasks fetched");
        Ok(tasks)
    }

    /// Validate the whole batch, then insert it. Returns the tasks with their new IDs.
    pub async fn add_tasks(&self, tasks: &[NewTask]) -> Result<Vec<Task>, ServiceError> {
        for task in tasks {
            task.validate()?;
        }

        let store = self.store();
        let mut added = Vec::with_capacity(tasks.len());
        for task in tasks {
            added.push(store.add_task(task).await?);
        }
        tracing::info!(count = added.len(), "tasks added");
        Ok(added)
    }

    /// Unassigned → assigned to `user`. Any existing assignment is a conflict,
    /// including one held by `user` already.
    pub async fn assign_user(&self, task_id: &str, user: &str) -> Result<Task, ServiceError> {
        let store = self.store();
        let task = store.get_task(task_id).await?;
        self.permissions.verify_membership_task(task_id, user).await?;

        if task.is_assigned() {
            return Err(ServiceError::conflict(format!(
                "task {task_id} is already assigned"
            )));
        }
        if !store.assign_user(task_id, user).await? {
            return Err(ServiceError::conflict(format!(
                "task {task_id} was assigned concurrently"
            )));
        }

        tracing::info!(task_id, user, "task assigned");
        store.get_task(task_id).await
    }

    /// Only the current holder may release a task, whatever the project's
    /// assignment policy says.
    pub async fn unassign_user(&self, task_id: &str, user: &str) -> Result<Task, ServiceError> {
        self.permissions.verify_assignment(task_id, user).await?;

        let store = self.store();
        store.unassign_user(task_id).await?;
        tracing::info!(task_id, user, "task unassigned");
        store.get_task(task_id).await
    }

    pub async fn set_process_points(
        &self,
        task_id: &str,
        process_points: i64,
        user: &str,
    ) -> Result<Task, ServiceError> {
        if self.permissions.assignment_in_task_needed(task_id).await? {
            self.permissions.verify_assignment(task_id, user).await?;
        } else {
            self.permissions.verify_membership_task(task_id, user).await?;
        }

        let store = self.store();
        let mut task = store.get_task(task_id).await?;
        task.check_points(process_points)?;
        store.set_process_points(task_id, process_points).await?;
        task.process_points = process_points;

        tracing::info!(task_id, user, process_points, "process points set");
        Ok(task)
    }

    /// Delete tasks `user` is a member for.
    ///
    /// Project links to these tasks are left in place. Use project deletion
    /// when the tasks still belong to a project.
    pub async fn delete(&self, task_ids: &[String], user: &str) -> Result<(), ServiceError> {
        self.permissions.verify_membership_tasks(task_ids, user).await?;
        self.store().delete(task_ids).await?;
        tracing::info!(user, count = task_ids.len(), "tasks deleted");
        Ok(())
    }

    /// NotFound for the first ID without a task row.
    pub(crate) async fn ensure_exist(&self, task_ids: &[String]) -> Result<(), ServiceError> {
        match self.store().missing_ids(task_ids).await?.first() {
            Some(missing) => Err(ServiceError::not_found("task", missing)),
            None => Ok(()),
        }
    }

    pub(crate) async fn assigned_to(
        &self,
        task_ids: &[String],
        user: &str,
    ) -> Result<Vec<String>, ServiceError> {
        self.store().assigned_to(task_ids, user).await
    }
}
