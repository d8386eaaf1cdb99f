//! Membership, ownership and assignment checks.
//!
//! Every method is a read against the request transaction. A failed check is
//! reported as an error and never retried.

use libsql::Transaction;

use crate::error::ServiceError;
use crate::store::{ProjectStore, TaskStore};

pub struct PermissionService<'tx> {
    tx: &'tx Transaction,
}

impl<'tx> PermissionService<'tx> {
    #[must_use]
    pub const fn new(tx: &'tx Transaction) -> Self {
        Self { tx }
    }

    fn projects(&self) -> ProjectStore<'tx> {
        ProjectStore::new(self.tx)
    }

    fn tasks(&self) -> TaskStore<'tx> {
        TaskStore::new(self.tx)
    }

    /// NotFound for an unknown project, Authorization if `user` is not a member.
    pub async fn verify_membership_project(
        &self,
        project_id: &str,
        user: &str,
    ) -> Result<(), ServiceError> {
        let projects = self.projects();
        projects.owner(project_id).await?;
        if !projects.is_member(project_id, user).await? {
            return Err(ServiceError::unauthorized(format!(
                "user {user} is not a member of project {project_id}"
            )));
        }
        Ok(())
    }

    /// NotFound for an unknown project, Authorization if `user` is not its owner.
    pub async fn verify_ownership(&self, project_id: &str, user: &str) -> Result<(), ServiceError> {
        let owner = self.projects().owner(project_id).await?;
        if owner != user {
            return Err(ServiceError::unauthorized(format!(
                "user {user} is not the owner of project {project_id}"
            )));
        }
        Ok(())
    }

    /// Authorization unless `user` is a member of the project holding `task_id`.
    ///
    /// A task held by no project (including unknown task IDs) has no members.
    pub async fn verify_membership_task(&self, task_id: &str, user: &str) -> Result<(), ServiceError> {
        let projects = self.projects();
        let Some(project_id) = projects.project_id_for_task(task_id).await? else {
            return Err(ServiceError::unauthorized(format!(
                "task {task_id} belongs to no project"
            )));
        };
        if !projects.is_member(&project_id, user).await? {
            return Err(ServiceError::unauthorized(format!(
                "user {user} is not a member of project {project_id} holding task {task_id}"
            )));
        }
        Ok(())
    }

    pub async fn verify_membership_tasks(
        &self,
        task_ids: &[String],
        user: &str,
    ) -> Result<(), ServiceError> {
        for task_id in task_ids {
            self.verify_membership_task(task_id, user).await?;
        }
        Ok(())
    }

    /// Authorization unless `user` currently holds the task.
    pub async fn verify_assignment(&self, task_id: &str, user: &str) -> Result<(), ServiceError> {
        let task = self.tasks().get_task(task_id).await?;
        if task.assigned_user.as_deref() != Some(user) {
            return Err(ServiceError::unauthorized(format!(
                "user {user} is not assigned to task {task_id}"
            )));
        }
        Ok(())
    }

    /// The assignment policy of the project holding `task_id`.
    pub async fn assignment_in_task_needed(&self, task_id: &str) -> Result<bool, ServiceError> {
        let projects = self.projects();
        let project_id = projects
            .project_id_for_task(task_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("project for task", task_id))?;
        projects.needs_assignment(&project_id).await
    }
}
