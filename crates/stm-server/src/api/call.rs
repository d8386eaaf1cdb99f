use stm_core::entities::{NewTask, ProjectDraft};

use crate::error::ApiError;
use crate::pipeline::{Operation, Services};
use crate::reply::Reply;

/// One decoded API operation with its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetProjects,
    AddProject(ProjectDraft),
    AddUser { project_id: String, user: String },
    RemoveUser { project_id: String, user: String },
    LeaveProject { project_id: String },
    DeleteProject { project_id: String },
    GetProjectTasks { project_id: String },
    UpdateName { project_id: String, name: String },
    UpdateDescription { project_id: String, description: String },
    GetTasks { task_ids: Vec<String> },
    AddTasks(Vec<NewTask>),
    AssignUser { task_id: String },
    UnassignUser { task_id: String },
    SetProcessPoints { task_id: String, process_points: i64 },
}

impl Operation for Call {
    fn name(&self) -> &'static str {
        match self {
            Self::GetProjects => "get_projects",
            Self::AddProject(_) => "add_project",
            Self::AddUser { .. } => "add_user",
            Self::RemoveUser { .. } => "remove_user",
            Self::LeaveProject { .. } => "leave_project",
            Self::DeleteProject { .. } => "delete_project",
            Self::GetProjectTasks { .. } => "get_project_tasks",
            Self::UpdateName { .. } => "update_name",
            Self::UpdateDescription { .. } => "update_description",
            Self::GetTasks { .. } => "get_tasks",
            Self::AddTasks(_) => "add_tasks",
            Self::AssignUser { .. } => "assign_user",
            Self::UnassignUser { .. } => "unassign_user",
            Self::SetProcessPoints { .. } => "set_process_points",
        }
    }

    async fn run(self, services: &Services<'_>, user: &str) -> Result<Reply, ApiError> {
        let projects = services.projects;
        let tasks = services.tasks;

        match self {
            Self::GetProjects => Reply::json(&projects.get_projects(user).await?),
            Self::AddProject(draft) => Reply::json(&projects.add_project(draft, user).await?),
            Self::AddUser {
                project_id,
                user: new_member,
            } => Reply::json(&projects.add_user(&new_member, &project_id, user).await?),
            Self::RemoveUser {
                project_id,
                user: member,
            } => {
                let project = projects.remove_user(&project_id, user, &member).await?;
                // A member who removed themselves can no longer see the project.
                if member == user {
                    Ok(Reply::Empty)
                } else {
                    Reply::json(&project)
                }
            }
            Self::LeaveProject { project_id } => {
                projects.leave_project(&project_id, user).await?;
                Ok(Reply::Empty)
            }
            Self::DeleteProject { project_id } => {
                projects.delete_project(&project_id, user).await?;
                Ok(Reply::Empty)
            }
            Self::GetProjectTasks { project_id } => {
                Reply::json(&projects.get_tasks(&project_id, user).await?)
            }
            Self::UpdateName { project_id, name } => {
                Reply::json(&projects.update_name(&project_id, &name, user).await?)
            }
            Self::UpdateDescription {
                project_id,
                description,
            } => Reply::json(
                &projects
                    .update_description(&project_id, &description, user)
                    .await?,
            ),
            Self::GetTasks { task_ids } => Reply::json(&tasks.get_tasks(&task_ids, user).await?),
            Self::AddTasks(new_tasks) => Reply::json(&tasks.add_tasks(&new_tasks).await?),
            Self::AssignUser { task_id } => Reply::json(&tasks.assign_user(&task_id, user).await?),
            Self::UnassignUser { task_id } => {
                Reply::json(&tasks.unassign_user(&task_id, user).await?)
            }
            Self::SetProcessPoints {
                task_id,
                process_points,
            } => Reply::json(
                &tasks
                    .set_process_points(&task_id, process_points, user)
                    .await?,
            ),
        }
    }
}
