//! Project lifecycle: creation, membership, renaming and cascading deletion.
//!
//! Cross-entity effects run as explicit calls into [`TaskService`] on the same
//! transaction:
//!
//! - removing a member unassigns every project task that member holds
//! - deleting a project deletes every task it holds

use std::collections::HashSet;

use libsql::Transaction;
use stm_core::entities::{Project, ProjectDraft, Task};
use stm_core::errors::CoreError;
use stm_core::text::{normalize_description, normalize_name};

use crate::error::ServiceError;
use crate::services::{PermissionService, TaskService};
use crate::store::ProjectStore;
use crate::store::project::NewProject;

pub struct ProjectService<'tx> {
    tx: &'tx Transaction,
    tasks: &'tx TaskService<'tx>,
    permissions: &'tx PermissionService<'tx>,
}

impl<'tx> ProjectService<'tx> {
    #[must_use]
    pub const fn new(
        tx: &'tx Transaction,
        tasks: &'tx TaskService<'tx>,
        permissions: &'tx PermissionService<'tx>,
    ) -> Self {
        Self {
            tx,
            tasks,
            permissions,
        }
    }

    fn store(&self) -> ProjectStore<'tx> {
        ProjectStore::new(self.tx)
    }

    /// All projects `user` is a member of, oldest first.
    pub async fn get_projects(&self, user: &str) -> Result<Vec<Project>, ServiceError> {
        let store = self.store();
        let ids = store.project_ids_for_user(user).await?;
        let mut projects = Vec::with_capacity(ids.len());
        for id in &ids {
            projects.push(store.get_project(id).await?);
        }
        tracing::debug!(user, count = projects.len(), "projects fetched");
        Ok(projects)
    }

    pub async fn get_project(&self, id: &str, user: &str) -> Result<Project, ServiceError> {
        self.permissions.verify_membership_project(id, user).await?;
        self.store().get_project(id).await
    }

    pub async fn get_project_by_task(&self, task_id: &str, user: &str) -> Result<Project, ServiceError> {
        let project_id = self
            .store()
            .project_id_for_task(task_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("project for task", task_id))?;
        self.get_project(&project_id, user).await
    }

    /// Tasks of project `id` in project order.
    pub async fn get_tasks(&self, id: &str, user: &str) -> Result<Vec<Task>, ServiceError> {
        let project = self.get_project(id, user).await?;
        self.tasks.get_tasks(&project.task_ids, user).await
    }

    /// Create a project owned by `user` from `draft`.
    ///
    /// The draft's owner field is replaced by `user`, who is also added to the
    /// member list when missing. Fails as a whole if any task ID is unknown or
    /// already held by another project.
    pub async fn add_project(&self, draft: ProjectDraft, user: &str) -> Result<Project, ServiceError> {
        let name = normalize_name(&draft.name)?;
        if draft.task_ids.is_empty() {
            return Err(ServiceError::validation("a project needs at least one task"));
        }
        let mut seen = HashSet::with_capacity(draft.task_ids.len());
        if let Some(duplicate) = draft.task_ids.iter().find(|id| !seen.insert(id.as_str())) {
            return Err(ServiceError::validation(format!(
                "task {duplicate} listed twice"
            )));
        }
        self.tasks.ensure_exist(&draft.task_ids).await?;

        let store = self.store();
        let in_use = store.task_ids_in_use(&draft.task_ids).await?;
        if !in_use.is_empty() {
            return Err(CoreError::Atomicity(format!(
                "tasks already used by another project: {}",
                in_use.join(", ")
            ))
            .into());
        }

        let draft = ProjectDraft {
            owner: user.to_string(),
            ..draft
        };
        let users = draft.members_with_owner();
        let id = store
            .add_project(&NewProject {
                name: &name,
                description: &draft.description,
                owner: &draft.owner,
                users: &users,
                task_ids: &draft.task_ids,
                needs_assignment: draft.needs_assignment,
            })
            .await?;

        tracing::info!(project_id = %id, user, tasks = draft.task_ids.len(), "project created");
        store.get_project(&id).await
    }

    /// Owner-only. Adding an existing member is a conflict.
    pub async fn add_user(
        &self,
        user_to_add: &str,
        project_id: &str,
        requesting_user: &str,
    ) -> Result<Project, ServiceError> {
        self.permissions
            .verify_ownership(project_id, requesting_user)
            .await?;

        let store = self.store();
        if store.is_member(project_id, user_to_add).await? {
            return Err(ServiceError::conflict(format!(
                "user {user_to_add} is already a member of project {project_id}"
            )));
        }
        store.add_user(project_id, user_to_add).await?;

        tracing::info!(project_id, user = user_to_add, "member added");
        store.get_project(project_id).await
    }

    /// Remove `user_to_remove` and release every task of the project they hold.
    ///
    /// Allowed for the owner and for the member removing themselves. The owner
    /// can never be removed.
    pub async fn remove_user(
        &self,
        project_id: &str,
        requesting_user: &str,
        user_to_remove: &str,
    ) -> Result<Project, ServiceError> {
        let store = self.store();
        let project = store.get_project(project_id).await?;
        if !project.is_owner(requesting_user) && requesting_user != user_to_remove {
            return Err(ServiceError::unauthorized(format!(
                "user {requesting_user} may not remove {user_to_remove} from project {project_id}"
            )));
        }
        if project.is_owner(user_to_remove) {
            return Err(ServiceError::conflict(format!(
                "the owner cannot be removed from project {project_id}"
            )));
        }
        if !project.is_member(user_to_remove) {
            return Err(ServiceError::not_found("project member", user_to_remove));
        }

        let held = self
            .tasks
            .assigned_to(&project.task_ids, user_to_remove)
            .await?;
        for task_id in &held {
            self.tasks.unassign_user(task_id, user_to_remove).await?;
        }
        store.remove_user(project_id, user_to_remove).await?;

        tracing::info!(
            project_id,
            user = user_to_remove,
            by = requesting_user,
            released = held.len(),
            "member removed"
        );
        store.get_project(project_id).await
    }

    /// Self-removal. The owner has to delete the project instead.
    pub async fn leave_project(&self, project_id: &str, user: &str) -> Result<(), ServiceError> {
        self.permissions
            .verify_membership_project(project_id, user)
            .await?;
        if self.store().owner(project_id).await? == user {
            return Err(ServiceError::conflict(format!(
                "the owner cannot leave project {project_id}"
            )));
        }
        self.remove_user(project_id, user, user).await?;
        Ok(())
    }

    /// Owner-only. Deletes the project together with all of its tasks.
    pub async fn delete_project(&self, id: &str, user: &str) -> Result<(), ServiceError> {
        self.permissions.verify_ownership(id, user).await?;

        let store = self.store();
        let project = store.get_project(id).await?;
        self.tasks.delete(&project.task_ids, user).await?;
        store.delete_project(id).await?;

        tracing::info!(project_id = id, user, tasks = project.task_ids.len(), "project deleted");
        Ok(())
    }

    /// Owner-only. Only the first line of `name` is kept.
    pub async fn update_name(&self, id: &str, name: &str, user: &str) -> Result<Project, ServiceError> {
        self.permissions.verify_ownership(id, user).await?;
        let name = normalize_name(name)?;

        let store = self.store();
        store.update_name(id, &name).await?;
        tracing::info!(project_id = id, user, "project renamed");
        store.get_project(id).await
    }

    /// Owner-only. Line breaks are kept.
    pub async fn update_description(
        &self,
        id: &str,
        description: &str,
        user: &str,
    ) -> Result<Project, ServiceError> {
        self.permissions.verify_ownership(id, user).await?;
        let description = normalize_description(description)?;

        let store = self.store();
        store.update_description(id, &description).await?;
        tracing::info!(project_id = id, user, "project description updated");
        store.get_project(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StmDb;
    use crate::error::ErrorKind;
    use crate::fixtures::seed_reference_data;
    use crate::store::TaskStore;
    use pretty_assertions::assert_eq;

    async fn seeded() -> StmDb {
        let db = StmDb::open_in_memory().await.unwrap();
        seed_reference_data(db.conn()).await.unwrap();
        db
    }

    fn draft(task_ids: &[&str]) -> ProjectDraft {
        ProjectDraft {
            name: "Test name".into(),
            description: "Test description".into(),
            owner: "Someone else".into(),
            users: vec!["Anna".into()],
            task_ids: task_ids.iter().map(ToString::to_string).collect(),
            needs_assignment: true,
        }
    }

    /// Build the three services on `$tx` and bind the project service to `$projects`.
    macro_rules! services {
        ($tx:expr, $projects:ident) => {
            let permissions = PermissionService::new(&$tx);
            let tasks = TaskService::new(&$tx, &permissions);
            let $projects = ProjectService::new(&$tx, &tasks, &permissions);
        };
    }

    #[tokio::test]
    async fn reference_projects_per_user() {
        let db = seeded().await;
        let tx = db.begin().await.unwrap();
        services!(tx, projects);

        let peter = projects.get_projects("Peter").await.unwrap();
        assert_eq!(peter.len(), 1);
        assert_eq!(peter[0].id, "1");
        assert_eq!(peter[0].owner, "Peter");
        assert_eq!(peter[0].total_process_points, 10);
        assert_eq!(peter[0].done_process_points, 0);

        let maria = projects.get_projects("Maria").await.unwrap();
        assert_eq!(
            maria.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
            vec!["1", "2"]
        );
        assert_eq!(maria[1].total_process_points, 308);
        assert_eq!(maria[1].done_process_points, 154);

        assert!(projects.get_projects("Unknown user").await.unwrap().is_empty());
        let err = projects.get_tasks("1", "Unknown user").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
    }

    #[tokio::test]
    async fn lookups_by_project_and_task() {
        let db = seeded().await;
        let tx = db.begin().await.unwrap();
        services!(tx, projects);

        assert_eq!(projects.get_project_by_task("4", "Anna").await.unwrap().id, "2");
        assert_eq!(
            projects.get_project_by_task("8", "Anna").await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            projects.get_project("42", "Anna").await.unwrap_err().kind(),
            ErrorKind::NotFound
        );

        let tasks = projects.get_tasks("2", "Carl").await.unwrap();
        assert_eq!(
            tasks.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(),
            vec!["2", "3", "4", "5", "6", "7"]
        );
    }

    #[tokio::test]
    async fn add_project_sets_owner_and_totals() {
        let db = seeded().await;
        let tx = db.begin().await.unwrap();
        services!(tx, projects);

        let project = projects
            .add_project(draft(&["8", "9"]), "Jack")
            .await
            .unwrap();
        assert!(project.id.starts_with("prj-"));
        assert_eq!(project.owner, "Jack");
        assert_eq!(project.users, vec!["Jack", "Anna"]);
        assert_eq!(project.total_process_points, 110);
        assert_eq!(project.done_process_points, 5);
    }

    #[tokio::test]
    async fn add_project_rejects_used_unknown_and_empty_tasks() {
        let db = seeded().await;
        let tx = db.begin().await.unwrap();
        services!(tx, projects);

        for (task_ids, kind) in [
            (vec!["8", "1"], ErrorKind::Atomicity),
            (vec!["8", "nope"], ErrorKind::NotFound),
            (vec![], ErrorKind::Validation),
            (vec!["8", "8"], ErrorKind::Validation),
        ] {
            let err = projects
                .add_project(draft(&task_ids), "Peter")
                .await
                .unwrap_err();
            assert_eq!(err.kind(), kind, "{task_ids:?}");
        }

        let mut blank = draft(&["8"]);
        blank.name = "\nname on second line".into();
        assert_eq!(
            projects.add_project(blank, "Peter").await.unwrap_err().kind(),
            ErrorKind::Validation
        );

        let visible = projects.get_projects("Peter").await.unwrap();
        assert_eq!(visible.len(), 1);
    }

    #[tokio::test]
    async fn add_user_is_owner_only_and_unique() {
        let db = seeded().await;
        let tx = db.begin().await.unwrap();
        services!(tx, projects);

        let err = projects.add_user("Carl", "1", "Maria").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
        let err = projects.add_user("Maria", "1", "Peter").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let project = projects.add_user("Carl", "1", "Peter").await.unwrap();
        assert_eq!(project.users, vec!["Peter", "Maria", "Carl"]);
    }

    #[tokio::test]
    async fn remove_user_releases_held_tasks() {
        let db = seeded().await;
        let tx = db.begin().await.unwrap();
        services!(tx, projects);

        let project = projects.remove_user("2", "Maria", "John").await.unwrap();
        assert!(!project.is_member("John"));

        let task = TaskStore::new(&tx).get_task("2").await.unwrap();
        assert_eq!(task.assigned_user, None);
        assert_eq!(project.done_process_points, 154);
        // Other holders keep their tasks.
        let task = TaskStore::new(&tx).get_task("4").await.unwrap();
        assert_eq!(task.assigned_user.as_deref(), Some("Anna"));
    }

    #[tokio::test]
    async fn remove_user_rules() {
        let db = seeded().await;
        let tx = db.begin().await.unwrap();
        services!(tx, projects);

        let err = projects.remove_user("nope", "Maria", "John").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = projects.remove_user("2", "John", "Anna").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
        let err = projects.remove_user("2", "Maria", "Maria").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        let err = projects.remove_user("2", "Maria", "Peter").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let project = projects.remove_user("2", "Carl", "Carl").await.unwrap();
        assert_eq!(project.users, vec!["Maria", "John", "Anna"]);
    }

    #[tokio::test]
    async fn leave_project() {
        let db = seeded().await;
        let tx = db.begin().await.unwrap();
        services!(tx, projects);

        let err = projects.leave_project("1", "Peter").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        let err = projects.leave_project("1", "John").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);

        projects.leave_project("2", "Anna").await.unwrap();
        let task = TaskStore::new(&tx).get_task("4").await.unwrap();
        assert_eq!(task.assigned_user, None);
        let err = projects.get_project("2", "Anna").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
    }

    #[tokio::test]
    async fn delete_project_removes_tasks() {
        let db = seeded().await;
        let tx = db.begin().await.unwrap();
        services!(tx, projects);

        let err = projects.delete_project("2", "John").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);

        projects.delete_project("2", "Maria").await.unwrap();
        let ids: Vec<String> = ["2", "3", "4", "5", "6", "7"]
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(TaskStore::new(&tx).missing_ids(&ids).await.unwrap(), ids);
        assert_eq!(
            projects.get_projects("Maria").await.unwrap().len(),
            1,
            "project 1 remains"
        );
    }

    #[tokio::test]
    async fn rename_and_describe() {
        let db = seeded().await;
        let tx = db.begin().await.unwrap();
        services!(tx, projects);

        let project = projects
            .update_name("1", "foo\nbar\nwhatever", "Peter")
            .await
            .unwrap();
        assert_eq!(project.name, "foo");

        let project = projects
            .update_description("1", "flubby dubby\n foo bar", "Peter")
            .await
            .unwrap();
        assert_eq!(project.description, "flubby dubby\n foo bar");

        let err = projects.update_name("1", "  ", "Peter").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        let err = projects
            .update_description("1", "new", "Maria")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
    }
}
