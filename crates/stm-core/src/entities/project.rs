use serde::{Deserialize, Serialize};

const fn default_needs_assignment() -> bool {
    true
}

/// A named unit of work owned by one user.
///
/// `total_process_points` and `done_process_points` are derived from the
/// project's tasks on every read and never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    pub owner: String,
    /// Members in insertion order. Always contains `owner`.
    pub users: Vec<String>,
    pub task_ids: Vec<String>,
    /// When set, only the assignee of a task may change its process points.
    pub needs_assignment: bool,
    pub total_process_points: i64,
    pub done_process_points: i64,
}

impl Project {
    #[must_use]
    pub fn is_member(&self, user: &str) -> bool {
        self.users.iter().any(|u| u == user)
    }

    #[must_use]
    pub fn is_owner(&self, user: &str) -> bool {
        self.owner == user
    }
}

/// A project as submitted for creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Overwritten with the authenticated caller before creation.
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub users: Vec<String>,
    #[serde(default)]
    pub task_ids: Vec<String>,
    #[serde(default = "default_needs_assignment")]
    pub needs_assignment: bool,
}

impl ProjectDraft {
    /// Member list with the owner inserted at the front if absent.
    #[must_use]
    pub fn members_with_owner(&self) -> Vec<String> {
        let mut users = Vec::with_capacity(self.users.len() + 1);
        if !self.users.iter().any(|u| u == &self.owner) {
            users.push(self.owner.clone());
        }
        for user in &self.users {
            if !users.contains(user) {
                users.push(user.clone());
            }
        }
        users
    }
}
