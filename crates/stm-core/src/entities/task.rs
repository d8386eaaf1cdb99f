use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// The smallest unit of assignable work.
///
/// Linkage to a project is held by the project (`Project::task_ids`), never by
/// the task itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub process_points: i64,
    pub max_process_points: i64,
    /// Opaque geometry payload, stored as given.
    pub geometry: String,
    pub assigned_user: Option<String>,
}

impl Task {
    #[must_use]
    pub const fn is_assigned(&self) -> bool {
        self.assigned_user.is_some()
    }

    /// Check `0 <= points <= max_process_points`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` when `points` is outside the range.
    pub fn check_points(&self, points: i64) -> Result<(), CoreError> {
        if points < 0 || points > self.max_process_points {
            return Err(CoreError::Validation(format!(
                "process points out of range ({points} / {}) for task {}",
                self.max_process_points, self.id
            )));
        }
        Ok(())
    }
}

/// A task as submitted for creation. IDs are assigned on insert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    #[serde(default)]
    pub process_points: i64,
    pub max_process_points: i64,
    #[serde(default)]
    pub geometry: String,
}

impl NewTask {
    /// Check `max_process_points >= 1` and `0 <= process_points <= max_process_points`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` describing the offending values.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.process_points < 0
            || self.max_process_points < 1
            || self.max_process_points < self.process_points
        {
            return Err(CoreError::Validation(format!(
                "process points of task are out of range ({} / {})",
                self.process_points, self.max_process_points
            )));
        }
        Ok(())
    }
}
