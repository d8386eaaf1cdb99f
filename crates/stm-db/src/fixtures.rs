//! Reference data set used by tests and the `stm seed` command.
//!
//! Two projects with fixed IDs:
//!
//! | Project | Owner | Members                 | Tasks     | Done / Total |
//! |---------|-------|-------------------------|-----------|--------------|
//! | `1`     | Peter | Peter, Maria            | `1`       | 0 / 10       |
//! | `2`     | Maria | Maria, John, Anna, Carl | `2`..`7`  | 154 / 308    |
//!
//! Tasks `8` and `9` exist but belong to no project.

use stm_core::entities::Task;

use crate::error::ServiceError;
use crate::store::project::NewProject;
use crate::store::{ProjectStore, TaskStore};

const SQUARE: &str = r#"{"type":"Polygon","coordinates":[[[9.9,53.5],[10.0,53.5],[10.0,53.6],[9.9,53.6],[9.9,53.5]]]}"#;

fn task(id: &str, process_points: i64, max_process_points: i64, assigned: Option<&str>) -> Task {
    Task {
        id: id.to_string(),
        process_points,
        max_process_points,
        geometry: SQUARE.to_string(),
        assigned_user: assigned.map(String::from),
    }
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

/// Insert the reference projects and tasks.
///
/// Run it inside a transaction; a second run fails on the duplicate IDs.
///
/// # Errors
///
/// Returns `ServiceError` if any insert fails.
pub async fn seed_reference_data(conn: &libsql::Connection) -> Result<(), ServiceError> {
    let tasks = TaskStore::new(conn);
    for task in [
        task("1", 0, 10, Some("Peter")),
        task("2", 50, 100, Some("John")),
        task("3", 100, 100, None),
        task("4", 0, 50, Some("Anna")),
        task("5", 4, 50, None),
        task("6", 0, 4, None),
        task("7", 0, 4, None),
        task("8", 5, 100, None),
        task("9", 0, 10, None),
    ] {
        tasks.insert_task(&task).await?;
    }

    let projects = ProjectStore::new(conn);
    projects
        .insert_project(
            "1",
            &NewProject {
                name: "First project",
                description: "Peter's first mapping project",
                owner: "Peter",
                users: &owned(&["Peter", "Maria"]),
                task_ids: &owned(&["1"]),
                needs_assignment: true,
            },
        )
        .await?;
    projects
        .insert_project(
            "2",
            &NewProject {
                name: "Second project",
                description: "Road network of the old town",
                owner: "Maria",
                users: &owned(&["Maria", "John", "Anna", "Carl"]),
                task_ids: &owned(&["2", "3", "4", "5", "6", "7"]),
                needs_assignment: false,
            },
        )
        .await?;

    tracing::info!("reference data seeded");
    Ok(())
}
