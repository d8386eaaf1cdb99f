//! Domain services bound to one request transaction.
//!
//! Build them in dependency order and drop them before committing:
//!
//! ```ignore
//! let tx = db.begin().await?;
//! let permissions = PermissionService::new(&tx);
//! let tasks = TaskService::new(&tx, &permissions);
//! let projects = ProjectService::new(&tx, &tasks, &permissions);
//! ```

pub mod permission;
pub mod project;
pub mod task;

pub use permission::PermissionService;
pub use project::ProjectService;
pub use task::TaskService;
