//! Entity structs for projects and tasks.
//!
//! Field names serialise in `camelCase`, the shape the web client consumes.

mod project;
mod task;

pub use project::{Project, ProjectDraft};
pub use task::{NewTask, Task};
