//! SQL access for projects and tasks.
//!
//! Stores borrow a connection (normally the request transaction, which derefs
//! to one) and perform no permission checks. Authorization lives in
//! [`crate::services`].

pub mod project;
pub mod task;

pub use project::ProjectStore;
pub use task::TaskStore;
