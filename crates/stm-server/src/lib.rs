//! # stm-server
//!
//! HTTP API for the simple task manager.
//!
//! - [`api`] maps both route revisions onto [`api::Call`] values
//! - [`pipeline`] runs each call inside one transaction with the three
//!   domain services, committing on success and rolling back otherwise
//! - [`server`] is the `tiny_http` front end

pub mod api;
pub mod error;
pub mod pipeline;
pub mod reply;
pub mod server;

pub use error::ApiError;
pub use pipeline::{Operation, Pipeline, Services};
pub use reply::{HttpReply, Reply};
