//! # stm-core
//!
//! Core types shared across the simple task manager crates:
//! - Entity structs for projects and tasks, plus the drafts used to create them
//! - ID prefix constants
//! - The authenticated identity passed from `stm-auth` into the services
//! - Cross-cutting error types
//! - Text normalisation for user-supplied project names and descriptions

pub mod entities;
pub mod errors;
pub mod identity;
pub mod ids;
pub mod text;
