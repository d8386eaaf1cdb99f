//! ID prefix constants.
//!
//! Generated IDs have the form `{prefix}-{8 hex chars}`, e.g. `tsk-a3f8b2c1`.
//! IDs inserted by fixtures or imported data may use any non-empty string.

pub const PREFIX_PROJECT: &str = "prj";
pub const PREFIX_TASK: &str = "tsk";

pub const ALL_PREFIXES: &[&str] = &[PREFIX_PROJECT, PREFIX_TASK];
