//! SQL execution module.
//!
//! Connects to an engine's administrative database and executes a
//! statement batch with timeout enforcement.

mod sql;

pub use sql::{execute_script, statement_summary, ExecuteOptions};
