//! Error types for devdb.
//!
//! Provides a unified error handling system using thiserror.

mod types;

pub use types::*;
