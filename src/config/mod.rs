//! Configuration module for devdb.
//!
//! Handles loading and validating project configuration from TOML files.

mod settings;

pub use settings::*;
