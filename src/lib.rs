//! devdb Library
//!
//! This crate provides the core functionality for the devdb provisioning
//! tool, which drops and recreates project development and test databases
//! across MySQL and PostgreSQL.

pub mod config;
pub mod credentials;
pub mod engine;
pub mod error;
pub mod executor;
pub mod naming;
pub mod provision;
pub mod script;
pub mod validation;
