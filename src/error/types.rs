//! Error types for devdb.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for provisioning operations.
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// Configuration-related errors.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Credential loading and lookup errors.
    #[error("Credential error: {kind}")]
    Credential { kind: CredentialErrorKind },

    /// Validation errors.
    #[error("Validation error: {kind}")]
    Validation { kind: ValidationErrorKind },

    /// SQL execution errors.
    #[error("Execution error: {kind}")]
    Execution { kind: ExecutionErrorKind },
}

/// Credential error kinds.
#[derive(Error, Debug)]
pub enum CredentialErrorKind {
    #[error("No credentials for engine '{engine}': missing key '{key}'")]
    MissingEntry { engine: &'static str, key: String },

    #[error("Credentials file '{path}' is unreadable: {message}")]
    Unreadable { path: PathBuf, message: String },
}

/// Validation error kinds.
#[derive(Error, Debug)]
pub enum ValidationErrorKind {
    #[error("{what} cannot be empty")]
    EmptyIdentifier { what: &'static str },

    #[error("{what} '{value}' exceeds maximum length of {max} characters")]
    IdentifierTooLong {
        what: &'static str,
        value: String,
        max: usize,
    },

    #[error("{what} '{value}' may only contain letters, digits, and underscores")]
    UnsafeIdentifier { what: &'static str, value: String },
}

/// SQL execution error kinds.
#[derive(Error, Debug)]
pub enum ExecutionErrorKind {
    #[error("Connection to administrative database failed: {message}")]
    Connection { message: String },

    #[error("Statement '{statement}' failed: {message}")]
    Statement { statement: String, message: String },

    #[error("{phase} timed out after {timeout_secs} seconds")]
    Timeout {
        phase: &'static str,
        timeout_secs: u64,
    },
}

impl ProvisionError {
    /// True if this error is a credential error (load or lookup).
    pub fn is_credential(&self) -> bool {
        matches!(self, ProvisionError::Credential { .. })
    }
}

/// Result type alias for provisioning operations.
pub type ProvisionResult<T> = Result<T, ProvisionError>;
