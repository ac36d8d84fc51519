//! SQL identifier validation.
//!
//! Database names and usernames are interpolated into DDL statements where
//! drivers do not support parameterized identifiers, so every interpolated
//! name must pass a strict allow-list check first.

use crate::error::{ProvisionError, ProvisionResult, ValidationErrorKind};

/// Maximum identifier length. MySQL caps database names at 64 characters;
/// PostgreSQL truncates at 63, so 64 is the shared upper bound we enforce.
const MAX_IDENTIFIER_LENGTH: usize = 64;

/// Validates an identifier for safe interpolation into SQL.
///
/// # Rules
///
/// - Must be non-empty
/// - Must be at most 64 characters
/// - Can contain only ASCII letters, digits, and underscores
///
/// # Arguments
///
/// * `value` - The identifier to validate
/// * `what` - What the identifier names, used in error messages
///   (e.g. "database name", "application username")
///
/// # Returns
///
/// The validated identifier or a validation error.
pub fn validate_identifier<'a>(
    value: &'a str,
    what: &'static str,
) -> ProvisionResult<&'a str> {
    if value.is_empty() {
        return Err(ProvisionError::Validation {
            kind: ValidationErrorKind::EmptyIdentifier { what },
        });
    }

    if value.len() > MAX_IDENTIFIER_LENGTH {
        return Err(ProvisionError::Validation {
            kind: ValidationErrorKind::IdentifierTooLong {
                what,
                value: value.to_string(),
                max: MAX_IDENTIFIER_LENGTH,
            },
        });
    }

    if !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ProvisionError::Validation {
            kind: ValidationErrorKind::UnsafeIdentifier {
                what,
                value: value.to_string(),
            },
        });
    }

    Ok(value)
}
