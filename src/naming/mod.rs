//! Database name resolution.
//!
//! Derives the effective primary and test database names from project
//! configuration, falling back to an underscore-normalized form of the
//! project identifier. Both functions are pure and total; they only
//! normalize, never fail.

/// Resolve the primary database name.
///
/// Returns the configured name verbatim when set and non-empty; otherwise
/// derives a name from the project identifier by replacing `.` and `-`
/// with `_`.
pub fn resolve_primary(configured: Option<&str>, project_identifier: &str) -> String {
    match configured {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => derive_from_identifier(project_identifier),
    }
}

/// Resolve the test database name.
///
/// Returns the configured test name verbatim when set and non-empty;
/// otherwise appends `_test` to the resolved primary name (which itself
/// falls back to the project identifier derivation when unset).
pub fn resolve_test(
    configured_test: Option<&str>,
    configured_primary: Option<&str>,
    project_identifier: &str,
) -> String {
    match configured_test {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!(
            "{}_test",
            resolve_primary(configured_primary, project_identifier)
        ),
    }
}

fn derive_from_identifier(identifier: &str) -> String {
    identifier.replace(['.', '-'], "_")
}
