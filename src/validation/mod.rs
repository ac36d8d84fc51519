//! Input validation module.
//!
//! Provides the identifier validator applied to database names and
//! application usernames before they are interpolated into SQL.

mod identifier;

pub use identifier::validate_identifier;
