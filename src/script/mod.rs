//! Provisioning script generation.
//!
//! Builds the ordered drop/create/grant statement sequence for one engine
//! and one target database. Identifiers are validated against a strict
//! allow-list before interpolation; passwords are escaped for their
//! single-quoted string context.

use crate::engine::Engine;
use crate::error::ProvisionResult;
use crate::validation::validate_identifier;

/// Fully-resolved input to script generation.
#[derive(Clone)]
pub struct ProvisionRequest {
    pub engine: Engine,
    pub database: String,
    pub app_username: String,
    pub app_password: String,
}

impl std::fmt::Debug for ProvisionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvisionRequest")
            .field("engine", &self.engine)
            .field("database", &self.database)
            .field("app_username", &self.app_username)
            .field("app_password", &"[REDACTED]")
            .finish()
    }
}

/// Build the provisioning statement sequence for a request.
///
/// Per engine the sequence drops the target database if present, recreates
/// it with a UTF-8 binary-safe charset, and grants full privileges to the
/// application user. The database name and username are rejected before any
/// statement is built if they contain characters unsafe for unquoted
/// identifier interpolation.
pub fn build_script(request: &ProvisionRequest) -> ProvisionResult<Vec<String>> {
    let database = validate_identifier(&request.database, "database name")?;
    let username = validate_identifier(&request.app_username, "application username")?;

    let statements = match request.engine {
        Engine::Mysql => mysql_script(database, username, &request.app_password),
        Engine::Postgresql => postgresql_script(database, username),
    };
    Ok(statements)
}

/// MySQL provisioning script.
///
/// localhost and 127.0.0.1 are distinct identities in MySQL's privilege
/// model, so the application user is created and granted for both host
/// patterns.
fn mysql_script(database: &str, username: &str, password: &str) -> Vec<String> {
    let escaped_password = escape_mysql_string(password);
    let mut statements = vec![
        format!("DROP DATABASE IF EXISTS `{database}`"),
        format!("CREATE DATABASE `{database}` CHARACTER SET utf8 COLLATE utf8_bin"),
    ];
    for host in ["localhost", "127.0.0.1"] {
        statements.push(format!(
            "CREATE USER IF NOT EXISTS '{username}'@'{host}' IDENTIFIED BY '{escaped_password}'"
        ));
    }
    for host in ["localhost", "127.0.0.1"] {
        statements.push(format!(
            "GRANT ALL PRIVILEGES ON `{database}`.* TO '{username}'@'{host}'"
        ));
    }
    statements.push("FLUSH PRIVILEGES".to_string());
    statements
}

/// PostgreSQL provisioning script.
///
/// The database is built from template0 so encoding and locale can be set
/// explicitly. PostgreSQL has no host-qualified user identity, so a single
/// grant suffices.
fn postgresql_script(database: &str, username: &str) -> Vec<String> {
    vec![
        format!("DROP DATABASE IF EXISTS \"{database}\""),
        format!(
            "CREATE DATABASE \"{database}\" WITH TEMPLATE template0 ENCODING 'UTF-8' \
             LC_COLLATE 'en_US.UTF-8' LC_CTYPE 'en_US.UTF-8'"
        ),
        format!("GRANT ALL PRIVILEGES ON DATABASE \"{database}\" TO \"{username}\""),
    ]
}

/// Escape a string for use in a MySQL single-quoted string literal.
/// Handles all special characters that could break out of the string context.
fn escape_mysql_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len() * 2);
    for c in s.chars() {
        match c {
            '\'' => result.push_str("''"),
            '\\' => result.push_str("\\\\"),
            '\0' => result.push_str("\\0"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\x1a' => result.push_str("\\Z"), // Ctrl+Z
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(engine: Engine, database: &str) -> ProvisionRequest {
        ProvisionRequest {
            engine,
            database: database.to_string(),
            app_username: "dev".to_string(),
            app_password: "dev".to_string(),
        }
    }

    #[test]
    fn test_mysql_script_sequence() {
        let statements = build_script(&request(Engine::Mysql, "app_test")).unwrap();
        assert_eq!(statements[0], "DROP DATABASE IF EXISTS `app_test`");
        assert_eq!(
            statements[1],
            "CREATE DATABASE `app_test` CHARACTER SET utf8 COLLATE utf8_bin"
        );
        assert_eq!(statements.last().unwrap(), "FLUSH PRIVILEGES");
    }

    #[test]
    fn test_mysql_grants_both_host_patterns() {
        let statements = build_script(&request(Engine::Mysql, "app_test")).unwrap();
        let grants: Vec<&String> = statements
            .iter()
            .filter(|s| s.starts_with("GRANT"))
            .collect();
        assert_eq!(grants.len(), 2);
        assert!(grants
            .iter()
            .any(|s| s.contains("TO 'dev'@'localhost'") && s.contains("`app_test`.*")));
        assert!(grants
            .iter()
            .any(|s| s.contains("TO 'dev'@'127.0.0.1'") && s.contains("`app_test`.*")));
    }

    #[test]
    fn test_mysql_creates_user_for_both_hosts() {
        let statements = build_script(&request(Engine::Mysql, "app_test")).unwrap();
        let creates: Vec<&String> = statements
            .iter()
            .filter(|s| s.starts_with("CREATE USER IF NOT EXISTS"))
            .collect();
        assert_eq!(creates.len(), 2);
        assert!(creates.iter().all(|s| s.contains("IDENTIFIED BY 'dev'")));
    }

    #[test]
    fn test_postgresql_script_sequence() {
        let statements = build_script(&request(Engine::Postgresql, "app_test")).unwrap();
        assert_eq!(statements.len(), 3);
        assert_eq!(statements[0], "DROP DATABASE IF EXISTS \"app_test\"");
        assert!(statements[1].starts_with("CREATE DATABASE \"app_test\" WITH TEMPLATE template0"));
        assert!(statements[1].contains("ENCODING 'UTF-8'"));
        assert!(statements[1].contains("LC_COLLATE 'en_US.UTF-8'"));
    }

    #[test]
    fn test_postgresql_has_exactly_one_grant() {
        let statements = build_script(&request(Engine::Postgresql, "app_test")).unwrap();
        let grants: Vec<&String> = statements
            .iter()
            .filter(|s| s.starts_with("GRANT"))
            .collect();
        assert_eq!(grants.len(), 1);
        assert_eq!(
            grants[0],
            "GRANT ALL PRIVILEGES ON DATABASE \"app_test\" TO \"dev\""
        );
    }

    #[test]
    fn test_unsafe_database_name_rejected() {
        assert!(build_script(&request(Engine::Mysql, "app;DROP TABLE users")).is_err());
        assert!(build_script(&request(Engine::Mysql, "app`test")).is_err());
        assert!(build_script(&request(Engine::Postgresql, "app\"test")).is_err());
    }

    #[test]
    fn test_unsafe_username_rejected() {
        let mut req = request(Engine::Mysql, "app_test");
        req.app_username = "dev'@'%".to_string();
        assert!(build_script(&req).is_err());
    }

    #[test]
    fn test_password_is_escaped_not_rejected() {
        let mut req = request(Engine::Mysql, "app_test");
        req.app_password = "it's\\a\npass".to_string();
        let statements = build_script(&req).unwrap();
        let create_user = statements
            .iter()
            .find(|s| s.starts_with("CREATE USER"))
            .unwrap();
        assert!(create_user.contains("IDENTIFIED BY 'it''s\\\\a\\npass'"));
    }

    #[test]
    fn test_escape_mysql_string() {
        assert_eq!(escape_mysql_string("plain"), "plain");
        assert_eq!(escape_mysql_string("a'b"), "a''b");
        assert_eq!(escape_mysql_string("a\\b"), "a\\\\b");
        assert_eq!(escape_mysql_string("a\0b"), "a\\0b");
        assert_eq!(escape_mysql_string("a\nb\rc"), "a\\nb\\rc");
        assert_eq!(escape_mysql_string("a\x1ab"), "a\\Zb");
        assert_eq!(escape_mysql_string(""), "");
    }

    #[test]
    fn test_request_debug_redacts_password() {
        let mut req = request(Engine::Mysql, "app_test");
        req.app_password = "hunter2".to_string();
        let rendered = format!("{req:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
