//! Superuser credential loading.
//!
//! Reads per-engine administrative credentials from a flat key-value
//! properties file. Keys follow the pattern `<engineId>.db.username` and
//! `<engineId>.db.password`. The file is maintained outside this tool and
//! is only ever read.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

use crate::engine::Engine;
use crate::error::{CredentialErrorKind, ProvisionError, ProvisionResult};

/// Administrative username/password pair for one engine.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Credential entries loaded from a properties file.
#[derive(Debug)]
pub struct CredentialStore {
    entries: HashMap<String, String>,
}

impl CredentialStore {
    /// A store with no entries.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Load credentials from a properties file.
    ///
    /// A nonexistent file yields an empty store; the absence of credentials
    /// only becomes an error once an engine that needs them is requested.
    /// Any other read failure (permission denied, path is a directory) is
    /// reported as an unreadable credentials file.
    pub fn load<P: AsRef<Path>>(path: P) -> ProvisionResult<Self> {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "Credentials file not found, using empty store");
                return Ok(Self::empty());
            }
            Err(e) => {
                return Err(ProvisionError::Credential {
                    kind: CredentialErrorKind::Unreadable {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    },
                });
            }
        };

        let store = Self::parse(&content);
        debug!(
            path = %path.display(),
            entries = store.entries.len(),
            "Credentials file loaded"
        );
        Ok(store)
    }

    /// Parse properties-format content into a store.
    ///
    /// Blank lines and lines starting with `#` or `!` are ignored. The
    /// first `=` separates key from value; both sides are trimmed.
    fn parse(content: &str) -> Self {
        let mut entries = HashMap::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                entries.insert(key.trim().to_string(), value.trim().to_string());
            }
        }
        Self { entries }
    }

    /// Get the credentials for an engine, if both username and password
    /// entries are present.
    pub fn get(&self, engine: Engine) -> Option<Credentials> {
        let username = self.entries.get(&username_key(engine))?;
        let password = self.entries.get(&password_key(engine))?;
        Some(Credentials {
            username: username.clone(),
            password: password.clone(),
        })
    }

    /// Get the credentials for an engine, reporting the missing key as a
    /// credential error when either entry is absent.
    pub fn require(&self, engine: Engine) -> ProvisionResult<Credentials> {
        let username = self
            .entries
            .get(&username_key(engine))
            .ok_or_else(|| missing_entry(engine, username_key(engine)))?;
        let password = self
            .entries
            .get(&password_key(engine))
            .ok_or_else(|| missing_entry(engine, password_key(engine)))?;
        Ok(Credentials {
            username: username.clone(),
            password: password.clone(),
        })
    }

    /// Number of raw entries in the store.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn username_key(engine: Engine) -> String {
    format!("{}.db.username", engine.id())
}

fn password_key(engine: Engine) -> String {
    format!("{}.db.password", engine.id())
}

fn missing_entry(engine: Engine, key: String) -> ProvisionError {
    ProvisionError::Credential {
        kind: CredentialErrorKind::MissingEntry {
            engine: engine.id(),
            key,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_nonexistent_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::load(dir.path().join("missing.properties")).unwrap();
        assert!(store.is_empty());
        assert!(store.get(Engine::Mysql).is_none());
    }

    #[test]
    fn test_load_directory_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let err = CredentialStore::load(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            ProvisionError::Credential {
                kind: CredentialErrorKind::Unreadable { .. }
            }
        ));
    }

    #[test]
    fn test_parse_basic_entries() {
        let store = CredentialStore::parse(
            "mysql.db.username=root\nmysql.db.password=secret\n",
        );
        let creds = store.get(Engine::Mysql).unwrap();
        assert_eq!(creds.username, "root");
        assert_eq!(creds.password, "secret");
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let store = CredentialStore::parse(
            "# comment\n! also a comment\n\n  postgresql.db.username = postgres \n postgresql.db.password = pw\n",
        );
        let creds = store.get(Engine::Postgresql).unwrap();
        assert_eq!(creds.username, "postgres");
        assert_eq!(creds.password, "pw");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_value_may_contain_equals() {
        let store = CredentialStore::parse("mysql.db.username=root\nmysql.db.password=a=b=c\n");
        assert_eq!(store.get(Engine::Mysql).unwrap().password, "a=b=c");
    }

    #[test]
    fn test_require_reports_missing_key() {
        let store = CredentialStore::parse("mysql.db.username=root\n");
        let err = store.require(Engine::Mysql).unwrap_err();
        match err {
            ProvisionError::Credential {
                kind: CredentialErrorKind::MissingEntry { engine, key },
            } => {
                assert_eq!(engine, "mysql");
                assert_eq!(key, "mysql.db.password");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_entries_are_scoped_per_engine() {
        let store = CredentialStore::parse("mysql.db.username=root\nmysql.db.password=secret\n");
        assert!(store.get(Engine::Mysql).is_some());
        assert!(store.get(Engine::Postgresql).is_none());
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials {
            username: "root".to_string(),
            password: "hunter2".to_string(),
        };
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("root"));
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
