//! Configuration settings for devdb.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ProvisionError;

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub project: ProjectConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Project configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    /// Project identifier, used to derive database names when none are
    /// configured (e.g. "my.app-name" derives "my_app_name").
    pub identifier: String,
    /// Engines to provision, in order (e.g. ["mysql", "postgresql"]).
    pub engines: Vec<String>,
    /// Explicit primary database name. Derived from the identifier when unset.
    pub database_name: Option<String>,
    /// Explicit test database name. Derived as "<primary>_test" when unset.
    pub test_database_name: Option<String>,
    /// Application-level user granted privileges on the created database.
    #[serde(default = "default_app_username")]
    pub app_username: String,
    /// Password for the application-level user.
    #[serde(default = "default_app_password")]
    pub app_password: String,
}

/// Credentials file configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsConfig {
    /// Path to the superuser credentials properties file.
    #[serde(default = "default_credentials_file")]
    pub file: PathBuf,
}

/// Timeout limits.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Maximum time to wait for a database connection, in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Maximum time for one engine's statement batch, in seconds.
    #[serde(default = "default_statement_timeout")]
    pub statement_timeout_seconds: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format ("pretty" or "json").
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_app_username() -> String {
    "dev".to_string()
}

fn default_app_password() -> String {
    "dev".to_string()
}

fn default_credentials_file() -> PathBuf {
    PathBuf::from("database.properties")
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_statement_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            file: default_credentials_file(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            connect_timeout_seconds: default_connect_timeout(),
            statement_timeout_seconds: default_statement_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ProvisionError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ProvisionError::Config {
            message: format!("Failed to read config file '{}': {}", path.display(), e),
        })?;

        let settings: Settings = toml::from_str(&content).map_err(|e| ProvisionError::Config {
            message: format!("Failed to parse config file '{}': {}", path.display(), e),
        })?;

        settings.validate()?;

        Ok(settings)
    }

    /// Validate the settings.
    fn validate(&self) -> Result<(), ProvisionError> {
        // Validate log level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ProvisionError::Config {
                message: format!(
                    "Invalid log level '{}'. Valid levels: {:?}",
                    self.logging.level, valid_levels
                ),
            });
        }

        // Validate log format
        let valid_formats = ["pretty", "json"];
        if !valid_formats.contains(&self.logging.format.to_lowercase().as_str()) {
            return Err(ProvisionError::Config {
                message: format!(
                    "Invalid log format '{}'. Valid formats: {:?}",
                    self.logging.format, valid_formats
                ),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        assert_eq!(default_app_username(), "dev");
        assert_eq!(default_app_password(), "dev");
        assert_eq!(default_credentials_file(), PathBuf::from("database.properties"));
        assert_eq!(default_log_level(), "info");
        assert_eq!(default_log_format(), "pretty");
    }

    #[test]
    fn test_minimal_config_applies_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [project]
            identifier = "my.app"
            engines = ["mysql"]
            "#,
        )
        .unwrap();
        assert_eq!(settings.project.app_username, "dev");
        assert_eq!(settings.project.app_password, "dev");
        assert_eq!(settings.credentials.file, PathBuf::from("database.properties"));
        assert_eq!(settings.limits.connect_timeout_seconds, 10);
        assert_eq!(settings.limits.statement_timeout_seconds, 30);
        assert!(settings.project.database_name.is_none());
        assert!(settings.project.test_database_name.is_none());
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let settings: Settings = toml::from_str(
            r#"
            [project]
            identifier = "my.app"
            engines = ["mysql"]

            [logging]
            level = "loud"
            "#,
        )
        .unwrap();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devdb.toml");
        std::fs::write(
            &path,
            r#"
            [project]
            identifier = "my.app"
            engines = ["mysql", "postgresql"]
            database_name = "custom"

            [credentials]
            file = "/etc/devdb/database.properties"
            "#,
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.project.engines, vec!["mysql", "postgresql"]);
        assert_eq!(settings.project.database_name.as_deref(), Some("custom"));
        assert_eq!(
            settings.credentials.file,
            PathBuf::from("/etc/devdb/database.properties")
        );
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let err = Settings::load("/nonexistent/devdb.toml").unwrap_err();
        assert!(matches!(err, ProvisionError::Config { .. }));
    }
}
