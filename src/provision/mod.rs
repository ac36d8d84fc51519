//! Provisioning orchestration.
//!
//! Top-level driver: resolves the effective database name, loads superuser
//! credentials, builds the engine-specific script, and executes it per
//! requested engine. Per-engine failures are collected, never thrown past
//! the loop; every requested engine is attempted.

use std::time::Duration;

use tracing::{error, info};

use crate::config::Settings;
use crate::credentials::CredentialStore;
use crate::engine::Engine;
use crate::error::{CredentialErrorKind, ProvisionError, ProvisionResult};
use crate::executor::{execute_script, ExecuteOptions};
use crate::naming;
use crate::script::{build_script, ProvisionRequest};

/// The result of provisioning one engine.
#[derive(Debug)]
pub struct EngineOutcome {
    pub engine: Engine,
    pub database: String,
    pub result: ProvisionResult<()>,
}

impl EngineOutcome {
    /// True if this engine was provisioned successfully.
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Aggregate result of one provisioning invocation.
#[derive(Debug)]
pub struct ProvisionReport {
    /// The resolved database name the invocation targeted.
    pub database: String,
    /// One outcome per requested engine, in configuration order.
    pub outcomes: Vec<EngineOutcome>,
}

impl ProvisionReport {
    /// True only if every requested engine succeeded.
    pub fn succeeded(&self) -> bool {
        self.outcomes.iter().all(EngineOutcome::succeeded)
    }

    /// Process exit code: zero when all engines succeeded.
    pub fn exit_code(&self) -> u8 {
        if self.succeeded() {
            0
        } else {
            1
        }
    }

    /// The failed outcomes, if any.
    pub fn failures(&self) -> impl Iterator<Item = &EngineOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded())
    }
}

/// Orchestrates provisioning across the configured engines.
pub struct Provisioner {
    settings: Settings,
}

impl Provisioner {
    /// Create a provisioner for the given settings.
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Drop and recreate the primary database on every configured engine.
    pub async fn provision_primary(&self) -> ProvisionResult<ProvisionReport> {
        let database = naming::resolve_primary(
            self.settings.project.database_name.as_deref(),
            &self.settings.project.identifier,
        );
        self.provision(database).await
    }

    /// Drop and recreate the test database on every configured engine.
    pub async fn provision_test(&self) -> ProvisionResult<ProvisionReport> {
        let database = naming::resolve_test(
            self.settings.project.test_database_name.as_deref(),
            self.settings.project.database_name.as_deref(),
            &self.settings.project.identifier,
        );
        self.provision(database).await
    }

    async fn provision(&self, database: String) -> ProvisionResult<ProvisionReport> {
        if database.is_empty() {
            return Err(ProvisionError::Config {
                message: "Resolved database name is empty; set [project].database_name \
                          or a non-empty [project].identifier"
                    .to_string(),
            });
        }

        let engines = self.requested_engines()?;

        // Loaded once per invocation. A load failure is reported per engine
        // rather than aborting the invocation, so the report still carries
        // one outcome for every requested engine.
        let store = CredentialStore::load(&self.settings.credentials.file);

        let mut outcomes = Vec::with_capacity(engines.len());
        for engine in engines {
            let result = match &store {
                Ok(store) => self.provision_engine(engine, &database, store).await,
                Err(e) => Err(unreadable_store_error(e)),
            };

            match &result {
                Ok(()) => info!(
                    engine = engine.id(),
                    database = %database,
                    "Database provisioned"
                ),
                Err(e) => error!(
                    engine = engine.id(),
                    database = %database,
                    error = %e,
                    "Provisioning failed"
                ),
            }

            outcomes.push(EngineOutcome {
                engine,
                database: database.clone(),
                result,
            });
        }

        Ok(ProvisionReport { database, outcomes })
    }

    async fn provision_engine(
        &self,
        engine: Engine,
        database: &str,
        store: &CredentialStore,
    ) -> ProvisionResult<()> {
        let credentials = store.require(engine)?;

        let request = ProvisionRequest {
            engine,
            database: database.to_string(),
            app_username: self.settings.project.app_username.clone(),
            app_password: self.settings.project.app_password.clone(),
        };
        let statements = build_script(&request)?;

        info!("Creating {} database [{}]", engine.display_name(), database);

        let opts = ExecuteOptions {
            connect_timeout: Duration::from_secs(self.settings.limits.connect_timeout_seconds),
            statement_timeout: Duration::from_secs(self.settings.limits.statement_timeout_seconds),
            autocommit: true,
        };
        execute_script(engine, database, &statements, &credentials, &opts).await
    }

    /// The engines requested in configuration order.
    ///
    /// An empty list or an unknown engine identifier is a configuration
    /// error; nothing is silently skipped.
    fn requested_engines(&self) -> ProvisionResult<Vec<Engine>> {
        let ids = &self.settings.project.engines;
        if ids.is_empty() {
            return Err(ProvisionError::Config {
                message: "No database engines configured; set [project].engines".to_string(),
            });
        }

        ids.iter()
            .map(|id| {
                Engine::lookup(id).ok_or_else(|| ProvisionError::Config {
                    message: format!(
                        "Unknown database engine '{}'. Supported engines: {}",
                        id,
                        Engine::ALL
                            .iter()
                            .map(Engine::id)
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                })
            })
            .collect()
    }
}

/// Rebuild a per-engine credential failure from a shared load error.
///
/// `ProvisionError` is not `Clone`, and the same unreadable file affects
/// every engine in the loop.
fn unreadable_store_error(error: &ProvisionError) -> ProvisionError {
    let (path, message) = match error {
        ProvisionError::Credential {
            kind: CredentialErrorKind::Unreadable { path, message },
        } => (path.clone(), message.clone()),
        other => (Default::default(), other.to_string()),
    };
    ProvisionError::Credential {
        kind: CredentialErrorKind::Unreadable { path, message },
    }
}
