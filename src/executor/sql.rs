//! Statement batch execution against an engine's administrative database.
//!
//! DROP/CREATE DATABASE must run outside the database being dropped, so the
//! connection always targets the engine's administrative database with the
//! superuser credentials. A statement failure aborts the remainder of the
//! batch; nothing is retried.

use std::time::Duration;

use sqlx::mysql::MySqlConnection;
use sqlx::postgres::PgConnection;
use sqlx::Connection;
use tracing::{debug, warn};

use crate::credentials::Credentials;
use crate::engine::Engine;
use crate::error::{ExecutionErrorKind, ProvisionError, ProvisionResult};

/// Options controlling batch execution.
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Maximum time to wait for the connection to be established.
    pub connect_timeout: Duration,
    /// Maximum time for the whole statement batch.
    pub statement_timeout: Duration,
    /// When false, the batch is wrapped in BEGIN/COMMIT. Provisioning
    /// always runs with autocommit since CREATE DATABASE cannot execute
    /// inside a transaction.
    pub autocommit: bool,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            statement_timeout: Duration::from_secs(30),
            autocommit: true,
        }
    }
}

/// A live connection to an engine's administrative database.
enum AdminConnection {
    Mysql(MySqlConnection),
    Postgres(PgConnection),
}

impl AdminConnection {
    async fn connect(engine: Engine, url: &str) -> Result<Self, sqlx::Error> {
        match engine {
            Engine::Mysql => MySqlConnection::connect(url)
                .await
                .map(AdminConnection::Mysql),
            Engine::Postgresql => PgConnection::connect(url)
                .await
                .map(AdminConnection::Postgres),
        }
    }

    /// Execute one statement over the simple query protocol. DDL such as
    /// CREATE DATABASE must not go through a prepared statement.
    async fn execute(&mut self, sql: &str) -> Result<(), sqlx::Error> {
        match self {
            AdminConnection::Mysql(conn) => {
                sqlx::raw_sql(sql).execute(&mut *conn).await?;
            }
            AdminConnection::Postgres(conn) => {
                sqlx::raw_sql(sql).execute(&mut *conn).await?;
            }
        }
        Ok(())
    }

    async fn close(self) -> Result<(), sqlx::Error> {
        match self {
            AdminConnection::Mysql(conn) => conn.close().await,
            AdminConnection::Postgres(conn) => conn.close().await,
        }
    }
}

/// Execute a statement batch against the engine's administrative database.
///
/// Statements run in order on a single connection; the first failure aborts
/// the remainder and is reported with the driver's native error message.
/// Connection failures (unreachable server, rejected authentication) are a
/// distinct error kind from statement failures, and both the connection
/// attempt and the batch honor their configured timeouts.
pub async fn execute_script(
    engine: Engine,
    target_database: &str,
    statements: &[String],
    credentials: &Credentials,
    opts: &ExecuteOptions,
) -> ProvisionResult<()> {
    let url = engine.admin_url(&credentials.username, &credentials.password);

    debug!(
        engine = engine.id(),
        target = target_database,
        admin_database = engine.admin_database(),
        statements = statements.len(),
        "Connecting to administrative database"
    );

    let mut conn = match tokio::time::timeout(
        opts.connect_timeout,
        AdminConnection::connect(engine, &url),
    )
    .await
    {
        Ok(Ok(conn)) => conn,
        Ok(Err(e)) => {
            return Err(ProvisionError::Execution {
                kind: ExecutionErrorKind::Connection {
                    message: e.to_string(),
                },
            });
        }
        Err(_) => {
            return Err(ProvisionError::Execution {
                kind: ExecutionErrorKind::Timeout {
                    phase: "Connection attempt",
                    timeout_secs: opts.connect_timeout.as_secs(),
                },
            });
        }
    };

    let outcome = match tokio::time::timeout(
        opts.statement_timeout,
        run_batch(&mut conn, statements, opts.autocommit),
    )
    .await
    {
        Ok(result) => result,
        Err(_) => Err(ProvisionError::Execution {
            kind: ExecutionErrorKind::Timeout {
                phase: "Statement batch",
                timeout_secs: opts.statement_timeout.as_secs(),
            },
        }),
    };

    if let Err(e) = conn.close().await {
        warn!(engine = engine.id(), error = %e, "Failed to close connection cleanly");
    }

    outcome
}

async fn run_batch(
    conn: &mut AdminConnection,
    statements: &[String],
    autocommit: bool,
) -> ProvisionResult<()> {
    if !autocommit {
        run_statement(conn, "BEGIN").await?;
    }

    for statement in statements {
        run_statement(conn, statement).await?;
    }

    if !autocommit {
        run_statement(conn, "COMMIT").await?;
    }

    Ok(())
}

async fn run_statement(conn: &mut AdminConnection, statement: &str) -> ProvisionResult<()> {
    // Statements may embed passwords, so only the leading keywords are
    // logged or carried into error messages.
    let summary = statement_summary(statement);
    debug!(statement = %summary, "Executing statement");

    conn.execute(statement)
        .await
        .map_err(|e| ProvisionError::Execution {
            kind: ExecutionErrorKind::Statement {
                statement: summary,
                message: e.to_string(),
            },
        })
}

/// The leading keywords of a statement, safe to log and embed in errors.
pub fn statement_summary(statement: &str) -> String {
    statement
        .split_whitespace()
        .take(3)
        .collect::<Vec<_>>()
        .join(" ")
}
