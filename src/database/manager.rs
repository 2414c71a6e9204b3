use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::codec::DecodeError;
use crate::database::relationships::ModelError;

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(String),

    #[error("Constraint violation on {constraint}: {detail}")]
    ConstraintViolation { constraint: String, detail: String },

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("Commit failed: {message}")]
    CommitFailure { transient: bool, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unknown column '{column}' on {table}")]
    UnknownColumn { table: &'static str, column: String },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    pub fn constraint(constraint: impl Into<String>, detail: impl Into<String>) -> Self {
        DatabaseError::ConstraintViolation {
            constraint: constraint.into(),
            detail: detail.into(),
        }
    }

    /// Classify a driver error raised while writing a pending change.
    ///
    /// Constraint failures reported by the engine become `ConstraintViolation`;
    /// everything else is a `CommitFailure`, flagged transient when the engine
    /// was busy or the pool could not hand out a connection in time.
    pub fn from_write(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            let message = db_err.message().to_string();
            match db_err.kind() {
                sqlx::error::ErrorKind::UniqueViolation => {
                    return DatabaseError::constraint(unique_target(&message), message);
                }
                sqlx::error::ErrorKind::ForeignKeyViolation => {
                    return DatabaseError::constraint("foreign key", message);
                }
                sqlx::error::ErrorKind::NotNullViolation | sqlx::error::ErrorKind::CheckViolation => {
                    return DatabaseError::constraint("column", message);
                }
                _ => {}
            }
            if message.contains("UNIQUE constraint failed") {
                return DatabaseError::constraint(unique_target(&message), message);
            }
            if message.contains("FOREIGN KEY constraint failed") {
                return DatabaseError::constraint("foreign key", message);
            }
        }
        DatabaseError::commit_failure(err)
    }

    pub fn commit_failure(err: sqlx::Error) -> Self {
        let transient = match &err {
            sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => true,
            sqlx::Error::Database(db_err) => {
                // SQLITE_BUSY (5) and SQLITE_LOCKED (6), including extended codes
                db_err
                    .code()
                    .and_then(|code| code.parse::<i32>().ok())
                    .map(|code| matches!(code & 0xff, 5 | 6))
                    .unwrap_or(false)
            }
            _ => false,
        };
        DatabaseError::CommitFailure {
            transient,
            message: err.to_string(),
        }
    }
}

fn unique_target(message: &str) -> String {
    match message.split_once("UNIQUE constraint failed: ") {
        Some((_, columns)) => format!("unique({})", columns.trim()),
        None => "unique".to_string(),
    }
}

/// Open the connection pool described by `config`.
///
/// Foreign keys are switched on for every pooled connection; the integrity
/// rules of the schema depend on it.
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, DatabaseError> {
    if config.url.trim().is_empty() {
        return Err(DatabaseError::ConfigMissing("DATABASE_URL"));
    }

    let options = SqliteConnectOptions::from_str(&config.url)
        .map_err(|_| DatabaseError::InvalidDatabaseUrl(config.url.clone()))?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms));

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout))
        .connect_with(options)
        .await?;

    info!("Connected to database: {}", config.url);
    Ok(pool)
}

/// Single-connection in-memory pool; the connection is never recycled because
/// an in-memory database lives exactly as long as its connection.
pub async fn connect_in_memory() -> Result<SqlitePool, DatabaseError> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .map_err(|_| DatabaseError::InvalidDatabaseUrl("sqlite::memory:".to_string()))?
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None::<Duration>)
        .max_lifetime(None::<Duration>)
        .connect_with(options)
        .await?;

    Ok(pool)
}
