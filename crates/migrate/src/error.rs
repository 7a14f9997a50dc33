//! Error types for the migration system.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for migration operations
pub type MigrateResult<T> = Result<T, MigrateError>;

/// Error types for migration operations
#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("malformed migration source '{file}': separator '_' not found")]
    MalformedSource { file: String },

    #[error("invalid migration version in '{file}': prefix must be a positive base-10 integer")]
    InvalidVersion { file: String },

    #[error("duplicate migration version {version}: '{file}' conflicts with '{existing}'")]
    DuplicateVersion {
        version: i64,
        file: String,
        existing: String,
    },

    #[error("no migrations registered")]
    EmptyRegistry,

    #[error("migration version {0} not found in registry")]
    VersionNotFound(i64),

    #[error("no applied migrations above version {0}")]
    EmptyRange(i64),

    #[error("migration version {0} is already recorded as applied")]
    DuplicateApplication(i64),

    #[error("migration {version} ({file}) failed: {cause}")]
    MigrationFailed {
        version: i64,
        file: String,
        #[source]
        cause: Box<MigrateError>,
    },

    #[error("failed to open database connection: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("migration file already exists: {0}")]
    FileAlreadyExists(PathBuf),
}
