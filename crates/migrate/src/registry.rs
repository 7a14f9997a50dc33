//! Migration definitions and the registry that holds them.

use std::collections::BTreeMap;
use std::fmt;

use futures::future::BoxFuture;
use sqlx::PgConnection;

use crate::error::{MigrateError, MigrateResult};
use crate::version::extract_version;

/// Future returned by a migration action.
pub type ActionFuture<'c> = BoxFuture<'c, MigrateResult<()>>;

/// A migration's forward or reverse action, invoked with the connection of
/// the transaction the migration runs in.
pub type MigrationAction =
    Box<dyn for<'c> Fn(&'c mut PgConnection) -> ActionFuture<'c> + Send + Sync>;

/// A registered migration. Immutable once registered.
pub struct Migration {
    pub(crate) file: String,
    pub(crate) version: i64,
    pub(crate) up: MigrationAction,
    pub(crate) down: MigrationAction,
}

impl Migration {
    /// Version number, unique across the registry.
    pub fn version(&self) -> i64 {
        self.version
    }

    /// Originating file path or name, used for diagnostics.
    pub fn source(&self) -> &str {
        &self.file
    }
}

impl fmt::Debug for Migration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Migration")
            .field("version", &self.version)
            .field("file", &self.file)
            .finish_non_exhaustive()
    }
}

/// Explicit, singly-constructed collection of migrations keyed by version.
///
/// Populated by [`register`](MigrationRegistry::register) calls during an
/// initialization phase, then passed by reference into the run strategies.
/// The map is ordered by version, so iteration order is execution order;
/// registration order is irrelevant.
#[derive(Debug, Default)]
pub struct MigrationRegistry {
    migrations: BTreeMap<i64, Migration>,
}

impl MigrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a migration under the version extracted from `source`.
    ///
    /// Fails with [`MigrateError::DuplicateVersion`] when another migration
    /// already claimed the version, reporting both source identifiers.
    pub fn register<U, D>(
        &mut self,
        source: impl Into<String>,
        up: U,
        down: D,
    ) -> MigrateResult<()>
    where
        U: for<'c> Fn(&'c mut PgConnection) -> ActionFuture<'c> + Send + Sync + 'static,
        D: for<'c> Fn(&'c mut PgConnection) -> ActionFuture<'c> + Send + Sync + 'static,
    {
        let file = source.into();
        let version = extract_version(&file)?;

        if let Some(existing) = self.migrations.get(&version) {
            return Err(MigrateError::DuplicateVersion {
                version,
                file,
                existing: existing.file.clone(),
            });
        }

        self.migrations.insert(
            version,
            Migration {
                file,
                version,
                up: Box::new(up),
                down: Box::new(down),
            },
        );
        Ok(())
    }

    /// Look up the migration registered at `version`.
    pub fn get(&self, version: i64) -> Option<&Migration> {
        self.migrations.get(&version)
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    /// Snapshot of every registered migration, ascending by version.
    ///
    /// Versions are unique by construction (duplicates are rejected at
    /// registration), so no tie-break is needed here. Fails with
    /// [`MigrateError::EmptyRegistry`] when nothing is registered.
    pub fn ordered(&self) -> MigrateResult<Vec<&Migration>> {
        if self.migrations.is_empty() {
            return Err(MigrateError::EmptyRegistry);
        }
        Ok(self.migrations.values().collect())
    }
}
