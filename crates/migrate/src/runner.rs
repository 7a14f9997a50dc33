//! Run strategies over migration batches.
//!
//! Every strategy ensures the tracking table exists, computes its target
//! list, then executes one migration at a time in order, aborting the whole
//! batch at the first failure. Execution is strictly sequential; migrations
//! may depend on schema state left by earlier ones.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::error::{MigrateError, MigrateResult};
use crate::executor::{self, ApplyOutcome, Direction};
use crate::registry::MigrationRegistry;
use crate::tracking;

/// Summary of a completed run strategy.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Versions whose action actually ran, in execution order.
    pub executed: Vec<i64>,
    /// Forward migrations skipped because they were already applied.
    pub skipped: usize,
}

/// Executes run strategies against one database with one registry.
pub struct MigrationRunner<'r> {
    registry: &'r MigrationRegistry,
    pool: PgPool,
}

impl<'r> MigrationRunner<'r> {
    pub fn new(registry: &'r MigrationRegistry, pool: PgPool) -> Self {
        Self { registry, pool }
    }

    /// Open a pool from a connection string and wrap it in a runner.
    pub async fn from_url(
        registry: &'r MigrationRegistry,
        database_url: &str,
    ) -> MigrateResult<Self> {
        let pool = PgPoolOptions::new()
            .connect(database_url)
            .await
            .map_err(|err| MigrateError::Connection(err.to_string()))?;
        Ok(Self::new(registry, pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply every registered migration forward, ascending by version.
    ///
    /// Already-applied versions are skipped per migration, so re-running
    /// after a partial failure resumes where the previous run stopped.
    pub async fn run_up(&self) -> MigrateResult<RunSummary> {
        tracking::ensure_table(&self.pool).await?;
        let list = self.registry.ordered()?;

        info!(count = list.len(), "running up migrations");
        let mut summary = RunSummary::default();
        for migration in list {
            info!(
                version = migration.version(),
                source = migration.source(),
                "applying migration"
            );
            match executor::apply(&self.pool, migration, Direction::Up).await? {
                ApplyOutcome::Applied => summary.executed.push(migration.version()),
                ApplyOutcome::Skipped => summary.skipped += 1,
            }
        }
        Ok(summary)
    }

    /// Run every registered migration's reverse action.
    ///
    /// Iterates the same ascending version order as [`run_up`], so reverse
    /// actions run oldest-first. Callers that need newest-first rollback
    /// across dependent schema objects should use [`run_down_to`] with a
    /// low target instead.
    ///
    /// [`run_up`]: MigrationRunner::run_up
    /// [`run_down_to`]: MigrationRunner::run_down_to
    pub async fn run_down(&self) -> MigrateResult<RunSummary> {
        tracking::ensure_table(&self.pool).await?;
        let list = self.registry.ordered()?;

        info!(count = list.len(), "running down migrations");
        let mut summary = RunSummary::default();
        for migration in list {
            info!(
                version = migration.version(),
                source = migration.source(),
                "reverting migration"
            );
            executor::apply(&self.pool, migration, Direction::Down).await?;
            summary.executed.push(migration.version());
        }
        Ok(summary)
    }

    /// Apply exactly the migration registered at `version`.
    ///
    /// Only the named version runs; any unapplied versions below it are the
    /// caller's responsibility. Fails with
    /// [`MigrateError::VersionNotFound`] when the version was never
    /// registered.
    pub async fn run_up_to(&self, version: i64) -> MigrateResult<RunSummary> {
        tracking::ensure_table(&self.pool).await?;
        let migration = self
            .registry
            .get(version)
            .ok_or(MigrateError::VersionNotFound(version))?;

        info!(version, source = migration.source(), "applying migration");
        let mut summary = RunSummary::default();
        match executor::apply(&self.pool, migration, Direction::Up).await? {
            ApplyOutcome::Applied => summary.executed.push(version),
            ApplyOutcome::Skipped => summary.skipped += 1,
        }
        Ok(summary)
    }

    /// Revert every applied version strictly greater than `version`,
    /// ascending.
    ///
    /// The target list comes from the tracking table, not the registry, so
    /// only versions actually applied are touched. Fails with
    /// [`MigrateError::EmptyRange`] when nothing is applied above the
    /// target, and with [`MigrateError::VersionNotFound`] when an applied
    /// version has no registered migration to revert with.
    pub async fn run_down_to(&self, version: i64) -> MigrateResult<RunSummary> {
        tracking::ensure_table(&self.pool).await?;

        let applied = tracking::applied_above(&self.pool, version).await?;
        if applied.is_empty() {
            return Err(MigrateError::EmptyRange(version));
        }

        info!(count = applied.len(), above = version, "running down migrations");
        let mut summary = RunSummary::default();
        for v in applied {
            let migration = self
                .registry
                .get(v)
                .ok_or(MigrateError::VersionNotFound(v))?;
            info!(
                version = v,
                source = migration.source(),
                "reverting migration"
            );
            executor::apply(&self.pool, migration, Direction::Down).await?;
            summary.executed.push(v);
        }
        Ok(summary)
    }
}
