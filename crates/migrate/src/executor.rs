//! Transactional execution of a single migration.

use sqlx::{PgConnection, PgPool};
use tracing::{info, warn};

use crate::error::{MigrateError, MigrateResult};
use crate::registry::Migration;
use crate::tracking;

/// Direction a migration is executed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Whether an execution performed work or skipped an already-applied
/// forward migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    Skipped,
}

/// Execute one migration in the given direction inside a single
/// transaction, all-or-nothing.
///
/// The bookkeeping write happens before the user action, in the same
/// transaction: if the action fails, the marker rolls back with it and the
/// tracking table never disagrees with the actual schema state. Forward
/// execution of an already-applied version commits a no-op and reports
/// [`ApplyOutcome::Skipped`].
///
/// Any failure after `BEGIN` rolls the transaction back and surfaces as
/// [`MigrateError::MigrationFailed`] carrying the migration's version and
/// source.
pub async fn apply(
    pool: &PgPool,
    migration: &Migration,
    direction: Direction,
) -> MigrateResult<ApplyOutcome> {
    let mut tx = pool.begin().await?;

    match run_in_tx(&mut tx, migration, direction).await {
        Ok(outcome) => {
            tx.commit().await.map_err(|err| failed(migration, err.into()))?;
            Ok(outcome)
        }
        Err(cause) => {
            if let Err(err) = tx.rollback().await {
                warn!(
                    version = migration.version(),
                    error = %err,
                    "rollback after failed migration also failed"
                );
            }
            Err(failed(migration, cause))
        }
    }
}

async fn run_in_tx(
    conn: &mut PgConnection,
    migration: &Migration,
    direction: Direction,
) -> MigrateResult<ApplyOutcome> {
    match direction {
        Direction::Up => {
            if tracking::is_applied(&mut *conn, migration.version).await? {
                info!(
                    version = migration.version,
                    source = migration.source(),
                    "migration already applied, skipping"
                );
                return Ok(ApplyOutcome::Skipped);
            }
            tracking::mark_applied(&mut *conn, migration.version).await?;
            (migration.up)(&mut *conn).await?;
        }
        Direction::Down => {
            tracking::mark_reverted(&mut *conn, migration.version).await?;
            (migration.down)(&mut *conn).await?;
        }
    }
    Ok(ApplyOutcome::Applied)
}

fn failed(migration: &Migration, cause: MigrateError) -> MigrateError {
    MigrateError::MigrationFailed {
        version: migration.version,
        file: migration.source().to_string(),
        cause: Box::new(cause),
    }
}
