//! Applied-version bookkeeping in the target database.
//!
//! One well-known table records which versions have been applied. A row is
//! inserted by a successful forward execution and deleted by a successful
//! reverse execution, always inside the migration's own transaction. The
//! unique constraint on `version_id` is the only cross-process safety net.

use sqlx::{PgConnection, PgPool, Row};

use crate::error::{MigrateError, MigrateResult};

/// Name of the tracking table.
pub const TRACKING_TABLE: &str = "migration_db_version";

pub(crate) fn create_table_sql() -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {TRACKING_TABLE} (\n    \
            id BIGSERIAL PRIMARY KEY,\n    \
            version_id BIGINT NOT NULL UNIQUE,\n    \
            created TIMESTAMPTZ NOT NULL DEFAULT now()\n\
        )"
    )
}

pub(crate) fn exists_sql() -> String {
    format!("SELECT 1 FROM {TRACKING_TABLE} WHERE version_id = $1 LIMIT 1")
}

pub(crate) fn insert_sql() -> String {
    format!("INSERT INTO {TRACKING_TABLE} (version_id) VALUES ($1)")
}

pub(crate) fn delete_sql() -> String {
    format!("DELETE FROM {TRACKING_TABLE} WHERE version_id = $1")
}

pub(crate) fn applied_above_sql() -> String {
    format!(
        "SELECT version_id FROM {TRACKING_TABLE} WHERE version_id > $1 ORDER BY version_id ASC"
    )
}

/// Create the tracking table if it does not exist yet. Idempotent.
pub async fn ensure_table(pool: &PgPool) -> MigrateResult<()> {
    sqlx::query(&create_table_sql()).execute(pool).await?;
    Ok(())
}

/// Whether `version` is recorded as applied, scoped to the caller's
/// transaction.
pub async fn is_applied(conn: &mut PgConnection, version: i64) -> MigrateResult<bool> {
    let row = sqlx::query(&exists_sql())
        .bind(version)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row.is_some())
}

/// Record `version` as applied. The unique constraint is authoritative: a
/// violation surfaces as [`MigrateError::DuplicateApplication`] even when
/// the [`is_applied`] guard raced with another migrator.
pub async fn mark_applied(conn: &mut PgConnection, version: i64) -> MigrateResult<()> {
    sqlx::query(&insert_sql())
        .bind(version)
        .execute(&mut *conn)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                MigrateError::DuplicateApplication(version)
            }
            other => MigrateError::Database(other),
        })?;
    Ok(())
}

/// Delete the applied marker for `version`. Deleting an absent row is a
/// silent no-op; the migration's own reverse action is the ultimate
/// consistency check.
pub async fn mark_reverted(conn: &mut PgConnection, version: i64) -> MigrateResult<()> {
    sqlx::query(&delete_sql())
        .bind(version)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Applied versions strictly greater than `version`, ascending.
pub async fn applied_above(pool: &PgPool, version: i64) -> MigrateResult<Vec<i64>> {
    let rows = sqlx::query(&applied_above_sql())
        .bind(version)
        .fetch_all(pool)
        .await?;

    let mut versions = Vec::with_capacity(rows.len());
    for row in rows {
        versions.push(row.try_get("version_id")?);
    }
    Ok(versions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_table_is_idempotent_and_constrained() {
        let sql = create_table_sql();
        assert!(sql.contains("CREATE TABLE IF NOT EXISTS migration_db_version"));
        assert!(sql.contains("id BIGSERIAL PRIMARY KEY"));
        assert!(sql.contains("version_id BIGINT NOT NULL UNIQUE"));
        assert!(sql.contains("created TIMESTAMPTZ NOT NULL DEFAULT now()"));
    }

    #[test]
    fn existence_check_is_parameterized() {
        let sql = exists_sql();
        assert!(sql.contains("SELECT 1 FROM migration_db_version"));
        assert!(sql.contains("version_id = $1"));
        assert!(sql.contains("LIMIT 1"));
    }

    #[test]
    fn insert_and_delete_target_the_version_column() {
        assert_eq!(
            insert_sql(),
            "INSERT INTO migration_db_version (version_id) VALUES ($1)"
        );
        assert_eq!(
            delete_sql(),
            "DELETE FROM migration_db_version WHERE version_id = $1"
        );
    }

    #[test]
    fn range_query_is_strictly_above_and_ascending() {
        let sql = applied_above_sql();
        assert!(sql.contains("version_id > $1"));
        assert!(sql.contains("ORDER BY version_id ASC"));
    }
}
