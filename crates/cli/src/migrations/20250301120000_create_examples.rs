//! Migration: create examples
//! Version: 20250301120000

use sqlstep_migrate::{ActionFuture, MigrateResult, MigrationRegistry};
use sqlx::PgConnection;

pub fn register(registry: &mut MigrationRegistry) -> MigrateResult<()> {
    registry.register(
        "20250301120000_create_examples.rs",
        up_create_examples,
        down_create_examples,
    )
}

fn up_create_examples(conn: &mut PgConnection) -> ActionFuture<'_> {
    Box::pin(async move {
        sqlx::query(
            "CREATE TABLE examples (\n    \
                id BIGSERIAL PRIMARY KEY,\n    \
                label TEXT NOT NULL\n\
            )",
        )
        .execute(&mut *conn)
        .await?;
        Ok(())
    })
}

fn down_create_examples(conn: &mut PgConnection) -> ActionFuture<'_> {
    Box::pin(async move {
        sqlx::query("DROP TABLE IF EXISTS examples")
            .execute(&mut *conn)
            .await?;
        Ok(())
    })
}
