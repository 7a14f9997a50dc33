//! Thin dispatch from parsed CLI arguments to the migration core.

use sqlstep_migrate::{create_migration, MigrateResult, MigrationRunner};
use tracing::info;

use crate::migrations;
use crate::Commands;

pub async fn dispatch(command: Commands) -> MigrateResult<()> {
    match command {
        Commands::Create { name, dir } => create(&name, &dir),
        Commands::Up { conn } => up(&conn).await,
        Commands::UpTo { conn, version } => up_to(&conn, version).await,
        Commands::Down { conn } => down(&conn).await,
        Commands::DownTo { conn, version } => down_to(&conn, version).await,
    }
}

fn create(name: &str, dir: &str) -> MigrateResult<()> {
    let path = create_migration(name, dir)?;
    info!(path = %path.display(), "created migration");
    Ok(())
}

async fn up(conn: &str) -> MigrateResult<()> {
    let registry = migrations::registry()?;
    let runner = MigrationRunner::from_url(&registry, conn).await?;
    let summary = runner.run_up().await?;
    info!(
        applied = summary.executed.len(),
        skipped = summary.skipped,
        "up complete"
    );
    Ok(())
}

async fn up_to(conn: &str, version: i64) -> MigrateResult<()> {
    let registry = migrations::registry()?;
    let runner = MigrationRunner::from_url(&registry, conn).await?;
    let summary = runner.run_up_to(version).await?;
    info!(
        version,
        applied = summary.executed.len(),
        skipped = summary.skipped,
        "up-to complete"
    );
    Ok(())
}

async fn down(conn: &str) -> MigrateResult<()> {
    let registry = migrations::registry()?;
    let runner = MigrationRunner::from_url(&registry, conn).await?;
    let summary = runner.run_down().await?;
    info!(reverted = summary.executed.len(), "down complete");
    Ok(())
}

async fn down_to(conn: &str, version: i64) -> MigrateResult<()> {
    let registry = migrations::registry()?;
    let runner = MigrationRunner::from_url(&registry, conn).await?;
    let summary = runner.run_down_to(version).await?;
    info!(
        version,
        reverted = summary.executed.len(),
        "down-to complete"
    );
    Ok(())
}
