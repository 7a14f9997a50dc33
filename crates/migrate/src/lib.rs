//! sqlstep-migrate: versioned, reversible SQL migrations for Postgres.
//!
//! Migrations are identified by a strictly positive numeric version taken
//! from their source filename (`<version>_<name>.rs`), registered into an
//! explicit [`MigrationRegistry`], and executed one transaction per
//! migration with applied-state bookkeeping kept in the target database.
//! Forward application is idempotent per migration; a failed migration
//! rolls back its bookkeeping row together with its schema effects.
//!
//! ```no_run
//! use sqlstep_migrate::{ActionFuture, MigrationRegistry, MigrationRunner};
//! use sqlx::PgConnection;
//!
//! fn up_create_users(conn: &mut PgConnection) -> ActionFuture<'_> {
//!     Box::pin(async move {
//!         sqlx::query("CREATE TABLE users (id BIGSERIAL PRIMARY KEY)")
//!             .execute(conn)
//!             .await?;
//!         Ok(())
//!     })
//! }
//!
//! fn down_create_users(conn: &mut PgConnection) -> ActionFuture<'_> {
//!     Box::pin(async move {
//!         sqlx::query("DROP TABLE users").execute(conn).await?;
//!         Ok(())
//!     })
//! }
//!
//! # async fn demo() -> sqlstep_migrate::MigrateResult<()> {
//! let mut registry = MigrationRegistry::new();
//! registry.register("1_create_users.rs", up_create_users, down_create_users)?;
//!
//! let runner = MigrationRunner::from_url(&registry, "postgres://localhost/app").await?;
//! runner.run_up().await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod executor;
pub mod registry;
pub mod runner;
pub mod scaffold;
pub mod tracking;
pub mod version;

pub use error::{MigrateError, MigrateResult};
pub use executor::{apply, ApplyOutcome, Direction};
pub use registry::{ActionFuture, Migration, MigrationAction, MigrationRegistry};
pub use runner::{MigrationRunner, RunSummary};
pub use scaffold::create_migration;
pub use tracking::TRACKING_TABLE;
pub use version::extract_version;
