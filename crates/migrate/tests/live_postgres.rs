//! Live-database tests for the execution engine and run strategies.
//!
//! These need a reachable scratch Postgres; set `DATABASE_URL` and run with
//! `cargo test -- --ignored`. Each test resets the tracking table first and
//! `serial_test` keeps them from interleaving.

use std::sync::atomic::{AtomicUsize, Ordering};

use serial_test::serial;
use sqlstep_migrate::{
    apply, tracking, ActionFuture, ApplyOutcome, Direction, MigrateError, MigrationRegistry,
    MigrationRunner,
};
use sqlx::{PgConnection, PgPool};

// Indexed by version; versions 1..=3 are used below.
static UP_CALLS: [AtomicUsize; 4] = [
    AtomicUsize::new(0),
    AtomicUsize::new(0),
    AtomicUsize::new(0),
    AtomicUsize::new(0),
];
static DOWN_CALLS: [AtomicUsize; 4] = [
    AtomicUsize::new(0),
    AtomicUsize::new(0),
    AtomicUsize::new(0),
    AtomicUsize::new(0),
];

fn up_v1(conn: &mut PgConnection) -> ActionFuture<'_> {
    let _ = conn;
    Box::pin(async {
        UP_CALLS[1].fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
}

fn up_v2(conn: &mut PgConnection) -> ActionFuture<'_> {
    let _ = conn;
    Box::pin(async {
        UP_CALLS[2].fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
}

fn up_v3(conn: &mut PgConnection) -> ActionFuture<'_> {
    let _ = conn;
    Box::pin(async {
        UP_CALLS[3].fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
}

fn down_v1(conn: &mut PgConnection) -> ActionFuture<'_> {
    let _ = conn;
    Box::pin(async {
        DOWN_CALLS[1].fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
}

fn down_v2(conn: &mut PgConnection) -> ActionFuture<'_> {
    let _ = conn;
    Box::pin(async {
        DOWN_CALLS[2].fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
}

fn down_v3(conn: &mut PgConnection) -> ActionFuture<'_> {
    let _ = conn;
    Box::pin(async {
        DOWN_CALLS[3].fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
}

// Creates a probe table inside the transaction and then fails, so the test
// can assert both schema effects and the bookkeeping row rolled back.
fn failing_up_v2(conn: &mut PgConnection) -> ActionFuture<'_> {
    Box::pin(async move {
        sqlx::query("CREATE TABLE sqlstep_failure_probe (id BIGINT)")
            .execute(&mut *conn)
            .await?;
        Err(MigrateError::Database(sqlx::Error::RowNotFound))
    })
}

async fn test_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must point at a scratch Postgres database");
    PgPool::connect(&url).await.expect("failed to connect")
}

async fn reset_database(pool: &PgPool) {
    for table in ["migration_db_version", "sqlstep_failure_probe"] {
        sqlx::query(&format!("DROP TABLE IF EXISTS {table}"))
            .execute(pool)
            .await
            .expect("failed to drop table");
    }
    for counter in UP_CALLS.iter().chain(DOWN_CALLS.iter()) {
        counter.store(0, Ordering::SeqCst);
    }
}

fn registry_123() -> MigrationRegistry {
    let mut registry = MigrationRegistry::new();
    registry.register("1_first.rs", up_v1, down_v1).unwrap();
    registry.register("2_second.rs", up_v2, down_v2).unwrap();
    registry.register("3_third.rs", up_v3, down_v3).unwrap();
    registry
}

async fn applied_versions(pool: &PgPool) -> Vec<i64> {
    tracking::applied_above(pool, 0).await.unwrap()
}

fn up_calls(version: usize) -> usize {
    UP_CALLS[version].load(Ordering::SeqCst)
}

fn down_calls(version: usize) -> usize {
    DOWN_CALLS[version].load(Ordering::SeqCst)
}

#[tokio::test]
#[serial]
#[ignore]
async fn run_up_applies_each_exactly_once_and_is_idempotent() {
    let pool = test_pool().await;
    reset_database(&pool).await;

    let registry = registry_123();
    let runner = MigrationRunner::new(&registry, pool.clone());

    let first = runner.run_up().await.unwrap();
    assert_eq!(first.executed, vec![1, 2, 3]);
    assert_eq!(first.skipped, 0);

    let second = runner.run_up().await.unwrap();
    assert!(second.executed.is_empty());
    assert_eq!(second.skipped, 3);

    for v in 1..=3 {
        assert_eq!(up_calls(v), 1, "up action for version {v} ran more than once");
    }
    assert_eq!(applied_versions(&pool).await, vec![1, 2, 3]);
}

#[tokio::test]
#[serial]
#[ignore]
async fn round_trip_up_then_down_empties_the_tracking_table() {
    let pool = test_pool().await;
    reset_database(&pool).await;

    let registry = registry_123();
    let runner = MigrationRunner::new(&registry, pool.clone());

    runner.run_up().await.unwrap();
    let down = runner.run_down().await.unwrap();

    assert_eq!(down.executed, vec![1, 2, 3]);
    for v in 1..=3 {
        assert_eq!(down_calls(v), 1);
    }
    assert!(applied_versions(&pool).await.is_empty());
}

#[tokio::test]
#[serial]
#[ignore]
async fn up_to_applies_only_the_named_version() {
    let pool = test_pool().await;
    reset_database(&pool).await;

    let registry = registry_123();
    let runner = MigrationRunner::new(&registry, pool.clone());

    let summary = runner.run_up_to(2).await.unwrap();
    assert_eq!(summary.executed, vec![2]);

    // Version 1 is deliberately left unapplied; up-to does not fill gaps.
    assert_eq!(up_calls(1), 0);
    assert_eq!(up_calls(2), 1);
    assert_eq!(up_calls(3), 0);
    assert_eq!(applied_versions(&pool).await, vec![2]);
}

#[tokio::test]
#[serial]
#[ignore]
async fn down_to_reverts_applied_versions_above_target_ascending() {
    let pool = test_pool().await;
    reset_database(&pool).await;

    let registry = registry_123();
    let runner = MigrationRunner::new(&registry, pool.clone());
    runner.run_up().await.unwrap();

    let summary = runner.run_down_to(1).await.unwrap();
    assert_eq!(summary.executed, vec![2, 3]);

    assert_eq!(down_calls(1), 0);
    assert_eq!(down_calls(2), 1);
    assert_eq!(down_calls(3), 1);
    assert_eq!(applied_versions(&pool).await, vec![1]);
}

#[tokio::test]
#[serial]
#[ignore]
async fn down_to_with_nothing_applied_above_is_an_empty_range() {
    let pool = test_pool().await;
    reset_database(&pool).await;

    let registry = registry_123();
    let runner = MigrationRunner::new(&registry, pool.clone());

    let err = runner.run_down_to(5).await.unwrap_err();
    assert!(matches!(err, MigrateError::EmptyRange(5)));
}

#[tokio::test]
#[serial]
#[ignore]
async fn failed_migration_rolls_back_and_halts_the_batch() {
    let pool = test_pool().await;
    reset_database(&pool).await;

    let mut registry = MigrationRegistry::new();
    registry.register("1_first.rs", up_v1, down_v1).unwrap();
    registry.register("2_second.rs", failing_up_v2, down_v2).unwrap();
    registry.register("3_third.rs", up_v3, down_v3).unwrap();
    let runner = MigrationRunner::new(&registry, pool.clone());

    let err = runner.run_up().await.unwrap_err();
    assert!(matches!(err, MigrateError::MigrationFailed { version: 2, .. }));

    // Version 1 committed, version 2 rolled back entirely, version 3 never
    // attempted.
    assert_eq!(applied_versions(&pool).await, vec![1]);
    assert_eq!(up_calls(3), 0);

    let probe: Option<String> =
        sqlx::query_scalar("SELECT to_regclass('sqlstep_failure_probe')::text")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(probe.is_none(), "probe table survived the rollback");
}

#[tokio::test]
#[serial]
#[ignore]
async fn up_to_unknown_version_writes_no_rows() {
    let pool = test_pool().await;
    reset_database(&pool).await;

    let registry = registry_123();
    let runner = MigrationRunner::new(&registry, pool.clone());

    let err = runner.run_up_to(99).await.unwrap_err();
    assert!(matches!(err, MigrateError::VersionNotFound(99)));
    assert!(applied_versions(&pool).await.is_empty());
}

#[tokio::test]
#[serial]
#[ignore]
async fn executor_skips_already_applied_forward_migration() {
    let pool = test_pool().await;
    reset_database(&pool).await;

    let registry = registry_123();
    tracking::ensure_table(&pool).await.unwrap();
    let migration = registry.get(1).unwrap();

    assert_eq!(
        apply(&pool, migration, Direction::Up).await.unwrap(),
        ApplyOutcome::Applied
    );
    assert_eq!(
        apply(&pool, migration, Direction::Up).await.unwrap(),
        ApplyOutcome::Skipped
    );
    assert_eq!(up_calls(1), 1);
    assert_eq!(applied_versions(&pool).await, vec![1]);
}

#[tokio::test]
#[serial]
#[ignore]
async fn reverting_an_unapplied_version_is_accepted() {
    let pool = test_pool().await;
    reset_database(&pool).await;

    let registry = registry_123();
    tracking::ensure_table(&pool).await.unwrap();
    let migration = registry.get(1).unwrap();

    apply(&pool, migration, Direction::Down).await.unwrap();
    assert_eq!(down_calls(1), 1);
    assert!(applied_versions(&pool).await.is_empty());
}
