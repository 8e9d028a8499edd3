//! Integration tests for the migration runner: apply, revert, and status.

use sqlx::PgPool;

use qualityhub_db::migrations::{
    applied_migrations, available_migrations, revert_last, revert_to, run_migrations,
};

const TABLES: &[&str] = &[
    "organizations",
    "users",
    "user_sessions",
    "projects",
    "test_suites",
    "milestones",
    "requirements",
    "test_cases",
    "requirement_test_cases",
    "test_runs",
    "test_results",
    "activity_logs",
];

async fn table_exists(pool: &PgPool, table: &str) -> bool {
    sqlx::query_scalar(
        "SELECT EXISTS (
            SELECT 1 FROM information_schema.tables
            WHERE table_schema = 'public' AND table_name = $1
        )",
    )
    .bind(table)
    .fetch_one(pool)
    .await
    .unwrap()
}

// ---------------------------------------------------------------------------
// Test: full apply
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = false)]
async fn run_creates_every_table(pool: PgPool) {
    run_migrations(&pool).await.unwrap();

    for table in TABLES {
        assert!(table_exists(&pool, table).await, "{table} should exist");
    }

    let applied = applied_migrations(&pool).await.unwrap();
    assert_eq!(applied.len(), available_migrations().len());
    assert!(applied.iter().all(|m| m.success));
}

#[sqlx::test(migrations = false)]
async fn run_is_idempotent(pool: PgPool) {
    run_migrations(&pool).await.unwrap();
    run_migrations(&pool).await.unwrap();
    assert_eq!(
        applied_migrations(&pool).await.unwrap().len(),
        available_migrations().len()
    );
}

// ---------------------------------------------------------------------------
// Test: revert
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = false)]
async fn revert_to_zero_drops_everything(pool: PgPool) {
    run_migrations(&pool).await.unwrap();
    revert_to(&pool, 0).await.unwrap();

    for table in TABLES {
        assert!(!table_exists(&pool, table).await, "{table} should be gone");
    }
    assert!(applied_migrations(&pool).await.unwrap().is_empty());

    let function_exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM pg_proc WHERE proname = 'set_updated_at')")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(!function_exists);
}

#[sqlx::test(migrations = false)]
async fn revert_last_undoes_only_the_newest(pool: PgPool) {
    run_migrations(&pool).await.unwrap();
    let newest = available_migrations().last().unwrap().version;

    let reverted = revert_last(&pool).await.unwrap();
    assert_eq!(reverted, Some(newest));
    assert!(!table_exists(&pool, "activity_logs").await);
    assert!(table_exists(&pool, "test_results").await);
    assert_eq!(
        applied_migrations(&pool).await.unwrap().len(),
        available_migrations().len() - 1
    );
}

#[sqlx::test(migrations = false)]
async fn revert_last_on_empty_schema_is_none(pool: PgPool) {
    assert_eq!(revert_last(&pool).await.unwrap(), None);
}

#[sqlx::test(migrations = false)]
async fn revert_to_midpoint_then_reapply(pool: PgPool) {
    run_migrations(&pool).await.unwrap();
    let target = available_migrations()[3].version;

    revert_to(&pool, target).await.unwrap();
    assert!(table_exists(&pool, "projects").await);
    assert!(!table_exists(&pool, "test_suites").await);

    run_migrations(&pool).await.unwrap();
    for table in TABLES {
        assert!(table_exists(&pool, table).await, "{table} should be back");
    }
}
