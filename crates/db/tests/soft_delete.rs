//! Integration tests for soft-delete, restore, and hard-delete behaviour.
//!
//! Soft-deleted rows are hidden from lookups and lists, restoring makes
//! them visible again, and a second soft-delete reports `false`.

use sqlx::PgPool;

use qualityhub_db::models::organization::CreateOrganization;
use qualityhub_db::models::project::CreateProject;
use qualityhub_db::models::test_case::{CreateTestCase, TestCaseFilter};
use qualityhub_db::models::test_run::CreateTestRun;
use qualityhub_db::repositories::{OrganizationRepo, ProjectRepo, TestCaseRepo, TestRunRepo};
use qualityhub_core::types::DbId;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_org(pool: &PgPool, slug: &str) -> DbId {
    OrganizationRepo::create(
        pool,
        &CreateOrganization {
            name: slug.to_uppercase(),
            slug: slug.to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

fn new_project(name: &str) -> CreateProject {
    CreateProject {
        name: name.to_string(),
        description: Some("soft delete test".to_string()),
    }
}

fn new_case(title: &str) -> CreateTestCase {
    CreateTestCase {
        suite_id: None,
        title: title.to_string(),
        preconditions: None,
        steps: None,
        expected_result: None,
        priority: None,
        case_type: None,
    }
}

// ---------------------------------------------------------------------------
// Test: projects
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn soft_deleted_project_is_hidden_and_restorable(pool: PgPool) {
    let org = seed_org(&pool, "acme").await;
    let project = ProjectRepo::create(&pool, org, None, &new_project("Web"))
        .await
        .unwrap();

    assert!(ProjectRepo::soft_delete(&pool, project.id).await.unwrap());
    assert!(ProjectRepo::find_in_org(&pool, project.id, org)
        .await
        .unwrap()
        .is_none());
    assert_eq!(ProjectRepo::count_by_org(&pool, org).await.unwrap(), 0);

    let deleted = ProjectRepo::find_in_org_include_deleted(&pool, project.id, org)
        .await
        .unwrap()
        .unwrap();
    assert!(deleted.deleted_at.is_some());

    assert!(ProjectRepo::restore(&pool, project.id).await.unwrap());
    let restored = ProjectRepo::find_in_org(&pool, project.id, org)
        .await
        .unwrap()
        .unwrap();
    assert!(restored.deleted_at.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn soft_delete_is_idempotent(pool: PgPool) {
    let org = seed_org(&pool, "acme").await;
    let project = ProjectRepo::create(&pool, org, None, &new_project("Web"))
        .await
        .unwrap();

    assert!(ProjectRepo::soft_delete(&pool, project.id).await.unwrap());
    assert!(!ProjectRepo::soft_delete(&pool, project.id).await.unwrap());
    assert!(!ProjectRepo::restore(&pool, DbId::new_v4()).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn hard_delete_cascades_to_children(pool: PgPool) {
    let org = seed_org(&pool, "acme").await;
    let project = ProjectRepo::create(&pool, org, None, &new_project("Web"))
        .await
        .unwrap();
    let case = TestCaseRepo::create(&pool, project.id, None, &new_case("Login works"))
        .await
        .unwrap();

    assert!(ProjectRepo::hard_delete(&pool, project.id).await.unwrap());
    assert!(ProjectRepo::find_in_org_include_deleted(&pool, project.id, org)
        .await
        .unwrap()
        .is_none());

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM test_cases WHERE id = $1")
        .bind(case.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}

// ---------------------------------------------------------------------------
// Test: project children
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn soft_deleted_cases_and_runs_are_hidden(pool: PgPool) {
    let org = seed_org(&pool, "acme").await;
    let project = ProjectRepo::create(&pool, org, None, &new_project("Web"))
        .await
        .unwrap();

    let keep = TestCaseRepo::create(&pool, project.id, None, &new_case("keep"))
        .await
        .unwrap();
    let gone = TestCaseRepo::create(&pool, project.id, None, &new_case("gone"))
        .await
        .unwrap();
    assert!(TestCaseRepo::soft_delete(&pool, project.id, gone.id).await.unwrap());

    let filter = TestCaseFilter::default();
    let cases = TestCaseRepo::list(&pool, project.id, &filter, 50, 0).await.unwrap();
    assert_eq!(cases.len(), 1);
    assert_eq!(cases[0].id, keep.id);
    assert_eq!(TestCaseRepo::count(&pool, project.id, &filter).await.unwrap(), 1);

    let run = TestRunRepo::create(
        &pool,
        project.id,
        None,
        &CreateTestRun {
            name: "Sprint 1".to_string(),
            description: None,
            milestone_id: None,
            assigned_to: None,
        },
    )
    .await
    .unwrap();
    assert!(TestRunRepo::soft_delete(&pool, project.id, run.id).await.unwrap());
    assert!(TestRunRepo::find_in_project(&pool, project.id, run.id)
        .await
        .unwrap()
        .is_none());
    assert!(TestRunRepo::find_in_org(&pool, run.id, org).await.unwrap().is_none());
}
