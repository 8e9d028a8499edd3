//! Cross-organization access is reported as missing, never as forbidden.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_project, data, delete_auth, get_auth, post_json_auth, put_json_auth};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn other_tenants_projects_are_invisible(pool: PgPool) {
    let acme = common::seed(&pool, "acme", "admin").await;
    let globex = common::seed(&pool, "globex", "admin").await;
    let pid = create_project(common::build_test_app(pool.clone()), &acme.token, "Secret").await;

    let listed = data(get_auth(common::build_test_app(pool.clone()), "/api/v1/projects", &globex.token).await).await;
    assert_eq!(listed["total"], 0);

    for uri in [
        format!("/api/v1/projects/{pid}"),
        format!("/api/v1/projects/{pid}/suites"),
        format!("/api/v1/projects/{pid}/cases"),
        format!("/api/v1/projects/{pid}/milestones"),
        format!("/api/v1/projects/{pid}/requirements"),
        format!("/api/v1/projects/{pid}/requirements/coverage"),
        format!("/api/v1/projects/{pid}/runs"),
        format!("/api/v1/projects/{pid}/activity"),
    ] {
        let response = get_auth(common::build_test_app(pool.clone()), &uri, &globex.token).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "GET {uri}");
        assert_eq!(body_json(response).await["code"], "NOT_FOUND");
    }

    let write = post_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/projects/{pid}/cases"),
        json!({ "title": "Injected" }),
        &globex.token,
    )
    .await;
    assert_eq!(write.status(), StatusCode::NOT_FOUND);

    let update = put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/projects/{pid}"),
        json!({ "name": "Hijacked" }),
        &globex.token,
    )
    .await;
    assert_eq!(update.status(), StatusCode::NOT_FOUND);

    let delete = delete_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/projects/{pid}"),
        &globex.token,
    )
    .await;
    assert_eq!(delete.status(), StatusCode::NOT_FOUND);

    // Still intact for its owner.
    let own = get_auth(common::build_test_app(pool), &format!("/api/v1/projects/{pid}"), &acme.token).await;
    assert_eq!(data(own).await["name"], "Secret");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn users_and_activity_are_tenant_scoped(pool: PgPool) {
    let acme = common::seed(&pool, "acme", "admin").await;
    let globex = common::seed(&pool, "globex", "admin").await;
    create_project(common::build_test_app(pool.clone()), &acme.token, "Noise").await;

    let users = data(get_auth(common::build_test_app(pool.clone()), "/api/v1/users", &globex.token).await).await;
    assert_eq!(users["total"], 1);
    assert_eq!(users["items"][0]["id"], globex.user.id.to_string());

    let foreign_user = get_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/users/{}", acme.user.id),
        &globex.token,
    )
    .await;
    assert_eq!(foreign_user.status(), StatusCode::NOT_FOUND);

    let feed = data(get_auth(common::build_test_app(pool), "/api/v1/activity", &globex.token).await).await;
    assert_eq!(feed["total"], 0);
}
