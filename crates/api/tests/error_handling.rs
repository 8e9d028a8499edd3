//! Error envelope, extractor rejections, and authentication failures.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, get, get_auth, post_json_auth, send};
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_token_is_401_envelope(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/projects").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert!(json["data"].is_null());
    assert_eq!(json["code"], "UNAUTHORIZED");
    assert_eq!(json["error"], "Missing Authorization header");
    assert!(json["timestamp"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn non_bearer_scheme_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let request = Request::builder()
        .uri("/api/v1/projects")
        .header("Authorization", "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn garbage_token_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/projects", "not.a.jwt").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn malformed_json_is_400_envelope(pool: PgPool) {
    let seeded = common::seed(&pool, "acme", "admin").await;
    let app = common::build_test_app(pool);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/projects")
        .header("Authorization", format!("Bearer {}", seeded.token))
        .header("Content-Type", "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_uuid_path_is_400(pool: PgPool) {
    let seeded = common::seed(&pool, "acme", "admin").await;
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/projects/not-a-uuid", &seeded.token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn validator_failures_name_the_fields(pool: PgPool) {
    let seeded = common::seed(&pool, "acme", "admin").await;
    let app = common::build_test_app(pool);

    let response =
        post_json_auth(app, "/api/v1/projects", json!({ "name": "" }), &seeded.token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["error"].as_str().unwrap().contains("name"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn viewer_cannot_create_projects(pool: PgPool) {
    let seeded = common::seed(&pool, "acme", "viewer").await;
    let app = common::build_test_app(pool);

    let response =
        post_json_auth(app, "/api/v1/projects", json!({ "name": "Nope" }), &seeded.token).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "FORBIDDEN");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn wrong_method_is_405(pool: PgPool) {
    let seeded = common::seed(&pool, "acme", "admin").await;
    let app = common::build_test_app(pool);

    let response = send(
        app,
        Method::PATCH,
        "/api/v1/organization",
        Some(&seeded.token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
