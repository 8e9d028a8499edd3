#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use qualityhub_api::auth::jwt::{generate_access_token, JwtConfig, TokenSubject};
use qualityhub_api::auth::password::hash_password;
use qualityhub_api::config::{LogFormat, ServerConfig};
use qualityhub_api::notifications::NotificationRouter;
use qualityhub_api::router::build_app_router;
use qualityhub_api::state::AppState;
use qualityhub_api::ws::WsManager;
use qualityhub_core::types::DbId;
use qualityhub_db::models::organization::{CreateOrganization, Organization};
use qualityhub_db::models::user::{CreateUser, User};
use qualityhub_db::repositories::{OrganizationRepo, UserRepo};

pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        database_url: String::new(),
        db_max_connections: 5,
        session_cleanup_interval_secs: 3600,
        log_format: LogFormat::Pretty,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
    }
}

pub fn test_state(pool: PgPool) -> AppState {
    AppState::new(pool, test_config(), Arc::new(WsManager::new()))
}

/// Build the full application router with the production middleware stack.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    build_app_router(test_state(pool), &config)
}

/// A router over an existing state, so requests share its bus and gateway.
pub fn app_for(state: &AppState) -> Router {
    build_app_router(state.clone(), &test_config())
}

/// Serve the app on an ephemeral port with the notification router running.
pub async fn spawn_server(pool: PgPool) -> (SocketAddr, AppState) {
    let config = test_config();
    let state = test_state(pool);

    let router = NotificationRouter::new(Arc::clone(&state.ws_manager));
    tokio::spawn(router.run(state.event_bus.subscribe()));

    let app = build_app_router(state.clone(), &config);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, state)
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

pub struct Seeded {
    pub organization: Organization,
    pub user: User,
    pub token: String,
}

pub async fn seed_org(pool: &PgPool, slug: &str) -> Organization {
    OrganizationRepo::create(
        pool,
        &CreateOrganization {
            name: format!("Org {slug}"),
            slug: slug.to_string(),
        },
    )
    .await
    .unwrap()
}

pub async fn seed_user(pool: &PgPool, organization_id: DbId, email: &str, role: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            organization_id,
            email: email.to_string(),
            name: email.split('@').next().unwrap_or(email).to_string(),
            password_hash: hash_password(TEST_PASSWORD).unwrap(),
            role: role.to_string(),
        },
    )
    .await
    .unwrap()
}

pub fn token_for(user: &User) -> String {
    generate_access_token(
        TokenSubject {
            user_id: user.id,
            organization_id: user.organization_id,
            email: &user.email,
            role: &user.role,
        },
        &test_config().jwt,
    )
    .unwrap()
}

/// A fresh organization with one user of `role`.
pub async fn seed(pool: &PgPool, slug: &str, role: &str) -> Seeded {
    let organization = seed_org(pool, slug).await;
    let user = seed_user(pool, organization.id, &format!("{role}@{slug}.test"), role).await;
    let token = token_for(&user);
    Seeded {
        organization,
        user,
        token,
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Unwrap the `data` member of a success envelope.
pub async fn data(response: Response<Body>) -> Value {
    let json = body_json(response).await;
    assert_eq!(json["success"], true, "expected success envelope, got {json}");
    json["data"].clone()
}

/// Create a project through the API and return its id.
pub async fn create_project(app: Router, token: &str, name: &str) -> String {
    let response = post_json_auth(
        app,
        "/api/v1/projects",
        serde_json::json!({ "name": name }),
        token,
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    data(response).await["id"].as_str().unwrap().to_string()
}
