use axum::extract::ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use qualityhub_core::event_names::{CONNECTED, PONG, SUBSCRIBED, UNSUBSCRIBED};
use qualityhub_core::rooms::Room;
use qualityhub_db::repositories::{ProjectRepo, TestRunRepo};
use serde_json::json;

use crate::middleware::auth::{bearer_token, AuthUser};
use crate::state::AppState;
use crate::extract::AppQuery;
use crate::ws::protocol::{error_frame, frame, ClientMessage, WsQuery};

/// HTTP handler that upgrades the connection to WebSocket.
///
/// The token is read from the `Authorization` header, then from `?token=`.
/// Authentication is decided before the upgrade; an unauthenticated socket
/// gets one `error` event and a Close frame and is never registered.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    headers: HeaderMap,
    AppQuery(query): AppQuery<WsQuery>,
) -> impl IntoResponse {
    let token = bearer_token(&headers)
        .map(str::to_string)
        .or_else(|| query.token());
    let user = token
        .as_deref()
        .and_then(|t| AuthUser::from_token(t, &state.config.jwt).ok());

    ws.on_upgrade(move |socket| async move {
        match user {
            Some(user) => handle_socket(socket, state, user).await,
            None => reject(socket).await,
        }
    })
}

async fn reject(mut socket: WebSocket) {
    tracing::info!("Rejected unauthenticated WebSocket");
    let _ = socket.send(error_frame("Unauthorized")).await;
    let _ = socket
        .send(Message::Close(Some(CloseFrame {
            code: close_code::POLICY,
            reason: "Unauthorized".into(),
        })))
        .await;
}

/// Manage one authenticated connection.
///
/// Registers it, joins the user and organization rooms, then runs a sender
/// task (manager channel to sink) alongside the inbound dispatch loop.
async fn handle_socket(socket: WebSocket, state: AppState, user: AuthUser) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    let manager = state.ws_manager.clone();

    let mut rx = manager
        .add(conn_id.clone(), user.user_id, user.organization_id)
        .await;
    manager.join(&conn_id, Room::User(user.user_id)).await;
    manager
        .join(&conn_id, Room::Organization(user.organization_id))
        .await;
    tracing::info!(conn_id = %conn_id, user_id = %user.user_id, "WebSocket connected");

    let rooms: Vec<String> = manager
        .rooms_of(&conn_id)
        .await
        .iter()
        .map(Room::to_string)
        .collect();
    manager
        .send_to(
            &conn_id,
            frame(
                CONNECTED,
                json!({
                    "user_id": user.user_id,
                    "organization_id": user.organization_id,
                    "rooms": rooms,
                }),
            ),
        )
        .await;

    let (mut sink, mut stream) = socket.split();

    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
            if closing {
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                let reply = dispatch(&state, &conn_id, &user, text.as_str()).await;
                manager.send_to(&conn_id, reply).await;
            }
            Ok(Message::Binary(_)) => {
                manager
                    .send_to(&conn_id, error_frame("Binary frames are not supported"))
                    .await;
            }
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(Message::Ping(_)) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    if !manager.remove(&conn_id).await {
        tracing::debug!(conn_id = %conn_id, "WebSocket closed after registry shutdown");
    }
    send_task.abort();
}

/// Handle one client frame and produce the reply frame.
async fn dispatch(state: &AppState, conn_id: &str, user: &AuthUser, text: &str) -> Message {
    let message = match ClientMessage::parse(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::debug!(conn_id, error = %e, "Rejected client frame");
            return error_frame(&e.to_string());
        }
    };

    match message {
        ClientMessage::Ping => frame(PONG, json!({ "timestamp": chrono::Utc::now() })),
        ClientMessage::SubscribeProject(r) => {
            subscribe(state, conn_id, user, Room::Project(r.project_id)).await
        }
        ClientMessage::SubscribeTestRun(r) => {
            subscribe(state, conn_id, user, Room::TestRun(r.test_run_id)).await
        }
        ClientMessage::UnsubscribeProject(r) => {
            unsubscribe(state, conn_id, Room::Project(r.project_id)).await
        }
        ClientMessage::UnsubscribeTestRun(r) => {
            unsubscribe(state, conn_id, Room::TestRun(r.test_run_id)).await
        }
    }
}

async fn subscribe(state: &AppState, conn_id: &str, user: &AuthUser, room: Room) -> Message {
    match can_access(state, user, room).await {
        Ok(true) => {
            state.ws_manager.join(conn_id, room).await;
            frame(SUBSCRIBED, json!({ "room": room.to_string() }))
        }
        Ok(false) => {
            tracing::info!(conn_id, user_id = %user.user_id, room = %room, "Subscription denied");
            error_frame(&format!("Access denied to {room}"))
        }
        Err(e) => {
            tracing::error!(conn_id, room = %room, error = %e, "Subscription lookup failed");
            error_frame("Subscription failed")
        }
    }
}

async fn unsubscribe(state: &AppState, conn_id: &str, room: Room) -> Message {
    state.ws_manager.leave(conn_id, room).await;
    frame(UNSUBSCRIBED, json!({ "room": room.to_string() }))
}

/// Project and test-run rooms are open only within the caller's organization.
async fn can_access(state: &AppState, user: &AuthUser, room: Room) -> Result<bool, sqlx::Error> {
    let org = user.organization_id;
    match room {
        Room::Project(id) => Ok(ProjectRepo::find_in_org(&state.pool, id, org)
            .await?
            .is_some()),
        Room::TestRun(id) => Ok(TestRunRepo::find_in_org(&state.pool, id, org)
            .await?
            .is_some()),
        Room::User(id) => Ok(id == user.user_id),
        Room::Organization(id) => Ok(id == org),
    }
}
