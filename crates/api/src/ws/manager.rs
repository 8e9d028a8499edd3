use std::collections::{HashMap, HashSet};

use axum::body::Bytes;
use axum::extract::ws::Message;
use qualityhub_core::rooms::Room;
use qualityhub_core::types::{DbId, Timestamp};
use tokio::sync::{mpsc, RwLock};

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// Metadata for a single authenticated WebSocket connection.
struct WsConnection {
    user_id: DbId,
    organization_id: DbId,
    sender: WsSender,
    connected_at: Timestamp,
    rooms: HashSet<Room>,
}

#[derive(Default)]
struct Registry {
    connections: HashMap<String, WsConnection>,
    rooms: HashMap<Room, HashSet<String>>,
}

impl Registry {
    fn detach(&mut self, conn_id: &str, room: &Room) {
        if let Some(members) = self.rooms.get_mut(room) {
            members.remove(conn_id);
            if members.is_empty() {
                self.rooms.remove(room);
            }
        }
    }
}

/// Tracks live connections and their room memberships.
///
/// Both maps sit behind a single `RwLock` so membership and connection state
/// never disagree. Wrap in `Arc` and share across the application.
pub struct WsManager {
    inner: RwLock<Registry>,
}

impl WsManager {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Registry::default()),
        }
    }

    /// Register a connection.
    ///
    /// Returns the receiver half of the message channel so the caller can
    /// forward messages to the WebSocket sink.
    pub async fn add(
        &self,
        conn_id: String,
        user_id: DbId,
        organization_id: DbId,
    ) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = WsConnection {
            user_id,
            organization_id,
            sender: tx,
            connected_at: chrono::Utc::now(),
            rooms: HashSet::new(),
        };
        self.inner.write().await.connections.insert(conn_id, conn);
        rx
    }

    /// Remove a connection and its membership in every room.
    ///
    /// Rooms left empty are dropped. Returns `false` if the connection was
    /// not registered (e.g. already cleared by [`shutdown_all`](Self::shutdown_all)).
    pub async fn remove(&self, conn_id: &str) -> bool {
        let mut registry = self.inner.write().await;
        let Some(conn) = registry.connections.remove(conn_id) else {
            return false;
        };
        for room in &conn.rooms {
            registry.detach(conn_id, room);
        }
        let connected_secs = (chrono::Utc::now() - conn.connected_at).num_seconds();
        tracing::info!(
            conn_id,
            user_id = %conn.user_id,
            organization_id = %conn.organization_id,
            rooms = conn.rooms.len(),
            connected_secs,
            "WebSocket connection removed"
        );
        true
    }

    /// Add a connection to a room. Returns `false` for unknown connections.
    pub async fn join(&self, conn_id: &str, room: Room) -> bool {
        let mut registry = self.inner.write().await;
        let Some(conn) = registry.connections.get_mut(conn_id) else {
            return false;
        };
        conn.rooms.insert(room);
        registry
            .rooms
            .entry(room)
            .or_default()
            .insert(conn_id.to_string());
        tracing::debug!(conn_id, room = %room, "Joined room");
        true
    }

    /// Remove a connection from a room.
    ///
    /// Leaving a room the connection is not in is a no-op that returns `false`.
    pub async fn leave(&self, conn_id: &str, room: Room) -> bool {
        let mut registry = self.inner.write().await;
        let was_member = registry
            .connections
            .get_mut(conn_id)
            .is_some_and(|conn| conn.rooms.remove(&room));
        if was_member {
            registry.detach(conn_id, &room);
            tracing::debug!(conn_id, room = %room, "Left room");
        }
        was_member
    }

    /// Rooms a connection is currently in, sorted by name.
    pub async fn rooms_of(&self, conn_id: &str) -> Vec<Room> {
        let registry = self.inner.read().await;
        let mut rooms: Vec<Room> = registry
            .connections
            .get(conn_id)
            .map(|conn| conn.rooms.iter().copied().collect())
            .unwrap_or_default();
        rooms.sort_by_key(|room| room.to_string());
        rooms
    }

    /// Number of connections in a room.
    pub async fn room_size(&self, room: &Room) -> usize {
        self.inner
            .read()
            .await
            .rooms
            .get(room)
            .map_or(0, HashSet::len)
    }

    /// Number of non-empty rooms.
    pub async fn room_count(&self) -> usize {
        self.inner.read().await.rooms.len()
    }

    /// Deliver `message` to every connection in any of `rooms`.
    ///
    /// A connection in several target rooms receives the message once.
    /// Closed channels are skipped silently. Returns the number of
    /// connections the message was handed to.
    pub async fn emit_to_rooms(&self, rooms: &[Room], message: Message) -> usize {
        let registry = self.inner.read().await;
        let mut targets: HashSet<&str> = HashSet::new();
        for room in rooms {
            if let Some(members) = registry.rooms.get(room) {
                targets.extend(members.iter().map(String::as_str));
            }
        }

        let mut delivered = 0;
        for conn_id in targets {
            if let Some(conn) = registry.connections.get(conn_id) {
                if conn.sender.send(message.clone()).is_ok() {
                    delivered += 1;
                }
            }
        }
        delivered
    }

    /// Send a message to one connection. Returns `false` if it is gone.
    pub async fn send_to(&self, conn_id: &str, message: Message) -> bool {
        self.inner
            .read()
            .await
            .connections
            .get(conn_id)
            .is_some_and(|conn| conn.sender.send(message).is_ok())
    }

    /// Return the current number of active connections.
    pub async fn connection_count(&self) -> usize {
        self.inner.read().await.connections.len()
    }

    /// Send a Close frame to every connection, then clear the registry.
    pub async fn shutdown_all(&self) {
        let mut registry = self.inner.write().await;
        let count = registry.connections.len();
        for conn in registry.connections.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        registry.connections.clear();
        registry.rooms.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Send a Ping frame to every connected client. Returns how many
    /// outbound channels accepted it.
    pub async fn ping_all(&self) -> usize {
        let registry = self.inner.read().await;
        registry
            .connections
            .values()
            .filter(|conn| conn.sender.send(Message::Ping(Bytes::new())).is_ok())
            .count()
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}
