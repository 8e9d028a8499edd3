use std::sync::Arc;

use qualityhub_events::{ActivityRecorder, EventBus, PlatformEvent};

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything inside is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: qualityhub_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// WebSocket connection and room registry.
    pub ws_manager: Arc<WsManager>,
    /// Centralized event bus for publishing platform events.
    pub event_bus: Arc<EventBus>,
    /// Writes `activity_logs` rows and announces them on the bus.
    pub activity: ActivityRecorder,
}

impl AppState {
    pub fn new(pool: qualityhub_db::DbPool, config: ServerConfig, ws_manager: Arc<WsManager>) -> Self {
        let event_bus = Arc::new(EventBus::default());
        let activity = ActivityRecorder::new(pool.clone(), Arc::clone(&event_bus));
        Self {
            pool,
            config: Arc::new(config),
            ws_manager,
            event_bus,
            activity,
        }
    }

    pub fn publish(&self, event: PlatformEvent) {
        self.event_bus.publish(event);
    }
}
