use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::ws::manager::WsManager;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Ping every registered socket on a fixed interval until `cancel` fires.
pub fn start_heartbeat(ws_manager: Arc<WsManager>, cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(HEARTBEAT_INTERVAL);
        // The first tick completes immediately; nobody is connected yet.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("WebSocket heartbeat stopping");
                    break;
                }
                _ = interval.tick() => {
                    let registered = ws_manager.connection_count().await;
                    let reached = ws_manager.ping_all().await;
                    if reached < registered {
                        tracing::debug!(
                            registered,
                            reached,
                            "Heartbeat skipped closed WebSocket channels"
                        );
                    }
                }
            }
        }
    })
}
