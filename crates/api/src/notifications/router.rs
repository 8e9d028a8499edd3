//! Event-to-room routing.
//!
//! [`NotificationRouter`] subscribes to the platform event bus, maps each
//! event to the rooms that should see it, and emits one gateway frame.

use std::sync::Arc;

use qualityhub_core::event_names::{is_test_run_event, ACTIVITY_NEW, NOTIFICATION};
use qualityhub_core::rooms::Room;
use qualityhub_events::PlatformEvent;
use tokio::sync::broadcast;

use crate::ws::protocol::frame;
use crate::ws::WsManager;

/// Routes platform events to WebSocket rooms.
pub struct NotificationRouter {
    ws_manager: Arc<WsManager>,
}

impl NotificationRouter {
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Run the routing loop until the event bus is dropped.
    ///
    /// A lagging receiver logs how many events it skipped and continues.
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.route_event(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification router shutting down");
                    break;
                }
            }
        }
    }

    async fn route_event(&self, event: &PlatformEvent) {
        let rooms = target_rooms(event);
        if rooms.is_empty() {
            tracing::debug!(event_type = %event.event_type, "Event has no target rooms");
            return;
        }

        let message = frame(&event.event_type, event.payload.clone());
        let delivered = self.ws_manager.emit_to_rooms(&rooms, message).await;
        tracing::debug!(
            event_type = %event.event_type,
            rooms = rooms.len(),
            delivered,
            "Routed event"
        );
    }
}

/// Rooms that receive `event`.
///
/// | Event                                   | Rooms                                  |
/// |-----------------------------------------|----------------------------------------|
/// | `test-run:*`, `test-result:added`       | `project:<id>` and `test-run:<id>`     |
/// | `activity:new`                          | `project:<id>`, else `org:<id>`        |
/// | `notification`                          | `user:<recipient>`                     |
/// | anything else                           | `org:<id>`                             |
///
/// Scope ids that are absent contribute no room.
pub fn target_rooms(event: &PlatformEvent) -> Vec<Room> {
    let event_type = event.event_type.as_str();

    if is_test_run_event(event_type) {
        return event
            .project_id
            .map(Room::Project)
            .into_iter()
            .chain(event.test_run_id.map(Room::TestRun))
            .collect();
    }

    match event_type {
        ACTIVITY_NEW => event
            .project_id
            .map(Room::Project)
            .or(event.organization_id.map(Room::Organization))
            .into_iter()
            .collect(),
        NOTIFICATION => event.recipient_user_id.map(Room::User).into_iter().collect(),
        _ => event
            .organization_id
            .map(Room::Organization)
            .into_iter()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use qualityhub_core::event_names::{TEST_RESULT_ADDED, TEST_RUN_STARTED};
    use uuid::Uuid;

    use super::*;

    #[test]
    fn run_events_go_to_project_and_run_rooms() {
        let (org, project, run) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        for name in [TEST_RUN_STARTED, TEST_RESULT_ADDED] {
            let event = PlatformEvent::new(name)
                .with_organization(org)
                .with_project(project)
                .with_test_run(run);
            assert_eq!(
                target_rooms(&event),
                vec![Room::Project(project), Room::TestRun(run)]
            );
        }
    }

    #[test]
    fn activity_prefers_project_then_org() {
        let (org, project) = (Uuid::new_v4(), Uuid::new_v4());
        let scoped = PlatformEvent::new(ACTIVITY_NEW)
            .with_organization(org)
            .with_project(project);
        assert_eq!(target_rooms(&scoped), vec![Room::Project(project)]);

        let org_wide = PlatformEvent::new(ACTIVITY_NEW).with_organization(org);
        assert_eq!(target_rooms(&org_wide), vec![Room::Organization(org)]);
    }

    #[test]
    fn notifications_go_only_to_the_recipient() {
        let user = Uuid::new_v4();
        let event = PlatformEvent::new(NOTIFICATION)
            .with_organization(Uuid::new_v4())
            .with_recipient(user);
        assert_eq!(target_rooms(&event), vec![Room::User(user)]);

        let unaddressed = PlatformEvent::new(NOTIFICATION);
        assert!(target_rooms(&unaddressed).is_empty());
    }

    #[test]
    fn unknown_events_fall_back_to_org() {
        let org = Uuid::new_v4();
        let event = PlatformEvent::new("project:archived").with_organization(org);
        assert_eq!(target_rooms(&event), vec![Room::Organization(org)]);
        assert!(target_rooms(&PlatformEvent::new("project:archived")).is_empty());
    }

    #[tokio::test]
    async fn run_delivers_until_the_bus_closes() {
        let manager = Arc::new(WsManager::new());
        let project = Uuid::new_v4();
        let mut rx = manager
            .add("c1".to_string(), Uuid::new_v4(), Uuid::new_v4())
            .await;
        manager.join("c1", Room::Project(project)).await;

        let bus = qualityhub_events::EventBus::new(16);
        let handle = tokio::spawn(NotificationRouter::new(Arc::clone(&manager)).run(bus.subscribe()));

        bus.publish(
            PlatformEvent::new(ACTIVITY_NEW)
                .with_project(project)
                .with_payload(serde_json::json!({"action": "created"})),
        );
        let msg = rx.recv().await.unwrap();
        let axum::extract::ws::Message::Text(text) = msg else {
            panic!("expected a text frame");
        };
        let value: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
        assert_eq!(value["event"], ACTIVITY_NEW);
        assert_eq!(value["data"]["action"], "created");

        drop(bus);
        handle.await.unwrap();
    }
}
