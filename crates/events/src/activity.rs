//! Activity feed recording.
//!
//! Every mutating API call stores one `activity_logs` row and announces it on
//! the bus as `activity:new`, with the stored row as the payload.

use std::sync::Arc;

use qualityhub_core::event_names::ACTIVITY_NEW;
use qualityhub_db::models::activity::{ActivityLog, CreateActivityLog};
use qualityhub_db::repositories::ActivityRepo;
use qualityhub_db::DbPool;

use crate::bus::{EventBus, PlatformEvent};

/// Writes activity rows and publishes them.
#[derive(Clone)]
pub struct ActivityRecorder {
    pool: DbPool,
    bus: Arc<EventBus>,
}

impl ActivityRecorder {
    pub fn new(pool: DbPool, bus: Arc<EventBus>) -> Self {
        Self { pool, bus }
    }

    /// Persist `entry` and publish `activity:new`.
    pub async fn record(&self, entry: CreateActivityLog) -> Result<ActivityLog, sqlx::Error> {
        let row = ActivityRepo::create(&self.pool, &entry).await?;
        self.bus.publish(activity_event(&row));
        Ok(row)
    }
}

/// Build the `activity:new` event announcing a stored row.
pub fn activity_event(row: &ActivityLog) -> PlatformEvent {
    let payload = serde_json::to_value(row).unwrap_or(serde_json::Value::Null);
    let mut event = PlatformEvent::new(ACTIVITY_NEW)
        .with_organization(row.organization_id)
        .with_payload(payload);
    if let Some(project_id) = row.project_id {
        event = event.with_project(project_id);
    }
    if let Some(user_id) = row.user_id {
        event = event.with_actor(user_id);
    }
    event
}
