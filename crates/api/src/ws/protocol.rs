//! Gateway wire format.
//!
//! Every frame in either direction is a JSON text frame
//! `{"event": "<name>", "data": <json>}`.

use axum::extract::ws::Message;
use qualityhub_core::event_names;
use qualityhub_core::types::DbId;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsEnvelope {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

impl WsEnvelope {
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    pub fn into_message(self) -> Message {
        // Serializing a String key and a Value cannot fail.
        let text = serde_json::to_string(&self).unwrap_or_default();
        Message::Text(text.into())
    }
}

/// Frame an event for sending.
pub fn frame(event: &str, data: Value) -> Message {
    WsEnvelope::new(event, data).into_message()
}

/// An `error` event carrying `{"message": ...}`.
pub fn error_frame(message: &str) -> Message {
    frame(event_names::ERROR, json!({ "message": message }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ProjectRef {
    #[serde(alias = "projectId")]
    pub project_id: DbId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TestRunRef {
    #[serde(alias = "testRunId")]
    pub test_run_id: DbId,
}

/// A decoded client → server event.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    SubscribeProject(ProjectRef),
    UnsubscribeProject(ProjectRef),
    SubscribeTestRun(TestRunRef),
    UnsubscribeTestRun(TestRunRef),
    Ping,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Malformed frame: {0}")]
    Malformed(String),

    #[error("Unknown event '{0}'")]
    UnknownEvent(String),

    #[error("Invalid data for '{event}': {reason}")]
    InvalidData { event: String, reason: String },
}

impl ClientMessage {
    /// Decode a text frame.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let envelope: WsEnvelope =
            serde_json::from_str(text).map_err(|e| ProtocolError::Malformed(e.to_string()))?;

        match envelope.event.as_str() {
            event_names::PING => Ok(ClientMessage::Ping),
            event_names::SUBSCRIBE_PROJECT => {
                data_of(&envelope).map(ClientMessage::SubscribeProject)
            }
            event_names::UNSUBSCRIBE_PROJECT => {
                data_of(&envelope).map(ClientMessage::UnsubscribeProject)
            }
            event_names::SUBSCRIBE_TEST_RUN => {
                data_of(&envelope).map(ClientMessage::SubscribeTestRun)
            }
            event_names::UNSUBSCRIBE_TEST_RUN => {
                data_of(&envelope).map(ClientMessage::UnsubscribeTestRun)
            }
            other => Err(ProtocolError::UnknownEvent(other.to_string())),
        }
    }
}

fn data_of<T: for<'de> Deserialize<'de>>(envelope: &WsEnvelope) -> Result<T, ProtocolError> {
    serde_json::from_value(envelope.data.clone()).map_err(|e| ProtocolError::InvalidData {
        event: envelope.event.clone(),
        reason: e.to_string(),
    })
}

/// Query string of the upgrade request.
#[derive(Debug, Default, Deserialize)]
pub struct WsQuery {
    pub token: Option<String>,
}

impl WsQuery {
    /// The `?token=` value, if present and non-empty.
    pub fn token(self) -> Option<String> {
        self.token.filter(|t| !t.is_empty())
    }
}
