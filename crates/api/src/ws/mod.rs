//! WebSocket notification gateway.
//!
//! Connection and room registry, wire protocol, heartbeat, and the
//! authenticated upgrade handler.

mod handler;
mod heartbeat;
pub mod manager;
pub mod protocol;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
