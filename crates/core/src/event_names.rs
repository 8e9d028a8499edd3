//! Wire names for gateway events.
//!
//! Server-emitted names double as the `event_type` of the matching
//! `PlatformEvent` on the in-process bus.

// -- Server -> client --------------------------------------------------------

pub const CONNECTED: &str = "connected";
pub const SUBSCRIBED: &str = "subscribed";
pub const UNSUBSCRIBED: &str = "unsubscribed";
pub const PONG: &str = "pong";
pub const ERROR: &str = "error";

pub const TEST_RUN_STARTED: &str = "test-run:started";
pub const TEST_RUN_COMPLETED: &str = "test-run:completed";
pub const TEST_RUN_UPDATED: &str = "test-run:updated";
pub const TEST_RESULT_ADDED: &str = "test-result:added";
pub const ACTIVITY_NEW: &str = "activity:new";
pub const NOTIFICATION: &str = "notification";

// -- Client -> server --------------------------------------------------------

pub const SUBSCRIBE_PROJECT: &str = "subscribe:project";
pub const UNSUBSCRIBE_PROJECT: &str = "unsubscribe:project";
pub const SUBSCRIBE_TEST_RUN: &str = "subscribe:test-run";
pub const UNSUBSCRIBE_TEST_RUN: &str = "unsubscribe:test-run";
pub const PING: &str = "ping";

/// Whether the event is scoped to a single test run (and its project).
pub fn is_test_run_event(event_type: &str) -> bool {
    matches!(
        event_type,
        TEST_RUN_STARTED | TEST_RUN_COMPLETED | TEST_RUN_UPDATED | TEST_RESULT_ADDED
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_scoped_events() {
        assert!(is_test_run_event(TEST_RUN_STARTED));
        assert!(is_test_run_event(TEST_RESULT_ADDED));
        assert!(!is_test_run_event(ACTIVITY_NEW));
        assert!(!is_test_run_event(NOTIFICATION));
    }
}
