//! Unit tests for `WsManager`: registration, rooms, and fan-out.

use axum::extract::ws::Message;
use qualityhub_api::ws::WsManager;
use qualityhub_core::rooms::Room;
use uuid::Uuid;

fn text(message: Message) -> String {
    match message {
        Message::Text(t) => t.as_str().to_string(),
        other => panic!("expected text frame, got {other:?}"),
    }
}

#[tokio::test]
async fn add_and_remove_track_connection_count() {
    let manager = WsManager::new();
    let user = Uuid::new_v4();
    let org = Uuid::new_v4();

    let _rx1 = manager.add("conn-1".into(), user, org).await;
    let _rx2 = manager.add("conn-2".into(), user, org).await;
    assert_eq!(manager.connection_count().await, 2);

    assert!(manager.remove("conn-1").await);
    assert!(!manager.remove("nonexistent").await);
    assert!(!manager.remove("conn-1").await);
    assert_eq!(manager.connection_count().await, 1);
}

#[tokio::test]
async fn remove_drops_empty_rooms() {
    let manager = WsManager::new();
    let project = Room::Project(Uuid::new_v4());

    let _rx = manager.add("conn-1".into(), Uuid::new_v4(), Uuid::new_v4()).await;
    assert!(manager.join("conn-1", project).await);
    assert_eq!(manager.room_size(&project).await, 1);

    manager.remove("conn-1").await;
    assert_eq!(manager.room_size(&project).await, 0);
    assert_eq!(manager.room_count().await, 0);
}

#[tokio::test]
async fn join_requires_a_registered_connection() {
    let manager = WsManager::new();
    assert!(!manager.join("ghost", Room::Project(Uuid::new_v4())).await);
    assert_eq!(manager.room_count().await, 0);
}

#[tokio::test]
async fn leaving_a_room_twice_is_a_noop() {
    let manager = WsManager::new();
    let room = Room::TestRun(Uuid::new_v4());
    let _rx = manager.add("conn-1".into(), Uuid::new_v4(), Uuid::new_v4()).await;

    manager.join("conn-1", room).await;
    assert!(manager.leave("conn-1", room).await);
    assert!(!manager.leave("conn-1", room).await);
    assert!(manager.rooms_of("conn-1").await.is_empty());
}

#[tokio::test]
async fn emit_reaches_each_connection_once() {
    let manager = WsManager::new();
    let project = Room::Project(Uuid::new_v4());
    let run = Room::TestRun(Uuid::new_v4());

    let mut both = manager.add("both".into(), Uuid::new_v4(), Uuid::new_v4()).await;
    let mut run_only = manager.add("run-only".into(), Uuid::new_v4(), Uuid::new_v4()).await;
    let mut outsider = manager.add("outsider".into(), Uuid::new_v4(), Uuid::new_v4()).await;
    manager.join("both", project).await;
    manager.join("both", run).await;
    manager.join("run-only", run).await;

    let delivered = manager
        .emit_to_rooms(&[project, run], Message::Text("hello".into()))
        .await;
    assert_eq!(delivered, 2);

    assert_eq!(text(both.try_recv().unwrap()), "hello");
    assert!(both.try_recv().is_err(), "duplicate delivery");
    assert_eq!(text(run_only.try_recv().unwrap()), "hello");
    assert!(outsider.try_recv().is_err());
}

#[tokio::test]
async fn user_room_covers_every_tab() {
    let manager = WsManager::new();
    let user = Uuid::new_v4();
    let org = Uuid::new_v4();

    let mut tab1 = manager.add("tab-1".into(), user, org).await;
    let mut tab2 = manager.add("tab-2".into(), user, org).await;
    manager.join("tab-1", Room::User(user)).await;
    manager.join("tab-2", Room::User(user)).await;

    assert_eq!(
        manager
            .emit_to_rooms(&[Room::User(user)], Message::Text("hi".into()))
            .await,
        2
    );
    assert!(tab1.try_recv().is_ok());
    assert!(tab2.try_recv().is_ok());
}

#[tokio::test]
async fn rooms_of_is_sorted() {
    let manager = WsManager::new();
    let user = Uuid::new_v4();
    let org = Uuid::new_v4();
    let _rx = manager.add("conn".into(), user, org).await;
    manager.join("conn", Room::User(user)).await;
    manager.join("conn", Room::Organization(org)).await;

    let rooms: Vec<String> = manager
        .rooms_of("conn")
        .await
        .iter()
        .map(Room::to_string)
        .collect();
    assert_eq!(rooms, vec![format!("org:{org}"), format!("user:{user}")]);
}

#[tokio::test]
async fn shutdown_all_sends_close_and_clears() {
    let manager = WsManager::new();
    let room = Room::Project(Uuid::new_v4());
    let mut rx = manager.add("conn-1".into(), Uuid::new_v4(), Uuid::new_v4()).await;
    manager.join("conn-1", room).await;

    manager.shutdown_all().await;

    assert_eq!(manager.connection_count().await, 0);
    assert_eq!(manager.room_count().await, 0);
    assert!(matches!(rx.recv().await, Some(Message::Close(None))));
}

#[tokio::test]
async fn ping_all_skips_closed_channels() {
    let manager = WsManager::new();
    let mut rx = manager.add("conn-1".into(), Uuid::new_v4(), Uuid::new_v4()).await;

    // A connection whose receiver is gone no longer accepts frames.
    drop(manager.add("conn-2".into(), Uuid::new_v4(), Uuid::new_v4()).await);

    assert_eq!(manager.ping_all().await, 1);
    assert!(matches!(rx.recv().await, Some(Message::Ping(_))));
}
