use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use super::ChatService;
use crate::broker::{Broker, Message, Shutdown};
use crate::history::MessageStore;
use crate::users::{User, UserDirectory};
use crate::utils::error::{BrokerError, ChatError, HistoryError, UserError};

fn service() -> (ChatService, Shutdown) {
    let shutdown = Shutdown::new();
    let broker = Arc::new(Broker::new(shutdown.clone()));
    broker.run().unwrap();
    let service = ChatService::new(
        broker,
        UserDirectory::with_shutdown(shutdown.clone()),
        MessageStore::new(),
        8,
    );
    (service, shutdown)
}

fn user(id: &str) -> User {
    User::with_id(id, id, format!("{id}@example.com"))
}

#[tokio::test]
async fn test_join_send_and_receive() {
    let (service, _shutdown) = service();
    let _alice = service.join(user("alice")).unwrap();
    let mut bob = service.join(user("bob")).unwrap();

    service
        .send(Message::direct("alice", "bob", "hello bob"))
        .await
        .unwrap();

    let msg = timeout(Duration::from_secs(1), bob.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(msg.content, "hello bob");
    assert!(msg.timestamp > 0);

    let history = service.history(Some("alice"));
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].content, "hello bob");
}

#[tokio::test]
async fn test_join_rejects_invalid_and_duplicate_users() {
    let (service, _shutdown) = service();
    let err = service
        .join(User::with_id("eve", "Eve", "nope"))
        .unwrap_err();
    assert_eq!(err, ChatError::User(UserError::InvalidEmail));
    assert!(!service.broker().is_registered("eve"));

    let _alice = service.join(user("alice")).unwrap();
    let err = service.join(user("alice")).unwrap_err();
    assert_eq!(
        err,
        ChatError::User(UserError::AlreadyExists("alice".to_string()))
    );
}

#[tokio::test]
async fn test_send_requires_joined_sender_and_content() {
    let (service, _shutdown) = service();
    let _alice = service.join(user("alice")).unwrap();

    let err = service
        .send(Message::broadcast("mallory", "hi"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ChatError::User(UserError::NotFound("mallory".to_string()))
    );

    let err = service
        .send(Message::broadcast("alice", ""))
        .await
        .unwrap_err();
    assert_eq!(err, ChatError::History(HistoryError::MissingContent));
    assert!(service.history(None).is_empty());
}

#[tokio::test]
async fn test_leave_unregisters() {
    let (service, _shutdown) = service();
    let mut alice = service.join(user("alice")).unwrap();
    let _bob = service.join(user("bob")).unwrap();

    service
        .send(Message::direct("bob", "alice", "bye"))
        .await
        .unwrap();
    let msg = timeout(Duration::from_secs(1), alice.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(msg.content, "bye");

    let left = service.leave("alice").unwrap();
    assert_eq!(left.id, "alice");
    assert!(!service.broker().is_registered("alice"));
    assert!(!service.users().contains("alice"));

    // The service closed the inbox it owned.
    let closed = timeout(Duration::from_secs(1), alice.recv()).await.unwrap();
    assert!(closed.is_none());

    assert_eq!(
        service.leave("alice").unwrap_err(),
        ChatError::User(UserError::NotFound("alice".to_string()))
    );
}

#[tokio::test]
async fn test_send_after_shutdown_is_not_recorded() {
    let (service, shutdown) = service();
    let _alice = service.join(user("alice")).unwrap();

    shutdown.trigger();
    let err = service
        .send(Message::broadcast("alice", "too late"))
        .await
        .unwrap_err();
    assert_eq!(err, ChatError::Broker(BrokerError::ShuttingDown));
    assert!(service.history(None).is_empty());
    assert_eq!(
        service.join(user("bob")).unwrap_err(),
        ChatError::User(UserError::Cancelled)
    );
}
