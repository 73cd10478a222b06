use super::*;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use futures::StreamExt;
use groupchat_core::conversation::NewMessage;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

// Mock MessageCollection whose pushes are driven by the test
struct MockCollection {
    feeds: Mutex<HashMap<ConversationId, watch::Sender<FeedEvent>>>,
    refuse_subscriptions: Mutex<bool>,
}

impl MockCollection {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            feeds: Mutex::new(HashMap::new()),
            refuse_subscriptions: Mutex::new(false),
        })
    }

    fn push(&self, conversation: &str, messages: Vec<Message>) {
        let feeds = self.feeds.lock().unwrap();
        feeds[&ConversationId::from(conversation)].send_replace(FeedEvent::Snapshot(messages));
    }

    fn fail(&self, conversation: &str, reason: &str) {
        let feeds = self.feeds.lock().unwrap();
        feeds[&ConversationId::from(conversation)]
            .send_replace(FeedEvent::Failed(reason.to_string()));
    }

    /// Drops the transport side of a conversation's feed.
    fn end(&self, conversation: &str) {
        self.feeds
            .lock()
            .unwrap()
            .remove(&ConversationId::from(conversation));
    }

    fn is_subscribed(&self, conversation: &str) -> bool {
        let feeds = self.feeds.lock().unwrap();
        feeds
            .get(&ConversationId::from(conversation))
            .map(|tx| !tx.is_closed())
            .unwrap_or(false)
    }
}

#[async_trait]
impl MessageCollection for MockCollection {
    async fn subscribe(&self, conversation: &ConversationId) -> Result<SnapshotFeed> {
        if *self.refuse_subscriptions.lock().unwrap() {
            return Err(ChatError::data_access("permission denied"));
        }
        let (tx, rx) = watch::channel(FeedEvent::Snapshot(Vec::new()));
        self.feeds.lock().unwrap().insert(conversation.clone(), tx);
        Ok(SnapshotFeed::new(rx))
    }

    async fn append(&self, _conversation: &ConversationId, _message: NewMessage) -> Result<Message> {
        Err(ChatError::data_access("read-only mock"))
    }
}

fn message(id: &str, secs: i64) -> Message {
    Message {
        id: id.to_string(),
        text: format!("hello {id}"),
        created_at: Utc.timestamp_opt(secs, 0).unwrap(),
        sender_id: "u1".to_string(),
        sender_display_name: "Alice".to_string(),
    }
}

fn ids(messages: &[Message]) -> Vec<String> {
    messages.iter().map(|m| m.id.clone()).collect()
}

async fn next_item(live: &mut LiveMessages) -> Option<Result<Vec<Message>>> {
    tokio::time::timeout(Duration::from_secs(1), live.next())
        .await
        .expect("timed out waiting for the stream")
}

/// Lets the forwarding task observe a cancellation.
async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn test_open_delivers_initial_snapshot() {
    let collection = MockCollection::new();
    let mut stream = ChatStream::new(collection.clone());

    let mut live = stream.open("g1").await.unwrap();

    assert_eq!(stream.state(), StreamState::Open);
    assert_eq!(stream.conversation(), Some(&ConversationId::from("g1")));
    assert_eq!(next_item(&mut live).await, Some(Ok(Vec::new())));
}

#[tokio::test]
async fn test_snapshots_arrive_newest_first() {
    let collection = MockCollection::new();
    let mut stream = ChatStream::new(collection.clone());
    let mut live = stream.open("g1").await.unwrap();
    next_item(&mut live).await;

    collection.push("g1", vec![message("t1", 1)]);
    let snapshot = next_item(&mut live).await.unwrap().unwrap();
    assert_eq!(ids(&snapshot), vec!["t1"]);

    collection.push("g1", vec![message("t1", 1), message("t2", 2), message("t3", 3)]);
    let snapshot = next_item(&mut live).await.unwrap().unwrap();
    assert_eq!(ids(&snapshot), vec!["t3", "t2", "t1"]);
}

#[tokio::test]
async fn test_duplicate_ids_never_reach_consumer() {
    let collection = MockCollection::new();
    let mut stream = ChatStream::new(collection.clone());
    let mut live = stream.open("g1").await.unwrap();
    next_item(&mut live).await;

    collection.push("g1", vec![message("a", 1), message("b", 2), message("a", 1)]);
    let snapshot = next_item(&mut live).await.unwrap().unwrap();

    assert_eq!(ids(&snapshot), vec!["b", "a"]);
}

#[tokio::test]
async fn test_transport_failure_ends_stream() {
    let collection = MockCollection::new();
    let mut stream = ChatStream::new(collection.clone());
    let mut live = stream.open("g1").await.unwrap();
    next_item(&mut live).await;

    collection.fail("g1", "permission revoked");

    assert_eq!(
        next_item(&mut live).await,
        Some(Err(ChatError::stream("permission revoked")))
    );
    assert_eq!(next_item(&mut live).await, None);
    assert_eq!(stream.state(), StreamState::Failed);
    assert_eq!(live.state(), StreamState::Failed);
}

#[tokio::test]
async fn test_failed_subscribe_then_reopen() {
    let collection = MockCollection::new();
    *collection.refuse_subscriptions.lock().unwrap() = true;
    let mut stream = ChatStream::new(collection.clone());

    let err = stream.open("g1").await.err().unwrap();
    assert!(err.is_stream());
    assert_eq!(stream.state(), StreamState::Failed);

    *collection.refuse_subscriptions.lock().unwrap() = false;
    let _live = stream.open("g1").await.unwrap();
    assert_eq!(stream.state(), StreamState::Open);
}

#[tokio::test]
async fn test_close_is_idempotent_and_unsubscribes() {
    let collection = MockCollection::new();
    let mut stream = ChatStream::new(collection.clone());
    let mut live = stream.open("g1").await.unwrap();
    next_item(&mut live).await;
    assert!(collection.is_subscribed("g1"));

    stream.close();
    stream.close();
    settle().await;

    assert_eq!(stream.state(), StreamState::Closed);
    assert_eq!(stream.conversation(), None);
    assert!(!collection.is_subscribed("g1"));
    assert_eq!(next_item(&mut live).await, None);

    live.close();
    live.close();
    assert_eq!(live.state(), StreamState::Closed);
}

#[tokio::test]
async fn test_switching_conversation_closes_previous() {
    let collection = MockCollection::new();
    let mut stream = ChatStream::new(collection.clone());
    let mut first = stream.open("g1").await.unwrap();
    next_item(&mut first).await;

    let mut second = stream.open("g2").await.unwrap();
    assert_eq!(next_item(&mut second).await, Some(Ok(Vec::new())));
    settle().await;

    assert!(!collection.is_subscribed("g1"));
    assert!(collection.is_subscribed("g2"));
    assert_eq!(next_item(&mut first).await, None);
    assert_eq!(first.state(), StreamState::Closed);

    collection.push("g2", vec![message("x", 1)]);
    let snapshot = next_item(&mut second).await.unwrap().unwrap();
    assert_eq!(ids(&snapshot), vec!["x"]);
}

#[tokio::test]
async fn test_dropping_live_messages_unsubscribes() {
    let collection = MockCollection::new();
    let mut stream = ChatStream::new(collection.clone());
    let live = stream.open("g1").await.unwrap();

    drop(live);
    settle().await;

    assert!(!collection.is_subscribed("g1"));
    assert_eq!(stream.state(), StreamState::Closed);
    assert_eq!(stream.conversation(), None);
}

#[tokio::test]
async fn test_transport_end_delivers_buffered_snapshot() {
    let collection = MockCollection::new();
    let mut stream = ChatStream::new(collection.clone());
    let mut live = stream.open("g1").await.unwrap();
    next_item(&mut live).await;

    collection.push("g1", vec![message("final", 1)]);
    collection.end("g1");
    settle().await;

    let snapshot = next_item(&mut live).await.unwrap().unwrap();
    assert_eq!(ids(&snapshot), vec!["final"]);
    assert_eq!(next_item(&mut live).await, None);
    assert_eq!(stream.state(), StreamState::Closed);
    assert_eq!(stream.conversation(), None);
}

#[tokio::test]
async fn test_dropping_chat_stream_unsubscribes() {
    let collection = MockCollection::new();
    let mut stream = ChatStream::new(collection.clone());
    let mut live = stream.open("g1").await.unwrap();

    drop(stream);
    settle().await;

    assert!(!collection.is_subscribed("g1"));
    assert_eq!(next_item(&mut live).await, None);
}
