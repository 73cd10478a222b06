//! Message collection trait.
//!
//! Defines the interface to the backing store that holds each conversation's
//! messages and pushes updates to subscribers.

use async_trait::async_trait;
use tokio::sync::watch;

use super::message::{ConversationId, Message, NewMessage};
use crate::error::Result;

/// One push from a collection subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    /// The full current message set, newest first.
    Snapshot(Vec<Message>),
    /// The transport gave up on this subscription (permission revoked,
    /// connectivity lost, ...). No further events follow.
    Failed(String),
}

/// Receiving end of a collection subscription.
///
/// Each event replaces the previous one: a reader that falls behind skips
/// straight to the latest snapshot. Dropping the feed is how the transport
/// learns the subscriber is gone.
pub struct SnapshotFeed {
    rx: watch::Receiver<FeedEvent>,
    primed: bool,
}

impl SnapshotFeed {
    /// Wraps a watch receiver whose current value is the initial snapshot.
    pub fn new(rx: watch::Receiver<FeedEvent>) -> Self {
        Self { rx, primed: false }
    }

    /// Waits for the next event.
    ///
    /// The first call returns the current value immediately. Returns `None`
    /// once the transport has dropped its side.
    pub async fn recv(&mut self) -> Option<FeedEvent> {
        if !self.primed {
            self.primed = true;
            return Some(self.rx.borrow_and_update().clone());
        }
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

/// An abstract store of per-conversation message collections.
///
/// # Implementation Notes
///
/// Implementations should:
/// - assign `Message::id` and `Message::created_at` on append, with
///   `created_at` non-decreasing within a conversation
/// - push the full ordered set (newest first) to every live subscriber after
///   each change, one event at a time per subscriber
/// - stop pushing to a subscriber once its `SnapshotFeed` is dropped
#[async_trait]
pub trait MessageCollection: Send + Sync {
    /// Opens a push subscription on a conversation.
    ///
    /// # Errors
    ///
    /// Returns `ChatError::Stream` if the subscription cannot be set up.
    async fn subscribe(&self, conversation: &ConversationId) -> Result<SnapshotFeed>;

    /// Appends a message and returns it as stored.
    async fn append(&self, conversation: &ConversationId, message: NewMessage) -> Result<Message>;
}
