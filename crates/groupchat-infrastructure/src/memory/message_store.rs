use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use groupchat_core::conversation::{
    ConversationId, FeedEvent, Message, MessageCollection, NewMessage, SnapshotFeed,
};
use groupchat_core::error::{ChatError, Result};
use tokio::sync::watch;
use uuid::Uuid;

use super::clock::{ServerClock, SystemClock};

#[derive(Default)]
struct ConversationLog {
    /// Insertion order
    messages: Vec<Message>,
    last_created_at: Option<DateTime<Utc>>,
    subscribers: Vec<watch::Sender<FeedEvent>>,
    /// Set while the conversation is refusing access
    failure: Option<String>,
}

impl ConversationLog {
    /// Newest first; equal timestamps put the later insertion first.
    fn snapshot(&self) -> Vec<Message> {
        let mut messages: Vec<Message> = self.messages.iter().rev().cloned().collect();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        messages
    }

    fn prune_subscribers(&mut self) {
        self.subscribers.retain(|tx| !tx.is_closed());
    }

    fn publish(&mut self, event: FeedEvent) {
        self.prune_subscribers();
        for tx in &self.subscribers {
            tx.send_replace(event.clone());
        }
    }
}

/// Message collections held in memory, with live snapshot subscriptions.
///
/// Ids are random UUIDs. `created_at` comes from the configured
/// [`ServerClock`] and is clamped so it never goes backwards within a
/// conversation.
pub struct InMemoryMessageStore {
    conversations: Mutex<HashMap<ConversationId, ConversationLog>>,
    clock: Arc<dyn ServerClock>,
    reject_appends: AtomicBool,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn ServerClock>) -> Self {
        Self {
            conversations: Mutex::new(HashMap::new()),
            clock,
            reject_appends: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ConversationId, ConversationLog>> {
        self.conversations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Simulates a transport failure (permission revoked, connection lost).
    ///
    /// Live subscribers receive `FeedEvent::Failed`; new subscriptions and
    /// appends are refused until [`restore_conversation`](Self::restore_conversation).
    pub fn fail_conversation(&self, conversation: &ConversationId, reason: impl Into<String>) {
        let reason = reason.into();
        let mut conversations = self.lock();
        let log = conversations.entry(conversation.clone()).or_default();
        log.failure = Some(reason.clone());
        log.publish(FeedEvent::Failed(reason));
        tracing::warn!(conversation_id = %conversation, "Conversation access revoked");
    }

    pub fn restore_conversation(&self, conversation: &ConversationId) {
        if let Some(log) = self.lock().get_mut(conversation) {
            log.failure = None;
        }
    }

    /// Makes every following append fail until switched back.
    pub fn set_reject_appends(&self, reject: bool) {
        self.reject_appends.store(reject, Ordering::SeqCst);
    }

    /// Number of live subscriptions on a conversation.
    pub fn subscriber_count(&self, conversation: &ConversationId) -> usize {
        let mut conversations = self.lock();
        match conversations.get_mut(conversation) {
            Some(log) => {
                log.prune_subscribers();
                log.subscribers.len()
            }
            None => 0,
        }
    }

    /// Current contents of a conversation, newest first.
    pub fn messages(&self, conversation: &ConversationId) -> Vec<Message> {
        self.lock()
            .get(conversation)
            .map(ConversationLog::snapshot)
            .unwrap_or_default()
    }
}

impl Default for InMemoryMessageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageCollection for InMemoryMessageStore {
    async fn subscribe(&self, conversation: &ConversationId) -> Result<SnapshotFeed> {
        let mut conversations = self.lock();
        let log = conversations.entry(conversation.clone()).or_default();

        if let Some(reason) = &log.failure {
            return Err(ChatError::stream(reason.clone()));
        }

        log.prune_subscribers();
        let (tx, rx) = watch::channel(FeedEvent::Snapshot(log.snapshot()));
        log.subscribers.push(tx);

        tracing::debug!(
            conversation_id = %conversation,
            subscribers = log.subscribers.len(),
            "Subscriber added"
        );
        Ok(SnapshotFeed::new(rx))
    }

    async fn append(&self, conversation: &ConversationId, message: NewMessage) -> Result<Message> {
        if self.reject_appends.load(Ordering::SeqCst) {
            return Err(ChatError::data_access("append rejected by store"));
        }

        let mut conversations = self.lock();
        let log = conversations.entry(conversation.clone()).or_default();

        if let Some(reason) = &log.failure {
            return Err(ChatError::data_access(reason.clone()));
        }

        let now = self.clock.now();
        let created_at = match log.last_created_at {
            Some(last) if last > now => last,
            _ => now,
        };
        log.last_created_at = Some(created_at);

        let stored = message.into_message(Uuid::new_v4().to_string(), created_at);
        log.messages.push(stored.clone());

        let snapshot = log.snapshot();
        log.publish(FeedEvent::Snapshot(snapshot));

        Ok(stored)
    }
}
