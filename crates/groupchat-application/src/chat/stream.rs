use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use groupchat_core::conversation::{
    ConversationId, FeedEvent, Message, MessageCollection, SnapshotFeed,
};
use groupchat_core::error::{ChatError, Result};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use super::snapshot::order_snapshot;

/// Lifecycle of a conversation subscription.
///
/// `Closed -> Opening -> Open -> Closed`, with `Failed` reached from
/// `Opening` or `Open` on a transport error. `Failed` stays until the next
/// [`ChatStream::open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Closed,
    Opening,
    Open,
    Failed,
}

struct ActiveSubscription {
    conversation: ConversationId,
    cancel: CancellationToken,
    state: Arc<watch::Sender<StreamState>>,
}

/// Live, ordered view of one conversation at a time.
///
/// `ChatStream` owns at most one subscription. Opening a different
/// conversation closes the previous subscription first; dropping the
/// `ChatStream` closes it as well.
pub struct ChatStream {
    collection: Arc<dyn MessageCollection>,
    active: Option<ActiveSubscription>,
}

impl ChatStream {
    pub fn new(collection: Arc<dyn MessageCollection>) -> Self {
        Self {
            collection,
            active: None,
        }
    }

    /// Subscribes to a conversation and returns its live message sequence.
    ///
    /// Every item of the returned [`LiveMessages`] is the full message set,
    /// newest first, without duplicate ids. Must be called from within a
    /// tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `ChatError::Stream` if the subscription cannot be set up; the
    /// stream is then `Failed`.
    pub async fn open(&mut self, conversation: impl Into<ConversationId>) -> Result<LiveMessages> {
        let conversation = conversation.into();
        self.close();

        let (state_tx, _) = watch::channel(StreamState::Opening);
        let state = Arc::new(state_tx);
        let cancel = CancellationToken::new();
        self.active = Some(ActiveSubscription {
            conversation: conversation.clone(),
            cancel: cancel.clone(),
            state: state.clone(),
        });

        tracing::info!(conversation_id = %conversation, "Opening conversation stream");

        let feed = match self.collection.subscribe(&conversation).await {
            Ok(feed) => feed,
            Err(e) => {
                state.send_replace(StreamState::Failed);
                tracing::error!(
                    conversation_id = %conversation,
                    "Failed to subscribe to conversation: {}",
                    e
                );
                return Err(match e {
                    ChatError::Stream(_) => e,
                    other => ChatError::stream(other.to_string()),
                });
            }
        };

        state.send_replace(StreamState::Open);

        let (tx, rx) = mpsc::channel(1);
        tokio::spawn(forward_snapshots(
            conversation.clone(),
            feed,
            tx,
            cancel.clone(),
            state.clone(),
        ));

        Ok(LiveMessages {
            conversation,
            rx,
            cancel,
            state,
        })
    }

    /// Cancels the current subscription, if any.
    ///
    /// Safe to call any number of times.
    pub fn close(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel.cancel();
            active.state.send_replace(StreamState::Closed);
            tracing::info!(conversation_id = %active.conversation, "Closed conversation stream");
        }
    }

    pub fn state(&self) -> StreamState {
        self.active
            .as_ref()
            .map(|active| *active.state.borrow())
            .unwrap_or(StreamState::Closed)
    }

    /// The conversation the stream is currently bound to.
    ///
    /// `None` once the subscription is closed, whichever side closed it. A
    /// `Failed` stream stays bound until the next `open`.
    pub fn conversation(&self) -> Option<&ConversationId> {
        self.active
            .as_ref()
            .filter(|active| *active.state.borrow() != StreamState::Closed)
            .map(|active| &active.conversation)
    }
}

impl Drop for ChatStream {
    fn drop(&mut self) {
        self.close();
    }
}

/// Cancelable sequence of ordered snapshots for one conversation.
///
/// Implements [`Stream`]; the sequence ends after a `ChatError::Stream` item,
/// after `close`, or when the transport goes away. Dropping it cancels the
/// subscription.
pub struct LiveMessages {
    conversation: ConversationId,
    rx: mpsc::Receiver<Result<Vec<Message>>>,
    cancel: CancellationToken,
    state: Arc<watch::Sender<StreamState>>,
}

impl LiveMessages {
    /// Waits for the next snapshot.
    ///
    /// Returns `None` right away once the subscription has been cancelled,
    /// even if a snapshot was already buffered. When the transport ends on its
    /// own, buffered snapshots are still delivered first.
    pub async fn recv(&mut self) -> Option<Result<Vec<Message>>> {
        if self.cancel.is_cancelled() {
            return None;
        }
        self.rx.recv().await
    }

    pub fn conversation(&self) -> &ConversationId {
        &self.conversation
    }

    pub fn state(&self) -> StreamState {
        *self.state.borrow()
    }

    /// Cancels the subscription. Safe to call any number of times.
    pub fn close(&mut self) {
        if !self.cancel.is_cancelled() {
            self.cancel.cancel();
            self.state.send_if_modified(|state| {
                if *state == StreamState::Failed {
                    return false;
                }
                *state = StreamState::Closed;
                true
            });
        }
        self.rx.close();
    }

    /// The token behind [`close`](Self::close); cancelling it from elsewhere
    /// closes this subscription too.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl Stream for LiveMessages {
    type Item = Result<Vec<Message>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.cancel.is_cancelled() {
            return Poll::Ready(None);
        }
        this.rx.poll_recv(cx)
    }
}

impl Drop for LiveMessages {
    fn drop(&mut self) {
        self.close();
    }
}

/// Pumps transport events into the consumer channel until cancelled.
///
/// Owns the feed, so returning from here is what unsubscribes from the
/// backing collection.
async fn forward_snapshots(
    conversation: ConversationId,
    mut feed: SnapshotFeed,
    tx: mpsc::Sender<Result<Vec<Message>>>,
    cancel: CancellationToken,
    state: Arc<watch::Sender<StreamState>>,
) {
    loop {
        let event = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                close_if_open(&state);
                break;
            }
            event = feed.recv() => event,
        };

        let item = match event {
            Some(FeedEvent::Snapshot(messages)) => {
                let ordered = order_snapshot(messages);
                tracing::debug!(
                    conversation_id = %conversation,
                    count = ordered.len(),
                    "Snapshot delivered"
                );
                Ok(ordered)
            }
            Some(FeedEvent::Failed(reason)) => {
                tracing::error!(conversation_id = %conversation, "Conversation stream failed: {}", reason);
                state.send_replace(StreamState::Failed);
                Err(ChatError::stream(reason))
            }
            None => {
                tracing::info!(conversation_id = %conversation, "Transport ended conversation stream");
                close_if_open(&state);
                break;
            }
        };

        let failed = item.is_err();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                close_if_open(&state);
                break;
            }
            sent = tx.send(item) => {
                if sent.is_err() {
                    break;
                }
            }
        }
        if failed {
            break;
        }
    }
}

fn close_if_open(state: &watch::Sender<StreamState>) {
    state.send_if_modified(|s| {
        if *s == StreamState::Open {
            *s = StreamState::Closed;
            return true;
        }
        false
    });
}

#[cfg(test)]
#[path = "stream_test.rs"]
mod tests;
