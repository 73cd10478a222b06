use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use groupchat_core::conversation::{ConversationId, Message, MessageCollection, NewMessage};
use groupchat_core::error::{ChatError, Result};
use groupchat_core::session::SessionStore;
use groupchat_core::user::Directory;

/// Validates and submits outgoing messages for the signed-in user.
///
/// The composer also owns the draft text. The draft is cleared as soon as a
/// send passes validation and is put back if the send then fails, so a failed
/// send never silently loses what the user typed.
pub struct MessageComposer {
    session: Arc<SessionStore>,
    directory: Arc<dyn Directory>,
    collection: Arc<dyn MessageCollection>,
    draft: Mutex<String>,
}

impl MessageComposer {
    pub fn new(
        session: Arc<SessionStore>,
        directory: Arc<dyn Directory>,
        collection: Arc<dyn MessageCollection>,
    ) -> Self {
        Self {
            session,
            directory,
            collection,
            draft: Mutex::new(String::new()),
        }
    }

    fn draft_lock(&self) -> MutexGuard<'_, String> {
        self.draft.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        *self.draft_lock() = text.into();
    }

    pub fn draft(&self) -> String {
        self.draft_lock().clone()
    }

    /// Sends the current draft.
    pub async fn submit(&self, conversation: &ConversationId) -> Result<Message> {
        let text = self.draft();
        self.send(conversation, &text).await
    }

    /// Sends `raw_text` to a conversation as the current user.
    ///
    /// Each call creates a distinct message; repeated sends are not merged.
    ///
    /// # Errors
    ///
    /// - `ChatError::EmptyMessage` if the text is blank; nothing else happens
    /// - `ChatError::NotAuthenticated` if nobody is signed in
    /// - `ChatError::SenderResolution` if the sender's profile cannot be read
    /// - the collection's error if the append fails
    ///
    /// On every error after validation the text is restored as the draft,
    /// unless a new draft has been typed in the meantime.
    pub async fn send(&self, conversation: &ConversationId, raw_text: &str) -> Result<Message> {
        let text = raw_text.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        self.draft_lock().clear();

        match self.deliver(conversation, text).await {
            Ok(message) => Ok(message),
            Err(e) => {
                tracing::error!(
                    conversation_id = %conversation,
                    "Error sending message: {}",
                    e
                );
                self.restore_draft(raw_text);
                Err(e)
            }
        }
    }

    async fn deliver(&self, conversation: &ConversationId, text: &str) -> Result<Message> {
        let sender = self
            .session
            .current_user()
            .ok_or(ChatError::NotAuthenticated)?;

        let profile = self
            .directory
            .find_by_id(&sender.id)
            .await
            .map_err(|e| ChatError::sender_resolution(&sender.id, e.to_string()))?
            .ok_or_else(|| ChatError::sender_resolution(&sender.id, "no profile in directory"))?;

        let outgoing = NewMessage::new(text, &profile)?;
        let message = self.collection.append(conversation, outgoing).await?;

        tracing::info!(
            conversation_id = %conversation,
            message_id = %message.id,
            sender_id = %message.sender_id,
            "Message sent"
        );
        Ok(message)
    }

    fn restore_draft(&self, text: &str) {
        let mut draft = self.draft_lock();
        if draft.is_empty() {
            *draft = text.to_string();
            tracing::warn!("Send failed; draft restored");
        }
    }
}
