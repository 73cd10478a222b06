//! Conversation message types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ChatError, Result};
use crate::user::User;

/// Identifies the message collection of one group chat.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConversationId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ConversationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A stored message as delivered by the backing collection.
///
/// Messages are created once and never mutated. `id` and `created_at` are
/// assigned by the backing store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique within its conversation
    pub id: String,
    pub text: String,
    /// Server-assigned ordering timestamp
    pub created_at: DateTime<Utc>,
    pub sender_id: String,
    pub sender_display_name: String,
}

impl Message {
    /// Whether `user_id` sent this message.
    pub fn is_from(&self, user_id: &str) -> bool {
        self.sender_id == user_id
    }

    /// Hour and zero-padded minute of `created_at`, e.g. `9:05`.
    pub fn time_label(&self) -> String {
        self.created_at.format("%-H:%M").to_string()
    }
}

/// An outgoing message that has passed validation and carries a resolved
/// sender. The only way to build one is [`NewMessage::new`], so nothing
/// reaches the collection without both sender fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    text: String,
    sender_id: String,
    sender_display_name: String,
}

impl NewMessage {
    /// Builds an outgoing message from raw text and the resolved sender.
    ///
    /// The text is trimmed.
    ///
    /// # Errors
    ///
    /// - `ChatError::EmptyMessage` if the text is blank
    /// - `ChatError::SenderResolution` if the sender has no id or no display name
    pub fn new(text: &str, sender: &User) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if sender.id.trim().is_empty() {
            return Err(ChatError::sender_resolution(&sender.id, "sender id is empty"));
        }
        if sender.display_name.trim().is_empty() {
            return Err(ChatError::sender_resolution(
                &sender.id,
                "sender has no display name",
            ));
        }

        Ok(Self {
            text: text.to_string(),
            sender_id: sender.id.clone(),
            sender_display_name: sender.display_name.clone(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sender_id(&self) -> &str {
        &self.sender_id
    }

    pub fn sender_display_name(&self) -> &str {
        &self.sender_display_name
    }

    /// Turns this into a stored message once the backing store has assigned
    /// its id and timestamp.
    pub fn into_message(self, id: impl Into<String>, created_at: DateTime<Utc>) -> Message {
        Message {
            id: id.into(),
            text: self.text,
            created_at,
            sender_id: self.sender_id,
            sender_display_name: self.sender_display_name,
        }
    }
}
