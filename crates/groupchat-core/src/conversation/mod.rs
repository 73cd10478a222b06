//! Conversation domain module.
//!
//! # Module Structure
//!
//! - `message`: Conversation ids and the message model
//! - `collection`: The per-conversation message collection trait and the
//!   snapshot feed its subscriptions deliver

mod collection;
mod message;

// Re-export public API
pub use collection::{FeedEvent, MessageCollection, SnapshotFeed};
pub use message::{ConversationId, Message, NewMessage};
