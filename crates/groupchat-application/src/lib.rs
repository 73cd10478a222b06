//! Application layer for the group chat core.
//!
//! Use cases that coordinate the domain types with the external
//! collaborators: signing in and out, following a conversation live, and
//! sending messages.

pub mod auth;
pub mod chat;

pub use auth::AuthGateway;
pub use chat::{ChatStream, LiveMessages, MessageComposer, StreamState};
