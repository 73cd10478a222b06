//! Domain layer for the group chat core.
//!
//! Holds the data model, the session store and the traits for the external
//! collaborators (profile directory, credential provider, message collection).

pub mod conversation;
pub mod error;
pub mod session;
pub mod user;

// Re-export common error type
pub use error::{ChatError, Result};
