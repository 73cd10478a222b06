//! Session domain module.
//!
//! Holds the single authoritative "who is signed in" value and the reducer
//! that moves it between `Anonymous` and `Authenticated(user)`.
//!
//! # Module Structure
//!
//! - `model`: The `Session` value
//! - `action`: Typed actions, the raw action boundary and the reducer
//! - `store`: `SessionStore`, the container consumers share by reference
//!
//! # Usage
//!
//! ```ignore
//! use groupchat_core::session::{SessionAction, SessionStore};
//!
//! let store = SessionStore::new();
//! store.dispatch(SessionAction::SetUser(user));
//! ```

mod action;
mod model;
mod store;

// Re-export public API
pub use action::{RawAction, SessionAction, reduce};
pub use model::{Session, SessionStatus};
pub use store::{ListenerId, SessionStore, SessionSubscription};
