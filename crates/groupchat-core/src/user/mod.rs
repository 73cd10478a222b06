//! User domain module.
//!
//! This module contains the user profile model and the two external
//! collaborators that know about users: the read-only profile directory and
//! the credential provider.
//!
//! # Module Structure
//!
//! - `model`: User profile domain model
//! - `directory`: Keyed profile lookup trait
//! - `credentials`: Authentication provider trait and identity type
//!
//! # Usage
//!
//! ```ignore
//! use groupchat_core::user::{User, Directory, CredentialProvider, Identity};
//! ```

mod credentials;
mod directory;
mod model;

// Re-export public API
pub use credentials::{CredentialProvider, Identity};
pub use directory::Directory;
pub use model::User;
