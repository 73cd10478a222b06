//! Error types for the group chat core.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for every layer of the chat core.
///
/// Each failing stage of login, logout, sending or subscribing maps onto one
/// variant here and is returned to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatError {
    /// The credential provider rejected the email/password pair
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// A raw session action carried a tag the reducer does not know
    #[error("Unhandled action type: {action_type}")]
    UnknownAction { action_type: String },

    /// The outgoing text was blank after trimming
    #[error("Message is empty")]
    EmptyMessage,

    /// A send was attempted while nobody is signed in
    #[error("User is not logged in")]
    NotAuthenticated,

    /// The sender's display name could not be resolved
    #[error("Could not resolve sender '{user_id}': {reason}")]
    SenderResolution { user_id: String, reason: String },

    /// The live message subscription failed at the transport level
    #[error("Stream error: {0}")]
    Stream(String),

    /// Authentication succeeded but the directory has no profile for the email
    #[error("No profile found for email '{email}'")]
    ProfileNotFound { email: String },

    /// Signing out of the credential provider failed
    #[error("Sign-out failed: {0}")]
    SignOut(String),

    /// Data access error (directory or message collection)
    #[error("Data access error: {0}")]
    DataAccess(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },
}

impl ChatError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an UnknownAction error
    pub fn unknown_action(action_type: impl Into<String>) -> Self {
        Self::UnknownAction {
            action_type: action_type.into(),
        }
    }

    /// Creates a SenderResolution error
    pub fn sender_resolution(user_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SenderResolution {
            user_id: user_id.into(),
            reason: reason.into(),
        }
    }

    /// Creates a Stream error
    pub fn stream(message: impl Into<String>) -> Self {
        Self::Stream(message.into())
    }

    /// Creates a ProfileNotFound error
    pub fn profile_not_found(email: impl Into<String>) -> Self {
        Self::ProfileNotFound {
            email: email.into(),
        }
    }

    /// Creates a SignOut error
    pub fn sign_out(message: impl Into<String>) -> Self {
        Self::SignOut(message.into())
    }

    /// Creates a DataAccess error
    pub fn data_access(message: impl Into<String>) -> Self {
        Self::DataAccess(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is an UnknownAction error
    pub fn is_unknown_action(&self) -> bool {
        matches!(self, Self::UnknownAction { .. })
    }

    /// Check if this is a Stream error
    pub fn is_stream(&self) -> bool {
        matches!(self, Self::Stream(_))
    }

    /// Check if this error is a local validation failure.
    ///
    /// Validation failures mean "nothing to do": no I/O was performed and the
    /// caller can drop them silently.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::EmptyMessage)
    }

    /// Check if this error should be shown to the end user as an
    /// authentication problem.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::InvalidCredentials | Self::NotAuthenticated)
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for ChatError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for ChatError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, ChatError>`.
pub type Result<T> = std::result::Result<T, ChatError>;
