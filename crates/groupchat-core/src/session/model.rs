use serde::{Deserialize, Serialize};

use crate::user::User;

/// Process-wide record of the currently authenticated user.
///
/// A `Session` is replaced wholesale on every transition; it is never patched
/// field by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub current_user: Option<User>,
}

/// The two states of the session automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Anonymous,
    Authenticated,
}

impl Session {
    /// A session with nobody signed in.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user: User) -> Self {
        Self {
            current_user: Some(user),
        }
    }

    pub fn status(&self) -> SessionStatus {
        match self.current_user {
            Some(_) => SessionStatus::Authenticated,
            None => SessionStatus::Anonymous,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user.is_some()
    }
}
