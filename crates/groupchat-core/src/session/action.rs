//! Session actions and the reducer.
//!
//! `SessionAction` is closed: `dispatch` cannot be handed anything the reducer
//! does not know. Loosely typed actions arriving from outside (a `{ "type",
//! "value" }` object) go through `RawAction`, and that conversion is where an
//! unknown tag fails.

use serde::{Deserialize, Serialize};

use super::model::Session;
use crate::error::{ChatError, Result};
use crate::user::User;

/// Transitions the session store accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Replace the current user.
    SetUser(User),
    /// Sign the current user out of the session.
    ClearUser,
}

impl SessionAction {
    pub const SET_USER: &'static str = "SET_USER";
    pub const CLEAR_USER: &'static str = "CLEAR_USER";
    /// Older single-tag form: present value means set, absent value means clear.
    pub const USER_LOGIN: &'static str = "USER_LOGIN";

    /// Wire tag of this action.
    pub fn action_type(&self) -> &'static str {
        match self {
            Self::SetUser(_) => Self::SET_USER,
            Self::ClearUser => Self::CLEAR_USER,
        }
    }
}

/// An untyped action as it arrives from a serialized source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAction {
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<User>,
}

impl RawAction {
    pub fn new(action_type: impl Into<String>, value: Option<User>) -> Self {
        Self {
            action_type: action_type.into(),
            value,
        }
    }
}

impl From<SessionAction> for RawAction {
    fn from(action: SessionAction) -> Self {
        let action_type = action.action_type();
        match action {
            SessionAction::SetUser(user) => Self::new(action_type, Some(user)),
            SessionAction::ClearUser => Self::new(action_type, None),
        }
    }
}

impl TryFrom<RawAction> for SessionAction {
    type Error = ChatError;

    fn try_from(raw: RawAction) -> Result<Self> {
        match (raw.action_type.as_str(), raw.value) {
            (SessionAction::SET_USER, Some(user)) | (SessionAction::USER_LOGIN, Some(user)) => {
                Ok(SessionAction::SetUser(user))
            }
            (SessionAction::CLEAR_USER, _) | (SessionAction::USER_LOGIN, None) => {
                Ok(SessionAction::ClearUser)
            }
            // SET_USER without a user has no transition either
            (other, _) => Err(ChatError::unknown_action(other)),
        }
    }
}

/// Pure transition function: the next session for `action`.
///
/// Neither transition depends on the prior session; the parameter keeps the
/// usual reducer shape.
pub fn reduce(_session: &Session, action: SessionAction) -> Session {
    match action {
        SessionAction::SetUser(user) => Session::authenticated(user),
        SessionAction::ClearUser => Session::anonymous(),
    }
}
