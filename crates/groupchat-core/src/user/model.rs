//! User profile domain model.

use serde::{Deserialize, Serialize};

/// A member profile as stored in the directory.
///
/// Profiles are immutable once loaded. The session holds the loaded value and
/// replaces it wholesale; nothing edits a `User` in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Stable, unique user identifier
    pub id: String,
    /// Login email
    pub email: String,
    /// Name shown next to the user's messages
    pub display_name: String,
}

impl User {
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            display_name: display_name.into(),
        }
    }
}
