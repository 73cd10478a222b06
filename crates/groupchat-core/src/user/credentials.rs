//! Credential provider trait.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The identity the credential provider reports for a signed-in account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Provider-issued user id; matches `User::id` in the directory
    pub uid: String,
    pub email: String,
}

/// Authenticates email/password pairs and tracks the signed-in account.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Authenticates the pair.
    ///
    /// # Errors
    ///
    /// Returns `ChatError::InvalidCredentials` when the pair is rejected.
    async fn authenticate(&self, email: &str, password: &str) -> Result<Identity>;

    /// Signs the current account out. Signing out while nobody is signed in
    /// succeeds.
    async fn sign_out(&self) -> Result<()>;

    /// Returns the currently authenticated identity, if any.
    fn current_identity(&self) -> Option<Identity>;
}
