//! Directory trait.
//!
//! Defines the read-only profile lookup the core depends on.

use super::model::User;
use crate::error::Result;
use async_trait::async_trait;

/// A read-only, keyed profile store.
///
/// The core never writes to the directory. Lookups are network-bound in a
/// real deployment and therefore async.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Finds a profile by its user id.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(User))`: Profile found
    /// - `Ok(None)`: No profile with that id
    /// - `Err(_)`: The lookup itself failed
    async fn find_by_id(&self, user_id: &str) -> Result<Option<User>>;

    /// Finds every profile registered under an email.
    ///
    /// The directory does not enforce email uniqueness, so more than one
    /// profile may come back. Results are in the directory's own order.
    async fn find_by_email(&self, email: &str) -> Result<Vec<User>>;
}
