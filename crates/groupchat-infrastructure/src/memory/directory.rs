use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use groupchat_core::error::{ChatError, Result};
use groupchat_core::user::{Directory, User};
use tokio::sync::RwLock;

/// Profile directory held in memory.
///
/// Profiles are kept in insertion order, which is the order
/// `find_by_email` reports duplicates in.
#[derive(Default)]
pub struct InMemoryDirectory {
    users: RwLock<Vec<User>>,
    offline: AtomicBool,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: RwLock::new(users.into_iter().collect()),
            offline: AtomicBool::new(false),
        }
    }

    pub async fn insert(&self, user: User) {
        self.users.write().await.push(user);
    }

    /// While offline, every lookup fails with `ChatError::DataAccess`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ChatError::data_access("directory unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl Directory for InMemoryDirectory {
    async fn find_by_id(&self, user_id: &str) -> Result<Option<User>> {
        self.ensure_online()?;
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Vec<User>> {
        self.ensure_online()?;
        let users = self.users.read().await;
        Ok(users.iter().filter(|u| u.email == email).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_by_id_and_email() {
        let directory = InMemoryDirectory::with_users([User::new("u1", "a@x.com", "Alice")]);
        directory.insert(User::new("u2", "b@x.com", "Bob")).await;

        assert_eq!(
            directory.find_by_id("u2").await.unwrap().map(|u| u.display_name),
            Some("Bob".to_string())
        );
        assert!(directory.find_by_id("nobody").await.unwrap().is_none());
        assert_eq!(directory.find_by_email("a@x.com").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicates_come_back_in_insertion_order() {
        let directory = InMemoryDirectory::with_users([
            User::new("u1", "dup@x.com", "First"),
            User::new("u2", "dup@x.com", "Second"),
        ]);

        let ids: Vec<String> = directory
            .find_by_email("dup@x.com")
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.id)
            .collect();

        assert_eq!(ids, vec!["u1", "u2"]);
    }

    #[tokio::test]
    async fn test_offline_directory_fails() {
        let directory = InMemoryDirectory::with_users([User::new("u1", "a@x.com", "Alice")]);
        directory.set_offline(true);

        assert!(directory.find_by_id("u1").await.is_err());
        assert!(directory.find_by_email("a@x.com").await.is_err());
    }
}
