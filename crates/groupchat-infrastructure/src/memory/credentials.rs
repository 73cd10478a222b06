use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use groupchat_core::error::{ChatError, Result};
use groupchat_core::user::{CredentialProvider, Identity};

struct Account {
    uid: String,
    password: String,
}

/// Email/password accounts held in memory.
#[derive(Default)]
pub struct InMemoryCredentialProvider {
    accounts: Mutex<HashMap<String, Account>>,
    current: Mutex<Option<Identity>>,
    fail_sign_out: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl InMemoryCredentialProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) an account.
    pub fn register(&self, uid: impl Into<String>, email: impl Into<String>, password: impl Into<String>) {
        lock(&self.accounts).insert(
            email.into(),
            Account {
                uid: uid.into(),
                password: password.into(),
            },
        );
    }

    pub fn with_account(
        self,
        uid: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.register(uid, email, password);
        self
    }

    /// Makes every following `sign_out` fail until switched back.
    pub fn set_fail_sign_out(&self, fail: bool) {
        self.fail_sign_out.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl CredentialProvider for InMemoryCredentialProvider {
    async fn authenticate(&self, email: &str, password: &str) -> Result<Identity> {
        let accounts = lock(&self.accounts);
        let account = accounts
            .get(email)
            .filter(|account| account.password == password)
            .ok_or(ChatError::InvalidCredentials)?;

        let identity = Identity {
            uid: account.uid.clone(),
            email: email.to_string(),
        };
        *lock(&self.current) = Some(identity.clone());
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<()> {
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(ChatError::sign_out("credential provider unreachable"));
        }
        *lock(&self.current) = None;
        Ok(())
    }

    fn current_identity(&self) -> Option<Identity> {
        lock(&self.current).clone()
    }
}
