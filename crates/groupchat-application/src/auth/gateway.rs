use std::sync::Arc;

use groupchat_core::error::{ChatError, Result};
use groupchat_core::session::{SessionAction, SessionStore};
use groupchat_core::user::{CredentialProvider, Directory, User};

/// Signs users in and out and keeps the session store in step.
///
/// `AuthGateway` is responsible for:
/// - Authenticating email/password pairs against the credential provider
/// - Resolving the signed-in account's profile from the directory
/// - Dispatching the matching session transition
///
/// All I/O happens here; the session store only ever sees finished values.
pub struct AuthGateway {
    credentials: Arc<dyn CredentialProvider>,
    directory: Arc<dyn Directory>,
    session: Arc<SessionStore>,
}

impl AuthGateway {
    pub fn new(
        credentials: Arc<dyn CredentialProvider>,
        directory: Arc<dyn Directory>,
        session: Arc<SessionStore>,
    ) -> Self {
        Self {
            credentials,
            directory,
            session,
        }
    }

    /// Signs in with an email/password pair.
    ///
    /// When the directory returns several profiles for the email, each one is
    /// dispatched in turn and the last one is what the session ends up
    /// holding. That user is returned.
    ///
    /// # Errors
    ///
    /// - `ChatError::InvalidCredentials` if the pair is rejected
    /// - `ChatError::ProfileNotFound` if no profile matches the email
    /// - any error from the directory lookup
    ///
    /// The session is left untouched on every error path.
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let identity = self
            .credentials
            .authenticate(email, password)
            .await
            .inspect_err(|e| tracing::warn!(email, "Login rejected: {}", e))?;

        let profiles = self
            .directory
            .find_by_email(email)
            .await
            .inspect_err(|e| tracing::error!(email, "Profile lookup failed: {}", e))?;

        if profiles.len() > 1 {
            tracing::warn!(
                email,
                matches = profiles.len(),
                "Email matches several profiles; the last one wins"
            );
        }

        let mut signed_in = None;
        for user in profiles {
            tracing::info!(
                email,
                uid = %identity.uid,
                user_id = %user.id,
                "Login succeeded"
            );
            self.session.dispatch(SessionAction::SetUser(user.clone()));
            signed_in = Some(user);
        }

        signed_in.ok_or_else(|| {
            tracing::warn!(email, "No profile found for authenticated email");
            ChatError::profile_not_found(email)
        })
    }

    /// Signs out and clears the session.
    ///
    /// Signing out while nobody is signed in is not an error.
    ///
    /// # Errors
    ///
    /// Returns `ChatError::SignOut` if the credential provider fails; the
    /// stale session stays in place until a later logout succeeds.
    pub async fn logout(&self) -> Result<()> {
        self.credentials.sign_out().await.map_err(|e| {
            tracing::warn!("Logout failed: {}", e);
            match e {
                ChatError::SignOut(_) => e,
                other => ChatError::sign_out(other.to_string()),
            }
        })?;

        self.session.dispatch(SessionAction::ClearUser);
        tracing::info!("Logged out");
        Ok(())
    }

    /// Re-establishes the session from the provider's remembered identity.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(user))`: A signed-in account was found and is now the current user
    /// - `Ok(None)`: Nobody is signed in with the provider; the session is untouched
    pub async fn restore_session(&self) -> Result<Option<User>> {
        let Some(identity) = self.credentials.current_identity() else {
            tracing::debug!("No remembered identity to restore");
            return Ok(None);
        };

        let user = self
            .directory
            .find_by_id(&identity.uid)
            .await?
            .ok_or_else(|| {
                tracing::warn!(uid = %identity.uid, "Remembered identity has no profile");
                ChatError::profile_not_found(&identity.email)
            })?;

        self.session.dispatch(SessionAction::SetUser(user.clone()));
        tracing::info!(user_id = %user.id, "Session restored");
        Ok(Some(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use groupchat_core::session::Session;
    use groupchat_core::user::Identity;
    use std::sync::Mutex;

    // Mock CredentialProvider for testing
    struct MockCredentials {
        password: &'static str,
        current: Mutex<Option<Identity>>,
        fail_sign_out: bool,
    }

    impl MockCredentials {
        fn new(password: &'static str) -> Self {
            Self {
                password,
                current: Mutex::new(None),
                fail_sign_out: false,
            }
        }
    }

    #[async_trait]
    impl CredentialProvider for MockCredentials {
        async fn authenticate(&self, email: &str, password: &str) -> Result<Identity> {
            if password != self.password {
                return Err(ChatError::InvalidCredentials);
            }
            let identity = Identity {
                uid: format!("uid-{email}"),
                email: email.to_string(),
            };
            *self.current.lock().unwrap() = Some(identity.clone());
            Ok(identity)
        }

        async fn sign_out(&self) -> Result<()> {
            if self.fail_sign_out {
                return Err(ChatError::data_access("network down"));
            }
            *self.current.lock().unwrap() = None;
            Ok(())
        }

        fn current_identity(&self) -> Option<Identity> {
            self.current.lock().unwrap().clone()
        }
    }

    // Mock Directory for testing
    struct MockDirectory {
        users: Vec<User>,
    }

    #[async_trait]
    impl Directory for MockDirectory {
        async fn find_by_id(&self, user_id: &str) -> Result<Option<User>> {
            Ok(self.users.iter().find(|u| u.id == user_id).cloned())
        }

        async fn find_by_email(&self, email: &str) -> Result<Vec<User>> {
            Ok(self
                .users
                .iter()
                .filter(|u| u.email == email)
                .cloned()
                .collect())
        }
    }

    fn gateway(credentials: MockCredentials, users: Vec<User>) -> (AuthGateway, Arc<SessionStore>) {
        let session = Arc::new(SessionStore::new());
        let gateway = AuthGateway::new(
            Arc::new(credentials),
            Arc::new(MockDirectory { users }),
            session.clone(),
        );
        (gateway, session)
    }

    #[tokio::test]
    async fn test_login_sets_user() {
        let alice = User::new("u1", "a@x.com", "Alice");
        let (gateway, session) = gateway(MockCredentials::new("pw"), vec![alice.clone()]);

        let user = gateway.login("a@x.com", "pw").await.unwrap();

        assert_eq!(user, alice);
        assert_eq!(session.current(), Session::authenticated(alice));
    }

    #[tokio::test]
    async fn test_wrong_password_leaves_session_untouched() {
        let (gateway, session) = gateway(
            MockCredentials::new("pw"),
            vec![User::new("u1", "a@x.com", "Alice")],
        );

        let err = gateway.login("a@x.com", "nope").await.unwrap_err();

        assert_eq!(err, ChatError::InvalidCredentials);
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_missing_profile_is_reported() {
        let (gateway, session) = gateway(MockCredentials::new("pw"), Vec::new());

        let err = gateway.login("ghost@x.com", "pw").await.unwrap_err();

        assert_eq!(err, ChatError::profile_not_found("ghost@x.com"));
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_duplicate_profiles_last_one_wins() {
        let first = User::new("u1", "dup@x.com", "First");
        let second = User::new("u2", "dup@x.com", "Second");
        let (gateway, session) =
            gateway(MockCredentials::new("pw"), vec![first.clone(), second.clone()]);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        session.subscribe(move |s| {
            sink.lock().unwrap().push(s.current_user.clone());
        });

        let user = gateway.login("dup@x.com", "pw").await.unwrap();

        assert_eq!(user, second);
        assert_eq!(session.current_user(), Some(second.clone()));
        assert_eq!(*seen.lock().unwrap(), vec![Some(first), Some(second)]);
    }

    #[tokio::test]
    async fn test_logout_while_anonymous_is_fine() {
        let (gateway, session) = gateway(MockCredentials::new("pw"), Vec::new());

        gateway.logout().await.unwrap();

        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_failed_logout_keeps_stale_session() {
        let alice = User::new("u1", "a@x.com", "Alice");
        let mut credentials = MockCredentials::new("pw");
        credentials.fail_sign_out = true;
        let (gateway, session) = gateway(credentials, vec![alice.clone()]);
        gateway.login("a@x.com", "pw").await.unwrap();

        let err = gateway.logout().await.unwrap_err();

        assert!(matches!(err, ChatError::SignOut(_)));
        assert_eq!(session.current_user(), Some(alice));
    }

    #[tokio::test]
    async fn test_restore_session_without_identity() {
        let (gateway, session) = gateway(MockCredentials::new("pw"), Vec::new());

        assert_eq!(gateway.restore_session().await.unwrap(), None);
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_restore_session_from_identity() {
        let alice = User::new("uid-a@x.com", "a@x.com", "Alice");
        let credentials = MockCredentials::new("pw");
        *credentials.current.lock().unwrap() = Some(Identity {
            uid: alice.id.clone(),
            email: alice.email.clone(),
        });
        let (gateway, session) = gateway(credentials, vec![alice.clone()]);

        let restored = gateway.restore_session().await.unwrap();

        assert_eq!(restored, Some(alice.clone()));
        assert_eq!(session.current_user(), Some(alice));
    }
}
