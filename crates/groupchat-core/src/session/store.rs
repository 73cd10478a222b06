//! The session store.
//!
//! One `SessionStore` exists per application. It is created at startup and
//! handed by `Arc` to every component that needs to know who is signed in.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use super::action::{RawAction, SessionAction, reduce};
use super::model::Session;
use crate::error::Result;
use crate::user::User;

type Listener = Arc<dyn Fn(&Session) + Send + Sync>;

/// Handle returned by [`SessionStore::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct StoreState {
    session: Session,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener_id: u64,
}

/// Reducer-based container for the current session.
///
/// Every transition goes through [`dispatch`](Self::dispatch). Dispatches are
/// serialized, and the new session is swapped in under the state lock, so no
/// observer sees a half-applied state. Listeners are called for every new
/// session, in dispatch order, after the state lock is released: they may read
/// the store but must not dispatch.
pub struct SessionStore {
    dispatching: Mutex<()>,
    state: Mutex<StoreState>,
    watch_tx: watch::Sender<Session>,
}

impl SessionStore {
    /// Creates a store with nobody signed in.
    pub fn new() -> Self {
        Self::with_session(Session::anonymous())
    }

    pub fn with_session(session: Session) -> Self {
        let (watch_tx, _) = watch::channel(session.clone());
        Self {
            dispatching: Mutex::new(()),
            state: Mutex::new(StoreState {
                session,
                listeners: Vec::new(),
                next_listener_id: 0,
            }),
            watch_tx,
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies `action` and returns the new session.
    pub fn dispatch(&self, action: SessionAction) -> Session {
        let action_type = action.action_type();
        let _serial = self
            .dispatching
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let (next, listeners) = {
            let mut state = self.lock();
            let next = reduce(&state.session, action);
            state.session = next.clone();
            let listeners: Vec<Listener> = state
                .listeners
                .iter()
                .map(|(_, listener)| listener.clone())
                .collect();
            (next, listeners)
        };
        self.watch_tx.send_replace(next.clone());

        tracing::debug!(
            action = action_type,
            user_id = next.current_user.as_ref().map(|u| u.id.as_str()),
            "Session transition applied"
        );

        for listener in &listeners {
            listener(&next);
        }

        next
    }

    /// Converts and applies an untyped action.
    ///
    /// # Errors
    ///
    /// Returns `ChatError::UnknownAction` for any tag outside the known set.
    /// The session is left unchanged in that case.
    pub fn dispatch_raw(&self, raw: RawAction) -> Result<Session> {
        let action = SessionAction::try_from(raw).inspect_err(|e| {
            tracing::error!("Rejected session action: {}", e);
        })?;
        Ok(self.dispatch(action))
    }

    /// Registers a callback invoked with every new session.
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Session) + Send + Sync + 'static,
    {
        let mut state = self.lock();
        let id = ListenerId(state.next_listener_id);
        state.next_listener_id += 1;
        state.listeners.push((id, Arc::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut state = self.lock();
        let before = state.listeners.len();
        state.listeners.retain(|(listener_id, _)| *listener_id != id);
        state.listeners.len() != before
    }

    /// Returns an async view that always holds the latest session.
    ///
    /// Unlike [`subscribe`](Self::subscribe), a slow reader only sees the most
    /// recent value and skips intermediate ones.
    pub fn watch(&self) -> SessionSubscription {
        SessionSubscription {
            rx: self.watch_tx.subscribe(),
        }
    }

    /// Returns a copy of the current session.
    pub fn current(&self) -> Session {
        self.lock().session.clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.lock().session.current_user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().session.is_authenticated()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Latest-value view of the session store.
pub struct SessionSubscription {
    rx: watch::Receiver<Session>,
}

impl SessionSubscription {
    /// The session as of the last observed change.
    pub fn current(&self) -> Session {
        self.rx.borrow().clone()
    }

    /// Waits for the next transition and returns the new session.
    ///
    /// Returns `None` once the store has been dropped.
    pub async fn changed(&mut self) -> Option<Session> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}
