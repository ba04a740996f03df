//! Identity: the provider contract, a local provider, and the session context
//! the IPC layer consults.

mod context;
mod local;
mod token;

pub use context::{IdentityState, SessionContext};
pub use local::LocalAuthProvider;
pub use token::parse_token_fragment;

use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("auth provider is not configured: {0} is empty")]
    NotConfigured(&'static str),

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    Expired,

    #[error("{0}")]
    Provider(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub user: User,
    pub tokens: TokenPair,
    /// Unix seconds.
    pub expires_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthRequest {
    pub provider: String,
    pub redirect_to: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
}

pub type AuthListener = Box<dyn Fn(AuthEvent, Option<&AuthSession>) + Send + Sync>;

type SharedListener = Arc<dyn Fn(AuthEvent, Option<&AuthSession>) + Send + Sync>;

/// What the daemon needs from an identity provider.
pub trait AuthProvider {
    fn get_session(&self) -> Result<Option<AuthSession>, AuthError>;

    fn set_session(&self, tokens: &TokenPair) -> Result<AuthSession, AuthError>;

    /// Returns the URL the browser must be sent to.
    fn sign_in_with_oauth(&self, request: &OAuthRequest) -> Result<String, AuthError>;

    fn sign_out(&self) -> Result<(), AuthError>;

    fn on_auth_state_change(&self, listener: AuthListener) -> Subscription;
}

#[derive(Default)]
struct ListenerSet {
    next_id: u64,
    entries: Vec<(u64, SharedListener)>,
}

/// Listener registry a provider notifies on sign-in and sign-out.
#[derive(Clone, Default)]
pub struct Listeners {
    inner: Arc<Mutex<ListenerSet>>,
}

impl Listeners {
    pub fn subscribe(&self, listener: AuthListener) -> Subscription {
        let mut set = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        set.next_id += 1;
        let id = set.next_id;
        set.entries.push((id, Arc::from(listener)));
        Subscription {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Calls every listener outside the registry lock, so a listener may
    /// subscribe or drop its own subscription.
    pub fn notify(&self, event: AuthEvent, session: Option<&AuthSession>) {
        let snapshot: Vec<SharedListener> = self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in snapshot {
            listener(event, session);
        }
    }

    #[cfg(test)]
    fn listener_count(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }
}

/// Handle to a registered listener; dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<ListenerSet>>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            let mut set = registry.lock().unwrap_or_else(PoisonError::into_inner);
            set.entries.retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn dropping_a_subscription_removes_the_listener() {
        let listeners = Listeners::default();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let sub = listeners.subscribe(Box::new(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        listeners.notify(AuthEvent::SignedOut, None);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        sub.unsubscribe();
        assert_eq!(listeners.listener_count(), 0);
        listeners.notify(AuthEvent::SignedOut, None);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn listeners_may_touch_the_registry_while_notified() {
        let listeners = Listeners::default();
        let held: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        let registry = listeners.clone();
        let slot = Arc::clone(&held);
        let first = listeners.subscribe(Box::new(move |_, _| {
            // Subscribe from inside a notification, then drop that handle again.
            let extra = registry.subscribe(Box::new(|_, _| {}));
            let previous = slot.lock().expect("slot").replace(extra);
            drop(previous);
        }));

        listeners.notify(AuthEvent::SignedIn, None);
        assert_eq!(listeners.listener_count(), 2);
        listeners.notify(AuthEvent::SignedOut, None);
        assert_eq!(listeners.listener_count(), 2);

        drop(first);
        held.lock().expect("slot").take();
        assert_eq!(listeners.listener_count(), 0);
    }
}
