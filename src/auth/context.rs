use super::{
    parse_token_fragment, AuthError, AuthProvider, AuthSession, OAuthRequest, Subscription, User,
};
use crate::routes::HOME_PATH;
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum IdentityState {
    Unauthenticated,
    Authenticating,
    Authenticated {
        user: User,
        /// Unix seconds after which the identity no longer counts.
        #[serde(rename = "expiresAt")]
        expires_at: i64,
    },
}

impl IdentityState {
    fn from_session(session: Option<&AuthSession>) -> Self {
        match session {
            Some(s) => IdentityState::Authenticated {
                user: s.user.clone(),
                expires_at: s.expires_at,
            },
            None => IdentityState::Unauthenticated,
        }
    }

    /// Signed in with a session still valid at `now` (unix seconds).
    pub fn is_signed_in(&self, now: i64) -> bool {
        matches!(self, IdentityState::Authenticated { expires_at, .. } if *expires_at > now)
    }
}

/// Who is signed in, kept current by a provider subscription.
///
/// Created at startup, handed to whatever needs to gate access, and shut down
/// (subscription cancelled) when the daemon exits.
pub struct SessionContext {
    state: Arc<Mutex<IdentityState>>,
    subscription: Option<Subscription>,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionContext {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(IdentityState::Unauthenticated)),
            subscription: None,
        }
    }

    /// Current identity; a session past its expiry reads as signed out.
    pub fn state(&self) -> IdentityState {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let IdentityState::Authenticated { user, expires_at } = &*state {
            if *expires_at <= chrono::Utc::now().timestamp() {
                info!(user = %user.id, "session expired");
                *state = IdentityState::Unauthenticated;
            }
        }
        state.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state().is_signed_in(chrono::Utc::now().timestamp())
    }

    fn set(&self, next: IdentityState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }

    /// Establishes identity from an OAuth redirect URL (if it carries tokens)
    /// and the provider's current session, then follows provider changes.
    pub fn init(&mut self, provider: &dyn AuthProvider, current_url: &str) -> IdentityState {
        self.set(IdentityState::Authenticating);

        if let Some(tokens) = parse_token_fragment(current_url) {
            if let Err(e) = provider.set_session(&tokens) {
                warn!(error = %e, "could not establish session from redirect tokens");
            }
        }

        let next = match provider.get_session() {
            Ok(Some(session)) => IdentityState::from_session(Some(&session)),
            Ok(None) => IdentityState::Unauthenticated,
            Err(e) => {
                warn!(error = %e, "could not read current session");
                IdentityState::Unauthenticated
            }
        };
        self.set(next);

        let state = Arc::clone(&self.state);
        // Replacing the old handle drops it, which unsubscribes.
        self.subscription = Some(provider.on_auth_state_change(Box::new(move |_, session| {
            *state.lock().unwrap_or_else(PoisonError::into_inner) =
                IdentityState::from_session(session);
        })));

        self.state()
    }

    pub fn login(&self, provider: &dyn AuthProvider, request: &OAuthRequest) -> Result<String, AuthError> {
        provider.sign_in_with_oauth(request).inspect_err(|e| {
            warn!(error = %e, provider = %request.provider, "oauth sign-in failed");
        })
    }

    /// Signs out and clears identity whatever the provider answers. Returns
    /// the path the UI must navigate to.
    pub fn logout(&mut self, provider: &dyn AuthProvider) -> &'static str {
        if let Err(e) = provider.sign_out() {
            warn!(error = %e, "provider sign-out failed");
        }
        self.set(IdentityState::Unauthenticated);
        HOME_PATH
    }

    pub fn shutdown(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
            info!("identity subscription closed");
        }
    }
}
