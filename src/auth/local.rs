use super::token::verify_access_token;
use super::{
    AuthError, AuthEvent, AuthListener, AuthProvider, AuthSession, Listeners, OAuthRequest,
    Subscription, TokenPair, User,
};
use crate::config::AuthConfig;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info};
use uuid::Uuid;

/// In-process provider: verifies HMAC-signed access tokens issued by the
/// external identity service and keeps the current session in memory.
pub struct LocalAuthProvider {
    config: AuthConfig,
    current: Mutex<Option<AuthSession>>,
    listeners: Listeners,
}

impl LocalAuthProvider {
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config,
            current: Mutex::new(None),
            listeners: Listeners::default(),
        }
    }

    fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }
}

impl AuthProvider for LocalAuthProvider {
    fn get_session(&self) -> Result<Option<AuthSession>, AuthError> {
        let expired = {
            let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
            let lapsed = current
                .as_ref()
                .is_some_and(|s| s.expires_at <= Self::now());
            if !lapsed {
                return Ok(current.clone());
            }
            current.take()
        };
        if let Some(session) = expired {
            debug!(user = %session.user.id, "stored session expired");
            self.listeners.notify(AuthEvent::SignedOut, None);
        }
        Ok(None)
    }

    fn set_session(&self, tokens: &TokenPair) -> Result<AuthSession, AuthError> {
        if self.config.token_secret.is_empty() {
            return Err(AuthError::NotConfigured("auth.token_secret"));
        }
        if tokens.refresh_token.trim().is_empty() {
            return Err(AuthError::InvalidToken("refresh token is empty".into()));
        }
        let claims = verify_access_token(&tokens.access_token, &self.config.token_secret, Self::now())?;
        let session = AuthSession {
            user: User {
                id: claims.sub,
                email: claims.email,
                name: claims.name,
            },
            tokens: tokens.clone(),
            expires_at: claims.exp,
        };

        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        info!(user = %session.user.id, "session established");
        self.listeners.notify(AuthEvent::SignedIn, Some(&session));
        Ok(session)
    }

    fn sign_in_with_oauth(&self, request: &OAuthRequest) -> Result<String, AuthError> {
        if self.config.authorize_url.is_empty() {
            return Err(AuthError::NotConfigured("auth.authorize_url"));
        }
        if request.provider.trim().is_empty() {
            return Err(AuthError::Provider("oauth provider must not be empty".into()));
        }
        let separator = if self.config.authorize_url.contains('?') {
            '&'
        } else {
            '?'
        };
        Ok(format!(
            "{}{}provider={}&redirect_to={}&state={}",
            self.config.authorize_url,
            separator,
            urlencoding::encode(&request.provider),
            urlencoding::encode(&request.redirect_to),
            Uuid::new_v4().simple()
        ))
    }

    fn sign_out(&self) -> Result<(), AuthError> {
        let previous = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(session) = previous {
            info!(user = %session.user.id, "signed out");
        }
        self.listeners.notify(AuthEvent::SignedOut, None);
        Ok(())
    }

    fn on_auth_state_change(&self, listener: AuthListener) -> Subscription {
        self.listeners.subscribe(listener)
    }
}
