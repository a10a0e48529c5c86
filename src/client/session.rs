use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::dto::UserProfile;

use super::api::AuthApi;
use super::token_store::TokenStore;
use super::ClientError;

/// Client-side view of who is logged in. Starts loading; resolved exactly
/// once per token check.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: Option<UserProfile>,
    pub authenticated: bool,
    pub loading: bool,
}

impl Session {
    fn initializing() -> Self {
        Self {
            user: None,
            authenticated: false,
            loading: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    Initializing,
    Anonymous,
    Authenticated,
}

/// Owns the session state machine: Initializing until the first token check
/// resolves, then cycles between Anonymous and Authenticated for the app's
/// lifetime.
pub struct SessionManager {
    auth: Arc<dyn AuthApi>,
    tokens: Arc<dyn TokenStore>,
    session: Session,
    phase: AuthPhase,
}

impl SessionManager {
    pub fn new(auth: Arc<dyn AuthApi>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            auth,
            tokens,
            session: Session::initializing(),
            phase: AuthPhase::Initializing,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn phase(&self) -> AuthPhase {
        self.phase
    }

    pub fn token(&self) -> Option<String> {
        self.tokens.get()
    }

    /// Resolve the session from the stored token. Never errors: any failure
    /// (missing token, rejected token, unreachable server) clears the token
    /// and lands in Anonymous.
    pub async fn check_auth(&mut self) {
        self.session.loading = true;

        let Some(token) = self.tokens.get() else {
            self.resolve_anonymous();
            return;
        };

        match self.auth.whoami(&token).await {
            Ok(user) => self.resolve_authenticated(user),
            Err(e) => {
                warn!(error = %e, "stored token rejected, falling back to anonymous");
                self.tokens.clear();
                self.resolve_anonymous();
            }
        }
    }

    /// On success the token is persisted before the session flips. On
    /// failure the session settles (loading = false) without disturbing the
    /// previous user or the stored token, and the error is surfaced.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<(), ClientError> {
        self.session.loading = true;
        match self.auth.login(email, password).await {
            Ok(resp) => {
                self.tokens.set(&resp.token);
                info!(user_id = %resp.user.id, "logged in");
                self.resolve_authenticated(resp.user);
                Ok(())
            }
            Err(e) => {
                self.session.loading = false;
                Err(e)
            }
        }
    }

    /// Same contract as `login`; the server rejects already-registered
    /// emails.
    pub async fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(), ClientError> {
        self.session.loading = true;
        match self.auth.register(name, email, password).await {
            Ok(resp) => {
                self.tokens.set(&resp.token);
                info!(user_id = %resp.user.id, "registered");
                self.resolve_authenticated(resp.user);
                Ok(())
            }
            Err(e) => {
                self.session.loading = false;
                Err(e)
            }
        }
    }

    /// Synchronous: no network call, just drop the token and go anonymous.
    pub fn logout(&mut self) {
        self.tokens.clear();
        self.resolve_anonymous();
    }

    fn resolve_authenticated(&mut self, user: UserProfile) {
        self.session = Session {
            user: Some(user),
            authenticated: true,
            loading: false,
        };
        self.phase = AuthPhase::Authenticated;
    }

    fn resolve_anonymous(&mut self) {
        self.session = Session {
            user: None,
            authenticated: false,
            loading: false,
        };
        self.phase = AuthPhase::Anonymous;
    }
}
