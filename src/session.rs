//! Session context: who is signed in, derived from the stored tokens
//!
//! ```text
//!   Unknown ──start()──► Authenticated(user)   (tokens stored, user fetched)
//!      │                        │
//!      └──────────────► Anonymous ◄── logout() / failed fetch
//! ```
//!
//! `login()` re-runs the fetch from any state; it never re-enters `Unknown`.

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError, ReqwestTransport, Transport};
use crate::models::{TokenPair, User};

/// Client-side belief about the current session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Startup, before the first user fetch completes
    #[default]
    Unknown,
    /// Tokens are valid for this user
    Authenticated(User),
    /// Nobody is signed in
    Anonymous,
}

/// Owns the session state machine; views only read it
pub struct Session<T = ReqwestTransport> {
    client: ApiClient<T>,
    state: SessionState,
}

impl<T: Transport + 'static> Session<T> {
    /// Create a session in the `Unknown` state
    pub fn new(client: ApiClient<T>) -> Self {
        Self {
            client,
            state: SessionState::Unknown,
        }
    }

    /// The API client this session drives
    pub const fn client(&self) -> &ApiClient<T> {
        &self.client
    }

    /// Current state
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// Signed-in user, if any
    pub const fn user(&self) -> Option<&User> {
        match &self.state {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    /// Always `user().is_some()`
    pub const fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }

    /// True only until `start()` finishes
    pub const fn is_loading(&self) -> bool {
        matches!(self.state, SessionState::Unknown)
    }

    /// Resolve the startup state from stored credentials
    pub async fn start(&mut self) -> &SessionState {
        if self.client.store().get().is_none() {
            debug!("No stored tokens, starting anonymous");
            self.state = SessionState::Anonymous;
            return &self.state;
        }

        // The error is already reflected in the state
        let _ = self.fetch_user().await;
        &self.state
    }

    /// Store a fresh token pair and fetch the user it belongs to
    pub async fn login(&mut self, pair: &TokenPair) -> Result<User, ApiError> {
        self.client
            .store()
            .set(pair)
            .map_err(|e| ApiError::Storage(format!("{e:#}")))?;
        self.fetch_user().await
    }

    /// Sign out locally and notify the backend in the background.
    ///
    /// Local state is cleared before anything is sent. The returned handle
    /// lets short-lived callers wait for the notice; its outcome is ignored.
    /// Must be called from within a Tokio runtime.
    pub fn logout(&mut self) -> Option<JoinHandle<()>> {
        let access = self.client.store().access_token();

        if let Err(e) = self.client.store().clear() {
            warn!("Failed to clear stored tokens: {:#}", e);
        }
        self.state = SessionState::Anonymous;
        info!("Logged out");

        let access = access?;
        let client = self.client.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = client.notify_logout(&access).await {
                debug!("Logout notice failed: {}", e);
            }
        }))
    }

    async fn fetch_user(&mut self) -> Result<User, ApiError> {
        match self.client.current_user().await {
            Ok(user) => {
                info!(username = %user.username, "Session authenticated");
                self.state = SessionState::Authenticated(user.clone());
                Ok(user)
            }
            Err(e) => {
                warn!("Failed to fetch user: {}", e);
                if let Err(clear_err) = self.client.store().clear() {
                    warn!("Failed to clear stored tokens: {:#}", clear_err);
                }
                self.state = SessionState::Anonymous;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::REFRESH_ENDPOINT;
    use crate::api::testing::{ScriptedTransport, USER_JSON, client};

    fn alice() -> User {
        User {
            id: 1,
            email: "a@b.com".to_string(),
            username: "alice".to_string(),
        }
    }

    #[tokio::test]
    async fn test_start_without_tokens_is_anonymous() {
        let transport = ScriptedTransport::new();
        let mut session = Session::new(client(&transport));
        assert!(session.is_loading());

        assert_eq!(session.start().await, &SessionState::Anonymous);
        assert!(!session.is_loading());
        assert!(!session.is_authenticated());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_start_with_tokens_fetches_user() {
        let transport = ScriptedTransport::new();
        transport.respond(200, USER_JSON);
        let api = client(&transport);
        api.store().set(&TokenPair::new("A1", "R1")).unwrap();

        let mut session = Session::new(api);
        session.start().await;

        assert_eq!(session.user(), Some(&alice()));
        assert!(session.is_authenticated());
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_start_failure_clears_tokens() {
        let transport = ScriptedTransport::new();
        transport.respond(500, "boom");
        let api = client(&transport);
        api.store().set(&TokenPair::new("A1", "R1")).unwrap();

        let mut session = Session::new(api);
        assert_eq!(session.start().await, &SessionState::Anonymous);
        assert_eq!(session.client().store().get(), None);
    }

    #[tokio::test]
    async fn test_start_with_expired_session() {
        let transport = ScriptedTransport::new();
        transport.respond(401, "").respond(401, "");
        let api = client(&transport);
        api.store().set(&TokenPair::new("A1", "R1")).unwrap();

        let mut session = Session::new(api);
        session.start().await;

        assert_eq!(session.state(), &SessionState::Anonymous);
        assert_eq!(session.client().store().get(), None);
        assert_eq!(transport.requests_to(REFRESH_ENDPOINT).len(), 1);
    }

    #[tokio::test]
    async fn test_login_sets_tokens_and_user() {
        let transport = ScriptedTransport::new();
        transport.respond(200, USER_JSON);
        let mut session = Session::new(client(&transport));
        session.start().await;

        let user = session.login(&TokenPair::new("A1", "R1")).await.unwrap();
        assert_eq!(user, alice());
        assert!(session.is_authenticated());
        assert_eq!(
            transport.requests()[0].header("Authorization"),
            Some("Bearer A1")
        );
    }

    #[tokio::test]
    async fn test_login_failure_returns_error() {
        let transport = ScriptedTransport::new();
        transport.respond(403, r#"{"detail": "Email not verified"}"#);
        let mut session = Session::new(client(&transport));

        let err = session.login(&TokenPair::new("A1", "")).await.unwrap_err();
        assert_eq!(err.detail(), Some("Email not verified"));
        assert_eq!(session.state(), &SessionState::Anonymous);
        assert_eq!(session.client().store().get(), None);
    }

    #[tokio::test]
    async fn test_logout_clears_and_notifies() {
        let transport = ScriptedTransport::new();
        transport.respond(200, USER_JSON).respond(500, "");
        let mut session = Session::new(client(&transport));
        session.login(&TokenPair::new("A1", "R1")).await.unwrap();

        let notice = session.logout().expect("a notice is sent when signed in");
        assert_eq!(session.state(), &SessionState::Anonymous);
        assert_eq!(session.client().store().get(), None);

        // The failing notice does not affect the local outcome
        notice.await.unwrap();
        let sent = transport.requests_to("/api/auth/logout/");
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].header("Authorization"), Some("Bearer A1"));
        assert_eq!(session.state(), &SessionState::Anonymous);
    }

    #[tokio::test]
    async fn test_logout_when_anonymous_sends_nothing() {
        let transport = ScriptedTransport::new();
        let mut session = Session::new(client(&transport));
        assert!(session.logout().is_none());
        assert_eq!(session.state(), &SessionState::Anonymous);
        assert!(transport.requests().is_empty());
    }
}
