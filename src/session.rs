//! Sign-in session: readiness, the bearer token, and the resolved
//! identity. The token only lives in memory and is lost on exit.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::google::auth::GoogleAuth;

/// Opaque interactive consent flow. Implemented over stdin in the CLI
/// and by fakes in tests.
#[async_trait]
pub trait AuthProvider {
    /// Whether the identity subsystem has come up yet.
    async fn available(&self) -> bool;
    /// Run the consent flow. `Ok(None)` means the user cancelled,
    /// which is not an error.
    async fn request_access_token(&self) -> Result<Option<String>>;
}

const INIT_MAX_TRIES: u32 = 200;
const INIT_POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct Session<P> {
    provider: P,
    auth: GoogleAuth,
    ready: bool,
    token: Option<String>,
    email: Option<String>,
}

impl<P: AuthProvider> Session<P> {
    pub fn new(provider: P, auth: GoogleAuth) -> Self {
        Self {
            provider,
            auth,
            ready: false,
            token: None,
            email: None,
        }
    }

    /// Poll for the identity provider to come up and mark the session
    /// ready. A missing client id or a provider that never loads is
    /// non-fatal: it is logged and sign-in stays disabled.
    pub async fn initialize(&mut self, client_id: Option<&str>) {
        if client_id.is_none() {
            tracing::warn!("No Google client id configured, sign-in disabled");
            return;
        }
        for _ in 0..INIT_MAX_TRIES {
            if self.provider.available().await {
                self.ready = true;
                return;
            }
            tokio::time::sleep(INIT_POLL_INTERVAL).await;
        }
        tracing::error!("Identity provider failed to load, sign-in disabled");
    }

    /// Run the interactive consent flow. Cancellation is a silent
    /// no-op; a granted token also resolves the display identity.
    pub async fn sign_in(&mut self) -> Result<()> {
        if !self.ready {
            anyhow::bail!("Sign-in is not available");
        }
        if let Some(token) = self.provider.request_access_token().await? {
            self.email = self.auth.resolve_identity(&token).await;
            self.token = Some(token);
        }
        Ok(())
    }

    /// Use a token obtained out of band (e.g. from the environment).
    pub async fn adopt_token(&mut self, token: String) {
        self.email = self.auth.resolve_identity(&token).await;
        self.token = Some(token);
    }

    /// Best-effort revoke, then clear the local credential and
    /// identity regardless of the revoke outcome. Idempotent.
    pub async fn sign_out(&mut self) {
        if let Some(token) = self.token.take() {
            self.auth.revoke_token(&token).await;
        }
        self.email = None;
    }

    pub fn ready(&self) -> bool {
        self.ready
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn is_authed(&self) -> bool {
        self.token.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeProvider {
        available: bool,
        token: Option<String>,
    }

    #[async_trait]
    impl AuthProvider for FakeProvider {
        async fn available(&self) -> bool {
            self.available
        }

        async fn request_access_token(&self) -> Result<Option<String>> {
            Ok(self.token.clone())
        }
    }

    fn session(provider: FakeProvider) -> Session<FakeProvider> {
        Session::new(provider, GoogleAuth::default())
    }

    #[tokio::test]
    async fn test_initialize_requires_client_id() {
        let mut session = session(FakeProvider {
            available: true,
            token: None,
        });
        session.initialize(None).await;
        assert!(!session.ready());
    }

    #[tokio::test(start_paused = true)]
    async fn test_initialize_gives_up_after_bounded_retries() {
        let mut session = session(FakeProvider {
            available: false,
            token: None,
        });
        session.initialize(Some("client-id")).await;
        assert!(!session.ready());
    }

    #[tokio::test]
    async fn test_sign_in_disabled_until_ready() {
        let mut session = session(FakeProvider {
            available: true,
            token: Some("tok".to_string()),
        });
        assert!(session.sign_in().await.is_err());
        assert!(!session.is_authed());
    }

    #[tokio::test]
    async fn test_cancelled_sign_in_is_a_no_op() {
        let mut session = session(FakeProvider {
            available: true,
            token: None,
        });
        session.initialize(Some("client-id")).await;
        session.sign_in().await.unwrap();
        assert!(!session.is_authed());
    }

    #[tokio::test]
    async fn test_sign_in_stores_token_and_identity() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/tokeninfo")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"email": "me@example.com"}"#)
            .create_async()
            .await;

        let provider = FakeProvider {
            available: true,
            token: Some("tok".to_string()),
        };
        let mut session = Session::new(provider, GoogleAuth::new(&server.url(), &server.url()));
        session.initialize(Some("client-id")).await;
        session.sign_in().await.unwrap();

        assert_eq!(session.token(), Some("tok"));
        assert_eq!(session.email(), Some("me@example.com"));
    }

    #[tokio::test]
    async fn test_sign_out_clears_state_even_if_revoke_fails() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/revoke")
            .with_status(500)
            .create_async()
            .await;
        server
            .mock("GET", "/tokeninfo")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"email": "me@example.com"}"#)
            .create_async()
            .await;

        let provider = FakeProvider {
            available: true,
            token: Some("tok".to_string()),
        };
        let mut session = Session::new(provider, GoogleAuth::new(&server.url(), &server.url()));
        session.initialize(Some("client-id")).await;
        session.sign_in().await.unwrap();
        assert!(session.is_authed());

        session.sign_out().await;
        assert!(!session.is_authed());
        assert_eq!(session.email(), None);

        // Idempotent: a second sign-out is fine
        session.sign_out().await;
        assert!(!session.is_authed());
    }
}
