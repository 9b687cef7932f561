//! Google identity endpoints: consent URL, token introspection, and
//! best-effort revocation.

use reqwest::Client;
use serde::Deserialize;

const OAUTH_BASE: &str = "https://oauth2.googleapis.com";
const TOKENINFO_BASE: &str = "https://www.googleapis.com/oauth2/v3";
const CONSENT_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Read-only scope; this tool never mutates calendar data.
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";

/// URL for the interactive consent flow. The implicit grant puts the
/// access token in the redirect fragment, which the user pastes back
/// into the prompt.
pub fn consent_url(client_id: &str) -> String {
    format!(
        "{}?client_id={}&redirect_uri={}&response_type=token&scope={}",
        CONSENT_URL,
        urlencoding::encode(client_id),
        urlencoding::encode("http://localhost"),
        urlencoding::encode(CALENDAR_SCOPE)
    )
}

#[derive(Debug, Deserialize)]
struct TokenInfo {
    email: Option<String>,
}

pub struct GoogleAuth {
    client: Client,
    oauth_base: String,
    tokeninfo_base: String,
}

impl Default for GoogleAuth {
    fn default() -> Self {
        Self::new(OAUTH_BASE, TOKENINFO_BASE)
    }
}

impl GoogleAuth {
    pub fn new(oauth_base: &str, tokeninfo_base: &str) -> Self {
        Self {
            client: Client::new(),
            oauth_base: oauth_base.trim_end_matches('/').to_string(),
            tokeninfo_base: tokeninfo_base.trim_end_matches('/').to_string(),
        }
    }

    /// Look up the email behind a token. Identity is cosmetic, so any
    /// failure resolves to `None` instead of an error.
    pub async fn resolve_identity(&self, access_token: &str) -> Option<String> {
        let url = format!(
            "{}/tokeninfo?access_token={}",
            self.tokeninfo_base,
            urlencoding::encode(access_token)
        );
        let res = self.client.get(&url).send().await.ok()?;
        if !res.status().is_success() {
            return None;
        }
        let info: TokenInfo = res.json().await.ok()?;
        info.email
    }

    /// Tell the provider to revoke the token. Fire-and-forget: the
    /// caller clears its local state whether or not this lands.
    pub async fn revoke_token(&self, access_token: &str) {
        let url = format!("{}/revoke", self.oauth_base);
        let result = self
            .client
            .post(&url)
            .form(&[("token", access_token)])
            .send()
            .await;
        match result {
            Ok(res) if !res.status().is_success() => {
                tracing::debug!("Token revoke returned {}", res.status());
            }
            Err(err) => tracing::debug!("Token revoke failed: {}", err),
            Ok(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_identity_returns_email() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/tokeninfo")
            .match_query(mockito::Matcher::UrlEncoded(
                "access_token".to_string(),
                "tok".to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"email": "me@example.com", "scope": "calendar.readonly"}"#)
            .create_async()
            .await;

        let auth = GoogleAuth::new(&server.url(), &server.url());
        assert_eq!(
            auth.resolve_identity("tok").await,
            Some("me@example.com".to_string())
        );
    }

    #[tokio::test]
    async fn test_resolve_identity_swallows_failures() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/tokeninfo")
            .match_query(mockito::Matcher::Any)
            .with_status(400)
            .with_body(r#"{"error": "invalid_token"}"#)
            .create_async()
            .await;

        let auth = GoogleAuth::new(&server.url(), &server.url());
        assert_eq!(auth.resolve_identity("bad").await, None);
    }

    #[tokio::test]
    async fn test_resolve_identity_handles_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/tokeninfo")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let auth = GoogleAuth::new(&server.url(), &server.url());
        assert_eq!(auth.resolve_identity("tok").await, None);
    }

    #[tokio::test]
    async fn test_revoke_token_ignores_failures() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/revoke")
            .with_status(500)
            .create_async()
            .await;

        let auth = GoogleAuth::new(&server.url(), &server.url());
        // Must not panic or surface an error
        auth.revoke_token("tok").await;
        mock.assert_async().await;
    }

    #[test]
    fn test_consent_url_carries_client_and_scope() {
        let url = consent_url("my-client-id");
        assert!(url.contains("client_id=my-client-id"));
        assert!(url.contains("response_type=token"));
        assert!(url.contains("calendar.readonly"));
    }
}
