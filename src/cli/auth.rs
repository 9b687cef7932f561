//! Interactive sign-in; prints the access token for the one-shot
//! commands to pick up from the environment.

use std::io::{self, Write};

use anyhow::Result;
use async_trait::async_trait;

use crate::core::AppConfig;
use crate::google::auth::{GoogleAuth, consent_url};
use crate::session::{AuthProvider, Session};

/// Consent flow over stdin: prints the consent URL and reads the
/// pasted access token. An empty line means the user cancelled.
pub struct StdioAuthProvider {
    client_id: String,
}

impl StdioAuthProvider {
    pub fn new(client_id: String) -> Self {
        Self { client_id }
    }
}

#[async_trait]
impl AuthProvider for StdioAuthProvider {
    async fn available(&self) -> bool {
        !self.client_id.is_empty()
    }

    async fn request_access_token(&self) -> Result<Option<String>> {
        println!(
            "\nOpen the following URL in your browser and authorize access:\n\n{}\n",
            consent_url(&self.client_id)
        );
        print!("Paste the access token from the redirect URL (blank to cancel): ");
        io::stdout().flush()?;
        let mut token = String::new();
        io::stdin().read_line(&mut token)?;
        let token = token.trim();
        if token.is_empty() {
            return Ok(None);
        }
        Ok(Some(token.to_string()))
    }
}

pub async fn run(config: &AppConfig) -> Result<()> {
    let Some(client_id) = config.google_client_id.clone() else {
        anyhow::bail!("Set CALINSPECT_GOOGLE_CLIENT_ID in your environment");
    };

    let mut session = Session::new(
        StdioAuthProvider::new(client_id.clone()),
        GoogleAuth::default(),
    );
    session.initialize(Some(&client_id)).await;
    session.sign_in().await?;

    match session.token() {
        Some(token) => {
            if let Some(email) = session.email() {
                println!("Signed in as {}", email);
            }
            println!("Access token: {}", token);
            println!("Export CALINSPECT_ACCESS_TOKEN to use the other commands.");
        }
        None => println!("Sign-in cancelled."),
    }
    Ok(())
}
