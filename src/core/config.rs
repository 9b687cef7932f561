use std::env;

/// Runtime configuration, read once from the environment. The Google
/// client id is the only setting sign-in depends on; without it the
/// session never becomes ready.
#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    pub google_client_id: Option<String>,
    /// Pre-obtained bearer token for the one-shot commands.
    pub access_token: Option<String>,
    pub export_dir: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let google_client_id = env::var("CALINSPECT_GOOGLE_CLIENT_ID")
            .ok()
            .filter(|v| !v.is_empty());
        let access_token = env::var("CALINSPECT_ACCESS_TOKEN")
            .ok()
            .filter(|v| !v.is_empty());
        let export_dir = env::var("CALINSPECT_EXPORT_DIR").unwrap_or_else(|_| ".".to_string());

        Self {
            google_client_id,
            access_token,
            export_dir,
        }
    }
}
