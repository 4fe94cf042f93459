//! Connection settings for the Cribl Search API.
//!
//! Responsibilities:
//! - Define the credentials required for the OAuth2 client-credentials flow.
//! - Derive the API base URL from the workspace and organization id.
//!
//! Does NOT handle:
//! - Loading values from the environment (see `loader` module).
//! - Token acquisition or caching (see the client crate).
//!
//! Invariants:
//! - `client_secret` is wrapped in `SecretString` and never appears in
//!   `Debug` output or logs.
//! - Settings are immutable once constructed; there is no ambient/global
//!   configuration state.

use secrecy::SecretString;

use crate::constants::DEFAULT_AUTH_URL;

/// Credentials and endpoints for one Cribl.Cloud workspace.
#[derive(Debug, Clone)]
pub struct Settings {
    /// OAuth2 client ID from Cribl.Cloud.
    pub client_id: String,
    /// OAuth2 client secret.
    pub client_secret: SecretString,
    /// Organization identifier.
    pub org_id: String,
    /// Workspace name.
    pub workspace: String,
    /// OAuth2 token endpoint. Rarely needs changing.
    pub auth_url: String,
}

impl Settings {
    /// Create settings with the default Cribl.Cloud auth endpoint.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: SecretString,
        org_id: impl Into<String>,
        workspace: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
            org_id: org_id.into(),
            workspace: workspace.into(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
        }
    }

    /// Override the OAuth2 token endpoint.
    pub fn with_auth_url(mut self, auth_url: impl Into<String>) -> Self {
        self.auth_url = auth_url.into();
        self
    }

    /// Construct the API base URL from workspace and org id.
    pub fn api_base_url(&self) -> String {
        format!(
            "https://{}-{}.cribl.cloud/api/v1/m/default_search",
            self.workspace, self.org_id
        )
    }
}
