//! Configuration loader for environment variables.
//!
//! Responsibilities:
//! - Load settings from `CRIBL_*` environment variables and `.env` files.
//! - Provide a builder-pattern `ConfigLoader` so programmatic overrides
//!   win over environment values.
//! - Enforce the `DOTENV_DISABLED` gate to prevent accidental dotenv
//!   loading in tests.
//!
//! Does NOT handle:
//! - Persisting configuration back to disk (there is no profile store).
//! - Token acquisition (see the client crate).
//!
//! Invariants:
//! - `load_dotenv()` must be called explicitly to enable `.env` loading.
//! - Missing required values fail with `ConfigError::MissingEnvVar`
//!   naming the variable, never with a partial `Settings`.

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::constants::DEFAULT_AUTH_URL;
use crate::types::Settings;

/// Environment variable holding the OAuth2 client ID.
pub const ENV_CLIENT_ID: &str = "CRIBL_CLIENT_ID";
/// Environment variable holding the OAuth2 client secret.
pub const ENV_CLIENT_SECRET: &str = "CRIBL_CLIENT_SECRET";
/// Environment variable holding the organization id.
pub const ENV_ORG_ID: &str = "CRIBL_ORG_ID";
/// Environment variable holding the workspace name.
pub const ENV_WORKSPACE: &str = "CRIBL_WORKSPACE";
/// Environment variable overriding the OAuth2 token endpoint.
pub const ENV_AUTH_URL: &str = "CRIBL_AUTH_URL";

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: &'static str, message: String },
}

/// Configuration loader that builds [`Settings`] from environment
/// variables, with programmatic overrides taking precedence.
#[derive(Default)]
pub struct ConfigLoader {
    client_id: Option<String>,
    client_secret: Option<SecretString>,
    org_id: Option<String>,
    workspace: Option<String>,
    auth_url: Option<String>,
}

impl ConfigLoader {
    /// Create a new configuration loader with no values set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load environment variables from a `.env` file if present.
    ///
    /// If the `DOTENV_DISABLED` environment variable is set to "true" or
    /// "1", the `.env` file is skipped entirely.
    pub fn load_dotenv(self) -> Self {
        let disabled = std::env::var("DOTENV_DISABLED")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        if disabled {
            debug!("dotenv loading disabled via DOTENV_DISABLED");
        } else if let Ok(path) = dotenvy::dotenv() {
            debug!("loaded environment from {}", path.display());
        }

        self
    }

    /// Fill unset fields from `CRIBL_*` environment variables.
    ///
    /// Values already set programmatically are left untouched.
    pub fn from_env(mut self) -> Self {
        if self.client_id.is_none() {
            self.client_id = non_empty_env(ENV_CLIENT_ID);
        }
        if self.client_secret.is_none() {
            self.client_secret = non_empty_env(ENV_CLIENT_SECRET).map(|s| SecretString::new(s.into()));
        }
        if self.org_id.is_none() {
            self.org_id = non_empty_env(ENV_ORG_ID);
        }
        if self.workspace.is_none() {
            self.workspace = non_empty_env(ENV_WORKSPACE);
        }
        if self.auth_url.is_none() {
            self.auth_url = non_empty_env(ENV_AUTH_URL);
        }
        self
    }

    /// Set the OAuth2 client ID.
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Set the OAuth2 client secret.
    pub fn client_secret(mut self, client_secret: SecretString) -> Self {
        self.client_secret = Some(client_secret);
        self
    }

    /// Set the organization id.
    pub fn org_id(mut self, org_id: impl Into<String>) -> Self {
        self.org_id = Some(org_id.into());
        self
    }

    /// Set the workspace name.
    pub fn workspace(mut self, workspace: impl Into<String>) -> Self {
        self.workspace = Some(workspace.into());
        self
    }

    /// Override the OAuth2 token endpoint.
    pub fn auth_url(mut self, auth_url: impl Into<String>) -> Self {
        self.auth_url = Some(auth_url.into());
        self
    }

    /// Validate the collected values and build [`Settings`].
    pub fn build(self) -> Result<Settings, ConfigError> {
        let client_id = self
            .client_id
            .ok_or(ConfigError::MissingEnvVar(ENV_CLIENT_ID))?;
        let client_secret = self
            .client_secret
            .ok_or(ConfigError::MissingEnvVar(ENV_CLIENT_SECRET))?;
        if client_secret.expose_secret().is_empty() {
            return Err(ConfigError::MissingEnvVar(ENV_CLIENT_SECRET));
        }
        let org_id = self.org_id.ok_or(ConfigError::MissingEnvVar(ENV_ORG_ID))?;
        let workspace = self
            .workspace
            .ok_or(ConfigError::MissingEnvVar(ENV_WORKSPACE))?;

        let auth_url = self
            .auth_url
            .unwrap_or_else(|| DEFAULT_AUTH_URL.to_string());
        Url::parse(&auth_url).map_err(|e| ConfigError::InvalidValue {
            var: ENV_AUTH_URL,
            message: e.to_string(),
        })?;

        Ok(Settings {
            client_id,
            client_secret,
            org_id,
            workspace,
            auth_url,
        })
    }
}

/// Read an environment variable, treating empty/whitespace values as unset.
fn non_empty_env(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}
