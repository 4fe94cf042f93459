//! OAuth2 token management for Cribl.Cloud.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use searchgoat_config::Settings;
use searchgoat_config::constants::{DEFAULT_TOKEN_TTL_SECS, TOKEN_REFRESH_BUFFER_SECS};

use crate::endpoints;
use crate::error::Result;

/// Cached access token with expiry information.
#[derive(Debug, Clone)]
struct CachedToken {
    value: SecretString,
    expires_at: Instant,
}

impl CachedToken {
    /// Usable only while now is more than the refresh buffer away from
    /// expiry, so a token can't expire mid-request.
    fn is_valid(&self) -> bool {
        Instant::now() + Duration::from_secs(TOKEN_REFRESH_BUFFER_SECS) < self.expires_at
    }
}

/// Manages OAuth2 access tokens with proactive refresh.
///
/// The cached token is shared by every operation on one client.
/// Concurrent refreshes are not deduplicated: each caller observing a
/// stale token re-authenticates independently and the last writer wins;
/// every written token is valid.
#[derive(Debug)]
pub struct TokenManager {
    settings: Arc<Settings>,
    token: Mutex<Option<CachedToken>>,
}

impl TokenManager {
    /// Create a token manager for the given credentials.
    pub fn new(settings: Arc<Settings>) -> Self {
        Self {
            settings,
            token: Mutex::new(None),
        }
    }

    /// Return a valid access token, re-authenticating if necessary.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ClientError::AuthFailed`] if the credential
    /// exchange fails.
    pub async fn get_token(&self, http: &reqwest::Client) -> Result<String> {
        if let Some(token) = self.cached() {
            return Ok(token);
        }
        self.authenticate(http).await
    }

    /// Clear the cached token, forcing re-authentication on the next
    /// request. Used for recovery after revoked credentials.
    pub fn clear(&self) {
        *self.lock() = None;
    }

    fn cached(&self) -> Option<String> {
        let guard = self.lock();
        guard
            .as_ref()
            .filter(|t| t.is_valid())
            .map(|t| t.value.expose_secret().to_string())
    }

    async fn authenticate(&self, http: &reqwest::Client) -> Result<String> {
        debug!("access token missing or near expiry, re-authenticating");

        let response = endpoints::auth::fetch_token(http, &self.settings).await?;
        let ttl = response.expires_in.unwrap_or(DEFAULT_TOKEN_TTL_SECS);
        let value = response.access_token;
        let token = CachedToken {
            value: SecretString::new(value.clone().into()),
            expires_at: Instant::now() + Duration::from_secs(ttl),
        };

        // Last writer wins; a racing refresh stored an equally valid token.
        *self.lock() = Some(token);
        Ok(value)
    }

    fn lock(&self) -> MutexGuard<'_, Option<CachedToken>> {
        self.token.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
