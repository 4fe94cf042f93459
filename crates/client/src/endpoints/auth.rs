//! OAuth2 client-credentials exchange.

use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::debug;

use searchgoat_config::Settings;
use searchgoat_config::constants::API_AUDIENCE;

use crate::error::{ClientError, Result};

#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    audience: &'a str,
}

/// Successful token endpoint response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: Option<u64>,
}

/// Perform the OAuth2 client-credentials exchange.
///
/// Both non-2xx responses and network failures map to
/// [`ClientError::AuthFailed`] carrying the status and server message.
pub async fn fetch_token(http: &Client, settings: &Settings) -> Result<TokenResponse> {
    debug!("requesting access token from {}", settings.auth_url);

    let payload = TokenRequest {
        grant_type: "client_credentials",
        client_id: &settings.client_id,
        client_secret: settings.client_secret.expose_secret(),
        audience: API_AUDIENCE,
    };

    let response = http
        .post(&settings.auth_url)
        .json(&payload)
        .send()
        .await
        .map_err(|e| ClientError::AuthFailed(format!("token request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Could not read error response body".to_string());
        return Err(ClientError::AuthFailed(format!(
            "{} - {}",
            status.as_u16(),
            body
        )));
    }

    response
        .json()
        .await
        .map_err(|e| ClientError::InvalidResponse(format!("malformed token response: {e}")))
}
