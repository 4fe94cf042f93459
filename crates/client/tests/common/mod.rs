//! Common test utilities for integration tests.
//!
//! All integration tests wire both the auth endpoint and the API base URL
//! to a single wiremock server so the full request flow can be asserted.

use std::time::Duration;

use secrecy::SecretString;

use searchgoat_client::{QueryOptions, SearchClient};
use searchgoat_config::Settings;

#[allow(unused_imports)]
pub use wiremock::matchers::{body_partial_json, header, method, path, query_param};
#[allow(unused_imports)]
pub use wiremock::{Mock, MockServer, ResponseTemplate};

/// Settings pointing the auth endpoint at a wiremock server.
pub fn mock_settings(server: &MockServer) -> Settings {
    Settings::new(
        "test-client-id",
        SecretString::new("test-client-secret".to_string().into()),
        "test-org",
        "test-workspace",
    )
    .with_auth_url(format!("{}/oauth/token", server.uri()))
}

/// Client wired to the mock server for both auth and API calls.
#[allow(dead_code)]
pub fn mock_client(server: &MockServer) -> SearchClient {
    SearchClient::builder(mock_settings(server))
        .base_url(server.uri())
        .build()
        .expect("client should build")
}

/// Mount the token endpoint returning a long-lived token.
#[allow(dead_code)]
pub async fn mount_auth(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "mock-token-12345",
            "expires_in": 86400,
            "token_type": "Bearer",
        })))
        .mount(server)
        .await;
}

/// Query options with fast polling so tests finish quickly.
#[allow(dead_code)]
pub fn fast_options() -> QueryOptions {
    QueryOptions::default()
        .poll_interval(Duration::from_millis(10))
        .timeout(Duration::from_secs(5))
}
