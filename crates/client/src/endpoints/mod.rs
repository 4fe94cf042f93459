//! REST API endpoint implementations.
//!
//! Each endpoint is a free function over a shared `reqwest::Client`,
//! a base URL, and a bearer token. Higher-level concerns (token caching,
//! polling, pagination) live in the rest of the crate.

pub mod auth;
pub mod search;
mod url_encoding;

pub use url_encoding::encode_path_segment;

use crate::error::ClientError;

/// Turn a non-2xx response into an [`ClientError::Api`] carrying the
/// status, URL, and response body.
pub(crate) async fn error_for_response(response: reqwest::Response) -> ClientError {
    let status = response.status().as_u16();
    let url = response.url().to_string();
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Could not read error response body".to_string());

    ClientError::Api {
        status,
        url,
        message,
    }
}
