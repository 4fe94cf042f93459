//! Error types for the searchgoat client.

use std::time::Duration;
use thiserror::Error;

use crate::export::ExportError;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur during Cribl Search client operations.
///
/// Every error surfaces directly to the caller; nothing is retried
/// automatically.
#[derive(Error, Debug)]
pub enum ClientError {
    /// OAuth2 credential exchange failed (non-2xx or network error).
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// The server rejected the query syntax (HTTP 400 on submit).
    #[error("Invalid query: {0}")]
    QuerySyntax(String),

    /// Rate limited - too many requests (HTTP 429 on submit).
    #[error("Rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Polling exceeded the caller's timeout.
    #[error("Job {job_id} did not complete within {timeout:?}")]
    JobTimeout { job_id: String, timeout: Duration },

    /// The job reached FAILED or CANCELED on the server.
    #[error("Job {job_id} failed: {message}")]
    JobFailed { job_id: String, message: String },

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API error response outside the specifically mapped cases.
    #[error("API error ({status}) at {url}: {message}")]
    Api {
        status: u16,
        url: String,
        message: String,
    },

    /// Invalid response format from the server.
    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Result export failed.
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl ClientError {
    /// Check if this error indicates authentication failure.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::AuthFailed(_))
    }

    /// Check if this error is terminal for the job itself rather than
    /// for the request that observed it.
    pub fn is_job_error(&self) -> bool {
        matches!(self, Self::JobFailed { .. } | Self::JobTimeout { .. })
    }

    /// Seconds the server asked us to back off, when rate limited.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after_secs } => {
                Some(Duration::from_secs(*retry_after_secs))
            }
            _ => None,
        }
    }
}
