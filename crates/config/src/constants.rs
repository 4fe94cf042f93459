//! Centralized constants for the searchgoat workspace.
//!
//! This module contains default values used across crates to avoid
//! magic number duplication and improve maintainability.

// =============================================================================
// Authentication Defaults
// =============================================================================

/// Default OAuth2 token endpoint for Cribl.Cloud.
pub const DEFAULT_AUTH_URL: &str = "https://login.cribl.cloud/oauth/token";

/// OAuth2 audience sent with the client-credentials exchange.
pub const API_AUDIENCE: &str = "https://api.cribl.cloud";

/// Buffer time before token expiry to proactively re-authenticate.
/// This prevents a token from expiring mid-request.
pub const TOKEN_REFRESH_BUFFER_SECS: u64 = 300;

/// Default access token time-to-live when the auth server omits `expires_in`.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 86_400;

// =============================================================================
// Connection & Timeout Defaults
// =============================================================================

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Search & Polling Defaults
// =============================================================================

/// Default polling interval for job status checks in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;

/// Default maximum time to wait for search job completion in seconds.
pub const DEFAULT_JOB_TIMEOUT_SECS: u64 = 300;

/// Default page size for paginated search results.
pub const DEFAULT_PAGE_SIZE: u64 = 1000;

/// Sample rate sent with every job submission.
pub const DEFAULT_SAMPLE_RATE: u32 = 1;

/// Default earliest time bound for searches.
pub const DEFAULT_EARLIEST: &str = "-1h";

/// Default latest time bound for searches.
pub const DEFAULT_LATEST: &str = "now";

/// Seconds to wait before retrying when a 429 response omits `Retry-After`.
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 60;
