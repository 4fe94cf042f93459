//! Main Cribl Search client.
//!
//! Composes the token cache, endpoints, job state machine, and pager into
//! the submit/wait/collect workflow. All methods take `&self`; independent
//! operations may run concurrently on one client, and the token cache is
//! the only shared mutable state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::{Stream, TryStreamExt};
use tracing::debug;

use searchgoat_config::Settings;
use searchgoat_config::constants::{
    DEFAULT_EARLIEST, DEFAULT_JOB_TIMEOUT_SECS, DEFAULT_LATEST, DEFAULT_PAGE_SIZE,
    DEFAULT_POLL_INTERVAL_SECS, DEFAULT_TIMEOUT_SECS,
};

use crate::auth::TokenManager;
use crate::endpoints;
use crate::error::{ClientError, Result};
use crate::export::ResultSet;
use crate::models::{JobStatus, Record, SearchJob};
use crate::pagination::ResultsPager;

/// Options for one submit/wait cycle.
#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// Start of the search time range (e.g., "-24h").
    pub earliest: String,
    /// End of the search time range (e.g., "now").
    pub latest: String,
    /// Fixed interval between job status checks.
    pub poll_interval: Duration,
    /// Maximum wall-clock time to wait for completion.
    pub timeout: Duration,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            earliest: DEFAULT_EARLIEST.to_string(),
            latest: DEFAULT_LATEST.to_string(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            timeout: Duration::from_secs(DEFAULT_JOB_TIMEOUT_SECS),
        }
    }
}

impl QueryOptions {
    /// Set the start of the time range.
    pub fn earliest(mut self, earliest: impl Into<String>) -> Self {
        self.earliest = earliest.into();
        self
    }

    /// Set the end of the time range.
    pub fn latest(mut self, latest: impl Into<String>) -> Self {
        self.latest = latest.into();
        self
    }

    /// Set the interval between status checks.
    pub fn poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Set the maximum time to wait for completion.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Builder for creating a new [`SearchClient`].
pub struct SearchClientBuilder {
    settings: Settings,
    base_url: Option<String>,
    timeout: Duration,
    page_size: u64,
}

impl SearchClientBuilder {
    /// Create a builder from credentials. The API base URL is derived
    /// from the workspace and org id unless overridden.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            base_url: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Override the API base URL (primarily for pointing tests at a
    /// local server).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the HTTP request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the page size used when fetching results.
    pub fn page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size;
        self
    }

    /// Normalize a base URL by removing trailing slashes, preventing
    /// double slashes when concatenating endpoint paths.
    fn normalize_base_url(url: String) -> String {
        url.trim_end_matches('/').to_string()
    }

    /// Build the client.
    pub fn build(self) -> Result<SearchClient> {
        let settings = Arc::new(self.settings);
        let base_url = Self::normalize_base_url(
            self.base_url.unwrap_or_else(|| settings.api_base_url()),
        );

        let http = reqwest::Client::builder().timeout(self.timeout).build()?;

        Ok(SearchClient {
            http,
            base_url,
            tokens: TokenManager::new(settings),
            page_size: self.page_size,
        })
    }
}

/// Client for querying Cribl Search.
///
/// # Example
///
/// ```rust,no_run
/// use searchgoat_client::{QueryOptions, SearchClient};
/// use searchgoat_config::ConfigLoader;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let settings = ConfigLoader::new().load_dotenv().from_env().build()?;
/// let client = SearchClient::builder(settings).build()?;
///
/// let options = QueryOptions::default().earliest("-24h");
/// let results = client
///     .query("cribl dataset=\"logs\" | limit 1000", &options)
///     .await?;
/// results.save("results.parquet")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SearchClient {
    http: reqwest::Client,
    base_url: String,
    tokens: TokenManager,
    page_size: u64,
}

impl SearchClient {
    /// Create a new client builder.
    pub fn builder(settings: Settings) -> SearchClientBuilder {
        SearchClientBuilder::new(settings)
    }

    /// Get the API base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Clear the cached access token, forcing re-authentication on the
    /// next request.
    pub fn clear_token(&self) {
        self.tokens.clear();
    }

    /// Submit a query and return a job handle for manual control.
    pub async fn submit(&self, query: &str, options: &QueryOptions) -> Result<SearchJob> {
        let token = self.tokens.get_token(&self.http).await?;
        let id = endpoints::search::create_job(
            &self.http,
            &self.base_url,
            &token,
            query,
            &options.earliest,
            &options.latest,
        )
        .await?;

        debug!("submitted search job {}", id);
        Ok(SearchJob::new(id))
    }

    /// Poll job status until completion, failure, or timeout.
    ///
    /// Elapsed wall-clock time is checked against `options.timeout`
    /// before each status request. A timeout error does not cancel the
    /// job or any in-flight request on the server.
    ///
    /// # Errors
    ///
    /// - [`ClientError::JobTimeout`] when the timeout elapses first.
    /// - [`ClientError::JobFailed`] when the job reaches FAILED or
    ///   CANCELED.
    pub async fn wait(&self, job: &mut SearchJob, options: &QueryOptions) -> Result<()> {
        // Terminal statuses are never reset by further polling.
        match job.status {
            JobStatus::Completed => return Ok(()),
            JobStatus::Failed | JobStatus::Canceled => {
                return Err(ClientError::JobFailed {
                    job_id: job.id.clone(),
                    message: format!("Job already terminal with status {}", job.status),
                });
            }
            _ => {}
        }

        let token = self.tokens.get_token(&self.http).await?;
        let start = Instant::now();

        loop {
            if start.elapsed() > options.timeout {
                return Err(ClientError::JobTimeout {
                    job_id: job.id.clone(),
                    timeout: options.timeout,
                });
            }

            let item =
                endpoints::search::get_job_status(&self.http, &self.base_url, &token, &job.id)
                    .await?;
            job.transition_to(item.status);

            match job.status {
                JobStatus::Completed => {
                    job.record_count = Some(item.num_events.unwrap_or(0));
                    debug!(
                        "job {} completed with {} records",
                        job.id,
                        item.num_events.unwrap_or(0)
                    );
                    return Ok(());
                }
                JobStatus::Failed => {
                    let message = item.error.unwrap_or_else(|| "Unknown error".to_string());
                    return Err(ClientError::JobFailed {
                        job_id: job.id.clone(),
                        message,
                    });
                }
                JobStatus::Canceled => {
                    return Err(ClientError::JobFailed {
                        job_id: job.id.clone(),
                        message: "Job was canceled".to_string(),
                    });
                }
                _ => tokio::time::sleep(options.poll_interval).await,
            }
        }
    }

    /// Build a pager over a completed job's results.
    ///
    /// The bearer token is resolved once; the pager reuses it for every
    /// page request.
    pub async fn pager(&self, job_id: &str) -> Result<ResultsPager<'_>> {
        let token = self.tokens.get_token(&self.http).await?;
        Ok(ResultsPager::new(
            &self.http,
            &self.base_url,
            token,
            job_id,
            self.page_size,
        ))
    }

    /// Page through a completed job's results without collecting them.
    pub async fn stream_results(
        &self,
        job_id: &str,
    ) -> Result<impl Stream<Item = Result<Record>> + '_> {
        Ok(self.pager(job_id).await?.into_stream())
    }

    /// Collect every record of a completed job into memory.
    pub async fn collect_results(&self, job_id: &str) -> Result<Vec<Record>> {
        self.stream_results(job_id).await?.try_collect().await
    }

    /// Execute a query end to end: submit, wait for completion, collect
    /// all records, and return them as a tabular [`ResultSet`].
    pub async fn query(&self, query: &str, options: &QueryOptions) -> Result<ResultSet> {
        let mut job = self.submit(query, options).await?;
        self.wait(&mut job, options).await?;
        let records = self.collect_results(&job.id).await?;
        Ok(ResultSet::new(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn test_settings() -> Settings {
        Settings::new(
            "test-client-id",
            SecretString::new("test-client-secret".to_string().into()),
            "test-org",
            "test-workspace",
        )
    }

    #[test]
    fn test_builder_derives_base_url_from_settings() {
        let client = SearchClient::builder(test_settings()).build().unwrap();
        assert_eq!(
            client.base_url(),
            "https://test-workspace-test-org.cribl.cloud/api/v1/m/default_search"
        );
    }

    #[test]
    fn test_builder_base_url_override() {
        let client = SearchClient::builder(test_settings())
            .base_url("http://localhost:9000")
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "http://localhost:9000");
    }

    #[test]
    fn test_builder_normalizes_trailing_slashes() {
        let client = SearchClient::builder(test_settings())
            .base_url("http://localhost:9000//")
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "http://localhost:9000");
    }

    #[test]
    fn test_query_options_defaults() {
        let options = QueryOptions::default();
        assert_eq!(options.earliest, "-1h");
        assert_eq!(options.latest, "now");
        assert_eq!(options.poll_interval, Duration::from_secs(2));
        assert_eq!(options.timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_query_options_builder_methods() {
        let options = QueryOptions::default()
            .earliest("-7d")
            .latest("-1d")
            .poll_interval(Duration::from_millis(500))
            .timeout(Duration::from_secs(60));

        assert_eq!(options.earliest, "-7d");
        assert_eq!(options.latest, "-1d");
        assert_eq!(options.poll_interval, Duration::from_millis(500));
        assert_eq!(options.timeout, Duration::from_secs(60));
    }
}
