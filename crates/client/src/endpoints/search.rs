//! Search job endpoints.
//!
//! # What this module handles:
//! - Submitting search jobs
//! - Fetching job status
//! - Fetching raw NDJSON result pages
//!
//! # What this module does NOT handle:
//! - Status polling loops (see [`crate::client`])
//! - NDJSON parsing and offset bookkeeping (see [`crate::pagination`])

use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap};
use serde::Serialize;
use tracing::debug;

use searchgoat_config::constants::{DEFAULT_RETRY_AFTER_SECS, DEFAULT_SAMPLE_RATE};

use crate::endpoints::{encode_path_segment, error_for_response};
use crate::error::{ClientError, Result};
use crate::models::{CreatedJobItem, ItemsResponse, JobStatusItem};

#[derive(Serialize)]
struct CreateJobRequest<'a> {
    query: &'a str,
    earliest: &'a str,
    latest: &'a str,
    #[serde(rename = "sampleRate")]
    sample_rate: u32,
}

/// Submit a new search job and return the server-assigned job id.
///
/// Status 400 maps to [`ClientError::QuerySyntax`] with the server text,
/// 429 to [`ClientError::RateLimited`] with the `Retry-After` value
/// (default 60 s when the header is absent).
pub async fn create_job(
    http: &Client,
    base_url: &str,
    auth_token: &str,
    query: &str,
    earliest: &str,
    latest: &str,
) -> Result<String> {
    debug!("creating search job");

    let url = format!("{base_url}/search/jobs");
    let payload = CreateJobRequest {
        query,
        earliest,
        latest,
        sample_rate: DEFAULT_SAMPLE_RATE,
    };

    let response = http
        .post(&url)
        .header("Authorization", format!("Bearer {auth_token}"))
        .json(&payload)
        .send()
        .await?;

    match response.status().as_u16() {
        400 => {
            let body = response.text().await.unwrap_or_default();
            Err(ClientError::QuerySyntax(body))
        }
        429 => {
            let retry_after_secs = response
                .headers()
                .get("Retry-After")
                .and_then(|h| h.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            Err(ClientError::RateLimited { retry_after_secs })
        }
        status if !(200..300).contains(&status) => Err(error_for_response(response).await),
        _ => {
            let resp: ItemsResponse<CreatedJobItem> = response.json().await.map_err(|e| {
                ClientError::InvalidResponse(format!("failed to parse job creation response: {e}"))
            })?;
            resp.items
                .into_iter()
                .next()
                .map(|item| item.id)
                .ok_or_else(|| {
                    ClientError::InvalidResponse("missing job id in response".to_string())
                })
        }
    }
}

/// Get the current status of a search job.
pub async fn get_job_status(
    http: &Client,
    base_url: &str,
    auth_token: &str,
    job_id: &str,
) -> Result<JobStatusItem> {
    debug!("getting status for job: {}", job_id);

    let url = format!(
        "{}/search/jobs/{}/status",
        base_url,
        encode_path_segment(job_id)
    );

    let response = http
        .get(&url)
        .header("Authorization", format!("Bearer {auth_token}"))
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(error_for_response(response).await);
    }

    let resp: ItemsResponse<JobStatusItem> = response
        .json()
        .await
        .map_err(|e| ClientError::InvalidResponse(format!("failed to parse job status: {e}")))?;

    resp.items
        .into_iter()
        .next()
        .ok_or_else(|| ClientError::InvalidResponse("missing job status in response".to_string()))
}

/// Fetch one raw NDJSON results page.
///
/// Caller-supplied headers are applied first; the `Accept:
/// application/x-ndjson` header always wins. Any non-2xx response is a
/// hard failure with no retry.
#[allow(clippy::too_many_arguments)]
pub async fn get_results_page(
    http: &Client,
    base_url: &str,
    auth_token: &str,
    job_id: &str,
    limit: u64,
    offset: u64,
    extra_headers: &HeaderMap,
) -> Result<String> {
    debug!("fetching results page for job {} at offset {}", job_id, offset);

    let url = format!(
        "{}/search/jobs/{}/results",
        base_url,
        encode_path_segment(job_id)
    );

    let response = http
        .get(&url)
        .headers(extra_headers.clone())
        .header("Authorization", format!("Bearer {auth_token}"))
        .header(ACCEPT, "application/x-ndjson")
        .query(&[("limit", limit), ("offset", offset)])
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(error_for_response(response).await);
    }

    Ok(response.text().await?)
}
