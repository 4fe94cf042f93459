//! Data models for search jobs and results.
//!
//! # What this module handles:
//! - The job status state machine and the `SearchJob` handle
//! - Wire response shapes for the submit/status/results endpoints
//!
//! # What this module does NOT handle:
//! - HTTP transport (see [`crate::endpoints`])
//! - Polling logic (see [`crate::client`])

use serde::{Deserialize, Serialize};
use std::fmt;

/// One result row: an arbitrary key-value mapping with no fixed schema.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Reserved record key carrying a Unix epoch-seconds timestamp.
pub const TIME_FIELD: &str = "_time";

/// Possible states of a search job.
///
/// Transitions are monotonic along NEW → QUEUED → RUNNING → terminal;
/// a terminal status is never reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Job accepted, not yet running.
    New,
    /// Queued waiting for resources.
    Queued,
    /// Search in progress.
    Running,
    /// Results ready for retrieval.
    Completed,
    /// Search encountered an error.
    Failed,
    /// Search was stopped before completion.
    Canceled,
}

impl JobStatus {
    /// Whether this status ends the job's lifecycle.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Canceled)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::New => "new",
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
        };
        f.write_str(s)
    }
}

/// Handle for a submitted search job.
///
/// The server owns the job lifecycle; this handle is only mutated by
/// polling and is never deleted client-side.
#[derive(Debug, Clone)]
pub struct SearchJob {
    /// Server-assigned job identifier.
    pub id: String,
    /// Last observed status.
    pub status: JobStatus,
    /// Number of result records, set only once the job completes.
    pub record_count: Option<u64>,
}

impl SearchJob {
    pub(crate) fn new(id: String) -> Self {
        Self {
            id,
            status: JobStatus::New,
            record_count: None,
        }
    }

    /// Advance the job status. Terminal statuses are sticky.
    pub(crate) fn transition_to(&mut self, next: JobStatus) {
        if !self.status.is_terminal() {
            self.status = next;
        }
    }
}

/// Generic `{"items": [...]}` envelope used by the search API.
#[derive(Debug, Deserialize)]
pub(crate) struct ItemsResponse<T> {
    pub items: Vec<T>,
}

/// Item returned by job creation.
#[derive(Debug, Deserialize)]
pub(crate) struct CreatedJobItem {
    pub id: String,
}

/// One entry of the status endpoint response.
#[derive(Debug, Deserialize)]
pub struct JobStatusItem {
    pub status: JobStatus,
    #[serde(rename = "numEvents")]
    pub num_events: Option<u64>,
    pub error: Option<String>,
}

/// First line of each NDJSON results page.
#[derive(Debug, Deserialize)]
pub struct PageMetadata {
    /// Authoritative total for the whole result set.
    #[serde(rename = "totalEventCount")]
    pub total_event_count: Option<u64>,
    #[serde(rename = "isFinished", default)]
    pub is_finished: bool,
    #[serde(default)]
    pub offset: u64,
}
