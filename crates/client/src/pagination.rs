//! Offset pagination over NDJSON result pages.
//!
//! The results endpoint returns newline-delimited JSON: the first line of
//! each page is metadata carrying the authoritative `totalEventCount`,
//! every following non-blank line is one record. Pages are fetched with
//! `limit`/`offset` until the offset reaches the reported total.

use std::collections::VecDeque;

use futures::Stream;
use reqwest::Client;
use reqwest::header::HeaderMap;
use tracing::debug;

use crate::endpoints;
use crate::error::{ClientError, Result};
use crate::models::{PageMetadata, Record};

/// One parsed results page.
#[derive(Debug)]
pub struct ResultsPage {
    pub metadata: PageMetadata,
    pub records: Vec<Record>,
}

/// Walks a completed job's result set page by page.
///
/// The pager is lazy, finite, and non-restartable: once exhausted it
/// keeps returning `None`. A failed page fetch aborts the sequence; there
/// is no resumption token.
pub struct ResultsPager<'a> {
    http: &'a Client,
    base_url: &'a str,
    auth_token: String,
    job_id: String,
    page_size: u64,
    extra_headers: HeaderMap,
    offset: u64,
    total: Option<u64>,
    done: bool,
}

impl<'a> ResultsPager<'a> {
    pub(crate) fn new(
        http: &'a Client,
        base_url: &'a str,
        auth_token: String,
        job_id: impl Into<String>,
        page_size: u64,
    ) -> Self {
        Self {
            http,
            base_url,
            auth_token,
            job_id: job_id.into(),
            page_size,
            extra_headers: HeaderMap::new(),
            offset: 0,
            total: None,
            done: false,
        }
    }

    /// Attach caller-supplied headers sent with every page request.
    /// The NDJSON `Accept` header still takes precedence.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.extra_headers = headers;
        self
    }

    /// Total record count reported by the server, once known.
    pub fn total(&self) -> Option<u64> {
        self.total
    }

    /// Fetch the next page of records, or `None` once exhausted.
    pub async fn next_page(&mut self) -> Result<Option<Vec<Record>>> {
        if self.done {
            return Ok(None);
        }

        let body = endpoints::search::get_results_page(
            self.http,
            self.base_url,
            &self.auth_token,
            &self.job_id,
            self.page_size,
            self.offset,
            &self.extra_headers,
        )
        .await?;

        // No lines at all: the result set is already exhausted.
        if body.trim().is_empty() {
            self.done = true;
            return Ok(None);
        }

        let page = parse_page(&body)?;

        // Each page's metadata line re-states the authoritative total. An
        // absent count collapses to zero, which stops pagination once this
        // page's records have been delivered.
        let total = page.metadata.total_event_count.unwrap_or(0);
        self.total = Some(total);
        self.offset += self.page_size;
        if self.offset >= total {
            self.done = true;
        }

        debug!(
            "page for job {} yielded {} records, next offset {}",
            self.job_id,
            page.records.len(),
            self.offset
        );

        Ok(Some(page.records))
    }

    /// Adapt the pager into a stream of individual records.
    pub fn into_stream(self) -> impl Stream<Item = Result<Record>> + 'a {
        futures::stream::try_unfold(
            (self, VecDeque::new()),
            |(mut pager, mut buffered)| async move {
                loop {
                    if let Some(record) = buffered.pop_front() {
                        return Ok(Some((record, (pager, buffered))));
                    }
                    match pager.next_page().await? {
                        Some(records) => buffered = records.into(),
                        None => return Ok(None),
                    }
                }
            },
        )
    }
}

/// Parse one NDJSON page body: a metadata line, then record lines.
/// Blank lines between records are silently skipped.
fn parse_page(body: &str) -> Result<ResultsPage> {
    let mut lines = body.trim().lines();

    let metadata_line = lines
        .next()
        .ok_or_else(|| ClientError::InvalidResponse("empty results page".to_string()))?;
    let metadata: PageMetadata = serde_json::from_str(metadata_line)
        .map_err(|e| ClientError::InvalidResponse(format!("failed to parse page metadata: {e}")))?;

    let mut records = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let record: Record = serde_json::from_str(line).map_err(|e| {
            ClientError::InvalidResponse(format!("failed to parse result record: {e}"))
        })?;
        records.push(record);
    }

    Ok(ResultsPage { metadata, records })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_page_skips_blank_lines() {
        let body = concat!(
            "{\"isFinished\":true,\"totalEventCount\":3,\"offset\":0}\n",
            "{\"id\":1}\n",
            "\n",
            "{\"id\":2}\n",
            "   \n",
            "{\"id\":3}\n",
        );

        let page = parse_page(body).unwrap();
        assert_eq!(page.metadata.total_event_count, Some(3));
        assert_eq!(page.records.len(), 3);
        assert_eq!(page.records[0]["id"], 1);
        assert_eq!(page.records[2]["id"], 3);
    }

    #[test]
    fn test_parse_page_metadata_only() {
        let page = parse_page("{\"totalEventCount\":0,\"isFinished\":true}").unwrap();
        assert_eq!(page.metadata.total_event_count, Some(0));
        assert!(page.records.is_empty());
    }

    #[test]
    fn test_parse_page_malformed_metadata() {
        let err = parse_page("not json\n{\"id\":1}\n").unwrap_err();
        assert!(matches!(err, ClientError::InvalidResponse(_)));
    }

    #[test]
    fn test_parse_page_malformed_record() {
        let body = "{\"totalEventCount\":2}\n{\"id\":1}\nnot json\n";
        let err = parse_page(body).unwrap_err();
        assert!(matches!(err, ClientError::InvalidResponse(_)));
    }

    proptest! {
        /// Every record line survives parsing in file order, however many
        /// blank lines are interspersed.
        #[test]
        fn prop_records_preserved_in_order(
            count in 0usize..50,
            blanks in proptest::collection::vec(0usize..3, 0..50),
        ) {
            let mut body = String::from("{\"totalEventCount\":1000}\n");
            for i in 0..count {
                for _ in 0..blanks.get(i).copied().unwrap_or(0) {
                    body.push('\n');
                }
                body.push_str(&format!("{{\"seq\":{i}}}\n"));
            }

            let page = parse_page(&body).unwrap();
            prop_assert_eq!(page.records.len(), count);
            for (i, record) in page.records.iter().enumerate() {
                prop_assert_eq!(record["seq"].as_u64(), Some(i as u64));
            }
        }
    }
}
