//! Blocking adapter over the async client.
//!
//! The async [`crate::SearchClient`] is the core; this module wraps it in
//! an owned current-thread runtime for callers without an async context.
//! Each call drives the corresponding async operation to completion with
//! `Runtime::block_on`.
//!
//! Must not be used from inside a tokio runtime; `block_on` panics there.

use std::path::Path;

use tokio::runtime::{Builder, Runtime};

use searchgoat_config::Settings;

use crate::client::{QueryOptions, SearchClientBuilder};
use crate::error::Result;
use crate::export::ResultSet;
use crate::models::{Record, SearchJob};

/// Blocking client for querying Cribl Search.
#[derive(Debug)]
pub struct SearchClient {
    inner: crate::SearchClient,
    runtime: Runtime,
}

impl SearchClient {
    /// Build a blocking client from credentials with default options.
    pub fn new(settings: Settings) -> Result<Self> {
        Self::from_builder(crate::SearchClient::builder(settings))
    }

    /// Build a blocking client from a configured builder.
    pub fn from_builder(builder: SearchClientBuilder) -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self {
            inner: builder.build()?,
            runtime,
        })
    }

    /// Execute a query end to end and return a tabular [`ResultSet`].
    pub fn query(&self, query: &str, options: &QueryOptions) -> Result<ResultSet> {
        self.runtime.block_on(self.inner.query(query, options))
    }

    /// Submit a query and return a job handle for manual control.
    pub fn submit(&self, query: &str, options: &QueryOptions) -> Result<SearchJob> {
        self.runtime.block_on(self.inner.submit(query, options))
    }

    /// Block until the job completes, fails, or times out.
    pub fn wait(&self, job: &mut SearchJob, options: &QueryOptions) -> Result<()> {
        self.runtime.block_on(self.inner.wait(job, options))
    }

    /// Collect every record of a completed job into memory.
    pub fn collect_results(&self, job_id: &str) -> Result<Vec<Record>> {
        self.runtime.block_on(self.inner.collect_results(job_id))
    }

    /// Collect a completed job's results and save them to a file chosen
    /// by extension (`.parquet` or `.csv`).
    pub fn save(&self, job_id: &str, path: impl AsRef<Path>) -> Result<()> {
        let records = self.collect_results(job_id)?;
        ResultSet::new(records).save(path)?;
        Ok(())
    }
}
