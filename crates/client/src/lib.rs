//! Cribl Search REST API client.
//!
//! This crate provides an async client for the Cribl Search job workflow:
//! OAuth2 client-credentials authentication with proactive token refresh,
//! search job submission, status polling, and NDJSON result pagination
//! into tabular records.
//!
//! The async [`SearchClient`] is the core. [`blocking`] offers a thin
//! adapter for callers without an async runtime, and [`ResultSet`] covers
//! tabular conversion plus `.csv`/`.parquet` export.

mod auth;
pub mod blocking;
mod client;
pub mod endpoints;
pub mod error;
pub mod export;
pub mod models;
pub mod pagination;

pub use auth::TokenManager;
pub use client::{QueryOptions, SearchClient, SearchClientBuilder};
pub use error::{ClientError, Result};
pub use export::{ExportError, ResultSet};
pub use models::{JobStatus, Record, SearchJob, TIME_FIELD};
pub use pagination::ResultsPager;
