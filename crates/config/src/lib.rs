//! Configuration management for searchgoat.
//!
//! This crate provides the settings type and loaders for building Cribl
//! Search API configuration from environment variables.

pub mod constants;
mod loader;
mod types;

pub use loader::{ConfigError, ConfigLoader};
pub use types::Settings;
