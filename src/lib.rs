//! Catalog Harvester: a resumable crawler for paginated listing services
//!
//! This crate walks a remote catalog page by page, fetches every item's detail
//! page, turns it into a structured [`Record`](output::Record), and persists the
//! results incrementally so that an interrupted run can pick up where it left off.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to fetch {url} after {attempts} attempt(s): {last_error}")]
    Fetch {
        url: String,
        attempts: u32,
        last_error: String,
    },

    #[error("Count endpoint {url} returned a non-integer body: {body:?}")]
    InvalidCount { url: String, body: String },

    #[error("Failed to extract record from {url}: {source}")]
    Extraction {
        url: String,
        source: crawler::ParseError,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::HarvestConfig;
pub use crawler::{run_crawl, CrawlEngine, RecordParser, RetryingFetcher};
pub use output::{Record, RunSummary};
pub use state::{CrawlPhase, CrawlPlan};
