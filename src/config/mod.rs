//! Configuration module for the harvester
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use catalog_harvester::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvester.toml")).unwrap();
//! println!("Page size: {}", config.crawler.page_size);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CrawlerConfig, EndpointConfig, HarvestConfig, OutputConfig, RequestConfig, RetryConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
