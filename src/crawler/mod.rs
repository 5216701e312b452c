//! Crawler module for listing and detail page harvesting
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with bounded retries and linear backoff
//! - Header and proxy rotation for listing requests
//! - Listing-link extraction and detail-page parsing
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod retry;
mod rotation;

pub use coordinator::{run_crawl, CrawlEngine};
pub use fetcher::{build_http_client, AttemptError, FetchRequest, RetryingFetcher};
pub use parser::{extract_item_links, ParseError, ProjectPageParser, RecordParser};
pub use retry::RetryPolicy;
pub use rotation::RequestRotation;
