//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: Where the engine is within a run
//! - `CrawlPlan`: The page and item range a run will visit, derived from the
//!   remote total, the resume cursor, and the configured bounds

mod phase;
mod plan;

// Re-export main types
pub use phase::CrawlPhase;
pub use plan::{first_item_of, page_of, CrawlPlan};
