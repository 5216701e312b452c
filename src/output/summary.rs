//! Run summary reporting

use chrono::{DateTime, Utc};

/// What a single harvest run did
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run finished
    pub finished_at: DateTime<Utc>,

    /// Total item count reported by the remote catalog
    pub total_count: u64,

    /// First item index the run was planned to process
    pub first_item: u64,

    /// Last item index fully processed, if any
    pub last_item: Option<u64>,

    /// Number of items fetched, parsed, and persisted
    pub items_processed: u64,

    /// Number of listing pages fetched
    pub pages_visited: u64,

    /// Items processed again because they share a page with the resume point
    pub refetched: u64,
}

impl RunSummary {
    /// Elapsed wall-clock time in seconds
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}

/// Prints a run summary to stdout
pub fn print_summary(summary: &RunSummary) {
    println!("=== Harvest Summary ===\n");
    println!("Started:          {}", summary.started_at.to_rfc3339());
    println!("Finished:         {}", summary.finished_at.to_rfc3339());
    println!("Duration:         {}s", summary.duration_seconds());
    println!("Remote total:     {}", summary.total_count);
    println!("Pages visited:    {}", summary.pages_visited);
    println!("Items processed:  {}", summary.items_processed);
    println!("Items refetched:  {}", summary.refetched);
    match summary.last_item {
        Some(last) => println!("Item range:       {}..={}", summary.first_item, last),
        None => println!("Item range:       nothing to do"),
    }
}
