//! Pagination math and the per-run crawl plan

use crate::config::CrawlerConfig;
use std::ops::Range;

/// 0-based listing page holding the 1-based `item_index`
pub fn page_of(item_index: u64, page_size: u64) -> u64 {
    item_index.saturating_sub(1) / page_size
}

/// First item index shown on `page`
pub fn first_item_of(page: u64, page_size: u64) -> u64 {
    page * page_size + 1
}

/// The range of pages and items a run will visit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlPlan {
    /// Item total reported by the count endpoint
    pub total_count: u64,

    /// Cursor loaded at startup
    pub resume_cursor: u64,

    /// Smallest item index the run is asked to produce
    pub smallest_index: u64,

    /// Largest item index the run will produce
    pub end_index: u64,

    pub page_size: u64,

    /// First page to fetch
    pub start_page: u64,

    /// One past the last page to fetch
    pub end_page: u64,

    /// Index of the first item on `start_page`, where processing begins
    pub first_item: u64,
}

impl CrawlPlan {
    /// Computes the plan from the remote total, the cursor, and the configured bounds
    pub fn compute(total_count: u64, resume_cursor: u64, config: &CrawlerConfig) -> Self {
        let page_size = config.page_size.max(1);

        let smallest_index = if config.start_index > 0 {
            config.start_index as u64
        } else {
            resume_cursor.saturating_add(1)
        };

        let end_index = if config.end_index > 0 {
            (config.end_index as u64).min(total_count)
        } else {
            total_count
        };

        let start_page = page_of(smallest_index, page_size);
        let end_page = end_index.div_ceil(page_size);

        Self {
            total_count,
            resume_cursor,
            smallest_index,
            end_index,
            page_size,
            start_page,
            end_page,
            first_item: first_item_of(start_page, page_size),
        }
    }

    /// Returns true when no item falls inside the requested bounds
    pub fn is_empty(&self) -> bool {
        self.smallest_index > self.end_index
    }

    /// Listing pages to fetch, in order
    pub fn pages(&self) -> Range<u64> {
        if self.is_empty() {
            self.start_page..self.start_page
        } else {
            self.start_page..self.end_page
        }
    }

    /// Items the bounds ask for
    pub fn expected_items(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.end_index - self.smallest_index + 1
        }
    }

    /// Items the run will actually process, re-fetched page prefix included
    pub fn actual_items(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.end_index - self.first_item + 1
        }
    }

    /// Already-seen items processed again because they share the start page
    pub fn refetch_delta(&self) -> u64 {
        self.actual_items() - self.expected_items()
    }

    /// Cursor value to persist once item `index` is stored
    ///
    /// Inside the re-fetched page prefix the cursor holds at its loaded value;
    /// from `smallest_index` on it follows the item index.
    pub fn cursor_after(&self, index: u64) -> u64 {
        if index < self.smallest_index {
            index.max(self.resume_cursor)
        } else {
            index
        }
    }
}
