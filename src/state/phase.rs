/// Crawl engine phase definitions
///
/// A run moves through `Init -> ComputeRange -> PageLoop <-> ItemLoop -> Done`.
/// A failure aborts the run wherever it happens; there is no failure phase.
use std::fmt;

/// Represents where the crawl engine currently is in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Resolving the remote total and the resume cursor
    Init,

    /// Turning bounds and cursor into a page range
    ComputeRange,

    /// Fetching a listing page and extracting its item links
    PageLoop,

    /// Fetching, parsing, and persisting the items of the current page
    ItemLoop,

    /// All resources closed
    Done,
}

impl CrawlPhase {
    /// Returns true if the engine may move from this phase to `next`
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        use CrawlPhase::*;
        matches!(
            (self, next),
            (Init, ComputeRange)
                | (ComputeRange, PageLoop)
                | (ComputeRange, Done)
                | (PageLoop, PageLoop)
                | (PageLoop, ItemLoop)
                | (PageLoop, Done)
                | (ItemLoop, ItemLoop)
                | (ItemLoop, PageLoop)
                | (ItemLoop, Done)
        )
    }

    /// Returns true once the run has finished
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::ComputeRange => "compute_range",
            Self::PageLoop => "page_loop",
            Self::ItemLoop => "item_loop",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
