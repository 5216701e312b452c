//! Crawl engine - main harvest orchestration logic
//!
//! This module contains the main crawl loop that coordinates:
//! - Resolving the remote total and the resume cursor
//! - Computing the page range to visit
//! - Walking listing pages and their items in ascending index order
//! - Driving fetch, parse, persist, and cursor save for every item

use crate::config::HarvestConfig;
use crate::crawler::fetcher::{FetchRequest, RetryingFetcher};
use crate::crawler::parser::{extract_item_links, ProjectPageParser, RecordParser};
use crate::crawler::retry::RetryPolicy;
use crate::crawler::rotation::RequestRotation;
use crate::output::{ResultSink, RunSummary};
use crate::state::{CrawlPhase, CrawlPlan};
use crate::storage::{ProgressStore, StorageError};
use crate::HarvestError;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

/// Sequential, resumable crawl engine
pub struct CrawlEngine {
    config: Arc<HarvestConfig>,
    fetcher: RetryingFetcher,
    rotation: RequestRotation,
    parser: Box<dyn RecordParser>,
    fresh: bool,
    phase: CrawlPhase,
}

impl CrawlEngine {
    /// Creates a new engine instance
    ///
    /// # Arguments
    ///
    /// * `config` - The harvester configuration
    /// * `fresh` - Whether to ignore the persisted cursor and rewrite the store
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlEngine)` - Successfully created engine
    /// * `Err(HarvestError)` - An HTTP client could not be built
    pub fn new(config: HarvestConfig, fresh: bool) -> Result<Self, HarvestError> {
        let policy = RetryPolicy::from_config(&config.retry);
        let fetcher = RetryingFetcher::new(policy, &config.request.proxies)?;
        let rotation = RequestRotation::new(&config.request, &config.endpoints);

        Ok(Self {
            config: Arc::new(config),
            fetcher,
            rotation,
            parser: Box::new(ProjectPageParser),
            fresh,
            phase: CrawlPhase::Init,
        })
    }

    /// Replaces the detail-page parser
    pub fn with_parser(mut self, parser: impl RecordParser + 'static) -> Self {
        self.parser = Box::new(parser);
        self
    }

    /// Current phase of the run
    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Resolves the remote item total via the count endpoint
    pub async fn fetch_total_count(&self) -> Result<u64, HarvestError> {
        let url = self.config.endpoints.count_url();
        let body = self.fetcher.fetch_url(&url).await?;

        body.trim()
            .parse::<u64>()
            .map_err(|_| HarvestError::InvalidCount { url, body })
    }

    /// Computes the plan of a run without writing anything to disk
    ///
    /// Only the count query is sent; the cursor is read, not opened.
    pub async fn plan(&mut self) -> Result<CrawlPlan, HarvestError> {
        self.phase = CrawlPhase::Init;
        let total_count = self.fetch_total_count().await?;
        let resume_cursor = if self.fresh {
            0
        } else {
            ProgressStore::peek(&self.config.output.progress_path())
        };

        self.enter(CrawlPhase::ComputeRange);
        Ok(self.compute_plan(total_count, resume_cursor))
    }

    /// Runs the main crawl loop
    ///
    /// Any fetch, parse, or storage failure aborts the run. Everything up to the
    /// last saved cursor stays durable, so the next run resumes from there.
    pub async fn run(&mut self) -> Result<RunSummary, HarvestError> {
        let started_at = Utc::now();
        let config = Arc::clone(&self.config);
        self.phase = CrawlPhase::Init;

        let total_count = self.fetch_total_count().await?;
        tracing::info!("Total item count reported by the catalog: {}", total_count);

        let stored_cursor = ProgressStore::peek(&config.output.progress_path());
        let resume_cursor = if self.fresh {
            tracing::info!("Fresh run requested, ignoring cursor {}", stored_cursor);
            0
        } else {
            stored_cursor
        };

        self.enter(CrawlPhase::ComputeRange);
        let plan = self.compute_plan(total_count, resume_cursor);

        let mut summary = RunSummary {
            started_at,
            finished_at: started_at,
            total_count,
            first_item: plan.first_item,
            last_item: None,
            items_processed: 0,
            pages_visited: 0,
            refetched: 0,
        };

        if plan.is_empty() {
            tracing::info!(
                "Nothing to do: items up to {} are already harvested",
                plan.end_index
            );
            self.enter(CrawlPhase::Done);
            summary.finished_at = Utc::now();
            return Ok(summary);
        }

        let data_dir = &config.output.data_dir;
        std::fs::create_dir_all(data_dir).map_err(|e| StorageError::io(data_dir, e))?;

        let mut progress = ProgressStore::open(&config.output.progress_path())?;
        let mut sink = ResultSink::open(&config.output, total_count, resume_cursor, plan.first_item)?;
        let mut current = plan.first_item;

        'pages: for page in plan.pages() {
            self.enter(CrawlPhase::PageLoop);
            let links = self.fetch_listing(page, plan.page_size).await?;
            summary.pages_visited += 1;
            tracing::info!(
                "Page {}/{}: {} item link(s), next item {}",
                page + 1,
                plan.end_page,
                links.len(),
                current
            );

            for link in &links {
                if current > plan.end_index {
                    break 'pages;
                }

                self.enter(CrawlPhase::ItemLoop);
                self.process_item(current, link, &mut sink, &mut progress, &plan)
                    .await?;

                summary.items_processed += 1;
                summary.last_item = Some(current);
                if current < plan.smallest_index {
                    summary.refetched += 1;
                }

                current += 1;
                if current <= plan.end_index {
                    pause(config.crawler.item_delay()).await;
                }
            }

            if page + 1 < plan.end_page {
                pause(config.crawler.page_delay()).await;
            }
        }

        sink.finish()?;
        self.enter(CrawlPhase::Done);
        summary.finished_at = Utc::now();

        tracing::info!(
            "Harvest completed: {} item(s) over {} page(s), cursor at {}",
            summary.items_processed,
            summary.pages_visited,
            progress.load()
        );

        Ok(summary)
    }

    /// Fetches one listing page and returns its item links in order
    async fn fetch_listing(&self, page: u64, page_size: u64) -> Result<Vec<String>, HarvestError> {
        let request = FetchRequest::get(self.config.endpoints.list_url())
            .query("pageIndex", page)
            .query("pageSize", page_size)
            .headers(self.rotation.next_headers())
            .proxy(self.rotation.next_proxy());

        let body = self.fetcher.fetch(&request).await?;
        Ok(extract_item_links(&body))
    }

    /// Fetches, parses, and persists a single item, then advances the cursor
    ///
    /// Items re-fetched from the start page do not rewind the cursor; see
    /// [`CrawlPlan::cursor_after`].
    async fn process_item(
        &self,
        index: u64,
        link: &str,
        sink: &mut ResultSink,
        progress: &mut ProgressStore,
        plan: &CrawlPlan,
    ) -> Result<(), HarvestError> {
        let url = self.config.endpoints.detail_url(link);
        let raw = self.fetcher.fetch_url(&url).await?;

        let record = self
            .parser
            .parse(&raw, &url)
            .map_err(|source| HarvestError::Extraction {
                url: url.clone(),
                source,
            })?;

        sink.mirror_record(index, &record)?;
        sink.append_record(&record)?;
        progress.save(plan.cursor_after(index))?;

        tracing::debug!("Item {} harvested: {}", index, record.title);
        Ok(())
    }

    fn compute_plan(&self, total_count: u64, resume_cursor: u64) -> CrawlPlan {
        let plan = CrawlPlan::compute(total_count, resume_cursor, &self.config.crawler);

        tracing::info!(
            "Resume cursor {}, items {}..={} requested",
            resume_cursor,
            plan.smallest_index,
            plan.end_index
        );
        tracing::info!("Items expected to harvest: {}", plan.expected_items());
        tracing::info!(
            "Items rewritten because their page is re-fetched: {}",
            plan.refetch_delta()
        );
        tracing::info!("Items to process in total: {}", plan.actual_items());

        plan
    }

    fn enter(&mut self, next: CrawlPhase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "invalid phase transition {} -> {}",
            self.phase,
            next
        );
        tracing::trace!("Phase {} -> {}", self.phase, next);
        self.phase = next;
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// Runs a complete harvest with the default parser
///
/// # Example
///
/// ```no_run
/// use catalog_harvester::config::load_config;
/// use catalog_harvester::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvester.toml"))?;
/// let summary = run_crawl(config, false).await?;
/// println!("{} items harvested", summary.items_processed);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: HarvestConfig, fresh: bool) -> Result<RunSummary, HarvestError> {
    let mut engine = CrawlEngine::new(config, fresh)?;
    engine.run().await
}
