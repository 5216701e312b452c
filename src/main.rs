//! Catalog Harvester main entry point
//!
//! This is the command-line interface for the resumable catalog harvester.

use anyhow::Context;
use catalog_harvester::config::{load_config_with_hash, validate, HarvestConfig};
use catalog_harvester::output::print_summary;
use catalog_harvester::CrawlEngine;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Catalog Harvester: a resumable crawler for paginated listing services
///
/// Walks the catalog listing page by page, fetches every item's detail page,
/// and appends the extracted records to a table, resuming from the last
/// persisted item index after an interruption.
#[derive(Parser, Debug)]
#[command(name = "catalog-harvester")]
#[command(version = "1.0.0")]
#[command(about = "A resumable crawler for paginated listing services", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Start from item 1 again, ignoring the persisted cursor
    #[arg(long)]
    fresh: bool,

    /// Show the crawl plan without fetching items or writing anything
    #[arg(long)]
    dry_run: bool,

    /// Smallest item index to harvest (overrides the config)
    #[arg(long, value_name = "N")]
    start: Option<i64>,

    /// Largest item index to harvest (overrides the config)
    #[arg(long, value_name = "N")]
    end: Option<i64>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using built-in defaults");
            HarvestConfig::default()
        }
    };

    if let Some(start) = cli.start {
        config.crawler.start_index = start;
    }
    if let Some(end) = cli.end {
        config.crawler.end_index = end;
    }
    validate(&config).context("invalid crawl bounds")?;

    if cli.dry_run {
        handle_dry_run(config, cli.fresh).await
    } else {
        handle_crawl(config, cli.fresh).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_harvester=info,warn"),
            1 => EnvFilter::new("catalog_harvester=debug,info"),
            2 => EnvFilter::new("catalog_harvester=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: queries the total and shows what would be harvested
async fn handle_dry_run(config: HarvestConfig, fresh: bool) -> anyhow::Result<()> {
    println!("=== Catalog Harvester Dry Run ===\n");

    println!("Endpoints:");
    println!("  Count:   {}", config.endpoints.count_url());
    println!("  Listing: {}", config.endpoints.list_url());

    println!("\nRequests:");
    println!("  User agents: {}", config.request.user_agents.len());
    println!("  Proxies:     {}", config.request.proxies.len());
    println!(
        "  Retries:     {} attempt(s), base delay {}ms, growth {}",
        config.retry.max_attempts, config.retry.base_delay_ms, config.retry.growth_rate
    );

    println!("\nOutput:");
    println!("  Table:    {}", config.output.table_path().display());
    println!("  Progress: {}", config.output.progress_path().display());
    println!(
        "  Mirror:   {}",
        if config.output.mirror_records {
            "enabled"
        } else {
            "disabled"
        }
    );

    let mut engine = CrawlEngine::new(config, fresh)?;
    let plan = engine.plan().await.context("failed to compute crawl plan")?;

    println!("\nPlan:");
    println!("  Remote total:   {}", plan.total_count);
    println!("  Resume cursor:  {}", plan.resume_cursor);
    if plan.is_empty() {
        println!("\n✓ Nothing to do");
        return Ok(());
    }
    println!("  Items:          {}..={}", plan.smallest_index, plan.end_index);
    println!("  Pages:          {}..{}", plan.start_page, plan.end_page);
    println!("  Expected items: {}", plan.expected_items());
    println!("  Re-fetched:     {}", plan.refetch_delta());
    println!("\n✓ Would process {} item(s)", plan.actual_items());

    Ok(())
}

/// Handles the main harvest operation
async fn handle_crawl(config: HarvestConfig, fresh: bool) -> anyhow::Result<()> {
    if fresh {
        tracing::info!("Starting fresh harvest (ignoring persisted cursor)");
    } else {
        tracing::info!("Starting harvest (will resume from persisted cursor)");
    }

    let mut engine = CrawlEngine::new(config, fresh)?;
    match engine.run().await {
        Ok(summary) => {
            tracing::info!("Harvest completed successfully");
            print_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
