//! Feed-Harvest main entry point
//!
//! This is the command-line interface for the Feed-Harvest media harvester.

use anyhow::{bail, Context};
use clap::Parser;
use feed_harvest::config::{load_config_with_hash, Config};
use feed_harvest::crawler::{Coordinator, HttpTransport, LogProgress};
use feed_harvest::output::{load_statistics, print_statistics};
use feed_harvest::storage::{feed_dir, open_state_store};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Feed-Harvest: a resumable media harvester for paginated feeds
///
/// Feed-Harvest walks a range of feed pages, stores every picture it finds
/// once per distinct content, and can later upgrade stored pictures to the
/// best resolution the origin serves.
#[derive(Parser, Debug)]
#[command(name = "feed-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A resumable media harvester for paginated feeds", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Name of the feed to harvest
    #[arg(value_name = "FEED")]
    feed: String,

    /// First page to crawl
    #[arg(long, requires = "end", conflicts_with_all = ["hires", "stats"])]
    start: Option<u32>,

    /// Last page to crawl (may be lower than --start to crawl backwards)
    #[arg(long, requires = "start", conflicts_with_all = ["hires", "stats"])]
    end: Option<u32>,

    /// Probe every stored picture for a higher resolution variant
    #[arg(long, conflicts_with = "stats")]
    hires: bool,

    /// Show statistics for the feed and exit
    #[arg(long)]
    stats: bool,

    /// Delete everything stored for the feed before starting
    #[arg(long, conflicts_with = "stats")]
    fresh: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Handle different modes
    if cli.stats {
        handle_stats(&config, &cli.feed)?;
    } else if let (Some(start), Some(end)) = (cli.start, cli.end) {
        handle_crawl(config, &cli.feed, start, end, cli.fresh).await?;
    } else if cli.hires {
        handle_hi_res(config, &cli.feed, cli.fresh).await?;
    } else {
        bail!("nothing to do: pass --start and --end, --hires or --stats");
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("feed_harvest=info,warn"),
            1 => EnvFilter::new("feed_harvest=debug,info"),
            2 => EnvFilter::new("feed_harvest=trace,debug"),
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

/// Builds the HTTP coordinator for a feed, resetting it first if requested
fn open_coordinator(
    config: Config,
    feed: &str,
    fresh: bool,
) -> anyhow::Result<Coordinator<HttpTransport, LogProgress>> {
    let transport =
        HttpTransport::new(&config.user_agent).context("Failed to build HTTP client")?;
    let mut coordinator = Coordinator::new(config, feed, transport)
        .with_context(|| format!("Failed to open feed {}", feed))?
        .with_progress(LogProgress::default());

    if fresh {
        tracing::info!("Starting fresh (discarding previous state)");
        coordinator.reset()?;
    }

    Ok(coordinator)
}

/// Handles the --stats mode: shows statistics from the feed's state file
fn handle_stats(config: &Config, feed: &str) -> anyhow::Result<()> {
    let dir = feed_dir(Path::new(&config.output.root_dir), feed);
    let store = open_state_store(&dir, &config.output.state_file);

    println!("State file: {}\n", store.path().display());

    let stats = load_statistics(&store)
        .with_context(|| format!("No readable crawl state for feed {}", feed))?;
    print_statistics(feed, &stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: Config,
    feed: &str,
    start: u32,
    end: u32,
    fresh: bool,
) -> anyhow::Result<()> {
    let mut coordinator = open_coordinator(config, feed, fresh)?;

    match coordinator.run_pages(start, end).await {
        Ok(summary) => {
            println!(
                "Crawled {} pages ({} failed): {} new, {} duplicates, {} already seen, {} failed assets",
                summary.pages_processed,
                summary.pages_failed,
                summary.new,
                summary.duplicates,
                summary.already_visited,
                summary.assets_failed
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

/// Handles the --hires mode
async fn handle_hi_res(
    config: Config,
    feed: &str,
    fresh: bool,
) -> anyhow::Result<()> {
    let mut coordinator = open_coordinator(config, feed, fresh)?;

    match coordinator.resolve_all_hi_res().await {
        Ok(summary) => {
            println!(
                "Hi res pass: {} downloaded, {} already best, {} already resolved, {} unresolved",
                summary.downloaded,
                summary.already_best,
                summary.already_resolved,
                summary.unresolved
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Hi res pass failed: {}", e);
            Err(e.into())
        }
    }
}
