//! Statistics over a feed's crawl state
//!
//! This module derives summary counts from a loaded crawl state and prints
//! them for the `--stats` mode.

use crate::state::{CrawlState, HiResState};
use crate::storage::{StateStore, StorageResult};
use chrono::{DateTime, Utc};

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Number of distinct pictures in the dedup index
    pub assets: usize,

    /// Pictures whose best variant is known
    pub hi_res_resolved: usize,

    /// Pictures still waiting for a hi-res pass
    pub unresolved: usize,

    /// Thumbnail URLs processed so far
    pub visited: usize,

    /// When the state file was last written
    pub last_saved_at: Option<DateTime<Utc>>,
}

/// Computes statistics for a crawl state
pub fn compute_statistics(state: &CrawlState) -> CrawlStatistics {
    let hi_res_resolved = state
        .assets()
        .filter(|a| a.hi_res_state() == HiResState::Resolved)
        .count();

    CrawlStatistics {
        assets: state.asset_count(),
        hi_res_resolved,
        unresolved: state.asset_count() - hi_res_resolved,
        visited: state.visited_count(),
        last_saved_at: None,
    }
}

/// Loads the persisted state and computes its statistics
///
/// # Arguments
///
/// * `store` - The state backend to read
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - The state is missing or unreadable
pub fn load_statistics(store: &dyn StateStore) -> StorageResult<CrawlStatistics> {
    // Load the persisted state
    let state = store.load()?;

    // Count assets and visited thumbnails
    let mut stats = compute_statistics(&state);

    // Add the save timestamp
    stats.last_saved_at = store.last_saved_at()?;
    Ok(stats)
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(feed: &str, stats: &CrawlStatistics) {
    println!("=== Feed Statistics: {} ===\n", feed);

    println!("Pictures:");
    println!("  Stored: {}", stats.assets);
    println!("  Hi res resolved: {}", stats.hi_res_resolved);
    println!("  Awaiting hi res: {}", stats.unresolved);
    println!();

    println!("Visited thumbnails: {}", stats.visited);

    let duplicates = stats.visited.saturating_sub(stats.assets);
    if duplicates > 0 {
        println!("  Duplicates skipped: {}", duplicates);
    }

    match stats.last_saved_at {
        Some(at) => println!("Last saved: {}", at.to_rfc3339()),
        None => println!("Last saved: never"),
    }
}
