//! Storage traits and error types
//!
//! This module defines the trait interface for crawl-state backends and
//! associated error types.

use crate::state::CrawlState;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// The persisted state is missing, truncated or inconsistent
    #[error("Unable to load crawl state: {0}")]
    StateLoad(String),

    #[error("Asset {0} has no content hash")]
    MissingHash(String),

    #[error("Nothing staged under {0}")]
    NotStaged(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for crawl-state backends
///
/// The dedup index and the visited set are read and written together; a
/// backend never hands out one without the other.
pub trait StateStore {
    /// Loads the persisted state
    ///
    /// Any missing, truncated or structurally inconsistent data is reported
    /// as [`StorageError::StateLoad`] (or the underlying error) rather than
    /// returned as a partial state.
    fn load(&self) -> StorageResult<CrawlState>;

    /// Replaces the persisted state atomically
    fn save(&self, state: &CrawlState) -> StorageResult<()>;

    /// When the persisted state was last saved, if ever
    fn last_saved_at(&self) -> StorageResult<Option<DateTime<Utc>>>;

    /// Loads the persisted state, falling back to an empty one
    fn load_or_reset(&self) -> CrawlState {
        match self.load() {
            Ok(state) => {
                tracing::info!(
                    "Loaded crawl state: {} assets, {} visited thumbnails",
                    state.asset_count(),
                    state.visited_count()
                );
                state
            }
            Err(e) => {
                tracing::warn!("{}; starting with an empty crawl state", e);
                CrawlState::new()
            }
        }
    }
}
