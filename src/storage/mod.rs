//! Storage module for persisting crawl data
//!
//! This module handles everything written to disk for a feed:
//! - the content-addressed store of downloaded files
//! - the persisted crawl state (dedup index and visited set)

mod content;
mod schema;
mod sqlite;
mod traits;

pub use content::ContentStore;
pub use sqlite::SqliteStateStore;
pub use traits::{StateStore, StorageError, StorageResult};

use std::path::{Path, PathBuf};

/// Directory holding everything stored for one feed
pub fn feed_dir(root: &Path, feed: &str) -> PathBuf {
    root.join(feed)
}

/// Opens the state store for a feed directory
pub fn open_state_store(feed_dir: &Path, state_file: &str) -> SqliteStateStore {
    SqliteStateStore::new(feed_dir.join(state_file))
}
