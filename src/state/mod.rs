//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `Asset`: one picture record, with its hi-res resolution status
//! - `CrawlState`: the dedup index keyed by content hash plus the visited set

mod asset;
mod crawl_state;

// Re-export main types
pub use asset::{Asset, HiResState};
pub use crawl_state::CrawlState;
