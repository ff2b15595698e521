//! Output module for crawl reports
//!
//! This module handles:
//! - Deriving statistics from a feed's crawl state
//! - Printing them for the command line

pub mod stats;

pub use stats::{compute_statistics, load_statistics, print_statistics, CrawlStatistics};
