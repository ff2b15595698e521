//! Crawler module for page processing and hi-res resolution
//!
//! This module contains the core crawling logic, including:
//! - Page and file fetching behind the `Transport` trait
//! - The per-page extract, derive, stage, hash, dedup, commit pipeline
//! - Hi-res probing of stored assets
//! - Progress hooks for front-ends

mod coordinator;
mod fetcher;
mod progress;
mod resolver;

#[cfg(test)]
pub(crate) mod testing;

pub use coordinator::{AssetOutcome, Coordinator, PageSummary, ResolveSummary, RunSummary};
pub use fetcher::{build_http_client, user_agent_string, HttpTransport, Transport};
pub use progress::{LogProgress, NoProgress, ProgressSink};
pub use resolver::{resolve_hi_res, ResolveOutcome};
