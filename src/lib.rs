//! Feed-Harvest: a resumable media harvester for paginated feeds
//!
//! This crate crawls feed pages, extracts embedded media references, resolves
//! each one to its best available resolution and keeps a content-addressed,
//! deduplicated store of the downloaded pictures.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Feed-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Invalid page range {start}..{end}: pages start at 1")]
    InvalidPageRange { start: u32, end: u32 },

}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Malformed reference: {0}")]
    MalformedReference(String),

    #[error("Unsupported media type \"{extension}\" addressed by {url}")]
    UnsupportedMediaType { extension: String, url: String },
}

/// Errors raised by a [`crawler::Transport`]
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("IO error writing {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, HttpTransport, Transport};
pub use state::{Asset, CrawlState};
pub use crate::url::{derive_asset, extract_urls, filter_media_urls, substitute_size_marker};
