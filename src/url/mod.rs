//! URL handling module for Feed-Harvest
//!
//! This module turns raw page text into media assets:
//! - extraction of absolute URLs from arbitrary text
//! - filtering down to the feed's media URLs
//! - size-marker substitution used to derive thumbnail and hi-res variants

mod derive;
mod extract;
mod filter;

// Re-export main functions
pub use derive::{
    check_media_type, derive_asset, derive_assets, media_extension, substitute_size_marker,
    url_filename,
};
pub use extract::extract_urls;
pub use filter::{filter_media_urls, is_media_url};
