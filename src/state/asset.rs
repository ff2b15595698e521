/// Asset definitions for the pictures tracked by a crawl
use crate::url::url_filename;
use std::fmt;
use url::Url;

/// One logical picture, possibly known under several resolution variants
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// First-seen media URL; never changes after creation
    pub media_url: Url,

    /// Low-resolution preview derived from `media_url`
    pub thumb_url: Url,

    pub media_filename: String,
    pub thumb_filename: String,

    /// Hex SHA-256 of the thumbnail bytes, set once the thumbnail is staged
    pub content_hash: Option<String>,

    pub hi_res_url: Option<Url>,
    pub hi_res_filename: Option<String>,

    /// Set once hi-res resolution has succeeded; never cleared
    pub hi_res_resolved: bool,
}

/// Where an asset is in hi-res resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HiResState {
    /// No candidate has been found yet; the next hi-res pass probes again
    Unresolved,

    /// A best variant is known (terminal)
    Resolved,
}

impl fmt::Display for HiResState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unresolved => write!(f, "unresolved"),
            Self::Resolved => write!(f, "resolved"),
        }
    }
}

impl Asset {
    /// Creates an asset from a media URL and its derived thumbnail URL
    pub fn new(media_url: Url, thumb_url: Url) -> Self {
        let media_filename = url_filename(&media_url);
        let thumb_filename = url_filename(&thumb_url);

        Self {
            media_url,
            thumb_url,
            media_filename,
            thumb_filename,
            content_hash: None,
            hi_res_url: None,
            hi_res_filename: None,
            hi_res_resolved: false,
        }
    }

    pub fn hi_res_state(&self) -> HiResState {
        if self.hi_res_resolved {
            HiResState::Resolved
        } else {
            HiResState::Unresolved
        }
    }

    /// Records the best variant and moves to [`HiResState::Resolved`]
    pub fn mark_resolved(&mut self, hi_res_url: Url, hi_res_filename: String) {
        self.hi_res_url = Some(hi_res_url);
        self.hi_res_filename = Some(hi_res_filename);
        self.hi_res_resolved = true;
    }
}
