use serde::Deserialize;

/// Main configuration structure for Feed-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub origin: OriginConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Where the feed lives and how its media URLs are recognised
#[derive(Debug, Clone, Deserialize)]
pub struct OriginConfig {
    /// Page address template; `{feed}` and `{page}` are substituted
    #[serde(rename = "page-url-template", default = "default_page_url_template")]
    pub page_url_template: String,

    /// Substring the host of a media URL must contain
    #[serde(rename = "media-host-marker", default = "default_media_host_marker")]
    pub media_host_marker: String,

    /// Substring the path of a media URL must contain
    #[serde(rename = "asset-path-marker", default = "default_asset_path_marker")]
    pub asset_path_marker: String,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            page_url_template: default_page_url_template(),
            media_host_marker: default_media_host_marker(),
            asset_path_marker: default_asset_path_marker(),
        }
    }
}

/// Size-marker conventions of the feed's media URLs
#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    /// File extensions accepted without a warning
    #[serde(rename = "accepted-extensions", default = "default_accepted_extensions")]
    pub accepted_extensions: Vec<String>,

    /// Size marker that selects the thumbnail variant
    #[serde(rename = "thumbnail-marker", default = "default_thumbnail_marker")]
    pub thumbnail_marker: String,

    /// Size markers probed by the hi-res pass, most preferred first
    #[serde(rename = "hi-res-suffixes", default = "default_hi_res_suffixes")]
    pub hi_res_suffixes: Vec<String>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            accepted_extensions: default_accepted_extensions(),
            thumbnail_marker: default_thumbnail_marker(),
            hi_res_suffixes: default_hi_res_suffixes(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory under which one sub-directory per feed is created
    #[serde(rename = "root-dir")]
    pub root_dir: String,

    /// File name of the persisted crawl state inside the feed directory
    #[serde(rename = "state-file", default = "default_state_file")]
    pub state_file: String,
}

fn default_page_url_template() -> String {
    "http://{feed}.tumblr.com/page/{page}".to_string()
}

fn default_media_host_marker() -> String {
    ".media.tumblr.com".to_string()
}

fn default_asset_path_marker() -> String {
    "/tumblr_".to_string()
}

fn default_accepted_extensions() -> Vec<String> {
    ["jpg", "jpeg", "gif", "png"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_thumbnail_marker() -> String {
    "_75sq".to_string()
}

// Most preferred first; repeated entries are no-ops
fn default_hi_res_suffixes() -> Vec<String> {
    ["_1280", "_700", "_700", "_500", "_400", "_250", "_100"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_state_file() -> String {
    "picpic.db".to_string()
}
