use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// `scheme://host[:port][/path][?query]`, where the path is ASCII word
/// characters, slashes and dots, and the query runs to the next whitespace
///
/// The character classes are ASCII-only, so a non-ASCII character ends the
/// host or path.
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://[-.0-9A-Za-z_]+(:[0-9]+)?(/([/.0-9A-Za-z_]*(\?\S+)?)?)?")
        .expect("hardcoded regex pattern is valid")
});

/// Extracts every absolute HTTP(S) URL from a blob of text
///
/// Matches are returned in order of first appearance and duplicates are kept.
/// A match that `Url::parse` rejects is logged and dropped.
///
/// # Arguments
///
/// * `text` - Page text, usually raw HTML
///
/// # Returns
///
/// Every URL that both matched and parsed, in document order
///
/// # Examples
///
/// ```
/// use feed_harvest::url::extract_urls;
///
/// let html = r#"<img src="http://a.example.com/x_1.jpg"> and https://b.example.com/"#;
/// let urls = extract_urls(html);
/// assert_eq!(urls.len(), 2);
/// assert_eq!(urls[0].as_str(), "http://a.example.com/x_1.jpg");
/// ```
pub fn extract_urls(text: &str) -> Vec<Url> {
    URL_PATTERN
        .find_iter(text)
        .filter_map(|m| match Url::parse(m.as_str()) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!("Matched URL \"{}\" is a malformed URL: {}", m.as_str(), e);
                None
            }
        })
        .collect()
}
