use crate::config::OriginConfig;
use url::Url;

/// Checks whether a URL follows the feed's asset-hosting convention
///
/// The host must contain the media-host marker and the path (including any
/// query) must contain the asset-path marker.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use feed_harvest::config::OriginConfig;
/// use feed_harvest::url::is_media_url;
///
/// let origin = OriginConfig::default();
/// let url = Url::parse("http://31.media.tumblr.com/tumblr_abc_500.jpg").unwrap();
/// assert!(is_media_url(&url, &origin));
///
/// let url = Url::parse("http://www.tumblr.com/tumblr_abc_500.jpg").unwrap();
/// assert!(!is_media_url(&url, &origin));
/// ```
pub fn is_media_url(url: &Url, origin: &OriginConfig) -> bool {
    let host_matches = url
        .host_str()
        .map(|host| host.contains(&origin.media_host_marker))
        .unwrap_or(false);

    if !host_matches {
        return false;
    }

    let file = match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    };
    file.contains(&origin.asset_path_marker)
}

/// Keeps only the media URLs, preserving order and duplicates
///
/// # Arguments
///
/// * `urls` - Candidate URLs, usually from [`extract_urls`](crate::url::extract_urls)
/// * `origin` - Host and path markers identifying media URLs
///
/// # Returns
///
/// The URLs for which [`is_media_url`] holds, in their original order
pub fn filter_media_urls(urls: Vec<Url>, origin: &OriginConfig) -> Vec<Url> {
    urls.into_iter()
        .filter(|url| is_media_url(url, origin))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> OriginConfig {
        OriginConfig {
            media_host_marker: ".media.example.com".to_string(),
            asset_path_marker: "/tumblr_".to_string(),
            ..OriginConfig::default()
        }
    }

    fn parse(urls: &[&str]) -> Vec<Url> {
        urls.iter().map(|u| Url::parse(u).unwrap()).collect()
    }

    #[test]
    fn test_requires_both_markers() {
        let origin = origin();

        let url = Url::parse("http://x.media.example.com/tumblr_abc_500.jpg").unwrap();
        assert!(is_media_url(&url, &origin));

        let url = Url::parse("http://x.media.example.com/avatar_abc_64.png").unwrap();
        assert!(!is_media_url(&url, &origin));

        let url = Url::parse("http://www.example.com/tumblr_abc_500.jpg").unwrap();
        assert!(!is_media_url(&url, &origin));
    }

    #[test]
    fn test_nested_path_marker() {
        let url = Url::parse("http://x.media.example.com/abcd/tumblr_xyz_1280.png").unwrap();
        assert!(is_media_url(&url, &origin()));
    }

    #[test]
    fn test_order_and_duplicates_preserved() {
        let urls = parse(&[
            "http://b.media.example.com/tumblr_b_500.jpg",
            "http://example.com/page/2",
            "http://a.media.example.com/tumblr_a_500.jpg",
            "http://b.media.example.com/tumblr_b_500.jpg",
        ]);

        let kept: Vec<String> = filter_media_urls(urls, &origin())
            .iter()
            .map(|u| u.to_string())
            .collect();

        assert_eq!(
            kept,
            vec![
                "http://b.media.example.com/tumblr_b_500.jpg",
                "http://a.media.example.com/tumblr_a_500.jpg",
                "http://b.media.example.com/tumblr_b_500.jpg",
            ]
        );
    }

    #[test]
    fn test_filter_is_idempotent() {
        let urls = parse(&[
            "http://a.media.example.com/tumblr_a_500.jpg",
            "http://example.com/",
            "http://c.media.example.com/tumblr_c_250.gif",
        ]);

        let once = filter_media_urls(urls, &origin());
        let twice = filter_media_urls(once.clone(), &origin());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_input() {
        assert!(filter_media_urls(Vec::new(), &origin()).is_empty());
    }
}
