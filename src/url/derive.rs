use crate::config::MediaConfig;
use crate::state::Asset;
use crate::UrlError;
use url::Url;

/// Replaces the size marker of a media URL
///
/// The size marker is the final `_`-delimited segment immediately before the
/// last `.` of the serialized URL, e.g. `_500` in `.../tumblr_abc_500.jpg`.
/// Only that one occurrence is replaced. A URL whose last `.` is not preceded
/// by an underscore segment in the same path component has no size marker and
/// is rejected.
///
/// The rule trusts the feed's naming convention: if the size token is not the
/// final underscore segment, a wrong (but well-formed) URL comes back.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use feed_harvest::url::substitute_size_marker;
///
/// let url = Url::parse("http://x.media.example.com/tumblr_abc123_500.jpg").unwrap();
/// let thumb = substitute_size_marker(&url, "_75sq").unwrap();
/// assert_eq!(thumb.as_str(), "http://x.media.example.com/tumblr_abc123_75sq.jpg");
/// ```
pub fn substitute_size_marker(url: &Url, replacement: &str) -> Result<Url, UrlError> {
    let (start, end) = size_marker_span(url.as_str())
        .ok_or_else(|| UrlError::MalformedReference(format!("{} has no size marker", url)))?;

    let raw = url.as_str();
    let candidate = format!("{}{}{}", &raw[..start], replacement, &raw[end..]);

    Url::parse(&candidate).map_err(|e| {
        UrlError::MalformedReference(format!("\"{}\" is a malformed URL: {}", candidate, e))
    })
}

/// Byte range of the size marker, underscore included, extension excluded
fn size_marker_span(raw: &str) -> Option<(usize, usize)> {
    let dot = raw.rfind('.')?;
    let underscore = raw[..dot].rfind('_')?;

    if raw[underscore..dot].contains('/') {
        return None;
    }

    Some((underscore, dot))
}

/// Returns the extension after the last `.` of the serialized URL
pub fn media_extension(url: &Url) -> Option<&str> {
    let raw = url.as_str();
    raw.rfind('.').map(|dot| &raw[dot + 1..])
}

/// Checks the URL's extension against the accepted image types
pub fn check_media_type(url: &Url, media: &MediaConfig) -> Result<(), UrlError> {
    let extension = media_extension(url).unwrap_or("");
    let accepted = media
        .accepted_extensions
        .iter()
        .any(|ext| ext.eq_ignore_ascii_case(extension));

    if accepted {
        Ok(())
    } else {
        Err(UrlError::UnsupportedMediaType {
            extension: extension.to_string(),
            url: url.to_string(),
        })
    }
}

/// Last path segment of a URL, used as its file name in the store
pub fn url_filename(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or("")
        .to_string()
}

/// Builds an [`Asset`] for a media URL by deriving its thumbnail URL
///
/// An unsupported extension is only logged; derivation is still attempted.
///
/// # Arguments
///
/// * `media_url` - Media URL as found on the page
/// * `media` - Accepted extensions and the thumbnail marker
///
/// # Returns
///
/// * `Ok(Asset)` - Asset with its thumbnail URL and file names set
/// * `Err(UrlError::MalformedReference)` - No size marker, or the derived
///   thumbnail URL does not parse
pub fn derive_asset(media_url: Url, media: &MediaConfig) -> Result<Asset, UrlError> {
    if let Err(e) = check_media_type(&media_url, media) {
        tracing::warn!("{}", e);
    }

    let thumb_url = substitute_size_marker(&media_url, &media.thumbnail_marker)?;
    Ok(Asset::new(media_url, thumb_url))
}

/// Derives an asset for every media URL, skipping the ones that fail
pub fn derive_assets(media_urls: Vec<Url>, media: &MediaConfig) -> Vec<Asset> {
    media_urls
        .into_iter()
        .filter_map(|url| match derive_asset(url, media) {
            Ok(asset) => Some(asset),
            Err(e) => {
                tracing::warn!("Skipping media reference: {}", e);
                None
            }
        })
        .collect()
}
