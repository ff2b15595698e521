use crate::config::types::{Config, MediaConfig, OriginConfig, OutputConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_origin_config(&config.origin)?;
    validate_media_config(&config.media)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the origin section
fn validate_origin_config(config: &OriginConfig) -> Result<(), ConfigError> {
    if !config.page_url_template.contains("{page}") {
        return Err(ConfigError::Validation(format!(
            "page_url_template must contain {{page}}, got '{}'",
            config.page_url_template
        )));
    }

    // The template must yield a parseable URL once filled in
    let sample = config
        .page_url_template
        .replace("{feed}", "feed")
        .replace("{page}", "1");
    Url::parse(&sample)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid page_url_template: {}", e)))?;

    if config.media_host_marker.is_empty() {
        return Err(ConfigError::Validation(
            "media_host_marker cannot be empty".to_string(),
        ));
    }

    if config.asset_path_marker.is_empty() {
        return Err(ConfigError::Validation(
            "asset_path_marker cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the media section
fn validate_media_config(config: &MediaConfig) -> Result<(), ConfigError> {
    if config.accepted_extensions.is_empty() {
        return Err(ConfigError::Validation(
            "accepted_extensions must list at least one extension".to_string(),
        ));
    }

    validate_size_marker("thumbnail_marker", &config.thumbnail_marker)?;

    if config.hi_res_suffixes.is_empty() {
        return Err(ConfigError::Validation(
            "hi_res_suffixes must list at least one suffix".to_string(),
        ));
    }

    for suffix in &config.hi_res_suffixes {
        validate_size_marker("hi_res_suffixes", suffix)?;
    }

    Ok(())
}

/// A size marker replaces an underscore segment, so it must start with one
fn validate_size_marker(field: &str, marker: &str) -> Result<(), ConfigError> {
    if !marker.starts_with('_') || marker.len() < 2 {
        return Err(ConfigError::Validation(format!(
            "{} entries must start with '_' and be non-empty, got '{}'",
            field, marker
        )));
    }

    if marker.contains('.') || marker.contains('/') {
        return Err(ConfigError::Validation(format!(
            "{} entries cannot contain '.' or '/', got '{}'",
            field, marker
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    // Validate contact URL
    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.root_dir.is_empty() {
        return Err(ConfigError::Validation(
            "root_dir cannot be empty".to_string(),
        ));
    }

    if config.state_file.is_empty() || config.state_file.contains('/') {
        return Err(ConfigError::Validation(format!(
            "state_file must be a plain file name, got '{}'",
            config.state_file
        )));
    }

    Ok(())
}

/// Validates a feed name given on the command line
///
/// The name becomes both a directory name and part of the page host, so only
/// alphanumeric characters and hyphens are allowed.
pub fn validate_feed_name(feed: &str) -> Result<(), ConfigError> {
    if feed.is_empty() {
        return Err(ConfigError::Validation(
            "feed name cannot be empty".to_string(),
        ));
    }

    if !feed.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ConfigError::Validation(format!(
            "feed name must contain only alphanumeric characters and hyphens, got '{}'",
            feed
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
