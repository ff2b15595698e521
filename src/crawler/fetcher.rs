//! HTTP transport implementation
//!
//! This module handles all network access for the crawler:
//! - Building HTTP clients with proper user agent strings
//! - GET requests for page text
//! - GET requests saved to a staging file

use crate::config::UserAgentConfig;
use crate::FetchError;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Page and file fetching used by the crawl pipeline
///
/// A failed fetch is an ordinary outcome: a missing page aborts only that
/// page, and a missing hi-res variant just moves the probe to the next
/// candidate.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Fetches the text of a page
    async fn fetch_page(&self, url: &Url) -> Result<String, FetchError>;

    /// Downloads a file to `dest`, replacing anything already there
    async fn fetch_to_file(&self, url: &Url, dest: &Path) -> Result<(), FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use feed_harvest::config::UserAgentConfig;
/// use feed_harvest::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "FeedHarvest".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(config))
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Format: CrawlerName/Version (+ContactURL; ContactEmail)
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

/// [`Transport`] over a `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    async fn get(&self, url: &Url) -> Result<reqwest::Response, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}

impl Transport for HttpTransport {
    async fn fetch_page(&self, url: &Url) -> Result<String, FetchError> {
        let response = self.get(url).await?;
        response.text().await.map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })
    }

    async fn fetch_to_file(&self, url: &Url, dest: &Path) -> Result<(), FetchError> {
        let response = self.get(url).await?;
        let bytes = response.bytes().await.map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })?;

        tokio::fs::write(dest, &bytes)
            .await
            .map_err(|source| FetchError::Io {
                path: dest.display().to_string(),
                source,
            })?;

        tracing::debug!("Fetched {} ({} bytes)", url, bytes.len());
        Ok(())
    }
}
