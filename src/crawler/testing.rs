//! In-memory transport for unit tests

use crate::crawler::Transport;
use crate::FetchError;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use url::Url;

/// Serves canned pages and files and records every request
#[derive(Debug, Default)]
pub struct MemoryTransport {
    pages: HashMap<String, String>,
    files: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }

    pub fn with_file(mut self, url: &str, bytes: &[u8]) -> Self {
        self.files.insert(url.to_string(), bytes.to_vec());
        self
    }

    /// Every URL requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.as_str() == url)
            .count()
    }

    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }

    fn record(&self, url: &Url) {
        self.requests.lock().unwrap().push(url.to_string());
    }
}

fn not_found(url: &Url) -> FetchError {
    FetchError::Status {
        url: url.to_string(),
        status: 404,
    }
}

impl Transport for MemoryTransport {
    async fn fetch_page(&self, url: &Url) -> Result<String, FetchError> {
        self.record(url);
        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| not_found(url))
    }

    async fn fetch_to_file(&self, url: &Url, dest: &Path) -> Result<(), FetchError> {
        self.record(url);
        let bytes = self
            .files
            .get(url.as_str())
            .ok_or_else(|| not_found(url))?;

        std::fs::write(dest, bytes).map_err(|source| FetchError::Io {
            path: dest.display().to_string(),
            source,
        })
    }
}
