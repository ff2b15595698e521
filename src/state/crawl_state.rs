//! In-memory crawl state: the dedup index and the visited set
//!
//! Both collections are always loaded, mutated and saved together.

use crate::state::Asset;
use crate::storage::StorageError;
use std::collections::{HashMap, HashSet};
use url::Url;

/// Dedup index plus visited thumbnail URLs for one feed
#[derive(Debug, Clone, Default)]
pub struct CrawlState {
    /// Content hash -> asset
    assets: HashMap<String, Asset>,

    /// First-seen media URL -> content hash
    by_media_url: HashMap<String, String>,

    /// Thumbnail URLs processed in any run
    visited: HashSet<String>,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a state from persisted collections
    ///
    /// Fails if any asset lacks a hash or if two assets share a hash or a
    /// media URL, so a damaged file never yields a partial index.
    pub fn from_parts(
        assets: Vec<Asset>,
        visited: impl IntoIterator<Item = String>,
    ) -> Result<Self, StorageError> {
        let mut state = Self::new();

        for asset in assets {
            if state.contains(&asset) {
                return Err(StorageError::StateLoad(format!(
                    "duplicate index entry for {}",
                    asset.media_url
                )));
            }
            state.insert(asset)?;
        }

        state.visited.extend(visited);
        Ok(state)
    }

    /// Returns true if an asset with the same identity is already indexed
    pub fn contains(&self, asset: &Asset) -> bool {
        self.find(asset).is_some()
    }

    /// Looks up the indexed asset sharing this asset's identity
    pub fn find(&self, asset: &Asset) -> Option<&Asset> {
        if let Some(hash) = &asset.content_hash {
            if let Some(found) = self.assets.get(hash) {
                return Some(found);
            }
        }

        self.by_media_url
            .get(asset.media_url.as_str())
            .and_then(|hash| self.assets.get(hash))
    }

    /// Inserts an asset whose content hash is known
    ///
    /// Returns `Ok(false)` without touching the index when the picture is
    /// already present.
    pub fn insert(&mut self, asset: Asset) -> Result<bool, StorageError> {
        let hash = asset
            .content_hash
            .clone()
            .ok_or_else(|| StorageError::MissingHash(asset.media_url.to_string()))?;

        if self.contains(&asset) {
            return Ok(false);
        }

        self.by_media_url
            .insert(asset.media_url.to_string(), hash.clone());
        self.assets.insert(hash, asset);
        Ok(true)
    }

    pub fn get(&self, hash: &str) -> Option<&Asset> {
        self.assets.get(hash)
    }

    pub fn get_mut(&mut self, hash: &str) -> Option<&mut Asset> {
        self.assets.get_mut(hash)
    }

    pub fn assets(&self) -> impl Iterator<Item = &Asset> {
        self.assets.values()
    }

    /// Content hashes of every indexed asset, sorted for a stable walk order
    pub fn hashes(&self) -> Vec<String> {
        let mut hashes: Vec<String> = self.assets.keys().cloned().collect();
        hashes.sort();
        hashes
    }

    pub fn is_visited(&self, thumb_url: &Url) -> bool {
        self.visited.contains(thumb_url.as_str())
    }

    pub fn mark_visited(&mut self, thumb_url: &Url) {
        self.visited.insert(thumb_url.to_string());
    }

    pub fn visited(&self) -> impl Iterator<Item = &String> {
        self.visited.iter()
    }

    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty() && self.visited.is_empty()
    }

    pub fn clear(&mut self) {
        self.assets.clear();
        self.by_media_url.clear();
        self.visited.clear();
    }
}
