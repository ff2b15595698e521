//! Crawler coordinator - per-page pipeline and run orchestration
//!
//! This module ties the pieces together for one feed:
//! - Loading and saving the crawl state
//! - Turning each page into assets (extract, filter, derive)
//! - Staging, hashing, deduplicating and committing each new asset
//! - Running the hi-res pass over the dedup index

use crate::config::{validate_feed_name, Config};
use crate::crawler::progress::{NoProgress, ProgressSink};
use crate::crawler::resolver::{resolve_hi_res, ResolveOutcome};
use crate::crawler::Transport;
use crate::state::{Asset, CrawlState};
use crate::storage::{
    feed_dir, open_state_store, ContentStore, SqliteStateStore, StateStore, StorageError,
};
use crate::url::{derive_assets, extract_urls, filter_media_urls};
use crate::HarvestError;
use std::path::Path;
use url::Url;

/// What happened to one asset found on a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetOutcome {
    /// Its thumbnail was processed in an earlier page or run
    AlreadyVisited,

    /// New picture; the full-resolution file was stored
    New,

    /// Same content as an indexed picture; only the thumbnail was stored
    Duplicate,
}

/// Counts for a single page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageSummary {
    pub assets_found: usize,
    pub new: usize,
    pub duplicates: usize,
    pub already_visited: usize,
    pub failed: usize,
}

/// Counts for a page range
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub pages_processed: usize,
    pub pages_failed: usize,
    pub new: usize,
    pub duplicates: usize,
    pub already_visited: usize,
    pub assets_failed: usize,
}

impl RunSummary {
    fn add_page(&mut self, page: &PageSummary) {
        self.pages_processed += 1;
        self.new += page.new;
        self.duplicates += page.duplicates;
        self.already_visited += page.already_visited;
        self.assets_failed += page.failed;
    }
}

/// Counts for a hi-res pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveSummary {
    pub already_resolved: usize,
    pub already_best: usize,
    pub downloaded: usize,
    pub unresolved: usize,
    pub failed: usize,
}

/// Main crawler coordinator for one feed
pub struct Coordinator<T: Transport, P: ProgressSink = NoProgress> {
    config: Config,
    feed: String,
    transport: T,
    content: ContentStore,
    state_store: SqliteStateStore,
    state: CrawlState,
    progress: P,
}

impl<T: Transport> Coordinator<T, NoProgress> {
    /// Creates a coordinator for `feed` and loads its crawl state
    ///
    /// The feed directory is created under the configured root. A missing or
    /// unreadable state file yields an empty state.
    pub fn new(config: Config, feed: &str, transport: T) -> Result<Self, HarvestError> {
        validate_feed_name(feed)?;

        let dir = feed_dir(Path::new(&config.output.root_dir), feed);
        let content = ContentStore::new(&dir);
        content.open()?;

        let state_store = open_state_store(&dir, &config.output.state_file);
        tracing::info!("Loading crawl state from {}", state_store.path().display());
        let state = state_store.load_or_reset();

        Ok(Self {
            config,
            feed: feed.to_string(),
            transport,
            content,
            state_store,
            state,
            progress: NoProgress,
        })
    }
}

impl<T: Transport, P: ProgressSink> Coordinator<T, P> {
    /// Replaces the progress sink
    pub fn with_progress<Q: ProgressSink>(self, progress: Q) -> Coordinator<T, Q> {
        Coordinator {
            config: self.config,
            feed: self.feed,
            transport: self.transport,
            content: self.content,
            state_store: self.state_store,
            state: self.state,
            progress,
        }
    }

    pub fn state(&self) -> &CrawlState {
        &self.state
    }

    pub fn content_store(&self) -> &ContentStore {
        &self.content
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn feed(&self) -> &str {
        &self.feed
    }

    /// Address of a feed page, from the configured template
    pub fn page_url(&self, page: u32) -> String {
        self.config
            .origin
            .page_url_template
            .replace("{feed}", &self.feed)
            .replace("{page}", &page.to_string())
    }

    /// Deletes everything stored for the feed and empties the state
    pub fn reset(&mut self) -> Result<(), HarvestError> {
        tracing::info!("Resetting feed {}", self.feed);
        self.content.remove_all()?;
        self.content.open()?;
        self.state.clear();
        Ok(())
    }

    /// Persists the crawl state
    pub fn save(&self) -> Result<(), HarvestError> {
        self.progress.status("Saving crawl state.");
        self.state_store.save(&self.state)?;
        tracing::info!(
            "Saved crawl state: {} assets, {} visited thumbnails",
            self.state.asset_count(),
            self.state.visited_count()
        );
        Ok(())
    }

    /// Empties the staging area; a failure only leaves stray files behind
    fn clear_staging(&self) {
        if let Err(e) = self.content.clear_staging() {
            tracing::warn!("Failed to clear staging area: {}", e);
        }
    }

    /// Processes every page from `start` to `end` inclusive, then saves
    ///
    /// Pages run in ascending order if `end >= start` and descending
    /// otherwise. A failing page is logged and counted; the run continues.
    ///
    /// # Arguments
    ///
    /// * `start` - First page number, 1 or greater
    /// * `end` - Last page number, 1 or greater
    ///
    /// # Returns
    ///
    /// * `Ok(RunSummary)` - Counts for the range; the state has been saved
    /// * `Err(HarvestError)` - Invalid range or the state could not be saved
    pub async fn run_pages(&mut self, start: u32, end: u32) -> Result<RunSummary, HarvestError> {
        if start < 1 || end < 1 {
            return Err(HarvestError::InvalidPageRange { start, end });
        }

        let pages: Vec<u32> = if end >= start {
            (start..=end).collect()
        } else {
            (end..=start).rev().collect()
        };

        tracing::info!(
            "Crawling feed {}: {} pages ({} to {})",
            self.feed,
            pages.len(),
            start,
            end
        );
        self.progress.set_max(pages.len());
        self.progress.set_progress(0);

        let mut summary = RunSummary::default();
        for (done, page) in pages.into_iter().enumerate() {
            let address = self.page_url(page);
            match self.process_page(&address).await {
                Ok(page_summary) => summary.add_page(&page_summary),
                Err(_) => summary.pages_failed += 1,
            }
            self.progress.set_progress(done + 1);
        }

        self.save()?;
        self.clear_staging();

        tracing::info!(
            "Run complete: {} pages, {} new, {} duplicates, {} already visited, {} failed",
            summary.pages_processed,
            summary.new,
            summary.duplicates,
            summary.already_visited,
            summary.assets_failed
        );
        Ok(summary)
    }

    /// Runs the per-page pipeline for one page address
    ///
    /// A malformed address or a failed page fetch aborts this page only and
    /// is returned as an error. Per-asset failures are logged and counted.
    /// The state is not saved here.
    ///
    /// # Arguments
    ///
    /// * `address` - Absolute address of the feed page
    ///
    /// # Returns
    ///
    /// * `Ok(PageSummary)` - Per-asset counts for the page
    /// * `Err(HarvestError)` - The address did not parse or the page fetch failed
    pub async fn process_page(&mut self, address: &str) -> Result<PageSummary, HarvestError> {
        self.progress
            .status(&format!("Processing page \"{}\".", address));

        // Parse the page address
        let url = Url::parse(address).map_err(|e| {
            tracing::error!("Page address \"{}\" is a malformed URL: {}", address, e);
            HarvestError::UrlParse(e)
        })?;

        // Fetch the page text
        let html = self.transport.fetch_page(&url).await.map_err(|e| {
            tracing::error!("Failed to fetch page {}: {}", url, e);
            HarvestError::Fetch(e)
        })?;

        // Extract, filter and derive the page's assets
        let media_urls = filter_media_urls(extract_urls(&html), &self.config.origin);
        let assets = derive_assets(media_urls, &self.config.media);

        let mut summary = PageSummary {
            assets_found: assets.len(),
            ..PageSummary::default()
        };
        tracing::debug!("{}: {} media assets", url, assets.len());

        // Process each asset; failures only skip that asset
        for asset in assets {
            let media_url = asset.media_url.clone();
            match self.process_asset(asset).await {
                Ok(AssetOutcome::New) => summary.new += 1,
                Ok(AssetOutcome::Duplicate) => summary.duplicates += 1,
                Ok(AssetOutcome::AlreadyVisited) => summary.already_visited += 1,
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", media_url, e);
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    /// Stages, hashes, dedups and commits one asset
    ///
    /// The thumbnail URL is marked visited only after the asset is fully
    /// committed, so a failure here leaves it to be retried on a later run.
    async fn process_asset(&mut self, mut asset: Asset) -> Result<AssetOutcome, HarvestError> {
        if self.state.is_visited(&asset.thumb_url) {
            return Ok(AssetOutcome::AlreadyVisited);
        }

        let thumb_url = asset.thumb_url.clone();
        self.stage_and_hash(&mut asset).await?;
        let outcome = self.commit(asset).await?;

        self.state.mark_visited(&thumb_url);
        Ok(outcome)
    }

    /// Downloads the asset's thumbnail into staging and assigns its content hash
    pub async fn stage_and_hash(&self, asset: &mut Asset) -> Result<String, HarvestError> {
        let thumb_name = asset.thumb_filename.clone();
        let staged = self.content.staging_path(&thumb_name);

        if let Err(e) = self.transport.fetch_to_file(&asset.thumb_url, &staged).await {
            self.content.discard_staged(&thumb_name);
            return Err(e.into());
        }

        let hash = self.content.hash_staged(&thumb_name)?;
        asset.content_hash = Some(hash.clone());
        Ok(hash)
    }

    /// Commits a staged asset
    ///
    /// The thumbnail goes into the bucket of the picture it belongs to. Only a
    /// picture missing from the index has its full-resolution file fetched
    /// and is inserted.
    pub async fn commit(&mut self, asset: Asset) -> Result<AssetOutcome, HarvestError> {
        let hash = asset
            .content_hash
            .clone()
            .ok_or_else(|| StorageError::MissingHash(asset.media_url.to_string()))?;

        let existing_bucket = self
            .state
            .find(&asset)
            .and_then(|found| found.content_hash.clone());

        if let Some(bucket) = existing_bucket {
            tracing::debug!("{} duplicates stored picture {}", asset.media_url, bucket);
            self.content.commit_staged(&asset.thumb_filename, &bucket)?;
            return Ok(AssetOutcome::Duplicate);
        }

        self.content.commit_staged(&asset.thumb_filename, &hash)?;

        let media_name = asset.media_filename.clone();
        if !self.content.is_stored(&hash, &media_name) {
            let staged = self.content.staging_path(&media_name);
            if let Err(e) = self.transport.fetch_to_file(&asset.media_url, &staged).await {
                self.content.discard_staged(&media_name);
                return Err(e.into());
            }
            self.content.commit_staged(&media_name, &hash)?;
        }

        tracing::debug!("Stored new picture {} as {}", asset.media_url, hash);
        self.state.insert(asset)?;
        Ok(AssetOutcome::New)
    }

    /// Probes every unresolved asset for a better variant, then saves
    pub async fn resolve_all_hi_res(&mut self) -> Result<ResolveSummary, HarvestError> {
        self.progress
            .status("Downloading hi res versions of photos in database.");

        let hashes = self.state.hashes();
        self.progress.set_max(hashes.len());
        self.progress.set_progress(0);

        let mut summary = ResolveSummary::default();
        for (done, hash) in hashes.iter().enumerate() {
            if let Some(asset) = self.state.get_mut(hash) {
                let result = resolve_hi_res(
                    asset,
                    &self.config.media.hi_res_suffixes,
                    &self.transport,
                    &self.content,
                )
                .await;

                match result {
                    Ok(ResolveOutcome::AlreadyResolved) => summary.already_resolved += 1,
                    Ok(ResolveOutcome::AlreadyBest(_)) => summary.already_best += 1,
                    Ok(ResolveOutcome::Downloaded(_)) => summary.downloaded += 1,
                    Ok(ResolveOutcome::Exhausted) => summary.unresolved += 1,
                    Err(e) => {
                        tracing::warn!("Hi res resolution failed for {}: {}", hash, e);
                        summary.failed += 1;
                    }
                }
            }
            self.progress.set_progress(done + 1);
        }

        self.save()?;
        self.clear_staging();

        tracing::info!(
            "Hi res pass complete: {} downloaded, {} already best, {} already resolved, {} unresolved",
            summary.downloaded,
            summary.already_best,
            summary.already_resolved,
            summary.unresolved
        );
        Ok(summary)
    }
}
