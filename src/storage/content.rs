//! Content-addressed file store for one feed
//!
//! Downloads land in a staging directory first. Once the thumbnail's hash is
//! known, files are moved into `<feed-dir>/<hash>/<filename>`, so every
//! variant of a picture sits in the same bucket.

use crate::storage::traits::{StorageError, StorageResult};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

const STAGING_DIR: &str = ".staging";

/// Staging area plus hash buckets under a feed directory
#[derive(Debug, Clone)]
pub struct ContentStore {
    feed_dir: PathBuf,
    staging_dir: PathBuf,
}

impl ContentStore {
    pub fn new(feed_dir: impl Into<PathBuf>) -> Self {
        let feed_dir = feed_dir.into();
        let staging_dir = feed_dir.join(STAGING_DIR);
        Self {
            feed_dir,
            staging_dir,
        }
    }

    /// Creates the feed and staging directories if needed
    pub fn open(&self) -> StorageResult<()> {
        fs::create_dir_all(&self.staging_dir)?;
        Ok(())
    }

    pub fn feed_dir(&self) -> &Path {
        &self.feed_dir
    }

    /// Where a download named `name` is staged
    pub fn staging_path(&self, name: &str) -> PathBuf {
        self.staging_dir.join(name)
    }

    /// Where a committed file lives
    pub fn stored_path(&self, hash: &str, name: &str) -> PathBuf {
        self.feed_dir.join(hash).join(name)
    }

    pub fn is_stored(&self, hash: &str, name: &str) -> bool {
        self.stored_path(hash, name).is_file()
    }

    /// Hex SHA-256 of a staged file
    ///
    /// # Arguments
    ///
    /// * `name` - File name inside the staging area
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - 64 hex characters
    /// * `Err(StorageError::NotStaged)` - Nothing is staged under `name`
    pub fn hash_staged(&self, name: &str) -> StorageResult<String> {
        let path = self.staging_path(name);
        let mut file = File::open(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StorageError::NotStaged(name.to_string()),
            _ => StorageError::Io(e),
        })?;

        let mut hasher = Sha256::new();
        io::copy(&mut file, &mut hasher)?;
        Ok(hex::encode(hasher.finalize()))
    }

    /// Moves a staged file into the bucket for `hash`
    ///
    /// # Arguments
    ///
    /// * `name` - File name inside the staging area, kept in the bucket
    /// * `hash` - Content hash naming the bucket
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - Where the file now lives
    /// * `Err(StorageError)` - Nothing staged, or the move failed
    pub fn commit_staged(&self, name: &str, hash: &str) -> StorageResult<PathBuf> {
        let staged = self.staging_path(name);
        if !staged.is_file() {
            return Err(StorageError::NotStaged(name.to_string()));
        }

        let bucket = self.feed_dir.join(hash);
        fs::create_dir_all(&bucket)?;

        let dest = bucket.join(name);
        fs::rename(&staged, &dest)?;
        tracing::debug!("Stored {}", dest.display());
        Ok(dest)
    }

    /// Drops a staged file that will not be committed
    pub fn discard_staged(&self, name: &str) {
        let staged = self.staging_path(name);
        if let Err(e) = fs::remove_file(&staged) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!("Failed to remove {}: {}", staged.display(), e);
            }
        }
    }

    /// Empties the staging area
    pub fn clear_staging(&self) -> StorageResult<()> {
        remove_dir_if_exists(&self.staging_dir)?;
        fs::create_dir_all(&self.staging_dir)?;
        Ok(())
    }

    /// Deletes the whole feed directory, state file included
    pub fn remove_all(&self) -> StorageResult<()> {
        remove_dir_if_exists(&self.feed_dir)
    }
}

fn remove_dir_if_exists(dir: &Path) -> StorageResult<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
