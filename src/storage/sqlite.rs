//! SQLite state store
//!
//! This module provides a SQLite-based implementation of the StateStore trait.
//! A save writes a complete new file next to the old one and renames it into
//! place, so readers only ever see the previous or the next state.

use crate::state::{Asset, CrawlState};
use crate::storage::schema::{initialize_schema, COLLECTIONS};
use crate::storage::traits::{StateStore, StorageError, StorageResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::{Path, PathBuf};
use url::Url;

/// SQLite-backed crawl state
pub struct SqliteStateStore {
    path: PathBuf,
}

impl SqliteStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn open_read_only(&self) -> StorageResult<Connection> {
        if !self.path.exists() {
            return Err(StorageError::StateLoad(format!(
                "{} does not exist",
                self.path.display()
            )));
        }

        Ok(Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?)
    }
}

/// Checks that exactly the expected collections were stored
fn check_collections(conn: &Connection) -> StorageResult<()> {
    let mut stmt = conn.prepare("SELECT name FROM collections ORDER BY name")?;
    let stored = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut expected: Vec<&str> = COLLECTIONS.to_vec();
    expected.sort_unstable();

    if stored.len() != expected.len() || stored.iter().zip(&expected).any(|(a, b)| a != b) {
        return Err(StorageError::StateLoad(format!(
            "expected {} stored collections {:?}, found {} {:?}",
            expected.len(),
            expected,
            stored.len(),
            stored
        )));
    }

    Ok(())
}

fn parse_url(raw: &str) -> StorageResult<Url> {
    Url::parse(raw)
        .map_err(|e| StorageError::StateLoad(format!("stored URL \"{}\" is malformed: {}", raw, e)))
}

/// Raw asset row, parsed after the statement is done with the connection
struct AssetRow {
    content_hash: String,
    media_url: String,
    thumb_url: String,
    media_filename: String,
    thumb_filename: String,
    hi_res_url: Option<String>,
    hi_res_filename: Option<String>,
    hi_res_resolved: bool,
}

impl AssetRow {
    fn into_asset(self) -> StorageResult<Asset> {
        let mut asset = Asset::new(parse_url(&self.media_url)?, parse_url(&self.thumb_url)?);
        asset.media_filename = self.media_filename;
        asset.thumb_filename = self.thumb_filename;
        asset.content_hash = Some(self.content_hash);
        asset.hi_res_url = self.hi_res_url.as_deref().map(parse_url).transpose()?;
        asset.hi_res_filename = self.hi_res_filename;
        asset.hi_res_resolved = self.hi_res_resolved;
        Ok(asset)
    }
}

fn load_assets(conn: &Connection) -> StorageResult<Vec<Asset>> {
    let mut stmt = conn.prepare(
        "SELECT content_hash, media_url, thumb_url, media_filename, thumb_filename,
         hi_res_url, hi_res_filename, hi_res_resolved
         FROM assets",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(AssetRow {
                content_hash: row.get(0)?,
                media_url: row.get(1)?,
                thumb_url: row.get(2)?,
                media_filename: row.get(3)?,
                thumb_filename: row.get(4)?,
                hi_res_url: row.get(5)?,
                hi_res_filename: row.get(6)?,
                hi_res_resolved: row.get(7)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter().map(AssetRow::into_asset).collect()
}

fn load_visited(conn: &Connection) -> StorageResult<Vec<String>> {
    let mut stmt = conn.prepare("SELECT thumb_url FROM visited")?;
    let urls = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(urls)
}

impl StateStore for SqliteStateStore {
    fn load(&self) -> StorageResult<CrawlState> {
        let conn = self.open_read_only()?;

        check_collections(&conn)?;
        let assets = load_assets(&conn)?;
        let visited = load_visited(&conn)?;

        CrawlState::from_parts(assets, visited)
    }

    fn save(&self, state: &CrawlState) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let temp_path = self.temp_path();
        if temp_path.exists() {
            std::fs::remove_file(&temp_path)?;
        }

        {
            let mut conn = Connection::open(&temp_path)?;
            initialize_schema(&conn)?;

            let tx = conn.transaction()?;
            {
                let mut insert_asset = tx.prepare(
                    "INSERT INTO assets (content_hash, media_url, thumb_url, media_filename,
                     thumb_filename, hi_res_url, hi_res_filename, hi_res_resolved)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                )?;
                for asset in state.assets() {
                    let hash = asset
                        .content_hash
                        .as_deref()
                        .ok_or_else(|| StorageError::MissingHash(asset.media_url.to_string()))?;
                    insert_asset.execute(params![
                        hash,
                        asset.media_url.as_str(),
                        asset.thumb_url.as_str(),
                        asset.media_filename,
                        asset.thumb_filename,
                        asset.hi_res_url.as_ref().map(|u| u.as_str()),
                        asset.hi_res_filename,
                        asset.hi_res_resolved,
                    ])?;
                }

                let mut insert_visited =
                    tx.prepare("INSERT INTO visited (thumb_url) VALUES (?1)")?;
                for url in state.visited() {
                    insert_visited.execute(params![url])?;
                }

                let now = Utc::now().to_rfc3339();
                let mut insert_collection =
                    tx.prepare("INSERT INTO collections (name, saved_at) VALUES (?1, ?2)")?;
                for name in COLLECTIONS {
                    insert_collection.execute(params![name, now])?;
                }
            }
            tx.commit()?;
        }

        std::fs::rename(&temp_path, &self.path)?;

        tracing::debug!(
            "Saved {} assets and {} visited thumbnails to {}",
            state.asset_count(),
            state.visited_count(),
            self.path.display()
        );
        Ok(())
    }

    fn last_saved_at(&self) -> StorageResult<Option<DateTime<Utc>>> {
        let conn = self.open_read_only()?;
        let saved_at: Option<String> = conn
            .query_row("SELECT MAX(saved_at) FROM collections", [], |row| row.get(0))
            .optional()?
            .flatten();

        Ok(saved_at
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc)))
    }
}
