//! Database schema for the persisted crawl state

/// Names of the collections a complete state file holds
pub const COLLECTIONS: &[&str] = &["assets", "visited"];

/// SQL schema for the state file
pub const SCHEMA_SQL: &str = r#"
-- One row per stored collection; a state file is complete only if every
-- collection is listed here
CREATE TABLE IF NOT EXISTS collections (
    name TEXT PRIMARY KEY,
    saved_at TEXT NOT NULL
);

-- Dedup index, keyed by content hash
CREATE TABLE IF NOT EXISTS assets (
    content_hash TEXT PRIMARY KEY,
    media_url TEXT NOT NULL UNIQUE,
    thumb_url TEXT NOT NULL,
    media_filename TEXT NOT NULL,
    thumb_filename TEXT NOT NULL,
    hi_res_url TEXT,
    hi_res_filename TEXT,
    hi_res_resolved INTEGER NOT NULL DEFAULT 0
);

-- Thumbnail URLs already processed
CREATE TABLE IF NOT EXISTS visited (
    thumb_url TEXT PRIMARY KEY
);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
