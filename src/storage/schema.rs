//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Catalog-Sync database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track sync runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    store TEXT NOT NULL,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    items_stored INTEGER,
    error_message TEXT
);

CREATE INDEX IF NOT EXISTS idx_runs_store ON runs(store);

-- Named key/value stores
CREATE TABLE IF NOT EXISTS kv_entries (
    store TEXT NOT NULL,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    item_count INTEGER NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (store, key)
);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
