//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the KeyValueStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{KeyValueStore, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus};
use crate::sync::CatalogItem;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite storage backend for one named key/value store
pub struct SqliteStorage {
    conn: Connection,
    store: String,
}

impl SqliteStorage {
    /// Opens (or creates) the database at `path` and selects the store `store`
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path, store: &str) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn,
            store: store.to_string(),
        })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory(store: &str) -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn,
            store: store.to_string(),
        })
    }

    /// Name of the selected key/value store
    pub fn store_name(&self) -> &str {
        &self.store
    }

    // ===== Run Management =====

    /// Records the start of a sync run and returns its ID
    pub fn begin_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (store, started_at, config_hash, status) VALUES (?1, ?2, ?3, ?4)",
            params![
                self.store,
                now,
                config_hash,
                RunStatus::Running.to_db_string()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Marks a run as finished with the given outcome
    pub fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        items_stored: Option<u64>,
        error_message: Option<&str>,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET finished_at = ?1, status = ?2, items_stored = ?3, error_message = ?4 WHERE id = ?5",
            params![
                now,
                status.to_db_string(),
                items_stored.map(|n| n as i64),
                error_message,
                run_id
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    /// Gets a run by ID
    pub fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                "SELECT id, store, started_at, finished_at, config_hash, status, items_stored, error_message
                 FROM runs WHERE id = ?1",
                params![run_id],
                row_to_run,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))?
    }

    /// Gets the most recent run for the selected store
    pub fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                "SELECT id, store, started_at, finished_at, config_hash, status, items_stored, error_message
                 FROM runs WHERE store = ?1 ORDER BY id DESC LIMIT 1",
                params![self.store],
                row_to_run,
            )
            .optional()?;

        run.transpose()
    }

    /// Timestamp of the last write under `key`
    pub fn updated_at(&self, key: &str) -> StorageResult<Option<String>> {
        let updated_at = self
            .conn
            .query_row(
                "SELECT updated_at FROM kv_entries WHERE store = ?1 AND key = ?2",
                params![self.store, key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(updated_at)
    }
}

fn row_to_run(row: &Row<'_>) -> rusqlite::Result<StorageResult<RunRecord>> {
    let status_str: String = row.get(5)?;
    let items_stored: Option<i64> = row.get(6)?;

    let Some(status) = RunStatus::from_db_string(&status_str) else {
        return Ok(Err(StorageError::Database(format!(
            "Invalid run status: {}",
            status_str
        ))));
    };

    Ok(Ok(RunRecord {
        id: row.get(0)?,
        store: row.get(1)?,
        started_at: row.get(2)?,
        finished_at: row.get(3)?,
        config_hash: row.get(4)?,
        status,
        items_stored: items_stored.map(|n| n as u64),
        error_message: row.get(7)?,
    }))
}

impl KeyValueStore for SqliteStorage {
    fn set_value(&mut self, key: &str, items: &[CatalogItem]) -> StorageResult<()> {
        let value = serde_json::to_string(items)?;
        let now = Utc::now().to_rfc3339();

        self.conn.execute(
            "INSERT INTO kv_entries (store, key, value, item_count, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(store, key) DO UPDATE SET
                value = excluded.value,
                item_count = excluded.item_count,
                updated_at = excluded.updated_at",
            params![self.store, key, value, items.len() as i64, now],
        )?;

        tracing::debug!(
            "Stored {} items under {}/{}",
            items.len(),
            self.store,
            key
        );
        Ok(())
    }

    fn get_value(&self, key: &str) -> StorageResult<Option<Vec<CatalogItem>>> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE store = ?1 AND key = ?2",
                params![self.store, key],
                |row| row.get(0),
            )
            .optional()?;

        match value {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}
