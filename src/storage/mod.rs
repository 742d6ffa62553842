//! Storage module for persisting the synced catalog
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Named key/value stores holding the flattened catalog
//! - Sync run tracking

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{KeyValueStore, StorageError, StorageResult};

use std::path::Path;

/// Opens the key/value store `store` in the database at `path`
pub fn open_storage(path: &Path, store: &str) -> Result<SqliteStorage, StorageError> {
    SqliteStorage::new(path, store)
}

/// Represents a sync run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub store: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub items_stored: Option<u64>,
    pub error_message: Option<String>,
}

/// Status of a sync run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
