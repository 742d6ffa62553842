//! Storage traits and error types
//!
//! This module defines the key/value interface the sync writes through and
//! its associated error types.

use crate::sync::CatalogItem;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Key/value store the flattened catalog is persisted to
pub trait KeyValueStore {
    /// Writes `items` under `key` in a single operation, replacing any previous value
    fn set_value(&mut self, key: &str, items: &[CatalogItem]) -> StorageResult<()>;

    /// Reads the value under `key`, if any
    fn get_value(&self, key: &str) -> StorageResult<Option<Vec<CatalogItem>>>;
}
