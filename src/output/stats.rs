//! Statistics about the stored catalog
//!
//! This module loads a summary of what is currently stored under the
//! configured key, along with the latest run, and prints it.

use crate::storage::{KeyValueStore, RunRecord, SqliteStorage, StorageResult};
use crate::sync::CatalogItem;

/// Summary of the catalog currently in the store
#[derive(Debug, Clone)]
pub struct CatalogStatistics {
    /// Store and key the catalog was read from
    pub store: String,
    pub key: String,

    /// Stored items, empty if nothing was ever stored
    pub items: Vec<CatalogItem>,

    /// Whether the key exists at all
    pub present: bool,

    /// Time of the last write
    pub updated_at: Option<String>,

    /// Most recent run for this store
    pub latest_run: Option<RunRecord>,
}

impl CatalogStatistics {
    /// Number of stored items without an icon
    pub fn missing_icons(&self) -> usize {
        self.items.iter().filter(|item| item.icon.is_none()).count()
    }
}

/// Loads statistics for `key` from storage
pub fn load_statistics(storage: &SqliteStorage, key: &str) -> StorageResult<CatalogStatistics> {
    let value = storage.get_value(key)?;

    Ok(CatalogStatistics {
        store: storage.store_name().to_string(),
        key: key.to_string(),
        present: value.is_some(),
        items: value.unwrap_or_default(),
        updated_at: storage.updated_at(key)?,
        latest_run: storage.get_latest_run()?,
    })
}

/// Prints statistics to stdout, listing at most `limit` items
pub fn print_statistics(stats: &CatalogStatistics, limit: usize) {
    println!("=== Stored Catalog ===\n");

    println!("Store: {}/{}", stats.store, stats.key);
    if !stats.present {
        println!("  Nothing stored yet");
    } else {
        println!("  Items: {}", stats.items.len());
        println!("  Items without icon: {}", stats.missing_icons());
        if let Some(updated_at) = &stats.updated_at {
            println!("  Updated at: {}", updated_at);
        }
    }
    println!();

    if let Some(run) = &stats.latest_run {
        println!("Latest Run:");
        println!("  ID: {}", run.id);
        println!("  Status: {}", run.status.to_db_string());
        println!("  Started: {}", run.started_at);
        if let Some(finished_at) = &run.finished_at {
            println!("  Finished: {}", finished_at);
        }
        if let Some(error) = &run.error_message {
            println!("  Error: {}", error);
        }
        println!();
    }

    if !stats.items.is_empty() {
        println!("Items (showing {} of {}):", limit.min(stats.items.len()), stats.items.len());
        for item in stats.items.iter().take(limit) {
            println!("  - {} <{}>", item.name, item.url);
        }
    }
}
