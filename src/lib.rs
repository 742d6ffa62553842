//! Catalog-Sync: a bounded-concurrency catalog mirror
//!
//! This crate paginates a remote integration catalog, fetches every page
//! under a fixed concurrency cap, flattens the results and stores the full
//! list under a single key in a local key/value store.

pub mod config;
pub mod output;
pub mod storage;
pub mod sync;

use thiserror::Error;

/// Main error type for Catalog-Sync operations
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Stats probe failed: {0}")]
    StatsProbe(#[source] sync::FetchError),

    #[error("Page fetch failed at offset {offset}: {source}")]
    Page {
        offset: u64,
        #[source]
        source: sync::FetchError,
    },

    #[error("Page task panicked or was cancelled: {message}")]
    TaskPanicked { message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Catalog-Sync operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use sync::{CatalogItem, Coordinator, SyncReport};
