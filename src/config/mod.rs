//! Configuration module for Catalog-Sync
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use catalog_sync::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Page size: {}", config.sync.page_size);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, OutputConfig, SourceConfig, SyncConfig, TransportConfig, DEFAULT_BASE_URL,
    DEFAULT_ITEM_URL_PREFIX, DEFAULT_STORE_KEY,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
