//! Sync module for catalog fetching and persistence
//!
//! This module contains the core sync logic, including:
//! - HTTP transport with retry and linear backoff
//! - Stats probing and page fetching
//! - Pagination planning
//! - The bounded-concurrency task pool
//! - Overall sync coordination

mod catalog;
mod coordinator;
mod fetcher;
mod planner;
pub mod scheduler;
mod transport;

pub use catalog::{CatalogItem, CatalogResponse, RemoteEntity, RemoteIcon};
pub use coordinator::{flatten_pages, Coordinator, SyncReport, SyncSettings};
pub use fetcher::{CatalogSource, HttpCatalogSource};
pub use planner::{plan, total_pages, PageRequest};
pub use scheduler::{ConcurrencyLimit, PoolError, ResultSet, Task, TaskBatch};
pub use transport::{build_http_client, FetchError, RetryPolicy, RetryingClient};

use crate::config::Config;
use crate::storage::{RunStatus, SqliteStorage};
use crate::SyncError;
use std::path::Path;

/// Runs a complete catalog sync
///
/// This is the main entry point for a sync. It will:
/// 1. Open the configured key/value store and record a new run
/// 2. Build the retrying HTTP transport
/// 3. Probe the total, plan pages and fetch them under the concurrency cap
/// 4. Store the flattened catalog under the configured key
/// 5. Record the run's outcome
///
/// # Arguments
///
/// * `config` - The sync configuration
/// * `config_hash` - Hash of the configuration file, recorded with the run
///
/// # Returns
///
/// * `Ok(SyncReport)` - Sync completed and the catalog was stored
/// * `Err(SyncError)` - Sync failed; nothing was stored
pub async fn sync_catalog(config: &Config, config_hash: &str) -> Result<SyncReport, SyncError> {
    let settings = SyncSettings::from_config(config)?;
    let transport = RetryingClient::from_config(&config.transport)?;
    let source = HttpCatalogSource::new(transport, &config.source)?;

    let mut storage = SqliteStorage::new(
        Path::new(&config.output.database_path),
        &config.output.key_value_store,
    )?;
    let run_id = storage.begin_run(config_hash)?;
    tracing::info!(
        "Starting sync run {} into store '{}'",
        run_id,
        config.output.key_value_store
    );

    let mut coordinator = Coordinator::new(source, storage, settings);
    let outcome = coordinator.run().await;
    let mut storage = coordinator.into_store();

    // The catalog write decides the outcome; run bookkeeping only warns
    let recorded = match &outcome {
        Ok(report) => storage.finish_run(
            run_id,
            RunStatus::Completed,
            Some(report.items_stored as u64),
            None,
        ),
        Err(err) => storage.finish_run(run_id, RunStatus::Failed, None, Some(&err.to_string())),
    };
    if let Err(record_err) = recorded {
        tracing::warn!("Failed to record outcome of run {}: {}", run_id, record_err);
    }

    outcome
}
