//! Sync coordinator - main orchestration logic
//!
//! This module wires the pieces of a catalog sync together:
//! - Probing the total item count
//! - Planning one page request per page
//! - Running the page fetches through the bounded task pool
//! - Flattening the pages and writing them to the store in one call

use crate::config::Config;
use crate::storage::KeyValueStore;
use crate::sync::catalog::CatalogItem;
use crate::sync::fetcher::CatalogSource;
use crate::sync::planner::{plan, PageRequest};
use crate::sync::scheduler::{self, ConcurrencyLimit, PoolError, Task, TaskBatch};
use crate::{ConfigError, SyncError};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Settings the coordinator needs, already validated
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub page_size: NonZeroU32,
    pub concurrency: ConcurrencyLimit,
    pub store_key: String,
}

impl SyncSettings {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let page_size = NonZeroU32::new(config.sync.page_size)
            .ok_or_else(|| ConfigError::Validation("page-size must be >= 1".to_string()))?;
        let concurrency = ConcurrencyLimit::new(config.sync.max_concurrent_requests as usize)
            .ok_or_else(|| {
                ConfigError::Validation("max-concurrent-requests must be >= 1".to_string())
            })?;

        Ok(Self {
            page_size,
            concurrency,
            store_key: config.output.key.clone(),
        })
    }
}

/// Outcome of a successful sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Item count reported by the stats probe
    pub total_items: u64,

    /// Number of pages fetched
    pub pages: usize,

    /// Number of items written to the store
    pub items_stored: usize,

    /// Wall-clock duration of the sync
    pub elapsed: Duration,
}

/// Combines page results into one list
///
/// Pages are concatenated in the order given; callers must not rely on that
/// order matching page offsets.
pub fn flatten_pages<I>(pages: I) -> Vec<CatalogItem>
where
    I: IntoIterator<Item = Vec<CatalogItem>>,
{
    pages.into_iter().flatten().collect()
}

/// Main sync coordinator
///
/// Owns the store handle for the duration of one run.
pub struct Coordinator<S, K> {
    source: Arc<S>,
    store: K,
    settings: SyncSettings,
}

impl<S, K> Coordinator<S, K>
where
    S: CatalogSource,
    K: KeyValueStore,
{
    pub fn new(source: S, store: K, settings: SyncSettings) -> Self {
        Self {
            source: Arc::new(source),
            store,
            settings,
        }
    }

    /// Runs one complete sync
    ///
    /// The stats probe finishes before any page is planned. Any failure
    /// aborts the run and nothing is written to the store.
    ///
    /// # Returns
    ///
    /// * `Ok(SyncReport)` - All pages fetched and the catalog stored
    /// * `Err(SyncError)` - The stats probe, a page, or the store write failed
    pub async fn run(&mut self) -> Result<SyncReport, SyncError> {
        let start_time = Instant::now();

        let total_items = self
            .source
            .fetch_total_count()
            .await
            .map_err(SyncError::StatsProbe)?;

        let requests = plan(total_items, self.settings.page_size);
        tracing::info!(
            "Total items: {}, total pages: {}",
            total_items,
            requests.len()
        );

        let pages = requests.len();
        let tasks = self.build_tasks(requests);

        let results = scheduler::run(tasks, self.settings.concurrency)
            .await
            .map_err(|err| match err {
                PoolError::Task { source, .. } => source,
                PoolError::Panicked { message } => SyncError::TaskPanicked { message },
            })?;

        let items = flatten_pages(results.into_values());
        if items.len() as u64 != total_items {
            tracing::warn!(
                "Stats probe reported {} items but pages returned {}",
                total_items,
                items.len()
            );
        }

        self.store.set_value(&self.settings.store_key, &items)?;
        tracing::info!(
            "Stored {} items under key {}",
            items.len(),
            self.settings.store_key
        );

        Ok(SyncReport {
            total_items,
            pages,
            items_stored: items.len(),
            elapsed: start_time.elapsed(),
        })
    }

    /// Builds one page-fetch task per request
    fn build_tasks(&self, requests: Vec<PageRequest>) -> TaskBatch<Vec<CatalogItem>, SyncError> {
        requests
            .into_iter()
            .map(|request| {
                let source = Arc::clone(&self.source);
                Task::new(move || async move {
                    source
                        .fetch_page(request)
                        .await
                        .map_err(|source| SyncError::Page {
                            offset: request.offset,
                            source,
                        })
                })
            })
            .collect()
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    /// Releases the store handle after the run
    pub fn into_store(self) -> K {
        self.store
    }
}
