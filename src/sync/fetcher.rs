//! Catalog fetcher
//!
//! This module performs the two network operations a sync needs:
//! - The stats probe, which reads the total item count
//! - Page fetches, which map each returned record into a [`CatalogItem`]
//!
//! Both go through the retrying transport, so a returned error is final.

use crate::config::SourceConfig;
use crate::sync::catalog::{CatalogItem, CatalogResponse};
use crate::sync::planner::PageRequest;
use crate::sync::transport::{FetchError, RetryingClient};
use crate::ConfigError;
use async_trait::async_trait;
use url::Url;

/// Source of catalog data
///
/// Implementations must be shareable across the scheduler's tasks.
#[async_trait]
pub trait CatalogSource: Send + Sync + 'static {
    /// Reads the total number of items in the catalog
    async fn fetch_total_count(&self) -> Result<u64, FetchError>;

    /// Fetches and maps one page of items
    async fn fetch_page(&self, request: PageRequest) -> Result<Vec<CatalogItem>, FetchError>;
}

/// [`CatalogSource`] backed by the remote search endpoint
#[derive(Debug, Clone)]
pub struct HttpCatalogSource {
    transport: RetryingClient,
    base_url: Url,
    item_url_prefix: String,
    stats_limit: u32,
}

impl HttpCatalogSource {
    /// Creates a source for the endpoint described by `config`
    ///
    /// # Returns
    ///
    /// * `Ok(HttpCatalogSource)` - Ready to fetch
    /// * `Err(ConfigError)` - `base-url` is not a valid URL
    pub fn new(transport: RetryingClient, config: &SourceConfig) -> Result<Self, ConfigError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

        Ok(Self {
            transport,
            base_url,
            item_url_prefix: config.item_url_prefix.clone(),
            stats_limit: config.stats_limit,
        })
    }

    /// Builds the search URL for a page, keeping the base query intact
    pub fn page_url(&self, limit: u32, offset: u64) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string());
        url
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch_total_count(&self) -> Result<u64, FetchError> {
        let url = self.page_url(self.stats_limit, 0);
        tracing::debug!("Probing catalog size: {}", url);

        let response: CatalogResponse = self.transport.get_json(&url).await?;
        Ok(response.total)
    }

    async fn fetch_page(&self, request: PageRequest) -> Result<Vec<CatalogItem>, FetchError> {
        let url = self.page_url(request.limit, request.offset);
        tracing::debug!("Fetching page at offset {}: {}", request.offset, url);

        let response: CatalogResponse = self.transport.get_json(&url).await?;
        let items = response.into_items(&self.item_url_prefix);

        tracing::debug!(
            "Page at offset {} returned {} items",
            request.offset,
            items.len()
        );
        Ok(items)
    }
}
