use serde::Deserialize;

/// Default catalog search endpoint, including its fixed query filters
pub const DEFAULT_BASE_URL: &str = "https://www.make.com/pw-api/integrations/search-apps?name=&nativeApps=true&addOnApps=true&sort=Most+Popular&category=&isCategory=false&isSubCategory=false";

/// Prefix the item slug is appended to when building its public URL
pub const DEFAULT_ITEM_URL_PREFIX: &str = "https://www.make.com/integrations/";

/// Key the flattened catalog is written under
pub const DEFAULT_STORE_KEY: &str = "make_integrations";

/// Main configuration structure for Catalog-Sync
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub transport: TransportConfig,
    pub output: OutputConfig,
}

/// Remote catalog endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Search endpoint; `limit` and `offset` are appended to its query
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Prefix for canonical item URLs
    #[serde(rename = "item-url-prefix", default = "default_item_url_prefix")]
    pub item_url_prefix: String,

    /// Page size used by the stats probe
    #[serde(rename = "stats-limit", default = "default_stats_limit")]
    pub stats_limit: u32,
}

/// Pagination and concurrency configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Number of items requested per page
    #[serde(rename = "page-size", default = "default_page_size")]
    pub page_size: u32,

    /// Maximum number of page fetches in flight at once
    #[serde(rename = "max-concurrent-requests", default = "default_max_concurrent")]
    pub max_concurrent_requests: u32,
}

/// HTTP transport configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TransportConfig {
    /// Retries after the first attempt
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay for linear backoff (milliseconds)
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file backing the key/value store
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Name of the key/value store inside the database
    #[serde(rename = "key-value-store")]
    pub key_value_store: String,

    /// Key the flattened catalog is written under
    #[serde(default = "default_store_key")]
    pub key: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            item_url_prefix: default_item_url_prefix(),
            stats_limit: default_stats_limit(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_concurrent_requests: default_max_concurrent(),
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_item_url_prefix() -> String {
    DEFAULT_ITEM_URL_PREFIX.to_string()
}

fn default_stats_limit() -> u32 {
    10
}

fn default_page_size() -> u32 {
    100
}

fn default_max_concurrent() -> u32 {
    5
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("catalog-sync/{}", env!("CARGO_PKG_VERSION"))
}

fn default_store_key() -> String {
    DEFAULT_STORE_KEY.to_string()
}
