use crate::config::types::{Config, OutputConfig, SourceConfig, SyncConfig, TransportConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_source_config(&config.source)?;
    validate_sync_config(&config.sync)?;
    validate_transport_config(&config.transport)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the remote endpoint configuration
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    Url::parse(&config.item_url_prefix)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid item-url-prefix: {}", e)))?;

    if config.stats_limit < 1 {
        return Err(ConfigError::Validation(
            "stats-limit must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates pagination and concurrency settings
fn validate_sync_config(config: &SyncConfig) -> Result<(), ConfigError> {
    if config.page_size < 1 || config.page_size > 1000 {
        return Err(ConfigError::Validation(format!(
            "page-size must be between 1 and 1000, got {}",
            config.page_size
        )));
    }

    if config.max_concurrent_requests < 1 || config.max_concurrent_requests > 100 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-requests must be between 1 and 100, got {}",
            config.max_concurrent_requests
        )));
    }

    Ok(())
}

/// Validates transport settings
fn validate_transport_config(config: &TransportConfig) -> Result<(), ConfigError> {
    if config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max-retries must be <= 10, got {}",
            config.max_retries
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    if config.key_value_store.trim().is_empty() {
        return Err(ConfigError::Validation(
            "key-value-store cannot be empty".to_string(),
        ));
    }

    if config.key.trim().is_empty() {
        return Err(ConfigError::Validation("key cannot be empty".to_string()));
    }

    Ok(())
}
