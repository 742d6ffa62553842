//! Retrying HTTP transport
//!
//! This module wraps a `reqwest::Client` with the retry policy every
//! catalog request relies on:
//! - Up to `max_retries` retries after the first attempt
//! - Linear backoff: retry `n` waits `n * base_delay`
//! - Retries on network errors and 5xx responses only
//!
//! Callers only ever see the final success or the final failure.

use crate::config::TransportConfig;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors returned by a single logical request, after retries
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request { url: String, source: reqwest::Error },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("reading response body from {url} failed: {source}")]
    Body { url: String, source: reqwest::Error },

    #[error("invalid response body from {url}: {source}")]
    Decode { url: String, source: reqwest::Error },
}

impl FetchError {
    /// Whether another attempt could succeed
    ///
    /// | Condition | Retry |
    /// |-----------|-------|
    /// | Connect error / timeout / request error | yes |
    /// | HTTP 5xx | yes |
    /// | HTTP 4xx and other statuses | no |
    /// | Body cut off or timed out while reading | yes |
    /// | Undecodable body | no |
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request { source, .. } => {
                source.is_connect() || source.is_timeout() || source.is_request()
            }
            Self::Status { status, .. } => *status >= 500,
            Self::Body { .. } => true,
            Self::Decode { .. } => false,
        }
    }
}

/// Retry budget and backoff for the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,

    /// Delay unit for linear backoff
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    pub fn from_config(config: &TransportConfig) -> Self {
        Self::new(config.max_retries, Duration::from_millis(config.retry_delay_ms))
    }

    /// Delay before the 1-based retry `attempt`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(1000))
    }
}

/// Builds an HTTP client with the configured user agent and timeouts
///
/// # Example
///
/// ```no_run
/// use catalog_sync::config::TransportConfig;
/// use catalog_sync::sync::build_http_client;
///
/// let client = build_http_client(&TransportConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &TransportConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// HTTP client that applies a [`RetryPolicy`] to every GET
#[derive(Debug, Clone)]
pub struct RetryingClient {
    client: Client,
    policy: RetryPolicy,
}

impl RetryingClient {
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    pub fn from_config(config: &TransportConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            build_http_client(config)?,
            RetryPolicy::from_config(config),
        ))
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// GETs `url` and decodes the JSON body, retrying per the policy
    pub async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, FetchError> {
        let mut retries = 0;

        loop {
            match self.get_json_once(url).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && retries < self.policy.max_retries => {
                    retries += 1;
                    let delay = self.policy.delay_for(retries);
                    tracing::warn!(
                        "Retry {}/{} for {} in {:?}: {}",
                        retries,
                        self.policy.max_retries,
                        url,
                        delay,
                        err
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    if retries > 0 {
                        tracing::warn!("Giving up on {} after {} retries", url, retries);
                    }
                    return Err(err);
                }
            }
        }
    }

    async fn get_json_once<T: DeserializeOwned>(&self, url: &Url) -> Result<T, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(|source| {
            let url = url.to_string();
            if source.is_body() || source.is_timeout() {
                FetchError::Body { url, source }
            } else {
                FetchError::Decode { url, source }
            }
        })
    }
}
