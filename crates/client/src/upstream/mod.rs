//! Upstream recipe API client.
//!
//! Forwards one of five read-only JSON endpoints to the external recipe API
//! and normalizes failures:
//!
//! - **URL**: `{base}/{api_key}/{endpoint}` with `?query` only when parameters exist.
//! - **Deadline**: a fixed per-call timeout (8s by default). When it elapses the
//!   in-flight request is dropped and the call fails with `Timeout`.
//! - **Status**: any non-2xx fails with `Upstream { status }`.
//! - **Retries**: none. One attempt per call; retry policy belongs to callers.

pub mod endpoint;
pub mod types;

pub use endpoint::Endpoint;
pub use types::{CategoriesEnvelope, Category, Meal, MealsEnvelope};

use async_trait::async_trait;
use radar_core::{AppConfig, Error};
use reqwest::header;
use serde_json::Value;
use std::time::{Duration, Instant};
use url::Url;

use crate::fetch::transport_error;

/// Default upstream base URL.
const DEFAULT_BASE_URL: &str = "https://www.themealdb.com/api/json/v1";

/// Default upstream deadline.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);

/// Upstream client configuration.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Base URL (default: https://www.themealdb.com/api/json/v1).
    pub base_url: String,
    /// API key path segment (default: "1").
    pub api_key: String,
    /// Per-call deadline (default: 8s).
    pub timeout: Duration,
    /// User-agent string.
    pub user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: "1".to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: "recipe-radar/0.1".to_string(),
        }
    }
}

impl From<&AppConfig> for UpstreamConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            base_url: config.upstream_base_url.clone(),
            api_key: config.upstream_api_key.clone(),
            timeout: config.upstream_timeout(),
            user_agent: config.user_agent.clone(),
        }
    }
}

/// Source of upstream JSON payloads.
///
/// The proxy routes and the category cache depend on this rather than on
/// `MealDbClient`, so tests can count and script upstream calls.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Fetch one endpoint and return its JSON payload.
    async fn fetch(&self, endpoint: &Endpoint) -> Result<Value, Error>;
}

/// reqwest-backed client for the recipe API.
#[derive(Debug, Clone)]
pub struct MealDbClient {
    http: reqwest::Client,
    config: UpstreamConfig,
}

impl MealDbClient {
    /// Create a new client with the given configuration.
    pub fn new(config: UpstreamConfig) -> Result<Self, Error> {
        Url::parse(&config.base_url).map_err(|e| Error::InvalidUrl(format!("{}: {e}", config.base_url)))?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Absolute URL for an endpoint.
    pub fn endpoint_url(&self, endpoint: &Endpoint) -> Result<Url, Error> {
        let raw = format!("{}/{}/{}", self.config.base_url.trim_end_matches('/'), self.config.api_key, endpoint.path());
        let mut url = Url::parse(&raw).map_err(|e| Error::InvalidUrl(format!("{raw}: {e}")))?;

        let query = endpoint.query();
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        Ok(url)
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }
}

#[async_trait]
impl Upstream for MealDbClient {
    async fn fetch(&self, endpoint: &Endpoint) -> Result<Value, Error> {
        let url = self.endpoint_url(endpoint)?;
        let start = Instant::now();

        tracing::debug!(endpoint = endpoint.path(), "calling upstream");

        let response = self
            .http
            .get(url)
            .header(header::ACCEPT, "application/json")
            .header(header::USER_AGENT, &self.config.user_agent)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(endpoint = endpoint.path(), status = status.as_u16(), "upstream error");
            return Err(Error::Upstream { status: status.as_u16() });
        }

        let bytes = response.bytes().await.map_err(transport_error)?;
        let payload: Value = serde_json::from_slice(&bytes)?;

        tracing::debug!(
            endpoint = endpoint.path(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            bytes = bytes.len(),
            "upstream call completed"
        );

        Ok(payload)
    }
}
