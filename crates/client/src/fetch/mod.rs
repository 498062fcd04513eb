//! HTTP fetch client backing the offline interceptor.
//!
//! Each call is a single attempt: no retries, a hard timeout, and a bounded
//! number of redirects. Any HTTP status is a response; only transport
//! failures and timeouts are errors.

pub mod url;

use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};

pub use self::url::{UrlError, parse_absolute, resolve};

use radar_core::{AppConfig, Error, StoredResponse};

use crate::offline::{InterceptedRequest, Network};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "recipe-radar/0.1")
    pub user_agent: String,

    /// Request timeout (default: 8s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { user_agent: "recipe-radar/0.1".to_string(), timeout: Duration::from_secs(8), max_redirects: 5 }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self { user_agent: config.user_agent.clone(), timeout: config.upstream_timeout(), ..Default::default() }
    }
}

/// Map a reqwest failure onto the core taxonomy.
pub(crate) fn transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() { Error::Timeout(err.to_string()) } else { Error::Network(err.to_string()) }
}

/// Single-shot HTTP client used as the interceptor's network.
#[derive(Debug, Clone)]
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

#[async_trait]
impl Network for FetchClient {
    async fn fetch(&self, request: &InterceptedRequest) -> Result<StoredResponse, Error> {
        let start = Instant::now();

        let response = self
            .http
            .request(request.method.clone(), request.url.clone())
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.to_string(), v.to_string())))
            .collect();

        let body = response.bytes().await.map_err(transport_error)?;

        tracing::debug!(
            url = %request.url,
            status,
            bytes = body.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "fetched"
        );

        Ok(StoredResponse { status, headers, body: body.to_vec() })
    }
}
