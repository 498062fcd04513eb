//! The two caching strategies.
//!
//! Both operate on one partition of the current generation. Cache reads that
//! fail are logged and treated as misses; cache writes that fail are logged
//! and dropped. Neither ever fails the request.

use std::sync::Arc;

use radar_core::{Error, RadarDb, RequestIdentity, StoredResponse};

use super::Network;
use super::request::InterceptedRequest;

/// Where a resolved response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Network,
    Cache,
    /// The partition's static offline substitute.
    OfflineSubstitute,
    /// Unclassified request, forwarded without touching the cache.
    Passthrough,
}

/// Outcome of an intercepted request.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub response: StoredResponse,
    pub source: ResponseSource,
}

impl Resolution {
    pub fn new(response: StoredResponse, source: ResponseSource) -> Self {
        Self { response, source }
    }
}

/// A stored entry that stands in for any request of a partition when both
/// the network and the request's own entry are unavailable.
#[derive(Debug, Clone)]
pub struct Substitute {
    pub partition: String,
    pub identity: RequestIdentity,
}

pub(crate) async fn lookup(db: &RadarDb, partition: &str, identity: &RequestIdentity) -> Option<StoredResponse> {
    match db.match_entry(partition, identity).await {
        Ok(entry) => entry,
        Err(e) => {
            tracing::warn!(partition, url = %identity.url, error = %e, "Cache read failed, treating as miss");
            None
        }
    }
}

/// Store a copy of a successful response. Non-2xx responses are skipped.
pub(crate) async fn store(db: &RadarDb, partition: &str, identity: &RequestIdentity, response: &StoredResponse) {
    if !response.is_success() {
        tracing::debug!(partition, url = %identity.url, status = response.status, "Not caching error status");
        return;
    }

    match db.put_entry(partition, identity, response).await {
        Ok(()) => {}
        Err(Error::RetiredGeneration { .. }) => {
            tracing::debug!(partition, url = %identity.url, "Generation retired, dropping cache write");
        }
        Err(e) => tracing::warn!(partition, url = %identity.url, error = %e, "Cache write failed"),
    }
}

/// Serve the cached entry at once and refresh it in the background.
///
/// On a miss the network is awaited; a failure there propagates as-is since
/// this strategy has no second tier.
pub(crate) async fn stale_while_revalidate(
    db: &RadarDb, network: &Arc<dyn Network>, partition: &str, request: &InterceptedRequest,
) -> Result<Resolution, Error> {
    let identity = request.identity();

    if let Some(cached) = lookup(db, partition, &identity).await {
        tracing::debug!(partition, url = %request.url, "Cache hit, revalidating in background");
        tokio::spawn(revalidate(db.clone(), Arc::clone(network), partition.to_string(), request.clone()));
        return Ok(Resolution::new(cached, ResponseSource::Cache));
    }

    let response = network.fetch(request).await?;
    store(db, partition, &identity, &response).await;
    Ok(Resolution::new(response, ResponseSource::Network))
}

async fn revalidate(db: RadarDb, network: Arc<dyn Network>, partition: String, request: InterceptedRequest) {
    match network.fetch(&request).await {
        Ok(response) => store(&db, &partition, &request.identity(), &response).await,
        Err(e) => tracing::warn!(partition = %partition, url = %request.url, error = %e, "Revalidation dropped"),
    }
}

/// Prefer the network; on a network failure fall back to the cached entry,
/// then to the substitute, then give up with the original error.
///
/// HTTP error statuses are responses, not failures, and are returned as-is.
pub(crate) async fn network_first(
    db: &RadarDb, network: &Arc<dyn Network>, partition: &str, request: &InterceptedRequest,
    substitute: Option<&Substitute>,
) -> Result<Resolution, Error> {
    let identity = request.identity();

    let err = match network.fetch(request).await {
        Ok(response) => {
            store(db, partition, &identity, &response).await;
            return Ok(Resolution::new(response, ResponseSource::Network));
        }
        Err(e) if e.is_network_failure() => e,
        Err(e) => return Err(e),
    };

    if let Some(cached) = lookup(db, partition, &identity).await {
        tracing::info!(partition, url = %request.url, error = %err, "Network failed, serving cached entry");
        return Ok(Resolution::new(cached, ResponseSource::Cache));
    }

    if let Some(sub) = substitute
        && let Some(fallback) = lookup(db, &sub.partition, &sub.identity).await
    {
        tracing::info!(partition, url = %request.url, error = %err, "Network failed, serving offline substitute");
        return Ok(Resolution::new(fallback, ResponseSource::OfflineSubstitute));
    }

    tracing::info!(partition, url = %request.url, error = %err, "Network failed with no fallback");
    Err(err)
}
