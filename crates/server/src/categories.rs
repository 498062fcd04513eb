//! In-process TTL cache for the category listing.

use std::time::Duration;

use radar_client::{Endpoint, Upstream};
use radar_core::Error;
use serde_json::Value;
use tokio::sync::RwLock;
use tokio::time::Instant;

struct Slot {
    payload: Value,
    expires_at: Instant,
}

/// Single-slot cache in front of the upstream categories endpoint.
///
/// The slot is served strictly until its expiry and never after, even when a
/// refresh fails. Concurrent refreshes past expiry may each call upstream;
/// the last one to finish wins the slot.
pub struct CategoryCache {
    ttl: Duration,
    slot: RwLock<Option<Slot>>,
}

impl CategoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, slot: RwLock::new(None) }
    }

    pub async fn get(&self, upstream: &dyn Upstream) -> Result<Value, Error> {
        {
            let slot = self.slot.read().await;
            if let Some(slot) = slot.as_ref()
                && Instant::now() < slot.expires_at
            {
                tracing::debug!("Category cache hit");
                return Ok(slot.payload.clone());
            }
        }

        tracing::debug!("Category cache miss, refreshing");
        let payload = upstream.fetch(&Endpoint::Categories).await?;
        let expires_at = Instant::now() + self.ttl;
        *self.slot.write().await = Some(Slot { payload: payload.clone(), expires_at });
        Ok(payload)
    }
}
