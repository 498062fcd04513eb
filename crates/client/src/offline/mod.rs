//! Offline caching layer.
//!
//! Every outbound request passes through an `OfflineEngine`, which classifies
//! it and applies one of two strategies against a versioned partition:
//!
//! | Request class     | Strategy                      | Partition        |
//! |-------------------|-------------------------------|------------------|
//! | Navigation        | network-first, with fallback  | `pages`          |
//! | Image             | stale-while-revalidate        | `images`         |
//! | Category listing  | stale-while-revalidate        | `api-categories` |
//! | Other API call    | network-first, no fallback    | `api-other`      |
//!
//! Anything else passes straight through to the network.
//!
//! Engines are only obtainable through `CacheLifecycle::install` followed by
//! `Installed::activate`, so interception never starts before the static
//! shell is in place.

pub mod classify;
pub mod engine;
pub mod lifecycle;
pub mod request;
pub mod strategy;

#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;
use radar_core::{Error, StoredResponse};

pub use classify::{Classifier, RequestClass, Strategy};
pub use engine::OfflineEngine;
pub use lifecycle::{CacheLifecycle, Installed, ShellManifest};
pub use request::{Destination, InterceptedRequest, RequestMode};
pub use strategy::{Resolution, ResponseSource};

/// The network as seen by the interceptor.
///
/// Implementations make exactly one attempt. An HTTP error status is an
/// `Ok` response; `Err` means no response arrived (`Timeout`, `Network`).
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &InterceptedRequest) -> Result<StoredResponse, Error>;
}
