//! Client code for recipe-radar.
//!
//! This crate provides the upstream recipe API client, the generic fetch
//! client used as the interceptor's network, and the offline caching layer
//! (request classification, caching strategies, cache lifecycle).

pub mod fetch;
pub mod offline;
pub mod upstream;

pub use fetch::{FetchClient, FetchConfig};
pub use offline::{
    CacheLifecycle, Classifier, InterceptedRequest, Installed, Network, OfflineEngine, RequestClass, Resolution,
    ResponseSource, ShellManifest, Strategy,
};
pub use upstream::{Endpoint, MealDbClient, Upstream, UpstreamConfig};
