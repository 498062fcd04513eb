//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use radar_client::Upstream;

use crate::categories::CategoryCache;

/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    upstream: Arc<dyn Upstream>,
    categories: CategoryCache,
}

impl AppState {
    pub fn new(upstream: Arc<dyn Upstream>, category_ttl: Duration) -> Self {
        Self { inner: Arc::new(AppStateInner { upstream, categories: CategoryCache::new(category_ttl) }) }
    }

    pub fn upstream(&self) -> &dyn Upstream {
        self.inner.upstream.as_ref()
    }

    pub fn categories(&self) -> &CategoryCache {
        &self.inner.categories
    }
}
