//! Scripted `Network` for engine and lifecycle tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use radar_core::{Error, StoredResponse};
use tokio::sync::Semaphore;

use super::Network;
use super::request::InterceptedRequest;

/// Routes keyed by absolute URL. Unknown URLs answer 404.
///
/// `go_offline` makes every fetch fail with `Error::Network`. `hold` parks
/// fetches until `release` hands out a permit, which lets tests observe what
/// happens before a request resolves.
pub(crate) struct MockNetwork {
    routes: Mutex<HashMap<String, StoredResponse>>,
    online: AtomicBool,
    gated: AtomicBool,
    gate: Semaphore,
    calls: AtomicUsize,
}

impl MockNetwork {
    pub(crate) fn new() -> Self {
        Self {
            routes: Mutex::new(HashMap::new()),
            online: AtomicBool::new(true),
            gated: AtomicBool::new(false),
            gate: Semaphore::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn route(&self, url: &str, response: StoredResponse) {
        self.routes.lock().unwrap().insert(url.to_string(), response);
    }

    pub(crate) fn go_offline(&self) {
        self.online.store(false, Ordering::SeqCst);
    }

    pub(crate) fn go_online(&self) {
        self.online.store(true, Ordering::SeqCst);
    }

    pub(crate) fn hold(&self) {
        self.gated.store(true, Ordering::SeqCst);
    }

    /// Let `n` held fetches through.
    pub(crate) fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Network for MockNetwork {
    async fn fetch(&self, request: &InterceptedRequest) -> Result<StoredResponse, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.gated.load(Ordering::SeqCst) {
            let permit = self.gate.acquire().await.map_err(|e| Error::Network(e.to_string()))?;
            permit.forget();
        }

        if !self.online.load(Ordering::SeqCst) {
            return Err(Error::Network(format!("offline: {}", request.url)));
        }

        let routes = self.routes.lock().unwrap();
        Ok(routes
            .get(request.url.as_str())
            .cloned()
            .unwrap_or_else(|| StoredResponse::new(404, "not found")))
    }
}
