//! Counting `Upstream` double for route and cache tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use radar_client::{Endpoint, Upstream};
use radar_core::Error;
use serde_json::Value;

/// Canned payloads keyed by endpoint path. Unknown paths and a set failure
/// status both answer `Error::Upstream`.
pub(crate) struct CountingUpstream {
    payloads: Mutex<HashMap<&'static str, Value>>,
    failure: Mutex<Option<u16>>,
    seen: Mutex<Vec<Endpoint>>,
    calls: AtomicUsize,
}

impl CountingUpstream {
    pub(crate) fn new() -> Self {
        Self {
            payloads: Mutex::new(HashMap::new()),
            failure: Mutex::new(None),
            seen: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Answer `path` with `payload` and clear any forced failure.
    pub(crate) fn respond(&self, path: &'static str, payload: Value) {
        self.payloads.lock().unwrap().insert(path, payload);
        *self.failure.lock().unwrap() = None;
    }

    pub(crate) fn fail_with_status(&self, status: u16) {
        *self.failure.lock().unwrap() = Some(status);
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_endpoint(&self) -> Option<Endpoint> {
        self.seen.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Upstream for CountingUpstream {
    async fn fetch(&self, endpoint: &Endpoint) -> Result<Value, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(endpoint.clone());

        if let Some(status) = *self.failure.lock().unwrap() {
            return Err(Error::Upstream { status });
        }

        self.payloads
            .lock()
            .unwrap()
            .get(endpoint.path())
            .cloned()
            .ok_or(Error::Upstream { status: 404 })
    }
}
