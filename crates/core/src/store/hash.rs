//! Request identity and its content-addressed cache key.

use sha2::{Digest, Sha256};

/// Identity of a cacheable request: method plus absolute URL.
///
/// Two requests with the same identity share one cache entry per partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestIdentity {
    pub method: String,
    pub url: String,
}

impl RequestIdentity {
    /// Build an identity; the method is upper-cased.
    pub fn new(method: &str, url: &str) -> Self {
        Self { method: method.to_ascii_uppercase(), url: url.to_string() }
    }

    /// Shorthand for a GET identity.
    pub fn get(url: &str) -> Self {
        Self::new("GET", url)
    }

    /// SHA-256 hex key used as the entry's primary key within a partition.
    pub fn key(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.method.as_bytes());
        hasher.update(b"\n");
        hasher.update(self.url.as_bytes());
        hex::encode(hasher.finalize())
    }
}
