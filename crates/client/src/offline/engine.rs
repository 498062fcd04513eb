//! The request interceptor.

use std::collections::HashMap;
use std::sync::Arc;

use radar_core::{Error, PartitionName, RadarDb};

use super::Network;
use super::classify::{Classifier, RequestClass, Strategy};
use super::request::InterceptedRequest;
use super::strategy::{self, Resolution, ResponseSource, Substitute};

/// Intercepts outbound requests and resolves them through the cache.
///
/// Obtained from `Installed::activate`. Cloning is cheap; clones share the
/// store and the network.
#[derive(Clone)]
pub struct OfflineEngine {
    classifier: Classifier,
    generation: String,
    db: RadarDb,
    network: Arc<dyn Network>,
    substitutes: Arc<HashMap<RequestClass, Substitute>>,
}

impl std::fmt::Debug for OfflineEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfflineEngine")
            .field("origin", &self.classifier.origin().as_str())
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl OfflineEngine {
    pub(crate) fn new(
        classifier: Classifier, generation: String, db: RadarDb, network: Arc<dyn Network>,
        substitutes: HashMap<RequestClass, Substitute>,
    ) -> Self {
        Self { classifier, generation, db, network, substitutes: Arc::new(substitutes) }
    }

    /// Current generation tag.
    pub fn generation(&self) -> &str {
        &self.generation
    }

    pub fn classify(&self, request: &InterceptedRequest) -> Option<RequestClass> {
        self.classifier.classify(request)
    }

    /// Full partition name for `class` in the current generation.
    pub fn partition_for(&self, class: RequestClass) -> String {
        PartitionName::new(class.partition(), self.generation.as_str()).to_string()
    }

    /// Resolve one intercepted request.
    ///
    /// Unclassified requests go straight to the network. Classified ones run
    /// their strategy against the class partition.
    pub async fn handle(&self, request: &InterceptedRequest) -> Result<Resolution, Error> {
        let Some(class) = self.classify(request) else {
            tracing::trace!(method = %request.method, url = %request.url, "Passthrough");
            let response = self.network.fetch(request).await?;
            return Ok(Resolution::new(response, ResponseSource::Passthrough));
        };

        let partition = self.partition_for(class);
        tracing::debug!(?class, partition = %partition, url = %request.url, "Intercepted");

        match class.strategy() {
            Strategy::StaleWhileRevalidate => {
                strategy::stale_while_revalidate(&self.db, &self.network, &partition, request).await
            }
            Strategy::NetworkFirst => {
                let substitute = self.substitutes.get(&class);
                strategy::network_first(&self.db, &self.network, &partition, request, substitute).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offline::lifecycle::{CacheLifecycle, ShellManifest};
    use crate::offline::mock::MockNetwork;
    use radar_core::{RequestIdentity, StoredResponse};
    use std::time::Duration;
    use url::Url;

    const ORIGIN: &str = "http://localhost:5174";

    fn url(path: &str) -> Url {
        Url::parse(ORIGIN).unwrap().join(path).unwrap()
    }

    fn json(body: &str) -> StoredResponse {
        StoredResponse::new(200, body).with_header("content-type", "application/json")
    }

    fn manifest() -> ShellManifest {
        ShellManifest::new(
            Url::parse(ORIGIN).unwrap(),
            vec!["/".into(), "/offline.html".into(), "/manifest.webmanifest".into()],
            "/offline.html",
        )
    }

    fn network_with_shell() -> Arc<MockNetwork> {
        let network = Arc::new(MockNetwork::new());
        network.route(&url("/").to_string(), StoredResponse::new(200, "<html>app</html>"));
        network.route(&url("/offline.html").to_string(), StoredResponse::new(200, "<html>offline</html>"));
        network.route(&url("/manifest.webmanifest").to_string(), StoredResponse::new(200, "{}"));
        network
    }

    async fn engine(db: &RadarDb, network: &Arc<MockNetwork>) -> OfflineEngine {
        let network: Arc<dyn Network> = network.clone();
        CacheLifecycle::new(db.clone(), network, manifest(), "v1")
            .install()
            .await
            .unwrap()
            .activate()
            .await
            .unwrap()
    }

    async fn wait_for_body(db: &RadarDb, partition: &str, identity: &RequestIdentity, body: &[u8]) {
        for _ in 0..100 {
            if let Some(entry) = db.match_entry(partition, identity).await.unwrap()
                && entry.body == body
            {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("entry in {partition} never became {:?}", String::from_utf8_lossy(body));
    }

    #[tokio::test]
    async fn test_swr_miss_fetches_and_caches() {
        let db = RadarDb::open_in_memory().await.unwrap();
        let network = network_with_shell();
        let engine = engine(&db, &network).await;

        let request = InterceptedRequest::get(url("/api/categories"));
        network.route(request.url.as_str(), json(r#"{"categories":[]}"#));

        let resolved = engine.handle(&request).await.unwrap();
        assert_eq!(resolved.source, ResponseSource::Network);

        let cached = db.match_entry("api-categories-v1", &request.identity()).await.unwrap();
        assert_eq!(cached.unwrap().body, br#"{"categories":[]}"#);
    }

    #[tokio::test]
    async fn test_swr_hit_returns_before_revalidation() {
        let db = RadarDb::open_in_memory().await.unwrap();
        let network = network_with_shell();
        let engine = engine(&db, &network).await;

        let request = InterceptedRequest::get(url("/api/categories"));
        network.route(request.url.as_str(), json("old"));
        engine.handle(&request).await.unwrap();

        network.route(request.url.as_str(), json("new"));
        network.hold();

        // The revalidation fetch is parked on the gate, so a response here
        // can only have come from the cache.
        let resolved = tokio::time::timeout(Duration::from_secs(1), engine.handle(&request))
            .await
            .expect("cache hit must not wait on the network")
            .unwrap();
        assert_eq!(resolved.source, ResponseSource::Cache);
        assert_eq!(resolved.response.body, b"old");

        network.release(1);
        wait_for_body(&db, "api-categories-v1", &request.identity(), b"new").await;
    }

    #[tokio::test]
    async fn test_swr_failed_revalidation_keeps_entry() {
        let db = RadarDb::open_in_memory().await.unwrap();
        let network = network_with_shell();
        let engine = engine(&db, &network).await;

        let thumb = InterceptedRequest::image(Url::parse("https://www.themealdb.com/images/media/meals/a.jpg").unwrap());
        network.route(thumb.url.as_str(), StoredResponse::new(200, "jpeg").with_header("content-type", "image/jpeg"));
        engine.handle(&thumb).await.unwrap();

        network.go_offline();
        let calls_before = network.calls();
        let resolved = engine.handle(&thumb).await.unwrap();
        assert_eq!(resolved.source, ResponseSource::Cache);

        for _ in 0..100 {
            if network.calls() > calls_before {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;

        let cached = db.match_entry("images-v1", &thumb.identity()).await.unwrap();
        assert_eq!(cached.unwrap().body, b"jpeg");
    }

    #[tokio::test]
    async fn test_swr_miss_offline_is_an_error() {
        let db = RadarDb::open_in_memory().await.unwrap();
        let network = network_with_shell();
        let engine = engine(&db, &network).await;
        network.go_offline();

        let request = InterceptedRequest::get(url("/api/categories"));
        let err = engine.handle(&request).await.unwrap_err();
        assert!(err.is_network_failure());
    }

    #[tokio::test]
    async fn test_network_first_prefers_network() {
        let db = RadarDb::open_in_memory().await.unwrap();
        let network = network_with_shell();
        let engine = engine(&db, &network).await;

        let request = InterceptedRequest::get(url("/api/meal/52771"));
        network.route(request.url.as_str(), json("v1"));
        engine.handle(&request).await.unwrap();

        network.route(request.url.as_str(), json("v2"));
        let resolved = engine.handle(&request).await.unwrap();
        assert_eq!(resolved.source, ResponseSource::Network);
        assert_eq!(resolved.response.body, b"v2");

        let cached = db.match_entry("api-other-v1", &request.identity()).await.unwrap();
        assert_eq!(cached.unwrap().body, b"v2");
    }

    #[tokio::test]
    async fn test_network_first_falls_back_to_cache() {
        let db = RadarDb::open_in_memory().await.unwrap();
        let network = network_with_shell();
        let engine = engine(&db, &network).await;

        let page = InterceptedRequest::navigate(url("/recipes/52771"));
        network.route(page.url.as_str(), StoredResponse::new(200, "<html>recipe</html>"));
        engine.handle(&page).await.unwrap();

        network.go_offline();
        let resolved = engine.handle(&page).await.unwrap();
        assert_eq!(resolved.source, ResponseSource::Cache);
        assert_eq!(resolved.response.body, b"<html>recipe</html>");
    }

    #[tokio::test]
    async fn test_navigation_offline_uses_substitute() {
        let db = RadarDb::open_in_memory().await.unwrap();
        let network = network_with_shell();
        let engine = engine(&db, &network).await;
        network.go_offline();

        let page = InterceptedRequest::navigate(url("/favorites"));
        let resolved = engine.handle(&page).await.unwrap();
        assert_eq!(resolved.source, ResponseSource::OfflineSubstitute);
        assert_eq!(resolved.response.body, b"<html>offline</html>");
    }

    #[tokio::test]
    async fn test_api_offline_without_cache_has_no_substitute() {
        let db = RadarDb::open_in_memory().await.unwrap();
        let network = network_with_shell();
        let engine = engine(&db, &network).await;
        network.go_offline();

        let search = InterceptedRequest::get(url("/api/search?query=arrabiata"));
        let err = engine.handle(&search).await.unwrap_err();
        assert!(matches!(err, Error::Network(_)));

        let page = InterceptedRequest::navigate(url("/search?query=arrabiata"));
        let resolved = engine.handle(&page).await.unwrap();
        assert_eq!(resolved.source, ResponseSource::OfflineSubstitute);
    }

    #[tokio::test]
    async fn test_http_error_is_returned_not_cached() {
        let db = RadarDb::open_in_memory().await.unwrap();
        let network = network_with_shell();
        let engine = engine(&db, &network).await;

        let request = InterceptedRequest::get(url("/api/random"));
        network.route(request.url.as_str(), json("ok"));
        engine.handle(&request).await.unwrap();

        network.route(request.url.as_str(), StoredResponse::new(500, "boom"));
        let resolved = engine.handle(&request).await.unwrap();
        assert_eq!(resolved.source, ResponseSource::Network);
        assert_eq!(resolved.response.status, 500);

        let cached = db.match_entry("api-other-v1", &request.identity()).await.unwrap();
        assert_eq!(cached.unwrap().body, b"ok");
    }

    #[tokio::test]
    async fn test_passthrough_skips_cache() {
        let db = RadarDb::open_in_memory().await.unwrap();
        let network = network_with_shell();
        let engine = engine(&db, &network).await;

        let cross_origin = InterceptedRequest::get(Url::parse("https://example.com/api/x").unwrap());
        network.route(cross_origin.url.as_str(), json("remote"));
        let post = InterceptedRequest::get(url("/api/search")).with_method(reqwest::Method::POST);

        let resolved = engine.handle(&cross_origin).await.unwrap();
        assert_eq!(resolved.source, ResponseSource::Passthrough);
        let resolved = engine.handle(&post).await.unwrap();
        assert_eq!(resolved.source, ResponseSource::Passthrough);
        assert_eq!(resolved.response.status, 404);

        assert_eq!(db.partition_names().await.unwrap(), vec!["pages-v1".to_string()]);
    }

    #[tokio::test]
    async fn test_partition_for_uses_generation() {
        let db = RadarDb::open_in_memory().await.unwrap();
        let network = network_with_shell();
        let engine = engine(&db, &network).await;

        assert_eq!(engine.generation(), "v1");
        assert_eq!(engine.partition_for(RequestClass::CategoryListing), "api-categories-v1");
        assert_eq!(engine.partition_for(RequestClass::Navigation), "pages-v1");
    }
}
