//! Cache lifecycle: install, then activate.
//!
//! `CacheLifecycle::install` pre-populates the `pages` partition of the new
//! generation with the static shell. `Installed::activate` prunes every other
//! generation and hands back the engine. There is no other way to get an
//! `OfflineEngine`, so interception cannot start on a half-installed shell.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::try_join_all;
use radar_core::{AppConfig, Error, PartitionName, RadarDb, RequestIdentity, StoredResponse};
use url::Url;

use super::Network;
use crate::fetch::{parse_absolute, resolve};
use super::classify::{Classifier, RequestClass};
use super::engine::OfflineEngine;
use super::request::InterceptedRequest;
use super::strategy::Substitute;

/// The static shell cached at install time.
#[derive(Debug, Clone)]
pub struct ShellManifest {
    origin: Url,
    assets: Vec<String>,
    offline_page: String,
}

impl ShellManifest {
    pub fn new(origin: Url, assets: Vec<String>, offline_page: impl Into<String>) -> Self {
        Self { origin, assets, offline_page: offline_page.into() }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let origin = parse_absolute(&config.app_origin)?;
        Ok(Self::new(origin, config.shell_assets.clone(), config.offline_page.clone()))
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Absolute URLs of every shell asset. The offline page is always
    /// included, even when the asset list omits it.
    pub fn asset_urls(&self) -> Result<Vec<Url>, Error> {
        let mut urls = Vec::with_capacity(self.assets.len() + 1);
        for path in &self.assets {
            urls.push(self.join(path)?);
        }

        let offline = self.offline_page_url()?;
        if !urls.contains(&offline) {
            urls.push(offline);
        }
        Ok(urls)
    }

    pub fn offline_page_url(&self) -> Result<Url, Error> {
        self.join(&self.offline_page)
    }

    fn join(&self, path: &str) -> Result<Url, Error> {
        Ok(resolve(&self.origin, path)?)
    }
}

/// A generation that has not been installed yet.
pub struct CacheLifecycle {
    db: RadarDb,
    network: Arc<dyn Network>,
    manifest: ShellManifest,
    tag: String,
}

/// A generation whose shell is fully cached but which is not yet serving.
pub struct Installed {
    db: RadarDb,
    network: Arc<dyn Network>,
    manifest: ShellManifest,
    tag: String,
}

impl CacheLifecycle {
    pub fn new(db: RadarDb, network: Arc<dyn Network>, manifest: ShellManifest, tag: impl Into<String>) -> Self {
        Self { db, network, manifest, tag: tag.into() }
    }

    /// Build from the shell settings and `cache_version` in `config`.
    pub fn from_config(db: RadarDb, network: Arc<dyn Network>, config: &AppConfig) -> Result<Self, Error> {
        let manifest = ShellManifest::from_config(config)?;
        Ok(Self::new(db, network, manifest, config.cache_version.clone()))
    }

    /// Fetch the whole shell, then write it into `pages-<tag>` in one
    /// transaction.
    ///
    /// Nothing is written unless every asset came back 2xx. Any transport
    /// error, error status or storage failure is `InstallFailed`.
    pub async fn install(self) -> Result<Installed, Error> {
        let partition = PartitionName::new(RequestClass::Navigation.partition(), self.tag.as_str()).to_string();
        let urls = self.manifest.asset_urls()?;
        tracing::info!(partition = %partition, assets = urls.len(), "Installing static shell");

        let network = &self.network;
        let entries = try_join_all(urls.into_iter().map(|url| async move {
            let request = InterceptedRequest::get(url);
            let response = network
                .fetch(&request)
                .await
                .map_err(|e| Error::InstallFailed(format!("{}: {e}", request.url)))?;
            if !response.is_success() {
                return Err(Error::InstallFailed(format!("{}: status {}", request.url, response.status)));
            }
            Ok::<(RequestIdentity, StoredResponse), Error>((request.identity(), response))
        }))
        .await?;

        let written = self
            .db
            .put_entries(&partition, &entries)
            .await
            .map_err(|e| Error::InstallFailed(e.to_string()))?;
        tracing::info!(partition = %partition, written, "Static shell installed");

        Ok(Installed { db: self.db, network: self.network, manifest: self.manifest, tag: self.tag })
    }
}

impl Installed {
    pub fn generation(&self) -> &str {
        &self.tag
    }

    /// Delete every partition outside this generation and start intercepting.
    ///
    /// Requests resolved while the prune runs may still be reading an old
    /// generation; once it commits they see the new one, with misses for
    /// everything but the shell. Engines of older generations keep working
    /// but their cache writes are dropped.
    pub async fn activate(self) -> Result<OfflineEngine, Error> {
        let deleted = self.db.retain_generation(&self.tag).await?;
        if !deleted.is_empty() {
            tracing::info!(generation = %self.tag, ?deleted, "Pruned stale cache partitions");
        }

        let pages = PartitionName::new(RequestClass::Navigation.partition(), self.tag.as_str()).to_string();
        let offline = self.manifest.offline_page_url()?;
        let mut substitutes = HashMap::new();
        substitutes.insert(
            RequestClass::Navigation,
            Substitute { partition: pages, identity: RequestIdentity::get(offline.as_str()) },
        );

        let classifier = Classifier::new(self.manifest.origin().clone());
        Ok(OfflineEngine::new(classifier, self.tag, self.db, self.network, substitutes))
    }
}
