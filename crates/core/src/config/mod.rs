//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (RECIPE_RADAR_*)
//! 2. TOML config file (if RECIPE_RADAR_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (RECIPE_RADAR_*)
/// 2. TOML config file (if RECIPE_RADAR_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite database holding cache partitions and favorites.
    ///
    /// Set via RECIPE_RADAR_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Base URL of the upstream recipe API.
    ///
    /// Set via RECIPE_RADAR_UPSTREAM_BASE_URL environment variable.
    #[serde(default = "default_upstream_base_url")]
    pub upstream_base_url: String,

    /// API key path segment for the upstream recipe API.
    ///
    /// Set via RECIPE_RADAR_UPSTREAM_API_KEY environment variable.
    #[serde(default = "default_upstream_api_key")]
    pub upstream_api_key: String,

    /// Hard deadline for a single upstream call, in milliseconds.
    ///
    /// Set via RECIPE_RADAR_UPSTREAM_TIMEOUT_MS environment variable.
    #[serde(default = "default_upstream_timeout_ms")]
    pub upstream_timeout_ms: u64,

    /// Lifetime of the server-side category listing slot, in seconds.
    ///
    /// Set via RECIPE_RADAR_CATEGORY_TTL_SECS environment variable.
    #[serde(default = "default_category_ttl_secs")]
    pub category_ttl_secs: u64,

    /// User-Agent string for outbound requests.
    ///
    /// Set via RECIPE_RADAR_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Listen address of the proxy.
    ///
    /// Set via RECIPE_RADAR_BIND_ADDR environment variable.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Origin the interceptor treats as same-origin.
    ///
    /// Set via RECIPE_RADAR_APP_ORIGIN environment variable.
    #[serde(default = "default_app_origin")]
    pub app_origin: String,

    /// Generation tag embedded in every partition name.
    ///
    /// Set via RECIPE_RADAR_CACHE_VERSION environment variable.
    #[serde(default = "default_cache_version")]
    pub cache_version: String,

    /// Static shell paths pre-populated into the pages partition at install.
    ///
    /// Set via RECIPE_RADAR_SHELL_ASSETS (array syntax, e.g. `["/", "/offline.html"]`).
    #[serde(default = "default_shell_assets")]
    pub shell_assets: Vec<String>,

    /// Document served to navigations when both network and cache miss.
    ///
    /// Set via RECIPE_RADAR_OFFLINE_PAGE environment variable.
    #[serde(default = "default_offline_page")]
    pub offline_page: String,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./recipe-radar.sqlite")
}

fn default_upstream_base_url() -> String {
    "https://www.themealdb.com/api/json/v1".into()
}

fn default_upstream_api_key() -> String {
    "1".into()
}

fn default_upstream_timeout_ms() -> u64 {
    8_000
}

fn default_category_ttl_secs() -> u64 {
    3_600
}

fn default_user_agent() -> String {
    "recipe-radar/0.1".into()
}

fn default_bind_addr() -> String {
    "127.0.0.1:5174".into()
}

fn default_app_origin() -> String {
    "http://localhost:5174".into()
}

fn default_cache_version() -> String {
    "v1".into()
}

fn default_shell_assets() -> Vec<String> {
    ["/", "/index.html", "/offline.html", "/manifest.webmanifest", "/icons/icon-192.svg", "/icons/icon-512.svg"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_offline_page() -> String {
    "/offline.html".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            upstream_base_url: default_upstream_base_url(),
            upstream_api_key: default_upstream_api_key(),
            upstream_timeout_ms: default_upstream_timeout_ms(),
            category_ttl_secs: default_category_ttl_secs(),
            user_agent: default_user_agent(),
            bind_addr: default_bind_addr(),
            app_origin: default_app_origin(),
            cache_version: default_cache_version(),
            shell_assets: default_shell_assets(),
            offline_page: default_offline_page(),
        }
    }
}

impl AppConfig {
    /// Upstream deadline as Duration for use with reqwest/tokio.
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_millis(self.upstream_timeout_ms)
    }

    /// Category slot lifetime as Duration.
    pub fn category_ttl(&self) -> Duration {
        Duration::from_secs(self.category_ttl_secs)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `RECIPE_RADAR_`
    /// 2. TOML file from `RECIPE_RADAR_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("RECIPE_RADAR_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("RECIPE_RADAR_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
