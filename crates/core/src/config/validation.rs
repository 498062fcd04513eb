//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use std::net::SocketAddr;

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

fn check_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(value).map_err(|e| invalid(field, e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(invalid(field, format!("unsupported scheme: {scheme}"))),
    }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `upstream_timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `category_ttl_secs` is 0 or exceeds one day
    /// - `user_agent` is empty
    /// - `upstream_base_url` or `app_origin` is not an http(s) URL
    /// - `cache_version` is empty or contains characters other than ASCII alphanumerics, `.` and `_`
    /// - `offline_page` is not listed in `shell_assets`
    /// - `bind_addr` is not a socket address
    ///
    /// Returns `ConfigError::Missing` if `shell_assets` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upstream_timeout_ms < 100 {
            return Err(invalid("upstream_timeout_ms", "must be at least 100ms"));
        }
        if self.upstream_timeout_ms > 300_000 {
            return Err(invalid("upstream_timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.category_ttl_secs == 0 {
            return Err(invalid("category_ttl_secs", "must be greater than 0"));
        }
        if self.category_ttl_secs > 86_400 {
            return Err(invalid("category_ttl_secs", "must not exceed one day (86400s)"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        check_http_url("upstream_base_url", &self.upstream_base_url)?;
        check_http_url("app_origin", &self.app_origin)?;

        // Partition names split on the last '-', so the tag itself cannot contain one.
        if self.cache_version.is_empty()
            || !self.cache_version.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
        {
            return Err(invalid("cache_version", "must be non-empty ASCII alphanumerics, '.' or '_'"));
        }

        if self.shell_assets.is_empty() {
            return Err(ConfigError::Missing {
                field: "shell_assets".into(),
                hint: "List the static shell paths, e.g. RECIPE_RADAR_SHELL_ASSETS='[\"/\", \"/offline.html\"]'"
                    .into(),
            });
        }
        if !self.shell_assets.contains(&self.offline_page) {
            return Err(invalid("offline_page", "must be one of shell_assets"));
        }

        self.bind_addr
            .parse::<SocketAddr>()
            .map_err(|e| invalid("bind_addr", e.to_string()))?;

        if self.upstream_api_key.is_empty() {
            tracing::warn!("upstream_api_key is empty; upstream URLs will contain an empty path segment");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_invalid(config: AppConfig, expected: &str) {
        let result = config.validate();
        assert!(
            matches!(&result, Err(ConfigError::Invalid { field, .. }) if field == expected),
            "expected invalid {expected}, got {result:?}"
        );
    }

    #[test]
    fn test_validate_default_config() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_timeout_bounds() {
        assert_invalid(AppConfig { upstream_timeout_ms: 50, ..Default::default() }, "upstream_timeout_ms");
        assert_invalid(AppConfig { upstream_timeout_ms: 301_000, ..Default::default() }, "upstream_timeout_ms");
        assert!(AppConfig { upstream_timeout_ms: 100, ..Default::default() }.validate().is_ok());
    }

    #[test]
    fn test_validate_ttl_bounds() {
        assert_invalid(AppConfig { category_ttl_secs: 0, ..Default::default() }, "category_ttl_secs");
        assert_invalid(AppConfig { category_ttl_secs: 86_401, ..Default::default() }, "category_ttl_secs");
    }

    #[test]
    fn test_validate_empty_user_agent() {
        assert_invalid(AppConfig { user_agent: String::new(), ..Default::default() }, "user_agent");
    }

    #[test]
    fn test_validate_urls() {
        assert_invalid(AppConfig { upstream_base_url: "not a url".into(), ..Default::default() }, "upstream_base_url");
        assert_invalid(AppConfig { app_origin: "file:///tmp".into(), ..Default::default() }, "app_origin");
    }

    #[test]
    fn test_validate_cache_version_rejects_dash() {
        assert_invalid(AppConfig { cache_version: "v1-beta".into(), ..Default::default() }, "cache_version");
        assert_invalid(AppConfig { cache_version: String::new(), ..Default::default() }, "cache_version");
        assert!(AppConfig { cache_version: "v2.1_rc".into(), ..Default::default() }.validate().is_ok());
    }

    #[test]
    fn test_validate_shell_assets() {
        let result = AppConfig { shell_assets: Vec::new(), ..Default::default() }.validate();
        assert!(matches!(result, Err(ConfigError::Missing { .. })));

        assert_invalid(AppConfig { offline_page: "/elsewhere.html".into(), ..Default::default() }, "offline_page");
    }

    #[test]
    fn test_validate_bind_addr() {
        assert_invalid(AppConfig { bind_addr: "localhost".into(), ..Default::default() }, "bind_addr");
    }
}
