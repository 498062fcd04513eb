//! URL resolution for request identities.
//!
//! Cache entries are keyed by absolute URL, so every path the interceptor or
//! the lifecycle handles goes through `resolve` first.

/// Error type for URL resolution failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<UrlError> for radar_core::Error {
    fn from(err: UrlError) -> Self {
        radar_core::Error::InvalidUrl(err.to_string())
    }
}

/// Resolve `input` against `base` into an absolute, canonical URL.
///
/// - Relative paths (`/offline.html`) join onto `base`; absolute URLs replace it
/// - Only http and https are accepted
/// - Host is lowercased and the fragment removed; the query is kept as-is
pub fn resolve(base: &url::Url, input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut resolved = base.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match resolved.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if let Some(host) = resolved.host_str().map(str::to_lowercase) {
        resolved
            .set_host(Some(&host))
            .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    }

    resolved.set_fragment(None);

    Ok(resolved)
}

/// Parse an absolute URL with the same canonicalisation as `resolve`.
pub fn parse_absolute(input: &str) -> Result<url::Url, UrlError> {
    let base = url::Url::parse(input.trim()).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    resolve(&base, input)
}
