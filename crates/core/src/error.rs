//! Unified error types for recipe-radar.
//!
//! Cache and store misses are not errors: lookups return `Option`. The
//! variants here cover the failures that callers must react to.

use tokio_rusqlite::rusqlite;

/// Unified error type shared by the store, the upstream client and the
/// offline interceptor.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., an empty recipe id).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// URL could not be parsed or uses an unsupported scheme.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Upstream did not answer before the deadline; the request was aborted.
    #[error("TIMEOUT: {0}")]
    Timeout(String),

    /// Upstream answered with a non-2xx status.
    #[error("UPSTREAM_ERROR: status {status}")]
    Upstream { status: u16 },

    /// Transport-level failure with no HTTP status.
    #[error("NETWORK_ERROR: {0}")]
    Network(String),

    /// Upstream payload was not the JSON we expected.
    #[error("PARSE_ERROR: {0}")]
    Parse(String),

    /// Route or resource does not exist.
    #[error("NOT_FOUND: {0}")]
    NotFound(String),

    /// Durable store unavailable or a statement failed.
    #[error("STORAGE_ERROR: {0}")]
    Storage(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("STORAGE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Static shell pre-population failed; the generation cannot go live.
    #[error("INSTALL_FAILED: {0}")]
    InstallFailed(String),

    /// Write aimed at a partition outside the active generation.
    #[error("RETIRED_GENERATION: {partition}")]
    RetiredGeneration { partition: String },
}

impl Error {
    /// True when no HTTP response was obtained at all.
    ///
    /// Network-first fallback only applies to these; an HTTP error status is
    /// still a response and is returned as-is.
    pub fn is_network_failure(&self) -> bool {
        matches!(self, Error::Timeout(_) | Error::Network(_))
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Storage(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Storage(tokio_rusqlite::Error::Close(c)),
            _ => Error::Storage(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Storage(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Storage(tokio_rusqlite::Error::Error(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parse(err.to_string())
    }
}
