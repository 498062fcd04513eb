//! HTTP error mapping for the proxy.
//!
//! Handlers return `Result<_, AppError>`. Upstream details are logged; the
//! client only ever sees `{ "error": <message> }`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use radar_core::Error;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Failure from the upstream client or a store.
    #[error(transparent)]
    Core(#[from] Error),

    /// Bad request from client.
    #[error("{0}")]
    BadRequest(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Core(err) => match err {
                Error::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                Error::Upstream { .. } | Error::Network(_) | Error::Parse(_) => StatusCode::BAD_GATEWAY,
                Error::InvalidInput(_) | Error::InvalidUrl(_) => StatusCode::BAD_REQUEST,
                Error::NotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::BadRequest(msg) => msg.clone(),
            Self::Core(err) => match err {
                Error::Timeout(_) => "Upstream timed out".to_string(),
                Error::Upstream { .. } | Error::Network(_) | Error::Parse(_) => "Upstream error".to_string(),
                Error::InvalidInput(msg) => msg.clone(),
                Error::InvalidUrl(_) => "Invalid request".to_string(),
                Error::NotFound(_) => "Not found".to_string(),
                _ => "Server error".to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request error");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}
