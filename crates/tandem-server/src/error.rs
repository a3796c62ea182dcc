//! Error types for the tandem server.

use std::path::PathBuf;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// IO error.
    #[error("IO error at {path}: {message}")]
    Io { path: PathBuf, message: String },

    /// Pipeline error.
    #[error(transparent)]
    Core(#[from] tandem_core::Error),

    /// Listen address could not be parsed.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

impl ServerError {
    /// HTTP status reported for this error.
    pub fn status(&self) -> StatusCode {
        use tandem_core::Error as Core;

        match self {
            Self::Core(Core::RunInProgress) => StatusCode::CONFLICT,
            Self::Core(Core::Ingest(_)) => StatusCode::BAD_REQUEST,
            Self::Core(Core::Compile { .. } | Core::Transpile { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Core(Core::Fetch { .. }) => StatusCode::BAD_GATEWAY,
            Self::Core(Core::Toolchain(_)) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let diagnostics = match &self {
            Self::Core(err) => vec![err.to_diagnostic()],
            _ => Vec::new(),
        };
        let body = json!({
            "success": false,
            "error": self.to_string(),
            "diagnostics": diagnostics,
        });
        (status, Json(body)).into_response()
    }
}

impl From<std::io::Error> for ServerError {
    fn from(e: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::new(),
            message: e.to_string(),
        }
    }
}

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
