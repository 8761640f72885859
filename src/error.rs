//! Error types for copyrouter.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Result type alias for copyrouter operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for copyrouter.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A pinned provider failed; other providers are not consulted.
    #[error("Provider '{provider}' failed: {source}")]
    Provider {
        provider: String,
        #[source]
        source: crate::providers::ProviderError,
    },

    #[error("{0}")]
    BadRequest(String),
}

impl Error {
    /// The caller sent no prompt text.
    pub fn missing_prompt() -> Self {
        Error::BadRequest("Missing prompt".to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Provider { .. } => StatusCode::BAD_GATEWAY,
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
