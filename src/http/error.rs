//! Client-facing error taxonomy.
//!
//! Every failure the gateway can report has exactly one variant here, and
//! [`ApiError::status`] is the only place a variant becomes a status code.
//! Handlers never pick status codes ad hoc.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::engine::EngineError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The response body never says whether the scheme or the token itself
    /// was wrong.
    #[error("Invalid or missing bearer token")]
    Unauthorized,

    #[error("{0}")]
    Validation(String),

    /// The engine ran but produced nothing for a non-empty signature. A
    /// caller-input problem (unsupported or changed player), not a fault.
    #[error("Signature decryption failed or returned empty result.")]
    SignatureDecryptionFailed,

    #[error("Signature timestamp not found in player {player_url}: {message}")]
    TimestampNotFound { player_url: String, message: String },

    /// The engine's code-execution layer errored; its diagnostic passes
    /// through verbatim.
    #[error("JavaScript interpreter error: {0}")]
    Interpreter(String),

    /// The engine's site-analysis layer errored for a reason other than
    /// "not found"; its diagnostic passes through verbatim.
    #[error("Extractor error: {0}")]
    Extractor(String),

    #[error("Decryption engine is not available")]
    EngineUnavailable,

    /// Anything uncategorized. The detail is logged server-side only.
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::FORBIDDEN,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::SignatureDecryptionFailed => StatusCode::BAD_REQUEST,
            ApiError::TimestampNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Interpreter(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Extractor(_) => StatusCode::BAD_REQUEST,
            ApiError::EngineUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::Unavailable => ApiError::EngineUnavailable,
            EngineError::Interpreter(message) => ApiError::Interpreter(message),
            EngineError::Extractor(message) => ApiError::Extractor(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            tracing::error!(detail = %detail, "request failed with an unexpected fault");
        }

        let status = self.status();
        let mut response = (status, Json(json!({ "error": self.to_string() }))).into_response();
        if matches!(self, ApiError::Unauthorized) {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
