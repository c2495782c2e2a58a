//! Bearer-token gate.
//!
//! Applied to every routed operation, before any other request processing.
//! Verification is stateless: extract the scheme and token, compare against
//! the process-wide secret, reject on any mismatch.

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

use crate::http::error::ApiError;
use crate::http::server::AppState;

const BEARER_PREFIX: &str = "Bearer ";

pub async fn require_bearer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX));

    // One rejection for every failure mode: missing header, wrong scheme,
    // wrong token. Callers learn nothing about which check failed.
    match token {
        Some(token) if token == state.config.auth.token => Ok(next.run(request).await),
        _ => Err(ApiError::Unauthorized),
    }
}
