//! The two gateway operations.
//!
//! Each handler walks the same state machine: authenticated (upstream
//! middleware) → validated → engine-invoked → responded. All engine
//! failures are logged here with request context before they become
//! responses; the handle itself never converts failures.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::engine::EngineError;
use crate::http::error::ApiError;
use crate::http::server::AppState;

#[derive(Debug, Deserialize)]
pub struct SignatureRequest {
    /// Obfuscated signature challenge. Absent or empty means "skip
    /// signature decryption", not "decrypt the empty string".
    #[serde(default)]
    pub encrypted_signature: Option<String>,

    /// Obfuscated n-parameter challenge, same skip convention.
    #[serde(default)]
    pub n_param: Option<String>,

    pub player_url: String,
    pub video_id: String,
}

#[derive(Debug, Serialize)]
pub struct SignatureResponse {
    pub decrypted_signature: String,
    /// `null` when the operation was skipped or the engine could not
    /// resolve it.
    pub decrypted_n_sig: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StsRequest {
    pub player_url: String,
    pub video_id: String,
}

#[derive(Debug, Serialize)]
pub struct StsResponse {
    pub sts: u64,
}

pub async fn decrypt_signature(
    State(state): State<AppState>,
    Json(request): Json<SignatureRequest>,
) -> Result<Json<SignatureResponse>, ApiError> {
    let player_url = validate_target(&request.player_url, &request.video_id)?;
    tracing::info!(
        player_url = %player_url,
        video_id = %request.video_id,
        "received decryption request"
    );

    let mut decrypted_signature = String::new();
    if let Some(challenge) = non_empty(&request.encrypted_signature) {
        decrypted_signature = state
            .engine
            .decrypt_signature(challenge, &request.video_id, &player_url)
            .await
            .map_err(|error| {
                engine_failure(error, "decrypt_signature", &player_url, &request.video_id)
            })?;

        if decrypted_signature.is_empty() {
            tracing::warn!(
                player_url = %player_url,
                video_id = %request.video_id,
                "signature decryption returned an empty result"
            );
            return Err(ApiError::SignatureDecryptionFailed);
        }
    }

    let mut decrypted_n_sig = None;
    if let Some(challenge) = non_empty(&request.n_param) {
        decrypted_n_sig = state
            .engine
            .decrypt_n_param(challenge, &request.video_id, &player_url)
            .await
            .map_err(|error| {
                engine_failure(error, "decrypt_n_param", &player_url, &request.video_id)
            })?;

        // Unlike the signature, an unresolved n-parameter is not an error:
        // the caller may only have needed the signature, and the two
        // operations fail independently. The field stays null.
        if decrypted_n_sig.is_none() {
            tracing::warn!(
                player_url = %player_url,
                video_id = %request.video_id,
                "n-parameter decryption returned an empty result"
            );
        }
    }

    tracing::info!(player_url = %player_url, "decryption request processed");
    Ok(Json(SignatureResponse {
        decrypted_signature,
        decrypted_n_sig,
    }))
}

pub async fn get_sts(
    State(state): State<AppState>,
    Json(request): Json<StsRequest>,
) -> Result<Json<StsResponse>, ApiError> {
    let player_url = validate_target(&request.player_url, &request.video_id)?;
    tracing::info!(
        player_url = %player_url,
        video_id = %request.video_id,
        "received signature timestamp request"
    );

    match state
        .engine
        .signature_timestamp(&request.video_id, &player_url)
        .await
    {
        Ok(sts) => {
            tracing::info!(player_url = %player_url, sts, "signature timestamp extracted");
            Ok(Json(StsResponse { sts }))
        }
        Err(error) if error.is_timestamp_not_found() => {
            tracing::warn!(
                player_url = %player_url,
                video_id = %request.video_id,
                "signature timestamp not found"
            );
            Err(ApiError::TimestampNotFound {
                message: error.to_string(),
                player_url,
            })
        }
        Err(error) => Err(engine_failure(
            error,
            "signature_timestamp",
            &player_url,
            &request.video_id,
        )),
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.is_empty())
}

fn engine_failure(error: EngineError, operation: &str, player_url: &str, video_id: &str) -> ApiError {
    tracing::error!(operation, player_url, video_id, error = %error, "engine call failed");
    ApiError::from(error)
}

fn validate_target(player_url: &str, video_id: &str) -> Result<String, ApiError> {
    if video_id.is_empty() {
        return Err(ApiError::Validation("video_id must not be empty".to_string()));
    }
    normalize_player_url(player_url)
}

/// Player references sometimes arrive as site-relative paths; everything
/// else must at least parse as a URL before it is handed to the engine.
fn normalize_player_url(raw: &str) -> Result<String, ApiError> {
    if raw.is_empty() {
        return Err(ApiError::Validation("player_url must not be empty".to_string()));
    }
    if raw.starts_with('/') {
        if raw.starts_with("/s/player/") {
            return Ok(format!("https://www.youtube.com{raw}"));
        }
        return Err(ApiError::Validation(format!("invalid player path: {raw}")));
    }
    Url::parse(raw)
        .map_err(|_| ApiError::Validation(format!("invalid player URL: {raw}")))?;
    Ok(raw.to_string())
}
