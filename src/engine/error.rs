//! Typed engine failures.

use std::time::Duration;

use thiserror::Error;

/// Everything that can go wrong between the gateway and the engine.
///
/// `Interpreter` and `Extractor` carry the engine's own diagnostic text and
/// are passed through to clients; the remaining variants are operational
/// faults whose details stay server-side.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("decryption engine is not available")]
    Unavailable,

    #[error("engine call timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Interpreter(String),

    #[error("{0}")]
    Extractor(String),

    #[error("engine protocol error: {0}")]
    Protocol(String),

    #[error("engine i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Marker text the engine emits when a player script carries no signature
/// timestamp. The engine has no structured code for this condition, only
/// free text, so detection is a substring match kept in this one place.
/// A change to the engine's wording silently turns 404s into 500s.
const TIMESTAMP_NOT_FOUND_MARKER: &str = "Unable to extract signature timestamp";

impl EngineError {
    /// Whether this failure is the extractor saying "no timestamp in this
    /// player" rather than a genuine fault.
    pub fn is_timestamp_not_found(&self) -> bool {
        matches!(self, EngineError::Extractor(message) if message.contains(TIMESTAMP_NOT_FOUND_MARKER))
    }
}
