//! Wire protocol spoken to engine workers.
//!
//! One request is one JSON object on the worker's stdin, newline-terminated;
//! one reply is one JSON object on its stdout. Workers answer strictly in
//! order, so a pipe carries at most one outstanding request.

use serde::{Deserialize, Serialize};

use crate::engine::error::EngineError;

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub(crate) enum WorkerRequest<'a> {
    DecryptSig {
        challenge: &'a str,
        video_id: &'a str,
        player_url: &'a str,
    },
    DecryptNsig {
        challenge: &'a str,
        video_id: &'a str,
        player_url: &'a str,
    },
    SignatureTimestamp {
        video_id: &'a str,
        player_url: &'a str,
    },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum WorkerReply {
    Ok {
        #[serde(default)]
        value: Option<serde_json::Value>,
    },
    Error {
        kind: FaultKind,
        message: String,
    },
}

/// Which engine layer failed. The interpreter runs player code; the
/// extractor locates the routines to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum FaultKind {
    Interpreter,
    Extractor,
}

impl FaultKind {
    pub(crate) fn into_error(self, message: String) -> EngineError {
        match self {
            FaultKind::Interpreter => EngineError::Interpreter(message),
            FaultKind::Extractor => EngineError::Extractor(message),
        }
    }
}
