//! Engine worker child process.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use crate::config::EngineConfig;
use crate::engine::error::EngineError;
use crate::engine::protocol::{WorkerReply, WorkerRequest};
use crate::engine::SignatureEngine;

/// One engine worker: a child process plus its request/reply pipe.
///
/// The worker's stderr is inherited so its own diagnostics land in the
/// gateway's log stream.
pub struct WorkerProcess {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl WorkerProcess {
    /// Spawn a worker. Failure here is what marks the whole engine handle
    /// unavailable for the life of the process.
    pub fn spawn(config: &EngineConfig) -> Result<Self, EngineError> {
        let mut child = Command::new(&config.command)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineError::Protocol("worker stdin was not captured".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .map(BufReader::new)
            .ok_or_else(|| EngineError::Protocol("worker stdout was not captured".to_string()))?;

        Ok(Self {
            child,
            stdin,
            stdout,
        })
    }

    async fn roundtrip(&mut self, request: WorkerRequest<'_>) -> Result<WorkerReply, EngineError> {
        let mut line = serde_json::to_vec(&request)
            .map_err(|err| EngineError::Protocol(format!("unserializable request: {err}")))?;
        line.push(b'\n');
        self.stdin.write_all(&line).await?;
        self.stdin.flush().await?;

        let mut reply = String::new();
        let read = self.stdout.read_line(&mut reply).await?;
        if read == 0 {
            return Err(EngineError::Protocol(
                "worker closed its output stream".to_string(),
            ));
        }
        serde_json::from_str(&reply)
            .map_err(|err| EngineError::Protocol(format!("unparseable worker reply: {err}")))
    }
}

/// The engine reports string results as JSON strings; anything else
/// (null, missing) collapses to empty.
fn text_value(value: Option<serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::String(text)) => text,
        _ => String::new(),
    }
}

#[async_trait]
impl SignatureEngine for WorkerProcess {
    async fn decrypt_signature(
        &mut self,
        challenge: &str,
        video_id: &str,
        player_url: &str,
    ) -> Result<String, EngineError> {
        match self
            .roundtrip(WorkerRequest::DecryptSig {
                challenge,
                video_id,
                player_url,
            })
            .await?
        {
            WorkerReply::Ok { value } => Ok(text_value(value)),
            WorkerReply::Error { kind, message } => Err(kind.into_error(message)),
        }
    }

    async fn decrypt_n_param(
        &mut self,
        challenge: &str,
        video_id: &str,
        player_url: &str,
    ) -> Result<Option<String>, EngineError> {
        match self
            .roundtrip(WorkerRequest::DecryptNsig {
                challenge,
                video_id,
                player_url,
            })
            .await?
        {
            WorkerReply::Ok { value } => {
                let text = text_value(value);
                Ok((!text.is_empty()).then_some(text))
            }
            WorkerReply::Error { kind, message } => Err(kind.into_error(message)),
        }
    }

    async fn signature_timestamp(
        &mut self,
        video_id: &str,
        player_url: &str,
    ) -> Result<u64, EngineError> {
        match self
            .roundtrip(WorkerRequest::SignatureTimestamp {
                video_id,
                player_url,
            })
            .await?
        {
            WorkerReply::Ok { value } => value
                .as_ref()
                .and_then(serde_json::Value::as_u64)
                .ok_or_else(|| {
                    // The extraction is mandatory on the engine side, so an
                    // ok-reply without a number is a broken worker.
                    EngineError::Protocol(
                        "worker returned no value for a mandatory timestamp extraction"
                            .to_string(),
                    )
                }),
            WorkerReply::Error { kind, message } => Err(kind.into_error(message)),
        }
    }

    fn abort(&mut self) {
        let _ = self.child.start_kill();
    }
}
