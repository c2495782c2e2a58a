//! Process-wide engine handle.
//!
//! # Lifecycle
//! ```text
//! spawn ──ok──▶ available (fixed worker pool, never grown or respawned)
//!   │                │ per-call timeout ⇒ worker killed, slot retired
//!   └─failure──▶ unavailable (every call fails immediately, no retry)
//! ```
//!
//! The handle is created once at startup and injected into the HTTP layer;
//! nothing ever reconstructs it mid-process. Operators restart the process
//! to recover, which is a deliberate, visible signal.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, Semaphore};
use tokio::time::timeout;

use crate::config::EngineConfig;
use crate::engine::error::EngineError;
use crate::engine::process::WorkerProcess;
use crate::engine::SignatureEngine;

struct WorkerSlot {
    engine: Mutex<Box<dyn SignatureEngine>>,
    retired: AtomicBool,
}

#[derive(Debug, Clone, Copy)]
enum EngineCall<'a> {
    Signature {
        challenge: &'a str,
        video_id: &'a str,
        player_url: &'a str,
    },
    NParam {
        challenge: &'a str,
        video_id: &'a str,
        player_url: &'a str,
    },
    Timestamp {
        video_id: &'a str,
        player_url: &'a str,
    },
}

enum EngineOutcome {
    Signature(String),
    NParam(Option<String>),
    Timestamp(u64),
}

/// Owns the engine worker pool for the process lifetime.
pub struct EngineHandle {
    slots: Vec<WorkerSlot>,
    admission: Semaphore,
    live: AtomicUsize,
    call_timeout: Duration,
}

impl EngineHandle {
    /// Start the worker pool. Any spawn failure marks the handle
    /// permanently unavailable; requests then fail fast instead of
    /// re-attempting an expensive (and evidently broken) construction.
    pub fn spawn(config: &EngineConfig) -> Self {
        let workers = config.effective_workers();
        let mut engines: Vec<Box<dyn SignatureEngine>> = Vec::with_capacity(workers);
        for _ in 0..workers {
            match WorkerProcess::spawn(config) {
                Ok(worker) => engines.push(Box::new(worker)),
                Err(error) => {
                    tracing::error!(
                        command = %config.command,
                        %error,
                        "failed to start engine worker; gateway will answer 503"
                    );
                    return Self::unavailable(config.call_timeout());
                }
            }
        }
        tracing::info!(workers, command = %config.command, "engine worker pool started");
        Self::from_engines(engines, config.call_timeout())
    }

    /// Build a handle over already-constructed engines. The handle takes
    /// sole ownership; one slot per engine.
    pub fn from_engines(engines: Vec<Box<dyn SignatureEngine>>, call_timeout: Duration) -> Self {
        let live = engines.len();
        Self {
            admission: Semaphore::new(live),
            slots: engines
                .into_iter()
                .map(|engine| WorkerSlot {
                    engine: Mutex::new(engine),
                    retired: AtomicBool::new(false),
                })
                .collect(),
            live: AtomicUsize::new(live),
            call_timeout,
        }
    }

    /// A handle whose engine never came up.
    pub fn unavailable(call_timeout: Duration) -> Self {
        Self::from_engines(Vec::new(), call_timeout)
    }

    pub fn is_available(&self) -> bool {
        self.live.load(Ordering::Acquire) > 0
    }

    pub async fn decrypt_signature(
        &self,
        challenge: &str,
        video_id: &str,
        player_url: &str,
    ) -> Result<String, EngineError> {
        match self
            .dispatch(EngineCall::Signature {
                challenge,
                video_id,
                player_url,
            })
            .await?
        {
            EngineOutcome::Signature(signature) => Ok(signature),
            _ => Err(EngineError::Protocol("mismatched engine response".to_string())),
        }
    }

    pub async fn decrypt_n_param(
        &self,
        challenge: &str,
        video_id: &str,
        player_url: &str,
    ) -> Result<Option<String>, EngineError> {
        match self
            .dispatch(EngineCall::NParam {
                challenge,
                video_id,
                player_url,
            })
            .await?
        {
            EngineOutcome::NParam(n_sig) => Ok(n_sig),
            _ => Err(EngineError::Protocol("mismatched engine response".to_string())),
        }
    }

    pub async fn signature_timestamp(
        &self,
        video_id: &str,
        player_url: &str,
    ) -> Result<u64, EngineError> {
        match self
            .dispatch(EngineCall::Timestamp {
                video_id,
                player_url,
            })
            .await?
        {
            EngineOutcome::Timestamp(sts) => Ok(sts),
            _ => Err(EngineError::Protocol("mismatched engine response".to_string())),
        }
    }

    async fn dispatch(&self, call: EngineCall<'_>) -> Result<EngineOutcome, EngineError> {
        if !self.is_available() {
            return Err(EngineError::Unavailable);
        }

        let permit = self
            .admission
            .acquire()
            .await
            .map_err(|_| EngineError::Unavailable)?;

        // The permit guarantees at most `live` concurrent holders, so some
        // live slot is unlocked; the scan only loses transient races.
        let (slot, mut engine) = loop {
            let mut claimed = None;
            for slot in &self.slots {
                if slot.retired.load(Ordering::Acquire) {
                    continue;
                }
                if let Ok(guard) = slot.engine.try_lock() {
                    claimed = Some((slot, guard));
                    break;
                }
            }
            match claimed {
                Some(pair) => break pair,
                None => {
                    if !self.is_available() {
                        return Err(EngineError::Unavailable);
                    }
                    tokio::task::yield_now().await;
                }
            }
        };

        let outcome = timeout(self.call_timeout, async {
            match call {
                EngineCall::Signature {
                    challenge,
                    video_id,
                    player_url,
                } => engine
                    .decrypt_signature(challenge, video_id, player_url)
                    .await
                    .map(EngineOutcome::Signature),
                EngineCall::NParam {
                    challenge,
                    video_id,
                    player_url,
                } => engine
                    .decrypt_n_param(challenge, video_id, player_url)
                    .await
                    .map(EngineOutcome::NParam),
                EngineCall::Timestamp {
                    video_id,
                    player_url,
                } => engine
                    .signature_timestamp(video_id, player_url)
                    .await
                    .map(EngineOutcome::Timestamp),
            }
        })
        .await;

        match outcome {
            Ok(result) => result,
            Err(_elapsed) => {
                // The worker is mid-call with no way to resynchronize its
                // pipe; kill it and shrink capacity to match.
                engine.abort();
                slot.retired.store(true, Ordering::Release);
                self.live.fetch_sub(1, Ordering::AcqRel);
                permit.forget();
                tracing::warn!(
                    call_timeout = ?self.call_timeout,
                    live_workers = self.live.load(Ordering::Acquire),
                    "engine call timed out; worker retired"
                );
                Err(EngineError::Timeout(self.call_timeout))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct StaticEngine;

    #[async_trait]
    impl SignatureEngine for StaticEngine {
        async fn decrypt_signature(
            &mut self,
            challenge: &str,
            _video_id: &str,
            _player_url: &str,
        ) -> Result<String, EngineError> {
            Ok(format!("dec:{challenge}"))
        }

        async fn decrypt_n_param(
            &mut self,
            challenge: &str,
            _video_id: &str,
            _player_url: &str,
        ) -> Result<Option<String>, EngineError> {
            Ok(Some(format!("n:{challenge}")))
        }

        async fn signature_timestamp(
            &mut self,
            _video_id: &str,
            _player_url: &str,
        ) -> Result<u64, EngineError> {
            Ok(19834)
        }
    }

    struct StallingEngine;

    #[async_trait]
    impl SignatureEngine for StallingEngine {
        async fn decrypt_signature(
            &mut self,
            _challenge: &str,
            _video_id: &str,
            _player_url: &str,
        ) -> Result<String, EngineError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(String::new())
        }

        async fn decrypt_n_param(
            &mut self,
            _challenge: &str,
            _video_id: &str,
            _player_url: &str,
        ) -> Result<Option<String>, EngineError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(None)
        }

        async fn signature_timestamp(
            &mut self,
            _video_id: &str,
            _player_url: &str,
        ) -> Result<u64, EngineError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(0)
        }
    }

    #[tokio::test]
    async fn forwards_to_a_pooled_worker() {
        let handle = EngineHandle::from_engines(
            vec![Box::new(StaticEngine) as Box<dyn SignatureEngine>],
            Duration::from_secs(1),
        );
        assert!(handle.is_available());
        assert_eq!(
            handle.decrypt_signature("abc", "v1", "p").await.unwrap(),
            "dec:abc"
        );
        assert_eq!(
            handle.decrypt_n_param("xyz", "v1", "p").await.unwrap(),
            Some("n:xyz".to_string())
        );
        assert_eq!(handle.signature_timestamp("v1", "p").await.unwrap(), 19834);
    }

    #[tokio::test]
    async fn unavailable_handle_fails_every_call_immediately() {
        let handle = EngineHandle::unavailable(Duration::from_secs(1));
        assert!(!handle.is_available());
        for _ in 0..3 {
            assert!(matches!(
                handle.decrypt_signature("abc", "v1", "p").await,
                Err(EngineError::Unavailable)
            ));
        }
        assert!(matches!(
            handle.signature_timestamp("v1", "p").await,
            Err(EngineError::Unavailable)
        ));
    }

    #[tokio::test]
    async fn timed_out_worker_is_retired_not_respawned() {
        let handle = EngineHandle::from_engines(
            vec![Box::new(StallingEngine) as Box<dyn SignatureEngine>],
            Duration::from_millis(20),
        );
        assert!(matches!(
            handle.decrypt_signature("abc", "v1", "p").await,
            Err(EngineError::Timeout(_))
        ));
        assert!(!handle.is_available());
        assert!(matches!(
            handle.decrypt_signature("abc", "v1", "p").await,
            Err(EngineError::Unavailable)
        ));
    }
}
