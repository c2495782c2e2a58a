//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpListener;

use sig_gateway::config::GatewayConfig;
use sig_gateway::engine::{EngineError, EngineHandle, SignatureEngine};
use sig_gateway::http::HttpServer;

pub const TEST_TOKEN: &str = "test-secret";

/// Scripted outcome for one engine operation.
#[derive(Clone)]
pub enum Outcome<T> {
    Ok(T),
    Interpreter(&'static str),
    Extractor(&'static str),
}

impl<T: Clone> Outcome<T> {
    fn produce(&self) -> Result<T, EngineError> {
        match self {
            Outcome::Ok(value) => Ok(value.clone()),
            Outcome::Interpreter(message) => Err(EngineError::Interpreter((*message).to_owned())),
            Outcome::Extractor(message) => Err(EngineError::Extractor((*message).to_owned())),
        }
    }
}

/// How many times each engine operation was actually invoked.
#[derive(Default)]
pub struct CallCounts {
    pub sig: AtomicUsize,
    pub nsig: AtomicUsize,
    pub sts: AtomicUsize,
}

/// An in-process engine with fixed, programmable behavior.
pub struct ScriptedEngine {
    pub sig: Outcome<String>,
    pub nsig: Outcome<Option<String>>,
    pub sts: Outcome<u64>,
    calls: Arc<CallCounts>,
}

impl ScriptedEngine {
    pub fn new() -> (Self, Arc<CallCounts>) {
        let calls = Arc::new(CallCounts::default());
        let engine = Self {
            sig: Outcome::Ok("decrypted-sig".to_string()),
            nsig: Outcome::Ok(Some("decrypted-nsig".to_string())),
            sts: Outcome::Ok(19834),
            calls: calls.clone(),
        };
        (engine, calls)
    }
}

#[async_trait]
impl SignatureEngine for ScriptedEngine {
    async fn decrypt_signature(
        &mut self,
        _challenge: &str,
        _video_id: &str,
        _player_url: &str,
    ) -> Result<String, EngineError> {
        self.calls.sig.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.sig.produce()
    }

    async fn decrypt_n_param(
        &mut self,
        _challenge: &str,
        _video_id: &str,
        _player_url: &str,
    ) -> Result<Option<String>, EngineError> {
        self.calls.nsig.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.nsig.produce()
    }

    async fn signature_timestamp(
        &mut self,
        _video_id: &str,
        _player_url: &str,
    ) -> Result<u64, EngineError> {
        self.calls.sts.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.sts.produce()
    }
}

/// Start a gateway on an ephemeral port. `None` simulates an engine that
/// failed to initialize at startup.
pub async fn spawn_gateway(engine: Option<Box<dyn SignatureEngine>>) -> SocketAddr {
    let mut config = GatewayConfig::default();
    config.auth.token = TEST_TOKEN.to_string();

    let handle = match engine {
        Some(engine) => EngineHandle::from_engines(vec![engine], Duration::from_secs(5)),
        None => EngineHandle::unavailable(Duration::from_secs(5)),
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config, Arc::new(handle));
    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });
    addr
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
