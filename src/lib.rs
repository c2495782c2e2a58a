//! Authenticated HTTP gateway for a player-script analysis engine.
//!
//! The gateway exposes two synchronous operations of an external decryption
//! engine: recovering an obfuscated signature / n-parameter pair, and
//! extracting the signature timestamp embedded in player code. Everything
//! that actually analyzes player JavaScript lives in the engine worker; this
//! crate owns authentication, validation, the engine's process lifecycle,
//! and the mapping of engine failures onto a stable HTTP error taxonomy.
//!
//! ```text
//!  client ──▶ http (auth gate, validation) ──▶ engine (worker pool) ──▶ worker process
//!                     │                              │
//!                     ◀── error taxonomy ◀── typed engine failures
//! ```

pub mod config;
pub mod engine;
pub mod http;
pub mod observability;

pub use config::GatewayConfig;
pub use engine::EngineHandle;
pub use http::HttpServer;
