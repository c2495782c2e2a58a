//! Decryption engine ownership and forwarding.
//!
//! The engine that actually analyzes player scripts is an external worker
//! executable; this module owns its process lifecycle and forwards three
//! operations to it. Nothing here knows how decryption works.
//!
//! # Data Flow
//! ```text
//! handler call
//!     → handle.rs (admission, worker selection, per-call timeout)
//!     → process.rs (one JSON line out, one JSON line back)
//!     → worker executable (opaque)
//! ```

mod error;
mod handle;
mod process;
mod protocol;

pub use error::EngineError;
pub use handle::EngineHandle;
pub use process::WorkerProcess;

use async_trait::async_trait;

/// The operations the external analysis engine exposes.
///
/// `&mut self` is deliberate: a worker owns a single request/reply pipe and
/// cannot serve two calls at once. [`EngineHandle`] provides the exclusion.
#[async_trait]
pub trait SignatureEngine: Send {
    /// Recover a stream signature from its obfuscated form. An empty return
    /// value means the engine ran but produced nothing; callers decide what
    /// that means.
    async fn decrypt_signature(
        &mut self,
        challenge: &str,
        video_id: &str,
        player_url: &str,
    ) -> Result<String, EngineError>;

    /// Recover the n-parameter. `None` means the engine could not resolve
    /// it, which is a valid outcome rather than a failure.
    async fn decrypt_n_param(
        &mut self,
        challenge: &str,
        video_id: &str,
        player_url: &str,
    ) -> Result<Option<String>, EngineError>;

    /// Extract the signature timestamp from the player. Mandatory: the
    /// engine reports an error when it cannot locate one, never a
    /// placeholder value.
    async fn signature_timestamp(
        &mut self,
        video_id: &str,
        player_url: &str,
    ) -> Result<u64, EngineError>;

    /// Tear down after a timed-out call. The engine will not be used again.
    fn abort(&mut self) {}
}
