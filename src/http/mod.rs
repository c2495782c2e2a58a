//! HTTP endpoint layer.
//!
//! # Data Flow
//! ```text
//! request
//!     → server.rs (router, request ID, trace, timeout, body limit)
//!     → middleware/auth.rs (bearer gate, unconditional)
//!     → handlers.rs (validate shape, invoke engine handle)
//!     → error.rs (taxonomy case → status code → JSON body)
//! ```

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod request_id;
pub mod server;

pub use error::ApiError;
pub use request_id::{MakeRequestUuid, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
