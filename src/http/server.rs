//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router with both operations
//! - Apply the bearer gate to every route
//! - Wire up middleware (request ID, tracing, timeout, body limit, metrics)
//! - Serve with graceful shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderName;
use axum::routing::post;
use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::engine::EngineHandle;
use crate::http::handlers;
use crate::http::middleware::auth;
use crate::http::request_id::{MakeRequestUuid, X_REQUEST_ID};
use crate::observability::metrics;

/// Request bodies carry challenges and URLs, never player scripts; anything
/// larger than this is not a legitimate request.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub engine: Arc<EngineHandle>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server over an already-initialized engine handle.
    pub fn new(config: GatewayConfig, engine: Arc<EngineHandle>) -> Self {
        let request_timeout = Duration::from_secs(config.timeouts.request_secs);
        let state = AppState {
            config: Arc::new(config),
            engine,
        };
        Self {
            router: Self::build_router(state, request_timeout),
        }
    }

    fn build_router(state: AppState, request_timeout: Duration) -> Router {
        Router::new()
            .route("/decrypt_signature", post(handlers::decrypt_signature))
            .route("/get_sts", post(handlers::get_sts))
            .route_layer(axum::middleware::from_fn_with_state(
                state.clone(),
                auth::require_bearer,
            ))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(
                        HeaderName::from_static(X_REQUEST_ID),
                        MakeRequestUuid,
                    ))
                    .layer(TraceLayer::new_for_http())
                    .layer(TimeoutLayer::new(request_timeout))
                    .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
                    .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                        X_REQUEST_ID,
                    )))
                    .layer(axum::middleware::from_fn(metrics::track_requests)),
            )
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
