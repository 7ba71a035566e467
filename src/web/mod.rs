//! Web layer module
//!
//! HTTP interface of the relay. Every `GET` path belongs to the upstream: the
//! handler hands the request target to the [`StreamInterceptor`] and converts
//! its result. No path is answered locally.

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::streaming::StreamInterceptor;

pub mod handlers;
pub mod responses;

pub use responses::relay_response;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub interceptor: Arc<StreamInterceptor>,
}

impl AppState {
    pub fn new(interceptor: Arc<StreamInterceptor>) -> Self {
        Self { interceptor }
    }
}

/// Web server configuration and setup
pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub fn new(addr: SocketAddr, interceptor: Arc<StreamInterceptor>) -> Self {
        Self {
            app: Self::create_router(AppState::new(interceptor)),
            addr,
        }
    }

    /// Create the router with all routes and middleware
    pub fn create_router(state: AppState) -> Router {
        Router::new()
            .route("/", get(handlers::relay::relay_resource))
            .route("/{*resource}", get(handlers::relay::relay_resource))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Serve until SIGINT/SIGTERM
    pub async fn serve(self) -> Result<()> {
        self.serve_with_shutdown(shutdown_signal()).await
    }

    /// Serve until `shutdown` resolves, letting in-flight requests finish
    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind(&self.addr)
            .await
            .with_context(|| format!("Failed to bind to {}", self.addr))?;
        info!("Relay listening on http://{}", self.addr);

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Relay stopped");
        Ok(())
    }
}

/// Resolves on the first SIGINT or SIGTERM
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
                (Err(e), _) | (_, Err(e)) => {
                    error!("Failed to install signal handlers: {}", e);
                    return std::future::pending().await;
                }
            };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down gracefully");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT (Ctrl+C), shutting down gracefully");
            }
        }
    }

    #[cfg(not(unix))]
    {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down gracefully"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    }
}
