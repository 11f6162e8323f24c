//! Clicktrail collection server
//!
//! Receives audit records over HTTP, tags them with a server-side receipt
//! time and writes them to an [`AuditSink`].
//!
//! # Endpoints
//!
//! - `POST /api/audit-log` accepts one audit record
//! - `GET /api/page/:pageName` greets a demo page
//! - `GET /api/health` reports liveness and version

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod routes;
pub mod sink;
pub mod state;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use sink::{AuditSink, ConsoleSink, MemorySink, SinkError};
pub use state::AppState;

use anyhow::Context;
use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Server builder for constructing and running the collection server.
pub struct Server {
    config: ServerConfig,
    state: AppState,
}

impl Server {
    /// Create a server writing to the sink named in `config`.
    pub fn new(config: ServerConfig) -> Self {
        let state = AppState::new(&config);
        Self { config, state }
    }

    /// Create a server writing to `state`'s sink.
    pub fn with_state(config: ServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        routes::create_router(self.state.clone(), &self.config)
    }

    /// Run the server, binding to the configured address.
    pub async fn run(self) -> Result<(), anyhow::Error> {
        let addr = self.addr()?;
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;

        info!(%addr, sink = self.state.sink.name(), "server listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }

    /// Get the server's socket address.
    pub fn addr(&self) -> Result<SocketAddr, anyhow::Error> {
        self.config
            .socket_addr()
            .with_context(|| format!("invalid bind address {}", self.config.server.host))
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received, starting graceful shutdown");
}
