//! Web layer module
//!
//! The HTTP interface of the exporter: the Prometheus pull endpoint plus a
//! basic health probe. Handlers are thin and read from the shared metric
//! registry only; all writes happen on the poll loop.

use anyhow::Result;
use axum::{Router, routing::get};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::WebConfig;
use crate::metrics::ModemMetrics;

pub mod handlers;

/// State shared with the request handlers
///
/// Reads and poll-loop writes are only ordered by the registry's internal
/// locking; a scrape may observe a partially-updated cycle, which is bounded
/// by one poll interval.
#[derive(Clone)]
pub struct AppState {
    pub metrics: Arc<ModemMetrics>,
}

/// Web server configuration and setup
pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    /// Create the server and its router
    pub fn new(config: &WebConfig, metrics: Arc<ModemMetrics>) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", config.host, config.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid listen address: {e}"))?;

        let app = create_router(AppState { metrics });

        Ok(Self { app, addr })
    }

    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Serve with ready notification
    ///
    /// Signals on `ready_signal` once the listener is bound (or failed to
    /// bind), then serves until SIGINT/SIGTERM.
    pub async fn serve_with_signal(
        self,
        ready_signal: tokio::sync::oneshot::Sender<Result<()>>,
    ) -> Result<()> {
        match tokio::net::TcpListener::bind(&self.addr).await {
            Ok(listener) => {
                // Signal that we're now actually listening on the port
                let _ = ready_signal.send(Ok(()));

                let shutdown_signal = async move {
                    #[cfg(unix)]
                    {
                        use tokio::signal::unix::{SignalKind, signal};
                        let mut sigterm = signal(SignalKind::terminate())
                            .expect("failed to install SIGTERM handler");
                        let mut sigint = signal(SignalKind::interrupt())
                            .expect("failed to install SIGINT handler");

                        tokio::select! {
                            _ = sigterm.recv() => {
                                tracing::info!("Received SIGTERM, shutting down gracefully");
                            }
                            _ = sigint.recv() => {
                                tracing::info!("Received SIGINT (Ctrl+C), shutting down gracefully");
                            }
                        }
                    }

                    #[cfg(not(unix))]
                    {
                        use tokio::signal;
                        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
                        tracing::info!("Received Ctrl+C, shutting down gracefully");
                    }
                };

                axum::serve(listener, self.app)
                    .with_graceful_shutdown(shutdown_signal)
                    .await?;
                Ok(())
            }
            Err(e) => {
                let message = format!("Failed to bind {}: {e}", self.addr);
                let _ = ready_signal.send(Err(anyhow::anyhow!(message.clone())));
                Err(anyhow::anyhow!(message))
            }
        }
    }
}

/// Build the router; separated from `WebServer` for endpoint tests
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/metrics", get(handlers::metrics::prometheus_metrics))
        .route("/health", get(handlers::health::health_check))
        .with_state(state)
}
