//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Wrap the Hunter router with a request-body timeout and trace middleware;
//!   the write timeout is enforced inside the Hunter so timed-out
//!   transactions are still logged
//! - Serve plain HTTP or HTTPS on an already-bound listener
//! - Stop accepting on shutdown and give in-flight transactions a bounded
//!   grace period

use std::net::SocketAddr;

use axum::Router;
use axum_server::Handle;
use thiserror::Error;
use tokio::sync::broadcast;
use tower_http::{timeout::RequestBodyTimeoutLayer, trace::TraceLayer};

use crate::config::ServeConfig;
use crate::hunter::Hunter;
use crate::net::tls::load_tls_config;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to load TLS certificate/key: {0}")]
    Tls(#[source] std::io::Error),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP(S) server for a [`Hunter`].
pub struct HttpServer {
    router: Router,
    config: ServeConfig,
}

impl HttpServer {
    pub fn new(config: ServeConfig, hunter: &Hunter) -> Self {
        let router = Self::build_router(&config, hunter);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ServeConfig, hunter: &Hunter) -> Router {
        hunter
            .clone()
            .with_write_timeout(config.timeouts.write())
            .router()
            .layer(RequestBodyTimeoutLayer::new(config.timeouts.read()))
            .layer(TraceLayer::new_for_http())
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: std::net::TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        let handle = Handle::new();
        let grace = self.config.timeouts.shutdown_grace();

        tokio::spawn({
            let handle = handle.clone();
            async move {
                let _ = shutdown.recv().await;
                tracing::info!(grace_secs = grace.as_secs(), "Shutting down server");
                handle.graceful_shutdown(Some(grace));
            }
        });

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        match &self.config.listener.tls {
            Some(tls) => {
                let rustls = load_tls_config(&tls.cert_path, &tls.key_path)
                    .await
                    .map_err(ServerError::Tls)?;
                tracing::info!(address = %addr, "launching https server");
                axum_server::from_tcp_rustls(listener, rustls)
                    .handle(handle)
                    .serve(app)
                    .await?;
            }
            None => {
                tracing::info!(address = %addr, "launching http server");
                axum_server::from_tcp(listener)
                    .handle(handle)
                    .serve(app)
                    .await?;
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

