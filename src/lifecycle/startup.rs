//! Startup orchestration.
//!
//! # Responsibilities
//! - Open the record sink
//! - Build the Hunter (fails fast on bad configuration)
//! - Bind the listener last, so traffic only arrives when ready
//! - Wire signals to graceful shutdown

use thiserror::Error;

use crate::config::{ConfigError, ServeConfig};
use crate::http::{HttpServer, ServerError};
use crate::hunter::Hunter;
use crate::lifecycle::{signals, Shutdown};
use crate::net::listener::{self, ListenerError};
use crate::observability::TransactionLogger;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to open output {path:?}: {source}")]
    Output {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error(transparent)]
    Server(#[from] ServerError),
}

/// Open the sink named by `config.output`, or stdout.
pub fn open_logger(config: &ServeConfig) -> Result<TransactionLogger, StartupError> {
    match &config.output {
        Some(path) => TransactionLogger::append_to(path).map_err(|source| StartupError::Output {
            path: path.clone(),
            source,
        }),
        None => Ok(TransactionLogger::stdout()),
    }
}

/// Serve until SIGINT/SIGTERM.
pub async fn run(config: ServeConfig) -> Result<(), StartupError> {
    let logger = open_logger(&config)?;
    let hunter = Hunter::new(config.hunter.clone(), logger)?;

    tracing::info!(
        backend = %hunter.backend().describe(),
        prefix = %hunter.prefix(),
        read_timeout_secs = config.timeouts.read_secs,
        write_timeout_secs = config.timeouts.write_secs,
        "Configuration loaded"
    );

    let listener = listener::bind(&config.listener.bind_address)?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    HttpServer::new(config, &hunter)
        .run(listener, server_shutdown)
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
