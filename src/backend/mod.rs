//! Backing handlers.
//!
//! # Data Flow
//! ```text
//! ServeMode::StaticDir(root) → static_files.rs (tower-http ServeDir)
//! ServeMode::Proxy(origin)   → forward.rs (hyper client, http + https)
//! ```
//!
//! The mode is resolved into a [`Backend`] exactly once, at construction.

pub mod forward;
pub mod static_files;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;

use crate::config::{ConfigError, ServeMode};

pub use forward::Forwarder;
pub use static_files::StaticFiles;

#[derive(Debug, Clone)]
pub enum Backend {
    Static(StaticFiles),
    Proxy(Forwarder),
}

impl Backend {
    pub fn from_mode(mode: ServeMode) -> Result<Self, ConfigError> {
        match mode {
            ServeMode::StaticDir(root) => StaticFiles::new(root).map(Backend::Static),
            ServeMode::Proxy(origin) => Ok(Backend::Proxy(Forwarder::new(origin))),
        }
    }

    pub async fn serve(&self, request: Request<Body>) -> Response {
        match self {
            Backend::Static(files) => files.serve(request).await,
            Backend::Proxy(forwarder) => forwarder.serve(request).await,
        }
    }

    /// Human-readable description for startup logs.
    pub fn describe(&self) -> String {
        match self {
            Backend::Static(files) => format!("static:{}", files.root().display()),
            Backend::Proxy(forwarder) => format!("proxy:{}", forwarder.target()),
        }
    }
}
